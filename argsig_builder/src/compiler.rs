mod alias;
mod assemble;
mod descriptor;
mod finish;
mod grammar;
mod resolve;

pub use assemble::{ArgumentSummary, Group};
pub use descriptor::ArgKind;
pub use grammar::Grammar;

pub(crate) use assemble::Section;
pub(crate) use descriptor::{Alias, Arity, Descriptor, Detail, ValueSpec};
pub(crate) use resolve::Conversion;

use crate::api::Parameter;
use crate::compiler::alias::ShortAllocator;
use crate::compiler::assemble::{assemble, Blueprint, Entry};
use crate::parser::{ConfigError, Engine};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Program level settings, fixed for the lifetime of a grammar.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) program: String,
    pub(crate) about: Option<String>,
    pub(crate) add_help: bool,
    pub(crate) term_width: usize,
}

/// Compile the parameters, in declaration order, into a grammar.
pub(crate) fn compile(settings: Settings, parameters: &[Parameter]) -> Result<Grammar, ConfigError> {
    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Compiling '{}' from {} parameters.",
            settings.program,
            parameters.len()
        );
    }

    let mut entries = parameters
        .iter()
        .map(|parameter| {
            if parameter.is_header() {
                assemble::Group::from_header(parameter).map(Entry::Header)
            } else {
                Descriptor::build(parameter).map(Entry::Argument)
            }
        })
        .collect::<Result<Vec<Entry>, ConfigError>>()?;

    let mut allocator = ShortAllocator::new(settings.add_help);
    allocator.reserve(entries.iter_mut().filter_map(Entry::descriptor_mut))?;
    allocator.assign(entries.iter_mut().filter_map(Entry::descriptor_mut));

    let Blueprint {
        sections,
        finishers,
        summaries,
    } = assemble(entries, settings.add_help)?;
    let groups = sections
        .iter()
        .filter_map(|section| section.group.clone())
        .collect();
    let engine = Engine::new(&settings, sections);

    Ok(Grammar::new(settings.program, engine, finishers, groups, summaries))
}
