use std::collections::HashMap;

use crate::api::Parameter;
use crate::compiler::descriptor::{ArgKind, Arity, Descriptor, Detail};
use crate::compiler::finish::Finisher;
use crate::model::Value;
use crate::parser::ConfigError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A titled help section, opened by a header parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    title: String,
    description: Option<String>,
}

impl Group {
    pub(crate) fn from_header(parameter: &Parameter) -> Result<Self, ConfigError> {
        let title = parameter.name.trim_matches('_').replace('_', " ");
        let default = parameter
            .default
            .as_ref()
            .or_else(|| parameter.arg.as_ref().and_then(|arg| arg.default.as_ref()));
        let description = match default {
            None | Some(Value::None) => None,
            Some(Value::Str(description)) => Some(description.clone()),
            Some(_) => return Err(ConfigError::InvalidHeader(parameter.name.clone())),
        };

        Ok(Self { title, description })
    }

    /// The section title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The section description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// How a compiled argument is spelled on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSummary {
    dest: String,
    kind: ArgKind,
    shorts: Vec<char>,
    longs: Vec<String>,
    required: bool,
    group: Option<String>,
}

impl ArgumentSummary {
    fn new(descriptor: &Descriptor, group: Option<&Group>) -> Self {
        let aliases = descriptor.aliases();
        Self {
            dest: descriptor.dest.clone(),
            kind: descriptor.kind,
            shorts: aliases.iter().filter_map(|alias| alias.assigned).collect(),
            longs: aliases
                .iter()
                .flat_map(|alias| alias.longs.iter().cloned())
                .collect(),
            required: descriptor.required(),
            group: group.map(|group| group.title.clone()),
        }
    }

    /// The destination.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The kind.
    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    /// The short options, in rule order (ex: up then down, for a level flag).
    pub fn shorts(&self) -> &[char] {
        &self.shorts
    }

    /// The long options (without the `--` prefix), in rule order.
    pub fn longs(&self) -> &[String] {
        &self.longs
    }

    /// Whether the argument must be given.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The title of the help section the argument belongs to.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

pub(crate) enum Entry {
    Header(Group),
    Argument(Descriptor),
}

impl Entry {
    pub(crate) fn descriptor_mut(&mut self) -> Option<&mut Descriptor> {
        match self {
            Entry::Header(_) => None,
            Entry::Argument(descriptor) => Some(descriptor),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Section {
    pub(crate) group: Option<Group>,
    pub(crate) descriptors: Vec<Descriptor>,
}

#[derive(Debug)]
pub(crate) struct Blueprint {
    pub(crate) sections: Vec<Section>,
    pub(crate) finishers: Vec<Finisher>,
    pub(crate) summaries: Vec<ArgumentSummary>,
}

/// Walk the entries in declaration order, opening a new section at each header.
pub(crate) fn assemble(entries: Vec<Entry>, add_help: bool) -> Result<Blueprint, ConfigError> {
    let mut checker = Checker::new(add_help);
    let mut sections = vec![Section {
        group: None,
        descriptors: Vec::default(),
    }];
    let mut finishers = Vec::default();
    let mut summaries = Vec::default();

    for entry in entries {
        match entry {
            Entry::Header(group) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Opening section '{}'.", group.title);
                }

                sections.push(Section {
                    group: Some(group),
                    descriptors: Vec::default(),
                });
            }
            Entry::Argument(descriptor) => {
                checker.check(&descriptor)?;
                let section = sections
                    .last_mut()
                    .expect("internal error - the root section must exist");
                summaries.push(ArgumentSummary::new(&descriptor, section.group.as_ref()));

                if let Some(step) = &descriptor.finishing {
                    finishers.push(Finisher::new(descriptor.dest.clone(), step.clone()));
                }

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Emitting {} '{}'.", descriptor.kind, descriptor.dest);
                }

                section.descriptors.push(descriptor);
            }
        }
    }

    Ok(Blueprint {
        sections,
        finishers,
        summaries,
    })
}

// Cross descriptor validation, in declaration order.
struct Checker {
    names: HashMap<String, String>,
    longs: HashMap<String, String>,
    optional_positional: Option<String>,
    variadic_positional: Option<String>,
}

impl Checker {
    fn new(add_help: bool) -> Self {
        let mut longs = HashMap::default();

        if add_help {
            longs.insert("help".to_string(), "help".to_string());
        }

        Self {
            names: HashMap::default(),
            longs,
            optional_positional: None,
            variadic_positional: None,
        }
    }

    fn check(&mut self, descriptor: &Descriptor) -> Result<(), ConfigError> {
        for name in std::iter::once(descriptor.dest.clone()).chain(descriptor.hidden()) {
            if self.names.insert(name.clone(), descriptor.dest.clone()).is_some() {
                return Err(ConfigError::DuplicateName(name));
            }
        }

        for alias in descriptor.aliases() {
            for long in &alias.longs {
                if long.is_empty() || long.starts_with('-') || long.contains('=') {
                    return Err(ConfigError::InvalidName(long.clone()));
                }

                if let Some(first) = self.longs.insert(long.clone(), alias.owner.clone()) {
                    return Err(ConfigError::DuplicateLong {
                        long: long.clone(),
                        first,
                        second: alias.owner.clone(),
                    });
                }
            }

            if alias.assigned.is_none() && alias.longs.is_empty() {
                return Err(ConfigError::NoSpelling(alias.owner.clone()));
            }
        }

        if let Detail::Positional { arity, .. } = &descriptor.detail {
            self.check_positional(descriptor, *arity)?;
        }

        Ok(())
    }

    fn check_positional(&mut self, descriptor: &Descriptor, arity: Arity) -> Result<(), ConfigError> {
        let name = &descriptor.dest;

        if let Some(variadic) = &self.variadic_positional {
            return Err(ConfigError::PositionalOrder {
                name: name.clone(),
                detail: format!("follows the variadic '{variadic}'"),
            });
        }

        if descriptor.required() {
            if let Some(optional) = &self.optional_positional {
                return Err(ConfigError::PositionalOrder {
                    name: name.clone(),
                    detail: format!("is required, but follows the optional '{optional}'"),
                });
            }
        } else if self.optional_positional.is_none() {
            self.optional_positional.replace(name.clone());
        }

        if arity.is_variadic() {
            self.variadic_positional.replace(name.clone());
        }

        Ok(())
    }
}
