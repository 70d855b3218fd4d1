//! Builder module for `argsig`.
//! See the `argsig` crate root for full details.
#![deny(missing_docs)]
mod api;
mod compiler;
mod model;
mod parser;

pub use api::*;
pub use compiler::{ArgKind, ArgumentSummary, Grammar, Group};
pub use model::*;
pub use parser::{
    ConfigError, ConsoleInterface, FileHandle, FileMode, GeneralParser, ParseError, UserInterface,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
