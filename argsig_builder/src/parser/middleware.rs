use std::env;

use crate::compiler::Grammar;
use crate::model::Namespace;
use crate::parser::interface::UserInterface;

/// The configured command line parser.
/// Built via [`CommandLineParser::build`](crate::CommandLineParser::build).
pub struct GeneralParser {
    grammar: Grammar,
    user_interface: Box<dyn UserInterface>,
}

impl GeneralParser {
    pub(crate) fn new(grammar: Grammar, user_interface: Box<dyn UserInterface>) -> Self {
        Self {
            grammar,
            user_interface,
        }
    }

    /// The compiled grammar behind this parser.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Run the command line parser against the input tokens.
    ///
    /// Parsing happens in two phases:
    /// 1. Token matching aligns the tokens to arguments and options, converting each value as it goes.
    /// All tokens must be matched successfully in order to proceed to the next phase.
    /// 2. Finishing reshapes the matched values (ex: enum members, tuples, levels).
    ///
    /// If at any point the parser encounters an error (ex: un-matched token, un-convertable token, etc), it reports it through the user interface and returns with `Err(2)`.
    ///
    /// If the help switch (`-h` or `--help`) is encountered, the parser will display the help message and return with `Err(0)`.
    /// This skips the finishing phase.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Namespace, i32> {
        match self.grammar.parse_tokens(tokens) {
            Ok(namespace) => Ok(namespace),
            Err(error) => {
                let exit_code = error.exit_code();

                if error.use_stderr() {
                    self.user_interface.print_error(error);
                } else {
                    self.user_interface
                        .print(error.to_string().trim_end().to_string());
                }

                Err(exit_code)
            }
        }
    }

    /// Run the command line parser against the Cli [`env::args`].
    ///
    /// See [`GeneralParser::parse_tokens`].
    /// On error, exits with the reported exit code (via [`std::process::exit`]).
    pub fn parse(&self) -> Namespace {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(namespace) => namespace,
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        }
    }
}
