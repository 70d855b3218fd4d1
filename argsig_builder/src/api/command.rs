use std::env;
use std::process::ExitCode;

use crate::api::{Parameter, ParameterKind};
use crate::compiler::Grammar;
use crate::model::{Namespace, Value};
use crate::parser::{GeneralParser, ParseError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// What a handler hands back, mapped onto a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Success (`0`).
    Done,
    /// The exact exit status.
    Status(i32),
    /// `0` when true, `1` otherwise.
    Truth(bool),
}

impl Outcome {
    /// The exit status.
    pub fn code(&self) -> i32 {
        match self {
            Outcome::Done => 0,
            Outcome::Status(code) => *code,
            Outcome::Truth(true) => 0,
            Outcome::Truth(false) => 1,
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Done
    }
}

impl From<i32> for Outcome {
    fn from(code: i32) -> Self {
        Outcome::Status(code)
    }
}

impl From<bool> for Outcome {
    fn from(truth: bool) -> Self {
        Outcome::Truth(truth)
    }
}

fn exit_code(code: i32) -> ExitCode {
    // Only the low byte survives on most platforms.
    ExitCode::from((code & 0xff) as u8)
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        exit_code(outcome.code())
    }
}

/// The finished values, laid out the way the handler's parameters were declared.
///
/// Positional parameters come first, in order, with the variadic values flattened onto the end.
/// Keyword parameters are bound by name.
/// Headers bind nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invocation {
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl Invocation {
    pub(crate) fn bind(parameters: &[Parameter], mut namespace: Namespace) -> Self {
        let mut invocation = Invocation::default();

        for parameter in parameters.iter().filter(|parameter| !parameter.is_header()) {
            let value = namespace.remove(&parameter.name).unwrap_or(Value::None);

            match parameter.kind {
                ParameterKind::Header => {}
                ParameterKind::Positional => invocation.positional.push(value),
                ParameterKind::Variadic => match value {
                    Value::List(values) => invocation.positional.extend(values),
                    other => invocation.positional.push(other),
                },
                ParameterKind::Keyword => {
                    invocation.keywords.push((parameter.name.clone(), value));
                }
            }
        }

        invocation
    }

    /// The positional values, variadic values included.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The keyword values, in declaration order.
    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }

    /// The keyword value for a parameter name.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(keyword, _)| keyword == name)
            .map(|(_, value)| value)
    }

    /// Take the positional and keyword values.
    pub fn into_parts(self) -> (Vec<Value>, Vec<(String, Value)>) {
        (self.positional, self.keywords)
    }
}

/// A command line parser bound to the handler it invokes.
/// Built via [`CommandLineParser::build_command`](crate::CommandLineParser::build_command).
pub struct Command<F> {
    parser: GeneralParser,
    parameters: Vec<Parameter>,
    handler: F,
}

impl<F, O> Command<F>
where
    F: Fn(Invocation) -> O,
    O: Into<Outcome>,
{
    pub(crate) fn new(parser: GeneralParser, parameters: Vec<Parameter>, handler: F) -> Self {
        Self {
            parser,
            parameters,
            handler,
        }
    }

    /// The compiled grammar behind this command.
    pub fn grammar(&self) -> &Grammar {
        self.parser.grammar()
    }

    /// Invoke the handler with an already finished namespace.
    pub fn call(&self, namespace: Namespace) -> Outcome {
        let invocation = Invocation::bind(&self.parameters, namespace);

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Invoking with {invocation:?}.");
        }

        (self.handler)(invocation).into()
    }

    /// Parse the tokens and, only when they parse, invoke the handler.
    ///
    /// ### Example
    /// ```
    /// # use argsig_builder as argsig;
    /// use argsig::{CommandLineParser, Invocation, Outcome, Parameter};
    ///
    /// let command = CommandLineParser::new("program")
    ///     .add(Parameter::positional("name"))
    ///     .add(Parameter::keyword("loud").default_value(false))
    ///     .build_command(|invocation: Invocation| {
    ///         invocation.keyword("loud").and_then(|v| v.as_bool()) == Some(true)
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(command.run(&["world", "--loud"]).unwrap(), Outcome::Truth(true));
    /// assert_eq!(command.run(&["world"]).unwrap().code(), 1);
    /// assert!(command.run(&[]).is_err());
    /// ```
    pub fn run(&self, tokens: &[&str]) -> Result<Outcome, ParseError> {
        let namespace = self.parser.grammar().parse_tokens(tokens)?;
        Ok(self.call(namespace))
    }

    /// Run the command against the Cli [`env::args`].
    ///
    /// Parse errors (and help requests) are reported through the parser's user interface, and the handler is skipped.
    pub fn main(&self) -> ExitCode {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = command_input.iter().map(AsRef::as_ref).collect();

        match self.parser.parse_tokens(&tokens) {
            Ok(namespace) => self.call(namespace).into(),
            Err(code) => exit_code(code),
        }
    }
}
