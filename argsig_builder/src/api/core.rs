use terminal_size::{terminal_size, Width};

use crate::api::{Command, Invocation, Outcome, Parameter};
use crate::compiler::{compile, Grammar, Settings};
use crate::parser::{ConfigError, ConsoleInterface, GeneralParser, UserInterface};

const DEFAULT_TERM_WIDTH: usize = 100;

/// The base command line parser.
///
/// Parameters are added in declaration order, which is significant:
/// positional arguments are matched in that order, and automatic short options are handed out first come, first served.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::{CommandLineParser, Parameter, Shape, Value};
///
/// let parser = CommandLineParser::new("program")
///     .add(Parameter::positional("pattern"))
///     .add(Parameter::variadic("files"))
///     .add(Parameter::keyword("verbose").shape(Shape::Count))
///     .build();
///
/// let namespace = parser.parse_tokens(&["foo", "a.txt", "-vv"]).unwrap();
/// assert_eq!(namespace.get("pattern"), Some(&Value::from("foo")));
/// assert_eq!(namespace.get("files"), Some(&Value::from(vec!["a.txt"])));
/// assert_eq!(namespace.get("verbose"), Some(&Value::Int(2)));
/// ```
#[derive(Debug, Clone)]
pub struct CommandLineParser {
    program: String,
    about: Option<String>,
    add_help: bool,
    term_width: Option<usize>,
    parameters: Vec<Parameter>,
}

impl CommandLineParser {
    /// Create a command line parser.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            add_help: true,
            term_width: None,
            parameters: Vec::default(),
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final about message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Whether to add the `-h/--help` switch (default: `true`).
    pub fn add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;
        self
    }

    /// The width to wrap the help message at (default: the terminal width).
    pub fn term_width(mut self, term_width: usize) -> Self {
        self.term_width.replace(term_width);
        self
    }

    /// Add a parameter to the command line parser.
    pub fn add(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    fn settings(&self) -> Settings {
        let term_width = self.term_width.unwrap_or_else(|| {
            if let Some((Width(terminal_width), _)) = terminal_size() {
                terminal_width as usize
            } else {
                DEFAULT_TERM_WIDTH
            }
        });

        Settings {
            program: self.program.clone(),
            about: self.about.clone(),
            add_help: self.add_help,
            term_width,
        }
    }

    /// Compile the parameters into a grammar.
    /// This finalizes the configuration and checks for errors (ex: a contested short option).
    ///
    /// Compiling the same parameters again yields the same grammar.
    pub fn compile(&self) -> Result<Grammar, ConfigError> {
        compile(self.settings(), &self.parameters)
    }

    pub(crate) fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<GeneralParser, ConfigError> {
        let grammar = self.compile()?;
        Ok(GeneralParser::new(grammar, user_interface))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a contested short option).
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::default()))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a contested short option).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        match self.build_parser() {
            Ok(gp) => gp,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    /// Build a command: the parser bound to the handler it invokes.
    ///
    /// ### Example
    /// ```
    /// # use argsig_builder as argsig;
    /// use argsig::{CommandLineParser, Invocation, Outcome, Parameter};
    ///
    /// let command = CommandLineParser::new("program")
    ///     .add(Parameter::variadic("numbers").default_value(vec![0]))
    ///     .build_command(|invocation: Invocation| {
    ///         let total: i64 = invocation.positional().iter().filter_map(|v| v.as_int()).sum();
    ///         Outcome::Status(total as i32)
    ///     })
    ///     .unwrap();
    /// # let _ = command;
    /// ```
    pub fn build_command<F, O>(self, handler: F) -> Result<Command<F>, ConfigError>
    where
        F: Fn(Invocation) -> O,
        O: Into<Outcome>,
    {
        let parameters = self.parameters.clone();
        let parser = self.build_parser()?;
        Ok(Command::new(parser, parameters, handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Arg, Shape};
    use crate::model::Value;
    use crate::parser::util::InMemoryInterface;
    use crate::test::assert_contains;

    #[test]
    fn compile_empty() {
        // Setup
        let clp = CommandLineParser::new("program");

        // Execute
        let grammar = clp.compile().unwrap();

        // Verify
        assert_eq!(grammar.program(), "program");
        assert!(grammar.arguments().is_empty());
        assert!(grammar.parse_tokens(&[]).unwrap().is_empty());
    }

    #[test]
    fn about() {
        let grammar = CommandLineParser::new("program")
            .about("--this will get discarded--")
            .about("My program that does awesome stuff.")
            .term_width(80)
            .compile()
            .unwrap();

        let help = grammar.render_help();

        assert_contains!(help, "My program that does awesome stuff.");
        assert!(!help.contains("discarded"));
    }

    #[test]
    fn term_width() {
        // Setup
        let help = "word ".repeat(30);
        let grammar = CommandLineParser::new("program")
            .term_width(40)
            .add(Parameter::keyword("value").arg(Arg::with_default(0).help(help.trim_end())))
            .compile()
            .unwrap();

        // Execute
        let rendered = grammar.render_help();

        // Verify
        for line in rendered.lines() {
            assert!(line.len() <= 40, "'{line}' exceeds 40 columns");
        }
    }

    #[test]
    fn add_help_disabled() {
        let grammar = CommandLineParser::new("program")
            .add_help(false)
            .add(Parameter::keyword("host").default_value("localhost"))
            .compile()
            .unwrap();

        assert_eq!(grammar.short("host"), Some('h'));
    }

    #[test]
    fn build_parser_invalid() {
        let result = CommandLineParser::new("program")
            .add(Parameter::keyword("value").default_value(0))
            .add(Parameter::keyword("value").default_value(1))
            .build_parser();

        assert_matches!(result.err(), Some(ConfigError::DuplicateName(name)) if name == "value");
    }

    #[test]
    fn build_with_interface() {
        // Setup
        let interface = Box::new(InMemoryInterface::default());
        let parser = CommandLineParser::new("program")
            .add(Parameter::keyword("items").shape(Shape::append(Shape::int())))
            .build_with_interface(interface)
            .unwrap();

        // Execute
        let namespace = parser.parse_tokens(&["-i", "1", "--items", "2"]).unwrap();

        // Verify
        assert_eq!(namespace.get("items"), Some(&Value::from(vec![1, 2])));
    }
}
