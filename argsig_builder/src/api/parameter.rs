use crate::api::{Arg, Shape};
use crate::model::Value;

/// How a parameter is bound when the handler is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Bound by position; becomes a positional argument.
    Positional,
    /// Collects the remaining positional values; becomes a variadic argument.
    Variadic,
    /// Bound by name; becomes an option, flag, or choice group.
    Keyword,
    /// Opens a help section for the parameters that follow it.
    Header,
}

/// A single parameter of a command.
///
/// The kind decides whether the parameter is a positional argument or an option.
/// The shape (declared, or inferred from the default) decides everything else.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::{CommandLineParser, Parameter, Shape, Value};
///
/// let grammar = CommandLineParser::new("program")
///     .add(Parameter::positional("count").shape(Shape::int()))
///     .add(Parameter::keyword("dry_run").default_value(false))
///     .compile()
///     .unwrap();
///
/// let namespace = grammar.parse_tokens(&["3", "--dry-run"]).unwrap();
/// assert_eq!(namespace.get("count"), Some(&Value::Int(3)));
/// assert_eq!(namespace.get("dry_run"), Some(&Value::Bool(true)));
/// ```
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) kind: ParameterKind,
    pub(crate) shape: Option<Shape>,
    pub(crate) default: Option<Value>,
    pub(crate) arg: Option<Arg>,
}

impl Parameter {
    fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: None,
            default: None,
            arg: None,
        }
    }

    /// A positional-or-keyword parameter.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Positional)
    }

    /// A variadic positional parameter.
    pub fn variadic(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Variadic)
    }

    /// A keyword-only parameter.
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Keyword)
    }

    /// A help section header.
    ///
    /// The section title is the name with its surrounding underscores stripped, and inner underscores as spaces.
    /// A string default becomes the section description.
    /// Any parameter whose name starts and ends with `_` is also treated as a header.
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Header)
    }

    /// Declare the shape.
    pub fn shape(mut self, shape: impl Into<Shape>) -> Self {
        self.shape.replace(shape.into());
        self
    }

    /// Set the default.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default.replace(default.into());
        self
    }

    /// Attach explicit configuration.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.arg.replace(arg);
        self
    }

    /// The name (and destination).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Whether this parameter opens a help section.
    pub fn is_header(&self) -> bool {
        self.kind == ParameterKind::Header
            || (self.name.len() >= 2 && self.name.starts_with('_') && self.name.ends_with('_'))
    }
}
