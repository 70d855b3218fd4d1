use crate::api::Converter;
use crate::model::Value;

/// How a short option is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Short {
    /// Proposed from the first letter of the name, if it's still free.
    #[default]
    Auto,
    /// Reserved explicitly; a collision fails the build.
    Explicit(char),
    /// No short option.
    Suppressed,
}

/// Explicit configuration for a single parameter.
///
/// Everything is optional; anything left unset is inferred from the parameter's name, shape, and default.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::{Arg, CommandLineParser, Parameter, Shape, Value};
///
/// let grammar = CommandLineParser::new("grep")
///     .add(Parameter::keyword("before").shape(Shape::int()).arg(
///         Arg::with_default(0).short('B').metavar("N"),
///     ))
///     .compile()
///     .unwrap();
///
/// let namespace = grammar.parse_tokens(&["-B", "3"]).unwrap();
/// assert_eq!(namespace.get("before"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arg {
    pub(crate) default: Option<Value>,
    pub(crate) short: Short,
    pub(crate) long: Option<Vec<String>>,
    pub(crate) negate_prefix: Option<String>,
    pub(crate) converter: Option<Converter>,
    pub(crate) help: Option<String>,
    pub(crate) metavar: Option<String>,
    pub(crate) shorts: Vec<(String, char)>,
    pub(crate) longs: Vec<(String, Vec<String>)>,
    pub(crate) up_short: Short,
    pub(crate) up_long: Option<Vec<String>>,
    pub(crate) down_short: Short,
    pub(crate) down_long: Option<Vec<String>>,
    pub(crate) min: Option<i64>,
    pub(crate) max: Option<i64>,
}

impl Arg {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration carrying a default.
    pub fn with_default(default: impl Into<Value>) -> Self {
        Self::default().default_value(default)
    }

    /// Set the default.
    /// If repeated, only the final default will apply.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default.replace(default.into());
        self
    }

    /// Reserve a short option.
    pub fn short(mut self, short: char) -> Self {
        self.short = Short::Explicit(short);
        self
    }

    /// Opt out of a short option.
    pub fn no_short(mut self) -> Self {
        self.short = Short::Suppressed;
        self
    }

    /// Set the long options (without the `--` prefix).
    /// An empty list means the option has no long form.
    pub fn long<S: Into<String>>(mut self, longs: impl IntoIterator<Item = S>) -> Self {
        self.long
            .replace(longs.into_iter().map(Into::into).collect());
        self
    }

    /// Drop the long form.
    pub fn no_long(self) -> Self {
        self.long(Vec::<String>::default())
    }

    /// The prefix of the long option of a flag that defaults to `true` (default `"no-"`).
    pub fn negate_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.negate_prefix.replace(prefix.into());
        self
    }

    /// Override the token conversion.
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter.replace(converter);
        self
    }

    /// Document the parameter.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help.replace(help.into());
        self
    }

    /// The display name of the value in the help message.
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar.replace(metavar.into());
        self
    }

    /// Reserve a short option for one literal of a choice group.
    pub fn choice_short(mut self, literal: impl Into<String>, short: char) -> Self {
        self.shorts.push((literal.into(), short));
        self
    }

    /// Set the long options for one literal of a choice group.
    pub fn choice_long<S: Into<String>>(
        mut self,
        literal: impl Into<String>,
        longs: impl IntoIterator<Item = S>,
    ) -> Self {
        self.longs
            .push((literal.into(), longs.into_iter().map(Into::into).collect()));
        self
    }

    /// Reserve the short option counting a level up.
    pub fn up_short(mut self, short: char) -> Self {
        self.up_short = Short::Explicit(short);
        self
    }

    /// Set the long options counting a level up.
    pub fn up_long<S: Into<String>>(mut self, longs: impl IntoIterator<Item = S>) -> Self {
        self.up_long
            .replace(longs.into_iter().map(Into::into).collect());
        self
    }

    /// Reserve the short option counting a level down.
    pub fn down_short(mut self, short: char) -> Self {
        self.down_short = Short::Explicit(short);
        self
    }

    /// Set the long options counting a level down.
    pub fn down_long<S: Into<String>>(mut self, longs: impl IntoIterator<Item = S>) -> Self {
        self.down_long
            .replace(longs.into_iter().map(Into::into).collect());
        self
    }

    /// The lowest value a level reaches.
    pub fn min(mut self, min: i64) -> Self {
        self.min.replace(min);
        self
    }

    /// The highest value a level reaches.
    pub fn max(mut self, max: i64) -> Self {
        self.max.replace(max);
        self
    }
}
