use std::path::PathBuf;
use std::sync::Arc;

use crate::model::{EnumType, Value};
use crate::parser::FileMode;

/// The plain, single token scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// A verbatim string.
    Str,
    /// A signed integer.
    Int,
    /// A floating point number.
    Float,
    /// A boolean (`true`/`false`, `yes`/`no`, `1`/`0`).
    Bool,
    /// A filesystem path.
    Path,
}

impl Scalar {
    /// Convert a single token.
    ///
    /// ### Example
    /// ```
    /// # use argsig_builder as argsig;
    /// use argsig::{Scalar, Value};
    ///
    /// assert_eq!(Scalar::Int.convert("7"), Ok(Value::Int(7)));
    /// assert!(Scalar::Int.convert("seven").is_err());
    /// ```
    pub fn convert(&self, token: &str) -> Result<Value, String> {
        match self {
            Scalar::Str => Ok(Value::Str(token.to_string())),
            Scalar::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("invalid int value: '{token}'")),
            Scalar::Float => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("invalid float value: '{token}'")),
            Scalar::Bool => match token.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("invalid bool value: '{token}'")),
            },
            Scalar::Path => Ok(Value::Path(PathBuf::from(token))),
        }
    }

    /// The scalar type of a value, if it is a plain scalar.
    pub fn of(value: &Value) -> Option<Scalar> {
        match value {
            Value::Str(_) => Some(Scalar::Str),
            Value::Int(_) => Some(Scalar::Int),
            Value::Float(_) => Some(Scalar::Float),
            Value::Bool(_) => Some(Scalar::Bool),
            Value::Path(_) => Some(Scalar::Path),
            _ => None,
        }
    }

    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int | Scalar::Float)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scalar::Str => "str",
            Scalar::Int => "int",
            Scalar::Float => "float",
            Scalar::Bool => "bool",
            Scalar::Path => "path",
        };
        write!(f, "{name}")
    }
}

/// The declared shape of a parameter.
///
/// The shape decides how many tokens a parameter takes, how each token is converted, and how the result is finished.
/// When a parameter has no shape, it is inferred from the default.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A single converted token.
    Scalar(Scalar),
    /// One of the members of an enumerated type, chosen by the string form of its underlying value.
    Enum(EnumType),
    /// A fixed number of tokens, each converted independently and collected into a [`Value::Tuple`].
    Tuple(Vec<Shape>),
    /// A flag counting its occurrences.
    Count,
    /// A pair of flags, counting up and down from the default.
    Level,
    /// A [`Shape::Level`] spelled `-v/--verbose` and `-q/--quiet`.
    Verbosity,
    /// An option accumulating each occurrence.
    Append(Box<Shape>),
    /// A variadic (or positional) requiring at least one token.
    OneOrMore(Box<Shape>),
    /// All remaining tokens, verbatim.
    Remainder,
    /// A token decoded as JSON.
    Json,
    /// A token naming a file, opened with the mode.
    File(FileMode),
    /// A fixed set of string literals.
    Literal(Vec<String>),
}

impl Shape {
    /// [`Scalar::Str`].
    pub fn str() -> Self {
        Shape::Scalar(Scalar::Str)
    }

    /// [`Scalar::Int`].
    pub fn int() -> Self {
        Shape::Scalar(Scalar::Int)
    }

    /// [`Scalar::Float`].
    pub fn float() -> Self {
        Shape::Scalar(Scalar::Float)
    }

    /// [`Scalar::Bool`].
    pub fn bool() -> Self {
        Shape::Scalar(Scalar::Bool)
    }

    /// [`Scalar::Path`].
    pub fn path() -> Self {
        Shape::Scalar(Scalar::Path)
    }

    /// An [`Shape::Append`] of `inner`.
    pub fn append(inner: Shape) -> Self {
        Shape::Append(Box::new(inner))
    }

    /// A [`Shape::OneOrMore`] of `inner`.
    pub fn one_or_more(inner: Shape) -> Self {
        Shape::OneOrMore(Box::new(inner))
    }

    /// A [`Shape::Literal`] over `literals`.
    pub fn literal<S: Into<String>>(literals: impl IntoIterator<Item = S>) -> Self {
        Shape::Literal(literals.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for Shape {
    fn from(value: Scalar) -> Self {
        Shape::Scalar(value)
    }
}

impl From<EnumType> for Shape {
    fn from(value: EnumType) -> Self {
        Shape::Enum(value)
    }
}

impl From<FileMode> for Shape {
    fn from(value: FileMode) -> Self {
        Shape::File(value)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Scalar(scalar) => write!(f, "{scalar}"),
            Shape::Enum(enum_type) => write!(f, "Enum[{}]", enum_type.name()),
            Shape::Tuple(elements) => {
                let elements: Vec<String> = elements.iter().map(ToString::to_string).collect();
                write!(f, "Tuple[{}]", elements.join(", "))
            }
            Shape::Count => write!(f, "Count"),
            Shape::Level => write!(f, "Level"),
            Shape::Verbosity => write!(f, "Verbosity"),
            Shape::Append(inner) => write!(f, "Append[{inner}]"),
            Shape::OneOrMore(inner) => write!(f, "OneOrMore[{inner}]"),
            Shape::Remainder => write!(f, "Remainder"),
            Shape::Json => write!(f, "JSON"),
            Shape::File(mode) => write!(f, "File[{mode}]"),
            Shape::Literal(literals) => {
                let literals: Vec<String> = literals.iter().map(|l| format!("'{l}'")).collect();
                write!(f, "Literal[{}]", literals.join(", "))
            }
        }
    }
}

/// A user supplied conversion, overriding the one inferred from the shape.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::{Converter, Value};
///
/// let upper = Converter::new("upper", |token: &str| -> Result<String, String> {
///     Ok(token.to_uppercase())
/// });
/// assert_eq!(upper.convert("abc"), Ok(Value::from("ABC")));
/// ```
#[derive(Clone)]
pub struct Converter {
    name: String,
    func: Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>,
}

impl Converter {
    /// Create a converter from a named function.
    pub fn new<V, E, F>(name: impl Into<String>, func: F) -> Self
    where
        V: Into<Value>,
        E: std::fmt::Display,
        F: Fn(&str) -> Result<V, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |token| {
                func(token)
                    .map(Into::into)
                    .map_err(|error| error.to_string())
            }),
        }
    }

    /// The name of the converter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convert a single token.
    pub fn convert(&self, token: &str) -> Result<Value, String> {
        (self.func)(token)
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Converter({})", self.name)
    }
}
