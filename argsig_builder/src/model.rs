use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::parser::FileHandle;

/// A typed value produced by parsing (or supplied as a default).
///
/// Every parameter of a command ends up as exactly one `Value` in the [`Namespace`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence of a value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string, kept verbatim.
    Str(String),
    /// A filesystem path.
    Path(PathBuf),
    /// An ordered, variable length sequence (variadics, repeated options).
    List(Vec<Value>),
    /// An ordered, fixed size sequence (tuple shapes).
    Tuple(Vec<Value>),
    /// A member of an [`EnumType`].
    Member(EnumMember),
    /// A structured payload decoded from JSON.
    Json(serde_json::Value),
    /// An open file (or standard stream).
    File(FileHandle),
}

impl Value {
    /// Whether this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The float, if this is a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// The path, if this is a [`Value::Path`].
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(value) => Some(value.as_path()),
            _ => None,
        }
    }

    /// The items, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The items, if this is a [`Value::Tuple`].
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The enum member, if this is a [`Value::Member`].
    pub fn as_member(&self) -> Option<&EnumMember> {
        match self {
            Value::Member(member) => Some(member),
            _ => None,
        }
    }

    /// The decoded payload, if this is a [`Value::Json`].
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The file handle, if this is a [`Value::File`].
    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Value::File(handle) => Some(handle),
            _ => None,
        }
    }

    // Enum members become their underlying value, recursively through sequences.
    pub(crate) fn unwrap_members(self) -> Value {
        match self {
            Value::Member(member) => *member.value,
            Value::List(items) => {
                Value::List(items.into_iter().map(Value::unwrap_members).collect())
            }
            Value::Tuple(items) => {
                Value::Tuple(items.into_iter().map(Value::unwrap_members).collect())
            }
            other => other,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "{value}"),
            Value::Path(value) => write!(f, "{}", value.display()),
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            Value::Member(member) => write!(f, "{}.{}", member.ty.name(), member.name),
            Value::Json(value) => write!(f, "{value}"),
            Value::File(handle) => write!(f, "{handle}"),
        }
    }
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Path(value)
    }
}

impl From<EnumMember> for Value {
    fn from(value: EnumMember) -> Self {
        Value::Member(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// An enumerated-choice type: a name plus ordered members, each carrying an underlying value.
///
/// The string form of each member's underlying value is what the user types on the Cli.
/// After parsing, the token is mapped back onto the member.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::{EnumType, Value};
///
/// let color = EnumType::new("Color")
///     .member("Red", "r")
///     .member("Green", "g");
///
/// let red = color.get("Red").unwrap();
/// assert_eq!(red.as_member().unwrap().value(), &Value::from("r"));
/// assert_eq!(red.to_string(), "Color.Red");
/// ```
#[derive(Clone)]
pub struct EnumType {
    inner: Arc<EnumInner>,
}

#[derive(Debug, Clone, PartialEq)]
struct EnumInner {
    name: String,
    members: Vec<(String, Value)>,
}

impl EnumType {
    /// Create an enum type without members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EnumInner {
                name: name.into(),
                members: Vec::default(),
            }),
        }
    }

    /// Add a member.
    /// Members keep their declaration order, which is also the order of the Cli choices.
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.inner)
            .members
            .push((name.into(), value.into()));
        self
    }

    /// The name of the type.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The members, in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner
            .members
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Build the [`Value::Member`] for the member called `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner
            .members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(member, value)| self.wrap(member, value))
    }

    pub(crate) fn by_value(&self, value: &Value) -> Option<Value> {
        self.inner
            .members
            .iter()
            .find(|(_, underlying)| underlying == value)
            .map(|(member, underlying)| self.wrap(member, underlying))
    }

    fn wrap(&self, member: &str, value: &Value) -> Value {
        Value::Member(EnumMember {
            ty: self.clone(),
            name: member.to_string(),
            value: Box::new(value.clone()),
        })
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl std::fmt::Debug for EnumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnumType({})", self.inner.name)
    }
}

/// A member of an [`EnumType`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    ty: EnumType,
    name: String,
    value: Box<Value>,
}

impl EnumMember {
    /// The type this member belongs to.
    pub fn enum_type(&self) -> &EnumType {
        &self.ty
    }

    /// The member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The parsed fields of a command, keyed by destination and kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    fields: Vec<(String, Value)>,
}

impl Namespace {
    /// Get the value of a destination.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == dest)
            .map(|(_, value)| value)
    }

    pub(crate) fn get_mut(&mut self, dest: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == dest)
            .map(|(_, value)| value)
    }

    /// Whether the destination is present.
    pub fn contains(&self, dest: &str) -> bool {
        self.get(dest).is_some()
    }

    /// Set the value of a destination, replacing any previous value in place.
    pub fn insert(&mut self, dest: impl Into<String>, value: Value) {
        let dest = dest.into();
        match self.get_mut(&dest) {
            Some(existing) => *existing = value,
            None => self.fields.push((dest, value)),
        }
    }

    /// Take the value of a destination out of the namespace.
    pub fn remove(&mut self, dest: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(name, _)| name == dest)?;
        Some(self.fields.remove(index).1)
    }

    /// The destinations, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(destination, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The number of destinations.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no destinations.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Namespace {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
