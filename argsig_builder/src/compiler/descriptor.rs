use crate::api::{Arg, Parameter, ParameterKind, Short};
use crate::compiler::finish::Step;
use crate::compiler::resolve::{infer, resolve, unsupported, Conversion, Form, LevelStyle};
use crate::model::Value;
use crate::parser::ConfigError;

const NEGATE_PREFIX: &str = "no-";

/// The kind of a compiled argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// A single positional argument (or a fixed number of tokens, for tuples).
    Positional,
    /// The trailing positional values.
    VariadicPositional,
    /// An option taking a value.
    Option,
    /// A boolean switch.
    Flag,
    /// A switch counting its occurrences.
    CountFlag,
    /// A pair of switches counting up and down.
    LevelFlag,
    /// An option accumulating each occurrence.
    AppendOption,
    /// Mutually exclusive switches, one per literal.
    ChoiceGroup,
    /// Switches, one per literal, accumulating each occurrence.
    AppendChoiceGroup,
}

impl std::fmt::Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArgKind::Positional => "positional",
            ArgKind::VariadicPositional => "variadic positional",
            ArgKind::Option => "option",
            ArgKind::Flag => "flag",
            ArgKind::CountFlag => "count flag",
            ArgKind::LevelFlag => "level flag",
            ArgKind::AppendOption => "append option",
            ArgKind::ChoiceGroup => "choice group",
            ArgKind::AppendChoiceGroup => "append choice group",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ValueSpec {
    pub(crate) conversion: Option<Conversion>,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) metavar: Option<String>,
    pub(crate) numeric: bool,
}

/// The spellings of a single switch: a short slot (filled by the allocator) plus its long options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Alias {
    pub(crate) owner: String,
    pub(crate) request: Short,
    pub(crate) proposal: Option<char>,
    pub(crate) assigned: Option<char>,
    pub(crate) longs: Vec<String>,
}

impl Alias {
    fn new(owner: impl Into<String>, request: Short, proposal: Option<char>, longs: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            request,
            proposal: proposal.filter(char::is_ascii_alphanumeric),
            assigned: None,
            longs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Exactly(usize),
    Any,
    AtLeastOne,
    Remainder,
}

impl Arity {
    pub(crate) fn is_variadic(&self) -> bool {
        !matches!(self, Arity::Exactly(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Detail {
    Positional {
        value: ValueSpec,
        arity: Arity,
        default: Option<Value>,
    },
    Option {
        value: ValueSpec,
        tokens: usize,
        default: Option<Value>,
        alias: Alias,
    },
    Flag {
        default: bool,
        alias: Alias,
    },
    Count {
        start: i64,
        alias: Alias,
    },
    Level {
        start: i64,
        up: Alias,
        down: Alias,
    },
    Append {
        value: ValueSpec,
        default: Option<Value>,
        alias: Alias,
    },
    Choice {
        append: bool,
        literals: Vec<(String, Alias)>,
        default: Option<Value>,
    },
}

/// The compiled behaviour of one parameter.
#[derive(Debug, Clone)]
pub(crate) struct Descriptor {
    pub(crate) dest: String,
    pub(crate) kind: ArgKind,
    pub(crate) help: Option<String>,
    pub(crate) finishing: Option<Step>,
    pub(crate) detail: Detail,
}

impl Descriptor {
    pub(crate) fn build(parameter: &Parameter) -> Result<Self, ConfigError> {
        let name = parameter.name.as_str();
        validate_name(name)?;
        let empty = Arg::default();
        let arg = parameter.arg.as_ref().unwrap_or(&empty);

        let raw_default = match (&parameter.default, &arg.default) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Overspecified {
                    name: name.to_string(),
                    detail: "default given both on the parameter and in its Arg".to_string(),
                });
            }
            (Some(default), None) | (None, Some(default)) => Some(default),
            (None, None) => None,
        };
        let keyword = parameter.kind == ParameterKind::Keyword;
        let shape = match &parameter.shape {
            Some(shape) => shape.clone(),
            None => match (parameter.kind, raw_default) {
                (ParameterKind::Variadic, Some(Value::List(items))) => infer(name, items.first())?,
                (_, default) => infer(name, default)?,
            },
        };
        let resolution = resolve(name, &shape, arg.converter.as_ref(), keyword)?;
        let numeric = resolution.is_numeric();
        let mut finishing = resolution.finishing;
        let default = raw_default.cloned().map(Value::unwrap_members);
        let value = ValueSpec {
            conversion: resolution.conversion,
            choices: resolution.choices,
            metavar: arg.metavar.clone(),
            numeric,
        };
        let dest = name.to_string();

        let (kind, detail) = match (parameter.kind, resolution.form) {
            (ParameterKind::Positional, Form::Value) => {
                validate_choice(name, value.choices.as_ref(), default.as_ref())?;
                (
                    ArgKind::Positional,
                    Detail::Positional {
                        value,
                        arity: Arity::Exactly(1),
                        default,
                    },
                )
            }
            (ParameterKind::Positional, Form::Tuple(size)) => {
                validate_tuple(name, size, default.as_ref())?;
                (
                    ArgKind::Positional,
                    Detail::Positional {
                        value,
                        arity: Arity::Exactly(size),
                        default,
                    },
                )
            }
            (ParameterKind::Positional, Form::OneOrMore) => (
                ArgKind::Positional,
                Detail::Positional {
                    value,
                    arity: Arity::AtLeastOne,
                    default: variadic_default(name, Arity::AtLeastOne, default)?,
                },
            ),
            (ParameterKind::Positional, Form::Remainder) => (
                ArgKind::Positional,
                Detail::Positional {
                    value,
                    arity: Arity::Remainder,
                    default: variadic_default(name, Arity::Remainder, default)?,
                },
            ),
            (ParameterKind::Variadic, form @ (Form::Value | Form::OneOrMore | Form::Remainder)) => {
                let arity = match form {
                    Form::Value => Arity::Any,
                    Form::OneOrMore => Arity::AtLeastOne,
                    _ => Arity::Remainder,
                };
                let default = variadic_default(name, arity, default)?;
                validate_choice(name, value.choices.as_ref(), default.as_ref())?;
                (
                    ArgKind::VariadicPositional,
                    Detail::Positional {
                        value,
                        arity,
                        default,
                    },
                )
            }
            (ParameterKind::Keyword, Form::Value) => {
                validate_choice(name, value.choices.as_ref(), default.as_ref())?;
                (
                    ArgKind::Option,
                    Detail::Option {
                        value,
                        tokens: 1,
                        default,
                        alias: option_alias(name, arg, first_letter(name)),
                    },
                )
            }
            (ParameterKind::Keyword, Form::Tuple(size)) => {
                validate_tuple(name, size, default.as_ref())?;
                (
                    ArgKind::Option,
                    Detail::Option {
                        value,
                        tokens: size,
                        default,
                        alias: option_alias(name, arg, first_letter(name)),
                    },
                )
            }
            (ParameterKind::Keyword, Form::Flag) => {
                let default = match default {
                    None | Some(Value::None) => false,
                    Some(Value::Bool(default)) => default,
                    Some(other) => return Err(invalid_default(name, &other, "a bool")),
                };
                let proposal = first_letter(name).map(|letter| {
                    if default {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    }
                });
                let longs = match &arg.long {
                    Some(longs) => longs.clone(),
                    None if default => {
                        let prefix = arg.negate_prefix.as_deref().unwrap_or(NEGATE_PREFIX);
                        vec![format!("{prefix}{}", kebab(name))]
                    }
                    None => default_longs(name),
                };
                (
                    ArgKind::Flag,
                    Detail::Flag {
                        default,
                        alias: Alias::new(name, arg.short, proposal, longs),
                    },
                )
            }
            (ParameterKind::Keyword, Form::Count) => (
                ArgKind::CountFlag,
                Detail::Count {
                    start: counter_start(name, default.as_ref())?,
                    alias: option_alias(name, arg, first_letter(name)),
                },
            ),
            (ParameterKind::Keyword, Form::Level(style)) => {
                let start = counter_start(name, default.as_ref())?;
                let (up, down) = level_aliases(name, arg, style);
                finishing.replace(Step::Level {
                    up: up.owner.clone(),
                    down: down.owner.clone(),
                    start,
                    min: arg.min,
                    max: arg.max,
                });
                (ArgKind::LevelFlag, Detail::Level { start, up, down })
            }
            (ParameterKind::Keyword, Form::Append) => {
                let default = match default {
                    None => None,
                    Some(Value::List(items)) => {
                        for item in &items {
                            validate_choice(name, value.choices.as_ref(), Some(item))?;
                        }
                        Some(Value::List(items))
                    }
                    Some(other) => return Err(invalid_default(name, &other, "a list")),
                };
                (
                    ArgKind::AppendOption,
                    Detail::Append {
                        value,
                        default,
                        alias: option_alias(name, arg, first_letter(name)),
                    },
                )
            }
            (ParameterKind::Keyword, Form::Choices(literals)) => {
                let default = match default {
                    None => None,
                    Some(Value::Str(literal)) if literals.contains(&literal) => {
                        Some(Value::Str(literal))
                    }
                    Some(Value::None) => Some(Value::None),
                    Some(other) => {
                        return Err(invalid_default(name, &other, &one_of(&literals)));
                    }
                };
                (
                    ArgKind::ChoiceGroup,
                    Detail::Choice {
                        append: false,
                        literals: choice_aliases(name, arg, &literals),
                        default,
                    },
                )
            }
            (ParameterKind::Keyword, Form::AppendChoices(literals)) => {
                let default = match default {
                    None => None,
                    Some(Value::List(items))
                        if items.iter().all(|item| {
                            matches!(item, Value::Str(literal) if literals.contains(literal))
                        }) =>
                    {
                        Some(Value::List(items))
                    }
                    Some(other) => {
                        return Err(invalid_default(
                            name,
                            &other,
                            &format!("a list of {}", one_of(&literals)),
                        ));
                    }
                };
                (
                    ArgKind::AppendChoiceGroup,
                    Detail::Choice {
                        append: true,
                        literals: choice_aliases(name, arg, &literals),
                        default,
                    },
                )
            }
            _ => return Err(unsupported(name, &shape)),
        };

        Ok(Self {
            dest,
            kind,
            help: arg.help.clone(),
            finishing,
            detail,
        })
    }

    /// Whether the grammar must see this argument.
    pub(crate) fn required(&self) -> bool {
        match &self.detail {
            Detail::Positional { arity, default, .. } => match arity {
                Arity::Exactly(_) => default.is_none(),
                Arity::AtLeastOne => true,
                Arity::Any | Arity::Remainder => false,
            },
            Detail::Option { default, .. } => default.is_none(),
            Detail::Choice {
                append: false,
                default,
                ..
            } => default.is_none(),
            _ => false,
        }
    }

    /// The destinations this descriptor writes besides its own (removed again by finishing).
    pub(crate) fn hidden(&self) -> Vec<String> {
        match &self.detail {
            Detail::Level { up, down, .. } => vec![up.owner.clone(), down.owner.clone()],
            _ => Vec::default(),
        }
    }

    pub(crate) fn aliases(&self) -> Vec<&Alias> {
        match &self.detail {
            Detail::Positional { .. } => Vec::default(),
            Detail::Option { alias, .. }
            | Detail::Flag { alias, .. }
            | Detail::Count { alias, .. }
            | Detail::Append { alias, .. } => vec![alias],
            Detail::Level { up, down, .. } => vec![up, down],
            Detail::Choice { literals, .. } => literals.iter().map(|(_, alias)| alias).collect(),
        }
    }

    pub(crate) fn aliases_mut(&mut self) -> Vec<&mut Alias> {
        match &mut self.detail {
            Detail::Positional { .. } => Vec::default(),
            Detail::Option { alias, .. }
            | Detail::Flag { alias, .. }
            | Detail::Count { alias, .. }
            | Detail::Append { alias, .. } => vec![alias],
            Detail::Level { up, down, .. } => vec![up, down],
            Detail::Choice { literals, .. } => {
                literals.iter_mut().map(|(_, alias)| alias).collect()
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let mut characters = name.chars();
    let valid = match characters.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && characters.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

fn first_letter(name: &str) -> Option<char> {
    name.chars().next()
}

fn kebab(name: &str) -> String {
    name.trim_matches('_').replace('_', "-")
}

fn default_longs(name: &str) -> Vec<String> {
    let long = kebab(name);

    if long.is_empty() {
        Vec::default()
    } else {
        vec![long]
    }
}

fn option_alias(name: &str, arg: &Arg, proposal: Option<char>) -> Alias {
    let longs = match &arg.long {
        Some(longs) => longs.clone(),
        None => default_longs(name),
    };
    Alias::new(name, arg.short, proposal, longs)
}

fn level_aliases(name: &str, arg: &Arg, style: LevelStyle) -> (Alias, Alias) {
    let (up_long, down_long, up_proposal, down_proposal) = match style {
        LevelStyle::Level => (
            format!("{}-up", kebab(name)),
            format!("{}-down", kebab(name)),
            first_letter(name).map(|letter| letter.to_ascii_lowercase()),
            first_letter(name).map(|letter| letter.to_ascii_uppercase()),
        ),
        LevelStyle::Verbosity => (
            "verbose".to_string(),
            "quiet".to_string(),
            Some('v'),
            Some('q'),
        ),
    };
    let up = Alias::new(
        format!("{name}__up"),
        arg.up_short,
        up_proposal,
        arg.up_long.clone().unwrap_or_else(|| vec![up_long]),
    );
    let down = Alias::new(
        format!("{name}__down"),
        arg.down_short,
        down_proposal,
        arg.down_long.clone().unwrap_or_else(|| vec![down_long]),
    );
    (up, down)
}

fn choice_aliases(name: &str, arg: &Arg, literals: &[String]) -> Vec<(String, Alias)> {
    literals
        .iter()
        .map(|literal| {
            let request = arg
                .shorts
                .iter()
                .rev()
                .find(|(key, _)| key == literal)
                .map(|(_, short)| Short::Explicit(*short))
                .unwrap_or_default();
            let longs = arg
                .longs
                .iter()
                .rev()
                .find(|(key, _)| key == literal)
                .map(|(_, longs)| longs.clone())
                .unwrap_or_else(|| vec![literal.clone()]);
            let alias = Alias::new(
                format!("{name}[{literal}]"),
                request,
                first_letter(literal),
                longs,
            );
            (literal.clone(), alias)
        })
        .collect()
}

fn counter_start(name: &str, default: Option<&Value>) -> Result<i64, ConfigError> {
    match default {
        None | Some(Value::None) => Ok(0),
        Some(Value::Int(start)) => Ok(*start),
        Some(other) => Err(invalid_default(name, other, "an int")),
    }
}

fn variadic_default(
    name: &str,
    arity: Arity,
    default: Option<Value>,
) -> Result<Option<Value>, ConfigError> {
    match (arity, default) {
        (_, None) => Ok(None),
        (Arity::AtLeastOne, Some(_)) => Err(ConfigError::VariadicDefault(name.to_string())),
        (_, Some(Value::List(items))) => Ok(Some(Value::List(items))),
        (_, Some(other)) => Err(invalid_default(name, &other, "a list")),
    }
}

fn validate_choice(
    name: &str,
    choices: Option<&Vec<String>>,
    default: Option<&Value>,
) -> Result<(), ConfigError> {
    match (choices, default) {
        (Some(choices), Some(Value::List(items))) => {
            for item in items {
                validate_choice(name, Some(choices), Some(item))?;
            }
            Ok(())
        }
        (Some(choices), Some(value)) if !value.is_none() => {
            if choices.contains(&value.to_string()) {
                Ok(())
            } else {
                Err(invalid_default(name, value, &one_of(choices)))
            }
        }
        _ => Ok(()),
    }
}

fn validate_tuple(name: &str, size: usize, default: Option<&Value>) -> Result<(), ConfigError> {
    match default {
        None | Some(Value::None) => Ok(()),
        Some(Value::Tuple(items)) if items.len() == size => Ok(()),
        Some(other) => Err(invalid_default(
            name,
            other,
            &format!("a tuple of {size} values"),
        )),
    }
}

fn one_of(choices: &[String]) -> String {
    let quoted: Vec<String> = choices.iter().map(|choice| format!("'{choice}'")).collect();
    format!("one of {}", quoted.join(", "))
}

fn invalid_default(name: &str, value: &Value, expected: &str) -> ConfigError {
    ConfigError::InvalidDefault {
        name: name.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}
