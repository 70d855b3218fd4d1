use crate::api::{Converter, Scalar, Shape};
use crate::compiler::finish::Step;
use crate::model::{EnumType, Value};
use crate::parser::{open, ConfigError, FileMode};

/// How a single token becomes a value.
#[derive(Debug, Clone)]
pub(crate) enum Conversion {
    Scalar(Scalar),
    Json,
    File(FileMode),
    Custom(Converter),
}

impl Conversion {
    pub(crate) fn convert(&self, token: &str) -> Result<Value, String> {
        match self {
            Conversion::Scalar(scalar) => scalar.convert(token),
            Conversion::Json => serde_json::from_str::<serde_json::Value>(token)
                .map(Value::Json)
                .map_err(|error| format!("invalid JSON value: '{token}' ({error})")),
            Conversion::File(mode) => open(*mode, token).map(Value::File),
            Conversion::Custom(converter) => converter.convert(token),
        }
    }

    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self, Conversion::Scalar(scalar) if scalar.is_numeric())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LevelStyle {
    Level,
    Verbosity,
}

/// How many tokens a parameter takes and what it does with them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Form {
    Value,
    Tuple(usize),
    Flag,
    Count,
    Level(LevelStyle),
    Append,
    Choices(Vec<String>),
    AppendChoices(Vec<String>),
    OneOrMore,
    Remainder,
}

#[derive(Debug, Clone)]
pub(crate) struct Resolution {
    pub(crate) form: Form,
    pub(crate) conversion: Option<Conversion>,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) finishing: Option<Step>,
}

impl Resolution {
    fn of(form: Form) -> Self {
        Self {
            form,
            conversion: None,
            choices: None,
            finishing: None,
        }
    }

    /// Whether any token this resolves may be a negative number.
    pub(crate) fn is_numeric(&self) -> bool {
        match &self.finishing {
            Some(Step::Tuple(scalars)) => scalars.iter().any(Scalar::is_numeric),
            _ => self
                .conversion
                .as_ref()
                .map_or(false, Conversion::is_numeric),
        }
    }

    fn element(element: Element, form: Form) -> Self {
        let Element {
            conversion,
            choices,
            finishing,
        } = element;
        Self {
            form,
            conversion,
            choices,
            finishing,
        }
    }
}

// The conversion of a single, independently convertible token.
struct Element {
    conversion: Option<Conversion>,
    choices: Option<Vec<String>>,
    finishing: Option<Step>,
}

/// Infer the shape of a parameter from its (raw) default.
pub(crate) fn infer(name: &str, default: Option<&Value>) -> Result<Shape, ConfigError> {
    match default {
        None | Some(Value::None) => Ok(Shape::str()),
        Some(Value::Member(member)) => Ok(Shape::Enum(member.enum_type().clone())),
        Some(Value::Tuple(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match Scalar::of(item) {
                Some(scalar) => Ok(Shape::Scalar(scalar)),
                None => Err(ConfigError::TupleElement {
                    name: name.to_string(),
                    index,
                    shape: format!("{item}"),
                }),
            })
            .collect::<Result<Vec<Shape>, ConfigError>>()
            .map(Shape::Tuple),
        Some(value) => match Scalar::of(value) {
            Some(scalar) => Ok(Shape::Scalar(scalar)),
            None => Err(ConfigError::UnsupportedShape {
                name: name.to_string(),
                shape: format!("inferred from default '{value}'"),
            }),
        },
    }
}

/// Decide the form, conversion, and finishing of a parameter.
///
/// `keyword` distinguishes options (where booleans become flags and literals become choice groups) from positionals.
pub(crate) fn resolve(
    name: &str,
    shape: &Shape,
    converter: Option<&Converter>,
    keyword: bool,
) -> Result<Resolution, ConfigError> {
    if let Some(converter) = converter {
        return resolve_custom(name, shape, converter, keyword);
    }

    match shape {
        Shape::Scalar(Scalar::Bool) if keyword => Ok(Resolution::of(Form::Flag)),
        Shape::Tuple(elements) => {
            let scalars = tuple(name, elements)?;
            let mut resolution = Resolution::of(Form::Tuple(scalars.len()));
            resolution.finishing.replace(Step::Tuple(scalars));
            Ok(resolution)
        }
        Shape::Count => Ok(Resolution::of(Form::Count)),
        Shape::Level => Ok(Resolution::of(Form::Level(LevelStyle::Level))),
        Shape::Verbosity => Ok(Resolution::of(Form::Level(LevelStyle::Verbosity))),
        Shape::Append(inner) => match inner.as_ref() {
            Shape::Literal(literals) => Ok(Resolution::of(Form::AppendChoices(
                literal_set(name, shape, literals)?,
            ))),
            inner => Ok(Resolution::element(element(name, inner)?, Form::Append)),
        },
        Shape::OneOrMore(inner) => Ok(Resolution::element(
            element(name, inner)?,
            Form::OneOrMore,
        )),
        Shape::Remainder => Ok(Resolution::of(Form::Remainder)),
        Shape::Literal(literals) if keyword => Ok(Resolution::of(Form::Choices(literal_set(
            name, shape, literals,
        )?))),
        single => Ok(Resolution::element(element(name, single)?, Form::Value)),
    }
}

fn resolve_custom(
    name: &str,
    shape: &Shape,
    converter: &Converter,
    keyword: bool,
) -> Result<Resolution, ConfigError> {
    let form = match shape {
        Shape::Append(_) => Form::Append,
        Shape::OneOrMore(_) => Form::OneOrMore,
        Shape::Scalar(Scalar::Bool) if keyword => {
            return Err(overspecified(name, shape, converter));
        }
        Shape::Scalar(_) | Shape::Enum(_) | Shape::Json | Shape::File(_) => Form::Value,
        _ => return Err(overspecified(name, shape, converter)),
    };

    let mut resolution = Resolution::of(form);
    resolution
        .conversion
        .replace(Conversion::Custom(converter.clone()));
    Ok(resolution)
}

fn overspecified(name: &str, shape: &Shape, converter: &Converter) -> ConfigError {
    ConfigError::Overspecified {
        name: name.to_string(),
        detail: format!(
            "converter '{}' cannot apply to shape '{shape}'",
            converter.name()
        ),
    }
}

fn element(name: &str, shape: &Shape) -> Result<Element, ConfigError> {
    match shape {
        Shape::Scalar(Scalar::Str) => Ok(Element {
            conversion: None,
            choices: None,
            finishing: None,
        }),
        Shape::Scalar(scalar) => Ok(Element {
            conversion: Some(Conversion::Scalar(*scalar)),
            choices: None,
            finishing: None,
        }),
        Shape::Enum(enum_type) => {
            let scalar = underlying(name, enum_type)?;
            Ok(Element {
                conversion: match scalar {
                    Scalar::Str => None,
                    scalar => Some(Conversion::Scalar(scalar)),
                },
                choices: Some(
                    enum_type
                        .members()
                        .map(|(_, value)| value.to_string())
                        .collect(),
                ),
                finishing: Some(Step::Enum(enum_type.clone())),
            })
        }
        Shape::Json => Ok(Element {
            conversion: Some(Conversion::Json),
            choices: None,
            finishing: None,
        }),
        Shape::File(mode) => Ok(Element {
            conversion: Some(Conversion::File(*mode)),
            choices: None,
            finishing: None,
        }),
        Shape::Literal(literals) => Ok(Element {
            conversion: None,
            choices: Some(literal_set(name, shape, literals)?),
            finishing: None,
        }),
        _ => Err(unsupported(name, shape)),
    }
}

fn tuple(name: &str, elements: &[Shape]) -> Result<Vec<Scalar>, ConfigError> {
    if elements.is_empty() {
        return Err(unsupported(name, &Shape::Tuple(Vec::default())));
    }

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| match element {
            Shape::Scalar(scalar) => Ok(*scalar),
            other => Err(ConfigError::TupleElement {
                name: name.to_string(),
                index,
                shape: other.to_string(),
            }),
        })
        .collect()
}

// Every member must share one underlying scalar type.
fn underlying(name: &str, enum_type: &EnumType) -> Result<Scalar, ConfigError> {
    let mut scalars = enum_type.members().map(|(_, value)| Scalar::of(value));

    if let Some(Some(first)) = scalars.next() {
        if scalars.all(|scalar| scalar == Some(first)) {
            return Ok(first);
        }
    }

    Err(ConfigError::UnsupportedShape {
        name: name.to_string(),
        shape: format!(
            "Enum[{}] (members must share one scalar type)",
            enum_type.name()
        ),
    })
}

fn literal_set(name: &str, shape: &Shape, literals: &[String]) -> Result<Vec<String>, ConfigError> {
    if literals.is_empty() {
        return Err(unsupported(name, shape));
    }

    Ok(literals.to_vec())
}

pub(crate) fn unsupported(name: &str, shape: &Shape) -> ConfigError {
    ConfigError::UnsupportedShape {
        name: name.to_string(),
        shape: shape.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn level() -> EnumType {
        EnumType::new("Level").member("Low", 1).member("High", 2)
    }

    #[rstest]
    #[case(None, Shape::str())]
    #[case(Some(Value::None), Shape::str())]
    #[case(Some(Value::Int(1)), Shape::int())]
    #[case(Some(Value::Float(1.0)), Shape::float())]
    #[case(Some(Value::Bool(false)), Shape::bool())]
    #[case(Some(Value::from("a")), Shape::str())]
    #[case(Some(level().get("Low").unwrap()), Shape::Enum(level()))]
    #[case(
        Some(Value::Tuple(vec![Value::Int(0), Value::from("a")])),
        Shape::Tuple(vec![Shape::int(), Shape::str()])
    )]
    fn infer_default(#[case] default: Option<Value>, #[case] expected: Shape) {
        assert_eq!(infer("x", default.as_ref()).unwrap(), expected);
    }

    #[rstest]
    #[case(Value::from(vec![1]))]
    #[case(Value::Json(serde_json::json!({"a": 1})))]
    fn infer_unsupported(#[case] default: Value) {
        assert_matches!(
            infer("x", Some(&default)),
            Err(ConfigError::UnsupportedShape { name, .. }) if name == "x"
        );
    }

    #[test]
    fn infer_tuple_element() {
        let default = Value::Tuple(vec![Value::Int(0), Value::from(vec![1])]);

        assert_eq!(
            infer("x", Some(&default)).unwrap_err(),
            ConfigError::TupleElement {
                name: "x".to_string(),
                index: 1,
                shape: "[1]".to_string(),
            }
        );
    }

    #[rstest]
    #[case(Shape::str(), false, Form::Value)]
    #[case(Shape::int(), true, Form::Value)]
    #[case(Shape::bool(), false, Form::Value)]
    #[case(Shape::bool(), true, Form::Flag)]
    #[case(Shape::Count, true, Form::Count)]
    #[case(Shape::Level, true, Form::Level(LevelStyle::Level))]
    #[case(Shape::Verbosity, true, Form::Level(LevelStyle::Verbosity))]
    #[case(Shape::Remainder, false, Form::Remainder)]
    #[case(Shape::append(Shape::int()), true, Form::Append)]
    #[case(Shape::one_or_more(Shape::int()), false, Form::OneOrMore)]
    #[case(Shape::literal(["a", "b"]), false, Form::Value)]
    #[case(Shape::literal(["a", "b"]), true, Form::Choices(vec!["a".to_string(), "b".to_string()]))]
    #[case(
        Shape::append(Shape::literal(["a"])),
        true,
        Form::AppendChoices(vec!["a".to_string()])
    )]
    #[case(Shape::Tuple(vec![Shape::int(), Shape::int()]), false, Form::Tuple(2))]
    fn resolve_form(#[case] shape: Shape, #[case] keyword: bool, #[case] expected: Form) {
        assert_eq!(resolve("x", &shape, None, keyword).unwrap().form, expected);
    }

    #[test]
    fn resolve_enum() {
        // Execute
        let resolution = resolve("level", &Shape::Enum(level()), None, true).unwrap();

        // Verify
        assert_eq!(resolution.form, Form::Value);
        assert_eq!(
            resolution.choices,
            Some(vec!["1".to_string(), "2".to_string()])
        );
        assert_matches!(resolution.conversion, Some(Conversion::Scalar(Scalar::Int)));
        assert_eq!(resolution.finishing, Some(Step::Enum(level())));
    }

    #[test]
    fn resolve_enum_str() {
        let color = EnumType::new("Color").member("Red", "r");

        let resolution = resolve("color", &Shape::Enum(color), None, false).unwrap();

        assert_matches!(resolution.conversion, None);
        assert_eq!(resolution.choices, Some(vec!["r".to_string()]));
    }

    #[rstest]
    #[case(EnumType::new("Mixed").member("A", 1).member("B", "b"))]
    #[case(EnumType::new("Empty"))]
    fn resolve_enum_unsupported(#[case] enum_type: EnumType) {
        assert_matches!(
            resolve("x", &Shape::Enum(enum_type), None, true),
            Err(ConfigError::UnsupportedShape { .. })
        );
    }

    #[test]
    fn resolve_tuple() {
        // Execute
        let resolution = resolve(
            "point",
            &Shape::Tuple(vec![Shape::int(), Shape::float()]),
            None,
            false,
        )
        .unwrap();

        // Verify
        assert_matches!(resolution.conversion, None);
        assert_eq!(
            resolution.finishing,
            Some(Step::Tuple(vec![Scalar::Int, Scalar::Float]))
        );
    }

    #[test]
    fn resolve_tuple_element() {
        let shape = Shape::Tuple(vec![Shape::int(), Shape::append(Shape::int())]);

        assert_eq!(
            resolve("pair", &shape, None, false).unwrap_err(),
            ConfigError::TupleElement {
                name: "pair".to_string(),
                index: 1,
                shape: "Append[int]".to_string(),
            }
        );
    }

    #[rstest]
    #[case(Shape::append(Shape::Count))]
    #[case(Shape::append(Shape::Tuple(vec![Shape::int()])))]
    #[case(Shape::one_or_more(Shape::Remainder))]
    #[case(Shape::Literal(vec![]))]
    #[case(Shape::Tuple(vec![]))]
    fn resolve_unsupported(#[case] shape: Shape) {
        assert_matches!(
            resolve("x", &shape, None, true),
            Err(ConfigError::UnsupportedShape { .. })
        );
    }

    #[test]
    fn resolve_converter_wins() {
        // Setup
        let converter = Converter::new("len", |token: &str| -> Result<i64, String> {
            Ok(token.len() as i64)
        });

        // Execute
        let resolution = resolve("x", &Shape::Enum(level()), Some(&converter), true).unwrap();

        // Verify
        assert_eq!(resolution.form, Form::Value);
        assert_eq!(resolution.choices, None);
        assert_eq!(resolution.finishing, None);
        assert_matches!(resolution.conversion, Some(Conversion::Custom(_)));
    }

    #[rstest]
    #[case(Shape::Count)]
    #[case(Shape::Verbosity)]
    #[case(Shape::bool())]
    #[case(Shape::literal(["a"]))]
    #[case(Shape::Tuple(vec![Shape::int()]))]
    fn resolve_converter_overspecified(#[case] shape: Shape) {
        let converter = Converter::new("id", |token: &str| -> Result<String, String> {
            Ok(token.to_string())
        });

        assert_matches!(
            resolve("x", &shape, Some(&converter), true),
            Err(ConfigError::Overspecified { .. })
        );
    }

    #[rstest]
    #[case(Conversion::Json, "{\"a\": [1, 2]}", Value::Json(serde_json::json!({"a": [1, 2]})))]
    #[case(Conversion::Json, "3", Value::Json(serde_json::json!(3)))]
    #[case(Conversion::Scalar(Scalar::Int), "3", Value::Int(3))]
    fn convert_token(#[case] conversion: Conversion, #[case] token: &str, #[case] expected: Value) {
        assert_eq!(conversion.convert(token), Ok(expected));
    }

    #[test]
    fn conversion_json_invalid() {
        let message = Conversion::Json.convert("{").unwrap_err();

        assert!(message.starts_with("invalid JSON value: '{'"));
    }
}
