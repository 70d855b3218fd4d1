use crate::api::Scalar;
use crate::model::{EnumType, Namespace, Value};
use crate::parser::ParseError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    // Map underlying values back onto enum members.
    Enum(EnumType),
    // Convert raw tokens element-wise into a tuple.
    Tuple(Vec<Scalar>),
    // Combine the hidden up/down counters.
    Level {
        up: String,
        down: String,
        start: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Finisher {
    pub(crate) dest: String,
    pub(crate) step: Step,
}

impl Finisher {
    pub(crate) fn new(dest: impl Into<String>, step: Step) -> Self {
        Self {
            dest: dest.into(),
            step,
        }
    }

    /// Finish the destination in place, stopping at the first failing element.
    pub(crate) fn apply(&self, namespace: &mut Namespace) -> Result<(), ParseError> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Finishing '{}' with {:?}.", self.dest, self.step);
        }

        match &self.step {
            Step::Enum(enum_type) => {
                if let Some(value) = namespace.get_mut(&self.dest) {
                    let finished = finish_enum(enum_type, value).map_err(|message| self.error(message))?;
                    *value = finished;
                }
            }
            Step::Tuple(scalars) => {
                if let Some(value) = namespace.get_mut(&self.dest) {
                    let finished = finish_tuple(scalars, value).map_err(|message| self.error(message))?;
                    *value = finished;
                }
            }
            Step::Level {
                up,
                down,
                start,
                min,
                max,
            } => {
                let up = counter(namespace.remove(up));
                let down = counter(namespace.remove(down));
                let mut level = start.saturating_add(up).saturating_sub(down);

                if let Some(min) = min {
                    level = level.max(*min);
                }

                if let Some(max) = max {
                    level = level.min(*max);
                }

                namespace.insert(self.dest.clone(), Value::Int(level));
            }
        };

        Ok(())
    }

    fn error(&self, message: String) -> ParseError {
        ParseError::Finish {
            dest: self.dest.clone(),
            message,
        }
    }
}

fn counter(value: Option<Value>) -> i64 {
    value.as_ref().and_then(Value::as_int).unwrap_or(0)
}

fn finish_enum(enum_type: &EnumType, value: &Value) -> Result<Value, String> {
    match value {
        Value::None | Value::Member(_) => Ok(value.clone()),
        Value::List(items) => items
            .iter()
            .map(|item| finish_enum(enum_type, item))
            .collect::<Result<Vec<Value>, String>>()
            .map(Value::List),
        underlying => enum_type.by_value(underlying).ok_or_else(|| {
            format!(
                "'{underlying}' is not a member of {name}",
                name = enum_type.name()
            )
        }),
    }
}

fn finish_tuple(scalars: &[Scalar], value: &Value) -> Result<Value, String> {
    match value {
        Value::List(tokens) => {
            if tokens.len() != scalars.len() {
                return Err(format!(
                    "expected {} values, found {}",
                    scalars.len(),
                    tokens.len()
                ));
            }

            scalars
                .iter()
                .zip(tokens.iter())
                .map(|(scalar, token)| match token {
                    Value::Str(token) => scalar.convert(token),
                    other => Ok(other.clone()),
                })
                .collect::<Result<Vec<Value>, String>>()
                .map(Value::Tuple)
        }
        _ => Ok(value.clone()),
    }
}
