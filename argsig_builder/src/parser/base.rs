use thiserror::Error;

/// A malformed command specification.
///
/// Raised while compiling the parameters into a [`Grammar`](crate::Grammar), and never while parsing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A parameter name that can't be used as a destination.
    #[error("Config error: invalid parameter name '{0}'.")]
    InvalidName(String),

    /// Two arguments (or hidden counters) resolve to the same destination.
    #[error("Config error: duplicate destination '{0}'.")]
    DuplicateName(String),

    /// Two arguments explicitly request the same short option.
    #[error("Config error: short option '-{short}' is requested by both '{first}' and '{second}'.")]
    DuplicateShort {
        /// The contested letter.
        short: char,
        /// The argument that reserved it first.
        first: String,
        /// The argument that tried to reserve it again.
        second: String,
    },

    /// A short option request that isn't an ascii letter or digit.
    #[error("Config error: '{owner}' requests short option '{short}', which is not an ascii letter or digit.")]
    InvalidShort {
        /// The requested character.
        short: char,
        /// The argument making the request.
        owner: String,
    },

    /// Two arguments resolve to the same long option.
    #[error("Config error: long option '--{long}' is used by both '{first}' and '{second}'.")]
    DuplicateLong {
        /// The contested long option (without the `--` prefix).
        long: String,
        /// The argument that claimed it first.
        first: String,
        /// The argument that claimed it again.
        second: String,
    },

    /// An option ended up with neither a short nor a long spelling.
    #[error("Config error: option '{0}' has no short or long spelling.")]
    NoSpelling(String),

    /// The declared (or inferred) shape can't be expressed for this kind of parameter.
    #[error("Config error: parameter '{name}' has unsupported shape '{shape}'.")]
    UnsupportedShape {
        /// The parameter.
        name: String,
        /// The offending shape.
        shape: String,
    },

    /// A tuple element that can't be converted independently.
    #[error("Config error: parameter '{name}' has unsupported tuple element {index} of shape '{shape}'.")]
    TupleElement {
        /// The parameter.
        name: String,
        /// The zero based element position.
        index: usize,
        /// The offending element shape.
        shape: String,
    },

    /// A variadic parameter that requires at least one value, but carries a default.
    #[error("Config error: required variadic parameter '{0}' cannot have a default.")]
    VariadicDefault(String),

    /// The same aspect is configured both through inference and explicitly.
    #[error("Config error: parameter '{name}' is overspecified: {detail}.")]
    Overspecified {
        /// The parameter.
        name: String,
        /// What is configured twice.
        detail: String,
    },

    /// A default that doesn't fit the shape of its parameter.
    #[error("Config error: parameter '{name}' has invalid default '{value}' (expected {expected}).")]
    InvalidDefault {
        /// The parameter.
        name: String,
        /// The offending default.
        value: String,
        /// What the shape accepts.
        expected: String,
    },

    /// A header parameter whose default isn't a description string.
    #[error("Config error: header '{0}' must have a string (or no) default.")]
    InvalidHeader(String),

    /// Positional parameters declared in an order the grammar can't match unambiguously.
    #[error("Config error: positional parameter '{name}' {detail}.")]
    PositionalOrder {
        /// The parameter.
        name: String,
        /// The ordering conflict.
        detail: String,
    },

    /// An unrecognized file mode string.
    #[error("Config error: invalid file mode '{0}'.")]
    InvalidFileMode(String),
}

/// A user input problem, discovered while parsing tokens.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Raised by the token grammar: unknown tokens, missing arguments, out of set or unconvertible values.
    /// Help requests are also reported this way, with an exit code of `0`.
    #[error(transparent)]
    Engine(#[from] clap::Error),

    /// Raised while finishing a successfully matched value.
    #[error("Parse error: argument '{dest}': {message}")]
    Finish {
        /// The destination being finished.
        dest: String,
        /// The reason.
        message: String,
    },
}

impl ParseError {
    /// The process exit code for this error (`0` for help requests).
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::Engine(error) => error.exit_code(),
            ParseError::Finish { .. } => 2,
        }
    }

    /// Whether the message belongs on stderr, rather than stdout.
    pub fn use_stderr(&self) -> bool {
        match self {
            ParseError::Engine(error) => error.use_stderr(),
            ParseError::Finish { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;

    #[test]
    fn config_error_message() {
        let error = ConfigError::DuplicateShort {
            short: 'v',
            first: "verbose".to_string(),
            second: "version".to_string(),
        };

        let message = error.to_string();
        assert_contains!(message, "Config error: ");
        assert_contains!(message, "'-v'");
        assert_contains!(message, "'verbose'");
        assert_contains!(message, "'version'");
    }

    #[test]
    fn finish_error() {
        let error = ParseError::Finish {
            dest: "color".to_string(),
            message: "no member with value 'x'".to_string(),
        };

        assert_eq!(error.exit_code(), 2);
        assert!(error.use_stderr());
        assert_eq!(
            error.to_string(),
            "Parse error: argument 'color': no member with value 'x'"
        );
    }

    #[test]
    fn engine_error() {
        let error = ParseError::from(clap::Error::new(clap::error::ErrorKind::DisplayHelp));

        assert_eq!(error.exit_code(), 0);
        assert!(!error.use_stderr());
    }
}
