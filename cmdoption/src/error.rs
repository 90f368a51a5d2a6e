use std::fmt;

/// Errors raised while turning an [`OptionTable`](crate::OptionTable) into
/// an [`OptionModel`](crate::OptionModel). Parsing never starts when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("duplicate option name: {0}")]
    DuplicateOptionName(String),

    #[error("option name must not be empty")]
    EmptyOptionName,

    #[error("option bound to {binding} has no names")]
    MissingOptionName { binding: &'static str },

    #[error("no handler for option {option}: {kind} with {arity} argument(s)")]
    NoHandlerFound {
        option: String,
        kind: &'static str,
        arity: usize,
    },

    #[error("option {option} references unknown option {target}")]
    UnknownConstraintTarget { option: String, target: String },

    #[error("option {option}: maximum count {max} is below minimum count {min}")]
    InvalidMultiplicity {
        option: String,
        min: usize,
        max: usize,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("in command {command}: {source}")]
    Command {
        command: String,
        #[source]
        source: Box<BuildError>,
    },
}

/// Errors raised while walking the token list. They abort the parse level
/// they occur in; mutations already applied to the target stay applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("option {token} is ambiguous; possibilities: {}", .candidates.join(", "))]
    AmbiguousOption {
        token: String,
        candidates: Vec<String>,
    },

    #[error("option {option} requires {expected} argument(s) but {found} given")]
    MissingArgument {
        option: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("invalid argument for option {option}: {message}")]
    InvalidValue { option: String, message: String },
}

/// A constraint broken by a complete token list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("option {option} must be given at least {min} time(s), found {found}")]
    MissingRequiredOption {
        option: String,
        min: usize,
        found: usize,
    },

    #[error("option {option} may be given at most {max} time(s), found {found}")]
    TooManyOccurrences {
        option: String,
        max: usize,
        found: usize,
    },

    #[error("option {option} requires option {required}")]
    MissingRequiredDependency { option: String, required: String },

    #[error("option {option} conflicts with option {conflicting}")]
    ConflictingOptions { option: String, conflicting: String },
}

/// Every violation found by one validation pass, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub(crate) fn new(list: Vec<Violation>) -> Option<Self> {
        if list.is_empty() {
            None
        } else {
            Some(Violations(list))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Invalid(#[from] Violations),
}

impl ParseError {
    /// Violations of a failed validation pass, empty for scan errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ParseError::Invalid(v) => &v.0,
            ParseError::Scan(_) => &[],
        }
    }
}

/// Failure raised by a [`Handler`](crate::Handler) while applying
/// arguments to a target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        HandlerError(msg.into())
    }
}

impl From<String> for HandlerError {
    fn from(s: String) -> Self {
        HandlerError(s)
    }
}

impl From<&str> for HandlerError {
    fn from(s: &str) -> Self {
        HandlerError(s.to_string())
    }
}

/// Any error the crate produces, for callers that build and parse in one go.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Error::Parse(ParseError::Scan(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violations_display_one_per_line() {
        let v = Violations::new(vec![
            Violation::MissingRequiredOption {
                option: "--name".into(),
                min: 1,
                found: 0,
            },
            Violation::ConflictingOptions {
                option: "--diff".into(),
                conflicting: "--check".into(),
            },
        ])
        .unwrap();
        assert_eq!(
            v.to_string(),
            "option --name must be given at least 1 time(s), found 0\n\
             option --diff conflicts with option --check"
        );
    }

    #[test]
    fn empty_violation_list_is_not_an_error() {
        assert!(Violations::new(Vec::new()).is_none());
    }

    #[test]
    fn ambiguous_option_lists_candidates() {
        let e = ScanError::AmbiguousOption {
            token: "--al".into(),
            candidates: vec!["--alpha".into(), "--alphabet".into()],
        };
        assert_eq!(
            e.to_string(),
            "option --al is ambiguous; possibilities: --alpha, --alphabet"
        );
    }

    #[test]
    fn scan_error_converts_into_crate_error() {
        let e: Error = ScanError::UnknownOption("--nope".into()).into();
        assert!(matches!(
            e,
            Error::Parse(ParseError::Scan(ScanError::UnknownOption(_)))
        ));
    }
}
