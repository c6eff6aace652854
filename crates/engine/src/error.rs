use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// Bad operator string, empty rule list, inverted substring range, etc.
    InvalidArgument(String),
    /// Substring comparison on a field that does not hold a string.
    TypeMismatch { field: String, found: &'static str },
    /// Input value the record model cannot hold (nested array/object).
    UnsupportedValue { field: String, found: &'static str },
    /// Malformed JSON/CSV input text.
    Load(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Plan validation error (duplicate step id, missing parameter, etc.).
    ConfigValidation(String),
    /// A step references an input or step that does not exist (yet).
    UnknownReference(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::TypeMismatch { field, found } => {
                write!(f, "field '{field}': substring comparison requires a string, found {found}")
            }
            Self::UnsupportedValue { field, found } => {
                write!(f, "field '{field}': unsupported value type {found} (records hold flat scalars only)")
            }
            Self::Load(msg) => write!(f, "load error: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownReference(msg) => write!(f, "unknown reference: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}
