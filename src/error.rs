use core::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed PLY header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Element '{0}' is already declared")]
    DuplicateElement(String),

    #[error("Element '{element}' has no property '{property}'")]
    UnknownProperty { element: String, property: String },

    #[error("Row for element '{element}' is missing property '{property}'")]
    MissingProperty { element: String, property: String },

    #[error("Property '{property}' is already declared for element '{element}'")]
    DuplicateProperty { element: String, property: String },

    #[error("Property type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Corrupt list property '{property}': {reason}")]
    CorruptList { property: String, reason: String },

    #[error("Malformed element data: {0}")]
    MalformedData(String),

    #[error("Cannot {operation} while {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: String,
    },

    #[error("Serde error: {0}")]
    Serde(String),
}

impl PlyError {
    pub(crate) fn invalid_state(operation: &'static str, state: impl fmt::Display) -> Self {
        PlyError::InvalidStateTransition {
            operation,
            state: state.to_string(),
        }
    }
}

impl serde::de::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}

impl serde::ser::Error for PlyError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PlyError::Serde(msg.to_string())
    }
}
