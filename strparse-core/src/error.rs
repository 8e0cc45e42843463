use std::fmt;

/// Boxed error returned by string constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where a string token appeared in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPosition {
    Value,
    Key,
}

impl fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenPosition::Value => "value",
            TokenPosition::Key => "map key",
        };
        write!(f, "{}", s)
    }
}

/// Returned by the `parse` family when the input does not describe a value of
/// the target type.
#[derive(Debug, thiserror::Error)]
#[error("The input string '{input}' was not in a correct format for {type_name}")]
pub struct FormatError {
    pub type_name: &'static str,
    pub input: String,
    #[source]
    pub source: Option<BoxError>,
}

impl FormatError {
    pub fn new<T: ?Sized>(input: impl Into<String>) -> Self {
        FormatError {
            type_name: std::any::type_name::<T>(),
            input: input.into(),
            source: None,
        }
    }

    /// Attach the constructor error that caused the failure.
    pub fn with_source(mut self, source: BoxError) -> Self {
        self.source = Some(source);
        self
    }
}

/// Raised by the document bridge when a token cannot be turned into the target
/// type. Reported to serde through `de::Error::custom`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentFormatError {
    #[error("Expected a string {position} for {type_name}, found null")]
    Missing {
        type_name: &'static str,
        position: TokenPosition,
    },

    #[error("Invalid {position} '{token}' for {type_name}")]
    Invalid {
        type_name: &'static str,
        token: String,
        position: TokenPosition,
    },
}

impl DocumentFormatError {
    pub fn missing<T: ?Sized>(position: TokenPosition) -> Self {
        DocumentFormatError::Missing {
            type_name: std::any::type_name::<T>(),
            position,
        }
    }

    pub fn invalid<T: ?Sized>(token: impl Into<String>, position: TokenPosition) -> Self {
        DocumentFormatError::Invalid {
            type_name: std::any::type_name::<T>(),
            token: token.into(),
            position,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DocumentFormatError::Missing { type_name, .. }
            | DocumentFormatError::Invalid { type_name, .. } => type_name,
        }
    }
}

/// A type opted into factory-backed parsing without providing a string
/// constructor. This is a programming error, not a data error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{type_name} must override Parsable::try_parse or provide a single-string constructor")]
pub struct ConfigurationError {
    pub type_name: &'static str,
}

impl ConfigurationError {
    pub fn new<T: ?Sized>() -> Self {
        ConfigurationError {
            type_name: std::any::type_name::<T>(),
        }
    }
}
