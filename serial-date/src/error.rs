use thiserror::Error;

/// All errors produced by serial-date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SerialDateError {
    /// The wire payload could not be turned into a definition: bad JSON,
    /// unknown enum token, missing mandatory field or a non-numeric string.
    #[error("malformed definition: {0}")]
    MalformedDefinition(String),

    /// The definition is well-formed but its field values are not allowed.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// Calendar arithmetic left the range jiff can represent.
    #[error("calendar arithmetic out of range: {0}")]
    Calendar(String),
}

impl SerialDateError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDefinition(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDefinition(message.into())
    }

    pub fn calendar(message: impl Into<String>) -> Self {
        Self::Calendar(message.into())
    }
}

impl From<jiff::Error> for SerialDateError {
    fn from(e: jiff::Error) -> Self {
        Self::calendar(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SerialDateError>;
