/// Boundary validation failures.
///
/// The scoring math itself never fails: empty populations and zero-magnitude
/// vectors degrade to empty results or zero similarity. These errors are raised
/// while turning untrusted input into engine arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ValidationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
