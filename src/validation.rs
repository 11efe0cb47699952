/// Outcome of a value conversion or a custom validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success,
    /// The message is shown to the user as is.
    Fail(String),
}

impl ValidationResult {
    pub fn fail(message: impl Into<String>) -> Self {
        ValidationResult::Fail(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success)
    }

    pub fn into_result(self) -> Result<(), String> {
        match self {
            ValidationResult::Success => Ok(()),
            ValidationResult::Fail(message) => Err(message),
        }
    }
}

impl From<bool> for ValidationResult {
    fn from(valid: bool) -> Self {
        if valid {
            ValidationResult::Success
        } else {
            ValidationResult::fail("Validation Invalid.")
        }
    }
}

impl From<&str> for ValidationResult {
    fn from(message: &str) -> Self {
        ValidationResult::fail(message)
    }
}

impl From<String> for ValidationResult {
    fn from(message: String) -> Self {
        ValidationResult::Fail(message)
    }
}

impl<E: ToString> From<Result<(), E>> for ValidationResult {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ValidationResult::Success,
            Err(err) => ValidationResult::Fail(err.to_string()),
        }
    }
}
