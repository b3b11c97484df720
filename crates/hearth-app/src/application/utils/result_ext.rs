use hearth_domain::shared::DomainError;
use std::fmt::Display;

/// Lifts foreign errors into [`DomainError`] with a label naming what failed.
pub trait ResultExt<T> {
    /// `Infrastructure("<context>: <error>")`, for setup steps outside the store.
    fn to_infra_err(self, context: &str) -> Result<T, DomainError>;

    /// `InvalidInput("invalid <field>: <error>")`, for caller-supplied values.
    fn to_input_err(self, field: &str) -> Result<T, DomainError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn to_infra_err(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(format!("{}: {}", context, e)))
    }

    fn to_input_err(self, field: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::InvalidInput(format!("invalid {}: {}", field, e)))
    }
}
