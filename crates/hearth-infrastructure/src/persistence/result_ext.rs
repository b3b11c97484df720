use hearth_domain::shared::DomainError;

use super::RepositoryErrorMapper;

/// `?`-friendly mapping of sqlx results with a context label.
pub trait ResultExt<T> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))
    }
}
