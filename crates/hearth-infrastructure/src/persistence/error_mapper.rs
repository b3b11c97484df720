use hearth_domain::shared::DomainError;

/// SQLite primary result codes signalling lock contention.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Translates sqlx errors into the domain taxonomy.
///
/// Lock contention and unique violations both become
/// [`DomainError::StorageConflict`]: another writer got there first.
pub struct RepositoryErrorMapper;

impl RepositoryErrorMapper {
    pub fn map_sqlx_error(error: sqlx::Error, context: &str) -> DomainError {
        if Self::is_unique_violation(&error) {
            return DomainError::StorageConflict(format!("{}: {}", context, error));
        }
        if Self::is_busy(&error) {
            return DomainError::StorageConflict(format!(
                "{}: database is busy: {}",
                context, error
            ));
        }

        match error {
            sqlx::Error::RowNotFound => DomainError::NotFound(format!("{}: row not found", context)),
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() || db.is_check_violation() => {
                DomainError::DataIntegrity(format!("{}: {}", context, db.message()))
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DomainError::DataIntegrity(format!("{}: {}", context, error))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DomainError::Infrastructure(format!("{}: {}", context, error))
            }
            other => DomainError::Repository(format!("{}: {}", context, other)),
        }
    }

    pub fn map_json_error(error: serde_json::Error, context: &str) -> DomainError {
        DomainError::Serialization(format!("{}: {}", context, error))
    }

    pub fn is_unique_violation(error: &sqlx::Error) -> bool {
        matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
    }

    /// `SQLITE_BUSY`/`SQLITE_LOCKED`, including their extended codes.
    pub fn is_busy(error: &sqlx::Error) -> bool {
        let sqlx::Error::Database(db) = error else {
            return false;
        };
        db.code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false)
    }
}
