use hearth_domain::shared::DomainError;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Attempts made before a conflict is reported to the caller.
pub const CONFLICT_ATTEMPTS: u32 = 5;

const BACKOFF_STEP: Duration = Duration::from_millis(25);

/// Run `op` again while it fails with `StorageConflict`.
///
/// Each attempt must open its own transaction and be safe to repeat. A
/// conflict that outlasts every attempt becomes `Infrastructure`, so
/// `StorageConflict` never reaches the caller.
pub async fn retry_on_conflict<T, F, Fut>(label: &str, mut op: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_storage_conflict() && attempt < CONFLICT_ATTEMPTS => {
                warn!(
                    "{} conflicted (attempt {}/{}), retrying: {}",
                    label,
                    attempt,
                    CONFLICT_ATTEMPTS,
                    e.format_with_code()
                );
                tokio::time::sleep(BACKOFF_STEP * attempt).await;
                attempt += 1;
            }
            Err(e) if e.is_storage_conflict() => {
                return Err(DomainError::Infrastructure(format!(
                    "{}: store stayed busy after {} attempts: {}",
                    label,
                    attempt,
                    e.message()
                )));
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_until_the_store_frees_up() {
        let calls = &AtomicU32::new(0);

        let result = retry_on_conflict("Mark day", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DomainError::StorageConflict("database is locked".to_string()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_conflict_is_not_reported_as_conflict() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_on_conflict("Mark day", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::StorageConflict("database is locked".to_string()))
        })
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(calls.load(Ordering::SeqCst), CONFLICT_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_on_conflict("Mark day", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::InvalidDate("2024-01-07".to_string()))
        })
        .await;

        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
