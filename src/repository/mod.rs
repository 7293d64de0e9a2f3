//! Persistence ports.
//!
//! Business logic depends only on the [`TaskRepository`] and [`UserRepository`] traits.
//! Two interchangeable backends are provided and chosen at startup: a PostgreSQL store
//! ([`postgres`]) and an in-memory store ([`memory`]).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::{Task, User};

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Default bound on a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage contract for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Task>, AppError>;

    /// Fails with `AppError::NotFound` if no task has this id.
    async fn get_by_id(&self, id: &str) -> Result<Task, AppError>;

    /// Persists `task`, assigning a fresh id if `task.id` is empty.
    /// A supplied id that is already stored fails with `AppError::Validation`.
    async fn create(&self, task: Task) -> Result<Task, AppError>;

    /// Replaces the stored task `id`; the returned task carries `id`.
    async fn update(&self, id: &str, task: Task) -> Result<Task, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Storage contract for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Hashes `password` and stores a new user.
    ///
    /// Fails with `AppError::UsernameTaken` if the username exists. The first user
    /// stored in an empty repository is an admin. The returned user has no hash.
    async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError>;

    /// Returns the stored user including its password hash, for credential checks.
    async fn get_by_username(&self, username: &str) -> Result<User, AppError>;

    fn verify_password(&self, user: &User, password: &str) -> bool;

    async fn promote_user(&self, id: &str) -> Result<(), AppError>;

    async fn is_empty(&self) -> Result<bool, AppError>;
}

/// Runs a store operation under `limit`, turning an elapsed timer into an
/// infrastructure error.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            log::error!("store operation `{}` timed out after {:?}", operation, limit);
            Err(AppError::Infrastructure(format!(
                "{} timed out after {:?}",
                operation, limit
            )))
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_bounded_passes_results_through() {
        let ok = bounded(DEFAULT_STORE_TIMEOUT, "noop", async { Ok::<_, AppError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let missing = bounded(DEFAULT_STORE_TIMEOUT, "noop", async {
            Err::<(), _>(AppError::NotFound("task not found".into()))
        })
        .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_bounded_times_out() {
        let slow = bounded(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;

        assert!(matches!(slow, Err(AppError::Infrastructure(_))));
    }
}
