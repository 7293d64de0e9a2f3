use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::repository::UserRepository;

/// Registration, login and promotion.
pub struct UserUsecases {
    repo: Arc<dyn UserRepository>,
}

impl UserUsecases {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Creates an account. The first account in an empty store becomes an admin.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        self.repo.create_user(username, password).await
    }

    /// Checks a username/password pair.
    ///
    /// An unknown username and a wrong password both yield
    /// `AppError::InvalidCredentials`. Store failures are passed through unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = match self.repo.get_by_username(username).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !self.repo.verify_password(&user, password) {
            log::debug!("password mismatch for {}", user.username);
            return Err(AppError::InvalidCredentials);
        }

        Ok(user.without_credentials())
    }

    pub async fn promote(&self, id: &str) -> Result<(), AppError> {
        self.repo.promote_user(id).await?;
        log::info!("promoted user {} to admin", id);
        Ok(())
    }
}
