//! In-memory repositories for tests and non-networked deployments.
//!
//! Each repository keeps its whole table behind one `Mutex`, so every
//! read-modify-write sequence (id assignment, check-then-update, the
//! uniqueness/emptiness checks before inserting a user) runs atomically.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use validator::Validate;

use super::{new_id, TaskRepository, UserRepository};
use crate::auth::password::PasswordHasher;
use crate::error::AppError;
use crate::models::{Role, Task, User};

fn lock<T>(table: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::Infrastructure("in-memory store lock poisoned".into()))
}

/// Tasks in insertion order.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        Ok(lock(&self.tasks)?.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Task, AppError> {
        lock(&self.tasks)?
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("task not found".into()))
    }

    async fn create(&self, mut task: Task) -> Result<Task, AppError> {
        let mut tasks = lock(&self.tasks)?;
        if task.id.is_empty() {
            task.id = new_id();
        } else if tasks.iter().any(|existing| existing.id == task.id) {
            return Err(AppError::Validation("task id already exists".into()));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: &str, mut task: Task) -> Result<Task, AppError> {
        let mut tasks = lock(&self.tasks)?;
        let slot = tasks
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| AppError::NotFound("task not found".into()))?;
        task.id = id.to_string();
        *slot = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tasks = lock(&self.tasks)?;
        let position = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::NotFound("task not found".into()))?;
        tasks.remove(position);
        Ok(())
    }
}

pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    hasher: PasswordHasher,
}

impl InMemoryUserRepository {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            hasher,
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(PasswordHasher::default())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        // Hash outside the lock; bcrypt is deliberately slow.
        let password_hash = self.hasher.hash(password)?;

        let mut users = lock(&self.users)?;
        if users.iter().any(|user| user.username == username) {
            return Err(AppError::UsernameTaken);
        }

        let role = if users.is_empty() { Role::Admin } else { Role::User };
        let user = User {
            id: new_id(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        };
        user.validate()?;

        users.push(user.clone());
        log::info!("registered user {} with role {}", user.username, user.role);
        Ok(user.without_credentials())
    }

    async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        lock(&self.users)?
            .iter()
            .find(|user| user.username == username)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    fn verify_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(&user.password_hash, password)
    }

    async fn promote_user(&self, id: &str) -> Result<(), AppError> {
        let mut users = lock(&self.users)?;
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;
        user.role = Role::Admin;
        Ok(())
    }

    async fn is_empty(&self) -> Result<bool, AppError> {
        Ok(lock(&self.users)?.is_empty())
    }
}
