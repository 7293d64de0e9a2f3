//! PostgreSQL repositories over a shared `sqlx` pool.
//!
//! Every operation is bounded by the configured store timeout. The schema lives in
//! `migrations/` and is applied by [`connect`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use super::{bounded, new_id, TaskRepository, UserRepository};
use crate::auth::password::PasswordHasher;
use crate::error::AppError;
use crate::models::{Role, Task, User};

const UNIQUE_VIOLATION: &str = "23505";

/// Opens a pool against `database_url` (optionally overriding its database name) and
/// runs pending migrations.
pub async fn connect(
    database_url: &str,
    database_name: Option<&str>,
    timeout: Duration,
) -> Result<PgPool, AppError> {
    let mut options = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Unconfigured(format!("invalid DATABASE_URL: {}", e)))?;
    if let Some(name) = database_name {
        options = options.database(name);
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Infrastructure(format!("migration failed: {}", e)))?;

    log::info!("connected to PostgreSQL and applied migrations");
    Ok(pool)
}

pub struct PgTaskRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        bounded(self.timeout, "list tasks", async {
            let tasks = sqlx::query_as::<_, Task>(
                "SELECT id, title, description, due_date, status FROM tasks ORDER BY created_at",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(tasks)
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Task, AppError> {
        bounded(self.timeout, "get task", async {
            sqlx::query_as::<_, Task>(
                "SELECT id, title, description, due_date, status FROM tasks WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("task not found".into()))
        })
        .await
    }

    async fn create(&self, mut task: Task) -> Result<Task, AppError> {
        if task.id.is_empty() {
            task.id = new_id();
        }

        bounded(self.timeout, "create task", async {
            let created = sqlx::query_as::<_, Task>(
                "INSERT INTO tasks (id, title, description, due_date, status)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, title, description, due_date, status",
            )
            .bind(&task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Validation("task id already exists".into())
                } else {
                    AppError::from(e)
                }
            })?;
            Ok(created)
        })
        .await
    }

    async fn update(&self, id: &str, task: Task) -> Result<Task, AppError> {
        bounded(self.timeout, "update task", async {
            sqlx::query_as::<_, Task>(
                "UPDATE tasks
                 SET title = $1, description = $2, due_date = $3, status = $4
                 WHERE id = $5
                 RETURNING id, title, description, due_date, status",
            )
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("task not found".into()))
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        bounded(self.timeout, "delete task", async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("task not found".into()));
            }
            Ok(())
        })
        .await
    }
}

pub struct PgUserRepository {
    pool: PgPool,
    timeout: Duration,
    hasher: PasswordHasher,
}

impl PgUserRepository {
    pub fn new(pool: PgPool, timeout: Duration, hasher: PasswordHasher) -> Self {
        Self {
            pool,
            timeout,
            hasher,
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password_hash = self.hasher.hash(password)?;

        bounded(self.timeout, "create user", async {
            let mut tx = self.pool.begin().await?;

            // Serializes concurrent registrations so the emptiness check and the
            // insert cannot interleave.
            sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;

            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                    .bind(username)
                    .fetch_one(&mut *tx)
                    .await?;
            if taken {
                return Err(AppError::UsernameTaken);
            }

            let empty: bool = sqlx::query_scalar("SELECT NOT EXISTS (SELECT 1 FROM users)")
                .fetch_one(&mut *tx)
                .await?;

            let user = User {
                id: new_id(),
                username: username.to_string(),
                password_hash,
                role: if empty { Role::Admin } else { Role::User },
                created_at: Utc::now(),
            };
            user.validate()?;

            sqlx::query(
                "INSERT INTO users (id, username, password_hash, role, created_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::UsernameTaken
                } else {
                    AppError::from(e)
                }
            })?;

            tx.commit().await?;
            log::info!("registered user {} with role {}", user.username, user.role);
            Ok(user.without_credentials())
        })
        .await
    }

    async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        bounded(self.timeout, "get user", async {
            sqlx::query_as::<_, User>(
                "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
        })
        .await
    }

    fn verify_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(&user.password_hash, password)
    }

    async fn promote_user(&self, id: &str) -> Result<(), AppError> {
        bounded(self.timeout, "promote user", async {
            let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
                .bind(Role::Admin)
                .bind(id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("user not found".into()));
            }
            Ok(())
        })
        .await
    }

    async fn is_empty(&self) -> Result<bool, AppError> {
        bounded(self.timeout, "count users", async {
            let empty: bool = sqlx::query_scalar("SELECT NOT EXISTS (SELECT 1 FROM users)")
                .fetch_one(&self.pool)
                .await?;
            Ok(empty)
        })
        .await
    }
}
