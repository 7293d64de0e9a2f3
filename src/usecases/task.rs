use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::repository::TaskRepository;

/// Task CRUD orchestration. The only business rule is entity validation, which runs
/// before anything reaches the repository.
pub struct TaskUsecases {
    repo: Arc<dyn TaskRepository>,
}

impl TaskUsecases {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<Task>, AppError> {
        self.repo.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Task, AppError> {
        self.repo.get_by_id(id).await
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        let task = validated(input)?;
        self.repo.create(task).await
    }

    pub async fn update(&self, id: &str, input: TaskInput) -> Result<Task, AppError> {
        let task = validated(input)?;
        self.repo.update(id, task).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete(id).await
    }
}

fn validated(input: TaskInput) -> Result<Task, AppError> {
    input.validate()?;
    let task = Task::from_input(input)?;
    task.validate()?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::repository::InMemoryTaskRepository;

    fn usecases() -> TaskUsecases {
        TaskUsecases::new(Arc::new(InMemoryTaskRepository::new()))
    }

    fn input(title: &str, status: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            due_date: None,
            status: status.to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_create_and_fetch() {
        let tasks = usecases();
        let created = tasks.create(input("ship it", "pending")).await.unwrap();

        assert_eq!(created.status, TaskStatus::Pending);
        assert_eq!(created.description, "");
        assert_eq!(tasks.get_by_id(&created.id).await.unwrap(), created);
    }

    #[actix_rt::test]
    async fn test_invalid_create_persists_nothing() {
        let tasks = usecases();

        for bad in [input("", "pending"), input("title", "done"), input("title", "")] {
            assert!(matches!(
                tasks.create(bad).await,
                Err(AppError::Validation(_))
            ));
        }
        assert!(tasks.list_all().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_update_validates_and_reports_missing() {
        let tasks = usecases();
        let created = tasks.create(input("draft", "pending")).await.unwrap();

        assert!(matches!(
            tasks.update(&created.id, input("", "completed")).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(tasks.get_by_id(&created.id).await.unwrap().title, "draft");

        let updated = tasks
            .update(&created.id, input("final", "completed"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, TaskStatus::Completed);

        assert!(matches!(
            tasks.update("missing", input("final", "completed")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete() {
        let tasks = usecases();
        let created = tasks.create(input("temp", "in_progress")).await.unwrap();

        tasks.delete(&created.id).await.unwrap();
        assert!(matches!(
            tasks.delete(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
