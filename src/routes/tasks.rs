use crate::{
    auth::{AdminUser, AuthenticatedUser},
    error::AppError,
    models::TaskInput,
    usecases::TaskUsecases,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists every task.
///
/// ## Responses:
/// - `200 OK`: `{"data": [task, ...]}`.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(
    _user: AuthenticatedUser,
    tasks: web::Data<TaskUsecases>,
) -> Result<impl Responder, AppError> {
    let all = tasks.list_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "data": all })))
}

/// Creates a new task.
///
/// ## Request Body:
/// - `title`: required, 1 to 200 characters.
/// - `description` (optional).
/// - `due_date` (optional): RFC 3339 timestamp.
/// - `status`: one of `pending`, `in_progress`, `completed`.
///
/// ## Responses:
/// - `201 Created`: `{"data": task}`.
/// - `422 Unprocessable Entity`: Empty title or unknown status.
#[post("")]
pub async fn create_task(
    user: AuthenticatedUser,
    tasks: web::Data<TaskUsecases>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(task_data.into_inner()).await?;
    log::debug!("{} created task {}", user.username, task.id);

    Ok(HttpResponse::Created().json(json!({ "data": task })))
}

#[get("/{id}")]
pub async fn get_task(
    _user: AuthenticatedUser,
    tasks: web::Data<TaskUsecases>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_by_id(&task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": task })))
}

/// Replaces an existing task. Same body and validation as `create_task`.
///
/// ## Responses:
/// - `200 OK`: `{"data": task}`.
/// - `404 Not Found`: No task has this id.
/// - `422 Unprocessable Entity`: Invalid input.
#[put("/{id}")]
pub async fn update_task(
    _user: AuthenticatedUser,
    tasks: web::Data<TaskUsecases>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(&task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "data": task })))
}

/// Deletes a task. Admin only.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The caller is not an admin.
/// - `404 Not Found`: No task has this id.
#[delete("/{id}")]
pub async fn delete_task(
    admin: AdminUser,
    tasks: web::Data<TaskUsecases>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    tasks.delete(&id).await?;
    log::info!("{} deleted task {}", admin.0.username, id);

    Ok(HttpResponse::NoContent().finish())
}
