use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::entities::task::task_application_entity::{
    TaskApplication, TABLE_NAME as APPLICATION_TABLE,
};
use crate::entities::task::task_entity::{Task, TaskDbService, TABLE_NAME};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::middleware::utils::string_utils::get_path_thing;
use crate::services::task_service::{
    self, TaskInput, TaskStatusInput, TaskWithApplications,
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", get(get_task).delete(delete_task))
        .route("/api/tasks/:id/status", post(set_status))
        .route("/api/tasks/:id/apply", post(apply))
        .route("/api/applications/:id/withdraw", post(withdraw))
}

async fn create_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<TaskInput>,
) -> CtxResult<Json<Task>> {
    let created = task_service::create_task(&state, &ctx, input).await?;
    Ok(Json(created))
}

async fn list_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<Task>>> {
    ctx.user_thing()?;
    let tasks = TaskDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_active()
    .await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<TaskWithApplications>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let task = task_service::get_task(&state, &ctx, &thing).await?;
    Ok(Json(task))
}

async fn set_status(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
    Json(input): Json<TaskStatusInput>,
) -> CtxResult<Json<Task>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let task = task_service::set_status(&state, &ctx, &thing, input.status).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    task_service::delete_task(&state, &ctx, &thing).await?;
    Ok(Json(json!({ "success": true })))
}

async fn apply(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<TaskApplication>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let application = task_service::apply(&state, &ctx, &thing).await?;
    Ok(Json(application))
}

async fn withdraw(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<TaskApplication>> {
    let thing = get_path_thing(APPLICATION_TABLE, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let application = task_service::withdraw(&state, &ctx, &thing).await?;
    Ok(Json(application))
}
