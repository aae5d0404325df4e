use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use crate::entities::task::task_application_entity::{
    TaskApplication, TaskApplicationDbService,
};
use crate::entities::task::task_entity::{
    Task, TaskApplicationStatus, TaskDbService, TaskStatus,
};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::utils::tags::normalize_tags;

#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusInput {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskWithApplications {
    #[serde(flatten)]
    pub task: Task,
    pub applications: Vec<TaskApplication>,
}

pub async fn create_task(state: &CtxState, ctx: &Ctx, input: TaskInput) -> CtxResult<Task> {
    let requester = ctx.user_thing()?;
    TaskDbService {
        db: &state.db.client,
        ctx,
    }
    .create(Task {
        id: None,
        title: input.title.trim().to_string(),
        description: input.description,
        tags: normalize_tags(&input.tags),
        estimated_hours: input.estimated_hours,
        requester,
        assignee: None,
        status: TaskStatus::Open,
        deleted_at: None,
        created_at: None,
        updated_at: None,
    })
    .await
}

pub async fn get_task(state: &CtxState, ctx: &Ctx, id: &Thing) -> CtxResult<TaskWithApplications> {
    let task = TaskDbService {
        db: &state.db.client,
        ctx,
    }
    .get_active(id)
    .await?;
    let applications = TaskApplicationDbService {
        db: &state.db.client,
        ctx,
    }
    .list_by_task(id)
    .await?;
    Ok(TaskWithApplications { task, applications })
}

/// Apply the requester-only status state machine.
pub async fn set_status(
    state: &CtxState,
    ctx: &Ctx,
    id: &Thing,
    to: TaskStatus,
) -> CtxResult<Task> {
    let user = ctx.user_thing()?;
    let task_service = TaskDbService {
        db: &state.db.client,
        ctx,
    };
    let task = task_service.get_active(id).await?;
    if task.requester != user {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "task requester".to_string(),
        }));
    }
    if !task.status.can_transition(to) {
        return Err(ctx.to_ctx_error(AppError::InvalidTransition {
            from: task.status.to_string(),
            to: to.to_string(),
        }));
    }
    task_service.set_status(id, to).await
}

pub async fn delete_task(state: &CtxState, ctx: &Ctx, id: &Thing) -> CtxResult<()> {
    let user = ctx.user_thing()?;
    let task_service = TaskDbService {
        db: &state.db.client,
        ctx,
    };
    let task = task_service.get_active(id).await?;
    if task.requester != user {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "task requester".to_string(),
        }));
    }
    task_service.soft_delete(id).await
}

/// Offer to take an open task. One application per (task, user): a second
/// attempt while the first is live reports "already applied"; a withdrawn
/// one flips back to applied.
pub async fn apply(state: &CtxState, ctx: &Ctx, task_id: &Thing) -> CtxResult<TaskApplication> {
    let applicant = ctx.user_thing()?;
    let task = TaskDbService {
        db: &state.db.client,
        ctx,
    }
    .get_active(task_id)
    .await?;
    if task.requester == applicant {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "someone other than the requester".to_string(),
        }));
    }
    if task.status != TaskStatus::Open {
        return Err(ctx.to_ctx_error(AppError::Validation {
            description: format!("Task is not open for applications (status {})", task.status),
        }));
    }

    let application_service = TaskApplicationDbService {
        db: &state.db.client,
        ctx,
    };
    match application_service
        .get_by_task_and_applicant(task_id, &applicant)
        .await?
    {
        Some(existing) if existing.status == TaskApplicationStatus::Applied => {
            Err(ctx.to_ctx_error(AppError::AlreadyApplied))
        }
        Some(existing) => {
            let id = existing
                .id
                .ok_or_else(|| ctx.to_ctx_error(AppError::Generic {
                    description: "application has no id".to_string(),
                }))?;
            application_service
                .set_status(&id, TaskApplicationStatus::Applied)
                .await
        }
        None => {
            application_service
                .create(TaskApplication {
                    id: None,
                    task: task_id.clone(),
                    applicant,
                    status: TaskApplicationStatus::Applied,
                    created_at: None,
                    updated_at: None,
                })
                .await
        }
    }
}

pub async fn withdraw(
    state: &CtxState,
    ctx: &Ctx,
    application_id: &Thing,
) -> CtxResult<TaskApplication> {
    let user = ctx.user_thing()?;
    let application_service = TaskApplicationDbService {
        db: &state.db.client,
        ctx,
    };
    let application = application_service.get(application_id).await?;
    if application.applicant != user {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "the applicant".to_string(),
        }));
    }
    let id = application
        .id
        .ok_or_else(|| ctx.to_ctx_error(AppError::Generic {
            description: "application has no id".to_string(),
        }))?;
    application_service
        .set_status(&id, TaskApplicationStatus::Withdrawn)
        .await
}
