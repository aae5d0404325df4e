use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;

#[derive(Debug, Deserialize, Validate)]
pub struct AsanaTaskInput {
    #[validate(length(min = 1, max = 500))]
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_on: Option<String>,
}

/// Create a task in the configured Asana project on behalf of the logged-in
/// user. Credentials come from the environment; when they are missing the
/// caller gets a "not configured" error instead of a broken proxy call.
pub async fn create_asana_task(
    state: &CtxState,
    ctx: &Ctx,
    input: AsanaTaskInput,
) -> CtxResult<serde_json::Value> {
    ctx.user_thing()?;
    let asana = state.asana.as_ref().ok_or_else(|| {
        ctx.to_ctx_error(AppError::NotConfigured {
            feature: "Asana integration".to_string(),
        })
    })?;

    let mut data = json!({
        "name": input.name,
        "workspace": asana.workspace_gid,
        "projects": [asana.project_gid],
    });
    if let Some(notes) = input.notes {
        data["notes"] = json!(notes);
    }
    if let Some(due_on) = input.due_on {
        data["due_on"] = json!(due_on);
    }

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/tasks", asana.api_url))
        .bearer_auth(&asana.pat)
        .json(&json!({ "data": data }))
        .send()
        .await
        .map_err(|err| {
            ctx.to_ctx_error(AppError::Upstream {
                status: 0,
                message: err.to_string(),
            })
        })?;

    let status = response.status();
    let body: serde_json::Value = response.json().await.map_err(|err| {
        ctx.to_ctx_error(AppError::Upstream {
            status: status.as_u16(),
            message: err.to_string(),
        })
    })?;

    if !status.is_success() {
        return Err(ctx.to_ctx_error(AppError::Upstream {
            status: status.as_u16(),
            message: body
                .get("errors")
                .map(|e| e.to_string())
                .unwrap_or_else(|| status.to_string()),
        }));
    }

    Ok(body)
}
