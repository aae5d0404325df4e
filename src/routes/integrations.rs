use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::services::integration_service::{self, AsanaTaskInput};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/integrations/tasks", post(create_task))
}

async fn create_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<AsanaTaskInput>,
) -> CtxResult<Json<serde_json::Value>> {
    let created = integration_service::create_asana_task(&state, &ctx, input).await?;
    Ok(Json(created))
}
