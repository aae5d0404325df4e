use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::entities::quarterly_reflection_entity::{
    QuarterlyReflection, QuarterlyReflectionDbService,
};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route(
        "/api/reflections",
        get(list_reflections).post(upsert_reflection),
    )
}

static QUARTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-Q[1-4]$").expect("valid quarter regex"));

fn validate_quarter(value: &str) -> Result<(), ValidationError> {
    if QUARTER_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("quarter"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReflectionInput {
    #[validate(custom(function = validate_quarter))]
    pub quarter: String,
    #[validate(length(min = 1, max = 2000))]
    pub reflection: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

async fn upsert_reflection(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<ReflectionInput>,
) -> CtxResult<Json<QuarterlyReflection>> {
    let user = ctx.user_thing()?;
    let saved = QuarterlyReflectionDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .upsert(&user, &input.quarter, &input.reflection, &input.actions)
    .await?;
    Ok(Json(saved))
}

async fn list_reflections(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<QuarterlyReflection>>> {
    let user = ctx.user_thing()?;
    let reflections = QuarterlyReflectionDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_for_user(&user)
    .await?;
    Ok(Json(reflections))
}
