use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::{Cookie, Cookies};
use validator::Validate;

use crate::entities::user_auth::profile_entity::{Profile, ProfileDbService};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::services::auth_service;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/login/start", post(login_start))
        .route("/api/login/verify", post(login_verify))
        .route("/api/logout", post(logout))
        .route("/api/users/current", get(current_user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginStartInput {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginVerifyInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 6))]
    pub code: String,
}

async fn login_start(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<LoginStartInput>,
) -> CtxResult<Json<serde_json::Value>> {
    auth_service::start_login(&state, &ctx, &input.email).await?;
    Ok(Json(json!({ "success": true })))
}

async fn login_verify(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    cookies: Cookies,
    JsonOrFormValidated(input): JsonOrFormValidated<LoginVerifyInput>,
) -> CtxResult<Json<Profile>> {
    let (profile, token) = auth_service::verify_login(&state, &ctx, &input.email, &input.code).await?;

    let mut cookie = Cookie::new(JWT_KEY, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    Ok(Json(profile))
}

async fn logout(cookies: Cookies) -> Json<serde_json::Value> {
    let mut cookie = Cookie::from(JWT_KEY);
    cookie.set_path("/");
    cookies.remove(cookie);
    Json(json!({ "success": true }))
}

async fn current_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Profile>> {
    let profile = ProfileDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user()
    .await?;
    Ok(Json(profile))
}
