use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::{Cookie, Cookies};
use validator::Validate;

use crate::entities::guild_entity::{Guild, GuildDbService};
use crate::entities::monthly_value_score_entity::MonthlyValueScoreDbService;
use crate::entities::user_auth::profile_entity::{Profile, ProfileDbService};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::middleware::utils::string_utils::get_str_thing;

/// Seeding endpoints for local development and integration tests. Only
/// merged into the router when the server runs in development mode.
pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/test/api/register", post(register))
        .route("/test/api/value-scores", post(seed_value_scores))
        .route("/test/api/guilds", post(create_guild))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValueScoreInput {
    pub user_id: String,
    #[validate(length(min = 10, max = 10))]
    pub month: String,
    #[validate(range(min = 0.0))]
    pub total_hours: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub avg_rating: f64,
    #[serde(default)]
    pub feedback_count: u32,
    #[validate(range(min = 0.0))]
    pub value_score: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GuildInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Create (or reuse) a profile and log it in, skipping the email code.
async fn register(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    cookies: Cookies,
    JsonOrFormValidated(input): JsonOrFormValidated<RegisterInput>,
) -> CtxResult<Json<Profile>> {
    let profile_service = ProfileDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let profile = match profile_service.get_by_email(&input.email).await {
        Ok(existing) => existing,
        Err(_) => {
            let mut profile = Profile::new(input.email.clone(), input.display_name.clone());
            profile.is_admin = input.is_admin;
            profile_service.create(profile).await?
        }
    };

    let user = profile
        .id
        .clone()
        .ok_or_else(|| ctx.to_ctx_error(AppError::AuthenticationFail))?;
    let token = state
        .jwt
        .create_by_login(&user.to_raw())
        .map_err(|err| {
            ctx.to_ctx_error(AppError::Generic {
                description: format!("token creation failed: {err}"),
            })
        })?;
    let mut cookie = Cookie::new(JWT_KEY, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    Ok(Json(profile))
}

async fn seed_value_scores(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<ValueScoreInput>,
) -> CtxResult<Json<serde_json::Value>> {
    let user = get_str_thing(&input.user_id).map_err(|e| ctx.to_ctx_error(e))?;
    MonthlyValueScoreDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .upsert(
        &user,
        &input.month,
        input.total_hours,
        input.avg_rating,
        input.feedback_count,
        input.value_score,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn create_guild(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<GuildInput>,
) -> CtxResult<Json<Guild>> {
    let guild = GuildDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .create(Guild {
        id: None,
        name: input.name,
        description: input.description,
        created_at: None,
    })
    .await?;
    Ok(Json(guild))
}
