use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::database::client::Database;
use crate::entities::entry::entry_entity::EntryDbService;
use crate::entities::entry::entry_recipient_entity::EntryRecipientDbService;
use crate::entities::evaluation::detailed_evaluation_entity::DetailedEvaluationDbService;
use crate::entities::evaluation::evaluation_axis_entity::EvaluationAxisDbService;
use crate::entities::guild_entity::GuildDbService;
use crate::entities::monthly_value_score_entity::MonthlyValueScoreDbService;
use crate::entities::quarterly_reflection_entity::QuarterlyReflectionDbService;
use crate::entities::task::task_application_entity::TaskApplicationDbService;
use crate::entities::task::task_entity::TaskDbService;
use crate::entities::user_auth::login_code_entity::LoginCodeDbService;
use crate::entities::user_auth::profile_entity::ProfileDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::AppError;
use crate::middleware::mw_ctx::CtxState;
use crate::routes;

/// Define every table and seed fixed reference data. Tables referenced by
/// record fields are defined before their dependents.
pub async fn run_migrations(db: &Database) -> Result<(), AppError> {
    let ctx = Ctx::new(Err(AppError::AuthFailNoJwtCookie), Uuid::new_v4());
    let client = &db.client;

    ProfileDbService { db: client, ctx: &ctx }.mutate_db().await?;
    GuildDbService { db: client, ctx: &ctx }.mutate_db().await?;
    LoginCodeDbService { db: client, ctx: &ctx }.mutate_db().await?;
    EntryDbService { db: client, ctx: &ctx }.mutate_db().await?;
    EntryRecipientDbService { db: client, ctx: &ctx }.mutate_db().await?;
    EvaluationAxisDbService { db: client, ctx: &ctx }.mutate_db().await?;
    DetailedEvaluationDbService { db: client, ctx: &ctx }.mutate_db().await?;
    TaskDbService { db: client, ctx: &ctx }.mutate_db().await?;
    TaskApplicationDbService { db: client, ctx: &ctx }.mutate_db().await?;
    MonthlyValueScoreDbService { db: client, ctx: &ctx }.mutate_db().await?;
    QuarterlyReflectionDbService { db: client, ctx: &ctx }.mutate_db().await?;

    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    let mut router = Router::new()
        .route("/hc", get(|| async { "ok" }))
        .merge(routes::user_auth::login_routes::routes())
        .merge(routes::entries::routes())
        .merge(routes::tasks::routes())
        .merge(routes::dashboard::routes())
        .merge(routes::reflections::routes())
        .merge(routes::exports::routes())
        .merge(routes::integrations::routes());

    if ctx_state.is_development {
        router = router.merge(routes::dev::routes());
    }

    router
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx_state.clone())
}
