use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::services::aggregation::{AxisTrend, KpiStats, TagHours, WeekHours};
use crate::services::dashboard_service::{
    self, LeaderboardRow, QuarterlySummary, RecentEntryView,
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/dashboard/kpi", get(kpi))
        .route("/api/dashboard/weekly", get(weekly))
        .route("/api/dashboard/tags", get(tags))
        .route("/api/dashboard/top-contributors", get(top_contributors))
        .route("/api/dashboard/top-value", get(top_value))
        .route("/api/dashboard/evaluation-trends", get(evaluation_trends))
        .route("/api/dashboard/recent", get(recent))
        .route("/api/dashboard/quarterly", get(quarterly))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn kpi(State(state): State<Arc<CtxState>>, ctx: Ctx) -> CtxResult<Json<KpiStats>> {
    Ok(Json(dashboard_service::kpi(&state, &ctx).await?))
}

async fn weekly(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LimitQuery>,
) -> CtxResult<Json<Vec<WeekHours>>> {
    let rows = dashboard_service::weekly(&state, &ctx, query.limit.unwrap_or(12)).await?;
    Ok(Json(rows))
}

async fn tags(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LimitQuery>,
) -> CtxResult<Json<Vec<TagHours>>> {
    ctx.user_thing()?;
    let rows = dashboard_service::tags(&state, &ctx, query.limit.unwrap_or(10)).await?;
    Ok(Json(rows))
}

async fn top_contributors(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LimitQuery>,
) -> CtxResult<Json<Vec<LeaderboardRow>>> {
    ctx.user_thing()?;
    let rows =
        dashboard_service::top_contributors(&state, &ctx, query.limit.unwrap_or(5)).await?;
    Ok(Json(rows))
}

async fn top_value(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LimitQuery>,
) -> CtxResult<Json<Vec<LeaderboardRow>>> {
    ctx.user_thing()?;
    let rows = dashboard_service::top_value(&state, &ctx, query.limit.unwrap_or(5)).await?;
    Ok(Json(rows))
}

async fn evaluation_trends(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<AxisTrend>>> {
    let rows = dashboard_service::evaluation_trends(&state, &ctx).await?;
    Ok(Json(rows))
}

async fn recent(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<LimitQuery>,
) -> CtxResult<Json<Vec<RecentEntryView>>> {
    ctx.user_thing()?;
    let limit = query.limit.unwrap_or(10).min(i8::MAX as usize) as i8;
    let rows = dashboard_service::recent(&state, &ctx, limit).await?;
    Ok(Json(rows))
}

async fn quarterly(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Option<QuarterlySummary>>> {
    let summary = dashboard_service::quarterly(&state, &ctx).await?;
    Ok(Json(summary))
}
