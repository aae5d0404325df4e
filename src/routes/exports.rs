use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::services::export_service;
use crate::utils::week::current_month;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/exports/entries.csv", get(entries_csv))
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    month: Option<String>,
}

async fn entries_csv(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<MonthQuery>,
) -> CtxResult<Response> {
    ctx.user_thing()?;
    let month = query.month.unwrap_or_else(current_month);
    let csv = export_service::entries_csv(&state, &ctx, &month).await?;
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"entries_{month}.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}
