use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use surrealdb::sql::Thing;

use crate::entities::entry::entry_entity::{EntryDbService, TABLE_NAME};
use crate::entities::evaluation::evaluation_axis_entity::{EvaluationAxis, EvaluationAxisDbService};
use crate::entities::guild_entity::{Guild, GuildDbService};
use crate::entities::user_auth::profile_entity::{Profile, ProfileDbService};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{Pagination, ViewFieldSelector};
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::middleware::utils::string_utils::get_path_thing;
use crate::services::entry_service::{self, EntryInput, EntryWithRecipients};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/tags", get(entry_tags))
        .route(
            "/api/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/api/recipients", get(recipient_options))
        .route("/api/evaluation-axes", get(evaluation_axes))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListView {
    pub id: Thing,
    pub week_start: String,
    pub hours: f64,
    pub tags: Vec<String>,
    pub note: String,
    pub contributor: Thing,
    pub contributor_name: String,
}

impl ViewFieldSelector for EntryListView {
    fn get_select_query_fields() -> String {
        "id, week_start, hours, tags, note, contributor, contributor.display_name as contributor_name"
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub count: Option<i8>,
    pub start: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecipientOptions {
    pub users: Vec<Profile>,
    pub guilds: Vec<Guild>,
}

async fn create_entry(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<EntryInput>,
) -> CtxResult<Json<EntryWithRecipients>> {
    let created = entry_service::create_entry(&state, &ctx, input).await?;
    Ok(Json(created))
}

async fn list_entries(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<ListQuery>,
) -> CtxResult<Json<Vec<EntryListView>>> {
    let entries = EntryDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_view::<EntryListView>(Some(Pagination {
        order_by: None,
        order_dir: None,
        count: query.count.unwrap_or(20),
        start: query.start.unwrap_or(0),
    }))
    .await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<EntryWithRecipients>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let entry = entry_service::get_entry(&state, &ctx, &thing).await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<EntryInput>,
) -> CtxResult<Json<EntryWithRecipients>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    let updated = entry_service::update_entry(&state, &ctx, &thing, input).await?;
    Ok(Json(updated))
}

async fn delete_entry(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    let thing = get_path_thing(TABLE_NAME, &id).map_err(|e| ctx.to_ctx_error(e))?;
    entry_service::delete_entry(&state, &ctx, &thing).await?;
    Ok(Json(json!({ "success": true })))
}

async fn entry_tags(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<String>>> {
    let tags = entry_service::distinct_tags(&state, &ctx).await?;
    Ok(Json(tags))
}

async fn recipient_options(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<RecipientOptions>> {
    ctx.user_thing()?;
    let users = ProfileDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_active()
    .await?;
    let guilds = GuildDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list()
    .await?;
    Ok(Json(RecipientOptions { users, guilds }))
}

async fn evaluation_axes(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<EvaluationAxis>>> {
    ctx.user_thing()?;
    let axes = EvaluationAxisDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list()
    .await?;
    Ok(Json(axes))
}
