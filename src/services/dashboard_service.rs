use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::entities::entry::entry_entity::EntryDbService;
use crate::entities::entry::entry_recipient_entity::EntryRecipientDbService;
use crate::entities::evaluation::detailed_evaluation_entity::DetailedEvaluationDbService;
use crate::entities::evaluation::evaluation_axis_entity::AXES;
use crate::entities::monthly_value_score_entity::{MonthlyValueScore, MonthlyValueScoreDbService};
use crate::entities::quarterly_reflection_entity::{
    QuarterlyAction, QuarterlyReflection, QuarterlyReflectionDbService,
};
use crate::entities::user_auth::profile_entity::ProfileDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{IdentIdName, ViewFieldSelector};
use crate::services::aggregation::{
    self, AxisTrend, KpiStats, TagHours, WeekHours,
};
use crate::utils::week::{current_month, month_key};

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub display_name: String,
    pub total_hours: f64,
    pub avg_rating: f64,
    pub value_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentEntryView {
    pub id: Thing,
    pub week_start: String,
    pub hours: f64,
    pub tags: Vec<String>,
    pub note: String,
    pub contributor_name: String,
}

impl ViewFieldSelector for RecentEntryView {
    fn get_select_query_fields() -> String {
        "id, week_start, hours, tags, note, contributor.display_name as contributor_name"
            .to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuarterlySummary {
    #[serde(flatten)]
    pub reflection: QuarterlyReflection,
    pub actions: Vec<QuarterlyAction>,
}

pub async fn kpi(state: &CtxState, ctx: &Ctx) -> CtxResult<KpiStats> {
    let user = ctx.user_thing()?;
    let entries = EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .list_all()
    .await?;
    let recipients = EntryRecipientDbService {
        db: &state.db.client,
        ctx,
    }
    .list_all()
    .await?;
    let evaluations = DetailedEvaluationDbService {
        db: &state.db.client,
        ctx,
    }
    .list_by_evaluated(&user)
    .await?;
    Ok(aggregation::kpi_stats(
        &user,
        &entries,
        &recipients,
        &evaluations,
    ))
}

pub async fn weekly(state: &CtxState, ctx: &Ctx, limit: usize) -> CtxResult<Vec<WeekHours>> {
    let user = ctx.user_thing()?;
    let entries = EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .list_by_contributor(&user)
    .await?;
    Ok(aggregation::weekly_series(&entries, &user, limit))
}

pub async fn tags(state: &CtxState, ctx: &Ctx, limit: usize) -> CtxResult<Vec<TagHours>> {
    let entries = EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .list_all()
    .await?;
    Ok(aggregation::tag_distribution(&entries, limit))
}

async fn with_names(
    state: &CtxState,
    ctx: &Ctx,
    rows: Vec<MonthlyValueScore>,
) -> CtxResult<Vec<LeaderboardRow>> {
    let profile_service = ProfileDbService {
        db: &state.db.client,
        ctx,
    };
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let profile = profile_service
            .get(IdentIdName::Id(row.user.clone()))
            .await?;
        out.push(LeaderboardRow {
            user_id: row.user.to_raw(),
            display_name: profile.display_name,
            total_hours: row.total_hours,
            avg_rating: row.avg_rating,
            value_score: row.value_score,
        });
    }
    Ok(out)
}

pub async fn top_contributors(
    state: &CtxState,
    ctx: &Ctx,
    limit: usize,
) -> CtxResult<Vec<LeaderboardRow>> {
    let month = month_key(&current_month());
    let scores = MonthlyValueScoreDbService {
        db: &state.db.client,
        ctx,
    }
    .list_for_month(&month)
    .await?;
    with_names(state, ctx, aggregation::top_by_hours(&scores, limit)).await
}

pub async fn top_value(
    state: &CtxState,
    ctx: &Ctx,
    limit: usize,
) -> CtxResult<Vec<LeaderboardRow>> {
    let month = month_key(&current_month());
    let scores = MonthlyValueScoreDbService {
        db: &state.db.client,
        ctx,
    }
    .list_for_month(&month)
    .await?;
    with_names(state, ctx, aggregation::top_by_value(&scores, limit)).await
}

pub async fn evaluation_trends(state: &CtxState, ctx: &Ctx) -> CtxResult<Vec<AxisTrend>> {
    let user = ctx.user_thing()?;
    let evaluations = DetailedEvaluationDbService {
        db: &state.db.client,
        ctx,
    }
    .list_by_evaluated(&user)
    .await?;
    Ok(aggregation::evaluation_trends(&AXES, &evaluations, &user))
}

pub async fn recent(
    state: &CtxState,
    ctx: &Ctx,
    limit: i8,
) -> CtxResult<Vec<RecentEntryView>> {
    EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .recent_view::<RecentEntryView>(limit)
    .await
}

pub async fn quarterly(state: &CtxState, ctx: &Ctx) -> CtxResult<Option<QuarterlySummary>> {
    let user = ctx.user_thing()?;
    let reflection_service = QuarterlyReflectionDbService {
        db: &state.db.client,
        ctx,
    };
    let reflection = match reflection_service.latest_for_user(&user).await? {
        Some(reflection) => reflection,
        None => return Ok(None),
    };
    let actions = match reflection.id.as_ref() {
        Some(id) => reflection_service.actions_for(id).await?,
        None => vec![],
    };
    Ok(Some(QuarterlySummary {
        reflection,
        actions,
    }))
}
