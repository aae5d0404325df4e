use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use crate::entities::entry::entry_entity::{Entry, EntryDbService, EntryUpdate};
use crate::entities::entry::entry_recipient_entity::{
    EntryRecipient, EntryRecipientDbService, RecipientType,
};
use crate::entities::evaluation::detailed_evaluation_entity::{
    DetailedEvaluation, DetailedEvaluationDbService,
};
use crate::entities::evaluation::evaluation_axis_entity::is_known_axis;
use crate::entities::user_auth::profile_entity::ProfileDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::string_utils::get_str_thing;
use crate::utils::tags::normalize_tags;
use crate::utils::week::normalize_week_start;

#[derive(Debug, Deserialize, Validate)]
pub struct RecipientInput {
    pub id: String,
    pub recipient_type: RecipientType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluationInput {
    pub evaluated: String,
    pub axis_key: String,
    #[validate(range(min = 1, max = 5))]
    pub score: u8,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EntryInput {
    pub week_start: String,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub hours: f64,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub recipients: Vec<RecipientInput>,
    #[validate(nested)]
    #[serde(default)]
    pub evaluations: Vec<EvaluationInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryWithRecipients {
    #[serde(flatten)]
    pub entry: Entry,
    pub recipients: Vec<EntryRecipient>,
}

fn parse_recipients(
    ctx: &Ctx,
    inputs: &[RecipientInput],
) -> CtxResult<Vec<(Thing, RecipientType)>> {
    inputs
        .iter()
        .map(|r| {
            let thing = get_str_thing(&r.id).map_err(|e| ctx.to_ctx_error(e))?;
            Ok((thing, r.recipient_type))
        })
        .collect()
}

fn validate_evaluations(ctx: &Ctx, evaluations: &[EvaluationInput]) -> CtxResult<()> {
    for evaluation in evaluations {
        if !is_known_axis(&evaluation.axis_key) {
            return Err(ctx.to_ctx_error(AppError::Validation {
                description: format!("Unknown evaluation axis: {}", evaluation.axis_key),
            }));
        }
    }
    Ok(())
}

/// Ensure the acting user may mutate the entry: its contributor, or an
/// admin.
async fn authorize_mutation(state: &CtxState, ctx: &Ctx, entry: &Entry) -> CtxResult<Thing> {
    let profile_service = ProfileDbService {
        db: &state.db.client,
        ctx,
    };
    let profile = profile_service.get_ctx_user().await?;
    let user = profile
        .id
        .ok_or_else(|| ctx.to_ctx_error(AppError::AuthenticationFail))?;
    if entry.contributor != user && !profile.is_admin {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "entry owner or admin".to_string(),
        }));
    }
    Ok(user)
}

/// Recipient links and evaluations are secondary writes: a failure is
/// logged and the entry stands.
async fn write_secondary(
    state: &CtxState,
    ctx: &Ctx,
    entry_id: &Thing,
    contributor: &Thing,
    recipients: &[(Thing, RecipientType)],
    evaluations: &[EvaluationInput],
) {
    let recipient_service = EntryRecipientDbService {
        db: &state.db.client,
        ctx,
    };
    if let Err(err) = recipient_service.create_for_entry(entry_id, recipients).await {
        tracing::warn!("entry {} recipient write failed: {:?}", entry_id, err.error);
    }

    let evaluation_service = DetailedEvaluationDbService {
        db: &state.db.client,
        ctx,
    };
    for input in evaluations {
        let evaluated = match get_str_thing(&input.evaluated) {
            Ok(thing) => thing,
            Err(err) => {
                tracing::warn!("entry {} evaluation skipped: {:?}", entry_id, err);
                continue;
            }
        };
        let record = DetailedEvaluation {
            id: None,
            entry: entry_id.clone(),
            evaluator: contributor.clone(),
            evaluated,
            axis_key: input.axis_key.clone(),
            score: input.score,
            comment: input.comment.clone(),
            created_at: None,
        };
        if let Err(err) = evaluation_service.create(record).await {
            tracing::warn!("entry {} evaluation write failed: {:?}", entry_id, err.error);
        }
    }
}

pub async fn create_entry(
    state: &CtxState,
    ctx: &Ctx,
    input: EntryInput,
) -> CtxResult<EntryWithRecipients> {
    let contributor = ctx.user_thing()?;
    let week_start = normalize_week_start(&input.week_start).map_err(|e| ctx.to_ctx_error(e))?;
    let recipients = parse_recipients(ctx, &input.recipients)?;
    validate_evaluations(ctx, &input.evaluations)?;

    let entry_service = EntryDbService {
        db: &state.db.client,
        ctx,
    };
    let entry = entry_service
        .create(Entry {
            id: None,
            week_start,
            hours: input.hours,
            tags: normalize_tags(&input.tags),
            note: input.note,
            contributor: contributor.clone(),
            created_at: None,
            updated_at: None,
        })
        .await?;

    let entry_id = entry
        .id
        .clone()
        .ok_or_else(|| ctx.to_ctx_error(AppError::Generic {
            description: "created entry has no id".to_string(),
        }))?;
    write_secondary(
        state,
        ctx,
        &entry_id,
        &contributor,
        &recipients,
        &input.evaluations,
    )
    .await;

    get_entry(state, ctx, &entry_id).await
}

pub async fn get_entry(state: &CtxState, ctx: &Ctx, id: &Thing) -> CtxResult<EntryWithRecipients> {
    let entry_service = EntryDbService {
        db: &state.db.client,
        ctx,
    };
    let entry = entry_service
        .get(crate::middleware::utils::db_utils::IdentIdName::Id(id.clone()))
        .await?;
    let recipients = EntryRecipientDbService {
        db: &state.db.client,
        ctx,
    }
    .list_by_entry(id)
    .await?;
    Ok(EntryWithRecipients { entry, recipients })
}

pub async fn update_entry(
    state: &CtxState,
    ctx: &Ctx,
    id: &Thing,
    input: EntryInput,
) -> CtxResult<EntryWithRecipients> {
    let entry_service = EntryDbService {
        db: &state.db.client,
        ctx,
    };
    let existing = entry_service
        .get(crate::middleware::utils::db_utils::IdentIdName::Id(id.clone()))
        .await?;
    authorize_mutation(state, ctx, &existing).await?;

    let week_start = normalize_week_start(&input.week_start).map_err(|e| ctx.to_ctx_error(e))?;
    let recipients = parse_recipients(ctx, &input.recipients)?;
    validate_evaluations(ctx, &input.evaluations)?;

    let updated = entry_service
        .update(
            id.clone(),
            EntryUpdate {
                week_start,
                hours: input.hours,
                tags: normalize_tags(&input.tags),
                note: input.note,
                contributor: existing.contributor.clone(),
            },
        )
        .await?;

    // replace links and evaluations wholesale
    let recipient_service = EntryRecipientDbService {
        db: &state.db.client,
        ctx,
    };
    recipient_service.delete_by_entry(id).await?;
    let evaluation_service = DetailedEvaluationDbService {
        db: &state.db.client,
        ctx,
    };
    evaluation_service.delete_by_entry(id).await?;
    write_secondary(
        state,
        ctx,
        id,
        &updated.contributor,
        &recipients,
        &input.evaluations,
    )
    .await;

    get_entry(state, ctx, id).await
}

pub async fn delete_entry(state: &CtxState, ctx: &Ctx, id: &Thing) -> CtxResult<()> {
    let entry_service = EntryDbService {
        db: &state.db.client,
        ctx,
    };
    let existing = entry_service
        .get(crate::middleware::utils::db_utils::IdentIdName::Id(id.clone()))
        .await?;
    authorize_mutation(state, ctx, &existing).await?;

    EntryRecipientDbService {
        db: &state.db.client,
        ctx,
    }
    .delete_by_entry(id)
    .await?;
    DetailedEvaluationDbService {
        db: &state.db.client,
        ctx,
    }
    .delete_by_entry(id)
    .await?;
    entry_service.delete(id.clone()).await
}

/// Distinct tags across all entries, sorted, for the tag picker.
pub async fn distinct_tags(state: &CtxState, ctx: &Ctx) -> CtxResult<Vec<String>> {
    let entries = EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .list_all()
    .await?;
    let tags: Vec<String> = entries
        .into_iter()
        .flat_map(|e| e.tags)
        .collect::<std::collections::BTreeSet<String>>()
        .into_iter()
        .collect();
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_bounds_are_exclusive_zero_inclusive_hundred() {
        let base = |hours| EntryInput {
            week_start: "2025-01-20".to_string(),
            hours,
            tags: vec![],
            note: String::new(),
            recipients: vec![],
            evaluations: vec![],
        };
        assert!(base(0.0).validate().is_err());
        assert!(base(-1.0).validate().is_err());
        assert!(base(100.01).validate().is_err());
        assert!(base(0.5).validate().is_ok());
        assert!(base(100.0).validate().is_ok());
    }

    #[test]
    fn note_and_tag_limits() {
        let mut input = EntryInput {
            week_start: "2025-01-20".to_string(),
            hours: 1.0,
            tags: (0..11).map(|i| format!("t{i}")).collect(),
            note: String::new(),
            recipients: vec![],
            evaluations: vec![],
        };
        assert!(input.validate().is_err());
        input.tags = vec!["dev".to_string()];
        input.note = "x".repeat(1001);
        assert!(input.validate().is_err());
        input.note = "x".repeat(1000);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn evaluation_score_range() {
        let eval = |score| EvaluationInput {
            evaluated: "profile:bob".to_string(),
            axis_key: "support".to_string(),
            score,
            comment: String::new(),
        };
        assert!(eval(0).validate().is_err());
        assert!(eval(6).validate().is_err());
        assert!(eval(1).validate().is_ok());
        assert!(eval(5).validate().is_ok());
    }
}
