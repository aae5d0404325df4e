use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::entry::entry_entity;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

/// A 1-5 score on one evaluation axis, given by an entry's contributor
/// (evaluator) to one of its user recipients (evaluated) when the entry
/// is recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailedEvaluation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub entry: Thing,
    pub evaluator: Thing,
    pub evaluated: Thing,
    pub axis_key: String,
    pub score: u8,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct DetailedEvaluationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "detailed_evaluation";
const TABLE_COL_ENTRY: &str = entry_entity::TABLE_NAME;
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> DetailedEvaluationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS entry ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_ENTRY}>;
    DEFINE INDEX IF NOT EXISTS detailed_evaluation_entry_idx ON TABLE {TABLE_NAME} COLUMNS entry;
    DEFINE FIELD IF NOT EXISTS evaluator ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS evaluated ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS detailed_evaluation_evaluated_idx ON TABLE {TABLE_NAME} COLUMNS evaluated;
    DEFINE FIELD IF NOT EXISTS axis_key ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS score ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 1 AND $value <= 5;
    DEFINE FIELD IF NOT EXISTS comment ON TABLE {TABLE_NAME} TYPE string DEFAULT '' ASSERT string::len($value) <= 500;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS detailed_evaluation_unique_idx ON TABLE {TABLE_NAME} COLUMNS entry, evaluator, evaluated, axis_key UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate detailed_evaluation");

        Ok(())
    }

    pub async fn create(&self, record: DetailedEvaluation) -> CtxResult<DetailedEvaluation> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<DetailedEvaluation>| v.expect("create returns the record"))
    }

    pub async fn list_by_evaluated(&self, user: &Thing) -> CtxResult<Vec<DetailedEvaluation>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE evaluated=<record>$evaluated;");
        let mut res = self
            .db
            .query(qry)
            .bind(("evaluated", user.to_raw()))
            .await?;
        Ok(res.take::<Vec<DetailedEvaluation>>(0)?)
    }

    pub async fn delete_by_entry(&self, entry: &Thing) -> CtxResult<()> {
        let qry = format!("DELETE FROM {TABLE_NAME} WHERE entry=<record>$entry;");
        self.db
            .query(qry)
            .bind(("entry", entry.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
