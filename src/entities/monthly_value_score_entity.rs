use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

/// Externally computed monthly rollup for one user. `month` is the first
/// day of the month as a date string, e.g. "2025-01-01". `value_score` is
/// `total_hours * 1.0 + avg_rating * 2.0`, computed by the upstream job
/// that writes these rows; this service only reads and seeds them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthlyValueScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    pub month: String,
    pub total_hours: f64,
    pub avg_rating: f64,
    pub feedback_count: u32,
    pub value_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct MonthlyValueScoreDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "monthly_value_score";
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> MonthlyValueScoreDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS month ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value)==10;
    DEFINE FIELD IF NOT EXISTS total_hours ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS avg_rating ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS feedback_count ON TABLE {TABLE_NAME} TYPE number DEFAULT 0 ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS value_score ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS monthly_value_score_unique_idx ON TABLE {TABLE_NAME} COLUMNS user, month UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate monthly_value_score");

        Ok(())
    }

    /// Idempotent write used by the seeding endpoint.
    pub async fn upsert(
        &self,
        user: &Thing,
        month: &str,
        total_hours: f64,
        avg_rating: f64,
        feedback_count: u32,
        value_score: f64,
    ) -> CtxResult<()> {
        let qry = format!("
    UPSERT type::thing('{TABLE_NAME}', string::concat($user, '_', $month))
        SET user=<record>$user, month=$month, total_hours=$total_hours,
            avg_rating=$avg_rating, feedback_count=$feedback_count, value_score=$value_score;
    ");
        self.db
            .query(qry)
            .bind(("user", user.to_raw()))
            .bind(("month", month.to_string()))
            .bind(("total_hours", total_hours))
            .bind(("avg_rating", avg_rating))
            .bind(("feedback_count", feedback_count))
            .bind(("value_score", value_score))
            .await
            .map_err(CtxError::from(self.ctx))?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn list_for_month(&self, month: &str) -> CtxResult<Vec<MonthlyValueScore>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE month=$month;");
        let mut res = self.db.query(qry).bind(("month", month.to_string())).await?;
        Ok(res.take::<Vec<MonthlyValueScore>>(0)?)
    }
}
