use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::AppError;
use crate::middleware::error::CtxResult;

/// The fixed set of qualitative dimensions a contributor can rate an
/// entry's recipients on, in display order.
pub const AXES: [(&str, &str); 10] = [
    ("exceeding_expectations", "Exceeding expectations"),
    ("visualization", "Visualization"),
    ("new_perspective", "New perspective"),
    ("active_listening", "Active listening"),
    ("introduction", "Introduction"),
    ("verbalization", "Verbalization"),
    ("new_world", "New world"),
    ("support", "Support"),
    ("collaboration", "Collaboration"),
    ("mentoring", "Mentoring"),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationAxis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub axis_key: String,
    pub axis_label: String,
    pub display_order: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub fn is_known_axis(axis_key: &str) -> bool {
    AXES.iter().any(|(key, _)| *key == axis_key)
}

pub struct EvaluationAxisDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "evaluation_axis";

impl<'a> EvaluationAxisDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS axis_key ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS axis_label ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS display_order ON TABLE {TABLE_NAME} TYPE number;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS evaluation_axis_key_idx ON TABLE {TABLE_NAME} COLUMNS axis_key UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate evaluation_axis");

        self.seed_axes().await?;
        Ok(())
    }

    // UPSERT keyed by axis_key keeps re-running migrations idempotent
    async fn seed_axes(&self) -> Result<(), AppError> {
        for (order, (key, label)) in AXES.iter().enumerate() {
            let qry = format!(
                "UPSERT type::thing('{TABLE_NAME}', $key) SET axis_key=$key, axis_label=$label, display_order=$ord;"
            );
            self.db
                .query(qry)
                .bind(("key", key.to_string()))
                .bind(("label", label.to_string()))
                .bind(("ord", order as u8))
                .await?
                .check()?;
        }
        Ok(())
    }

    pub async fn list(&self) -> CtxResult<Vec<EvaluationAxis>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} ORDER BY display_order ASC;");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<EvaluationAxis>>(0)?)
    }
}
