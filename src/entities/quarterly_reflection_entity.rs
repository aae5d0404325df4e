use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

/// Free-text retrospective a user writes once per quarter. `quarter`
/// looks like "2025-Q1". Follow-up items live in `quarterly_action`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuarterlyReflection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    pub quarter: String,
    pub reflection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuarterlyAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub reflection: Thing,
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct QuarterlyReflectionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "quarterly_reflection";
pub const ACTION_TABLE_NAME: &str = "quarterly_action";
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> QuarterlyReflectionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS quarter ON TABLE {TABLE_NAME} TYPE string ASSERT $value = /^[0-9]{{4}}-Q[1-4]$/;
    DEFINE FIELD IF NOT EXISTS reflection ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) <= 2000;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS quarterly_reflection_unique_idx ON TABLE {TABLE_NAME} COLUMNS user, quarter UNIQUE;

    DEFINE TABLE IF NOT EXISTS {ACTION_TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS reflection ON TABLE {ACTION_TABLE_NAME} TYPE record<{TABLE_NAME}>;
    DEFINE INDEX IF NOT EXISTS quarterly_action_reflection_idx ON TABLE {ACTION_TABLE_NAME} COLUMNS reflection;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {ACTION_TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS completed ON TABLE {ACTION_TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {ACTION_TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate quarterly_reflection");

        Ok(())
    }

    /// One reflection per user per quarter, latest submission wins. Actions
    /// are replaced along with the text.
    pub async fn upsert(
        &self,
        user: &Thing,
        quarter: &str,
        reflection: &str,
        actions: &[String],
    ) -> CtxResult<QuarterlyReflection> {
        let qry = format!("
    UPSERT type::thing('{TABLE_NAME}', string::concat($user, '_', $quarter))
        SET user=<record>$user, quarter=$quarter, reflection=$reflection;
    ");
        let mut res = self
            .db
            .query(qry)
            .bind(("user", user.to_raw()))
            .bind(("quarter", quarter.to_string()))
            .bind(("reflection", reflection.to_string()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let saved = res.take::<Option<QuarterlyReflection>>(0)?;
        let saved = saved.ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "reflection upsert returned no record".to_string(),
            })
        })?;

        let reflection_id = saved
            .id
            .clone()
            .ok_or_else(|| {
                self.ctx.to_ctx_error(AppError::Generic {
                    description: "reflection upsert returned no id".to_string(),
                })
            })?;
        self.replace_actions(&reflection_id, actions).await?;
        Ok(saved)
    }

    async fn replace_actions(&self, reflection: &Thing, actions: &[String]) -> CtxResult<()> {
        let del = format!("DELETE FROM {ACTION_TABLE_NAME} WHERE reflection=<record>$reflection;");
        self.db
            .query(del)
            .bind(("reflection", reflection.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        for description in actions {
            let qry = format!(
                "CREATE {ACTION_TABLE_NAME} SET reflection=<record>$reflection, description=$description, completed=false;"
            );
            self.db
                .query(qry)
                .bind(("reflection", reflection.to_raw()))
                .bind(("description", description.clone()))
                .await
                .map_err(CtxError::from(self.ctx))?
                .check()
                .map_err(CtxError::from(self.ctx))?;
        }
        Ok(())
    }

    pub async fn latest_for_user(&self, user: &Thing) -> CtxResult<Option<QuarterlyReflection>> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE user=<record>$user ORDER BY quarter DESC LIMIT 1;"
        );
        let mut res = self.db.query(qry).bind(("user", user.to_raw())).await?;
        Ok(res.take::<Option<QuarterlyReflection>>(0)?)
    }

    pub async fn list_for_user(&self, user: &Thing) -> CtxResult<Vec<QuarterlyReflection>> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE user=<record>$user ORDER BY quarter DESC;"
        );
        let mut res = self.db.query(qry).bind(("user", user.to_raw())).await?;
        Ok(res.take::<Vec<QuarterlyReflection>>(0)?)
    }

    pub async fn actions_for(&self, reflection: &Thing) -> CtxResult<Vec<QuarterlyAction>> {
        let qry = format!(
            "SELECT * FROM {ACTION_TABLE_NAME} WHERE reflection=<record>$reflection ORDER BY created_at ASC;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("reflection", reflection.to_raw()))
            .await?;
        Ok(res.take::<Vec<QuarterlyAction>>(0)?)
    }
}
