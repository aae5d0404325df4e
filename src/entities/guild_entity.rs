use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

/// Organizational grouping that can receive contributed hours like a user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Guild {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct GuildDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "guild";

impl<'a> GuildDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS name ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS guild_name_idx ON TABLE {TABLE_NAME} COLUMNS name UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate guild");

        Ok(())
    }

    pub async fn list(&self) -> CtxResult<Vec<Guild>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} ORDER BY name ASC;");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<Guild>>(0)?)
    }

    pub async fn create(&self, record: Guild) -> CtxResult<Guild> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Guild>| v.expect("create returns the record"))
    }
}
