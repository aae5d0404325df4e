use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::entry::entry_entity;
use crate::entities::guild_entity;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

#[derive(EnumString, Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecipientType {
    User,
    Guild,
}

/// Links an entry to the user or guild its hours are credited toward.
/// The set for an entry is replaced wholesale on entry update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryRecipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub entry: Thing,
    pub recipient: Thing,
    pub recipient_type: RecipientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct EntryRecipientDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "entry_recipient";
const TABLE_COL_ENTRY: &str = entry_entity::TABLE_NAME;
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;
const TABLE_COL_GUILD: &str = guild_entity::TABLE_NAME;

impl<'a> EntryRecipientDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS entry ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_ENTRY}>;
    DEFINE INDEX IF NOT EXISTS entry_recipient_entry_idx ON TABLE {TABLE_NAME} COLUMNS entry;
    DEFINE FIELD IF NOT EXISTS recipient ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}|{TABLE_COL_GUILD}>;
    DEFINE INDEX IF NOT EXISTS entry_recipient_recipient_idx ON TABLE {TABLE_NAME} COLUMNS recipient;
    DEFINE FIELD IF NOT EXISTS recipient_type ON TABLE {TABLE_NAME} TYPE 'user'|'guild';
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate entry_recipient");

        Ok(())
    }

    pub async fn create_for_entry(
        &self,
        entry: &Thing,
        recipients: &[(Thing, RecipientType)],
    ) -> CtxResult<()> {
        for (recipient, recipient_type) in recipients {
            let qry = format!(
                "CREATE {TABLE_NAME} SET entry=<record>$entry, recipient=<record>$recipient, recipient_type=$recipient_type;"
            );
            self.db
                .query(qry)
                .bind(("entry", entry.to_raw()))
                .bind(("recipient", recipient.to_raw()))
                .bind(("recipient_type", recipient_type.to_string()))
                .await
                .map_err(CtxError::from(self.ctx))?
                .check()
                .map_err(CtxError::from(self.ctx))?;
        }
        Ok(())
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

    pub async fn list_by_entry(&self, entry: &Thing) -> CtxResult<Vec<EntryRecipient>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE entry=<record>$entry;");
        let mut res = self.db.query(qry).bind(("entry", entry.to_raw())).await?;
        Ok(res.take::<Vec<EntryRecipient>>(0)?)
    }

    pub async fn list_all(&self) -> CtxResult<Vec<EntryRecipient>> {
        let qry = format!("SELECT * FROM {TABLE_NAME};");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<EntryRecipient>>(0)?)
    }
}
