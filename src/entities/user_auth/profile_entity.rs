use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{get_entity, with_not_found_err, IdentIdName};

/// A team member. Rows are created by invitation (or seeded), never by open
/// registration, which is what gates login.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(email: String, display_name: String) -> Self {
        Profile {
            id: None,
            email,
            display_name,
            active: true,
            is_admin: false,
            created_at: None,
            updated_at: None,
        }
    }
}

pub struct ProfileDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "profile";

impl<'a> ProfileDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS email ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value) ASSERT string::is::email($value);
    DEFINE FIELD IF NOT EXISTS display_name ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS active ON TABLE {TABLE_NAME} TYPE bool DEFAULT true;
    DEFINE FIELD IF NOT EXISTS is_admin ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS profile_email_idx ON TABLE {TABLE_NAME} COLUMNS email UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate profile");

        Ok(())
    }

    pub async fn get_ctx_user(&self) -> CtxResult<Profile> {
        let user_id = self.ctx.user_thing()?;
        self.get(IdentIdName::Id(user_id)).await
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Profile> {
        let opt = get_entity::<Profile>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_by_email(&self, email: &str) -> CtxResult<Profile> {
        let ident = IdentIdName::ColumnIdent {
            column: "email".to_string(),
            val: email.trim().to_lowercase(),
            rec: false,
        };
        self.get(ident).await
    }

    pub async fn list_active(&self) -> CtxResult<Vec<Profile>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE active=true ORDER BY display_name ASC;");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<Profile>>(0)?)
    }

    pub async fn create(&self, record: Profile) -> CtxResult<Profile> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Profile>| v.expect("create returns the record"))
    }
}
