use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::entities::user_auth::profile_entity;

/// One-time 6-digit login code mailed to a profile's address.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginCode {
    pub id: Thing,
    pub user: Thing,
    pub email: String,
    pub code: String,
    pub failed_attempts: u8,
    pub r_created: DateTime<Utc>,
}

pub struct LoginCodeDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "login_code";
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> LoginCodeDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS email ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS code ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS failed_attempts ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS login_code_email_idx ON TABLE {TABLE_NAME} COLUMNS email;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate login_code");

        Ok(())
    }

    /// Replaces any outstanding code for the user.
    pub async fn create(&self, user: Thing, email: String, code: String) -> CtxResult<LoginCode> {
        self.delete_for_user(user.clone()).await?;
        let qry = format!(
            "CREATE {TABLE_NAME} SET user=<record>$user, email=$email, code=$code, failed_attempts=0;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("user", user.to_raw()))
            .bind(("email", email))
            .bind(("code", code))
            .await?;
        let created = res.take::<Option<LoginCode>>(0)?;
        created.ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "login code not created".to_string(),
            })
        })
    }

    pub async fn get_by_email(&self, email: &str) -> CtxResult<Option<LoginCode>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE email=$email;");
        let mut res = self
            .db
            .query(qry)
            .bind(("email", email.to_string()))
            .await?;
        Ok(res.take::<Option<LoginCode>>(0)?)
    }

    pub async fn increase_attempts(&self, code_id: Thing) -> CtxResult<()> {
        let qry = "UPDATE (<record>$id) SET failed_attempts += 1;";
        self.db
            .query(qry)
            .bind(("id", code_id.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn delete(&self, code_id: Thing) -> CtxResult<()> {
        let qry = "DELETE (<record>$id);";
        self.db
            .query(qry)
            .bind(("id", code_id.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn delete_for_user(&self, user: Thing) -> CtxResult<()> {
        let qry = format!("DELETE FROM {TABLE_NAME} WHERE user=<record>$user;");
        self.db
            .query(qry)
            .bind(("user", user.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
