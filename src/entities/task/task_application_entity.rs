use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::task::task_entity::{self, TaskApplicationStatus};
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{get_entity, IdentIdName};

/// A user's offer to take on a task. One row per (task, applicant) pair;
/// withdrawing flips the status instead of deleting the row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub task: Thing,
    pub applicant: Thing,
    pub status: TaskApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct TaskApplicationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "task_application";
const TABLE_COL_TASK: &str = task_entity::TABLE_NAME;
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> TaskApplicationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS task ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_TASK}>;
    DEFINE FIELD IF NOT EXISTS applicant ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE 'applied'|'withdrawn' DEFAULT 'applied';
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS task_application_unique_idx ON TABLE {TABLE_NAME} COLUMNS task, applicant UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate task_application");

        Ok(())
    }

    pub async fn create(&self, record: TaskApplication) -> CtxResult<TaskApplication> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<TaskApplication>| v.expect("create returns the record"))
    }

    pub async fn get(&self, id: &Thing) -> CtxResult<TaskApplication> {
        let qry = "SELECT * FROM <record>$id;";
        let mut res = self.db.query(qry).bind(("id", id.to_raw())).await?;
        let application = res.take::<Option<TaskApplication>>(0)?;
        match application {
            Some(application) => Ok(application),
            None => Err(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: id.to_raw(),
            })),
        }
    }

    pub async fn get_by_task_and_applicant(
        &self,
        task: &Thing,
        applicant: &Thing,
    ) -> CtxResult<Option<TaskApplication>> {
        let ident = IdentIdName::ColumnIdentAnd(vec![
            IdentIdName::ColumnIdent {
                column: "task".to_string(),
                val: task.to_raw(),
                rec: true,
            },
            IdentIdName::ColumnIdent {
                column: "applicant".to_string(),
                val: applicant.to_raw(),
                rec: true,
            },
        ]);
        get_entity::<TaskApplication>(self.db, TABLE_NAME.to_string(), &ident).await
    }

    pub async fn set_status(
        &self,
        id: &Thing,
        status: TaskApplicationStatus,
    ) -> CtxResult<TaskApplication> {
        let qry = "UPDATE (<record>$id) SET status=$status;";
        let mut res = self
            .db
            .query(qry)
            .bind(("id", id.to_raw()))
            .bind(("status", status.to_string()))
            .await?;
        let application = res.take::<Option<TaskApplication>>(0)?;
        match application {
            Some(application) => Ok(application),
            None => Err(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: id.to_raw(),
            })),
        }
    }

    pub async fn list_by_task(&self, task: &Thing) -> CtxResult<Vec<TaskApplication>> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE task=<record>$task ORDER BY created_at ASC;"
        );
        let mut res = self.db.query(qry).bind(("task", task.to_raw())).await?;
        Ok(res.take::<Vec<TaskApplication>>(0)?)
    }
}
