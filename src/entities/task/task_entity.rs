use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};

#[derive(EnumString, Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Requester-driven transition table. `Completed` is terminal; a
    /// cancelled task can be re-opened.
    pub fn can_transition(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Open, InProgress)
                | (InProgress, Completed)
                | (Open, Completed)
                | (Open, Cancelled)
                | (Cancelled, Open)
        )
    }
}

#[derive(EnumString, Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskApplicationStatus {
    Applied,
    Withdrawn,
}

/// A work request. Deletion is soft: `deleted_at` is set and every read
/// path filters deleted rows out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    pub requester: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Thing>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct TaskDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "task";
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> TaskDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS tags ON TABLE {TABLE_NAME} TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS estimated_hours ON TABLE {TABLE_NAME} TYPE option<number>;
    DEFINE FIELD IF NOT EXISTS requester ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS task_requester_idx ON TABLE {TABLE_NAME} COLUMNS requester;
    DEFINE FIELD IF NOT EXISTS assignee ON TABLE {TABLE_NAME} TYPE option<record<{TABLE_COL_USER}>>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE 'open'|'in_progress'|'completed'|'cancelled' DEFAULT 'open';
    DEFINE FIELD IF NOT EXISTS deleted_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate task");

        Ok(())
    }

    pub async fn create(&self, record: Task) -> CtxResult<Task> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Task>| v.expect("create returns the record"))
    }

    /// Fetch by id, treating soft-deleted rows as missing.
    pub async fn get_active(&self, id: &Thing) -> CtxResult<Task> {
        let qry = "SELECT * FROM <record>$id WHERE deleted_at IS NONE;";
        let mut res = self.db.query(qry).bind(("id", id.to_raw())).await?;
        let task = res.take::<Option<Task>>(0)?;
        match task {
            Some(task) => Ok(task),
            None => Err(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: id.to_raw(),
            })),
        }
    }

    pub async fn list_active(&self) -> CtxResult<Vec<Task>> {
        let qry =
            format!("SELECT * FROM {TABLE_NAME} WHERE deleted_at IS NONE ORDER BY created_at DESC;");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<Task>>(0)?)
    }

    pub async fn set_status(&self, id: &Thing, status: TaskStatus) -> CtxResult<Task> {
        let qry = "UPDATE (<record>$id) SET status=$status;";
        let mut res = self
            .db
            .query(qry)
            .bind(("id", id.to_raw()))
            .bind(("status", status.to_string()))
            .await?;
        let task = res.take::<Option<Task>>(0)?;
        match task {
            Some(task) => Ok(task),
            None => Err(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: id.to_raw(),
            })),
        }
    }

    pub async fn soft_delete(&self, id: &Thing) -> CtxResult<()> {
        let qry = "UPDATE (<record>$id) SET deleted_at=time::now();";
        self.db
            .query(qry)
            .bind(("id", id.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
