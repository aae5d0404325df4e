use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::profile_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{
    get_entity, with_not_found_err, IdentIdName, Pagination, ViewFieldSelector,
};

/// One record of contributed hours. `week_start` always holds the Monday of
/// the week the hours belong to; the snapping happens in the entry service
/// before the row is written, never on read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub week_start: String,
    pub hours: f64,
    pub tags: Vec<String>,
    pub note: String,
    pub contributor: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields an owner/admin may change on an existing entry.
#[derive(Debug, Serialize)]
pub struct EntryUpdate {
    pub week_start: String,
    pub hours: f64,
    pub tags: Vec<String>,
    pub note: String,
    pub contributor: Thing,
}

pub struct EntryDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "entry";
const TABLE_COL_USER: &str = profile_entity::TABLE_NAME;

impl<'a> EntryDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS week_start ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value)==10;
    DEFINE FIELD IF NOT EXISTS hours ON TABLE {TABLE_NAME} TYPE number ASSERT $value > 0 AND $value <= 100;
    DEFINE FIELD IF NOT EXISTS tags ON TABLE {TABLE_NAME} TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS note ON TABLE {TABLE_NAME} TYPE string DEFAULT '' ASSERT string::len($value) <= 1000;
    DEFINE FIELD IF NOT EXISTS contributor ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS entry_contributor_idx ON TABLE {TABLE_NAME} COLUMNS contributor;
    DEFINE INDEX IF NOT EXISTS entry_week_start_idx ON TABLE {TABLE_NAME} COLUMNS week_start;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate entry");

        Ok(())
    }

    pub async fn create(&self, record: Entry) -> CtxResult<Entry> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Entry>| v.expect("create returns the record"))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Entry> {
        let opt = get_entity::<Entry>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn update(&self, id: Thing, record: EntryUpdate) -> CtxResult<Entry> {
        let res: Option<Entry> = self
            .db
            .update((TABLE_NAME, id.id.to_raw()))
            .merge(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(res, self.ctx, &id.to_raw())
    }

    pub async fn delete(&self, id: Thing) -> CtxResult<()> {
        let _: Option<Entry> = self
            .db
            .delete((TABLE_NAME, id.id.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn list_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        pagination: Option<Pagination>,
    ) -> CtxResult<Vec<T>> {
        let fields = T::get_select_query_fields();
        let (count, start) = match pagination {
            Some(p) => (if p.count <= 0 { 20 } else { p.count }, p.start.max(0)),
            None => (20, 0),
        };
        let qry = format!(
            "SELECT {fields}, created_at FROM {TABLE_NAME} ORDER BY created_at DESC LIMIT BY type::int($_limit_val) START AT type::int($_start_val);"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("_limit_val", count.to_string()))
            .bind(("_start_val", start.to_string()))
            .await?;
        Ok(res.take::<Vec<T>>(0)?)
    }

    pub async fn list_all(&self) -> CtxResult<Vec<Entry>> {
        let qry = format!("SELECT * FROM {TABLE_NAME};");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<Entry>>(0)?)
    }

    pub async fn list_by_contributor(&self, user: &Thing) -> CtxResult<Vec<Entry>> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE contributor=<record>$contributor ORDER BY week_start DESC;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("contributor", user.to_raw()))
            .await?;
        Ok(res.take::<Vec<Entry>>(0)?)
    }

    /// Entries whose week_start falls in the half-open `[from, to)` date range,
    /// newest week first. ISO dates compare correctly as strings.
    pub async fn list_month_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        from: &str,
        to: &str,
    ) -> CtxResult<Vec<T>> {
        let fields = T::get_select_query_fields();
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} WHERE week_start >= $from AND week_start < $to ORDER BY week_start DESC;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("from", from.to_string()))
            .bind(("to", to.to_string()))
            .await?;
        Ok(res.take::<Vec<T>>(0)?)
    }

    pub async fn recent_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        limit: i8,
    ) -> CtxResult<Vec<T>> {
        self.list_view::<T>(Some(Pagination {
            order_by: None,
            order_dir: None,
            count: limit,
            start: 0,
        }))
        .await
    }
}
