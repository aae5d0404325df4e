use surrealdb::sql::Thing;

use crate::middleware::error::{AppError, AppResult};

pub fn get_str_thing(value: &str) -> AppResult<Thing> {
    Thing::try_from(value).map_err(|_| AppError::Generic {
        description: format!("Invalid record id = {value}"),
    })
}

/// Path segments may carry either a full `table:id` or a bare id.
pub fn get_path_thing(table: &str, value: &str) -> AppResult<Thing> {
    if value.contains(':') {
        get_str_thing(value)
    } else {
        Ok(Thing::from((table, value)))
    }
}
