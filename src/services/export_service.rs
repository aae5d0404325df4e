use serde::{Deserialize, Serialize};

use crate::entities::entry::entry_entity::EntryDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::ViewFieldSelector;
use crate::utils::week::month_bounds;

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding.
const BOM: &str = "\u{feff}";

const HEADER: &str = "week_start,hours,tags,note,contributor_name,contributor_email";

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryExportRow {
    pub week_start: String,
    pub hours: f64,
    pub tags: Vec<String>,
    pub note: String,
    pub contributor_name: String,
    pub contributor_email: String,
}

impl ViewFieldSelector for EntryExportRow {
    fn get_select_query_fields() -> String {
        "week_start, hours, tags, note, contributor.display_name as contributor_name, contributor.email as contributor_email"
            .to_string()
    }
}

fn csv_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render export rows as a BOM-prefixed CSV document, every cell quoted.
pub fn build_entries_csv(rows: &[EntryExportRow]) -> String {
    let mut out = String::from(BOM);
    out.push_str(HEADER);
    out.push('\n');
    for row in rows {
        let line = [
            csv_cell(&row.week_start),
            csv_cell(&row.hours.to_string()),
            csv_cell(&row.tags.join(";")),
            csv_cell(&row.note),
            csv_cell(&row.contributor_name),
            csv_cell(&row.contributor_email),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Entries of the `YYYY-MM` month as CSV, newest week first.
pub async fn entries_csv(state: &CtxState, ctx: &Ctx, month: &str) -> CtxResult<String> {
    let (from, to) = month_bounds(month).map_err(|e| ctx.to_ctx_error(e))?;
    let rows = EntryDbService {
        db: &state.db.client,
        ctx,
    }
    .list_month_view::<EntryExportRow>(&from, &to)
    .await?;
    Ok(build_entries_csv(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(note: &str) -> EntryExportRow {
        EntryExportRow {
            week_start: "2025-01-20".to_string(),
            hours: 2.5,
            tags: vec!["dev".to_string(), "design".to_string()],
            note: note.to_string(),
            contributor_name: "Alice".to_string(),
            contributor_email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn starts_with_bom_and_header() {
        let csv = build_entries_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv[3..].starts_with("week_start,hours,"));
    }

    #[test]
    fn quotes_every_cell() {
        let csv = build_entries_csv(&[row("plain note")]);
        assert!(csv.contains("\"2025-01-20\",\"2.5\",\"dev;design\",\"plain note\",\"Alice\",\"alice@example.com\""));
    }

    #[test]
    fn escapes_embedded_quotes_and_commas() {
        let csv = build_entries_csv(&[row("said \"hi\", twice")]);
        assert!(csv.contains("\"said \"\"hi\"\", twice\""));
    }
}
