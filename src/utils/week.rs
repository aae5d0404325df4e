use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::middleware::error::{AppError, AppResult};

pub const DATE_FMT: &str = "%Y-%m-%d";

/// Snap a date to the Monday on/before it. Sunday belongs to the week that
/// started six days earlier, never to the week starting the next day.
/// Applied when an entry is created or updated, never when reading, so
/// historical rows keep the week they were stored with.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    let days_back = match date.weekday() {
        Weekday::Sun => 6,
        wd => wd.num_days_from_monday() as u64,
    };
    date - Days::new(days_back)
}

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT).map_err(|_| AppError::Validation {
        description: format!("Invalid date format (YYYY-MM-DD required): {value}"),
    })
}

/// Normalize a `YYYY-MM-DD` string to the canonical week_start value.
pub fn normalize_week_start(value: &str) -> AppResult<String> {
    let date = parse_date(value)?;
    Ok(week_monday(date).format(DATE_FMT).to_string())
}

/// First day of the `YYYY-MM` month and first day of the following month,
/// both as `YYYY-MM-DD`. Used as a half-open range filter.
pub fn month_bounds(month: &str) -> AppResult<(String, String)> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), DATE_FMT).map_err(|_| {
        AppError::Validation {
            description: format!("Invalid month format (YYYY-MM required): {month}"),
        }
    })?;
    let next = first + Months::new(1);
    Ok((
        first.format(DATE_FMT).to_string(),
        next.format(DATE_FMT).to_string(),
    ))
}

/// Current calendar month as `YYYY-MM`.
pub fn current_month() -> String {
    chrono::Utc::now().format("%Y-%m").to_string()
}

/// The `month` value (`YYYY-MM-01`) monthly score rows are keyed by.
pub fn month_key(month: &str) -> String {
    format!("{month}-01")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn wednesday_snaps_to_monday() {
        assert_eq!(week_monday(d("2025-01-22")), d("2025-01-20"));
    }

    #[test]
    fn sunday_belongs_to_prior_week() {
        assert_eq!(week_monday(d("2025-01-26")), d("2025-01-20"));
    }

    #[test]
    fn monday_is_fixed_point() {
        assert_eq!(week_monday(d("2025-01-20")), d("2025-01-20"));
    }

    #[test]
    fn snapping_is_idempotent() {
        let once = week_monday(d("2025-01-25"));
        assert_eq!(week_monday(once), once);
    }

    #[test]
    fn snaps_across_month_boundary() {
        assert_eq!(week_monday(d("2025-03-01")), d("2025-02-24"));
    }

    #[test]
    fn normalize_rejects_bad_format() {
        assert!(normalize_week_start("2025/01/22").is_err());
        assert!(normalize_week_start("22-01-2025").is_err());
        assert_eq!(normalize_week_start("2025-01-22").unwrap(), "2025-01-20");
    }

    #[test]
    fn month_bounds_half_open() {
        let (start, end) = month_bounds("2025-01").unwrap();
        assert_eq!(start, "2025-01-01");
        assert_eq!(end, "2025-02-01");
        let (start, end) = month_bounds("2025-12").unwrap();
        assert_eq!(start, "2025-12-01");
        assert_eq!(end, "2026-01-01");
    }

    #[test]
    fn month_bounds_rejects_garbage() {
        assert!(month_bounds("2025-13").is_err());
        assert!(month_bounds("january").is_err());
    }
}
