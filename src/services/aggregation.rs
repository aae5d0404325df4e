//! Pure aggregation over already-fetched rows. Everything here is
//! deterministic for a fixed snapshot; the dashboard service fetches the
//! rows and calls in.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::entities::entry::entry_entity::Entry;
use crate::entities::entry::entry_recipient_entity::{EntryRecipient, RecipientType};
use crate::entities::evaluation::detailed_evaluation_entity::DetailedEvaluation;
use crate::entities::monthly_value_score_entity::MonthlyValueScore;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct KpiStats {
    pub provided_hours: f64,
    pub received_hours: f64,
    pub balance_hours: f64,
    pub balance_label: String,
    pub avg_rating: f64,
    pub collaborator_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TagHours {
    pub tag: String,
    pub hours: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WeekHours {
    pub week_start: String,
    pub hours: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AxisTrend {
    pub axis_key: String,
    pub axis_label: String,
    pub avg_score: f64,
    pub count: usize,
}

fn balance_label(balance: f64) -> &'static str {
    if balance > 0.0 {
        "surplus provided"
    } else if balance < 0.0 {
        "surplus received"
    } else {
        "balanced"
    }
}

/// Entry ids the user received hours through, as a recipient.
fn received_entry_ids(user: &Thing, recipients: &[EntryRecipient]) -> HashSet<String> {
    recipients
        .iter()
        .filter(|r| r.recipient_type == RecipientType::User && &r.recipient == user)
        .map(|r| r.entry.to_raw())
        .collect()
}

/// The KPI bundle for one user over a snapshot of all entries, recipient
/// links and evaluations.
pub fn kpi_stats(
    user: &Thing,
    entries: &[Entry],
    recipients: &[EntryRecipient],
    evaluations: &[DetailedEvaluation],
) -> KpiStats {
    let provided_hours: f64 = entries
        .iter()
        .filter(|e| &e.contributor == user)
        .map(|e| e.hours)
        .sum();

    let received = received_entry_ids(user, recipients);
    let received_hours: f64 = entries
        .iter()
        .filter(|e| {
            e.id.as_ref()
                .map(|id| received.contains(&id.to_raw()))
                .unwrap_or(false)
        })
        .map(|e| e.hours)
        .sum();

    let balance_hours = provided_hours - received_hours;

    let own_scores: Vec<u8> = evaluations
        .iter()
        .filter(|ev| &ev.evaluated == user)
        .map(|ev| ev.score)
        .collect();
    let avg_rating = if own_scores.is_empty() {
        0.0
    } else {
        own_scores.iter().map(|s| *s as f64).sum::<f64>() / own_scores.len() as f64
    };

    // people the user gave hours to, plus people who gave hours to the user
    let mut collaborators: HashSet<String> = HashSet::new();
    let own_entry_ids: HashSet<String> = entries
        .iter()
        .filter(|e| &e.contributor == user)
        .filter_map(|e| e.id.as_ref().map(|id| id.to_raw()))
        .collect();
    for recipient in recipients {
        if recipient.recipient_type == RecipientType::User
            && own_entry_ids.contains(&recipient.entry.to_raw())
        {
            collaborators.insert(recipient.recipient.to_raw());
        }
    }
    for entry in entries {
        if let Some(id) = entry.id.as_ref() {
            if received.contains(&id.to_raw()) {
                collaborators.insert(entry.contributor.to_raw());
            }
        }
    }
    collaborators.remove(&user.to_raw());

    KpiStats {
        provided_hours,
        received_hours,
        balance_hours,
        balance_label: balance_label(balance_hours).to_string(),
        avg_rating,
        collaborator_count: collaborators.len(),
    }
}

/// Hours by tag, full entry hours credited to each of its tags,
/// descending, truncated to `top_k`. Ties break on the tag name so the
/// output is stable.
pub fn tag_distribution(entries: &[Entry], top_k: usize) -> Vec<TagHours> {
    let mut by_tag: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in entries {
        for tag in &entry.tags {
            *by_tag.entry(tag.as_str()).or_insert(0.0) += entry.hours;
        }
    }
    let mut rows: Vec<TagHours> = by_tag
        .into_iter()
        .map(|(tag, hours)| TagHours {
            tag: tag.to_string(),
            hours,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    rows.truncate(top_k);
    rows
}

/// Per-week hour sums for one contributor, most recent `k` weeks, newest
/// first.
pub fn weekly_series(entries: &[Entry], user: &Thing, k: usize) -> Vec<WeekHours> {
    let mut by_week: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in entries.iter().filter(|e| &e.contributor == user) {
        *by_week.entry(entry.week_start.as_str()).or_insert(0.0) += entry.hours;
    }
    by_week
        .into_iter()
        .rev()
        .take(k)
        .map(|(week_start, hours)| WeekHours {
            week_start: week_start.to_string(),
            hours,
        })
        .collect()
}

/// Top `k` rows by `total_hours`, descending, input order preserved on
/// ties.
pub fn top_by_hours(scores: &[MonthlyValueScore], k: usize) -> Vec<MonthlyValueScore> {
    let mut rows: Vec<MonthlyValueScore> = scores.to_vec();
    rows.sort_by(|a, b| {
        b.total_hours
            .partial_cmp(&a.total_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(k);
    rows
}

/// Top `k` rows by `value_score`, descending, input order preserved on
/// ties.
pub fn top_by_value(scores: &[MonthlyValueScore], k: usize) -> Vec<MonthlyValueScore> {
    let mut rows: Vec<MonthlyValueScore> = scores.to_vec();
    rows.sort_by(|a, b| {
        b.value_score
            .partial_cmp(&a.value_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(k);
    rows
}

/// Mean and count per axis for the subject user, in axis display order.
/// Axes with no rows report `(0, 0)` instead of being dropped.
pub fn evaluation_trends(
    axes: &[(&str, &str)],
    evaluations: &[DetailedEvaluation],
    user: &Thing,
) -> Vec<AxisTrend> {
    axes.iter()
        .map(|(key, label)| {
            let scores: Vec<u8> = evaluations
                .iter()
                .filter(|ev| &ev.evaluated == user && ev.axis_key == *key)
                .map(|ev| ev.score)
                .collect();
            let avg_score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64
            };
            AxisTrend {
                axis_key: key.to_string(),
                axis_label: label.to_string(),
                avg_score,
                count: scores.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thing(tb: &str, id: &str) -> Thing {
        Thing::from((tb, id))
    }

    fn entry(id: &str, contributor: &str, week_start: &str, hours: f64, tags: &[&str]) -> Entry {
        Entry {
            id: Some(thing("entry", id)),
            week_start: week_start.to_string(),
            hours,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            note: String::new(),
            contributor: thing("profile", contributor),
            created_at: None,
            updated_at: None,
        }
    }

    fn recipient(entry_id: &str, user: &str) -> EntryRecipient {
        EntryRecipient {
            id: None,
            entry: thing("entry", entry_id),
            recipient: thing("profile", user),
            recipient_type: RecipientType::User,
            created_at: None,
        }
    }

    fn evaluation(entry_id: &str, evaluated: &str, axis_key: &str, score: u8) -> DetailedEvaluation {
        DetailedEvaluation {
            id: None,
            entry: thing("entry", entry_id),
            evaluator: thing("profile", "someone"),
            evaluated: thing("profile", evaluated),
            axis_key: axis_key.to_string(),
            score,
            comment: String::new(),
            created_at: None,
        }
    }

    fn score_row(user: &str, total_hours: f64, value_score: f64) -> MonthlyValueScore {
        MonthlyValueScore {
            id: None,
            user: thing("profile", user),
            month: "2025-01-01".to_string(),
            total_hours,
            avg_rating: 0.0,
            feedback_count: 0,
            value_score,
            created_at: None,
        }
    }

    #[test]
    fn kpi_zero_activity_is_all_zeros_and_balanced() {
        let user = thing("profile", "alice");
        let stats = kpi_stats(&user, &[], &[], &[]);
        assert_eq!(stats.provided_hours, 0.0);
        assert_eq!(stats.received_hours, 0.0);
        assert_eq!(stats.balance_hours, 0.0);
        assert_eq!(stats.balance_label, "balanced");
        assert_eq!(stats.avg_rating, 0.0);
        assert_eq!(stats.collaborator_count, 0);
    }

    #[test]
    fn kpi_balance_and_collaborators() {
        let alice = thing("profile", "alice");
        let entries = vec![
            entry("e1", "alice", "2025-01-06", 5.0, &[]),
            entry("e2", "bob", "2025-01-06", 2.0, &[]),
            entry("e3", "carol", "2025-01-13", 1.5, &[]),
        ];
        let recipients = vec![
            recipient("e1", "bob"),
            recipient("e2", "alice"),
            recipient("e3", "alice"),
        ];
        let stats = kpi_stats(&alice, &entries, &recipients, &[]);
        assert_eq!(stats.provided_hours, 5.0);
        assert_eq!(stats.received_hours, 3.5);
        assert_eq!(stats.balance_hours, 1.5);
        assert_eq!(stats.balance_label, "surplus provided");
        // bob (given to and received from) counts once, carol counts once
        assert_eq!(stats.collaborator_count, 2);
    }

    #[test]
    fn kpi_surplus_received_label() {
        let alice = thing("profile", "alice");
        let entries = vec![entry("e1", "bob", "2025-01-06", 4.0, &[])];
        let recipients = vec![recipient("e1", "alice")];
        let stats = kpi_stats(&alice, &entries, &recipients, &[]);
        assert_eq!(stats.balance_label, "surplus received");
    }

    #[test]
    fn kpi_avg_rating_over_own_evaluations_only() {
        let alice = thing("profile", "alice");
        let evaluations = vec![
            evaluation("e1", "alice", "support", 4),
            evaluation("e1", "alice", "mentoring", 5),
            evaluation("e2", "bob", "support", 1),
        ];
        let stats = kpi_stats(&alice, &[], &[], &evaluations);
        assert_eq!(stats.avg_rating, 4.5);
    }

    #[test]
    fn tag_distribution_credits_full_hours_per_tag() {
        let entries = vec![
            entry("e1", "alice", "2025-01-06", 3.0, &["dev", "design"]),
            entry("e2", "bob", "2025-01-06", 2.0, &["dev"]),
        ];
        let rows = tag_distribution(&entries, 10);
        assert_eq!(
            rows,
            vec![
                TagHours {
                    tag: "dev".to_string(),
                    hours: 5.0
                },
                TagHours {
                    tag: "design".to_string(),
                    hours: 3.0
                },
            ]
        );
    }

    #[test]
    fn tag_distribution_truncates_and_breaks_ties_by_name() {
        let entries = vec![
            entry("e1", "alice", "2025-01-06", 2.0, &["zeta", "alpha"]),
            entry("e2", "bob", "2025-01-06", 3.0, &["mid"]),
        ];
        let rows = tag_distribution(&entries, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tag, "mid");
        assert_eq!(rows[1].tag, "alpha");
    }

    #[test]
    fn weekly_series_sums_and_orders_newest_first() {
        let alice = thing("profile", "alice");
        let entries = vec![
            entry("e1", "alice", "2025-01-06", 2.0, &[]),
            entry("e2", "alice", "2025-01-06", 1.0, &[]),
            entry("e3", "alice", "2025-01-13", 4.0, &[]),
            entry("e4", "bob", "2025-01-13", 9.0, &[]),
        ];
        let rows = weekly_series(&entries, &alice, 10);
        assert_eq!(
            rows,
            vec![
                WeekHours {
                    week_start: "2025-01-13".to_string(),
                    hours: 4.0
                },
                WeekHours {
                    week_start: "2025-01-06".to_string(),
                    hours: 3.0
                },
            ]
        );
    }

    #[test]
    fn weekly_series_takes_most_recent_k() {
        let alice = thing("profile", "alice");
        let entries = vec![
            entry("e1", "alice", "2025-01-06", 1.0, &[]),
            entry("e2", "alice", "2025-01-13", 2.0, &[]),
            entry("e3", "alice", "2025-01-20", 3.0, &[]),
        ];
        let rows = weekly_series(&entries, &alice, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week_start, "2025-01-20");
        assert_eq!(rows[1].week_start, "2025-01-13");
    }

    #[test]
    fn leaderboards_sort_on_their_own_column() {
        let scores = vec![
            score_row("alice", 10.0, 12.0),
            score_row("bob", 20.0, 8.0),
            score_row("carol", 5.0, 30.0),
        ];
        let by_hours = top_by_hours(&scores, 2);
        assert_eq!(by_hours[0].user, thing("profile", "bob"));
        assert_eq!(by_hours[1].user, thing("profile", "alice"));

        let by_value = top_by_value(&scores, 2);
        assert_eq!(by_value[0].user, thing("profile", "carol"));
        assert_eq!(by_value[1].user, thing("profile", "alice"));
    }

    #[test]
    fn leaderboard_ties_keep_input_order() {
        let scores = vec![
            score_row("first", 10.0, 10.0),
            score_row("second", 10.0, 10.0),
        ];
        let rows = top_by_hours(&scores, 2);
        assert_eq!(rows[0].user, thing("profile", "first"));
        assert_eq!(rows[1].user, thing("profile", "second"));
    }

    #[test]
    fn evaluation_trends_reports_every_axis() {
        let alice = thing("profile", "alice");
        let axes = [("support", "Support"), ("mentoring", "Mentoring")];
        let evaluations = vec![
            evaluation("e1", "alice", "support", 4),
            evaluation("e2", "alice", "support", 2),
        ];
        let rows = evaluation_trends(&axes, &evaluations, &alice);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].axis_key, "support");
        assert_eq!(rows[0].avg_score, 3.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].axis_key, "mentoring");
        assert_eq!(rows[1].avg_score, 0.0);
        assert_eq!(rows[1].count, 0);
    }
}
