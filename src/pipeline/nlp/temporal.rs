use chrono::{Duration, NaiveDate};

use super::types::TemporalFilter;

struct TemporalWindow {
    phrase: &'static str,
    days: u32,
    keywords: &'static [&'static str],
}

/// Checked in order; the first window with a keyword hit wins.
static TEMPORAL_WINDOWS: &[TemporalWindow] = &[
    TemporalWindow {
        phrase: "recently",
        days: 90,
        keywords: &["recently", "lately", "currently", "now", "present", "new"],
    },
    TemporalWindow {
        phrase: "last_month",
        days: 30,
        keywords: &["last month", "past month", "recent month", "this month"],
    },
    TemporalWindow {
        phrase: "last_year",
        days: 365,
        keywords: &["last year", "past year", "previous year", "annual"],
    },
    TemporalWindow {
        phrase: "last_week",
        days: 7,
        keywords: &["last week", "past week", "recent week", "weekly"],
    },
];

/// Resolve a relative time phrase into a cutoff date counted back from `today`.
pub fn extract_temporal(query: &str, today: NaiveDate) -> Option<TemporalFilter> {
    let lower = query.to_lowercase();

    let window = TEMPORAL_WINDOWS
        .iter()
        .find(|w| w.keywords.iter().any(|k| lower.contains(k)))?;

    Some(TemporalFilter {
        after_date: today - Duration::days(i64::from(window.days)),
        time_phrase: window.phrase.to_string(),
        days_back: window.days,
    })
}
