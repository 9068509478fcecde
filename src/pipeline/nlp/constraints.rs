use std::sync::LazyLock;

use regex::Regex;

use super::types::{AgeFilters, NumericConstraints};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AgeBound {
    Min,
    Max,
    Range,
    Exact,
}

struct AgePattern {
    regex: Regex,
    bound: AgeBound,
}

fn age(pattern: &str, bound: AgeBound) -> AgePattern {
    AgePattern {
        regex: Regex::new(pattern).expect("Invalid age regex"),
        bound,
    }
}

/// Evaluated on lower-cased text; first match wins.
static AGE_PATTERNS: LazyLock<Vec<AgePattern>> = LazyLock::new(|| {
    vec![
        age(r"over (\d+)", AgeBound::Min),
        age(r"above (\d+)", AgeBound::Min),
        age(r"older than (\d+)", AgeBound::Min),
        age(r"under (\d+)", AgeBound::Max),
        age(r"below (\d+)", AgeBound::Max),
        age(r"younger than (\d+)", AgeBound::Max),
        age(r"between (\d+) and (\d+)", AgeBound::Range),
        age(r"ages? (\d+)-(\d+)", AgeBound::Range),
        age(r"(\d+) to (\d+) years old", AgeBound::Range),
        age(r"(\d+)\+ years", AgeBound::Min),
        age(r"age (\d+)", AgeBound::Exact),
    ]
});

static COUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+) patients",
        r"first (\d+)",
        r"top (\d+)",
        r"limit (\d+)",
        r"maximum (\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid count regex"))
    .collect()
});

/// Extract age bounds and a result limit from the query.
pub fn extract_constraints(query: &str) -> NumericConstraints {
    let lower = query.to_lowercase();

    NumericConstraints {
        age_filters: extract_age_filters(&lower),
        max_results: COUNT_PATTERNS
            .iter()
            .find_map(|regex| capture_u32(regex, &lower, 1)),
    }
}

fn extract_age_filters(lower: &str) -> AgeFilters {
    for pattern in AGE_PATTERNS.iter() {
        let Some(first) = capture_u32(&pattern.regex, lower, 1) else {
            continue;
        };

        match pattern.bound {
            AgeBound::Min => {
                return AgeFilters {
                    min_age: Some(first),
                    ..Default::default()
                }
            }
            AgeBound::Max => {
                return AgeFilters {
                    max_age: Some(first),
                    ..Default::default()
                }
            }
            AgeBound::Exact => {
                return AgeFilters {
                    exact_age: Some(first),
                    ..Default::default()
                }
            }
            AgeBound::Range => {
                let Some(second) = capture_u32(&pattern.regex, lower, 2) else {
                    continue;
                };
                return AgeFilters {
                    min_age: Some(first),
                    max_age: Some(second),
                    exact_age: None,
                };
            }
        }
    }

    AgeFilters::default()
}

/// First match of `regex`, group `index` parsed as u32. Overflow counts as
/// no match.
fn capture_u32(regex: &Regex, text: &str, index: usize) -> Option<u32> {
    regex
        .captures(text)?
        .get(index)?
        .as_str()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages(query: &str) -> AgeFilters {
        extract_constraints(query).age_filters
    }

    #[test]
    fn over_sets_min_age() {
        assert_eq!(ages("Show me all diabetic patients over 50").min_age, Some(50));
        assert_eq!(ages("patients older than 70").min_age, Some(70));
        assert_eq!(ages("patients 65+ years").min_age, Some(65));
    }

    #[test]
    fn under_sets_max_age() {
        let f = ages("Find female patients with hypertension under 65");
        assert_eq!(f.max_age, Some(65));
        assert_eq!(f.min_age, None);
        assert_eq!(ages("patients younger than 18").max_age, Some(18));
    }

    #[test]
    fn ranges_set_both_bounds() {
        let f = ages("patients between 40 and 70");
        assert_eq!((f.min_age, f.max_age), (Some(40), Some(70)));

        let f = ages("Patients Ages 20-30");
        assert_eq!((f.min_age, f.max_age), (Some(20), Some(30)));

        let f = ages("patients 30 to 45 years old");
        assert_eq!((f.min_age, f.max_age), (Some(30), Some(45)));
    }

    #[test]
    fn exact_age() {
        let f = ages("patients at age 42");
        assert_eq!(f.exact_age, Some(42));
        assert_eq!(f.min_age, None);
    }

    #[test]
    fn first_pattern_wins() {
        // "over" is checked before "under".
        let f = ages("patients under 80 and over 60");
        assert_eq!(f.min_age, Some(60));
        assert_eq!(f.max_age, None);
    }

    #[test]
    fn no_age_phrase() {
        assert!(ages("Count male patients with depression").is_empty());
    }

    #[test]
    fn overflowing_number_does_not_match() {
        let f = ages("patients over 99999999999 and under 40");
        assert_eq!(f.min_age, None);
        assert_eq!(f.max_age, Some(40));
    }

    #[test]
    fn result_limits() {
        assert_eq!(extract_constraints("show 25 patients with asthma").max_results, Some(25));
        assert_eq!(extract_constraints("first 5 asthma cases").max_results, Some(5));
        assert_eq!(extract_constraints("top 3 conditions").max_results, Some(3));
        assert_eq!(extract_constraints("asthma cases limit 7").max_results, Some(7));
        assert_eq!(extract_constraints("maximum 12 results").max_results, Some(12));
        assert_eq!(extract_constraints("patients over 50").max_results, None);
    }
}
