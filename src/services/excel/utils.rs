use std::collections::HashSet;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Unnamed: \d+$").expect("placeholder pattern is valid"));

/// Name given to a header cell that is empty once trimmed.
pub fn placeholder_name(column_idx: usize) -> String {
    format!("Unnamed: {}", column_idx)
}

pub fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAME.is_match(name)
}

/// Returns `name` unchanged the first time it is seen; later collisions get
/// `_2`, `_3`, ... appended, skipping suffixes already taken.
pub fn unique_column_name(name: &str, existing_names: &mut HashSet<String>) -> String {
    if existing_names.insert(name.to_string()) {
        return name.to_string();
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}", name, counter);
        if existing_names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

pub fn update_min_max(min_max: &mut (Option<String>, Option<String>), value: &str) {
    match &min_max.0 {
        Some(min_val) if value < min_val.as_str() => min_max.0 = Some(value.to_string()),
        None => min_max.0 = Some(value.to_string()),
        _ => {}
    }

    match &min_max.1 {
        Some(max_val) if value > max_val.as_str() => min_max.1 = Some(value.to_string()),
        None => min_max.1 = Some(value.to_string()),
        _ => {}
    }
}

pub fn merge_min_max(
    a: (Option<String>, Option<String>),
    b: (Option<String>, Option<String>)
) -> (Option<String>, Option<String>) {
    let min = match (a.0, b.0) {
        (None, None) => None,
        (Some(v), None) | (None, Some(v)) => Some(v),
        (Some(v1), Some(v2)) => Some(if v1 < v2 { v1 } else { v2 }),
    };
    let max = match (a.1, b.1) {
        (None, None) => None,
        (Some(v), None) | (None, Some(v)) => Some(v),
        (Some(v1), Some(v2)) => Some(if v1 > v2 { v1 } else { v2 }),
    };
    (min, max)
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn is_date_string(s: &str) -> bool {
    parse_date_string(s).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_pattern() {
        assert!(is_placeholder_name(&placeholder_name(2)));
        assert!(!is_placeholder_name("Unnamed"));
        assert!(!is_placeholder_name("Project Unnamed: 2"));
    }

    #[test]
    fn duplicate_names_get_counters() {
        let mut seen = HashSet::new();
        let names: Vec<String> = ["Date", "Date", "Date_2", "Date"]
            .iter()
            .map(|n| unique_column_name(n, &mut seen))
            .collect();
        assert_eq!(names, ["Date", "Date_2", "Date_2_2", "Date_3"]);
    }

    #[test]
    fn date_strings() {
        assert!(is_date_string("2024-03-01"));
        assert!(is_date_string("03/15/2024"));
        assert!(is_date_string("2024-03-01 08:30:00"));
        assert!(!is_date_string("Project 12"));
    }
}
