use super::types::*;
use super::utils::*;
use std::collections::{BTreeMap, HashSet};
use smallvec::SmallVec;
use rayon::prelude::*;

use crate::models::{Cell, Table};

const TYPE_DETECTION_ROWS: usize = 100;

/// Profiles every column of a normalized table, in column order.
pub fn analyze_table(table: &Table) -> Vec<ColumnInfo> {
    let start = std::time::Instant::now();

    let columns: Vec<ColumnInfo> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<&Cell> = table.column_values(idx).collect();
            analyze_column(&values, name)
        })
        .collect();

    tracing::debug!("Profiled {} columns of '{}' in {:?}", columns.len(), table.name(), start.elapsed());
    columns
}

/// How many columns fall into each inferred kind.
pub fn kind_counts(columns: &[ColumnInfo]) -> BTreeMap<ColumnKind, usize> {
    let mut counts = BTreeMap::new();
    for column in columns {
        *counts.entry(column.data_type).or_insert(0) += 1;
    }
    counts
}

fn analyze_column(values: &[&Cell], name: &str) -> ColumnInfo {
    let (null_count, seen_values, min_max) = values.par_iter()
        .fold(
            || (0, HashSet::new(), (None, None)),
            |(mut nulls, mut seen, mut min_max), value| {
                if value.is_empty() {
                    nulls += 1;
                } else {
                    let str_value = value.to_string();
                    update_min_max(&mut min_max, &str_value);
                    seen.insert(str_value);
                }
                (nulls, seen, min_max)
            }
        )
        .reduce(
            || (0, HashSet::new(), (None, None)),
            |a, b| {
                let mut combined_set = a.1;
                combined_set.extend(b.1);
                (
                    a.0 + b.0,
                    combined_set,
                    merge_min_max(a.2, b.2)
                )
            }
        );

    let sample_values: SmallVec<[String; SAMPLE_SIZE]> = values.iter()
        .filter(|value| !value.is_empty())
        .take(SAMPLE_SIZE)
        .map(|value| value.to_string())
        .collect();

    let non_null_count = values.len() - null_count;
    let null_percent = if values.is_empty() {
        0.0
    } else {
        null_count as f64 / values.len() as f64 * 100.0
    };

    ColumnInfo {
        name: name.to_string(),
        data_type: detect_column_type(values),
        sample_values,
        non_null_count,
        null_count,
        null_percent,
        unique_count: seen_values.len(),
        min_value: min_max.0,
        max_value: min_max.1,
        has_duplicates: seen_values.len() < non_null_count,
    }
}

/// A kind wins when it covers at least 80% of the first non-empty values.
pub fn detect_column_type(values: &[&Cell]) -> ColumnKind {
    let (numeric_count, date_count, bool_count, total) = values.iter()
        .filter(|v| !v.is_empty())
        .take(TYPE_DETECTION_ROWS)
        .fold((0, 0, 0, 0), |(num, date, bool, total), value| match value {
            Cell::Number(_) => (num + 1, date, bool, total + 1),
            Cell::DateTime(_) => (num, date + 1, bool, total + 1),
            Cell::Text(s) if is_date_string(s) => (num, date + 1, bool, total + 1),
            Cell::Bool(_) => (num, date, bool + 1, total + 1),
            _ => (num, date, bool, total + 1),
        });

    if total == 0 {
        return ColumnKind::Empty;
    }

    let threshold = total as f64 * 0.8;
    match () {
        _ if numeric_count as f64 >= threshold => ColumnKind::Numeric,
        _ if date_count as f64 >= threshold => ColumnKind::Date,
        _ if bool_count as f64 >= threshold => ColumnKind::Boolean,
        _ => ColumnKind::String,
    }
}
