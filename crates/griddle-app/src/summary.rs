// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Record;

pub const ROLE_KEY: &str = "role";
pub const AGE_KEY: &str = "age";
const UNKNOWN_ROLE: &str = "Unknown";

/// Chart data for the role bar chart: one (label, count) per distinct role
/// in first-seen order, computed over the filtered (pre-pagination) rows.
pub fn role_counts(rows: &[&Record]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    for row in rows {
        let role = match row.text(ROLE_KEY) {
            value if value.is_empty() => UNKNOWN_ROLE.to_owned(),
            value => value,
        };
        match counts.iter_mut().find(|(label, _)| *label == role) {
            Some((_, count)) => *count += 1,
            None => counts.push((role, 1)),
        }
    }
    counts
}

/// Chart data for the age-distribution chart: decade buckets in ascending
/// order. Ages that do not parse numerically are skipped.
pub fn age_buckets(rows: &[&Record]) -> Vec<(String, u64)> {
    let mut buckets: Vec<(i64, u64)> = Vec::new();
    for row in rows {
        let Ok(age) = row.text(AGE_KEY).trim().parse::<f64>() else {
            continue;
        };
        if !age.is_finite() || age < 0.0 {
            continue;
        }
        let decade = (age as i64 / 10) * 10;
        match buckets.iter_mut().find(|(start, _)| *start == decade) {
            Some((_, count)) => *count += 1,
            None => buckets.push((decade, 1)),
        }
    }
    buckets.sort_by_key(|(start, _)| *start);
    buckets
        .into_iter()
        .map(|(start, count)| (format!("{start}-{}", start + 9), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{age_buckets, role_counts};
    use crate::model::Value;
    use crate::rows::RowStore;
    use std::collections::BTreeMap;

    fn store_of(entries: &[(&str, &str)]) -> RowStore {
        let mut store = RowStore::new();
        for (role, age) in entries {
            let mut fields = BTreeMap::new();
            if !role.is_empty() {
                fields.insert("role".to_owned(), Value::text(*role));
            }
            fields.insert("age".to_owned(), Value::text(*age));
            store.insert(fields);
        }
        store
    }

    #[test]
    fn role_counts_keep_first_seen_order_and_bucket_missing_as_unknown() {
        let store = store_of(&[
            ("Developer", "28"),
            ("Manager", "35"),
            ("Developer", "22"),
            ("", "41"),
        ]);
        let rows: Vec<_> = store.records().iter().collect();
        assert_eq!(
            role_counts(&rows),
            vec![
                ("Developer".to_owned(), 2),
                ("Manager".to_owned(), 1),
                ("Unknown".to_owned(), 1),
            ],
        );
    }

    #[test]
    fn age_buckets_group_by_decade_and_skip_unparseable() {
        let store = store_of(&[
            ("Developer", "28"),
            ("Manager", "35"),
            ("Intern", "22"),
            ("Director", "41"),
            ("Designer", "thirty"),
        ]);
        let rows: Vec<_> = store.records().iter().collect();
        assert_eq!(
            age_buckets(&rows),
            vec![
                ("20-29".to_owned(), 2),
                ("30-39".to_owned(), 1),
                ("40-49".to_owned(), 1),
            ],
        );
    }
}
