// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use griddle_app::{Grid, Value, default_columns};
use griddle_store::{StateStore, sample_records};
use std::collections::BTreeMap;
use tempfile::TempDir;

pub const CSV_FIXTURE: &str = "name,age\nZoe,19\n";
pub const CSV_FIXTURE_BROKEN: &str = "name,age\n\"unterminated,19\n";

/// A grid in the state every session starts in: default columns, the five
/// built-in sample rows, untouched view state.
pub fn seeded_grid() -> Grid {
    let mut grid = Grid::new(default_columns());
    grid.seed(sample_records());
    grid
}

pub fn record_fields(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), Value::text(*value)))
        .collect()
}

/// Parsed-import rows in bulk, for exercising the large-dataset paths.
pub fn bulk_import_rows(count: usize) -> Vec<BTreeMap<String, String>> {
    (0..count)
        .map(|index| {
            let mut row = BTreeMap::new();
            row.insert("name".to_owned(), format!("Person {index}"));
            row.insert("age".to_owned(), (20 + index % 50).to_string());
            row.insert("role".to_owned(), "Imported".to_owned());
            row
        })
        .collect()
}

pub fn temp_state_store() -> Result<(TempDir, StateStore)> {
    let temp = tempfile::tempdir()?;
    let store = StateStore::open(temp.path())?;
    Ok((temp, store))
}
