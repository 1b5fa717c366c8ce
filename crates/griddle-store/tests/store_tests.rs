// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use griddle_app::{Grid, Theme, default_columns};
use griddle_store::{
    StateStore, default_state_dir, parse_records, sample_records, serialize_table,
    validate_state_dir,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[test]
fn validate_state_dir_rejects_uri_forms() {
    assert!(validate_state_dir("file:state").is_err());
    assert!(validate_state_dir("https://example.com/state").is_err());
    assert!(validate_state_dir("").is_err());
    assert!(validate_state_dir("/tmp/griddle-state").is_ok());
}

#[test]
fn state_dir_honors_env_override() -> Result<()> {
    let _guard = env_lock();
    // SAFETY: test-only process-local env mutation.
    unsafe {
        std::env::set_var("GRIDDLE_STATE_DIR", "/custom/griddle-state");
    }
    let resolved = default_state_dir();
    // SAFETY: test cleanup for process-local env mutation.
    unsafe {
        std::env::remove_var("GRIDDLE_STATE_DIR");
    }
    assert_eq!(resolved?, PathBuf::from("/custom/griddle-state"));
    Ok(())
}

#[test]
fn state_dir_defaults_under_the_app_name() -> Result<()> {
    let _guard = env_lock();
    // SAFETY: test-only process-local env mutation.
    unsafe {
        std::env::remove_var("GRIDDLE_STATE_DIR");
    }
    let resolved = default_state_dir()?;
    assert!(resolved.ends_with("griddle"), "got {}", resolved.display());
    Ok(())
}

#[test]
fn layout_survives_a_reopen() -> Result<()> {
    let temp = tempfile::tempdir()?;

    let store = StateStore::open(temp.path())?;
    let mut specs = default_columns();
    specs[0].visible = false;
    store.save_columns(&specs);
    store.save_theme(Theme::Dark);
    drop(store);

    let reopened = StateStore::open(temp.path())?;
    assert_eq!(reopened.load_columns(), specs);
    assert_eq!(reopened.load_theme(), Theme::Dark);
    Ok(())
}

#[test]
fn import_through_grid_to_export_round_trip() -> Result<()> {
    let mut grid = Grid::new(default_columns());
    grid.seed(sample_records());

    let parsed = parse_records("name,age\nZoe,19\n")?;
    assert_eq!(grid.import_rows(parsed), 1);
    assert_eq!(grid.rows.len(), 6);

    let (header, rows) = grid.export_table(None);
    let text = serialize_table(&header, &rows)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Name,Email,Age,Role");
    assert_eq!(lines.len(), 7);
    assert!(lines[6].starts_with("Zoe,"));
    Ok(())
}

#[test]
fn export_scenario_two_visible_columns_five_rows() -> Result<()> {
    let mut grid = Grid::new(default_columns());
    grid.seed(sample_records());
    grid.set_column_visible(2, false);
    grid.set_column_visible(3, false);

    let (header, rows) = grid.export_table(None);
    assert_eq!(header.len(), 2);
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.len() == 2));

    let text = serialize_table(&header, &rows)?;
    assert!(text.starts_with("Name,Email\n"));
    Ok(())
}

#[test]
fn failed_import_leaves_the_grid_untouched() {
    let mut grid = Grid::new(default_columns());
    grid.seed(sample_records());

    let result = parse_records("name,age\n\"broken,19\n");
    assert!(result.is_err());
    assert_eq!(grid.rows.len(), 5);
}
