// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use griddle_app::{ColumnSpec, Theme, Value};
use griddle_store::{EXPORT_FILE_NAME, StateStore, parse_records, serialize_table};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Wires the TUI's runtime seam to the key-value state store and the
/// filesystem for CSV import/export.
pub struct StoreRuntime {
    store: StateStore,
    export_dir: PathBuf,
}

impl StoreRuntime {
    pub fn new(store: StateStore, export_dir: PathBuf) -> Self {
        Self { store, export_dir }
    }
}

impl griddle_tui::AppRuntime for StoreRuntime {
    fn load_columns(&mut self) -> Vec<ColumnSpec> {
        self.store.load_columns()
    }

    fn save_columns(&mut self, specs: &[ColumnSpec]) {
        // Best-effort: a full disk or read-only dir must not block the edit.
        let _ = self.store.save_columns(specs);
    }

    fn load_theme(&mut self) -> Theme {
        self.store.load_theme()
    }

    fn save_theme(&mut self, theme: Theme) {
        let _ = self.store.save_theme(theme);
    }

    fn sample_records(&mut self) -> Vec<BTreeMap<String, Value>> {
        griddle_store::sample_records()
    }

    fn import_records(&mut self, path: &str) -> Result<Vec<BTreeMap<String, String>>> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read import file {path}"))?;
        parse_records(&text)
    }

    fn export_table(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<PathBuf> {
        let text = serialize_table(header, rows)?;
        fs::create_dir_all(&self.export_dir).with_context(|| {
            format!("create export directory {}", self.export_dir.display())
        })?;
        let path = self.export_dir.join(EXPORT_FILE_NAME);
        fs::write(&path, text).with_context(|| format!("write export {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreRuntime;
    use anyhow::Result;
    use griddle_app::{Theme, default_columns};
    use griddle_store::StateStore;
    use griddle_tui::AppRuntime;

    fn temp_runtime() -> Result<(tempfile::TempDir, StoreRuntime)> {
        let temp = tempfile::tempdir()?;
        let store = StateStore::open(&temp.path().join("state"))?;
        let runtime = StoreRuntime::new(store, temp.path().join("exports"));
        Ok((temp, runtime))
    }

    #[test]
    fn columns_and_theme_round_trip_through_the_runtime() -> Result<()> {
        let (_temp, mut runtime) = temp_runtime()?;
        let mut specs = default_columns();
        specs[0].visible = false;

        runtime.save_columns(&specs);
        runtime.save_theme(Theme::Dark);
        assert_eq!(runtime.load_columns(), specs);
        assert_eq!(runtime.load_theme(), Theme::Dark);
        Ok(())
    }

    #[test]
    fn import_reads_and_parses_the_file() -> Result<()> {
        let (temp, mut runtime) = temp_runtime()?;
        let csv_path = temp.path().join("people.csv");
        std::fs::write(&csv_path, griddle_testkit::CSV_FIXTURE)?;

        let rows = runtime.import_records(&csv_path.to_string_lossy())?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").map(String::as_str), Some("Zoe"));
        Ok(())
    }

    #[test]
    fn import_of_broken_csv_reports_a_parse_error() -> Result<()> {
        let (temp, mut runtime) = temp_runtime()?;
        let csv_path = temp.path().join("broken.csv");
        std::fs::write(&csv_path, griddle_testkit::CSV_FIXTURE_BROKEN)?;

        let error = runtime
            .import_records(&csv_path.to_string_lossy())
            .expect_err("broken fixture should fail");
        assert!(error.to_string().contains("parse CSV"));
        Ok(())
    }

    #[test]
    fn import_of_a_missing_file_reports_the_path() {
        let (_temp, mut runtime) = temp_runtime().expect("runtime");
        let error = runtime
            .import_records("/nonexistent/people.csv")
            .expect_err("missing file should fail");
        assert!(error.to_string().contains("/nonexistent/people.csv"));
    }

    #[test]
    fn export_writes_the_named_file_under_the_export_dir() -> Result<()> {
        let (_temp, mut runtime) = temp_runtime()?;
        let header = vec!["Name".to_owned()];
        let rows = vec![vec!["Alice".to_owned()]];

        let path = runtime.export_table(&header, &rows)?;
        assert!(path.ends_with("table-export.csv"));
        assert_eq!(std::fs::read_to_string(path)?, "Name\nAlice\n");
        Ok(())
    }
}
