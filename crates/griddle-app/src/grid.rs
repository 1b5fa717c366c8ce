// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::columns::{ColumnRegistry, ValidationResult};
use crate::ids::RecordId;
use crate::model::{ColumnSpec, Record, SortDirection, Value, ViewState};
use crate::overlay::EditOverlay;
use crate::rows::RowStore;
use crate::search::SearchEngine;
use crate::view::{self, PageView};

/// The one shared grid instance: registry + store + overlay + view state,
/// passed by reference into every handler. Each mutating method either fully
/// applies or fully no-ops.
#[derive(Debug, Default)]
pub struct Grid {
    pub columns: ColumnRegistry,
    pub rows: RowStore,
    pub overlay: EditOverlay,
    pub view: ViewState,
}

impl Grid {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns: ColumnRegistry::new(columns),
            rows: RowStore::new(),
            overlay: EditOverlay::new(),
            view: ViewState::default(),
        }
    }

    pub fn seed(&mut self, rows: Vec<BTreeMap<String, Value>>) {
        for fields in rows {
            self.rows.insert(fields);
        }
    }

    // Column registry operations. The caller persists the layout after any
    // that report a change.

    pub fn add_column(&mut self, key: &str, label: &str) -> ValidationResult<()> {
        self.columns.add(key, label)
    }

    pub fn remove_column(&mut self, index: usize) -> bool {
        self.columns.remove(index)
    }

    pub fn move_column_up(&mut self, index: usize) -> bool {
        self.columns.move_up(index)
    }

    pub fn move_column_down(&mut self, index: usize) -> bool {
        self.columns.move_down(index)
    }

    pub fn reorder_columns(&mut self, new_key_order: &[String]) {
        self.columns.reorder(new_key_order);
    }

    pub fn set_column_visible(&mut self, index: usize, visible: bool) -> bool {
        self.columns.set_visible(index, visible)
    }

    // Row store operations.

    pub fn import_rows(&mut self, parsed_rows: Vec<BTreeMap<String, String>>) -> usize {
        let imported = self.rows.import(parsed_rows).len();
        self.view.page = 0;
        imported
    }

    pub fn delete_row(&mut self, id: RecordId) -> bool {
        self.overlay.remove(id);
        self.rows.delete(id)
    }

    // Edit overlay operations.

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        self.overlay.begin_edit(&self.rows, id)
    }

    pub fn set_field(&mut self, id: RecordId, key: &str, value: String) -> bool {
        self.overlay.set_field(&self.rows, id, key, value)
    }

    pub fn commit_all(&mut self) {
        self.overlay.commit_all(&mut self.rows);
    }

    pub fn cancel_all(&mut self) {
        self.overlay.cancel_all();
    }

    // View state operations.

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.search = query.into();
        self.view.page = 0;
    }

    /// Sorting a new key starts ascending; sorting the active key toggles
    /// direction.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.view.sort.key.as_deref() == Some(key) {
            self.view.sort.direction = self.view.sort.direction.toggled();
        } else {
            self.view.sort.key = Some(key.to_owned());
            self.view.sort.direction = SortDirection::Asc;
        }
    }

    pub fn next_page(&mut self, engine: Option<&dyn SearchEngine>) -> bool {
        let page_count = view::page_count(self.filtered_count(engine), self.view.page_size);
        if self.view.page + 1 < page_count {
            self.view.page += 1;
            return true;
        }
        false
    }

    pub fn prev_page(&mut self) -> bool {
        if self.view.page > 0 {
            self.view.page -= 1;
            return true;
        }
        false
    }

    // Derivation.

    pub fn searchable_keys(&self) -> Vec<&str> {
        self.columns.keys()
    }

    pub fn filtered_count(&self, engine: Option<&dyn SearchEngine>) -> usize {
        view::filter_rows(
            self.rows.records(),
            &self.searchable_keys(),
            &self.view.search,
            engine,
        )
        .len()
    }

    pub fn page_view(&self, engine: Option<&dyn SearchEngine>) -> PageView<'_> {
        view::derive(
            self.rows.records(),
            &self.searchable_keys(),
            &self.view,
            engine,
        )
    }

    /// Cell text as rendered: an active overlay's pending value wins over
    /// the stored one.
    pub fn cell_text(&self, record: &Record, key: &str) -> String {
        match self.overlay.pending(record.id, key) {
            Some(pending) => pending.to_owned(),
            None => record.text(key),
        }
    }

    /// Rectangular export projection: visible-column labels as the header,
    /// the current page's stored values as the body ("export what you see").
    pub fn export_table(
        &self,
        engine: Option<&dyn SearchEngine>,
    ) -> (Vec<String>, Vec<Vec<String>>) {
        let visible = self.columns.visible();
        let header: Vec<String> = visible.iter().map(|spec| spec.label.clone()).collect();
        let rows = self
            .page_view(engine)
            .rows
            .iter()
            .map(|record| visible.iter().map(|spec| record.text(&spec.key)).collect())
            .collect();
        (header, rows)
    }
}
