// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::ids::RecordId;
use crate::model::Value;
use crate::rows::RowStore;

/// Per-row pending edits, keyed by record id. An entry exists only while the
/// row is being edited: commit merges every pending field onto the record and
/// drops the entry, cancel drops the entry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOverlay {
    entries: BTreeMap<RecordId, BTreeMap<String, String>>,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self, id: RecordId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn has_edits(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending(&self, id: RecordId, key: &str) -> Option<&str> {
        self.entries
            .get(&id)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }

    /// Seeds an entry with a full stringified copy of the record's current
    /// fields. Idempotent while the entry exists.
    pub fn begin_edit(&mut self, store: &RowStore, id: RecordId) -> bool {
        if self.entries.contains_key(&id) {
            return true;
        }
        let Some(record) = store.get(id) else {
            return false;
        };
        let seeded = record
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.display()))
            .collect();
        self.entries.insert(id, seeded);
        true
    }

    /// Stores `value` verbatim as pending text, seeding the entry from the
    /// record first if the row was not yet in edit. Unknown ids are a no-op.
    pub fn set_field(&mut self, store: &RowStore, id: RecordId, key: &str, value: String) -> bool {
        if !self.entries.contains_key(&id) && !self.begin_edit(store, id) {
            return false;
        }
        if let Some(fields) = self.entries.get_mut(&id) {
            fields.insert(key.to_owned(), value);
            return true;
        }
        false
    }

    /// Merges every entry onto its record and clears the overlay. Entries
    /// whose record has since been deleted are discarded.
    pub fn commit_all(&mut self, store: &mut RowStore) {
        let entries = std::mem::take(&mut self.entries);
        for (id, fields) in entries {
            if let Some(record) = store.get_mut(id) {
                for (key, value) in fields {
                    record.fields.insert(key, Value::Text(value));
                }
            }
        }
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn remove(&mut self, id: RecordId) -> bool {
        self.entries.remove(&id).is_some()
    }
}

/// Advisory check for numeric-typed columns: editing never blocks on it, the
/// UI may only flag the pending text.
pub fn numeric_warning(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_err()
}

#[cfg(test)]
mod tests {
    use super::{EditOverlay, numeric_warning};
    use crate::ids::RecordId;
    use crate::model::Value;
    use crate::rows::RowStore;
    use std::collections::BTreeMap;

    fn seeded_store() -> (RowStore, RecordId) {
        let mut store = RowStore::new();
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), Value::text("Alice Johnson"));
        fields.insert("age".to_owned(), Value::Number(28.0));
        let id = store.insert(fields);
        (store, id)
    }

    #[test]
    fn begin_edit_seeds_a_full_copy_of_the_record() {
        let (store, id) = seeded_store();
        let mut overlay = EditOverlay::new();
        assert!(overlay.begin_edit(&store, id));
        assert_eq!(overlay.pending(id, "name"), Some("Alice Johnson"));
        assert_eq!(overlay.pending(id, "age"), Some("28"));
    }

    #[test]
    fn begin_edit_is_idempotent_while_pending() {
        let (store, id) = seeded_store();
        let mut overlay = EditOverlay::new();
        overlay.begin_edit(&store, id);
        overlay.set_field(&store, id, "name", "Alicia".to_owned());
        overlay.begin_edit(&store, id);
        assert_eq!(overlay.pending(id, "name"), Some("Alicia"));
    }

    #[test]
    fn begin_edit_of_unknown_record_is_a_noop() {
        let (store, _) = seeded_store();
        let mut overlay = EditOverlay::new();
        assert!(!overlay.begin_edit(&store, RecordId::new(404)));
        assert!(!overlay.has_edits());
    }

    #[test]
    fn cancel_leaves_record_fields_untouched() {
        let (mut store, id) = seeded_store();
        let before = store.get(id).expect("record").clone();

        let mut overlay = EditOverlay::new();
        overlay.begin_edit(&store, id);
        overlay.set_field(&store, id, "name", "Mallory".to_owned());
        overlay.cancel_all();
        overlay.commit_all(&mut store);

        assert_eq!(store.get(id), Some(&before));
        assert!(!overlay.has_edits());
    }

    #[test]
    fn commit_writes_exactly_the_pending_fields() {
        let (mut store, id) = seeded_store();
        let mut overlay = EditOverlay::new();
        overlay.set_field(&store, id, "name", "Alicia".to_owned());
        overlay.commit_all(&mut store);

        let record = store.get(id).expect("record");
        assert_eq!(record.field("name"), Some(&Value::text("Alicia")));
        // Untouched pending copies commit back as their stringified values.
        assert_eq!(record.field("age"), Some(&Value::text("28")));
        assert!(!overlay.has_edits());
    }

    #[test]
    fn commit_skips_records_deleted_mid_edit() {
        let (mut store, id) = seeded_store();
        let mut overlay = EditOverlay::new();
        overlay.set_field(&store, id, "name", "Gone".to_owned());
        store.delete(id);
        overlay.commit_all(&mut store);
        assert!(store.is_empty());
        assert!(!overlay.has_edits());
    }

    #[test]
    fn non_numeric_pending_text_is_accepted_with_advisory_warning() {
        let (store, id) = seeded_store();
        let mut overlay = EditOverlay::new();
        assert!(overlay.set_field(&store, id, "age", "abc".to_owned()));
        assert_eq!(overlay.pending(id, "age"), Some("abc"));
        assert!(numeric_warning("abc"));
        assert!(!numeric_warning("19"));
        assert!(!numeric_warning("  "));
    }
}
