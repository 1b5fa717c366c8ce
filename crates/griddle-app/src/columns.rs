// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::ColumnSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyColumnField,
    DuplicateColumnKey,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyColumnField => f.write_str("column key and label are required"),
            Self::DuplicateColumnKey => f.write_str("column key already exists"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Ordered list of column descriptors. Order is display and export order;
/// keys are unique after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRegistry {
    specs: Vec<ColumnSpec>,
}

impl ColumnRegistry {
    pub fn new(specs: Vec<ColumnSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnSpec> {
        self.specs.get(index)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.key.as_str()).collect()
    }

    pub fn visible(&self) -> Vec<&ColumnSpec> {
        self.specs.iter().filter(|spec| spec.visible).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.specs.iter().any(|spec| spec.key == key)
    }

    pub fn add(&mut self, key: &str, label: &str) -> ValidationResult<()> {
        let key = key.trim();
        let label = label.trim();
        if key.is_empty() || label.is_empty() {
            return Err(ValidationError::EmptyColumnField);
        }
        if self.contains_key(key) {
            return Err(ValidationError::DuplicateColumnKey);
        }
        self.specs.push(ColumnSpec::new(key, label));
        Ok(())
    }

    /// Removes the descriptor at `index`. Record data for that key is left
    /// alone. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.specs.len() {
            return false;
        }
        self.specs.remove(index);
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.specs.len() {
            return false;
        }
        self.specs.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.specs.len() {
            return false;
        }
        self.specs.swap(index, index + 1);
        true
    }

    /// Wholesale order replacement from a caller-supplied key sequence (the
    /// outcome of a reorder gesture). Keys the registry does not know are
    /// dropped silently; the sequence is the new order.
    pub fn reorder(&mut self, new_key_order: &[String]) {
        let mut reordered = Vec::with_capacity(self.specs.len());
        for key in new_key_order {
            if let Some(position) = self.specs.iter().position(|spec| &spec.key == key) {
                reordered.push(self.specs.remove(position));
            }
        }
        self.specs = reordered;
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.specs.get_mut(index) {
            Some(spec) => {
                spec.visible = visible;
                true
            }
            None => false,
        }
    }
}
