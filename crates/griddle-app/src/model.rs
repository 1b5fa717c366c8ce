// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::RecordId;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A single cell value. Records are schema-less: a record may lack a key the
/// registry knows about (renders empty) or carry keys the registry does not
/// (ignored by rendering, preserved on the record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(f64),
    Empty,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => {
                if value.fract() == 0.0 {
                    format!("{value:.0}")
                } else {
                    value.to_string()
                }
            }
            Self::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::Number(_) => false,
            Self::Empty => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub visible: bool,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            visible: true,
        }
    }
}

pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", "Name"),
        ColumnSpec::new("email", "Email"),
        ColumnSpec::new("age", "Age"),
        ColumnSpec::new("role", "Role"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Stringified view of a field; a missing key reads as empty string.
    pub fn text(&self, key: &str) -> String {
        self.fields.get(key).map(Value::display).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn marker(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub search: String,
    pub sort: SortSpec,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortSpec::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnSpec, Theme, Value, default_columns};

    #[test]
    fn theme_parse_and_storage_round_trip() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::parse("solarized"), None);
    }

    #[test]
    fn theme_toggles_between_both_values() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(Value::Number(28.0).display(), "28");
        assert_eq!(Value::Number(2.5).display(), "2.5");
        assert_eq!(Value::Empty.display(), "");
    }

    #[test]
    fn default_columns_are_all_visible() {
        let columns = default_columns();
        assert_eq!(columns.len(), 4);
        assert!(columns.iter().all(|column| column.visible));
        assert_eq!(columns[0], ColumnSpec::new("name", "Name"));
    }
}
