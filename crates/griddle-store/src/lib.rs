// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod csv_codec;

use anyhow::{Context, Result, anyhow, bail};
use griddle_app::{ColumnSpec, Theme, Value, default_columns};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use csv_codec::{EXPORT_FILE_NAME, parse_records, serialize_table};

pub const APP_NAME: &str = "griddle";

const COLUMNS_ENTRY: &str = "columns.json";
const THEME_ENTRY: &str = "theme";

/// Key-value persistence over a flat state directory: one file per entry.
/// Reads fall back to built-in defaults on any invalid content; writes are
/// best-effort and never block the triggering user action.
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn open(root: &Path) -> Result<Self> {
        validate_state_dir(&root.to_string_lossy())?;
        fs::create_dir_all(root)
            .with_context(|| format!("create state directory {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// A throwaway state directory for demo sessions; nothing from a real
    /// session is read or overwritten.
    pub fn open_ephemeral() -> Result<Self> {
        let root = env::temp_dir().join(format!("{APP_NAME}-demo-{}", std::process::id()));
        if root.exists() {
            fs::remove_dir_all(&root)
                .with_context(|| format!("clear demo state directory {}", root.display()))?;
        }
        Self::open(&root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, entry: &str) -> PathBuf {
        self.root.join(entry)
    }

    fn read_entry(&self, entry: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(entry)).ok()
    }

    fn write_entry(&self, entry: &str, value: &str) -> bool {
        fs::write(self.entry_path(entry), value).is_ok()
    }

    /// Persisted column layout, or the built-in defaults when the entry is
    /// absent, unreadable, or not a well-formed descriptor list. No partial
    /// recovery: one bad shape discards the whole persisted value.
    pub fn load_columns(&self) -> Vec<ColumnSpec> {
        self.read_entry(COLUMNS_ENTRY)
            .and_then(|raw| serde_json::from_str::<Vec<ColumnSpec>>(&raw).ok())
            .filter(|specs| has_unique_keys(specs))
            .unwrap_or_else(default_columns)
    }

    /// Best-effort write of the full layout; a storage failure leaves the
    /// in-memory registry authoritative for the session.
    pub fn save_columns(&self, specs: &[ColumnSpec]) -> bool {
        match serde_json::to_string(specs) {
            Ok(serialized) => self.write_entry(COLUMNS_ENTRY, &serialized),
            Err(_) => false,
        }
    }

    pub fn load_theme(&self) -> Theme {
        self.read_entry(THEME_ENTRY)
            .and_then(|raw| Theme::parse(raw.trim()))
            .unwrap_or(Theme::Light)
    }

    pub fn save_theme(&self, theme: Theme) -> bool {
        self.write_entry(THEME_ENTRY, theme.as_str())
    }
}

fn has_unique_keys(specs: &[ColumnSpec]) -> bool {
    let mut seen = BTreeSet::new();
    specs.iter().all(|spec| seen.insert(spec.key.as_str()))
}

pub fn validate_state_dir(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("state directory must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "state directory {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("state directory {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    Ok(())
}

pub fn default_state_dir() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("GRIDDLE_STATE_DIR") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set GRIDDLE_STATE_DIR to a writable directory")
    })?;
    Ok(data_root.join(APP_NAME))
}

/// The built-in rows every session starts from; the row set itself is never
/// persisted.
pub fn sample_records() -> Vec<BTreeMap<String, Value>> {
    [
        ("Alice Johnson", "alice@example.com", 28.0, "Developer"),
        ("Bob Smith", "bob@example.com", 35.0, "Manager"),
        ("Carol White", "carol@example.com", 22.0, "Intern"),
        ("David Brown", "david@example.com", 41.0, "Director"),
        ("Eve Black", "eve@example.com", 30.0, "Designer"),
    ]
    .into_iter()
    .map(|(name, email, age, role)| {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), Value::text(name));
        fields.insert("email".to_owned(), Value::text(email));
        fields.insert("age".to_owned(), Value::Number(age));
        fields.insert("role".to_owned(), Value::text(role));
        fields
    })
    .collect()
}
