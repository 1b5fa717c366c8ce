// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use griddle_tui::UiOptions;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_SEARCH_DEBOUNCE: &str = "160ms";
const DEFAULT_LOADING_DELAY: &str = "380ms";
const DEFAULT_LOADING_THRESHOLD: usize = 400;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub state_dir: Option<String>,
    pub export_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<usize>,
    pub reduced_motion: Option<bool>,
    pub search_debounce: Option<String>,
    pub loading_delay: Option<String>,
    pub loading_threshold: Option<usize>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(griddle_app::DEFAULT_PAGE_SIZE),
            reduced_motion: Some(false),
            search_debounce: Some(DEFAULT_SEARCH_DEBOUNCE.to_owned()),
            loading_delay: Some(DEFAULT_LOADING_DELAY.to_owned()),
            loading_threshold: Some(DEFAULT_LOADING_THRESHOLD),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("GRIDDLE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GRIDDLE_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(griddle_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [storage] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(state_dir) = &self.storage.state_dir {
            griddle_store::validate_state_dir(state_dir)?;
        }

        if let Some(page_size) = self.ui.page_size
            && page_size == 0
        {
            bail!("ui.page_size in {} must be positive", path.display());
        }

        if let Some(threshold) = self.ui.loading_threshold
            && threshold == 0
        {
            bail!("ui.loading_threshold in {} must be positive", path.display());
        }

        if let Some(debounce) = &self.ui.search_debounce {
            parse_duration(debounce)?;
        }
        if let Some(delay) = &self.ui.loading_delay {
            parse_duration(delay)?;
        }

        Ok(())
    }

    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.storage.state_dir {
            Some(path) => Ok(PathBuf::from(path)),
            None => griddle_store::default_state_dir(),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.storage.export_dir {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("."),
        }
    }

    pub fn ui_options(&self) -> Result<UiOptions> {
        Ok(UiOptions {
            page_size: self
                .ui
                .page_size
                .unwrap_or(griddle_app::DEFAULT_PAGE_SIZE)
                .max(1),
            reduced_motion: self.ui.reduced_motion.unwrap_or(false),
            search_debounce: parse_duration(
                self.ui
                    .search_debounce
                    .as_deref()
                    .unwrap_or(DEFAULT_SEARCH_DEBOUNCE),
            )?,
            loading_delay: parse_duration(
                self.ui
                    .loading_delay
                    .as_deref()
                    .unwrap_or(DEFAULT_LOADING_DELAY),
            )?,
            loading_threshold: self
                .ui
                .loading_threshold
                .unwrap_or(DEFAULT_LOADING_THRESHOLD),
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# griddle config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is the platform data dir (for example ~/.local/share/griddle)\n# state_dir = \"/absolute/path/to/state\"\n# Where exported CSV files land. Default is the working directory.\n# export_dir = \".\"\n\n[ui]\npage_size = {}\nreduced_motion = false\nsearch_debounce = \"{}\"\nloading_delay = \"{}\"\nloading_threshold = {}\n",
            path.display(),
            griddle_app::DEFAULT_PAGE_SIZE,
            DEFAULT_SEARCH_DEBOUNCE,
            DEFAULT_LOADING_DELAY,
            DEFAULT_LOADING_THRESHOLD,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s (for example 160ms)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        let options = config.ui_options()?;
        assert_eq!(options.page_size, 10);
        assert_eq!(options.search_debounce, Duration::from_millis(160));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npage_size = 5\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage] and [ui]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[storage]\nexport_dir = \"/tmp/exports\"\n[ui]\npage_size = 25\nreduced_motion = true\nsearch_debounce = \"0ms\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/exports"));

        let options = config.ui_options()?;
        assert_eq!(options.page_size, 25);
        assert!(options.reduced_motion);
        assert_eq!(options.search_debounce, Duration::ZERO);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("v7 config should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn zero_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\npage_size = 0\n")?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn invalid_debounce_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nsearch_debounce = \"oops\"\n")?;
        let error = Config::load(&path).expect_err("bad duration should fail");
        assert!(error.to_string().contains("invalid duration"));
        Ok(())
    }

    #[test]
    fn uri_style_state_dir_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\nstate_dir = \"https://evil.example/state\"\n")?;
        let error = Config::load(&path).expect_err("URI state_dir should fail");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GRIDDLE_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDDLE_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn state_dir_prefers_config_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\nstate_dir = \"/explicit/state\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.state_dir()?, PathBuf::from("/explicit/state"));
        Ok(())
    }

    #[test]
    fn parse_duration_accepts_ms_and_seconds() -> Result<()> {
        assert_eq!(parse_duration("160ms")?, Duration::from_millis(160));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        assert!(parse_duration("2m").is_err());
        assert!(parse_duration("oops").is_err());
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[ui]"));
        Ok(())
    }
}
