//! Runtime configuration, layered from a TOML file and `BASHO_*` variables.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use basho_assistant::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_base_url")]
  pub api_base_url: String,
  #[serde(default)]
  pub api_key:      Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("basho.db") }

fn default_model() -> String { DEFAULT_MODEL.to_owned() }

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

// The key must never reach the logs.
impl fmt::Debug for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Settings")
      .field("store_path", &self.store_path)
      .field("model", &self.model)
      .field("api_base_url", &self.api_base_url)
      .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
      .finish()
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `BASHO_*` environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("BASHO"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.api_base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basho.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "store_path = \"/tmp/studio.db\"\nmodel = \"gemini-flash\"\napi_key = \"k\"").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/studio.db"));
    assert_eq!(settings.model, "gemini-flash");
    assert_eq!(settings.api_key.as_deref(), Some("k"));
    assert!(!format!("{settings:?}").contains("\"k\""));
  }

  #[test]
  fn tilde_expansion_leaves_plain_paths_alone() {
    assert_eq!(expand_tilde(Path::new("basho.db")), PathBuf::from("basho.db"));
  }
}
