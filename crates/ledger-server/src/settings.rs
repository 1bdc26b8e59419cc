//! Runtime configuration.
//!
//! Layered with the `config` crate: an optional TOML file, then environment
//! variables prefixed `LEDGER_` with `__` between nested keys
//! (`LEDGER_STORE__PATH=/srv/events`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// One directory per account, one JSON file per event.
  #[default]
  Fs,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: Backend,
  /// Root directory for `fs`, database file for `sqlite`.
  #[serde(default = "default_store_path")]
  pub path:    PathBuf,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self { backend: Backend::default(), path: default_store_path() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:  String,
  #[serde(default = "default_port")]
  pub port:  u16,
  #[serde(default)]
  pub store: StoreConfig,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("./events") }

impl ServerConfig {
  /// Read `path` (if it exists) and the `LEDGER_*` environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("LEDGER")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store.path = expand_tilde(&cfg.store.path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
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
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.store.backend, Backend::Fs);
    assert_eq!(cfg.store.path, PathBuf::from("./events"));
  }

  #[test]
  fn selects_sqlite_backend() {
    let cfg = parse(
      r#"
      host = "0.0.0.0"
      port = 8080

      [store]
      backend = "sqlite"
      path    = "/var/lib/ledger/ledger.db"
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.store.backend, Backend::Sqlite);
    assert_eq!(cfg.store.path, PathBuf::from("/var/lib/ledger/ledger.db"));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/ledger.toml")).unwrap();
    assert_eq!(cfg.port, default_port());
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/events")),
      PathBuf::from(home).join("events")
    );
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
