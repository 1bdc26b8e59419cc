//! Error type for `ledger-store-fs`.
//!
//! These errors stay inside the backend. At the [`ledger_core::store`]
//! boundary they are logged and replaced by a generic internal error.

use std::path::PathBuf;

use ledger_core::event::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error at {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("unparseable event record {path:?}: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("event record {path:?} claims position {found}")]
  PositionMismatch { path: PathBuf, found: u64 },

  #[error("event record {path:?} belongs to account {found}")]
  AccountMismatch { path: PathBuf, found: AccountId },

  #[error("event log {dir:?} has no position {expected}; next entry is {found}")]
  PositionGap { dir: PathBuf, expected: u64, found: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
