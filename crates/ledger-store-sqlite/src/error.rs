//! Error type for `ledger-store-sqlite`.
//!
//! Never crosses the [`ledger_core::store`] boundary; see
//! [`ledger_core::Error::internal`].

use ledger_core::event::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("row ({account_id}, {position}) holds a record for position {found}")]
  PositionMismatch {
    account_id: String,
    position:   i64,
    found:      u64,
  },

  #[error("row ({account_id}, {position}) holds a record for account {found}")]
  AccountMismatch {
    account_id: String,
    position:   i64,
    found:      AccountId,
  },

  #[error("event log of account {account_id} has no position {expected}; next row is {found}")]
  PositionGap {
    account_id: String,
    expected:   u64,
    found:      u64,
  },

  #[error("position {0} does not fit in an SQLite integer")]
  PositionRange(u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
