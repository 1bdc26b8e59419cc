//! Error types for `ledger-core`.
//!
//! Every failure that crosses the core boundary is one of three kinds. Raw
//! I/O, SQL and parse errors never appear here: backends log them and report
//! [`Error::Internal`] with a fixed message.

use std::fmt;

use thiserror::Error;

use crate::event::AccountId;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  BadRequest,
  Conflict,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  /// The caller supplied an invalid account id or a malformed event.
  #[error("{0}")]
  BadRequest(String),

  /// An event already occupies this position.
  #[error("position {position} is already taken for account {account_id}")]
  Conflict {
    account_id: AccountId,
    position:   u64,
  },

  /// Storage corruption, an unreadable record, or an unrecognised event.
  #[error("{0}")]
  Internal(&'static str),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::BadRequest(_) => ErrorKind::BadRequest,
      Self::Conflict { .. } => ErrorKind::Conflict,
      Self::Internal(_) => ErrorKind::Internal,
    }
  }

  /// Log `cause` for operators and return a generic internal error carrying
  /// only `message`.
  pub fn internal(cause: impl fmt::Display, message: &'static str) -> Self {
    tracing::error!(%cause, "{message}");
    Self::Internal(message)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
