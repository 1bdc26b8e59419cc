//! The `EventStore` trait.
//!
//! Implemented by storage backends (`ledger-store-fs`, `ledger-store-sqlite`).
//! The API layer depends on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{
  Result,
  event::{AccountId, Event},
};

/// An append-only, per-account event log keyed by `(account_id, position)`.
///
/// Backends report failures through [`crate::Error`] only. Underlying I/O or
/// database errors are logged by the backend and surfaced as
/// [`crate::Error::Internal`].
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait EventStore: Send + Sync {
  /// Every event recorded for `account_id`, sorted by position ascending.
  ///
  /// An account with no stored events yields an empty vec, not an error.
  fn load<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send + 'a;

  /// Durably write `event` at its `(account_id, position)` key.
  ///
  /// Must fail with [`crate::Error::Conflict`] if the key is already taken,
  /// leaving the existing record untouched.
  fn append<'a>(
    &'a self,
    event: &'a Event,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  // ── Provided ──────────────────────────────────────────────────────────

  /// [`EventStore::load`] for an unvalidated id; a blank or otherwise
  /// invalid id fails with [`crate::Error::BadRequest`].
  fn load_events<'a>(
    &'a self,
    account_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send + 'a {
    async move {
      let account_id = AccountId::parse(account_id)?;
      self.load(&account_id).await
    }
  }

  /// Validate `event` and [`EventStore::append`] it.
  fn append_event<'a>(
    &'a self,
    event: &'a Event,
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    async move {
      event.validate()?;
      self.append(event).await
    }
  }
}
