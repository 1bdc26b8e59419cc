//! The account read model and the fold that derives it.
//!
//! An [`Account`] is never persisted. It exists only as the result of
//! [`project`] over an account's ordered event history.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  event::{Event, EventKind},
};

// ─── Read model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  /// No closing event exists, so every account is open.
  #[default]
  Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
  Debit,
  Credit,
}

/// A single money movement, in log order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  #[serde(rename = "type")]
  pub kind:      TransactionType,
  pub value:     f64,
  /// Epoch milliseconds of the originating event.
  pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  /// Empty until an `AccountOpened` event has been folded.
  pub account_id:   String,
  pub owner_name:   String,
  /// Epoch milliseconds of the `AccountOpened` event.
  pub opened_at:    i64,
  pub status:       AccountStatus,
  pub transactions: Vec<Transaction>,
  pub balance:      f64,
  pub is_overdrawn: bool,
}

impl Account {
  /// Apply one event to the running state.
  ///
  /// Debits set the overdraft flag only when the balance drops below zero;
  /// credits clear it only when the balance rises above zero. A credit that
  /// lands exactly on zero leaves the flag as it was.
  fn apply(&mut self, event: &Event) -> Result<()> {
    let timestamp = event.time.timestamp_millis();
    match &event.kind {
      EventKind::AccountOpened { owner_name } => {
        self.account_id = event.account_id.to_string();
        self.owner_name = owner_name.clone();
        self.opened_at = timestamp;
      }
      EventKind::UpdateAccount { owner_name } => {
        self.owner_name = owner_name.clone();
      }
      EventKind::MoneyDebited { value } => {
        self.transactions.push(Transaction {
          kind: TransactionType::Debit,
          value: *value,
          timestamp,
        });
        self.balance -= value;
        if self.balance < 0.0 {
          self.is_overdrawn = true;
        }
      }
      EventKind::MoneyCredited { value } => {
        self.transactions.push(Transaction {
          kind: TransactionType::Credit,
          value: *value,
          timestamp,
        });
        self.balance += value;
        if self.balance > 0.0 {
          self.is_overdrawn = false;
        }
      }
      EventKind::Unrecognized => {
        return Err(Error::internal(
          format!(
            "unrecognised event at position {} of account {}",
            event.position, event.account_id
          ),
          "failed when processing account",
        ));
      }
    }
    Ok(())
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// Fold `events`, already sorted by position, into the current account state.
///
/// Pure: no I/O and no state retained between calls. `account_id` is only
/// used for diagnostics.
pub fn project(account_id: &str, events: &[Event]) -> Result<Account> {
  events
    .iter()
    .try_fold(Account::default(), |mut account, event| {
      account.apply(event)?;
      Ok(account)
    })
    .inspect_err(|_| tracing::warn!(account_id, "projection aborted"))
}
