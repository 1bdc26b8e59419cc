//! Event records: the immutable unit of account history.
//!
//! An event is written once at a `(account_id, position)` key and never
//! updated. The JSON form is a storage compatibility surface:
//!
//! ```json
//! {
//!   "accountId": "12060626",
//!   "position": 1,
//!   "time": "2020-01-02T09:30:00Z",
//!   "type": "MoneyCredited",
//!   "value": 100
//! }
//! ```

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── AccountId ───────────────────────────────────────────────────────────────

/// A validated account identifier.
///
/// Non-blank, and usable as a single path segment so that a backend may key
/// storage by it directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
  pub fn parse(id: impl Into<String>) -> Result<Self> {
    let id = id.into();
    if id.trim().is_empty() {
      return Err(Error::BadRequest("account id not provided".into()));
    }
    if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
      return Err(Error::BadRequest(format!("invalid account id: {id:?}")));
    }
    Ok(Self(id))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for AccountId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl FromStr for AccountId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for AccountId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(s) }
}

impl From<AccountId> for String {
  fn from(id: AccountId) -> Self { id.0 }
}

// ─── EventKind ───────────────────────────────────────────────────────────────

/// What happened. Serialised inline with the [`Event`] under a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
  /// Establishes the account. Only valid at position 0.
  AccountOpened {
    #[serde(rename = "ownerName")]
    owner_name: String,
  },
  UpdateAccount {
    #[serde(rename = "ownerName")]
    owner_name: String,
  },
  MoneyDebited { value: f64 },
  MoneyCredited { value: f64 },
  /// A `type` this build does not know. Kept so that folding can reject it
  /// instead of the loader dropping it.
  #[serde(other)]
  Unrecognized,
}

impl EventKind {
  pub fn name(&self) -> &'static str {
    match self {
      Self::AccountOpened { .. } => "AccountOpened",
      Self::UpdateAccount { .. } => "UpdateAccount",
      Self::MoneyDebited { .. } => "MoneyDebited",
      Self::MoneyCredited { .. } => "MoneyCredited",
      Self::Unrecognized => "Unrecognized",
    }
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub account_id: AccountId,
  /// Zero-based, gapless, unique within the account. The sole ordering
  /// authority.
  pub position:   u64,
  /// Informational only. Records without an offset are read as UTC.
  #[serde(deserialize_with = "deserialize_time")]
  pub time:       DateTime<Utc>,
  #[serde(flatten)]
  pub kind:       EventKind,
}

fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  if let Ok(time) = DateTime::parse_from_rfc3339(&raw) {
    return Ok(time.with_timezone(&Utc));
  }
  if let Ok(time) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(time.and_utc());
  }
  NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|time| time.and_utc())
    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

impl Event {
  /// Build an event stamped with the current time.
  pub fn new(account_id: AccountId, position: u64, kind: EventKind) -> Self {
    Self { account_id, position, time: Utc::now(), kind }
  }

  /// Reject events that must never reach durable storage.
  pub fn validate(&self) -> Result<()> {
    let bad = |msg: String| Err(Error::BadRequest(msg));
    match &self.kind {
      EventKind::AccountOpened { .. } if self.position != 0 => {
        return bad(format!(
          "AccountOpened must be at position 0, not {}",
          self.position
        ));
      }
      kind if self.position == 0 && !matches!(kind, EventKind::AccountOpened { .. }) => {
        return bad(format!(
          "the first event of an account must be AccountOpened, not {}",
          kind.name()
        ));
      }
      _ => {}
    }
    match &self.kind {
      EventKind::AccountOpened { owner_name } | EventKind::UpdateAccount { owner_name }
        if owner_name.trim().is_empty() =>
      {
        bad("owner name not provided".into())
      }
      EventKind::MoneyDebited { value } | EventKind::MoneyCredited { value }
        if !(value.is_finite() && *value > 0.0) =>
      {
        bad(format!("value must be a positive number, got {value}"))
      }
      EventKind::Unrecognized => bad("unrecognised event type".into()),
      _ => Ok(()),
    }
  }

  /// The on-disk representation: two-space indented JSON.
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  pub fn from_json(s: &str) -> serde_json::Result<Self> { serde_json::from_str(s) }
}
