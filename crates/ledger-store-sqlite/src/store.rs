//! [`SqliteStore`]: the SQLite implementation of [`EventStore`].

use std::path::Path;

use ledger_core::{
  event::{AccountId, Event},
  position::first_gap,
  store::EventStore,
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_events(&self, account_id: &AccountId) -> Result<Vec<Event>> {
    let id_str = account_id.to_string();

    let rows: Vec<(i64, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT position, body FROM events WHERE account_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let events = rows
      .into_iter()
      .map(|(position, body)| {
        let event = Event::from_json(&body)?;
        if i64::try_from(event.position) != Ok(position) {
          return Err(Error::PositionMismatch {
            account_id: account_id.to_string(),
            position,
            found: event.position,
          });
        }
        if event.account_id != *account_id {
          return Err(Error::AccountMismatch {
            account_id: account_id.to_string(),
            position,
            found: event.account_id,
          });
        }
        Ok(event)
      })
      .collect::<Result<Vec<_>>>()?;

    if let Some((expected, found)) = first_gap(&events) {
      return Err(Error::PositionGap {
        account_id: account_id.to_string(),
        expected,
        found,
      });
    }
    Ok(events)
  }

  /// Insert a row without any checks, as a damaged database might hold.
  #[cfg(test)]
  pub(crate) async fn insert_raw(&self, account_id: &str, position: i64, body: &str) {
    let (id_str, body) = (account_id.to_owned(), body.to_owned());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (account_id, position, event_type, recorded_at, body)
           VALUES (?1, ?2, 'raw', '', ?3)",
          rusqlite::params![id_str, position, body],
        )?;
        Ok(())
      })
      .await
      .expect("raw insert");
  }

  /// Insert `event` unless its key is taken. Returns `false` if it was.
  async fn insert_event(&self, event: &Event) -> Result<bool> {
    let position = i64::try_from(event.position)
      .map_err(|_| Error::PositionRange(event.position))?;
    let id_str      = event.account_id.to_string();
    let event_type  = event.kind.name();
    let recorded_at = event.time.to_rfc3339();
    let body        = event.to_json()?;

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO events (account_id, position, event_type, recorded_at, body)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, position, event_type, recorded_at, body],
        )?;
        Ok(changed == 1)
      })
      .await?;
    Ok(inserted)
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  async fn load(&self, account_id: &AccountId) -> ledger_core::Result<Vec<Event>> {
    self
      .select_events(account_id)
      .await
      .map_err(|e| ledger_core::Error::internal(e, "failed to process the data"))
  }

  async fn append(&self, event: &Event) -> ledger_core::Result<()> {
    tracing::debug!(
      account_id = %event.account_id,
      position = event.position,
      kind = event.kind.name(),
      "inserting new event"
    );

    match self.insert_event(event).await {
      Ok(true) => Ok(()),
      Ok(false) => Err(ledger_core::Error::Conflict {
        account_id: event.account_id.clone(),
        position:   event.position,
      }),
      Err(e) => Err(ledger_core::Error::internal(e, "failed to write event")),
    }
  }
}
