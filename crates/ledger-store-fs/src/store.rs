//! [`FsStore`]: the filesystem implementation of [`EventStore`].

use std::{
  io,
  path::{Path, PathBuf},
};

use ledger_core::{
  event::{AccountId, Event},
  position::first_gap,
  store::EventStore,
};
use tokio::{fs, io::AsyncWriteExt as _};
use uuid::Uuid;

use crate::{Error, Result};

const SUFFIX: &str = ".json";

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
  move |source| Error::Io { path: path.to_path_buf(), source }
}

/// The position encoded in an entry's file name, if it is an event entry.
///
/// Only canonical names (`0.json`, `17.json`) count; anything else in the
/// account directory is ignored.
fn entry_position(path: &Path) -> Option<u64> {
  let name = path.file_name()?.to_str()?;
  let stem = name.strip_suffix(SUFFIX)?;
  let position: u64 = stem.parse().ok()?;
  (position.to_string() == stem).then_some(position)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store rooted at a directory.
///
/// Holds no state besides the root path; every read goes to disk. Cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct FsStore {
  root: PathBuf,
}

impl FsStore {
  /// Open a store at `root`, creating the directory if needed.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await.map_err(io_at(&root))?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  fn bucket(&self, account_id: &AccountId) -> PathBuf {
    self.root.join(account_id.as_str())
  }

  fn entry_path(&self, account_id: &AccountId, position: u64) -> PathBuf {
    self.bucket(account_id).join(format!("{position}{SUFFIX}"))
  }

  /// Read and parse every event entry of an account, sorted by position.
  ///
  /// Directory listing order is unspecified, so sorting here is required.
  async fn read_bucket(&self, account_id: &AccountId) -> Result<Vec<Event>> {
    let dir = self.bucket(account_id);
    let mut entries = match fs::read_dir(&dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => return Err(Error::Io { path: dir, source }),
    };

    let mut events = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_at(&dir))? {
      let path = entry.path();
      let Some(position) = entry_position(&path) else {
        tracing::trace!(?path, "skipping non-event entry");
        continue;
      };
      if !entry.file_type().await.map_err(io_at(&path))?.is_file() {
        continue;
      }

      let raw = fs::read_to_string(&path).await.map_err(io_at(&path))?;
      let event = Event::from_json(&raw)
        .map_err(|source| Error::Json { path: path.clone(), source })?;

      if event.position != position {
        return Err(Error::PositionMismatch { path, found: event.position });
      }
      if event.account_id != *account_id {
        return Err(Error::AccountMismatch { path, found: event.account_id });
      }
      events.push(event);
    }

    events.sort_by_key(|e| e.position);
    if let Some((expected, found)) = first_gap(&events) {
      return Err(Error::PositionGap { dir, expected, found });
    }
    Ok(events)
  }

  /// Write `event` to its entry file unless that file already exists.
  ///
  /// The record is written in full to a private temporary file first and
  /// then hard-linked into place. Linking fails if the target exists, so the
  /// entry appears atomically and at most once. Returns `false` if the
  /// position was already taken.
  ///
  /// Once the link exists the event is recorded, whatever happens to the
  /// directory sync that follows.
  async fn write_entry(&self, event: &Event) -> Result<bool> {
    let dir = self.bucket(&event.account_id);
    let target = self.entry_path(&event.account_id, event.position);
    let body = event
      .to_json()
      .map_err(|source| Error::Json { path: target.clone(), source })?;

    fs::create_dir_all(&dir).await.map_err(io_at(&dir))?;

    let tmp = dir.join(format!(".{}.{}.tmp", event.position, Uuid::new_v4()));
    let written = async {
      let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .await?;
      file.write_all(body.as_bytes()).await?;
      file.sync_all().await
    }
    .await
    .map_err(io_at(&tmp));

    let linked = match written {
      Ok(()) => fs::hard_link(&tmp, &target).await,
      Err(e) => {
        self.discard(&tmp).await;
        return Err(e);
      }
    };
    self.discard(&tmp).await;

    match linked {
      Ok(()) => {
        self.sync_dir(&dir).await;
        Ok(true)
      }
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
      Err(source) => Err(Error::Io { path: target, source }),
    }
  }

  async fn discard(&self, tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp).await
      && e.kind() != io::ErrorKind::NotFound
    {
      tracing::warn!(path = ?tmp, error = %e, "failed to remove temporary file");
    }
  }

  /// Flush the directory entry of a new event. Failures are logged only.
  #[cfg(unix)]
  async fn sync_dir(&self, dir: &Path) {
    let synced = async { fs::File::open(dir).await?.sync_all().await }.await;
    if let Err(e) = synced {
      tracing::warn!(?dir, error = %e, "failed to sync event directory");
    }
  }

  #[cfg(not(unix))]
  async fn sync_dir(&self, _dir: &Path) {}
}


// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for FsStore {
  async fn load(&self, account_id: &AccountId) -> ledger_core::Result<Vec<Event>> {
    self
      .read_bucket(account_id)
      .await
      .map_err(|e| ledger_core::Error::internal(e, "failed to process the data"))
  }

  async fn append(&self, event: &Event) -> ledger_core::Result<()> {
    let path = self.entry_path(&event.account_id, event.position);
    tracing::debug!(?path, kind = event.kind.name(), "writing new event");

    match self.write_entry(event).await {
      Ok(true) => Ok(()),
      Ok(false) => {
        tracing::info!(?path, "position already taken");
        Err(ledger_core::Error::Conflict {
          account_id: event.account_id.clone(),
          position:   event.position,
        })
      }
      Err(e) => Err(ledger_core::Error::internal(e, "failed to write event")),
    }
  }
}
