//! SQL schema for the ledger SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    account_id  TEXT    NOT NULL,
    position    INTEGER NOT NULL CHECK (position >= 0),
    event_type  TEXT    NOT NULL,   -- the record's `type` tag
    recorded_at TEXT    NOT NULL,   -- RFC 3339 UTC, the record's `time`
    body        TEXT    NOT NULL,   -- the full JSON record
    PRIMARY KEY (account_id, position)
) WITHOUT ROWID;

PRAGMA user_version = 1;
";
