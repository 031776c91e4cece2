//! SQL schema for the Basho SQLite store.
//!
//! Executed once per connection. The `TEMP` table is private to the
//! connection and disappears with it.

/// Durable schema; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS durable_entries (
    key         TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,   -- serialised JSON; may be corrupt, read fail-soft
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TEMP TABLE IF NOT EXISTS session_entries (
    key         TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

PRAGMA user_version = 1;
";
