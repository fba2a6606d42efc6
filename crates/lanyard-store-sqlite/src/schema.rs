//! SQL schema for the card tracker.
//!
//! Base tables are created `IF NOT EXISTS`; the `code` and `home_location`
//! columns arrived after the first release and are added to older files in
//! place by [`migrate`]. Both paths leave the same layout behind.

use rusqlite::Connection;

/// Base DDL. Deliberately matches databases created before the optional
/// columns existed, which is exactly the shape `migrate` expects to find.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cards (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    label         TEXT UNIQUE NOT NULL,
    status        TEXT NOT NULL DEFAULT 'Available'
                  CHECK (status IN ('Available', 'Out', 'Lost')),
    holder        TEXT,
    signed_out_at TEXT,
    notes         TEXT
);

-- One row per borrow cycle. Records outlive their card and reference it by
-- label; renames relabel these rows in the same transaction.
CREATE TABLE IF NOT EXISTS history (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    card_label    TEXT NOT NULL,
    holder        TEXT NOT NULL,
    signed_out_at TEXT NOT NULL,
    returned_at   TEXT,
    notes         TEXT
);
";

/// Columns bolted onto `cards` after the original release.
const CARD_UPGRADES: [(&str, &str); 2] = [
  ("code", "ALTER TABLE cards ADD COLUMN code TEXT"),
  ("home_location", "ALTER TABLE cards ADD COLUMN home_location TEXT"),
];

/// Codes must be unique, but only when present.
const CODE_INDEX: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS idx_cards_code_unique
    ON cards(code) WHERE code IS NOT NULL
";

/// Bring the connected database up to date, whatever vintage the file is.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(SCHEMA)?;

  let mut stmt = conn.prepare("PRAGMA table_info(cards)")?;
  let existing: Vec<String> = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<_>>()?;

  for (column, ddl) in CARD_UPGRADES {
    if !existing.iter().any(|c| c == column) {
      tracing::info!(column, "adding missing cards column");
      conn.execute(ddl, [])?;
    }
  }

  conn.execute(CODE_INDEX, [])?;
  Ok(())
}
