//! [`SqliteStore`] — the SQLite implementation of [`CardStore`].

use std::{path::Path, time::Duration};

use rusqlite::{
  Connection, ErrorCode, OptionalExtension as _, Transaction,
  TransactionBehavior,
};

use lanyard_core::{
  Error, Result,
  card::{Card, CardId, CardStatus, NewCard, clean_holder, clean_text},
  error::DuplicateField,
  history::HistoryRecord,
  query::{CardFilter, HistoryFilter, natural_label_cmp},
  seed,
  store::CardStore,
  time::{format_stamp, now_stamp},
};

use crate::{
  encode::{RawCard, RawHistory},
  schema,
};

/// How long a writer waits on a lock held by another process before the
/// operation fails with [`Error::Busy`].
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const CARD_COLUMNS: &str =
  "id, label, status, holder, signed_out_at, notes, code, home_location";

const HISTORY_COLUMNS: &str =
  "id, card_label, holder, signed_out_at, returned_at, notes";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A card tracker backed by a single SQLite file.
///
/// Safe to open from several processes at once: WAL keeps reads unblocked
/// while immediate transactions serialise the writers.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with the default busy timeout.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
  }

  /// Open with an explicit busy timeout. Tests use short timeouts to
  /// exercise [`Error::Busy`] without waiting out the default.
  pub fn open_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
  ) -> Result<Self> {
    let conn = Connection::open(path).map_err(db_err)?;
    Self::from_connection(conn, busy_timeout)
  }

  /// In-memory store for tests. Same pragmas, nothing on disk.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().map_err(db_err)?;
    Self::from_connection(conn, DEFAULT_BUSY_TIMEOUT)
  }

  fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self> {
    conn.busy_timeout(busy_timeout).map_err(db_err)?;
    conn
      .pragma_update(None, "journal_mode", "WAL")
      .map_err(db_err)?;
    conn
      .pragma_update(None, "synchronous", "NORMAL")
      .map_err(db_err)?;

    let store = Self { conn };
    store.initialize_schema()?;
    Ok(store)
  }

  /// Create missing tables, columns and indexes. Idempotent; runs on every
  /// open so older files are upgraded in place.
  pub fn initialize_schema(&self) -> Result<()> {
    schema::migrate(&self.conn).map_err(db_err)
  }

  /// Run `f` inside an immediate transaction: the write lock is taken up
  /// front, committed on `Ok` and rolled back on any error.
  fn with_write<T>(
    &mut self,
    f: impl FnOnce(&Transaction) -> Result<T>,
  ) -> Result<T> {
    let tx = self
      .conn
      .transaction_with_behavior(TransactionBehavior::Immediate)
      .map_err(db_err)?;
    let value = f(&tx)?;
    tx.commit().map_err(db_err)?;
    Ok(value)
  }
}

// ─── Error classification ────────────────────────────────────────────────────

/// Classify a rusqlite failure into the domain taxonomy.
///
/// UNIQUE violations name the offending column (or index) only in the
/// message text, so the mapping matches on it.
fn db_err(e: rusqlite::Error) -> Error {
  match &e {
    rusqlite::Error::SqliteFailure(inner, message) => match inner.code {
      ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => Error::Busy,
      ErrorCode::ConstraintViolation => {
        let message = message.as_deref().unwrap_or_default();
        if message.contains("cards.label") {
          Error::Duplicate(DuplicateField::Label)
        } else if message.contains("cards.code")
          || message.contains("idx_cards_code_unique")
        {
          Error::Duplicate(DuplicateField::Code)
        } else {
          Error::Storage(e.to_string())
        }
      }
      _ => Error::Storage(e.to_string()),
    },
    _ => Error::Storage(e.to_string()),
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn read_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCard> {
  Ok(RawCard {
    id:            row.get(0)?,
    label:         row.get(1)?,
    status:        row.get(2)?,
    holder:        row.get(3)?,
    signed_out_at: row.get(4)?,
    notes:         row.get(5)?,
    code:          row.get(6)?,
    home_location: row.get(7)?,
  })
}

fn read_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHistory> {
  Ok(RawHistory {
    id:            row.get(0)?,
    card_label:    row.get(1)?,
    holder:        row.get(2)?,
    signed_out_at: row.get(3)?,
    returned_at:   row.get(4)?,
    notes:         row.get(5)?,
  })
}

fn fetch_card(conn: &Connection, id: CardId) -> Result<Option<Card>> {
  let raw = conn
    .query_row(
      &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
      rusqlite::params![id],
      read_card,
    )
    .optional()
    .map_err(db_err)?;
  raw.map(RawCard::into_card).transpose()
}

fn require_card(conn: &Connection, id: CardId) -> Result<Card> {
  fetch_card(conn, id)?.ok_or(Error::CardNotFound(id))
}

/// Stamp the newest open history record for `label`, if one exists.
///
/// A missing record is not an error. The card's status is the guard;
/// closing history is bookkeeping.
fn close_open_record(conn: &Connection, label: &str, stamp: &str) -> Result<usize> {
  conn
    .execute(
      "UPDATE history SET returned_at = ?1
       WHERE id = (
         SELECT id FROM history
         WHERE card_label = ?2 AND returned_at IS NULL
         ORDER BY id DESC LIMIT 1
       )",
      rusqlite::params![stamp, label],
    )
    .map_err(db_err)
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  // ── Catalog ───────────────────────────────────────────────────────────

  fn add_card(&mut self, input: NewCard) -> Result<Card> {
    self.with_write(|tx| {
      tx.execute(
        "INSERT INTO cards (label, code, home_location) VALUES (?1, ?2, ?3)",
        rusqlite::params![input.label, input.code, input.home_location],
      )
      .map_err(db_err)?;
      require_card(tx, tx.last_insert_rowid())
    })
  }

  fn edit_card(&mut self, id: CardId, input: NewCard) -> Result<Card> {
    self.with_write(|tx| {
      let before = require_card(tx, id)?;

      tx.execute(
        "UPDATE cards SET label = ?1, code = ?2, home_location = ?3
         WHERE id = ?4",
        rusqlite::params![input.label, input.code, input.home_location, id],
      )
      .map_err(db_err)?;

      // History follows the card through renames.
      if before.label != input.label {
        let relabelled = tx
          .execute(
            "UPDATE history SET card_label = ?1 WHERE card_label = ?2",
            rusqlite::params![input.label, before.label],
          )
          .map_err(db_err)?;
        tracing::debug!(card = id, rows = relabelled, "relabelled history after rename");
      }

      require_card(tx, id)
    })
  }

  fn remove_card(&mut self, id: CardId) -> Result<()> {
    self.with_write(|tx| {
      let card = require_card(tx, id)?;
      if card.status == CardStatus::Out {
        return Err(Error::InvalidTransition {
          action: "remove",
          status: card.status,
        });
      }
      tx.execute("DELETE FROM cards WHERE id = ?1", rusqlite::params![id])
        .map_err(db_err)?;
      Ok(())
    })
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  fn sign_out(
    &mut self,
    id: CardId,
    holder: &str,
    notes: Option<&str>,
  ) -> Result<Card> {
    let holder = clean_holder(holder)?;
    let notes = clean_text(notes);

    self.with_write(|tx| {
      let card = require_card(tx, id)?;
      if card.status != CardStatus::Available {
        return Err(Error::InvalidTransition {
          action: "sign out",
          status: card.status,
        });
      }

      // One stamp for both rows, so the card and its record always agree.
      let stamp = format_stamp(now_stamp());
      tx.execute(
        "UPDATE cards SET status = 'Out', holder = ?1, signed_out_at = ?2,
         notes = ?3 WHERE id = ?4",
        rusqlite::params![holder, stamp, notes, id],
      )
      .map_err(db_err)?;
      tx.execute(
        "INSERT INTO history (card_label, holder, signed_out_at, notes)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![card.label, holder, stamp, notes],
      )
      .map_err(db_err)?;

      require_card(tx, id)
    })
  }

  fn return_card(&mut self, id: CardId) -> Result<Card> {
    self.with_write(|tx| {
      let card = require_card(tx, id)?;
      if card.status != CardStatus::Out {
        return Err(Error::InvalidTransition {
          action: "return",
          status: card.status,
        });
      }

      let stamp = format_stamp(now_stamp());
      tx.execute(
        "UPDATE cards SET status = 'Available', holder = NULL,
         signed_out_at = NULL, notes = NULL WHERE id = ?1",
        rusqlite::params![id],
      )
      .map_err(db_err)?;
      close_open_record(tx, &card.label, &stamp)?;

      require_card(tx, id)
    })
  }

  fn mark_lost(&mut self, id: CardId) -> Result<Card> {
    self.with_write(|tx| {
      let card = require_card(tx, id)?;
      if card.status == CardStatus::Lost {
        return Ok(card);
      }
      // A card lost while out keeps its holder, stamp and note; the open
      // history record stays open until the card turns up.
      tx.execute(
        "UPDATE cards SET status = 'Lost' WHERE id = ?1",
        rusqlite::params![id],
      )
      .map_err(db_err)?;
      require_card(tx, id)
    })
  }

  fn mark_found(&mut self, id: CardId) -> Result<Card> {
    self.with_write(|tx| {
      let card = require_card(tx, id)?;
      if card.status != CardStatus::Lost {
        return Err(Error::InvalidTransition {
          action: "mark found",
          status: card.status,
        });
      }

      let stamp = format_stamp(now_stamp());
      tx.execute(
        "UPDATE cards SET status = 'Available', holder = NULL,
         signed_out_at = NULL, notes = NULL WHERE id = ?1",
        rusqlite::params![id],
      )
      .map_err(db_err)?;
      // A card lost while out still has an open cycle; finding it ends
      // that cycle.
      close_open_record(tx, &card.label, &stamp)?;

      require_card(tx, id)
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_card(&self, id: CardId) -> Result<Option<Card>> {
    fetch_card(&self.conn, id)
  }

  fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(search) = filter.search.as_deref().map(str::trim)
      && !search.is_empty()
    {
      params.push(format!("%{search}%"));
      let n = params.len();
      clauses.push(format!(
        "(label LIKE ?{n} OR holder LIKE ?{n} OR notes LIKE ?{n} \
         OR code LIKE ?{n} OR home_location LIKE ?{n})"
      ));
    }
    if let Some(status) = filter.status {
      params.push(status.as_str().to_owned());
      clauses.push(format!("status = ?{}", params.len()));
    }

    let where_clause = if clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql =
      format!("SELECT {CARD_COLUMNS} FROM cards{where_clause} ORDER BY id");

    let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
    let raws = stmt
      .query_map(rusqlite::params_from_iter(params.iter()), read_card)
      .map_err(db_err)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(db_err)?;

    let mut cards = raws
      .into_iter()
      .map(RawCard::into_card)
      .collect::<Result<Vec<_>>>()?;
    cards.sort_by(|a, b| natural_label_cmp(&a.label, &b.label));
    Ok(cards)
  }

  fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(card) = filter.card.as_deref().map(str::trim)
      && !card.is_empty()
    {
      params.push(format!("%{card}%"));
      clauses.push(format!("card_label LIKE ?{}", params.len()));
    }
    if let Some(holder) = filter.holder.as_deref().map(str::trim)
      && !holder.is_empty()
    {
      params.push(format!("%{holder}%"));
      clauses.push(format!("holder LIKE ?{}", params.len()));
    }

    let where_clause = if clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
      "SELECT {HISTORY_COLUMNS} FROM history{where_clause} ORDER BY id DESC"
    );

    let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
    let raws = stmt
      .query_map(rusqlite::params_from_iter(params.iter()), read_history)
      .map_err(db_err)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(db_err)?;

    raws.into_iter().map(RawHistory::into_record).collect()
  }

  // ── Bootstrap ─────────────────────────────────────────────────────────

  fn is_first_run(&self) -> Result<bool> {
    let count: i64 = self
      .conn
      .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
      .map_err(db_err)?;
    Ok(count == 0)
  }

  fn seed_defaults(&mut self) -> Result<usize> {
    let catalog = seed::default_catalog();
    self.with_write(|tx| {
      let mut inserted = 0;
      for card in &catalog {
        inserted += tx
          .execute(
            "INSERT OR IGNORE INTO cards (label, code, home_location)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![card.label, card.code, card.home_location],
          )
          .map_err(db_err)?;
      }
      tracing::info!(inserted, "seeded default card catalog");
      Ok(inserted)
    })
  }
}
