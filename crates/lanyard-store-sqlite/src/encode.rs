//! Row decoding between SQLite text columns and domain types.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM` text and statuses as their
//! display strings, so the file stays legible in any SQLite browser.

use lanyard_core::{
  Error, Result,
  card::{Card, CardStatus},
  history::HistoryRecord,
  time,
};

fn decode_status(s: &str) -> Result<CardStatus> {
  s.parse()
    .map_err(|_| Error::Storage(format!("unknown status in cards table: {s:?}")))
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Raw strings read straight out of a `cards` row.
pub struct RawCard {
  pub id:            i64,
  pub label:         String,
  pub status:        String,
  pub holder:        Option<String>,
  pub signed_out_at: Option<String>,
  pub notes:         Option<String>,
  pub code:          Option<String>,
  pub home_location: Option<String>,
}

impl RawCard {
  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      id:            self.id,
      label:         self.label,
      status:        decode_status(&self.status)?,
      holder:        self.holder,
      signed_out_at: self
        .signed_out_at
        .as_deref()
        .map(time::parse_stamp)
        .transpose()?,
      notes:         self.notes,
      code:          self.code,
      home_location: self.home_location,
    })
  }
}

/// Raw strings read straight out of a `history` row.
pub struct RawHistory {
  pub id:            i64,
  pub card_label:    String,
  pub holder:        String,
  pub signed_out_at: String,
  pub returned_at:   Option<String>,
  pub notes:         Option<String>,
}

impl RawHistory {
  pub fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      id:            self.id,
      card_label:    self.card_label,
      holder:        self.holder,
      signed_out_at: time::parse_stamp(&self.signed_out_at)?,
      returned_at:   self
        .returned_at
        .as_deref()
        .map(time::parse_stamp)
        .transpose()?,
      notes:         self.notes,
    })
  }
}
