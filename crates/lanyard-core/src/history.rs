//! Sign-out history records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type HistoryId = i64;

/// One borrow cycle: opened at sign-out, closed at return (or when a lost
/// card turns up again).
///
/// Records reference cards by label rather than id, so history survives card
/// deletion. When a card is renamed, its records are relabelled to follow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
  pub id:            HistoryId,
  pub card_label:    String,
  pub holder:        String,
  #[serde(with = "crate::time::stamp")]
  pub signed_out_at: NaiveDateTime,
  /// `None` while the cycle is still open.
  #[serde(default, with = "crate::time::stamp_opt")]
  pub returned_at:   Option<NaiveDateTime>,
  pub notes:         Option<String>,
}

impl HistoryRecord {
  /// An open record is a cycle with no return yet.
  pub fn is_open(&self) -> bool {
    self.returned_at.is_none()
  }
}
