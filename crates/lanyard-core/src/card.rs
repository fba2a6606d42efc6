//! Card types — the unit of tracking.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type CardId = i64;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a card is in its lifecycle.
///
/// The variant names double as the strings persisted in the `status` column
/// and shown to users.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum CardStatus {
  #[default]
  Available,
  Out,
  Lost,
}

impl CardStatus {
  /// The exact string stored in the `cards.status` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Available => "Available",
      Self::Out => "Out",
      Self::Lost => "Lost",
    }
  }
}

impl std::fmt::Display for CardStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CardStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "available" => Ok(Self::Available),
      "out" => Ok(Self::Out),
      "lost" => Ok(Self::Lost),
      other => Err(Error::InvalidInput(format!("unknown status: {other:?}"))),
    }
  }
}

// ─── Card ────────────────────────────────────────────────────────────────────

/// A tracked access card, as currently persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  pub id:            CardId,
  /// Unique human-facing name, e.g. "Lab Visitor 4".
  pub label:         String,
  pub status:        CardStatus,
  /// Who has the card. Set while the card is out, and kept on a card lost
  /// while out so the last borrower stays visible.
  pub holder:        Option<String>,
  #[serde(default, with = "crate::time::stamp_opt")]
  pub signed_out_at: Option<NaiveDateTime>,
  /// Free-text note captured at sign-out.
  pub notes:         Option<String>,
  /// Four-digit printed code, unique when present.
  pub code:          Option<String>,
  /// Where the card lives when it is on the shelf.
  pub home_location: Option<String>,
}

impl Card {
  /// The context column shown in listings: the home location while the card
  /// is available, the sign-out note otherwise.
  pub fn display_notes(&self) -> Option<&str> {
    match self.status {
      CardStatus::Available => self.home_location.as_deref(),
      CardStatus::Out | CardStatus::Lost => self.notes.as_deref(),
    }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Validated input for creating or editing a card.
#[derive(Debug, Clone)]
pub struct NewCard {
  pub label:         String,
  pub code:          Option<String>,
  pub home_location: Option<String>,
}

impl NewCard {
  /// Validate and normalise raw user input.
  ///
  /// Labels are trimmed and must be non-empty. Codes must be exactly four
  /// ASCII digits. Blank optional fields become `None`.
  pub fn new(
    label: &str,
    code: Option<&str>,
    home_location: Option<&str>,
  ) -> Result<Self> {
    let label = label.trim();
    if label.is_empty() {
      return Err(Error::InvalidInput("label must not be empty".into()));
    }
    Ok(Self {
      label:         label.to_owned(),
      code:          validate_code(code)?,
      home_location: clean_text(home_location),
    })
  }
}

// ─── Input helpers ───────────────────────────────────────────────────────────

/// Trim free text, dropping it entirely when blank.
pub fn clean_text(text: Option<&str>) -> Option<String> {
  text
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
}

/// Validate the holder name supplied at sign-out.
pub fn clean_holder(holder: &str) -> Result<String> {
  let holder = holder.trim();
  if holder.is_empty() {
    return Err(Error::InvalidInput("holder name must not be empty".into()));
  }
  Ok(holder.to_owned())
}

fn validate_code(code: Option<&str>) -> Result<Option<String>> {
  let Some(code) = clean_text(code) else {
    return Ok(None);
  };
  if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::InvalidInput(format!(
      "code must be exactly four digits, got {code:?}"
    )));
  }
  Ok(Some(code))
}
