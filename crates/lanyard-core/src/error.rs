//! Error types for `lanyard-core`.

use thiserror::Error;

use crate::card::{CardId, CardStatus};

/// Which uniqueness rule a rejected write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
  Label,
  Code,
}

impl std::fmt::Display for DuplicateField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Label => "label",
      Self::Code => "code",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Caller-supplied text failed validation before reaching storage.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The card's current status does not permit the requested action.
  #[error("cannot {action} a card that is {status}")]
  InvalidTransition {
    action: &'static str,
    status: CardStatus,
  },

  #[error("card not found: {0}")]
  CardNotFound(CardId),

  /// A uniqueness rule was violated.
  #[error("a card with this {0} already exists")]
  Duplicate(DuplicateField),

  /// Another process held the database lock past the busy timeout.
  #[error("the card database is busy; try again")]
  Busy,

  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
