//! The `CardStore` trait — the operation surface of the tracker.
//!
//! The trait is implemented by storage backends (e.g. `lanyard-store-sqlite`).
//! The CLI depends on this abstraction, not on any concrete backend.

use crate::{
  Result,
  card::{Card, CardId, NewCard},
  history::HistoryRecord,
  query::{CardFilter, HistoryFilter},
};

/// Abstraction over a card tracker backend.
///
/// Write operations take `&mut self`: each mutation is a single atomic
/// transaction, and the exclusive borrow keeps one process's writes ordered.
/// Ordering across processes is the backend's job.
pub trait CardStore {
  // ── Catalog ───────────────────────────────────────────────────────────

  /// Create a card in the Available state.
  fn add_card(&mut self, input: NewCard) -> Result<Card>;

  /// Replace a card's label, code and home location.
  ///
  /// Renames carry the card's history along: every record bearing the old
  /// label is relabelled in the same transaction.
  fn edit_card(&mut self, id: CardId, input: NewCard) -> Result<Card>;

  /// Delete a card. Its history records are kept.
  ///
  /// Fails while the card is out; take it back (or mark it lost) first.
  fn remove_card(&mut self, id: CardId) -> Result<()>;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Available → Out. Opens a history record.
  fn sign_out(
    &mut self,
    id: CardId,
    holder: &str,
    notes: Option<&str>,
  ) -> Result<Card>;

  /// Out → Available. Clears the sign-out fields and closes the card's
  /// open history record.
  fn return_card(&mut self, id: CardId) -> Result<Card>;

  /// Available or Out → Lost. A card lost while out keeps its holder and
  /// sign-out stamp, and its history record stays open. Marking an
  /// already-lost card succeeds without touching anything.
  fn mark_lost(&mut self, id: CardId) -> Result<Card>;

  /// Lost → Available. Clears the sign-out fields and closes any history
  /// record the loss left open.
  fn mark_found(&mut self, id: CardId) -> Result<Card>;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch one card. Returns `None` for an unknown id.
  fn get_card(&self, id: CardId) -> Result<Option<Card>>;

  /// All cards matching `filter`, in natural label order.
  fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>>;

  /// History records matching `filter`, newest first.
  fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>>;

  // ── Bootstrap ─────────────────────────────────────────────────────────

  /// True until the first card is created.
  fn is_first_run(&self) -> Result<bool>;

  /// Insert the preset catalog, skipping entries whose label or code is
  /// already taken. Returns how many cards were actually inserted.
  fn seed_defaults(&mut self) -> Result<usize>;
}
