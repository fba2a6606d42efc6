//! Query parameter types and the natural label ordering.

use std::cmp::Ordering;

use crate::card::CardStatus;

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Parameters for [`list_cards`](crate::store::CardStore::list_cards).
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
  /// Case-insensitive substring match over label, holder, notes, code and
  /// home location.
  pub search: Option<String>,
  /// Restrict to exactly one status.
  pub status: Option<CardStatus>,
}

/// Parameters for [`list_history`](crate::store::CardStore::list_history).
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
  /// Case-insensitive substring match over the card label.
  pub card:   Option<String>,
  /// Case-insensitive substring match over the holder name.
  pub holder: Option<String>,
}

// ─── Natural label order ─────────────────────────────────────────────────────

/// Sort key for card labels: the lowercased prefix plus the numeric value of
/// a trailing digit run, so "Visitor 2" sorts before "Visitor 10".
///
/// Labels without a numeric suffix get `None`, which sorts after every
/// number under the same prefix.
pub fn natural_key(label: &str) -> (String, Option<u64>) {
  let start = label
    .char_indices()
    .rev()
    .take_while(|(_, c)| c.is_ascii_digit())
    .last()
    .map(|(i, _)| i);

  if let Some(start) = start
    && let Ok(n) = label[start..].parse::<u64>()
  {
    return (label[..start].trim().to_lowercase(), Some(n));
  }
  (label.to_lowercase(), None)
}

pub fn natural_label_cmp(a: &str, b: &str) -> Ordering {
  let (a_prefix, a_num) = natural_key(a);
  let (b_prefix, b_num) = natural_key(b);
  a_prefix.cmp(&b_prefix).then_with(|| match (a_num, b_num) {
    (Some(x), Some(y)) => x.cmp(&y),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  })
}
