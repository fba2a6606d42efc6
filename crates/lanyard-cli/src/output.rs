//! Table and CSV rendering for listings.

use std::io::Write;

use colored::Colorize;
use lanyard_core::{
  card::{Card, CardStatus},
  history::HistoryRecord,
  time::format_stamp,
};

const DASH: &str = "-";

// ─── Tables ───────────────────────────────────────────────────────────────────

pub fn print_cards(cards: &[Card]) {
  println!(
    "{:>4}  {:<20}  {:<9}  {:<6}  {:<20}  {:<16}  {}",
    "ID", "LABEL", "STATUS", "CODE", "HOLDER", "SIGNED OUT", "NOTES / LOCATION"
  );
  for card in cards {
    let signed = card.signed_out_at.map(format_stamp);
    println!(
      "{:>4}  {:<20}  {}  {:<6}  {:<20}  {:<16}  {}",
      card.id,
      card.label,
      paint_status(card.status),
      card.code.as_deref().unwrap_or(DASH),
      card.holder.as_deref().unwrap_or(DASH),
      signed.as_deref().unwrap_or(DASH),
      card.display_notes().unwrap_or(DASH),
    );
  }
}

pub fn print_history(records: &[HistoryRecord]) {
  println!(
    "{:<20}  {:<20}  {:<16}  {:<16}  {}",
    "LABEL", "HOLDER", "SIGNED OUT", "RETURNED", "NOTES"
  );
  for record in records {
    let returned = match record.returned_at {
      Some(at) => format!("{:<16}", format_stamp(at)),
      None => format!("{:<16}", "open").yellow().to_string(),
    };
    println!(
      "{:<20}  {:<20}  {:<16}  {}  {}",
      record.card_label,
      record.holder,
      format_stamp(record.signed_out_at),
      returned,
      record.notes.as_deref().unwrap_or(DASH),
    );
  }
}

/// Pad before colouring; ANSI escapes would throw the column widths off.
fn paint_status(status: CardStatus) -> String {
  let padded = format!("{:<9}", status.as_str());
  match status {
    CardStatus::Available => padded,
    CardStatus::Out => padded.yellow().to_string(),
    CardStatus::Lost => padded.red().to_string(),
  }
}

// ─── CSV ──────────────────────────────────────────────────────────────────────

/// Write history records as CSV. Open records get an empty `returned_at`.
pub fn write_history_csv<W: Write>(
  writer: W,
  records: &[HistoryRecord],
) -> csv::Result<()> {
  let mut w = csv::Writer::from_writer(writer);
  w.write_record(["card_label", "holder", "signed_out_at", "returned_at", "notes"])?;
  for record in records {
    let signed = format_stamp(record.signed_out_at);
    let returned = record.returned_at.map(format_stamp).unwrap_or_default();
    w.write_record([
      record.card_label.as_str(),
      record.holder.as_str(),
      signed.as_str(),
      returned.as_str(),
      record.notes.as_deref().unwrap_or(""),
    ])?;
  }
  w.flush()?;
  Ok(())
}
