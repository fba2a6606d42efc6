//! Minute-precision local timestamps.
//!
//! Every timestamp the tracker stores or displays uses the same plain
//! `YYYY-MM-DD HH:MM` wall-clock format, so the database file reads the same
//! in a SQLite browser, a terminal listing, and a CSV export.

use chrono::{Local, NaiveDateTime, Timelike};

use crate::{Error, Result};

/// Format for every timestamp stored or displayed by the tracker.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The current local time, truncated to the minute.
///
/// Truncating at creation keeps values equal across a round-trip through
/// storage; seconds would be silently dropped by the stamp format anyway.
pub fn now_stamp() -> NaiveDateTime {
  let now = Local::now().naive_local();
  now
    .with_second(0)
    .and_then(|dt| dt.with_nanosecond(0))
    .unwrap_or(now)
}

pub fn format_stamp(dt: NaiveDateTime) -> String {
  dt.format(STAMP_FORMAT).to_string()
}

/// Parse a stored stamp. Failure means the column was edited behind the
/// tracker's back, so it surfaces as a storage error.
pub fn parse_stamp(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, STAMP_FORMAT)
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

// ─── Serde adapters ──────────────────────────────────────────────────────────

/// Serde adapter keeping a `NaiveDateTime` field in the stamp format.
pub mod stamp {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer};

  use super::{STAMP_FORMAT, format_stamp};

  pub fn serialize<S: Serializer>(
    value: &NaiveDateTime,
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&format_stamp(*value))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(de)?;
    NaiveDateTime::parse_from_str(&raw, STAMP_FORMAT)
      .map_err(serde::de::Error::custom)
  }
}

/// [`stamp`], but for optional fields.
pub mod stamp_opt {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer};

  use super::{STAMP_FORMAT, format_stamp};

  pub fn serialize<S: Serializer>(
    value: &Option<NaiveDateTime>,
    ser: S,
  ) -> Result<S::Ok, S::Error> {
    match value {
      Some(dt) => ser.serialize_some(&format_stamp(*dt)),
      None => ser.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    de: D,
  ) -> Result<Option<NaiveDateTime>, D::Error> {
    let raw: Option<String> = Option::deserialize(de)?;
    raw
      .map(|s| NaiveDateTime::parse_from_str(&s, STAMP_FORMAT))
      .transpose()
      .map_err(serde::de::Error::custom)
  }
}
