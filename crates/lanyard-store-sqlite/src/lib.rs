//! SQLite backend for the lanyard card tracker.
//!
//! A single database file, safe to share between processes: WAL keeps
//! readers off the writers' lock, and every mutation runs inside one
//! immediate transaction. Two terminals on the front desk machine can
//! point at the same file.

mod encode;
mod schema;
mod store;

pub use lanyard_core::{Error, Result};
pub use store::{DEFAULT_BUSY_TIMEOUT, SqliteStore};

#[cfg(test)]
mod tests;
