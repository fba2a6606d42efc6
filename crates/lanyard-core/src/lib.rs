//! Core types and trait definitions for the lanyard card tracker.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! All other crates depend on it; it depends on nothing heavier than chrono.

pub mod card;
pub mod error;
pub mod history;
pub mod query;
pub mod seed;
pub mod store;
pub mod time;

pub use error::{Error, Result};
