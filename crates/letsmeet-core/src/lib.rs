//! `LetsMeet` Core Library
//!
//! Shared functionality for `LetsMeet` components:
//! - Human-readable public identifiers for events
//! - The `Interval` availability value type
//! - Configuration resolution and validation
//! - `SQLite` pool helpers and common error types

pub mod config;
pub mod db;
pub mod error;
pub mod ident;
pub mod interval;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use ident::IdentifierGenerator;
pub use interval::Interval;
