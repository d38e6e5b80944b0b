//! `SQLite` storage for `LetsMeet`.
//!
//! Provides persistence for events, users, availability intervals, and the
//! per-user refresh token slot.

mod db;
mod models;
mod queries;
mod sessions;
mod tx;

#[cfg(test)]
mod tests;

pub use db::{DatabaseError, EventDatabase};
pub use models::*;
pub use tx::EventTx;
