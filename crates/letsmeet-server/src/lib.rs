//! `LetsMeet` Server Library
//!
//! Core functionality for the `LetsMeet` scheduling service:
//! - `SQLite` storage for events, participants, availability, and sessions
//! - JWT access/refresh tokens and argon2 password hashing
//! - Transactional event creation and participant registration
//! - Login, refresh-token rotation, logout, and edit authorization

pub mod auth;
pub mod error;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
