//! Domain types and rules for the hourbank time-banking ledger.
//!
//! This crate is pure: no I/O, no database, no HTTP. It holds the shared
//! type aliases, the domain error taxonomy, and the validation / state
//! machine rules that the persistence and API layers enforce.

pub mod error;
pub mod hours;
pub mod job;
pub mod moderation;
pub mod rate_limit;
pub mod roles;
pub mod settings;
pub mod types;
