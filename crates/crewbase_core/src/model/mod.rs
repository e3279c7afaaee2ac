//! Domain model for the consultancy staffing tracker.
//!
//! # Responsibility
//! - Define the canonical records used by repositories and services.
//! - Keep enum storage codecs out of here; repositories own column encoding.
//!
//! # Invariants
//! - Every persisted record is identified by an `i64` rowid alias.
//! - Timestamps are Unix epoch milliseconds.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod activity;
pub mod crm;
pub mod experience;
pub mod org;
pub mod project;
pub mod tag;
pub mod user;
