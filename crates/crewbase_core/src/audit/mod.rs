//! Activity feed recording for staffing changes.
//!
//! # Responsibility
//! - Derive human-readable feed sentences from project response changes.
//! - Append feed rows inside the caller's transaction so the mutation and
//!   its feed entry commit or roll back together.
//!
//! # Invariants
//! - Recording never fails a staffing write for a missing user/project
//!   reference; those cases skip with a warning instead.
//!
//! # See also
//! - docs/architecture/data-model.md

mod recorder;

pub use recorder::{record_response_change, response_action, ResponseChange};
