//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep request-handler layers decoupled from storage details.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod directory;
pub mod hierarchy;
pub mod profile;
pub mod staffing;
pub mod tags;
