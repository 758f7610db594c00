//! Domain models for PawTag.
//!
//! These are the core types shared across all crates.

pub mod pet;
pub mod scan_event;
pub mod tag;
