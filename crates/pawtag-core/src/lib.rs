//! PawTag Core — Domain models, error taxonomy, and repository traits.
//!
//! These are the core types shared across all crates. The crate has no
//! I/O of its own; persistence lives behind the traits in [`repository`].

pub mod error;
pub mod models;
pub mod repository;

pub use error::{PawtagError, PawtagResult};
