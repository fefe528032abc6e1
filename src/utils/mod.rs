//! Utility modules
//!
//! Error types shared by every layer of the crate.

pub mod error;

pub use error::{TutorError, TutorResult};
