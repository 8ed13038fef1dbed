//! # Stash Core
//!
//! Error, result and outcome types shared by every Stash crate, plus the
//! tracing subscriber setup.

pub mod error;
pub mod outcome;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use outcome::*;
pub use result::*;
pub use telemetry::{init_tracing, LoggingConfig};

// Re-export shaku for dependency injection
pub use shaku::Interface;
