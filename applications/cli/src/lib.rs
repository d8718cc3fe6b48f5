//! Cadence CLI Library
//!
//! Configuration loading, the stdin reader and the terminal main loop behind
//! the `cadence` binary. Exposed as a library for testing purposes.

pub mod config;
pub mod error;
pub mod input;
pub mod runtime;

pub use config::{CliConfig, Overrides, RuntimeSettings};
pub use error::{CliError, Result};
pub use runtime::Runtime;
