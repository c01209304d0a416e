//! # Motion Common
//!
//! Shared types, utilities, and common functionality for MotionBot.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace: Discord id newtypes, the shared error type, JSON document
//! persistence, logging setup and command error-log files.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod error_log;
pub mod json_file;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use error_log::*;
pub use json_file::*;
pub use logging::*;
pub use types::*;
pub use utils::*;
