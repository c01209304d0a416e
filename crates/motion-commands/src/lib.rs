//! # Motion Commands
//!
//! Discord slash commands for MotionBot using the Poise framework.
//!
//! This crate owns the shared [`Data`] handed to every command and event, the
//! command list with its toggle check and error hook, and the runtime status
//! (command counter, connected guilds) that the dashboard reports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod confirm;
pub mod framework;
pub mod help;
pub mod ping;
pub mod status;
pub mod sticky;
pub mod wipe;

pub use framework::*;
pub use status::*;
