//! # Motion Bot
//!
//! Discord community bot keeping sticky messages at the bottom of channels,
//! with command toggles, theming, localization and a web dashboard.
//!
//! This is the main binary crate that wires the other crates together: it
//! owns the Discord gateway adapter, the event handler, the keep-alive pinger
//! and the dashboard REST API.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod gateway;
pub mod keep_alive;
pub mod state;

pub use bot::*;
pub use dashboard::*;
pub use error::*;
pub use gateway::*;
pub use keep_alive::*;
pub use state::*;
