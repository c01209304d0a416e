//! # Motion Config
//!
//! Configuration management for MotionBot.
//!
//! This crate loads the application configuration from YAML, `.env` and the
//! process environment, and owns the small JSON documents operators edit at
//! runtime: the theme and the command toggles. It also rewrites `.env` for the
//! dashboard.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod env_file;
pub mod loader;
pub mod schema;
pub mod theme;
pub mod toggles;
pub mod validator;

pub use cache::*;
pub use env_file::*;
pub use loader::*;
pub use schema::*;
pub use theme::*;
pub use toggles::*;
pub use validator::*;
