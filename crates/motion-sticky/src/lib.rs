//! # Motion Sticky
//!
//! Sticky messages: a bot-maintained message kept at the bottom of a channel
//! by deleting and re-posting it after new activity.
//!
//! - [`StickyStore`] persists one [`StickyRecord`] per (guild, channel).
//! - [`ChannelLockTable`] allows one re-post sequence per channel at a time.
//! - [`StickyEngine`] drives the delete, render, publish, save-pointer
//!   sequence against a [`MessageGateway`] and serves the administrative
//!   create and delete operations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod lock;
pub mod record;
pub mod store;
pub mod traits;

pub use engine::{ActivityOutcome, StickyEngine, MAX_CONTENT_CHARS};
pub use error::{GatewayError, StickyError, StoreError};
pub use lock::{ChannelLease, ChannelLockTable};
pub use record::{StickyDocument, StickyRecord};
pub use store::StickyStore;
pub use traits::{MessageGateway, RenderedSticky, ThemeSource};
