//! Chat-platform boundary for the sitemap engine
//!
//! Defines the channel-tree and message data types plus the [`ChatApi`]
//! contract the reconciliation engine drives. Real platform clients
//! implement the trait outside this workspace; tests use the in-memory
//! implementation from `sitemap-test-utils`.

pub mod api;
pub mod error;
pub mod types;

pub use api::{ChatApi, MESSAGE_PAGE_SIZE};
pub use error::{Error, Result};
pub use types::{Channel, ChannelKind, Message};
