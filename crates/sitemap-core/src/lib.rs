//! Reconciliation engine for an auto-generated channel-tree index
//!
//! Maintains one read-only index entry per non-empty category of a chat
//! platform's channel tree and keeps those entries synchronized as the
//! tree changes:
//!
//! - **Debouncer**: bursts of change notifications coalesce into a
//!   single pass after a quiet window ([`SitemapManager::notify`])
//! - **Snapshot & diff**: desired entries are derived from one tree
//!   fetch and diffed against the materialized index ([`snapshot`],
//!   [`plan`])
//! - **Position reconciler**: minimal-move reordering via longest
//!   increasing subsequence ([`positions`])
//! - **Executor**: idempotent create/refresh/move/delete against the
//!   platform ([`executor`])
//!
//! The platform itself stays behind [`sitemap_platform::ChatApi`]; this
//! crate never talks to a network directly.

pub mod config;
pub mod content;
pub mod error;
pub mod executor;
pub mod manager;
pub mod naming;
pub mod plan;
pub mod positions;
pub mod snapshot;

pub use config::{NamingOverrides, SitemapConfig};
pub use error::{Error, Result};
pub use executor::{ActionExecutor, ExecutionReport};
pub use manager::{Notification, SitemapManager};
pub use plan::Action;
pub use snapshot::{DesiredEntry, Snapshot};
