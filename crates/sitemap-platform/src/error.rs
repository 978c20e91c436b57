//! Error types for sitemap-platform

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by chat-platform implementations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Channel does not exist (deleted, or never created)
    #[error("channel not found: {id}")]
    ChannelNotFound { id: String },

    /// Message does not exist in the addressed channel
    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    /// The platform rejected the request
    #[error("request rejected: {reason}")]
    Rejected { reason: String },

    /// Transport-level failure talking to the platform
    #[error("transport error: {0}")]
    Transport(String),
}
