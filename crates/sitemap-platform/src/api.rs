//! API contract against the external chat platform

use async_trait::async_trait;

use crate::Result;
use crate::types::{Channel, Message};

/// Number of messages fetched (and bulk-deleted) per pagination call.
pub const MESSAGE_PAGE_SIZE: usize = 100;

/// Operations the sitemap engine needs from the chat platform.
///
/// Covers the channel store (tree CRUD) and the message store of one
/// scope. Every call is a single request/response; pagination is driven
/// by the caller through [`ChatApi::messages_before`].
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// List every channel in the scope, containers and leaves alike.
    async fn list_channels(&self, scope_id: &str) -> Result<Vec<Channel>>;

    /// Create a leaf channel under `parent_id` at `position`.
    async fn create_channel(
        &self,
        scope_id: &str,
        name: &str,
        parent_id: &str,
        position: i64,
    ) -> Result<Channel>;

    /// Change only the ordinal position of a channel.
    async fn set_position(&self, channel_id: &str, position: i64) -> Result<()>;

    /// Delete a channel and everything in it.
    async fn delete_channel(&self, channel_id: &str) -> Result<()>;

    /// The newest message in a channel, if the channel has any.
    async fn latest_message(&self, channel_id: &str) -> Result<Option<Message>>;

    /// Up to `limit` messages strictly older than `before_id`, newest
    /// first; all of the newest when `before_id` is `None`. A short page
    /// signals the last page.
    async fn messages_before(
        &self,
        channel_id: &str,
        limit: usize,
        before_id: Option<&str>,
    ) -> Result<Vec<Message>>;

    /// Delete several messages of one channel in a single call.
    async fn bulk_delete(&self, channel_id: &str, message_ids: &[String]) -> Result<()>;

    /// Append a message to a channel.
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<Message>;

    /// Delete a single message.
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()>;
}
