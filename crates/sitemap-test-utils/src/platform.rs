//! In-memory [`ChatApi`] implementation with call accounting

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use sitemap_platform::{Channel, ChannelKind, ChatApi, Error, Message, Result};

/// Per-method call counters, for asserting API traffic in tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_channels: usize,
    pub create_channel: usize,
    pub set_position: usize,
    pub delete_channel: usize,
    pub latest_message: usize,
    pub messages_before: usize,
    pub bulk_delete: usize,
    pub send_message: usize,
    pub delete_message: usize,
}

impl CallCounts {
    /// Total number of mutating calls.
    pub fn writes(&self) -> usize {
        self.create_channel
            + self.set_position
            + self.delete_channel
            + self.bulk_delete
            + self.send_message
            + self.delete_message
    }

    /// Total number of calls of any kind.
    pub fn total(&self) -> usize {
        self.writes() + self.list_channels + self.latest_message + self.messages_before
    }
}

#[derive(Default)]
struct State {
    channels: Vec<Channel>,
    /// Channel id to messages, oldest first
    messages: HashMap<String, Vec<Message>>,
    counts: CallCounts,
    fail_creates: bool,
}

/// In-memory chat platform backed by plain vectors.
///
/// Ids are sequential numeric strings. Thread-safe; share via `Arc`.
/// Seed helpers mutate state directly and are invisible to the call
/// counters, so tests can distinguish their own setup from engine
/// traffic.
#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(100),
        }
    }

    fn alloc_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("platform state poisoned")
    }

    /// Seed a category container. Returns its id.
    pub fn add_category(&self, name: &str, position: i64) -> String {
        let id = self.alloc_id();
        self.lock().channels.push(Channel {
            id: id.clone(),
            name: name.to_string(),
            topic: None,
            parent_id: None,
            position,
            kind: ChannelKind::Category,
        });
        id
    }

    /// Seed a text channel under `parent`. Returns its id.
    pub fn add_text(&self, parent: &str, name: &str, topic: Option<&str>, position: i64) -> String {
        let id = self.alloc_id();
        self.lock().channels.push(Channel {
            id: id.clone(),
            name: name.to_string(),
            topic: topic.map(str::to_string),
            parent_id: Some(parent.to_string()),
            position,
            kind: ChannelKind::Text,
        });
        id
    }

    /// Seed a message without touching the counters.
    pub fn seed_message(&self, channel_id: &str, content: &str) -> String {
        let id = self.alloc_id();
        self.lock()
            .messages
            .entry(channel_id.to_string())
            .or_default()
            .push(Message {
                id: id.clone(),
                content: content.to_string(),
            });
        id
    }

    /// Change a channel's topic in place.
    pub fn set_topic(&self, id: &str, topic: Option<&str>) {
        if let Some(ch) = self.lock().channels.iter_mut().find(|c| c.id == id) {
            ch.topic = topic.map(str::to_string);
        }
    }

    /// Rename a channel in place.
    pub fn rename(&self, id: &str, name: &str) {
        if let Some(ch) = self.lock().channels.iter_mut().find(|c| c.id == id) {
            ch.name = name.to_string();
        }
    }

    /// Reposition a channel in place, as if an operator dragged it.
    pub fn set_channel_position(&self, id: &str, position: i64) {
        if let Some(ch) = self.lock().channels.iter_mut().find(|c| c.id == id) {
            ch.position = position;
        }
    }

    /// Remove a channel and its messages, as if deleted externally.
    pub fn remove(&self, id: &str) {
        let mut state = self.lock();
        state.channels.retain(|c| c.id != id);
        state.messages.remove(id);
    }

    /// Make every subsequent `create_channel` call fail.
    pub fn fail_creates(&self, fail: bool) {
        self.lock().fail_creates = fail;
    }

    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.lock().channels.iter().find(|c| c.id == id).cloned()
    }

    /// Children of `parent`, sorted by position.
    pub fn children_of(&self, parent: &str) -> Vec<Channel> {
        let mut children: Vec<Channel> = self
            .lock()
            .channels
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.position);
        children
    }

    pub fn latest_content(&self, channel_id: &str) -> Option<String> {
        self.lock()
            .messages
            .get(channel_id)
            .and_then(|m| m.last())
            .map(|m| m.content.clone())
    }

    pub fn latest_message_id(&self, channel_id: &str) -> Option<String> {
        self.lock()
            .messages
            .get(channel_id)
            .and_then(|m| m.last())
            .map(|m| m.id.clone())
    }

    pub fn message_count(&self, channel_id: &str) -> usize {
        self.lock()
            .messages
            .get(channel_id)
            .map_or(0, |m| m.len())
    }

    pub fn counts(&self) -> CallCounts {
        self.lock().counts
    }

    pub fn reset_counts(&self) {
        self.lock().counts = CallCounts::default();
    }
}

#[async_trait]
impl ChatApi for MemoryPlatform {
    async fn list_channels(&self, _scope_id: &str) -> Result<Vec<Channel>> {
        let mut state = self.lock();
        state.counts.list_channels += 1;
        Ok(state.channels.clone())
    }

    async fn create_channel(
        &self,
        _scope_id: &str,
        name: &str,
        parent_id: &str,
        position: i64,
    ) -> Result<Channel> {
        let id = self.alloc_id();
        let mut state = self.lock();
        state.counts.create_channel += 1;
        if state.fail_creates {
            return Err(Error::Rejected {
                reason: "create disabled by test".to_string(),
            });
        }
        let channel = Channel {
            id,
            name: name.to_string(),
            topic: None,
            parent_id: Some(parent_id.to_string()),
            position,
            kind: ChannelKind::Text,
        };
        state.channels.push(channel.clone());
        Ok(channel)
    }

    async fn set_position(&self, channel_id: &str, position: i64) -> Result<()> {
        let mut state = self.lock();
        state.counts.set_position += 1;
        match state.channels.iter_mut().find(|c| c.id == channel_id) {
            Some(ch) => {
                ch.position = position;
                Ok(())
            }
            None => Err(Error::ChannelNotFound {
                id: channel_id.to_string(),
            }),
        }
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.counts.delete_channel += 1;
        let before = state.channels.len();
        state.channels.retain(|c| c.id != channel_id);
        if state.channels.len() == before {
            return Err(Error::ChannelNotFound {
                id: channel_id.to_string(),
            });
        }
        state.messages.remove(channel_id);
        Ok(())
    }

    async fn latest_message(&self, channel_id: &str) -> Result<Option<Message>> {
        let mut state = self.lock();
        state.counts.latest_message += 1;
        Ok(state
            .messages
            .get(channel_id)
            .and_then(|m| m.last())
            .cloned())
    }

    async fn messages_before(
        &self,
        channel_id: &str,
        limit: usize,
        before_id: Option<&str>,
    ) -> Result<Vec<Message>> {
        let mut state = self.lock();
        state.counts.messages_before += 1;
        let Some(messages) = state.messages.get(channel_id) else {
            return Ok(Vec::new());
        };
        let cutoff = match before_id {
            Some(before) => match messages.iter().position(|m| m.id == before) {
                Some(i) => i,
                None => {
                    return Err(Error::MessageNotFound {
                        id: before.to_string(),
                    });
                }
            },
            None => messages.len(),
        };
        Ok(messages[..cutoff].iter().rev().take(limit).cloned().collect())
    }

    async fn bulk_delete(&self, channel_id: &str, message_ids: &[String]) -> Result<()> {
        let mut state = self.lock();
        state.counts.bulk_delete += 1;
        if let Some(messages) = state.messages.get_mut(channel_id) {
            messages.retain(|m| !message_ids.contains(&m.id));
        }
        Ok(())
    }

    async fn send_message(&self, channel_id: &str, content: &str) -> Result<Message> {
        let id = self.alloc_id();
        let mut state = self.lock();
        state.counts.send_message += 1;
        if !state.channels.iter().any(|c| c.id == channel_id) {
            return Err(Error::ChannelNotFound {
                id: channel_id.to_string(),
            });
        }
        let message = Message {
            id,
            content: content.to_string(),
        };
        state
            .messages
            .entry(channel_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.counts.delete_message += 1;
        let Some(messages) = state.messages.get_mut(channel_id) else {
            return Err(Error::MessageNotFound {
                id: message_id.to_string(),
            });
        };
        let before = messages.len();
        messages.retain(|m| m.id != message_id);
        if messages.len() == before {
            return Err(Error::MessageNotFound {
                id: message_id.to_string(),
            });
        }
        Ok(())
    }
}
