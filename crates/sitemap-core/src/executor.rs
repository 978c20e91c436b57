//! Action execution
//!
//! Applies a planned action list against the platform, best-effort: a
//! failed action is logged and counted, never propagated, and the rest
//! of the queue still runs. The next pass repairs whatever was left
//! behind.

use sitemap_platform::{ChatApi, MESSAGE_PAGE_SIZE};

use crate::config::SitemapConfig;
use crate::content;
use crate::plan::Action;

/// Outcome counts for one executed action list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Entries created (channel plus body)
    pub created: usize,
    /// Entry bodies actually re-sent
    pub refreshed: usize,
    /// Refreshes suppressed because the fingerprint already matched
    pub skipped: usize,
    /// Entries repositioned
    pub moved: usize,
    /// Entries deleted
    pub deleted: usize,
    /// Actions abandoned on a platform error
    pub failed: usize,
}

impl ExecutionReport {
    /// Whether the pass changed anything on the platform.
    pub fn is_noop(&self) -> bool {
        self.created == 0
            && self.refreshed == 0
            && self.moved == 0
            && self.deleted == 0
            && self.failed == 0
    }
}

/// Applies planned actions against the platform
pub struct ActionExecutor<'a> {
    api: &'a dyn ChatApi,
    config: &'a SitemapConfig,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(api: &'a dyn ChatApi, config: &'a SitemapConfig) -> Self {
        Self { api, config }
    }

    /// Apply every action in planner order.
    pub async fn apply_all(&self, actions: Vec<Action>) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for action in actions {
            self.apply(&action, &mut report).await;
        }
        report
    }

    async fn apply(&self, action: &Action, report: &mut ExecutionReport) {
        match action {
            Action::Create {
                name,
                content,
                position,
            } => {
                let channel = match self
                    .api
                    .create_channel(&self.config.scope_id, name, &self.config.index_root_id, *position)
                    .await
                {
                    Ok(channel) => channel,
                    Err(e) => {
                        tracing::error!(%name, error = %e, "failed to create index channel");
                        report.failed += 1;
                        return;
                    }
                };
                if let Err(e) = self.api.send_message(&channel.id, content).await {
                    tracing::error!(channel = %channel.id, error = %e, "failed to send index body");
                    report.failed += 1;
                    return;
                }
                report.created += 1;
            }
            Action::Delete { id } => match self.api.delete_channel(id).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::error!(channel = %id, error = %e, "failed to delete index channel");
                    report.failed += 1;
                }
            },
            Action::Move { id, position } => match self.api.set_position(id, *position).await {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    tracing::error!(channel = %id, error = %e, "failed to move index channel");
                    report.failed += 1;
                }
            },
            Action::RefreshMessage { id, content, .. } => {
                self.refresh(id, content, report).await;
            }
        }
    }

    /// Bring a channel's body up to date without rewriting it when the
    /// fingerprint already matches.
    async fn refresh(&self, id: &str, content: &str, report: &mut ExecutionReport) {
        let latest = match self.api.latest_message(id).await {
            Ok(latest) => latest,
            Err(e) => {
                tracing::error!(channel = %id, error = %e, "failed to fetch latest index body");
                report.failed += 1;
                return;
            }
        };

        // Clear the backlog behind the newest message first, so the
        // channel never shows two bodies at once.
        if let Some(latest) = &latest {
            loop {
                let page = match self
                    .api
                    .messages_before(id, MESSAGE_PAGE_SIZE, Some(&latest.id))
                    .await
                {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!(channel = %id, error = %e, "failed to page old index bodies");
                        break;
                    }
                };
                if page.is_empty() {
                    break;
                }
                let ids: Vec<String> = page.iter().map(|m| m.id.clone()).collect();
                if let Err(e) = self.api.bulk_delete(id, &ids).await {
                    tracing::warn!(channel = %id, error = %e, "failed to bulk-delete old index bodies");
                    break;
                }
                if page.len() < MESSAGE_PAGE_SIZE {
                    break;
                }
            }
        }

        match &latest {
            Some(message) if content::same_fingerprint(&message.content, content) => {
                report.skipped += 1;
                return;
            }
            Some(message) => {
                if let Err(e) = self.api.delete_message(id, &message.id).await {
                    tracing::warn!(channel = %id, error = %e, "failed to delete stale index body");
                }
            }
            None => {}
        }

        match self.api.send_message(id, content).await {
            Ok(_) => report.refreshed += 1,
            Err(e) => {
                tracing::error!(channel = %id, error = %e, "failed to send index body");
                report.failed += 1;
            }
        }
    }
}
