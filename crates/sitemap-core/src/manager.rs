//! Sitemap manager: debounced event intake and pass orchestration
//!
//! Platform events arrive in bursts; a category reshuffle fires one
//! notification per touched channel. The manager coalesces a burst into
//! a single reconciliation pass that runs after a quiet window, and
//! carries the two caches that make incremental passes cheap: the ids
//! of the materialized entries (feedback-loop suppression) and the
//! id→entry-name association (relatedness filtering).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use sitemap_platform::ChatApi;

use crate::config::SitemapConfig;
use crate::executor::{ActionExecutor, ExecutionReport};
use crate::plan;
use crate::snapshot::{self, Snapshot};
use crate::Result;

/// A change notification from the platform's event stream
#[derive(Debug, Clone)]
pub enum Notification {
    /// Re-derive every entry
    Full,
    /// Only these channel ids changed
    Changed(HashSet<String>),
}

/// Accumulated notifications awaiting the quiet window
enum PendingBatch {
    Full,
    Ids(HashSet<String>),
}

impl PendingBatch {
    fn empty() -> Self {
        PendingBatch::Ids(HashSet::new())
    }

    fn merge(&mut self, notification: Notification) {
        match notification {
            // A full pass supersedes any accumulated partials.
            Notification::Full => *self = PendingBatch::Full,
            Notification::Changed(ids) => match self {
                PendingBatch::Full => {}
                PendingBatch::Ids(set) => set.extend(ids),
            },
        }
    }

    /// Hand-off form: `None` means a full pass. An empty id set also
    /// means full, since no specific targets is "do everything".
    fn into_targets(self) -> Option<HashSet<String>> {
        match self {
            PendingBatch::Full => None,
            PendingBatch::Ids(ids) if ids.is_empty() => None,
            PendingBatch::Ids(ids) => Some(ids),
        }
    }
}

struct Debounce {
    batch: PendingBatch,
    timer: Option<JoinHandle<()>>,
}

/// State carried from one pass to the next
#[derive(Default)]
struct PassCache {
    /// Ids of the entries materialized under the index root
    entry_ids: HashSet<String>,
    /// Channel id to owning entry name, rebuilt fully each pass
    related_names: HashMap<String, String>,
}

/// Keeps the generated index in sync with the channel tree.
///
/// Cheap to clone; all state lives behind one `Arc`. Notifications may
/// arrive from any task; passes run on the runtime that received the
/// notification.
#[derive(Clone)]
pub struct SitemapManager {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn ChatApi>,
    config: SitemapConfig,
    debounce: Mutex<Debounce>,
    cache: Mutex<PassCache>,
}

impl SitemapManager {
    pub fn new(api: Arc<dyn ChatApi>, config: SitemapConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                debounce: Mutex::new(Debounce {
                    batch: PendingBatch::empty(),
                    timer: None,
                }),
                cache: Mutex::new(PassCache::default()),
            }),
        }
    }

    /// Record a change notification and (re-)arm the quiet-window
    /// timer. When the window elapses without further notifications,
    /// one reconciliation pass runs with everything accumulated.
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify(&self, notification: Notification) {
        let mut debounce = self.inner.debounce.lock().expect("debounce lock poisoned");
        debounce.batch.merge(notification);

        if let Some(timer) = debounce.timer.take() {
            timer.abort();
        }
        let inner = Arc::clone(&self.inner);
        debounce.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.config.quiet_window()).await;
            let batch = {
                let mut debounce = inner.debounce.lock().expect("debounce lock poisoned");
                debounce.timer = None;
                std::mem::replace(&mut debounce.batch, PendingBatch::empty())
            };
            match inner.reconcile(batch.into_targets()).await {
                Ok(report) => {
                    tracing::debug!(?report, "debounced reconciliation pass finished");
                }
                Err(e) => {
                    tracing::error!(error = %e, "reconciliation pass failed");
                }
            }
        }));
    }

    /// A channel appeared in the scope.
    pub fn channel_created(&self, id: &str) {
        self.notify(Notification::Changed(HashSet::from([id.to_string()])));
    }

    /// A channel's name, topic, position or parent changed.
    pub fn channel_updated(&self, id: &str) {
        self.notify(Notification::Changed(HashSet::from([id.to_string()])));
    }

    /// A channel disappeared from the scope.
    pub fn channel_deleted(&self, id: &str) {
        self.notify(Notification::Changed(HashSet::from([id.to_string()])));
    }

    /// The scope became available.
    pub fn scope_joined(&self) {
        self.notify(Notification::Full);
    }

    /// Scope-level settings changed.
    pub fn scope_updated(&self) {
        self.notify(Notification::Full);
    }

    /// Entry point for the external scheduled refresh.
    pub fn refresh_now(&self) {
        self.notify(Notification::Full);
    }

    /// Run one reconciliation pass immediately, outside the debounce
    /// window. `None` reconciles everything.
    pub async fn run_pass(&self, targets: Option<HashSet<String>>) -> Result<ExecutionReport> {
        self.inner.reconcile(targets).await
    }

    /// The entry name a channel id is currently associated with, if the
    /// last pass saw it inside an indexed group.
    pub fn related_entry_name(&self, channel_id: &str) -> Option<String> {
        let cache = self.inner.cache.lock().expect("cache lock poisoned");
        cache.related_names.get(channel_id).cloned()
    }
}

impl Inner {
    /// Whether every changed id is the index root or one of our own
    /// entries. Writes this engine makes land under the index root;
    /// reacting to them would loop forever.
    fn only_index_channels(&self, targets: &HashSet<String>) -> bool {
        if targets.is_empty() {
            return false;
        }
        let cache = self.cache.lock().expect("cache lock poisoned");
        targets
            .iter()
            .all(|id| *id == self.config.index_root_id || cache.entry_ids.contains(id))
    }

    async fn reconcile(&self, targets: Option<HashSet<String>>) -> Result<ExecutionReport> {
        if let Some(targets) = &targets {
            if self.only_index_channels(targets) {
                tracing::debug!("change confined to the index itself, nothing to do");
                return Ok(ExecutionReport::default());
            }
        }

        let channels = self.api.list_channels(&self.config.scope_id).await?;
        let partition = snapshot::partition(&self.config, &channels)?;

        {
            let mut cache = self.cache.lock().expect("cache lock poisoned");
            cache.entry_ids = partition.existing.iter().map(|c| c.id.clone()).collect();
        }
        // The fetch may have revealed that the changed ids are index
        // entries after all.
        if let Some(targets) = &targets {
            if self.only_index_channels(targets) {
                tracing::debug!("change confined to the index itself, nothing to do");
                return Ok(ExecutionReport::default());
            }
        }

        let snap = snapshot::derive(&self.config, &channels, partition)?;
        {
            let mut cache = self.cache.lock().expect("cache lock poisoned");
            cache.related_names = snap.related_names.clone();
        }

        let mut actions = plan::plan(&snap);
        if let Some(targets) = &targets {
            let related = self.related_entry_names(targets, &snap).await;
            actions = plan::filter_to_related(actions, &related);
        }

        tracing::debug!(actions = actions.len(), "executing reconciliation plan");
        let report = ActionExecutor::new(self.api.as_ref(), &self.config)
            .apply_all(actions)
            .await;
        tracing::info!(?report, "reconciliation pass finished");
        Ok(report)
    }

    /// Resolve the changed ids to the entry names they affect.
    async fn related_entry_names(
        &self,
        targets: &HashSet<String>,
        snap: &Snapshot,
    ) -> HashSet<String> {
        let mut related = HashSet::new();
        let mut unresolved: Vec<&str> = Vec::new();
        {
            let cache = self.cache.lock().expect("cache lock poisoned");
            for id in targets {
                match cache.related_names.get(id) {
                    Some(name) => {
                        related.insert(name.clone());
                    }
                    None => unresolved.push(id.as_str()),
                }
            }
        }
        if unresolved.is_empty() {
            return related;
        }

        // An unresolved id usually belongs to a channel deleted since
        // the last pass; it no longer appears in the snapshot, but the
        // entry that listed it still carries the id verbatim in its
        // materialized body.
        let mut bodies: Vec<(&str, String)> = Vec::new();
        for entry in &snap.existing {
            match self.api.latest_message(&entry.id).await {
                Ok(Some(message)) => bodies.push((entry.name.as_str(), message.content)),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(channel = %entry.id, error = %e, "skipping unreadable entry during relatedness scan");
                }
            }
        }
        for id in unresolved {
            if let Some((name, _)) = bodies.iter().find(|(_, content)| content.contains(id)) {
                related.insert((*name).to_string());
            }
        }
        related
    }
}
