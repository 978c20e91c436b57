//! Snapshot partitioning and desired-entry derivation
//!
//! One pass works from a single listing of the scope's channels. The
//! listing is partitioned into the index root, the entries already
//! materialized under it, and the candidate categories; the candidates
//! are then turned into the desired index state. The two stages are
//! separate because the pass re-checks its fast-path guard in between.

use std::collections::HashMap;

use sitemap_platform::{Channel, ChannelKind};

use crate::config::SitemapConfig;
use crate::content;
use crate::naming;
use crate::{Error, Result};

/// One derived index entry, in desired order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    /// Normalized, collision-checked entry name
    pub name: String,
    /// Fingerprint-prefixed message body
    pub content: String,
}

/// A scope listing split into the parts a pass cares about
#[derive(Debug)]
pub struct Partition {
    /// Channels currently materialized under the index root
    pub existing: Vec<Channel>,
    /// Candidate categories, in ascending position order
    pub categories: Vec<Channel>,
}

/// Everything one pass derives from a channel-tree listing
#[derive(Debug)]
pub struct Snapshot {
    /// Channels currently materialized under the index root
    pub existing: Vec<Channel>,
    /// Desired entries, in target order
    pub desired: Vec<DesiredEntry>,
    /// Channel id (category or child) to owning entry name
    pub related_names: HashMap<String, String>,
}

/// Split a scope listing into index root children and candidate
/// categories. Fails when the index root is missing from the listing.
pub fn partition(config: &SitemapConfig, channels: &[Channel]) -> Result<Partition> {
    let mut root_seen = false;
    let mut existing = Vec::new();
    let mut categories: Vec<Channel> = Vec::new();
    for ch in channels {
        if ch.id == config.index_root_id {
            root_seen = true;
        } else if ch.parent_id.as_deref() == Some(config.index_root_id.as_str()) {
            existing.push(ch.clone());
        } else if ch.is_category() && !config.excluded_containers.contains(&ch.id) {
            categories.push(ch.clone());
        }
    }
    if !root_seen {
        return Err(Error::IndexRootMissing {
            id: config.index_root_id.clone(),
        });
    }
    categories.sort_by_key(|c| c.position);

    Ok(Partition {
        existing,
        categories,
    })
}

/// Derive the desired index state from a partitioned listing.
///
/// Fails when two categories normalize to the same entry name; the pass
/// emits nothing in that case.
pub fn derive(
    config: &SitemapConfig,
    channels: &[Channel],
    partition: Partition,
) -> Result<Snapshot> {
    // Leaf children of each candidate category, in position order.
    let mut children: HashMap<&str, Vec<&Channel>> = HashMap::new();
    for ch in channels {
        if ch.kind != ChannelKind::Text {
            continue;
        }
        let Some(parent) = ch.parent_id.as_deref() else {
            continue;
        };
        if partition.categories.iter().any(|c| c.id == parent) {
            children.entry(parent).or_default().push(ch);
        }
    }
    for group in children.values_mut() {
        group.sort_by_key(|c| c.position);
    }

    let mut desired: Vec<DesiredEntry> = Vec::new();
    let mut related_names = HashMap::new();
    for category in &partition.categories {
        let Some(group) = children.get(category.id.as_str()) else {
            // Empty categories are never indexed.
            continue;
        };

        let name = naming::entry_name(&category.name, &config.naming);
        if desired.iter().any(|e| e.name == name) {
            return Err(Error::DuplicateEntryName { name });
        }
        related_names.insert(category.id.clone(), name.clone());
        for child in group {
            related_names.insert(child.id.clone(), name.clone());
        }

        desired.push(DesiredEntry {
            name,
            content: content::render_entry(group),
        });
    }

    Ok(Snapshot {
        existing: partition.existing,
        desired,
        related_names,
    })
}

/// Partition and derive in one step.
pub fn build(config: &SitemapConfig, channels: &[Channel]) -> Result<Snapshot> {
    let partition = partition(config, channels)?;
    derive(config, channels, partition)
}
