//! Action planning
//!
//! Turns the diff between desired and existing entries into an ordered
//! action list: deletes for entries with no desired counterpart, then
//! creates, refreshes, and finally the moves computed by the position
//! reconciler.

use std::collections::{HashMap, HashSet};

use sitemap_platform::Channel;

use crate::positions::adjust_positions;
use crate::snapshot::Snapshot;

/// A planned mutation against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Materialize a new index entry
    Create {
        name: String,
        content: String,
        position: i64,
    },
    /// Re-send an entry's message body; idempotence is enforced at
    /// execution via the fingerprint, not here
    RefreshMessage {
        id: String,
        name: String,
        content: String,
    },
    /// Remove an entry that no longer has a backing category
    Delete { id: String },
    /// Reposition a retained entry (absolute target position)
    Move { id: String, position: i64 },
}

/// Plan the action list for one pass.
pub fn plan(snapshot: &Snapshot) -> Vec<Action> {
    let desired = &snapshot.desired;
    let mut actions = Vec::new();

    let mut existing_by_name: HashMap<&str, &Channel> = HashMap::new();
    let mut positions = vec![0i64; desired.len()];
    for ch in &snapshot.existing {
        match desired.iter().position(|e| e.name == ch.name) {
            Some(i) => {
                positions[i] = ch.position;
                existing_by_name.insert(ch.name.as_str(), ch);
            }
            None => actions.push(Action::Delete { id: ch.id.clone() }),
        }
    }

    let mut deltas = adjust_positions(&positions);

    for (i, entry) in desired.iter().enumerate() {
        if !existing_by_name.contains_key(entry.name.as_str()) {
            // New entries land directly on their target slot; the delta
            // is consumed so the move loop below skips them.
            actions.push(Action::Create {
                name: entry.name.clone(),
                content: entry.content.clone(),
                position: positions[i] + deltas[i],
            });
            deltas[i] = 0;
        }
    }
    for entry in desired {
        if let Some(ch) = existing_by_name.get(entry.name.as_str()) {
            actions.push(Action::RefreshMessage {
                id: ch.id.clone(),
                name: entry.name.clone(),
                content: entry.content.clone(),
            });
        }
    }
    for (i, &delta) in deltas.iter().enumerate() {
        if delta == 0 {
            continue;
        }
        if let Some(ch) = existing_by_name.get(desired[i].name.as_str()) {
            actions.push(Action::Move {
                id: ch.id.clone(),
                position: positions[i] + delta,
            });
        }
    }

    actions
}

/// Restrict creates and refreshes to entries related to the changed ids.
///
/// Deletes and moves always survive: structural cleanup proceeds no
/// matter which channel triggered the pass.
pub fn filter_to_related(actions: Vec<Action>, related: &HashSet<String>) -> Vec<Action> {
    actions
        .into_iter()
        .filter(|action| match action {
            Action::Create { name, .. } | Action::RefreshMessage { name, .. } => {
                related.contains(name)
            }
            Action::Delete { .. } | Action::Move { .. } => true,
        })
        .collect()
}
