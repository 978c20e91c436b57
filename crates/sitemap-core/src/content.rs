//! Index entry content derivation
//!
//! The message body of an index entry is the serialized entry itself: a
//! fingerprint line followed by one reference line per child channel.
//! The fingerprint is what makes refreshes idempotent; the executor
//! compares prefixes instead of diffing bodies.

use sha2::{Digest, Sha256};
use sitemap_platform::Channel;

/// Number of leading characters of an entry body that carry the
/// fingerprint.
pub const FINGERPRINT_LEN: usize = 6;

/// Short stable hash over the ordered (id, topic) child list.
///
/// Order- and content-sensitive. A collision costs one missed refresh,
/// never a duplicate entry.
pub fn fingerprint(children: &[&Channel]) -> String {
    let mut hasher = Sha256::new();
    for child in children {
        hasher.update(child.id.as_bytes());
        hasher.update([0u8]);
        if let Some(topic) = &child.topic {
            hasher.update(topic.as_bytes());
        }
        hasher.update([0u8]);
    }
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Render the full message body for one container group.
///
/// Format: fingerprint line, then `- <#id>` per child, then an indented
/// topic line for children that have one; the trailing newline is
/// trimmed.
pub fn render_entry(children: &[&Channel]) -> String {
    let mut body = fingerprint(children);
    body.push('\n');
    for child in children {
        body.push_str(&format!("- <#{}>\n", child.id));
        if let Some(topic) = child.topic.as_deref().filter(|t| !t.is_empty()) {
            body.push_str(&format!("    - {topic}\n"));
        }
    }
    body.pop();
    body
}

/// Whether `existing` already carries `next`'s fingerprint.
///
/// A body shorter than the fingerprint prefix cannot be compared and
/// counts as changed.
pub fn same_fingerprint(existing: &str, next: &str) -> bool {
    existing.len() >= FINGERPRINT_LEN
        && next.len() >= FINGERPRINT_LEN
        && existing.as_bytes()[..FINGERPRINT_LEN] == next.as_bytes()[..FINGERPRINT_LEN]
}
