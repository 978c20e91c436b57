//! End-to-end reconciliation scenarios against the in-memory platform.

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use sitemap_core::{SitemapConfig, SitemapManager};
use sitemap_test_utils::MemoryPlatform;

/// A scope with an index root and one "General" category holding a
/// `rules` channel (with topic) and an `intro` channel.
struct Fixture {
    platform: Arc<MemoryPlatform>,
    manager: SitemapManager,
    root: String,
    general: String,
    rules: String,
    intro: String,
}

fn fixture() -> Fixture {
    sitemap_test_utils::init_test_logging();
    let platform = Arc::new(MemoryPlatform::new());
    let root = platform.add_category("sitemap", 0);
    let general = platform.add_category("General", 1);
    let rules = platform.add_text(&general, "rules", Some("server rules"), 0);
    let intro = platform.add_text(&general, "intro", None, 1);
    let manager = SitemapManager::new(platform.clone(), SitemapConfig::new("guild", &root));
    Fixture {
        platform,
        manager,
        root,
        general,
        rules,
        intro,
    }
}

fn targets(ids: &[&str]) -> Option<HashSet<String>> {
    Some(ids.iter().map(|s| s.to_string()).collect())
}

#[tokio::test]
async fn initial_pass_materializes_the_index() {
    let f = fixture();

    let report = f.manager.run_pass(None).await.unwrap();

    assert_eq!(report.created, 1);
    let entries = f.platform.children_of(&f.root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-general");
    assert_eq!(entries[0].position, 0);

    let body = f.platform.latest_content(&entries[0].id).unwrap();
    assert!(body[..6].chars().all(|c| c.is_ascii_hexdigit()));
    assert!(body.contains(&format!("- <#{}>", f.rules)));
    assert!(body.contains("server rules"));
    assert!(body.contains(&format!("- <#{}>", f.intro)));
}

#[tokio::test]
async fn second_pass_is_idempotent() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();
    f.platform.reset_counts();

    let report = f.manager.run_pass(None).await.unwrap();

    assert!(report.is_noop());
    assert_eq!(report.skipped, 1);
    assert_eq!(f.platform.counts().writes(), 0);
}

#[tokio::test]
async fn topic_edit_refreshes_the_entry() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();
    f.platform.set_topic(&f.rules, Some("be nice"));
    f.platform.reset_counts();

    let report = f.manager.run_pass(None).await.unwrap();

    assert_eq!(report.refreshed, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.moved, 0);

    let entries = f.platform.children_of(&f.root);
    let body = f.platform.latest_content(&entries[0].id).unwrap();
    assert!(body.contains("be nice"));
    assert!(!body.contains("server rules"));
}

#[tokio::test]
async fn deleting_the_category_deletes_the_entry() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();
    assert_eq!(
        f.manager.related_entry_name(&f.rules).as_deref(),
        Some("sm-general")
    );

    f.platform.remove(&f.rules);
    f.platform.remove(&f.intro);
    f.platform.remove(&f.general);

    let report = f.manager.run_pass(None).await.unwrap();

    assert_eq!(report.deleted, 1);
    assert!(f.platform.children_of(&f.root).is_empty());
    assert_eq!(f.manager.related_entry_name(&f.rules), None);
    assert_eq!(f.manager.related_entry_name(&f.general), None);
}

#[tokio::test]
async fn empty_category_is_never_indexed() {
    let f = fixture();
    f.platform.add_category("Archive", 9);

    f.manager.run_pass(None).await.unwrap();

    let entries = f.platform.children_of(&f.root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-general");
}

#[tokio::test]
async fn name_collision_aborts_the_pass() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();

    let clone = f.platform.add_category("GENERAL", 5);
    f.platform.add_text(&clone, "other", None, 0);
    f.platform.reset_counts();

    let result = f.manager.run_pass(None).await;

    assert!(result.is_err());
    assert_eq!(f.platform.counts().writes(), 0);
    let entries = f.platform.children_of(&f.root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-general");
}

#[tokio::test]
async fn incremental_pass_touches_only_related_entries() {
    let f = fixture();
    let beta = f.platform.add_category("Beta", 5);
    let beta_child = f.platform.add_text(&beta, "beta-talk", Some("old beta"), 0);
    f.manager.run_pass(None).await.unwrap();

    let entries = f.platform.children_of(&f.root);
    let beta_entry = entries.iter().find(|e| e.name == "sm-beta").unwrap();
    let beta_body_before = f.platform.latest_message_id(&beta_entry.id).unwrap();

    // Both categories change, but only the rules edit is notified.
    f.platform.set_topic(&f.rules, Some("changed"));
    f.platform.set_topic(&beta_child, Some("new beta"));
    f.platform.reset_counts();

    let report = f.manager.run_pass(targets(&[&f.rules])).await.unwrap();

    assert_eq!(report.refreshed, 1);
    let general_entry = &f.platform.children_of(&f.root)[0];
    assert!(
        f.platform
            .latest_content(&general_entry.id)
            .unwrap()
            .contains("changed")
    );
    // The unrelated entry was not rewritten.
    assert_eq!(
        f.platform.latest_message_id(&beta_entry.id).unwrap(),
        beta_body_before
    );
}

#[tokio::test]
async fn index_only_changes_short_circuit() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();
    let entry_id = f.platform.children_of(&f.root)[0].id.clone();
    f.platform.reset_counts();

    let report = f.manager.run_pass(targets(&[&entry_id])).await.unwrap();
    assert!(report.is_noop());
    assert_eq!(f.platform.counts().total(), 0);

    let report = f.manager.run_pass(targets(&[&f.root])).await.unwrap();
    assert!(report.is_noop());
    assert_eq!(f.platform.counts().total(), 0);
}

#[tokio::test]
async fn deleted_channel_resolves_through_the_materialized_body() {
    let f = fixture();
    let beta = f.platform.add_category("Beta", 5);
    f.platform.add_text(&beta, "beta-talk", None, 0);
    f.manager.run_pass(None).await.unwrap();

    let entries = f.platform.children_of(&f.root);
    let beta_entry = entries.iter().find(|e| e.name == "sm-beta").unwrap();
    let beta_body_before = f.platform.latest_message_id(&beta_entry.id).unwrap();

    // The deleted channel is gone from the snapshot; only the old entry
    // body still mentions its id.
    f.platform.remove(&f.intro);

    let report = f.manager.run_pass(targets(&[&f.intro])).await.unwrap();

    assert_eq!(report.refreshed, 1);
    let general_entry = &f.platform.children_of(&f.root)[0];
    let body = f.platform.latest_content(&general_entry.id).unwrap();
    assert!(!body.contains(&format!("<#{}>", f.intro)));
    assert_eq!(
        f.platform.latest_message_id(&beta_entry.id).unwrap(),
        beta_body_before
    );
}

#[tokio::test]
async fn reordering_moves_only_the_out_of_place_entry() {
    let f = fixture();
    let beta = f.platform.add_category("Beta", 5);
    f.platform.add_text(&beta, "beta-talk", None, 0);
    let gamma = f.platform.add_category("Gamma", 7);
    f.platform.add_text(&gamma, "gamma-talk", None, 0);
    f.manager.run_pass(None).await.unwrap();

    // General jumps behind Gamma: desired order becomes Beta, Gamma,
    // General, and only the General entry is out of place.
    f.platform.set_channel_position(&f.general, 9);
    f.platform.reset_counts();

    let report = f.manager.run_pass(None).await.unwrap();

    assert_eq!(report.moved, 1);
    assert_eq!(f.platform.counts().set_position, 1);
    let names: Vec<String> = f
        .platform
        .children_of(&f.root)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["sm-beta", "sm-gamma", "sm-general"]);
}

#[tokio::test]
async fn renaming_a_category_recreates_its_entry() {
    let f = fixture();
    f.manager.run_pass(None).await.unwrap();

    f.platform.rename(&f.general, "Lounge");
    let report = f.manager.run_pass(None).await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.deleted, 1);
    let entries = f.platform.children_of(&f.root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-lounge");
}

#[tokio::test]
async fn excluded_categories_are_ignored() {
    let platform = Arc::new(MemoryPlatform::new());
    let root = platform.add_category("sitemap", 0);
    let general = platform.add_category("General", 1);
    platform.add_text(&general, "rules", None, 0);
    let hidden = platform.add_category("Mods", 2);
    platform.add_text(&hidden, "mod-chat", None, 0);

    let mut config = SitemapConfig::new("guild", &root);
    config.excluded_containers.insert(hidden.clone());
    let manager = SitemapManager::new(platform.clone(), config);

    manager.run_pass(None).await.unwrap();

    let entries = platform.children_of(&root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-general");
    assert_eq!(manager.related_entry_name(&hidden), None);
}
