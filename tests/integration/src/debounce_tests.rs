//! Debouncer behavior under paused tokio time.
//!
//! `start_paused` auto-advances the clock whenever every task is idle,
//! so the quiet-window sleeps resolve deterministically.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use sitemap_core::{SitemapConfig, SitemapManager};
use sitemap_test_utils::MemoryPlatform;

struct Fixture {
    platform: Arc<MemoryPlatform>,
    manager: SitemapManager,
    root: String,
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
        rules,
        intro,
    }
}

/// Let the armed timer fire and the resulting pass finish.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn a_burst_coalesces_into_one_pass() {
    let f = fixture();

    f.manager.channel_created(&f.rules);
    f.manager.channel_updated(&f.rules);
    f.manager.channel_updated(&f.intro);
    settle().await;

    assert_eq!(f.platform.counts().list_channels, 1);
    let entries = f.platform.children_of(&f.root);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sm-general");
}

#[tokio::test(start_paused = true)]
async fn every_notification_rearms_the_quiet_window() {
    let f = fixture();

    f.manager.channel_updated(&f.rules);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(f.platform.counts().list_channels, 0);

    // Second notification 600 ms in: the window restarts, so nothing
    // runs at the original deadline.
    f.manager.channel_updated(&f.intro);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(f.platform.counts().list_channels, 0);

    tokio::time::sleep(Duration::from_millis(500)).await;
    tokio::task::yield_now().await;
    assert_eq!(f.platform.counts().list_channels, 1);
}

#[tokio::test(start_paused = true)]
async fn a_scope_event_makes_the_batch_full() {
    let f = fixture();
    let beta = f.platform.add_category("Beta", 5);
    f.platform.add_text(&beta, "beta-talk", None, 0);

    // A partial id followed by a scope-level event: the pass must cover
    // everything, not just the notified channel's entry.
    f.manager.channel_updated(&f.rules);
    f.manager.scope_updated();
    settle().await;

    assert_eq!(f.platform.counts().list_channels, 1);
    let names: Vec<String> = f
        .platform
        .children_of(&f.root)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["sm-general", "sm-beta"]);
}

#[tokio::test(start_paused = true)]
async fn the_scheduled_refresh_runs_a_full_pass() {
    let f = fixture();

    f.manager.refresh_now();
    settle().await;

    assert_eq!(f.platform.counts().list_channels, 1);
    assert_eq!(f.platform.children_of(&f.root).len(), 1);

    // A second scheduled refresh with nothing changed rewrites nothing.
    f.platform.reset_counts();
    f.manager.refresh_now();
    settle().await;

    assert_eq!(f.platform.counts().list_channels, 1);
    assert_eq!(f.platform.counts().writes(), 0);
}
