//! Integration tests for motion-sticky.
//!
//! These drive the engine against an in-memory gateway and a real on-disk
//! store.

mod common;

use common::{harness, harness_with_timeout, Call, FakeGateway};
use motion_common::{ChannelId, GuildId};
use motion_config::ThemeStore;
use motion_sticky::{
    ActivityOutcome, ChannelLockTable, StickyEngine, StickyError, StickyRecord, StickyStore,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const G1: GuildId = GuildId(1);
const C1: ChannelId = ChannelId(11);
const C2: ChannelId = ChannelId(12);

#[tokio::test]
async fn test_create_repost_delete_scenario() {
    motion_common::test_utils::init_test_logging();
    let h = harness();

    let created = h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    let first = created.last_message_id.unwrap();
    assert_eq!(
        h.store.get(G1, C1).await,
        Some(StickyRecord {
            name: "rules".to_string(),
            content: "Be nice".to_string(),
            last_message_id: Some(first),
        })
    );

    let outcome = h.engine.on_activity(G1, C1).await;
    let ActivityOutcome::Reposted(second) = outcome else {
        panic!("expected a re-post, got {outcome:?}");
    };
    assert_ne!(first, second);

    let calls = h.gateway.calls();
    let delete_at = calls
        .iter()
        .position(|c| *c == Call::Delete(C1, first))
        .unwrap();
    let publish_at = calls
        .iter()
        .rposition(|c| matches!(c, Call::Publish(ch, _) if *ch == C1))
        .unwrap();
    assert!(delete_at < publish_at, "old sticky must be retired first");
    assert_eq!(h.gateway.live_in(C1), vec![second]);

    let (channel, record) = h.engine.delete(G1, "rules").await.unwrap();
    assert_eq!(channel, C1);
    assert_eq!(record.last_message_id, Some(second));
    assert!(h.store.get(G1, C1).await.is_none());
    assert!(h.gateway.live_in(C1).is_empty());
}

#[tokio::test]
async fn test_concurrent_notifications_run_one_sequence() {
    let h = harness();
    h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    let publishes_before = h.gateway.publish_count();

    let (a, b, c, d, e) = tokio::join!(
        h.engine.on_activity(G1, C1),
        h.engine.on_activity(G1, C1),
        h.engine.on_activity(G1, C1),
        h.engine.on_activity(G1, C1),
        h.engine.on_activity(G1, C1),
    );
    let outcomes = [a, b, c, d, e];

    let reposted = outcomes
        .iter()
        .filter(|o| matches!(o, ActivityOutcome::Reposted(_)))
        .count();
    let busy = outcomes
        .iter()
        .filter(|o| **o == ActivityOutcome::Busy)
        .count();
    assert_eq!(reposted, 1);
    assert_eq!(busy, 4);
    assert_eq!(h.gateway.publish_count(), publishes_before + 1);
    assert_eq!(h.gateway.live_in(C1).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mutual_exclusion_across_threads() {
    let h = harness();
    h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    *h.gateway.publish_delay.lock().unwrap() = Some(Duration::from_millis(20));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&h.engine);
        tasks.push(tokio::spawn(async move {
            let mut outcomes = Vec::new();
            for _ in 0..5 {
                outcomes.push(engine.on_activity(G1, C1).await);
                tokio::time::sleep(Duration::from_millis(3)).await;
            }
            outcomes
        }));
    }

    let mut reposts = 0;
    for task in tasks {
        reposts += task
            .await
            .unwrap()
            .into_iter()
            .filter(|o| matches!(o, ActivityOutcome::Reposted(_)))
            .count();
    }

    assert!(reposts >= 1);
    assert_eq!(h.gateway.max_in_flight(), 1);
    assert_eq!(h.gateway.live_in(C1).len(), 1);
    assert!(!h.engine.locks().is_busy(C1));
}

#[tokio::test]
async fn test_already_deleted_message_does_not_block_publish() {
    let h = harness();
    let created = h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    h.gateway.vanish(C1, created.last_message_id.unwrap());

    let outcome = h.engine.on_activity(G1, C1).await;
    assert!(matches!(outcome, ActivityOutcome::Reposted(_)));
    assert_eq!(h.gateway.live_in(C1).len(), 1);
}

#[tokio::test]
async fn test_pointer_tracks_latest_publish() {
    let h = harness();
    h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();

    for _ in 0..3 {
        let outcome = h.engine.on_activity(G1, C1).await;
        let ActivityOutcome::Reposted(id) = outcome else {
            panic!("expected a re-post, got {outcome:?}");
        };
        assert_eq!(h.store.get(G1, C1).await.unwrap().last_message_id, Some(id));
        assert_eq!(h.gateway.live_in(C1), vec![id]);
    }
}

#[tokio::test]
async fn test_failed_publish_keeps_record() {
    let h = harness();
    h.engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    let before = h.store.get(G1, C1).await.unwrap();

    h.gateway.fail_publish.store(true, Ordering::SeqCst);
    assert_eq!(
        h.engine.on_activity(G1, C1).await,
        ActivityOutcome::PublishFailed
    );
    assert_eq!(h.store.get(G1, C1).await.unwrap(), before);

    // The next activity retries the whole sequence.
    h.gateway.fail_publish.store(false, Ordering::SeqCst);
    assert!(matches!(
        h.engine.on_activity(G1, C1).await,
        ActivityOutcome::Reposted(_)
    ));
}

#[tokio::test]
async fn test_duplicate_names_resolve_to_some_match() {
    let h = harness();
    h.engine.create(G1, C1, "welcome", "Hi from one").await.unwrap();
    h.engine.create(G1, C2, "welcome", "Hi from two").await.unwrap();

    let (channel, record) = h.engine.find(G1, "welcome").await.unwrap();
    assert_eq!(record.name, "welcome");
    assert!(channel == C1 || channel == C2);

    h.engine.delete(G1, "welcome").await.unwrap();
    h.engine.delete(G1, "welcome").await.unwrap();
    assert!(matches!(
        h.engine.delete(G1, "welcome").await,
        Err(StickyError::NotFound(_))
    ));
    assert!(h.engine.list(G1).await.is_empty());
}

#[tokio::test]
async fn test_recreate_retires_previous_message() {
    let h = harness();
    let old = h.engine.create(G1, C1, "rules", "v1").await.unwrap();
    let new = h.engine.create(G1, C1, "rules", "v2").await.unwrap();

    assert_eq!(h.gateway.live_in(C1), vec![new.last_message_id.unwrap()]);
    assert_ne!(old.last_message_id, new.last_message_id);
    assert_eq!(h.store.get(G1, C1).await.unwrap().content, "v2");
}

#[tokio::test(start_paused = true)]
async fn test_hung_publish_times_out_and_frees_channel() {
    let h = harness_with_timeout(Duration::from_secs(2));
    h.store
        .put(G1, C1, StickyRecord::new("rules", "Be nice"))
        .await
        .unwrap();
    h.gateway.hang_publish.store(true, Ordering::SeqCst);

    assert_eq!(
        h.engine.on_activity(G1, C1).await,
        ActivityOutcome::PublishFailed
    );
    assert!(!h.engine.locks().is_busy(C1));
    assert_eq!(h.store.get(G1, C1).await.unwrap().last_message_id, None);
}

#[tokio::test]
async fn test_record_deleted_mid_sequence() {
    let h = harness();
    h.store
        .put(G1, C1, StickyRecord::new("rules", "Be nice"))
        .await
        .unwrap();

    let entered = Arc::new(Notify::new());
    let proceed = Arc::new(Notify::new());
    *h.gateway.gate.lock().unwrap() = Some((Arc::clone(&entered), Arc::clone(&proceed)));

    let (outcome, ()) = tokio::join!(h.engine.on_activity(G1, C1), async {
        entered.notified().await;
        h.store.remove(G1, C1).await.unwrap();
        proceed.notify_one();
    });

    assert_eq!(outcome, ActivityOutcome::Vanished);
    assert!(h.store.get(G1, C1).await.is_none());
    assert!(h.gateway.live_in(C1).is_empty());
}

#[tokio::test]
async fn test_renders_with_theme_primary_color() {
    let dir = tempfile::tempdir().unwrap();
    let theme = Arc::new(ThemeStore::load(dir.path().join("theme.json")).await);
    let gateway = FakeGateway::new();
    let engine = StickyEngine::new(
        Arc::new(StickyStore::new(dir.path().join("stickyMessages.json"))),
        ChannelLockTable::new(),
        gateway.clone(),
        theme,
        Duration::from_secs(5),
    );

    engine.create(G1, C1, "rules", "Be nice").await.unwrap();
    match gateway.calls().first() {
        Some(Call::Publish(_, sticky)) => {
            assert_eq!(sticky.color, 0x58_65_F2);
            assert_eq!(sticky.content, "Be nice");
        }
        other => panic!("expected a publish, got {other:?}"),
    }
}
