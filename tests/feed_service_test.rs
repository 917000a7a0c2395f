// End-to-end tests for the photo feed through AppDependencies
// Responses come from a scripted transport, so completion order is explicit.

mod common;

use common::*;
use imagefeed::{EventKind, FeedSnapshot, ImageFeedError, NetworkError};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn settle(feed: &imagefeed::PhotoFeedService) -> FeedSnapshot {
    feed.sync().await.unwrap();
    let mut watch = feed.watch();
    let idle = watch.wait_for(|state| !state.is_loading).await.unwrap();
    idle.clone()
}

async fn wait_for_events(seen: &Arc<Mutex<Vec<EventKind>>>, count: usize) {
    for _ in 0..100 {
        if seen.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_pagination_with_overlap_dedups_and_notifies() {
    let transport = ScriptedTransport::new();
    let deps = test_deps(&transport, Some("tok"));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = deps.feed.on_change(move |event| sink.lock().unwrap().push(event.kind));

    deps.feed.fetch_next_page();
    let first = transport.next_request().await;
    assert_eq!(first.request.query_param("page").as_deref(), Some("1"));
    first.respond_json(page_json(&ids(1..=10)));
    assert_eq!(settle(&deps.feed).await.len(), 10);

    deps.feed.fetch_next_page();
    let second = transport.next_request().await;
    assert_eq!(second.request.query_param("page").as_deref(), Some("2"));
    second.respond_json(page_json(&ids(9..=11)));
    let snapshot = settle(&deps.feed).await;

    let loaded: Vec<String> = snapshot.photos.iter().map(|p| p.id.clone()).collect();
    assert_eq!(loaded, ids(1..=11));
    assert_eq!(snapshot.last_loaded_page, Some(2));

    wait_for_events(&seen, 2).await;
    assert_eq!(
        seen.lock().unwrap().clone(),
        vec![
            EventKind::FeedChanged { updated_id: None },
            EventKind::FeedChanged { updated_id: None }
        ]
    );
}

#[tokio::test]
async fn test_rapid_fetch_calls_issue_one_request() {
    let transport = ScriptedTransport::new();
    let deps = test_deps(&transport, Some("tok"));

    for _ in 0..5 {
        deps.feed.fetch_next_page();
    }

    let pending = transport.next_request().await;
    deps.feed.sync().await.unwrap();
    transport.assert_no_request().await;
    assert_eq!(transport.sent_count(), 1);

    pending.respond_json(page_json(&ids(1..=3)));
    assert_eq!(settle(&deps.feed).await.len(), 3);
}

#[tokio::test]
async fn test_failed_page_is_retried_not_skipped() {
    let transport = ScriptedTransport::new();
    let deps = test_deps(&transport, Some("tok"));

    deps.feed.fetch_next_page();
    transport.next_request().await.respond_json(page_json(&ids(1..=2)));
    settle(&deps.feed).await;

    deps.feed.fetch_next_page();
    transport
        .next_request()
        .await
        .fail(NetworkError::UrlRequestError("connection reset".to_string()));
    let after_failure = settle(&deps.feed).await;
    assert_eq!(after_failure.last_loaded_page, Some(1));
    assert_eq!(after_failure.len(), 2);

    deps.feed.fetch_next_page();
    let retry = transport.next_request().await;
    assert_eq!(retry.request.query_param("page").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_like_then_unlike_round_trip() {
    let transport = ScriptedTransport::new();
    let deps = Arc::new(test_deps(&transport, Some("tok")));

    deps.feed.fetch_next_page();
    transport.next_request().await.respond_json(page_json(&ids(1..=3)));
    settle(&deps.feed).await;

    let mut events = deps.events.subscribe();

    for liked in [true, false] {
        let change = {
            let deps = deps.clone();
            tokio::spawn(async move { deps.feed.change_like("p2", liked).await })
        };
        transport
            .next_request()
            .await
            .respond_json(json!({ "photo": photo_json("p2", liked) }));
        change.await.unwrap().unwrap();

        assert_eq!(deps.feed.snapshot().photo("p2").unwrap().is_liked, liked);
        assert_eq!(
            events.recv().await.unwrap().kind,
            EventKind::FeedChanged {
                updated_id: Some("p2".to_string())
            }
        );
    }

    let order: Vec<String> = deps.feed.photos().iter().map(|p| p.id.clone()).collect();
    assert_eq!(order, ids(1..=3));
}

#[tokio::test]
async fn test_like_rejected_by_server_keeps_state() {
    let transport = ScriptedTransport::new();
    let deps = Arc::new(test_deps(&transport, Some("tok")));

    deps.feed.fetch_next_page();
    transport.next_request().await.respond_json(page_json(&ids(1..=1)));
    let before = settle(&deps.feed).await;

    let change = {
        let deps = deps.clone();
        tokio::spawn(async move { deps.feed.change_like("p1", true).await })
    };
    transport.next_request().await.respond_status(401);

    assert!(matches!(
        change.await.unwrap(),
        Err(ImageFeedError::Network(NetworkError::HttpStatusCode(401)))
    ));
    assert_eq!(deps.feed.sync().await.unwrap(), before);
}

#[tokio::test]
async fn test_logout_discards_in_flight_page() {
    let transport = ScriptedTransport::new();
    let deps = test_deps(&transport, Some("tok"));

    deps.feed.fetch_next_page();
    transport.next_request().await.respond_json(page_json(&ids(1..=2)));
    settle(&deps.feed).await;

    deps.feed.fetch_next_page();
    let late = transport.next_request().await;

    deps.logout().await.unwrap();
    late.respond_json(page_json(&ids(3..=4)));

    assert_eq!(deps.feed.sync().await.unwrap(), FeedSnapshot::default());

    deps.feed.fetch_next_page();
    let restart = transport.next_request().await;
    assert_eq!(restart.request.query_param("page").as_deref(), Some("1"));
    assert_eq!(restart.request.header("Authorization"), None);
}
