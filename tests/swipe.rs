//! Swipe processing through the feed controller.

mod common;

use std::time::Duration;

use common::{candidates, fake_controller, ids, load_first_page, settings};

use matchfeed::api::FeedError;
use matchfeed::{FeedEvent, FeedSettings, SwipeDecision};

#[tokio::test]
async fn confirmed_swipe_removes_candidate() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let swipe = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c1", SwipeDecision::Reject).await })
    };
    let pending = backend.next_swipe().await;
    assert_eq!(pending.request.swiped_id, "f-c1");
    assert_eq!(pending.request.swipe_type, SwipeDecision::Reject);
    assert_eq!(pending.request.project_id.as_deref(), Some("p-c1"));

    // Not removed before the backend confirms.
    assert!(controller.snapshot().contains("c1"));
    assert!(controller.is_swipe_pending("c1"));

    pending.accept(false);
    let event = swipe.await.unwrap().unwrap();

    assert_eq!(event.candidate_id, "c1");
    assert_eq!(event.founder_id, "f-c1");
    assert!(!event.match_created);
    assert_eq!(ids(&controller.snapshot()), vec!["c0", "c2"]);
    assert!(!controller.is_swipe_pending("c1"));
}

#[tokio::test]
async fn match_is_announced_before_removal() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;
    let mut events = controller.subscribe();

    let swipe = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c0", SwipeDecision::Accept).await })
    };
    backend.next_swipe().await.accept(true);
    let event = swipe.await.unwrap().unwrap();
    assert!(event.match_created);

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(received.len(), 3, "{:?}", received);
    assert!(matches!(
        &received[0],
        FeedEvent::SwipeStarted { candidate_id, decision: SwipeDecision::Accept } if candidate_id == "c0"
    ));
    assert!(matches!(&received[1], FeedEvent::MatchCreated(e) if e.founder_id == "f-c0"));
    assert!(matches!(received[2], FeedEvent::Updated));
}

#[tokio::test]
async fn failed_swipe_keeps_candidate_in_place() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;
    controller.next();
    let mut events = controller.subscribe();

    let swipe = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c1", SwipeDecision::Accept).await })
    };
    backend
        .next_swipe()
        .await
        .fail(FeedError::Server {
            status: 500,
            message: "swipe store unavailable".to_string(),
        });

    let err = swipe.await.unwrap().unwrap_err();
    assert!(matches!(err, FeedError::Server { status: 500, .. }));
    assert!(err.is_recoverable());

    let state = controller.snapshot();
    assert_eq!(state.position("c1"), Some(1));
    assert_eq!(state.current_index, 1);
    assert!(!controller.is_swipe_pending("c1"));

    let failed = std::iter::from_fn(|| events.try_recv().ok())
        .any(|e| matches!(e, FeedEvent::SwipeFailed { ref candidate_id, .. } if candidate_id == "c1"));
    assert!(failed);

    // Retry succeeds.
    let retry = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c1", SwipeDecision::Accept).await })
    };
    backend.next_swipe().await.accept(false);
    retry.await.unwrap().unwrap();
    assert!(!controller.snapshot().contains("c1"));
}

#[tokio::test]
async fn concurrent_swipe_on_same_candidate_conflicts() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let first = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c2", SwipeDecision::Accept).await })
    };
    let pending = backend.next_swipe().await;

    let second = controller.swipe("c2", SwipeDecision::Reject).await;
    assert_eq!(
        second,
        Err(FeedError::Conflict {
            candidate_id: "c2".to_string()
        })
    );
    assert!(backend.try_next_swipe().is_none());

    pending.accept(false);
    first.await.unwrap().unwrap();

    // Removed exactly once; a later swipe cannot find it.
    assert_eq!(ids(&controller.snapshot()), vec!["c0", "c1"]);
    assert_eq!(
        controller.swipe("c2", SwipeDecision::Accept).await,
        Err(FeedError::CandidateNotFound {
            candidate_id: "c2".to_string()
        })
    );
}

#[tokio::test]
async fn swipes_on_different_candidates_run_concurrently() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let a = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c0", SwipeDecision::Accept).await })
    };
    let first = backend.next_swipe().await;
    let b = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c1", SwipeDecision::Reject).await })
    };
    let second = backend.next_swipe().await;

    second.accept(false);
    first.accept(false);
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(ids(&controller.snapshot()), vec!["c2"]);
}

#[tokio::test]
async fn unknown_candidate_is_rejected_without_request() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let result = controller.swipe("ghost", SwipeDecision::Accept).await;

    assert_eq!(
        result,
        Err(FeedError::CandidateNotFound {
            candidate_id: "ghost".to_string()
        })
    );
    assert!(backend.try_next_swipe().is_none());
}

#[tokio::test]
async fn disposed_controller_rejects_swipes() {
    let (controller, mut backend) = fake_controller(settings(3, 0));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;
    controller.dispose();

    assert_eq!(
        controller.swipe("c0", SwipeDecision::Accept).await,
        Err(FeedError::Disposed)
    );
}

#[tokio::test]
async fn swipe_removal_triggers_prefetch() {
    let (controller, mut backend) = fake_controller(settings(3, 2));
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let swipe = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c0", SwipeDecision::Reject).await })
    };
    backend.next_swipe().await.accept(false);
    swipe.await.unwrap().unwrap();

    let prefetch = backend.next_fetch().await;
    assert_eq!(prefetch.request.cursor, 3);
    prefetch.reply(candidates("c", 3, 1));
}

#[tokio::test(start_paused = true)]
async fn exit_delay_holds_candidate_and_slot() {
    let (controller, mut backend) = fake_controller(FeedSettings {
        swipe_exit_delay: Duration::from_millis(300),
        ..settings(3, 0)
    });
    load_first_page(&controller, &mut backend, candidates("c", 0, 3)).await;

    let swipe = {
        let this = controller.clone();
        tokio::spawn(async move { this.swipe("c0", SwipeDecision::Accept).await })
    };
    backend.next_swipe().await.accept(false);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(controller.snapshot().contains("c0"));
    assert_eq!(
        controller.swipe("c0", SwipeDecision::Accept).await,
        Err(FeedError::Conflict {
            candidate_id: "c0".to_string()
        })
    );

    swipe.await.unwrap().unwrap();
    assert!(!controller.snapshot().contains("c0"));
}
