use crate::session::listeners::{ListenerRegistry, Subscription};

use common::BearerToken;
use models::{SessionSnapshot, SessionStatus};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn counting_listener(counter: &Arc<AtomicUsize>) -> crate::session::listeners::Listener {
    let counter = Arc::clone(counter);
    Arc::new(move |_: &SessionSnapshot| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

/// **VALUE**: Verifies every registered listener is notified.
///
/// **BUG THIS CATCHES**: Would catch fan-out that stops after the first listener.
#[test]
fn given_two_listeners_when_notifying_then_both_receive_snapshot() {
    // GIVEN: Two registered listeners
    let registry = ListenerRegistry::default();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    registry.register(counting_listener(&first), SessionSnapshot::loading);
    registry.register(counting_listener(&second), SessionSnapshot::loading);

    // WHEN: Notifying once
    assert!(registry.notify(1, &SessionSnapshot::unauthenticated()));

    // THEN: Both were called
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 2);
}

/// **VALUE**: Verifies dropping a subscription only removes that listener.
///
/// **WHY THIS MATTERS**: Consumers come and go independently.
///
/// **BUG THIS CATCHES**: Would catch unsubscribe clearing the whole registry or the wrong id.
#[test]
fn given_dropped_subscription_when_notifying_then_only_remaining_listener_is_called() {
    // GIVEN: Two listeners with subscriptions
    let registry = Arc::new(ListenerRegistry::default());
    let kept = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));
    let (kept_id, _) = registry.register(counting_listener(&kept), SessionSnapshot::loading);
    let (dropped_id, _) = registry.register(counting_listener(&dropped), SessionSnapshot::loading);
    let kept_subscription = Subscription::new(kept_id, &registry);
    let dropped_subscription = Subscription::new(dropped_id, &registry);

    // WHEN: One subscription is released, then a notification goes out
    dropped_subscription.unsubscribe();
    registry.notify(1, &SessionSnapshot::unauthenticated());

    // THEN: Only the kept listener saw it
    assert_eq!(kept.load(Ordering::SeqCst), 1);
    assert_eq!(dropped.load(Ordering::SeqCst), 0);
    assert_eq!(registry.len(), 1);
    drop(kept_subscription);
    assert_eq!(registry.len(), 0);
}

/// **VALUE**: Verifies listeners run outside the registry lock.
///
/// **BUG THIS CATCHES**: Would catch a deadlock when a listener unsubscribes during delivery.
#[test]
fn given_listener_that_unsubscribes_itself_when_notifying_then_no_deadlock() {
    // GIVEN: A listener that releases its own subscription when called
    let registry = Arc::new(ListenerRegistry::default());
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let slot_for_listener = Arc::clone(&slot);
    let (id, _) = registry.register(
        Arc::new(move |_: &SessionSnapshot| {
            slot_for_listener.lock().expect("slot lock").take();
        }),
        SessionSnapshot::loading,
    );
    *slot.lock().expect("slot lock") = Some(Subscription::new(id, &registry));

    // WHEN: Notifying
    registry.notify(1, &SessionSnapshot::authenticated(BearerToken::new("t"), None));

    // THEN: The listener is gone and the call returned
    assert_eq!(registry.len(), 0);
}

#[test]
fn given_registration_when_replay_is_read_then_returns_replay_snapshot() {
    // GIVEN: A registry
    let registry = ListenerRegistry::default();

    // WHEN: Registering with a replay
    let (_, replay) = registry.register(
        Arc::new(|_: &SessionSnapshot| {}),
        || SessionSnapshot::invalid_token(Some(String::from("https://host.example"))),
    );

    // THEN: The replay is handed back unchanged
    assert_eq!(replay.status, SessionStatus::InvalidToken);
    assert_eq!(replay.parent_origin.as_deref(), Some("https://host.example"));
}

/// **VALUE**: Verifies a fan-out that arrives after a newer one is dropped.
///
/// **WHY THIS MATTERS**: Commits from different threads can reach the fan-out
/// out of order; the last snapshot a listener sees must match the store.
///
/// **BUG THIS CATCHES**: Would catch a listener left on an older snapshot than the store holds.
#[test]
fn given_newer_commit_delivered_when_older_commit_arrives_then_it_is_dropped() {
    // GIVEN: A listener recording what it sees
    let registry = ListenerRegistry::default();
    let seen: Arc<Mutex<Vec<SessionStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry.register(
        Arc::new(move |snapshot: &SessionSnapshot| {
            sink.lock().expect("sink lock").push(snapshot.status);
        }),
        SessionSnapshot::loading,
    );

    // WHEN: Commit #2 fans out before commit #1
    let newer = registry.notify(2, &SessionSnapshot::unauthenticated());
    let older = registry.notify(
        1,
        &SessionSnapshot::authenticated(BearerToken::new("t"), None),
    );

    // THEN: Only the newer snapshot was delivered
    assert!(newer);
    assert!(!older);
    assert_eq!(
        *seen.lock().expect("sink lock"),
        vec![SessionStatus::Unauthenticated]
    );

    // AND: A later commit is still delivered
    assert!(registry.notify(3, &SessionSnapshot::invalid_token(None)));
}
