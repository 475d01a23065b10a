use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use minifig_catalog::verify::{MAX_ATTEMPTS, POLL_INTERVAL};
use minifig_catalog::{
    AdminSession, CatalogClient, Expectation, Outcome, Verifier, VerifyConfig, VerifyState,
};
use tokio::time::Instant;

use crate::support::{record, LaggingClient};

#[tokio::test(start_paused = true)]
async fn verifies_once_the_write_shows_up() {
    let client: Arc<dyn CatalogClient> = Arc::new(LaggingClient::new(3));
    client
        .replace_all(&[record("a1", "Tiger I", "Tamiya")])
        .await
        .unwrap();

    let started = Instant::now();
    let mut verifier = Verifier::default();
    verifier.start(client, Expectation::Length(1));
    assert!(verifier.is_saving());

    assert_eq!(verifier.wait().await, Some(Outcome::Verified { attempts: 3 }));
    assert_eq!(started.elapsed(), POLL_INTERVAL * 3);
    assert_eq!(verifier.state(), VerifyState::Verified);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let client: Arc<dyn CatalogClient> = Arc::new(LaggingClient::stuck());
    client
        .replace_all(&[record("a1", "Tiger I", "Tamiya")])
        .await
        .unwrap();

    let started = Instant::now();
    let mut verifier = Verifier::default();
    verifier.start(client, Expectation::Length(1));

    assert_eq!(
        verifier.wait().await,
        Some(Outcome::TimedOut {
            attempts: MAX_ATTEMPTS
        })
    );
    assert_eq!(started.elapsed(), Duration::from_secs(270));
    assert_eq!(verifier.state(), VerifyState::TimedOut);
    assert!(!verifier.is_saving());
}

#[tokio::test(start_paused = true)]
async fn state_channel_ends_in_verified() {
    let client: Arc<dyn CatalogClient> = Arc::new(LaggingClient::new(2));
    client
        .replace_all(&[record("a1", "Tiger I", "Tamiya")])
        .await
        .unwrap();

    let mut verifier = Verifier::new(VerifyConfig {
        interval: Duration::from_secs(1),
        max_attempts: 5,
    });
    let mut rx = verifier.subscribe();
    verifier.start(client, Expectation::Length(1));

    let mut seen = vec![*rx.borrow_and_update()];
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        seen.push(state);
        if !state.is_saving() {
            break;
        }
    }

    // intermediate attempts may coalesce; the ends are fixed
    assert_eq!(seen.first(), Some(&VerifyState::Polling { attempt: 0 }));
    assert_eq!(seen.last(), Some(&VerifyState::Verified));
    assert!(seen[1..seen.len() - 1]
        .iter()
        .all(|s| matches!(s, VerifyState::Polling { attempt } if *attempt >= 1)));
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_polling() {
    let lagging = Arc::new(LaggingClient::stuck());
    let client: Arc<dyn CatalogClient> = lagging.clone();

    let mut verifier = Verifier::default();
    verifier.start(client, Expectation::Length(1));
    tokio::time::sleep(POLL_INTERVAL * 2).await;

    verifier.cancel();
    assert_eq!(verifier.state(), VerifyState::Cancelled);
    assert!(!verifier.is_saving());
    assert_eq!(verifier.wait().await, None);

    // no late poll flips the state back
    tokio::time::sleep(POLL_INTERVAL * 10).await;
    assert_eq!(verifier.state(), VerifyState::Cancelled);
}

#[tokio::test]
async fn cancel_when_idle_is_a_no_op() {
    let mut verifier = Verifier::default();
    verifier.cancel();
    assert_eq!(verifier.state(), VerifyState::Idle);
}

#[tokio::test(start_paused = true)]
async fn a_new_save_replaces_the_running_check() {
    let lagging = Arc::new(LaggingClient::new(2));
    let client: Arc<dyn CatalogClient> = lagging.clone();
    let mut session = AdminSession::new(client);

    let mut first = session.new_record();
    first.name = "Tiger I".into();
    first.manufacturer = "Tamiya".into();
    session.save(first).await.unwrap();

    tokio::time::sleep(POLL_INTERVAL).await;

    let mut second = session.new_record();
    second.name = "Sherman".into();
    second.manufacturer = "Airfix".into();
    session.save(second).await.unwrap();

    let started = Instant::now();
    let outcome = session.wait_verified().await.unwrap();
    assert_eq!(outcome, Outcome::Verified { attempts: 2 });
    assert_eq!(started.elapsed(), POLL_INTERVAL * 2);
    assert_eq!(lagging.writes.load(Ordering::SeqCst), 2);
    assert_eq!(session.cache().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn session_cancel_leaves_the_write_in_place() {
    let lagging = Arc::new(LaggingClient::stuck());
    let client: Arc<dyn CatalogClient> = lagging.clone();
    let mut session = AdminSession::new(client);

    let mut item = session.new_record();
    item.name = "Panther".into();
    item.manufacturer = "Tamiya".into();
    session.save(item).await.unwrap();
    assert!(session.is_saving());

    session.cancel_saving();
    assert_eq!(session.verification(), VerifyState::Cancelled);
    assert!(!session.is_saving());
    assert_eq!(session.cache().len(), 1);
    assert_eq!(lagging.writes.load(Ordering::SeqCst), 1);
}
