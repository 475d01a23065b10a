use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use minifig_catalog::client::SEARCH_QUIET_PERIOD;
use minifig_catalog::{AdminSession, CatalogClient, FetchError, Outcome, SaveError, VerifyState};

use crate::support::{in_process, record, RejectingClient};

fn seeded() -> Vec<minifig_catalog::Record> {
    vec![
        record("a1", "Tiger I", "Tamiya"),
        record("b2", "Sherman", "Airfix"),
        record("c3", "Panther", "Tamiya"),
    ]
}

#[tokio::test(start_paused = true)]
async fn create_is_optimistic_then_verified() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(Arc::clone(&client));
    session.load().await.unwrap();

    let mut item = session.new_record();
    item.name = "T-34".into();
    item.manufacturer = "Zvezda".into();
    session.save(item.clone()).await.unwrap();

    assert_eq!(session.cache().records()[0], item);
    assert!(session.is_saving());

    let outcome = session.wait_verified().await.unwrap();
    assert_eq!(outcome, Outcome::Verified { attempts: 1 });
    assert_eq!(session.verification(), VerifyState::Verified);
    assert!(!session.is_saving());
    assert_eq!(client.list().await.unwrap().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn edit_existing_record_is_an_update() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(Arc::clone(&client));
    session.load().await.unwrap();

    let mut item = session.cache().get("b2").unwrap().clone();
    item.scale = "1/76".into();
    session.save(item).await.unwrap();

    assert_eq!(session.cache().len(), 3);
    assert!(session.wait_verified().await.unwrap().is_verified());

    let stored = client.list().await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1].scale, "1/76");
}

#[tokio::test]
async fn save_requires_name_and_manufacturer() {
    let client: Arc<dyn CatalogClient> = Arc::new(RejectingClient { records: seeded() });
    let mut session = AdminSession::new(client);
    session.load().await.unwrap();

    let mut item = session.new_record();
    item.name = "Hetzer".into();
    let err = session.save(item).await.unwrap_err();

    assert_eq!(err, SaveError::MissingField("manufacturer"));
    assert_eq!(session.cache().len(), 3);
    assert!(session.cache().error().is_none());
    assert_eq!(session.verification(), VerifyState::Idle);
}

#[tokio::test]
async fn rejected_push_raises_banner_and_does_not_verify() {
    let client: Arc<dyn CatalogClient> = Arc::new(RejectingClient { records: seeded() });
    let mut session = AdminSession::new(client);
    session.load().await.unwrap();

    let err = session.delete("a1").await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    assert_eq!(session.cache().error(), Some(&err));
    assert!(!session.is_saving());
    // the optimistic delete stays until the next refresh
    assert_eq!(session.cache().len(), 2);

    session.dismiss_error();
    assert!(session.cache().error().is_none());
    session.load().await.unwrap();
    assert_eq!(session.cache().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn delete_unknown_id_skips_the_api() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(client);
    session.load().await.unwrap();

    assert!(!session.delete("zz").await.unwrap());
    assert_eq!(session.verification(), VerifyState::Idle);
}

#[tokio::test(start_paused = true)]
async fn delete_many_is_one_write() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(Arc::clone(&client));
    session.load().await.unwrap();

    let ids: HashSet<String> = ["a1", "c3", "missing"].iter().map(|s| s.to_string()).collect();
    assert_eq!(session.delete_many(&ids).await.unwrap(), 2);
    assert!(session.wait_verified().await.unwrap().is_verified());

    let stored = client.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "b2");
}

#[tokio::test(start_paused = true)]
async fn search_applies_after_quiet_period() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(client);
    session.load().await.unwrap();

    session.set_search("t");
    session.set_search("ta");
    session.set_search("tam");
    assert_eq!(session.visible().len(), 3);

    tokio::time::sleep(SEARCH_QUIET_PERIOD + Duration::from_millis(1)).await;
    let names: Vec<&str> = session.visible().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Tiger I", "Panther"]);

    session.set_search("");
    tokio::time::sleep(SEARCH_QUIET_PERIOD + Duration::from_millis(1)).await;
    assert_eq!(session.visible().len(), 3);
}

#[tokio::test]
async fn facets_are_sorted_and_distinct() {
    let client = in_process(&seeded());
    let mut session = AdminSession::new(client);
    session.load().await.unwrap();

    assert_eq!(session.cache().facet("manufacturer"), ["Airfix", "Tamiya"]);
}
