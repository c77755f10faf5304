use roster_sync::cache::{write_roster, MemoryCache, RosterCache, DEFAULT_SLOT};
use roster_sync::gateway::wire::{birth_date_placeholder, RemoteAddress, RemoteUser};
use roster_sync::gateway::{Fault, GatewayError, MemoryGateway, SERVER_UNAVAILABLE};
use roster_sync::models::FailureKind;
use roster_sync::roster::{LoadOutcome, RosterState};
use std::sync::Arc;

mod common;

fn remote_user(id: u64, name: &str, email: &str) -> RemoteUser {
    RemoteUser {
        id,
        name: name.to_string(),
        email: email.to_string(),
        address: Some(RemoteAddress {
            city: "Nantes".to_string(),
            zipcode: "44000".to_string(),
        }),
    }
}

#[tokio::test]
async fn test_remote_list_replaces_roster() {
    let gateway = Arc::new(MemoryGateway::with_users(vec![
        remote_user(1, "Leanne Graham", "leanne@april.biz"),
        remote_user(2, "Ervin Van Howell", "ervin@melissa.tv"),
    ]));
    let mut t = common::setup_roster_with(gateway, Arc::new(MemoryCache::new()));

    assert_eq!(t.roster.load().await, LoadOutcome::Synced { count: 2 });
    assert_eq!(t.roster.state(), RosterState::Ready);
    assert!(t.roster.sync_error().is_none());

    let ervin = t.roster.find_by_email("ERVIN@melissa.tv").unwrap();
    assert_eq!(ervin.first_name, "Ervin");
    assert_eq!(ervin.last_name, "Van Howell");
    assert_eq!(ervin.postal_code, "44000");
    assert_eq!(ervin.date_of_birth, birth_date_placeholder());
}

#[tokio::test]
async fn test_new_ids_follow_existing_remote_rows() {
    let gateway = Arc::new(MemoryGateway::with_users(vec![remote_user(
        10,
        "Leanne Graham",
        "leanne@april.biz",
    )]));
    let mut t = common::setup_roster_with(gateway, Arc::new(MemoryCache::new()));
    t.roster.load().await;

    let result = t.roster.add(&common::candidate("marie@lab.fr")).await;
    assert_eq!(result.registrant().unwrap().id, 11);
    assert_eq!(t.roster.count(), 2);
}

#[tokio::test]
async fn test_failed_load_falls_back_to_cache() {
    let mut t = common::setup_roster();
    t.roster.load().await;
    for email in ["a@lab.fr", "b@lab.fr", "c@lab.fr"] {
        t.roster.add(&common::candidate(email)).await;
    }
    let snapshot = t.roster.registrants().to_vec();

    // Restart against an unreachable remote
    t.gateway.set_offline(true);
    let mut restarted = common::setup_roster_with(t.gateway.clone(), t.cache.clone());
    let outcome = restarted.roster.load().await;

    match outcome {
        LoadOutcome::Degraded {
            count,
            from_cache,
            failure,
        } => {
            assert_eq!(count, 3);
            assert!(from_cache);
            assert_eq!(failure.kind, FailureKind::Server);
            assert_eq!(failure.message, SERVER_UNAVAILABLE);
        }
        other => panic!("expected degraded load, got {:?}", other),
    }
    assert_eq!(restarted.roster.state(), RosterState::Degraded);
    assert_eq!(restarted.roster.registrants(), snapshot.as_slice());
}

#[tokio::test]
async fn test_failed_load_with_garbage_cache_is_empty() {
    let cache = Arc::new(MemoryCache::new());
    cache.write_slot(DEFAULT_SLOT, "[{\"id\": \"oops\"").unwrap();
    let gateway = Arc::new(MemoryGateway::new());
    gateway.fail_next(Fault::Status(500, None));

    let mut t = common::setup_roster_with(gateway, cache);
    let outcome = t.roster.load().await;
    assert!(matches!(
        outcome,
        LoadOutcome::Degraded { count: 0, from_cache: false, .. }
    ));
    assert!(matches!(
        t.roster.sync_error(),
        Some(GatewayError::Server { status: Some(500), .. })
    ));
}

#[tokio::test]
async fn test_successful_load_overwrites_stale_cache() {
    let cache = Arc::new(MemoryCache::new());
    let mut stale = common::setup_roster();
    stale.roster.load().await;
    stale.roster.add(&common::candidate("old@lab.fr")).await;
    write_roster(cache.as_ref(), DEFAULT_SLOT, stale.roster.registrants()).unwrap();

    let mut t = common::setup_roster_with(Arc::new(MemoryGateway::new()), cache.clone());
    assert_eq!(t.roster.load().await.count(), 0);
    assert_eq!(cache.read_slot(DEFAULT_SLOT).unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_degraded_roster_recovers_on_next_load() {
    let mut t = common::setup_roster();
    t.gateway.set_offline(true);
    t.roster.load().await;
    assert!(t.roster.is_degraded());

    t.gateway.set_offline(false);
    assert!(matches!(t.roster.load().await, LoadOutcome::Synced { .. }));
    assert_eq!(t.roster.state(), RosterState::Ready);
    assert!(t.roster.sync_error().is_none());
}

#[tokio::test]
async fn test_remove_updates_roster_and_cache() {
    let mut t = common::setup_roster();
    t.roster.load().await;
    let keep = t.roster.add(&common::candidate("keep@lab.fr")).await;
    let dropped = t.roster.add(&common::candidate("drop@lab.fr")).await;
    let dropped_id = dropped.registrant().unwrap().id;

    t.roster.remove(dropped_id).await.unwrap();
    assert_eq!(t.roster.count(), 1);
    assert_eq!(t.gateway.remote_users().len(), 1);

    let mut restarted = common::setup_roster_with(t.gateway.clone(), t.cache.clone());
    t.gateway.set_offline(true);
    restarted.roster.load().await;
    assert_eq!(
        restarted.roster.registrants(),
        std::slice::from_ref(keep.registrant().unwrap())
    );
}
