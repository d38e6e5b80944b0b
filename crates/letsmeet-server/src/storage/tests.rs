//! Storage layer tests for `LetsMeet`.

use letsmeet_core::Interval;

use super::db::{DatabaseError, EventDatabase};

async fn test_db() -> EventDatabase {
    EventDatabase::open_in_memory().await.unwrap()
}

fn interval(start: i64, end: i64) -> Interval {
    Interval::from_unix_seconds(start, end).unwrap()
}

/// Create an event with public id `public_id` and an admin `alice`.
async fn seed_event(db: &EventDatabase, public_id: &str) -> (i64, i64) {
    let mut tx = db.begin().await.unwrap();
    let event_id = tx.insert_event("Team Sync", "weekly").await.unwrap();
    tx.set_public_id(event_id, public_id).await.unwrap();
    let user_id = tx.insert_user(event_id, "alice", "hash", true).await.unwrap();
    tx.commit().await.unwrap();
    (event_id, user_id)
}

// === Event tests ===

#[tokio::test]
async fn create_and_get_event() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    let event = db.get_event("QuietOtter").await.unwrap();
    assert_eq!(event.id, event_id);
    assert_eq!(event.public_id.as_deref(), Some("QuietOtter"));
    assert_eq!(event.title, "Team Sync");
    assert_eq!(event.description, "weekly");
    assert!(event.created_at > 0);

    assert!(matches!(
        db.get_event("Nope").await,
        Err(DatabaseError::NotFound(_))
    ));
    assert_eq!(db.find_event_id("QuietOtter").await.unwrap(), Some(event_id));
}

#[tokio::test]
async fn duplicate_public_id_is_duplicate_key() {
    let db = test_db().await;
    seed_event(&db, "QuietOtter").await;

    let mut tx = db.begin().await.unwrap();
    let event_id = tx.insert_event("Other", "").await.unwrap();
    let err = tx.set_public_id(event_id, "QuietOtter").await.unwrap_err();
    assert!(err.is_duplicate_key());

    // The transaction survives the failed statement.
    tx.set_public_id(event_id, "LoudOtter").await.unwrap();
    tx.commit().await.unwrap();
    assert!(db.get_event("LoudOtter").await.is_ok());
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let db = test_db().await;
    {
        let mut tx = db.begin().await.unwrap();
        let event_id = tx.insert_event("Ghost", "").await.unwrap();
        tx.set_public_id(event_id, "GhostOwl").await.unwrap();
    }
    assert!(db.find_event_id("GhostOwl").await.unwrap().is_none());
}

#[tokio::test]
async fn explicit_rollback_discards_writes() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    let mut tx = db.begin().await.unwrap();
    tx.insert_user(event_id, "bob", "h", false).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(db.get_user(event_id, "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn event_intervals_bulk_insert_and_replace() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    let mut tx = db.begin().await.unwrap();
    tx.insert_event_intervals(event_id, &[interval(300, 400), interval(100, 200)])
        .await
        .unwrap();
    tx.insert_event_intervals(event_id, &[]).await.unwrap();
    tx.commit().await.unwrap();

    let stored = db.get_event_intervals(event_id).await.unwrap();
    assert_eq!(stored, vec![interval(100, 200), interval(300, 400)]);

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tx.delete_event_intervals(event_id).await.unwrap(), 2);
    tx.insert_event_intervals(event_id, &[interval(500, 600)])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(
        db.get_event_intervals(event_id).await.unwrap(),
        vec![interval(500, 600)]
    );
}

#[tokio::test]
async fn bulk_insert_spans_multiple_chunks() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    let many: Vec<Interval> = (0..1_200).map(|i| interval(i * 10, i * 10 + 5)).collect();
    let mut tx = db.begin().await.unwrap();
    tx.insert_event_intervals(event_id, &many).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(db.get_event_intervals(event_id).await.unwrap().len(), 1_200);
}

#[tokio::test]
async fn inverted_interval_is_rejected() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    let mut tx = db.begin().await.unwrap();
    let err = tx
        .insert_event_intervals(event_id, &[interval(200, 100)])
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Query(_)));
}

// === User tests ===

#[tokio::test]
async fn usernames_unique_per_event_only() {
    let db = test_db().await;
    let (first, _) = seed_event(&db, "QuietOtter").await;
    let (second, _) = seed_event(&db, "LoudOtter").await;

    let mut tx = db.begin().await.unwrap();
    let err = tx.insert_user(first, "alice", "h", false).await.unwrap_err();
    assert!(err.is_duplicate_key());
    tx.insert_user(second, "bob", "h", false).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(db.list_usernames(first).await.unwrap(), vec!["alice"]);
    assert_eq!(db.list_usernames(second).await.unwrap(), vec!["alice", "bob"]);
}

#[tokio::test]
async fn get_user_returns_admin_flag() {
    let db = test_db().await;
    let (event_id, user_id) = seed_event(&db, "QuietOtter").await;

    let user = db.get_user(event_id, "alice").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert!(user.is_admin);
    assert_eq!(user.password_hash, "hash");
    assert!(user.refresh_token_hash.is_none());

    assert!(db.get_user(event_id, "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn user_intervals_grouped_by_username() {
    let db = test_db().await;
    let (event_id, alice) = seed_event(&db, "QuietOtter").await;

    let mut tx = db.begin().await.unwrap();
    let bob = tx.insert_user(event_id, "bob", "h", false).await.unwrap();
    tx.insert_user_intervals(bob, &[interval(50, 60)]).await.unwrap();
    tx.insert_user_intervals(alice, &[interval(30, 40), interval(10, 20)])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let rows = db.get_user_intervals(event_id).await.unwrap();
    assert_eq!(
        rows,
        vec![
            ("alice".to_string(), interval(10, 20)),
            ("alice".to_string(), interval(30, 40)),
            ("bob".to_string(), interval(50, 60)),
        ]
    );

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tx.find_user_id(event_id, "alice").await.unwrap(), Some(alice));
    assert_eq!(tx.delete_user_intervals(alice).await.unwrap(), 2);
    tx.commit().await.unwrap();
    assert_eq!(db.get_user_intervals(event_id).await.unwrap().len(), 1);
}

// === Session slot tests ===

#[tokio::test]
async fn set_get_clear_current_token() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    assert!(db.get_current_token(event_id, "alice").await.unwrap().is_none());

    assert!(db.set_current_token(event_id, "alice", "t1").await.unwrap());
    assert!(db.set_current_token(event_id, "alice", "t1").await.unwrap());
    assert_eq!(
        db.get_current_token(event_id, "alice").await.unwrap().as_deref(),
        Some("t1")
    );

    assert!(db.set_current_token(event_id, "alice", "t2").await.unwrap());
    assert_eq!(
        db.get_current_token(event_id, "alice").await.unwrap().as_deref(),
        Some("t2")
    );

    db.clear_current_token(event_id, "alice").await.unwrap();
    assert!(db.get_current_token(event_id, "alice").await.unwrap().is_none());
    db.clear_current_token(event_id, "alice").await.unwrap();
}

#[tokio::test]
async fn set_current_token_for_unknown_user() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    assert!(!db.set_current_token(event_id, "ghost", "t").await.unwrap());
    assert!(db.get_current_token(event_id, "ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn replace_current_token_is_compare_and_swap() {
    let db = test_db().await;
    let (event_id, _) = seed_event(&db, "QuietOtter").await;

    // Empty slot never matches.
    assert!(!db
        .replace_current_token(event_id, "alice", "t0", "t1")
        .await
        .unwrap());

    db.set_current_token(event_id, "alice", "t1").await.unwrap();
    assert!(db
        .replace_current_token(event_id, "alice", "t1", "t2")
        .await
        .unwrap());
    assert!(!db
        .replace_current_token(event_id, "alice", "t1", "t3")
        .await
        .unwrap());
    assert_eq!(
        db.get_current_token(event_id, "alice").await.unwrap().as_deref(),
        Some("t2")
    );
}
