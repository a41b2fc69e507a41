use engine::{DEFAULT_AUTHOR, Engine, EngineError, FailChanges, FailDraft, User};
use migration::MigratorTrait;
use sea_orm::Database;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

async fn seed_user(engine: &Engine) -> User {
    engine.new_user("Alice", "alice@example.com").await.unwrap()
}

fn draft(name: &str, description: &str, author: Option<&str>, created_by: i32) -> FailDraft {
    FailDraft {
        name: name.to_string(),
        description: description.to_string(),
        author: author.map(|a| a.to_string()),
        created_by,
    }
}

#[tokio::test]
async fn new_fail_defaults_author_to_anonymous() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;

    let fail = engine
        .new_fail(draft("off by one", "loop ran once too often", None, alice.id))
        .await
        .unwrap();

    assert_eq!(fail.author, DEFAULT_AUTHOR);
    assert_eq!(fail.created_by, alice.id);
}

#[tokio::test]
async fn new_fail_echoes_explicit_author() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;

    let fail = engine
        .new_fail(draft("npe", "null checked after use", Some("bob"), alice.id))
        .await
        .unwrap();

    assert_eq!(fail.author, "bob");
}

#[tokio::test]
async fn new_fail_is_enriched_with_creator_name() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;

    let fail = engine
        .new_fail(draft("typo", "deployed on friday", None, alice.id))
        .await
        .unwrap();

    assert_eq!(fail.created_by_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn new_fail_rejects_dangling_created_by() {
    let engine = engine_with_db().await;

    let err = engine
        .new_fail(draft("ghost", "no such creator", None, 42))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidReference(_)));
}

#[tokio::test]
async fn update_fail_changes_only_supplied_fields() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;
    let fail = engine
        .new_fail(draft("old name", "old description", Some("carol"), alice.id))
        .await
        .unwrap();

    let updated = engine
        .update_fail(
            fail.id,
            FailChanges {
                name: Some("new name".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "new name");
    assert_eq!(updated.description, "old description");
    assert_eq!(updated.author, "carol");
    assert_eq!(updated.created_by, alice.id);
}

#[tokio::test]
async fn update_fail_with_no_fields_is_rejected() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;
    let fail = engine
        .new_fail(draft("some", "thing", None, alice.id))
        .await
        .unwrap();

    let err = engine
        .update_fail(fail.id, FailChanges::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::EmptyUpdate(_)));
}

#[tokio::test]
async fn update_fail_unknown_id_is_not_found() {
    let engine = engine_with_db().await;

    let err = engine
        .update_fail(
            999,
            FailChanges {
                name: Some("whatever".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;
    let fail = engine
        .new_fail(draft("short lived", "gone soon", None, alice.id))
        .await
        .unwrap();

    engine.delete_fail(fail.id).await.unwrap();

    let err = engine.fail(fail.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let engine = engine_with_db().await;

    let err = engine.delete_fail(123).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_fails_filters_by_creator() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;
    let bob = engine.new_user("Bob", "bob@example.com").await.unwrap();

    engine
        .new_fail(draft("one", "by alice", None, alice.id))
        .await
        .unwrap();
    engine
        .new_fail(draft("two", "by bob", None, bob.id))
        .await
        .unwrap();
    engine
        .new_fail(draft("three", "also alice", None, alice.id))
        .await
        .unwrap();

    let all = engine.list_fails(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let only_alice = engine.list_fails(Some(alice.id)).await.unwrap();
    assert_eq!(only_alice.len(), 2);
    assert!(only_alice.iter().all(|fail| fail.created_by == alice.id));
    assert!(
        only_alice
            .iter()
            .all(|fail| fail.created_by_name.as_deref() == Some("Alice"))
    );
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let engine = engine_with_db().await;
    seed_user(&engine).await;

    let err = engine
        .new_user("Another Alice", "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn user_by_email_round_trip() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;

    let found = engine
        .user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, alice.id);
    assert_eq!(found.name, "Alice");

    assert!(
        engine
            .user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn list_users_returns_seeded_users_in_order() {
    let engine = engine_with_db().await;
    let alice = seed_user(&engine).await;
    let bob = engine.new_user("Bob", "bob@example.com").await.unwrap();

    let users = engine.list_users().await.unwrap();
    assert_eq!(
        users.iter().map(|user| user.id).collect::<Vec<_>>(),
        vec![alice.id, bob.id]
    );
}
