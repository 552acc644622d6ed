use divvy_core::AppError;
use divvy_core::models::NewUser;

use crate::integration::common::setup_test_db;

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.into(),
        password_hash: "salt$digest".into(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_and_lookup_user() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let user = repo.create(&new_user("alice")).await.unwrap();
    assert!(!user.id.is_nil());
    assert_eq!(user.name, "alice");

    let by_id = repo.get(user.id).await.unwrap().expect("Should find by id");
    assert_eq!(by_id.name, "alice");
    assert_eq!(by_id.password_hash, "salt$digest");

    let by_name = repo
        .get_by_name("alice")
        .await
        .unwrap()
        .expect("Should find by name");
    assert_eq!(by_name.id, user.id);

    assert!(repo.get_by_name("bob").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicate_name_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    repo.create(&new_user("alice")).await.unwrap();
    let err = repo.create(&new_user("alice")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn rename_user() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let alice = repo.create(&new_user("alice")).await.unwrap();
    repo.create(&new_user("bob")).await.unwrap();

    let renamed = repo.rename(alice.id, "alicia").await.unwrap();
    assert_eq!(renamed.id, alice.id);
    assert_eq!(renamed.name, "alicia");

    let err = repo.rename(alice.id, "bob").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = repo.rename(uuid::Uuid::new_v4(), "carol").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
