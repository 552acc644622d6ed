use divvy_core::models::{NewExpense, NewUser, Split};
use divvy_core::traits::ExpenseStore;
use uuid::Uuid;

use crate::integration::common::setup_test_db;

fn split(username: &str, share: f64, user_id: Option<Uuid>) -> Split {
    Split {
        username: username.into(),
        share,
        user_id,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_and_find_expense() {
    let (db, _container) = setup_test_db().await;
    let users = db.user_repo();
    let repo = db.expense_repo();

    let alice = users
        .create(&NewUser {
            name: "alice".into(),
            password_hash: "salt$digest".into(),
        })
        .await
        .unwrap();

    let created = repo
        .create(&NewExpense {
            description: "Groceries".into(),
            amount: 30.0,
            paid_by: alice.id,
            split_between: vec![
                split("alice", 10.0, Some(alice.id)),
                split("bob", 10.0, None),
                split("carol", 10.0, None),
            ],
        })
        .await
        .unwrap();

    assert!(!created.id.is_nil());

    let found = repo
        .get(created.id)
        .await
        .unwrap()
        .expect("Should find the expense");

    assert_eq!(found.description, "Groceries");
    assert_eq!(found.amount, 30.0);
    assert_eq!(found.paid_by, alice.id);
    assert_eq!(found.split_between, created.split_between);
    assert_eq!(found.total_shares(), 30.0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn find_by_id_missing_is_not_found() {
    let (db, _container) = setup_test_db().await;
    let repo = db.expense_repo();

    let err = repo.find_by_id(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Expense not found");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn list_for_user_is_deduplicated_and_ordered() {
    let (db, _container) = setup_test_db().await;
    let users = db.user_repo();
    let repo = db.expense_repo();

    let alice = users
        .create(&NewUser {
            name: "alice".into(),
            password_hash: "salt$digest".into(),
        })
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    let paid_and_split = repo
        .create(&NewExpense {
            description: "Dinner".into(),
            amount: 20.0,
            paid_by: alice.id,
            split_between: vec![
                split("alice", 10.0, Some(alice.id)),
                split("bob", 10.0, None),
            ],
        })
        .await
        .unwrap();
    repo.create(&NewExpense {
        description: "Unrelated".into(),
        amount: 5.0,
        paid_by: stranger,
        split_between: vec![split("carol", 5.0, None)],
    })
    .await
    .unwrap();
    let as_guest = repo
        .create(&NewExpense {
            description: "Taxi".into(),
            amount: 12.0,
            paid_by: stranger,
            split_between: vec![split("alice", 12.0, None)],
        })
        .await
        .unwrap();

    let found = repo.list_for_user(alice.id, "alice").await.unwrap();
    let ids: Vec<Uuid> = found.iter().map(|e| e.id).collect();

    assert_eq!(ids, vec![paid_and_split.id, as_guest.id]);
    assert_eq!(found[0].split_between.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn health_check_succeeds() {
    let (db, _container) = setup_test_db().await;
    db.expense_repo().health_check().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn registration_claims_guest_splits() {
    let (db, _container) = setup_test_db().await;
    let users = db.user_repo();
    let repo = db.expense_repo();

    let created = repo
        .create(&NewExpense {
            description: "Snacks".into(),
            amount: 5.0,
            paid_by: Uuid::new_v4(),
            split_between: vec![split("dave", 5.0, None)],
        })
        .await
        .unwrap();
    assert_eq!(created.split_between[0].user_id, None);

    let dave = users
        .create(&NewUser {
            name: "dave".into(),
            password_hash: "salt$digest".into(),
        })
        .await
        .unwrap();
    users.rename(dave.id, "david").await.unwrap();

    let stored = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(stored.split_between[0].user_id, Some(dave.id));
    assert_eq!(repo.list_for_user(dave.id, "david").await.unwrap().len(), 1);

    // Taking over the freed name does not reach the expense.
    let eve = users
        .create(&NewUser {
            name: "eve".into(),
            password_hash: "salt$digest".into(),
        })
        .await
        .unwrap();
    users.rename(eve.id, "dave").await.unwrap();
    assert!(repo.list_for_user(eve.id, "dave").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_links_names_of_registered_users() {
    let (db, _container) = setup_test_db().await;
    let users = db.user_repo();
    let repo = db.expense_repo();

    let bob = users
        .create(&NewUser {
            name: "bob".into(),
            password_hash: "salt$digest".into(),
        })
        .await
        .unwrap();

    let created = repo
        .create(&NewExpense {
            description: "Lunch".into(),
            amount: 10.0,
            paid_by: Uuid::new_v4(),
            split_between: vec![split("bob", 6.0, None), split("zoe", 4.0, None)],
        })
        .await
        .unwrap();

    assert_eq!(created.split_between[0].user_id, Some(bob.id));
    assert_eq!(created.split_between[1].user_id, None);
}
