use whisperlog::application::ports::{RepositoryError, UserRepository};
use whisperlog::domain::User;

use crate::helpers::TestPostgres;

#[tokio::test]
async fn given_new_user_when_creating_and_retrieving_then_user_is_persisted() {
    let test_pg = TestPostgres::new().await;
    let user = User::new("ana".to_string(), "Ana@Example.com", "hash".to_string());

    test_pg.users.create(&user).await.expect("Failed to create user");

    let by_id = test_pg
        .users
        .find_by_id(user.id)
        .await
        .expect("Failed to load user")
        .expect("User not found");
    assert_eq!(by_id.username, "ana");
    assert_eq!(by_id.email, "ana@example.com");

    let by_email = test_pg
        .users
        .find_active_by_email("ana@example.com")
        .await
        .unwrap()
        .expect("User not found by email");
    assert_eq!(by_email.id, user.id);

    let by_either = test_pg
        .users
        .find_by_email_or_username("nobody@example.com", "ana")
        .await
        .unwrap();
    assert!(by_either.is_some());
}

#[tokio::test]
async fn given_taken_email_when_creating_user_then_duplicate_email() {
    let test_pg = TestPostgres::new().await;
    let first = User::new("ana".to_string(), "ana@example.com", "hash".to_string());
    test_pg.users.create(&first).await.unwrap();

    let second = User::new("other".to_string(), "ana@example.com", "hash".to_string());
    let err = test_pg.users.create(&second).await.unwrap_err();

    assert!(
        matches!(err, RepositoryError::Duplicate { ref field } if field == "email"),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn given_user_when_updating_password_then_new_hash_is_stored() {
    let test_pg = TestPostgres::new().await;
    let user = User::new("ana".to_string(), "ana@example.com", "old".to_string());
    test_pg.users.create(&user).await.unwrap();

    test_pg.users.update_password(user.id, "new").await.unwrap();

    let stored = test_pg.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash.as_deref(), Some("new"));
}
