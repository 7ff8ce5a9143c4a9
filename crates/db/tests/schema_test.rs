//! Integration tests for the polling-center schema and repository queries.

use votings_db::models::{NewComment, NewParty, NewPollingCenter, NewPollingHour, NewUser};
use votings_db::repository::*;
use votings_db::{DbError, DbPool};

struct Fixture {
    db: DbPool,
    party_id: i64,
    state_id: i64,
    center_id: i64,
}

async fn setup() -> Fixture {
    let db = DbPool::in_memory().await.unwrap();

    let party = insert_party(
        &db,
        &NewParty {
            political_party: "Democratic Party".to_string(),
            political_party_abbr: "DEM".to_string(),
        },
    )
    .await
    .unwrap();

    let state = insert_polling_hour(
        &db,
        &NewPollingHour {
            state_name: "California".to_string(),
            state_abbrev: "CA".to_string(),
            state_hours: "7:00 AM - 8:00 PM".to_string(),
        },
    )
    .await
    .unwrap();

    let center = insert_polling_center(
        &db,
        &NewPollingCenter {
            lat: 37.7749,
            lng: -122.4194,
            hours_of_operation: "7am-8pm".to_string(),
        },
    )
    .await
    .unwrap();

    Fixture {
        db,
        party_id: party.party_id,
        state_id: state.state_id,
        center_id: center.polling_id,
    }
}

fn new_user(fx: &Fixture, email: &str) -> NewUser {
    NewUser {
        party_id: fx.party_id,
        address: "1 Market St, San Francisco".to_string(),
        state: fx.state_id,
        fname: "Ada".to_string(),
        lname: "Lovelace".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        phonenum: "4155550100".to_string(),
        lat: 37.79,
        lng: -122.40,
    }
}

fn comment(user_id: i64, polling_id: i64, text: &str) -> NewComment {
    NewComment {
        user_id,
        polling_id,
        comment: text.to_string(),
    }
}

#[tokio::test]
async fn test_database_creation() {
    let db = DbPool::in_memory().await.unwrap();
    assert!(list_polling_centers(&db).await.unwrap().is_empty());
    // Running migrations twice is a no-op.
    db.migrate().await.unwrap();
}

#[tokio::test]
async fn test_user_round_trip_and_relations() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();

    assert_eq!(get_user(&fx.db, user.id).await.unwrap(), user);
    assert_eq!(
        party_for_user(&fx.db, &user).await.unwrap().political_party_abbr,
        "DEM"
    );
    assert_eq!(
        polling_hours_for_user(&fx.db, &user).await.unwrap().state_abbrev,
        "CA"
    );
    assert_eq!(users_for_party(&fx.db, fx.party_id).await.unwrap().len(), 1);
    assert_eq!(users_for_state(&fx.db, fx.state_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_with_missing_user_rejected() {
    let fx = setup().await;
    let err = insert_comment(&fx.db, &comment(999, fx.center_id, "Long line"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKey(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_comment_with_missing_center_rejected() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();
    let err = insert_comment(&fx.db, &comment(user.id, 999, "Where is it?"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKey(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_user_with_missing_party_rejected() {
    let fx = setup().await;
    let mut user = new_user(&fx, "ada@example.com");
    user.party_id = 42;
    let err = insert_user(&fx.db, &user).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKey(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_long_comment_rejected() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();

    let ok = insert_comment(&fx.db, &comment(user.id, fx.center_id, &"x".repeat(140))).await;
    assert!(ok.is_ok());

    let err = insert_comment(&fx.db, &comment(user.id, fx.center_id, &"x".repeat(141)))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { field: "comment", .. }));
}

#[tokio::test]
async fn test_schema_check_rejects_long_comment_without_validation() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();

    let err: DbError = sqlx::query("INSERT INTO comments (user_id, polling_id, comment) VALUES (?, ?, ?)")
        .bind(user.id)
        .bind(fx.center_id)
        .bind("x".repeat(141))
        .execute(fx.db.pool())
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::Constraint(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_null_required_column_rejected() {
    let fx = setup().await;
    let err: DbError =
        sqlx::query("INSERT INTO pollingcenters (lat, lng, hours_of_operation) VALUES (?, ?, NULL)")
            .bind(1.0_f64)
            .bind(2.0_f64)
            .execute(fx.db.pool())
            .await
            .unwrap_err()
            .into();
    assert!(matches!(err, DbError::Constraint(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_center_comments_ordered_by_user() {
    let fx = setup().await;
    let first = insert_user(&fx.db, &new_user(&fx, "first@example.com"))
        .await
        .unwrap();
    let second = insert_user(&fx.db, &new_user(&fx, "second@example.com"))
        .await
        .unwrap();

    let c1 = insert_comment(&fx.db, &comment(second.id, fx.center_id, "Quick"))
        .await
        .unwrap();
    let c2 = insert_comment(&fx.db, &comment(first.id, fx.center_id, "Parking is tight"))
        .await
        .unwrap();
    let c3 = insert_comment(&fx.db, &comment(second.id, fx.center_id, "Friendly staff"))
        .await
        .unwrap();

    let ids: Vec<i64> = comments_for_center(&fx.db, fx.center_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment_id)
        .collect();
    assert_eq!(ids, vec![c2.comment_id, c1.comment_id, c3.comment_id]);

    let ids: Vec<i64> = comments_for_user(&fx.db, second.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment_id)
        .collect();
    assert_eq!(ids, vec![c1.comment_id, c3.comment_id]);

    assert_eq!(center_for_comment(&fx.db, &c1).await.unwrap().polling_id, fx.center_id);
    assert_eq!(user_for_comment(&fx.db, &c2).await.unwrap().id, first.id);
}

#[tokio::test]
async fn test_email_is_not_unique() {
    let fx = setup().await;
    let a = insert_user(&fx.db, &new_user(&fx, "shared@example.com"))
        .await
        .unwrap();
    let b = insert_user(&fx.db, &new_user(&fx, "Shared@Example.com"))
        .await
        .unwrap();

    let found: Vec<i64> = find_users_by_email(&fx.db, "shared@example.com")
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(found, vec![a.id, b.id]);
}

#[tokio::test]
async fn test_delete_referenced_party_fails() {
    let fx = setup().await;
    insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();

    let err = delete_party(&fx.db, fx.party_id).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKey(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_get_and_delete_missing_rows() {
    let fx = setup().await;
    assert!(matches!(
        get_polling_center(&fx.db, 404).await,
        Err(DbError::NotFound { entity: "PollingCenter", id: 404 })
    ));
    assert!(matches!(
        delete_comment(&fx.db, 404).await,
        Err(DbError::NotFound { entity: "Comment", .. })
    ));
    assert!(find_user(&fx.db, 404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_polling_hours_by_abbrev() {
    let fx = setup().await;
    let hour = find_polling_hours_by_abbrev(&fx.db, "ca").await.unwrap().unwrap();
    assert_eq!(hour.state_id, fx.state_id);
    assert!(find_polling_hours_by_abbrev(&fx.db, "NY").await.unwrap().is_none());
}

#[tokio::test]
async fn test_nearest_polling_centers() {
    let fx = setup().await;
    let la = insert_polling_center(
        &fx.db,
        &NewPollingCenter {
            lat: 34.0522,
            lng: -118.2437,
            hours_of_operation: "6am-7pm".to_string(),
        },
    )
    .await
    .unwrap();

    let nearest = nearest_polling_centers(&fx.db, 34.0, -118.0, 5).await.unwrap();
    assert_eq!(nearest.len(), 2);
    assert_eq!(nearest[0].0.polling_id, la.polling_id);
    assert_eq!(nearest[1].0.polling_id, fx.center_id);
    assert!(nearest[0].1 < nearest[1].1);

    let one = nearest_polling_centers(&fx.db, 37.7, -122.4, 1).await.unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].0.polling_id, fx.center_id);

    assert!(matches!(
        nearest_polling_centers(&fx.db, 91.0, 0.0, 1).await,
        Err(DbError::Validation { field: "lat", .. })
    ));
}

#[tokio::test]
async fn test_update_password_hash() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();

    update_user_password_hash(&fx.db, user.id, "$argon2id$new").await.unwrap();
    assert_eq!(get_user(&fx.db, user.id).await.unwrap().password_hash, "$argon2id$new");
    assert!(matches!(
        update_user_password_hash(&fx.db, 404, "$argon2id$new").await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_comments_ordered_by_id() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();
    assert!(list_comments(&fx.db).await.unwrap().is_empty());

    let first = insert_comment(&fx.db, &comment(user.id, fx.center_id, "Opened late"))
        .await
        .unwrap();
    let second = insert_comment(&fx.db, &comment(user.id, fx.center_id, "Short wait"))
        .await
        .unwrap();

    let ids: Vec<i64> = list_comments(&fx.db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment_id)
        .collect();
    assert_eq!(ids, vec![first.comment_id, second.comment_id]);

    delete_comment(&fx.db, first.comment_id).await.unwrap();
    assert_eq!(list_comments(&fx.db).await.unwrap(), vec![second]);
}

#[tokio::test]
async fn test_party_and_state_members_ordered_by_id() {
    let fx = setup().await;
    let other_state = insert_polling_hour(
        &fx.db,
        &NewPollingHour {
            state_name: "Oregon".to_string(),
            state_abbrev: "OR".to_string(),
            state_hours: "Vote by mail".to_string(),
        },
    )
    .await
    .unwrap();

    let a = insert_user(&fx.db, &new_user(&fx, "a@example.com")).await.unwrap();
    let mut elsewhere = new_user(&fx, "b@example.com");
    elsewhere.state = other_state.state_id;
    let b = insert_user(&fx.db, &elsewhere).await.unwrap();
    let c = insert_user(&fx.db, &new_user(&fx, "c@example.com")).await.unwrap();

    let ids = |users: Vec<votings_db::User>| users.into_iter().map(|u| u.id).collect::<Vec<_>>();

    assert_eq!(
        ids(users_for_party(&fx.db, fx.party_id).await.unwrap()),
        vec![a.id, b.id, c.id]
    );
    assert_eq!(
        ids(users_for_state(&fx.db, fx.state_id).await.unwrap()),
        vec![a.id, c.id]
    );
    assert_eq!(
        ids(users_for_state(&fx.db, other_state.state_id).await.unwrap()),
        vec![b.id]
    );
    assert_eq!(ids(list_users(&fx.db).await.unwrap()), vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn test_delete_user_and_reference_rows() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "ada@example.com"))
        .await
        .unwrap();
    let note = insert_comment(&fx.db, &comment(user.id, fx.center_id, "Accessible entrance"))
        .await
        .unwrap();

    // Referenced rows cannot be removed.
    assert!(matches!(
        delete_polling_center(&fx.db, fx.center_id).await,
        Err(DbError::ForeignKey(_))
    ));
    assert!(matches!(
        delete_user(&fx.db, user.id).await,
        Err(DbError::ForeignKey(_))
    ));

    delete_comment(&fx.db, note.comment_id).await.unwrap();
    delete_polling_center(&fx.db, fx.center_id).await.unwrap();
    assert!(list_polling_centers(&fx.db).await.unwrap().is_empty());

    assert!(matches!(
        delete_polling_hour(&fx.db, fx.state_id).await,
        Err(DbError::ForeignKey(_))
    ));

    delete_user(&fx.db, user.id).await.unwrap();
    assert!(list_users(&fx.db).await.unwrap().is_empty());
    assert!(matches!(
        delete_user(&fx.db, user.id).await,
        Err(DbError::NotFound { entity: "User", .. })
    ));

    delete_polling_hour(&fx.db, fx.state_id).await.unwrap();
    assert!(list_polling_hours(&fx.db).await.unwrap().is_empty());
    assert!(matches!(
        get_polling_hour(&fx.db, fx.state_id).await,
        Err(DbError::NotFound { entity: "PollingHour", .. })
    ));
}

#[tokio::test]
async fn test_email_stored_trimmed() {
    let fx = setup().await;
    let user = insert_user(&fx.db, &new_user(&fx, "  ada@example.com "))
        .await
        .unwrap();
    assert_eq!(user.email, "ada@example.com");

    let found = find_users_by_email(&fx.db, "ada@example.com").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, user.id);
}
