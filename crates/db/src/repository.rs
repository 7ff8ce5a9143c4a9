//! Queries for polling centers, polling hours, parties, users and comments.
//!
//! Every insert validates its payload before touching the database and
//! returns the stored row.

use crate::error::{DbError, DbResult};
use crate::geo::{haversine_km, is_valid_latitude, is_valid_longitude};
use crate::models::{
    Comment, NewComment, NewParty, NewPollingCenter, NewPollingHour, NewUser, Party,
    PollingCenter, PollingHour, User,
};
use crate::pool::DbPool;
use tracing::{debug, info};

const USER_COLUMNS: &str = "id, party_id, address, state, fname, lname, email, password_hash, \
                            phonenum, lat, lng, created_at";
const COMMENT_COLUMNS: &str = "comment_id, user_id, polling_id, comment, created_at";

async fn delete_by_id(db: &DbPool, sql: &str, entity: &'static str, id: i64) -> DbResult<()> {
    let result = sqlx::query(sql).bind(id).execute(db.pool()).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found(entity, id));
    }
    debug!("Deleted {} {}", entity, id);
    Ok(())
}

// Polling centers

pub async fn insert_polling_center(
    db: &DbPool,
    new: &NewPollingCenter,
) -> DbResult<PollingCenter> {
    new.validate()?;
    let result = sqlx::query(
        "INSERT INTO pollingcenters (lat, lng, hours_of_operation) VALUES (?, ?, ?)",
    )
    .bind(new.lat)
    .bind(new.lng)
    .bind(&new.hours_of_operation)
    .execute(db.pool())
    .await?;

    let polling_id = result.last_insert_rowid();
    debug!("Inserted polling center {}", polling_id);
    get_polling_center(db, polling_id).await
}

pub async fn get_polling_center(db: &DbPool, polling_id: i64) -> DbResult<PollingCenter> {
    sqlx::query_as::<_, PollingCenter>(
        "SELECT polling_id, lat, lng, hours_of_operation FROM pollingcenters WHERE polling_id = ?",
    )
    .bind(polling_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or_else(|| DbError::not_found("PollingCenter", polling_id))
}

pub async fn list_polling_centers(db: &DbPool) -> DbResult<Vec<PollingCenter>> {
    let centers = sqlx::query_as::<_, PollingCenter>(
        "SELECT polling_id, lat, lng, hours_of_operation FROM pollingcenters ORDER BY polling_id",
    )
    .fetch_all(db.pool())
    .await?;
    Ok(centers)
}

pub async fn delete_polling_center(db: &DbPool, polling_id: i64) -> DbResult<()> {
    delete_by_id(
        db,
        "DELETE FROM pollingcenters WHERE polling_id = ?",
        "PollingCenter",
        polling_id,
    )
    .await
}

/// Find the polling centers closest to a point.
///
/// # Arguments
/// * `lat` / `lng` - Reference point in degrees
/// * `limit` - Maximum number of centers to return
///
/// # Returns
/// Centers paired with their great-circle distance in kilometres, nearest first
pub async fn nearest_polling_centers(
    db: &DbPool,
    lat: f64,
    lng: f64,
    limit: usize,
) -> DbResult<Vec<(PollingCenter, f64)>> {
    if !is_valid_latitude(lat) {
        return Err(DbError::validation("lat", format!("{} is out of range", lat)));
    }
    if !is_valid_longitude(lng) {
        return Err(DbError::validation("lng", format!("{} is out of range", lng)));
    }

    let mut ranked: Vec<(PollingCenter, f64)> = list_polling_centers(db)
        .await?
        .into_iter()
        .map(|center| {
            let distance = haversine_km(lat, lng, center.lat, center.lng);
            (center, distance)
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| a.0.polling_id.cmp(&b.0.polling_id))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

// Polling hours

pub async fn insert_polling_hour(db: &DbPool, new: &NewPollingHour) -> DbResult<PollingHour> {
    new.validate()?;
    let result = sqlx::query(
        "INSERT INTO pollinghours (state_name, state_abbrev, state_hours) VALUES (?, ?, ?)",
    )
    .bind(&new.state_name)
    .bind(&new.state_abbrev)
    .bind(&new.state_hours)
    .execute(db.pool())
    .await?;

    get_polling_hour(db, result.last_insert_rowid()).await
}

pub async fn get_polling_hour(db: &DbPool, state_id: i64) -> DbResult<PollingHour> {
    sqlx::query_as::<_, PollingHour>(
        "SELECT state_id, state_name, state_abbrev, state_hours FROM pollinghours WHERE state_id = ?",
    )
    .bind(state_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or_else(|| DbError::not_found("PollingHour", state_id))
}

pub async fn list_polling_hours(db: &DbPool) -> DbResult<Vec<PollingHour>> {
    let hours = sqlx::query_as::<_, PollingHour>(
        "SELECT state_id, state_name, state_abbrev, state_hours FROM pollinghours ORDER BY state_id",
    )
    .fetch_all(db.pool())
    .await?;
    Ok(hours)
}

/// Look up a state's polling hours by its abbreviation, ignoring case.
pub async fn find_polling_hours_by_abbrev(
    db: &DbPool,
    abbrev: &str,
) -> DbResult<Option<PollingHour>> {
    let hour = sqlx::query_as::<_, PollingHour>(
        "SELECT state_id, state_name, state_abbrev, state_hours FROM pollinghours \
         WHERE upper(state_abbrev) = upper(?) ORDER BY state_id LIMIT 1",
    )
    .bind(abbrev.trim())
    .fetch_optional(db.pool())
    .await?;
    Ok(hour)
}

pub async fn delete_polling_hour(db: &DbPool, state_id: i64) -> DbResult<()> {
    delete_by_id(
        db,
        "DELETE FROM pollinghours WHERE state_id = ?",
        "PollingHour",
        state_id,
    )
    .await
}

// Parties

pub async fn insert_party(db: &DbPool, new: &NewParty) -> DbResult<Party> {
    new.validate()?;
    let result = sqlx::query(
        "INSERT INTO parties (political_party, political_party_abbr) VALUES (?, ?)",
    )
    .bind(&new.political_party)
    .bind(&new.political_party_abbr)
    .execute(db.pool())
    .await?;

    get_party(db, result.last_insert_rowid()).await
}

pub async fn get_party(db: &DbPool, party_id: i64) -> DbResult<Party> {
    sqlx::query_as::<_, Party>(
        "SELECT party_id, political_party, political_party_abbr FROM parties WHERE party_id = ?",
    )
    .bind(party_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or_else(|| DbError::not_found("Party", party_id))
}

pub async fn list_parties(db: &DbPool) -> DbResult<Vec<Party>> {
    let parties = sqlx::query_as::<_, Party>(
        "SELECT party_id, political_party, political_party_abbr FROM parties ORDER BY party_id",
    )
    .fetch_all(db.pool())
    .await?;
    Ok(parties)
}

pub async fn delete_party(db: &DbPool, party_id: i64) -> DbResult<()> {
    delete_by_id(db, "DELETE FROM parties WHERE party_id = ?", "Party", party_id).await
}

// Users

/// Insert a user. The email is stored trimmed so lookups can match it.
pub async fn insert_user(db: &DbPool, new: &NewUser) -> DbResult<User> {
    new.validate()?;
    let result = sqlx::query(
        r#"
        INSERT INTO users (
            party_id, address, state, fname, lname, email, password_hash, phonenum, lat, lng
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.party_id)
    .bind(&new.address)
    .bind(new.state)
    .bind(&new.fname)
    .bind(&new.lname)
    .bind(new.email.trim())
    .bind(&new.password_hash)
    .bind(&new.phonenum)
    .bind(new.lat)
    .bind(new.lng)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    info!(user_id = id, party_id = new.party_id, "Created user");
    get_user(db, id).await
}

pub async fn get_user(db: &DbPool, id: i64) -> DbResult<User> {
    find_user(db, id)
        .await?
        .ok_or_else(|| DbError::not_found("User", id))
}

pub async fn find_user(db: &DbPool, id: i64) -> DbResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;
    Ok(user)
}

pub async fn list_users(db: &DbPool) -> DbResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(db.pool()).await?;
    Ok(users)
}

/// All users registered with an email address, oldest first.
///
/// Email is not unique, so more than one user can match.
pub async fn find_users_by_email(db: &DbPool, email: &str) -> DbResult<Vec<User>> {
    let sql = format!(
        "SELECT {} FROM users WHERE email = ? COLLATE NOCASE ORDER BY id",
        USER_COLUMNS
    );
    let users = sqlx::query_as::<_, User>(&sql)
        .bind(email.trim())
        .fetch_all(db.pool())
        .await?;
    Ok(users)
}

pub async fn update_user_password_hash(db: &DbPool, id: i64, password_hash: &str) -> DbResult<()> {
    if password_hash.is_empty() {
        return Err(DbError::validation("password_hash", "must not be empty"));
    }
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(db.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found("User", id));
    }
    Ok(())
}

pub async fn delete_user(db: &DbPool, id: i64) -> DbResult<()> {
    delete_by_id(db, "DELETE FROM users WHERE id = ?", "User", id).await
}

/// Members of a party, ordered by user id.
pub async fn users_for_party(db: &DbPool, party_id: i64) -> DbResult<Vec<User>> {
    let sql = format!(
        "SELECT {} FROM users WHERE party_id = ? ORDER BY id",
        USER_COLUMNS
    );
    let users = sqlx::query_as::<_, User>(&sql)
        .bind(party_id)
        .fetch_all(db.pool())
        .await?;
    Ok(users)
}

/// Users living in a state, ordered by user id.
pub async fn users_for_state(db: &DbPool, state_id: i64) -> DbResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users WHERE state = ? ORDER BY id", USER_COLUMNS);
    let users = sqlx::query_as::<_, User>(&sql)
        .bind(state_id)
        .fetch_all(db.pool())
        .await?;
    Ok(users)
}

pub async fn party_for_user(db: &DbPool, user: &User) -> DbResult<Party> {
    get_party(db, user.party_id).await
}

pub async fn polling_hours_for_user(db: &DbPool, user: &User) -> DbResult<PollingHour> {
    get_polling_hour(db, user.state).await
}

// Comments

pub async fn insert_comment(db: &DbPool, new: &NewComment) -> DbResult<Comment> {
    new.validate()?;
    let result = sqlx::query("INSERT INTO comments (user_id, polling_id, comment) VALUES (?, ?, ?)")
        .bind(new.user_id)
        .bind(new.polling_id)
        .bind(&new.comment)
        .execute(db.pool())
        .await?;

    let comment_id = result.last_insert_rowid();
    info!(
        comment_id,
        user_id = new.user_id,
        polling_id = new.polling_id,
        "Posted comment"
    );
    get_comment(db, comment_id).await
}

pub async fn get_comment(db: &DbPool, comment_id: i64) -> DbResult<Comment> {
    let sql = format!("SELECT {} FROM comments WHERE comment_id = ?", COMMENT_COLUMNS);
    sqlx::query_as::<_, Comment>(&sql)
        .bind(comment_id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| DbError::not_found("Comment", comment_id))
}

pub async fn list_comments(db: &DbPool) -> DbResult<Vec<Comment>> {
    let sql = format!("SELECT {} FROM comments ORDER BY comment_id", COMMENT_COLUMNS);
    let comments = sqlx::query_as::<_, Comment>(&sql)
        .fetch_all(db.pool())
        .await?;
    Ok(comments)
}

pub async fn delete_comment(db: &DbPool, comment_id: i64) -> DbResult<()> {
    delete_by_id(
        db,
        "DELETE FROM comments WHERE comment_id = ?",
        "Comment",
        comment_id,
    )
    .await
}

/// Comments left on a polling center, ordered by author then comment id.
pub async fn comments_for_center(db: &DbPool, polling_id: i64) -> DbResult<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments WHERE polling_id = ? ORDER BY user_id, comment_id",
        COMMENT_COLUMNS
    );
    let comments = sqlx::query_as::<_, Comment>(&sql)
        .bind(polling_id)
        .fetch_all(db.pool())
        .await?;
    Ok(comments)
}

/// Comments written by a user, ordered by comment id.
pub async fn comments_for_user(db: &DbPool, user_id: i64) -> DbResult<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments WHERE user_id = ? ORDER BY comment_id",
        COMMENT_COLUMNS
    );
    let comments = sqlx::query_as::<_, Comment>(&sql)
        .bind(user_id)
        .fetch_all(db.pool())
        .await?;
    Ok(comments)
}

pub async fn center_for_comment(db: &DbPool, comment: &Comment) -> DbResult<PollingCenter> {
    get_polling_center(db, comment.polling_id).await
}

pub async fn user_for_comment(db: &DbPool, comment: &Comment) -> DbResult<User> {
    get_user(db, comment.user_id).await
}
