//! Database models and types.

use crate::error::{DbError, DbResult};
use crate::geo::{is_valid_latitude, is_valid_longitude};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

pub const MAX_HOURS_OF_OPERATION_LEN: usize = 50;
pub const MAX_PARTY_NAME_LEN: usize = 100;
pub const MAX_PARTY_ABBR_LEN: usize = 4;
pub const MAX_ADDRESS_LEN: usize = 300;
pub const MAX_FNAME_LEN: usize = 25;
pub const MAX_LNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 10;
pub const MAX_COMMENT_LEN: usize = 140;

/// Polling center location and opening hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PollingCenter {
    pub polling_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub hours_of_operation: String,
}

/// Polling hours for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PollingHour {
    pub state_id: i64,
    pub state_name: String,
    pub state_abbrev: String,
    pub state_hours: String,
}

/// Political party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Party {
    pub party_id: i64,
    pub political_party: String,
    pub political_party_abbr: String,
}

/// Registered user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub party_id: i64,
    pub address: String,
    /// References `pollinghours.state_id`.
    pub state: i64,
    pub fname: String,
    pub lname: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext password.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phonenum: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// User comment on a polling center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub user_id: i64,
    pub polling_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for PollingCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<PollingCenter polling_id={} lat={} lng={} hours_of_operation={}>",
            self.polling_id, self.lat, self.lng, self.hours_of_operation
        )
    }
}

impl fmt::Display for PollingHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<PollingHour state_id={} state_name={} state_hours={}>",
            self.state_id, self.state_name, self.state_hours
        )
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Party party_id={}>", self.party_id)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User user_id={} party_id={}>", self.id, self.party_id)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Comment comment_id={} user_id={} polling_id={}>",
            self.comment_id, self.user_id, self.polling_id
        )
    }
}

/// Insert payload for [`PollingCenter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPollingCenter {
    pub lat: f64,
    pub lng: f64,
    pub hours_of_operation: String,
}

impl NewPollingCenter {
    pub fn validate(&self) -> DbResult<()> {
        check_coordinates(self.lat, self.lng)?;
        check_text(
            "hours_of_operation",
            &self.hours_of_operation,
            MAX_HOURS_OF_OPERATION_LEN,
        )
    }
}

/// Insert payload for [`PollingHour`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPollingHour {
    pub state_name: String,
    pub state_abbrev: String,
    pub state_hours: String,
}

impl NewPollingHour {
    pub fn validate(&self) -> DbResult<()> {
        check_present("state_name", &self.state_name)?;
        check_present("state_abbrev", &self.state_abbrev)?;
        check_present("state_hours", &self.state_hours)
    }
}

/// Insert payload for [`Party`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParty {
    pub political_party: String,
    pub political_party_abbr: String,
}

impl NewParty {
    pub fn validate(&self) -> DbResult<()> {
        check_text("political_party", &self.political_party, MAX_PARTY_NAME_LEN)?;
        check_text(
            "political_party_abbr",
            &self.political_party_abbr,
            MAX_PARTY_ABBR_LEN,
        )
    }
}

/// Insert payload for [`User`]. The password must already be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub party_id: i64,
    pub address: String,
    pub state: i64,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password_hash: String,
    pub phonenum: String,
    pub lat: f64,
    pub lng: f64,
}

impl NewUser {
    pub fn validate(&self) -> DbResult<()> {
        check_text("address", &self.address, MAX_ADDRESS_LEN)?;
        check_text("fname", &self.fname, MAX_FNAME_LEN)?;
        check_text("lname", &self.lname, MAX_LNAME_LEN)?;
        check_text("email", self.email.trim(), MAX_EMAIL_LEN)?;
        if !self.email.contains('@') {
            return Err(DbError::validation("email", "must contain '@'"));
        }
        check_present("password_hash", &self.password_hash)?;
        check_text("phonenum", &self.phonenum, MAX_PHONE_LEN)?;
        if !self.phonenum.chars().all(|c| c.is_ascii_digit()) {
            return Err(DbError::validation("phonenum", "must contain only digits"));
        }
        check_coordinates(self.lat, self.lng)
    }
}

/// Insert payload for [`Comment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub user_id: i64,
    pub polling_id: i64,
    pub comment: String,
}

impl NewComment {
    pub fn validate(&self) -> DbResult<()> {
        check_text("comment", &self.comment, MAX_COMMENT_LEN)
    }
}

fn check_present(field: &'static str, value: &str) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Length is counted in characters, matching SQLite's `length()` on text.
fn check_text(field: &'static str, value: &str, max: usize) -> DbResult<()> {
    check_present(field, value)?;
    if value.chars().count() > max {
        return Err(DbError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

fn check_coordinates(lat: f64, lng: f64) -> DbResult<()> {
    if !is_valid_latitude(lat) {
        return Err(DbError::validation("lat", format!("{} is out of range", lat)));
    }
    if !is_valid_longitude(lng) {
        return Err(DbError::validation("lng", format!("{} is out of range", lng)));
    }
    Ok(())
}
