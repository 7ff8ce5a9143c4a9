//! Registration and credential checks.

use crate::hasher::PasswordHasher;
use crate::{AuthError, AuthResult};
use tracing::{debug, info, warn};
use votings_db::models::NewUser;
use votings_db::repository::{find_users_by_email, insert_user, update_user_password_hash};
use votings_db::{DbPool, User};

/// Sign-up form with the plaintext password.
#[derive(Clone)]
pub struct Registration {
    pub party_id: i64,
    pub address: String,
    pub state: i64,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub phonenum: String,
    pub lat: f64,
    pub lng: f64,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("party_id", &self.party_id)
            .field("state", &self.state)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Create a user, storing only the password hash.
pub async fn register_user(
    db: &DbPool,
    hasher: &dyn PasswordHasher,
    registration: Registration,
) -> AuthResult<User> {
    if registration.password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    let password_hash = hasher.hash(&registration.password)?;

    let new_user = NewUser {
        party_id: registration.party_id,
        address: registration.address,
        state: registration.state,
        fname: registration.fname,
        lname: registration.lname,
        email: registration.email,
        password_hash,
        phonenum: registration.phonenum,
        lat: registration.lat,
        lng: registration.lng,
    };

    Ok(insert_user(db, &new_user).await?)
}

/// Check an email and password.
///
/// Email is not unique, so every user with the address is tried in id order
/// and the first whose hash matches wins.
pub async fn authenticate(
    db: &DbPool,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> AuthResult<Option<User>> {
    let candidates = find_users_by_email(db, email).await?;
    debug!("Found {} account(s) for login attempt", candidates.len());

    for user in candidates {
        match hasher.verify(password, &user.password_hash) {
            Ok(true) => {
                info!(user_id = user.id, "User authenticated");
                return Ok(Some(user));
            }
            Ok(false) => {}
            Err(e) => warn!(user_id = user.id, "Unreadable password hash: {}", e),
        }
    }

    Ok(None)
}

/// Replace a user's password.
pub async fn change_password(
    db: &DbPool,
    hasher: &dyn PasswordHasher,
    user_id: i64,
    new_password: &str,
) -> AuthResult<()> {
    if new_password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    let hash = hasher.hash(new_password)?;
    update_user_password_hash(db, user_id, &hash).await?;
    info!(user_id, "Password changed");
    Ok(())
}
