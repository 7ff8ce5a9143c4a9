//! Login-session user abstraction.
//!
//! A session layer stores only [`AuthUser::get_id`] and resolves it back to a
//! user through a [`UserLoader`] on each request.

use crate::AuthResult;
use async_trait::async_trait;
use votings_db::repository::find_user;
use votings_db::{DbPool, User};

/// Properties a session layer needs from the current user.
pub trait AuthUser {
    /// Stable identifier stored in the session.
    fn get_id(&self) -> String;

    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        true
    }

    fn is_anonymous(&self) -> bool {
        false
    }
}

impl AuthUser for User {
    fn get_id(&self) -> String {
        self.id.to_string()
    }
}

/// Visitor without a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnonymousUser;

impl AuthUser for AnonymousUser {
    fn get_id(&self) -> String {
        String::new()
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

/// Resolves a session id back to a user.
#[async_trait]
pub trait UserLoader: Send + Sync {
    /// Load the user for a session id.
    ///
    /// # Returns
    /// `None` if the id is malformed or no such user exists.
    async fn load_user(&self, id: &str) -> AuthResult<Option<User>>;
}

#[async_trait]
impl UserLoader for DbPool {
    async fn load_user(&self, id: &str) -> AuthResult<Option<User>> {
        let Ok(id) = id.trim().parse::<i64>() else {
            return Ok(None);
        };
        Ok(find_user(self, id).await?)
    }
}
