//! Client session: credential token plus the server-verified identity.
//!
//! The identity here is only ever set from a verified auth response
//! (login, signup, or a revalidated `/api/users/me`), so anything keyed
//! off it — the cart key in particular — cannot be steered by editing
//! locally stored data.

use serde::{Deserialize, Serialize};

use crate::models::Identity;

/// What gets persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: Identity,
}

/// Current authentication state.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<StoredSession>,
}

impl Session {
    pub fn login(&mut self, token: String, user: Identity) {
        self.current = Some(StoredSession { token, user });
    }

    pub fn logout(&mut self) {
        self.current = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn user(&self) -> Option<&Identity> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.user().map(|u| u.email.as_str())
    }

    /// Snapshot for persistence.
    pub fn stored(&self) -> Option<&StoredSession> {
        self.current.as_ref()
    }
}
