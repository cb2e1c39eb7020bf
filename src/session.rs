// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Explicit session lifecycle.
//!
//! A [`SessionStore`] is built once from persisted storage, updated on
//! login and logout, and handed to whoever needs the current user. It is the
//! only owner of the token keys in storage.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::db::{Storage, keys};
use crate::errors::Result;
use crate::models::{Session, User, UserPatch};

/// Navigation target returned instead of performing a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    Landing,
    Login,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(User),
}

pub struct SessionStore {
    storage: Storage,
    state: AuthState,
}

impl SessionStore {
    /// Restores the session synchronously from a cached token + user pair.
    ///
    /// A cached user that is not valid JSON, or a token without its user
    /// (or the reverse), wipes the session keys.
    pub fn init(storage: Storage) -> Result<Self> {
        let token = storage.get(keys::ACCESS_TOKEN)?;
        let user_raw = storage.get(keys::USER)?;
        let user = match (token, user_raw) {
            (Some(_), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "invalid cached user, clearing session");
                    None
                }
            },
            (None, None) => return Ok(Self::unauthenticated(storage)),
            _ => {
                warn!("incomplete cached session, clearing session");
                None
            }
        };
        match user {
            Some(user) => Ok(Self {
                storage,
                state: AuthState::Authenticated(user),
            }),
            None => {
                for k in keys::SESSION {
                    storage.remove(k)?;
                }
                Ok(Self::unauthenticated(storage))
            }
        }
    }

    fn unauthenticated(storage: Storage) -> Self {
        Self {
            storage,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(u) => Some(u),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.storage.get(keys::ACCESS_TOKEN)?)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.storage.get(keys::REFRESH_TOKEN)?)
    }

    /// Persists a fresh login and switches to the authenticated state.
    pub fn establish(&mut self, session: &Session) -> Result<()> {
        self.storage.set(keys::ACCESS_TOKEN, &session.access_token)?;
        match &session.refresh_token {
            Some(t) => self.storage.set(keys::REFRESH_TOKEN, t)?,
            None => self.storage.remove(keys::REFRESH_TOKEN)?,
        }
        self.storage
            .set(keys::USER, &serde_json::to_string(&session.user)?)?;
        debug!(email = %session.user.email, "session established");
        self.state = AuthState::Authenticated(session.user.clone());
        Ok(())
    }

    /// Stores tokens handed out by the refresh endpoint.
    pub fn rotate_tokens(&mut self, access: &str, refresh: Option<&str>) -> Result<()> {
        self.storage.set(keys::ACCESS_TOKEN, access)?;
        if let Some(r) = refresh {
            self.storage.set(keys::REFRESH_TOKEN, r)?;
        }
        Ok(())
    }

    /// Merges `patch` into the cached user and persists it.
    pub fn update_user(&mut self, patch: UserPatch) -> Result<Option<User>> {
        let AuthState::Authenticated(user) = &mut self.state else {
            return Ok(None);
        };
        if let Some(v) = patch.first_name {
            user.first_name = v;
        }
        if let Some(v) = patch.last_name {
            user.last_name = v;
        }
        if let Some(v) = patch.email {
            user.email = v;
        }
        self.storage.set(keys::USER, &serde_json::to_string(user)?)?;
        Ok(Some(user.clone()))
    }

    /// Clears tokens and user. Preferences survive.
    pub fn clear(&mut self) -> Result<()> {
        for k in keys::SESSION {
            self.storage.remove(k)?;
        }
        self.state = AuthState::Unauthenticated;
        Ok(())
    }

    /// Ends the session locally and returns the entry page.
    pub fn logout(&mut self) -> Result<Route> {
        self.clear()?;
        Ok(Route::Landing)
    }

    /// Recovery action of the top-level error boundary: wipe everything.
    pub fn reset_all(&mut self) -> Result<Route> {
        self.storage.clear()?;
        self.state = AuthState::Unauthenticated;
        Ok(Route::Login)
    }
}
