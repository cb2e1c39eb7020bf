// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, Call, Service, Transport};
use crate::errors::{Error, Result};
use crate::forms::{PasswordChange, validate_password_change};
use crate::models::{User, UserPatch};

const PROFILE_LOAD_FAILED: &str = "Failed to load profile";
const PROFILE_FAILED: &str = "Failed to update profile";
const PASSWORD_FAILED: &str = "Failed to update password";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn get_profile(&mut self) -> Result<User> {
        self.fetch(Call::get(Service::Expense, "/api/users/profile"), PROFILE_LOAD_FAILED)
    }

    /// Saves the names remotely, then mirrors them into the cached user.
    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut errors = crate::errors::FieldErrors::default();
        if update.first_name.trim().is_empty() {
            errors.insert("firstName", "First name is required");
        }
        if update.last_name.trim().is_empty() {
            errors.insert("lastName", "Last name is required");
        }
        errors.into_result()?;

        let call = Call::put(Service::Expense, "/api/users/profile").json(update)?;
        self.send(call)?.ensure_success(PROFILE_FAILED)?;
        info!("profile updated");
        self.session_mut().update_user(UserPatch {
            first_name: Some(update.first_name.trim().to_string()),
            last_name: Some(update.last_name.trim().to_string()),
            email: None,
        })
    }

    pub fn change_password(&mut self, change: &PasswordChange) -> Result<()> {
        validate_password_change(change)?;
        if !self.session().is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        let call = Call::put(Service::Expense, "/api/users/change-password").json(change)?;
        self.send(call)?.ensure_success(PASSWORD_FAILED)?;
        info!("password changed");
        Ok(())
    }
}
