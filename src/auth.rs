// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Authentication flows against the auth service.

use serde_json::json;
use tracing::info;

use crate::api::{ApiClient, Call, Service, Transport};
use crate::errors::{Error, Result};
use crate::forms::{PasswordReset, validate_email_only, validate_login, validate_registration, validate_reset};
use crate::models::{ApiMessage, AuthResponse, Credentials, Registration, Session};
use crate::session::Route;
use crate::utils::encode_segment;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const VERIFY_FAILED: &str = "Email verification failed.";
const RESEND_FAILED: &str = "Failed to resend verification email.";
const FORGOT_FAILED: &str = "Failed to send password reset email.";
const RESET_FAILED: &str = "Failed to reset password.";

/// Turns any service failure into an `Auth` error carrying a usable message.
fn auth_error(err: Error, fallback: &str) -> Error {
    match err {
        Error::Api { message, .. } => Error::Auth(message),
        Error::Network(_) | Error::Decode(_) => Error::Auth(fallback.to_string()),
        other => other,
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn login(&mut self, credentials: &Credentials) -> Result<Session> {
        validate_login(credentials)?;
        info!(email = %credentials.email, "logging in");
        let call = Call::post(Service::Auth, "/auth/login")
            .public()
            .json(credentials)?;
        let resp: AuthResponse = self
            .send(call)
            .and_then(|r| r.ensure_success(LOGIN_FAILED))
            .and_then(|r| r.json())
            .map_err(|e| auth_error(e, LOGIN_FAILED))?;
        let session = Session {
            user: resp.user,
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        };
        self.session_mut().establish(&session)?;
        Ok(session)
    }

    /// Registers an account. Does not log in; the backend sends a
    /// verification email first.
    pub fn register(&mut self, registration: &Registration) -> Result<ApiMessage> {
        validate_registration(registration)?;
        info!(email = %registration.email, "registering user");
        let call = Call::post(Service::Auth, "/auth/register")
            .public()
            .json(registration)?;
        self.ack(call, REGISTER_FAILED)
    }

    /// Local logout; there is no server-side revocation.
    pub fn logout(&mut self) -> Result<Route> {
        self.session_mut().logout()
    }

    pub fn verify_email(&mut self, token: &str) -> Result<ApiMessage> {
        let call = Call::get(
            Service::Auth,
            format!("/auth/verify-email/{}", encode_segment(token.trim())),
        )
        .public();
        self.ack(call, VERIFY_FAILED)
    }

    pub fn resend_verification(&mut self, email: &str) -> Result<ApiMessage> {
        validate_email_only(email)?;
        let call = Call::post(
            Service::Auth,
            format!("/auth/resend-verification/{}", encode_segment(email.trim())),
        )
        .public();
        self.ack(call, RESEND_FAILED)
    }

    pub fn forgot_password(&mut self, email: &str) -> Result<ApiMessage> {
        validate_email_only(email)?;
        let call = Call::post(Service::Auth, "/auth/forgot-password")
            .public()
            .json(&json!({ "email": email.trim() }))?;
        self.ack(call, FORGOT_FAILED)
    }

    pub fn reset_password(&mut self, token: &str, reset: &PasswordReset) -> Result<ApiMessage> {
        if token.trim().is_empty() {
            return Err(Error::validation("token", "Invalid or missing reset token"));
        }
        validate_reset(reset)?;
        let call = Call::post(
            Service::Auth,
            format!("/auth/reset-password/{}", encode_segment(token.trim())),
        )
        .public()
        .json(reset)?;
        self.ack(call, RESET_FAILED)
    }

    fn ack(&mut self, call: Call, fallback: &str) -> Result<ApiMessage> {
        let resp = self
            .send(call)
            .and_then(|r| r.ensure_success(fallback))
            .map_err(|e| auth_error(e, fallback))?;
        // Some endpoints answer with plain text or an empty body.
        Ok(resp.json::<ApiMessage>().unwrap_or_default())
    }
}
