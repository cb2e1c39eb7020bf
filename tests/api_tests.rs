// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{client, logged_in_client, request_json};
use expensedesk::api::{ApiResponse, Call, Service};
use expensedesk::db::keys;
use expensedesk::errors::Error;
use expensedesk::models::Credentials;
use expensedesk::session::Route;
use reqwest::Method;
use serde_json::{Value, json};

#[test]
fn data_unwraps_envelope_or_returns_whole_body() {
    let wrapped = ApiResponse::json_body(200, &json!({"success": true, "data": {"n": 1}}));
    let v: Value = wrapped.data().unwrap();
    assert_eq!(v, json!({"n": 1}));

    let bare = ApiResponse::json_body(200, &json!({"n": 2}));
    let v: Value = bare.data().unwrap();
    assert_eq!(v, json!({"n": 2}));

    let null_data = ApiResponse::json_body(200, &json!({"data": null, "n": 3}));
    let v: Value = null_data.data().unwrap();
    assert_eq!(v["n"], 3);
}

#[test]
fn error_message_prefers_message_then_error_then_fallback() {
    let r = ApiResponse::json_body(400, &json!({"message": "Bad amount", "error": "x"}));
    assert_eq!(r.error("fallback").to_string(), "Bad amount");
    let r = ApiResponse::json_body(400, &json!({"error": "Bad Request"}));
    assert_eq!(r.error("fallback").to_string(), "Bad Request");
    let r = ApiResponse::new(502, "<html>gateway</html>");
    assert_eq!(r.error("fallback").to_string(), "fallback");
    assert_eq!(r.error("fallback").status(), Some(502));
}

#[test]
fn routes_services_to_their_base_urls() {
    let c = client();
    assert_eq!(
        c.url(Service::Auth, "/auth/login"),
        "http://auth.test/api/v1/auth/login"
    );
    assert_eq!(
        c.url(Service::Expense, "/categories"),
        "http://api.test/api/v1/categories"
    );
}

#[test]
fn authenticated_call_carries_bearer() {
    let mut c = logged_in_client();
    c.transport().push_json(200, json!({"data": []}));
    c.send(Call::get(Service::Expense, "/categories")).unwrap();
    let req = c.transport().last_request();
    assert_eq!(req.bearer.as_deref(), Some("access-1"));
    assert_eq!(req.method, Method::GET);
}

#[test]
fn unauthorized_refreshes_once_and_retries_with_new_token() {
    let mut c = logged_in_client();
    let t = c.transport();
    t.push_json(401, json!({"message": "expired"}));
    t.push_json(200, json!({"accessToken": "access-2", "refreshToken": "refresh-2"}));
    t.push_json(200, json!({"data": {"ok": true}}));

    let v: Value = c
        .fetch(Call::get(Service::Expense, "/dashboard?year=2025&month=8"), "failed")
        .unwrap();
    assert_eq!(v, json!({"ok": true}));

    let reqs = c.transport().requests();
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[1].url, "http://auth.test/api/v1/auth/refresh-token");
    assert_eq!(request_json(&reqs[1]), json!({"refreshToken": "refresh-1"}));
    assert!(reqs[1].bearer.is_none());
    assert_eq!(reqs[2].bearer.as_deref(), Some("access-2"));

    let storage = c.session().storage();
    assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("access-2"));
    assert_eq!(storage.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("refresh-2"));
}

#[test]
fn second_unauthorized_is_returned_without_another_refresh() {
    let mut c = logged_in_client();
    let t = c.transport();
    t.push_json(401, json!({}));
    t.push_json(200, json!({"accessToken": "access-2"}));
    t.push_json(401, json!({"message": "still no"}));

    let err = c
        .fetch::<Value>(Call::get(Service::Expense, "/categories"), "failed")
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(c.transport().requests().len(), 3);
    // Refresh token was not rotated, so the old one stays.
    assert_eq!(
        c.session().refresh_token().unwrap().as_deref(),
        Some("refresh-1")
    );
}

#[test]
fn failed_refresh_clears_session_and_redirects_to_login() {
    let mut c = logged_in_client();
    let t = c.transport();
    t.push_json(401, json!({}));
    t.push_json(403, json!({"message": "refresh token revoked"}));

    let err = c.send(Call::get(Service::Expense, "/categories")).unwrap_err();
    assert!(matches!(err, Error::SessionExpired { .. }));
    assert_eq!(err.redirect(), Some(Route::Login));
    assert!(!c.session().is_authenticated());
    for k in keys::SESSION {
        assert!(c.session().storage().get(k).unwrap().is_none());
    }
}

#[test]
fn missing_refresh_token_also_ends_session() {
    let mut c = logged_in_client();
    c.session().storage().remove(keys::REFRESH_TOKEN).unwrap();
    c.transport().push_json(401, json!({}));

    let err = c.send(Call::get(Service::Expense, "/categories")).unwrap_err();
    assert_eq!(err.redirect(), Some(Route::Login));
    assert_eq!(c.transport().requests().len(), 1);
}

#[test]
fn public_calls_never_refresh() {
    let mut c = logged_in_client();
    c.transport().push_json(401, json!({"message": "Invalid credentials"}));
    let resp = c
        .send(Call::post(Service::Auth, "/auth/login").public())
        .unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(c.transport().requests().len(), 1);
    assert!(c.transport().last_request().bearer.is_none());
    assert!(c.session().is_authenticated());
}

#[test]
fn login_persists_session() {
    let mut c = client();
    c.transport().push_json(
        200,
        json!({
            "accessToken": "a", "refreshToken": "r", "tokenType": "Bearer",
            "user": {"id": 3, "firstName": "Grace", "lastName": "Hopper", "email": "grace@example.com"}
        }),
    );
    let session = c
        .login(&Credentials {
            email: "grace@example.com".into(),
            password: "secret".into(),
        })
        .unwrap();
    assert_eq!(session.user.display_name(), "Grace Hopper");
    assert!(c.session().is_authenticated());
    assert_eq!(c.session().access_token().unwrap().as_deref(), Some("a"));

    let req = c.transport().last_request();
    assert_eq!(req.url, "http://auth.test/api/v1/auth/login");
    assert_eq!(
        request_json(&req),
        json!({"email": "grace@example.com", "password": "secret"})
    );
}

#[test]
fn login_failure_surfaces_backend_message_or_fallback() {
    let mut c = client();
    c.transport().push_json(401, json!({"error": "Bad credentials"}));
    let creds = Credentials {
        email: "grace@example.com".into(),
        password: "nope".into(),
    };
    let err = c.login(&creds).unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(err.to_string(), "Bad credentials");

    c.transport().push_network_error();
    let err = c.login(&creds).unwrap_err();
    assert_eq!(err.to_string(), "Login failed. Please check your credentials.");
    assert!(!c.session().is_authenticated());
}

#[test]
fn invalid_login_form_sends_nothing() {
    let mut c = client();
    let err = c
        .login(&Credentials {
            email: "not-an-email".into(),
            password: String::new(),
        })
        .unwrap_err();
    let Error::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert_eq!(fields.get("email"), Some("Please enter a valid email address"));
    assert_eq!(fields.get("password"), Some("Password is required"));
    assert!(c.transport().requests().is_empty());
}

#[test]
fn recovery_flows_hit_auth_endpoints() {
    let mut c = client();
    let t = c.transport();
    t.push_json(200, json!({"message": "Verified"}));
    t.push_raw(200, b"");
    t.push_json(200, json!({"message": "sent"}));

    let msg = c.verify_email("tok 1").unwrap();
    assert_eq!(msg.message.as_deref(), Some("Verified"));
    c.resend_verification("ada@example.com").unwrap();
    c.forgot_password("ada@example.com").unwrap();

    let reqs = c.transport().requests();
    assert_eq!(reqs[0].url, "http://auth.test/api/v1/auth/verify-email/tok%201");
    assert_eq!(
        reqs[1].url,
        "http://auth.test/api/v1/auth/resend-verification/ada@example.com"
    );
    assert_eq!(request_json(&reqs[2]), json!({"email": "ada@example.com"}));
}

#[test]
fn logout_is_local_only() {
    let mut c = logged_in_client();
    let route = c.logout().unwrap();
    assert_eq!(route, Route::Landing);
    assert!(c.transport().requests().is_empty());
    assert!(c.session().access_token().unwrap().is_none());
}
