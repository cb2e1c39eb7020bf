// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use expensedesk::api::{ApiClient, ApiRequest, ApiResponse, Transport};
use expensedesk::config::Config;
use expensedesk::currency::{RateSource, RateTable};
use expensedesk::db::Storage;
use expensedesk::errors::{Error, Result};
use expensedesk::models::{Session, User};
use expensedesk::session::SessionStore;
use serde_json::Value;

/// Replays scripted responses in order and records every request.
#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<VecDeque<Result<ApiResponse>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn push_json(&self, status: u16, body: Value) {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::json_body(status, &body)));
    }

    pub fn push_raw(&self, status: u16, body: &[u8]) {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::new(status, body.to_vec())));
    }

    pub fn push_network_error(&self) {
        self.responses
            .borrow_mut()
            .push_back(Err(Error::Network("connection refused".into())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests.borrow().last().cloned().unwrap()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("no scripted response".into())))
    }
}

pub struct FakeRates(pub Option<RateTable>);

impl RateSource for FakeRates {
    fn latest(&self, _base: &str) -> Result<RateTable> {
        self.0
            .clone()
            .ok_or_else(|| Error::Network("rates offline".into()))
    }
}

pub fn config() -> Config {
    Config::default()
        .with_overrides(Some("http://auth.test/api/v1"), Some("http://api.test/api/v1"))
        .unwrap()
}

pub fn user() -> User {
    User {
        id: 7,
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

pub fn client() -> ApiClient<FakeTransport> {
    let session = SessionStore::init(Storage::in_memory().unwrap()).unwrap();
    ApiClient::new(FakeTransport::default(), config(), session)
}

pub fn logged_in_client() -> ApiClient<FakeTransport> {
    let mut c = client();
    c.session_mut()
        .establish(&Session {
            user: user(),
            access_token: "access-1".into(),
            refresh_token: Some("refresh-1".into()),
        })
        .unwrap();
    c
}

pub fn request_json(req: &ApiRequest) -> Value {
    match &req.body {
        expensedesk::api::Body::Json(v) => v.clone(),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}
