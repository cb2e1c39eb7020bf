// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! HTTP plumbing shared by every service call.
//!
//! Requests flow through a [`Transport`] so the client can be driven by
//! `reqwest` in the binary and by scripted fakes in tests. Authenticated
//! calls that come back 401 get exactly one refresh-and-retry; a failed
//! refresh ends the local session.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::models::RefreshResponse;
use crate::session::{Route, SessionStore};
use crate::utils::http_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Expense,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart {
        field: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Body,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_body(status: u16, v: &Value) -> Self {
        Self::new(status, v.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Payload of a `{ data }` envelope, or the whole body when unwrapped.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        let v: Value = self.json()?;
        let inner = match v {
            Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(inner).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Backend `message`, else `error`, from a JSON error body.
    pub fn message(&self) -> Option<String> {
        let v: Value = serde_json::from_slice(&self.body).ok()?;
        ["message", "error"]
            .iter()
            .filter_map(|k| v.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Normalizes a failed response into an error, using `fallback` when
    /// the backend gave no message.
    pub fn error(&self, fallback: &str) -> Error {
        Error::Api {
            status: self.status,
            message: self.message().unwrap_or_else(|| fallback.to_string()),
        }
    }

    pub fn ensure_success(self, fallback: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.error(fallback))
        }
    }
}

pub trait Transport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// `reqwest` blocking transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout)?,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, req: &ApiRequest) -> Result<ApiResponse> {
        let mut rb = self.client.request(req.method.clone(), &req.url);
        if let Some(token) = &req.bearer {
            rb = rb.bearer_auth(token);
        }
        if let Some(t) = req.timeout {
            rb = rb.timeout(t);
        }
        rb = match &req.body {
            Body::Empty => rb,
            Body::Json(v) => rb.json(v),
            Body::Multipart {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                rb.multipart(Form::new().part(field.clone(), part))
            }
        };
        debug!(method = %req.method, url = %req.url, "sending request");
        let resp = rb.send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?.to_vec();
        if !(200..300).contains(&status) {
            warn!(status, url = %req.url, "request failed");
        }
        Ok(ApiResponse { status, body })
    }
}

/// Describes one call before the client fills in URL and credentials.
#[derive(Debug, Clone)]
pub struct Call {
    pub service: Service,
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub authenticated: bool,
    pub timeout: Option<Duration>,
}

impl Call {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            body: Body::Empty,
            authenticated: true,
            timeout: None,
        }
    }

    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::GET, path)
    }

    pub fn post(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::POST, path)
    }

    pub fn put(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::PUT, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Public endpoints never carry a bearer token and never refresh.
    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn timeout(mut self, t: Duration) -> Self {
        self.timeout = Some(t);
        self
    }
}

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    config: Config,
    session: SessionStore,
}

impl ApiClient<HttpTransport> {
    pub fn connect(config: Config, session: SessionStore) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config, session))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: Config, session: SessionStore) -> Self {
        Self {
            transport,
            config,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }

    pub fn url(&self, service: Service, path: &str) -> String {
        let base = match service {
            Service::Auth => &self.config.auth_url,
            Service::Expense => &self.config.api_url,
        };
        format!("{}{}", base, path)
    }

    /// Sends `call`, refreshing the access token once on a 401.
    pub fn send(&mut self, call: Call) -> Result<ApiResponse> {
        let bearer = if call.authenticated {
            self.session.access_token()?
        } else {
            None
        };
        let mut req = ApiRequest {
            method: call.method,
            url: self.url(call.service, &call.path),
            bearer,
            body: call.body,
            timeout: call.timeout,
        };
        let resp = self.transport.execute(&req)?;
        if resp.status != 401 || req.bearer.is_none() {
            return Ok(resp);
        }

        match self.refresh_access_token() {
            Ok(token) => {
                debug!(url = %req.url, "retrying after token refresh");
                req.bearer = Some(token);
                self.transport.execute(&req)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, ending session");
                self.session.clear()?;
                Err(Error::SessionExpired {
                    redirect: Route::Login,
                })
            }
        }
    }

    fn refresh_access_token(&mut self) -> Result<String> {
        let refresh = self
            .session
            .refresh_token()?
            .ok_or(Error::NotAuthenticated)?;
        let req = ApiRequest {
            method: Method::POST,
            url: self.url(Service::Auth, "/auth/refresh-token"),
            bearer: None,
            body: Body::Json(json!({ "refreshToken": refresh })),
            timeout: None,
        };
        let resp = self
            .transport
            .execute(&req)?
            .ensure_success("Token refresh failed")?;
        let tokens: RefreshResponse = resp.json()?;
        self.session
            .rotate_tokens(&tokens.access_token, tokens.refresh_token.as_deref())?;
        Ok(tokens.access_token)
    }

    /// Sends `call` and decodes the `{ data }` payload of a 2xx answer.
    pub fn fetch<R: DeserializeOwned>(&mut self, call: Call, fallback: &str) -> Result<R> {
        self.send(call)?.ensure_success(fallback)?.data()
    }
}
