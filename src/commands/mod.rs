// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{ApiClient, Transport};
use crate::errors::Error;

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod exporter;
pub mod fx;
pub mod importer;
pub mod session;
pub mod settings;
pub mod transactions;

/// Commands that talk to protected endpoints need a cached session first.
pub(crate) fn require_login<T: Transport>(client: &ApiClient<T>) -> anyhow::Result<()> {
    if client.session().is_authenticated() {
        Ok(())
    } else {
        Err(Error::NotAuthenticated.into())
    }
}
