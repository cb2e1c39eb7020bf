// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod expenses;
pub mod forms;
pub mod import;
pub mod models;
pub mod notify;
pub mod preferences;
pub mod session;
pub mod users;
pub mod utils;
