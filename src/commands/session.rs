// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::session::SessionStore;
use crate::utils::pretty_table;

pub fn handle(session: &mut SessionStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", _)) => {
            match session.user() {
                Some(u) => println!("Logged in as {} <{}>", u.display_name(), u.email),
                None => println!("Not logged in"),
            }
            let rows: Vec<Vec<String>> = session
                .storage()
                .entries()?
                .into_iter()
                .map(|(k, at)| vec![k, at])
                .collect();
            if !rows.is_empty() {
                println!("{}", pretty_table(&["Key", "Updated"], rows));
            }
        }
        Some(("reset", _)) => {
            let route = session.reset_all()?;
            println!(
                "Session and local preferences cleared. Log in again with `expensedesk auth login` ({}).",
                route
            );
        }
        _ => {}
    }
    Ok(())
}
