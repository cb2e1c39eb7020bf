// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::models::TransactionKind;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle<T: Transport>(client: &mut ApiClient<T>, m: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    if let Some(("list", sub)) = m.subcommand() {
        let kind = match sub.get_one::<String>("type") {
            Some(t) => Some(t.parse::<TransactionKind>().map_err(anyhow::Error::msg)?),
            None => None,
        };
        let mut categories = client.get_categories()?;
        if let Some(k) = kind {
            categories.retain(|c| c.kind == k);
        }
        if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &categories)? {
            return Ok(());
        }
        if categories.iter().any(|c| c.is_fallback()) {
            eprintln!("Categories could not be loaded; showing built-in defaults.");
        }
        let rows = categories
            .iter()
            .map(|c| {
                vec![
                    if c.is_fallback() { "-".to_string() } else { c.id.to_string() },
                    format!("{} {}", c.icon, c.name),
                    c.kind.to_string(),
                    c.color.clone(),
                    if c.is_system { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Type", "Color", "System"], rows));
    }
    Ok(())
}
