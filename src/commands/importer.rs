// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, anyhow};

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::errors::Error;
use crate::import::{ImportDialog, ImportFile, PROGRESS_TICK, failure_message};
use crate::notify::{ConsoleNotifier, Notifier, Toast};
use crate::utils::{arg, pretty_table};

pub fn handle<T: Transport>(client: &mut ApiClient<T>, m: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    let path = Path::new(arg(m, "file")?);
    let notifier = ConsoleNotifier;

    let mut dialog = ImportDialog::new();
    dialog.open();
    let file = ImportFile::read(path)?;
    dialog.select_file(file)?;

    let summary = match dialog.run(client, PROGRESS_TICK) {
        Ok(s) => s,
        Err(err @ Error::SessionExpired { .. }) => return Err(err.into()),
        Err(err) => return Err(anyhow!(failure_message(&err))),
    };

    if m.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        notifier.toast(Toast::success(summary.message()));
        println!(
            "{}",
            pretty_table(
                &["Total rows", "Imported", "Skipped"],
                vec![vec![
                    summary.total.to_string(),
                    summary.imported.to_string(),
                    summary.skipped.to_string(),
                ]],
            )
        );
        if !summary.categories.is_empty() {
            let rows = summary
                .categories
                .iter()
                .map(|(name, n)| vec![name.clone(), n.to_string()])
                .collect();
            println!("{}", pretty_table(&["Category", "Transactions"], rows));
        }
        for e in &summary.errors {
            eprintln!("  skipped: {}", e);
        }
    }
    dialog.close();
    Ok(())
}
