// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Datelike;

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::commands::transactions::TxRow;
use crate::expenses::TEMPLATE_FILE_NAME;
use crate::utils::{arg, parse_month, report_file_name, today};

pub fn handle<T: Transport>(client: &mut ApiClient<T>, m: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    match m.subcommand() {
        Some(("report", sub)) => export_report(client, sub),
        Some(("template", sub)) => export_template(client, sub),
        Some(("transactions", sub)) => export_transactions(client, sub),
        _ => Ok(()),
    }
}

fn out_path(sub: &clap::ArgMatches, default: String) -> PathBuf {
    sub.get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn export_report<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => {
            let t = today();
            (t.year(), t.month())
        }
    };
    let bytes = client.export_report(year, month)?;
    let out = out_path(sub, report_file_name(year, month));
    std::fs::write(&out, bytes).with_context(|| format!("Write {}", out.display()))?;
    println!("Transactions exported successfully to {}", out.display());
    Ok(())
}

fn export_template<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let bytes = client.download_template()?;
    let out = out_path(sub, TEMPLATE_FILE_NAME.to_string());
    std::fs::write(&out, bytes).with_context(|| format!("Write {}", out.display()))?;
    println!("Import template saved to {}", out.display());
    Ok(())
}

fn export_transactions<T: Transport>(
    client: &mut ApiClient<T>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    let size = *sub.get_one::<u32>("size").unwrap_or(&100);
    let rows: Vec<TxRow> = client
        .recent_transactions(size)?
        .iter()
        .map(TxRow::from)
        .collect();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "date", "type", "category", "description", "amount_usd"])?;
            for r in &rows {
                wtr.write_record([
                    r.id.map(|i| i.to_string()).unwrap_or_default(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.amount.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
