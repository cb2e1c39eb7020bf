// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::currency::{BASE_CURRENCY, RateSource, display_usd, find_currency, get_exchange_rates};
use crate::errors::Error;
use crate::expenses::{DEFAULT_LIST_SIZE, categories_for};
use crate::forms::TransactionDialog;
use crate::models::{Category, Transaction, TransactionKind, UNCATEGORIZED};
use crate::notify::{ConsoleNotifier, Notifier, Toast};
use crate::preferences::preferred_currency;
use crate::utils::{arg, maybe_print_json, pretty_table, signed_amount, today};

pub fn handle<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    m: &clap::ArgMatches,
) -> Result<()> {
    require_login(client)?;
    match m.subcommand() {
        Some(("add", sub)) => add(client, source, sub)?,
        Some(("list", sub)) => list(client, source, sub)?,
        _ => {}
    }
    Ok(())
}

/// Flat, USD-denominated view of a listed transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRow {
    pub id: Option<i64>,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
}

impl From<&Transaction> for TxRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            date: t.transaction_date.map(|d| d.to_string()).unwrap_or_default(),
            kind: t
                .kind
                .as_deref()
                .unwrap_or(TransactionKind::Expense.as_str())
                .to_ascii_uppercase(),
            category: t
                .category_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            description: t.description.clone().unwrap_or_default(),
            amount: t.amount.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Resolves `--category` as an id first, then as a name of the right type.
pub fn resolve_category(
    categories: &[Category],
    kind: TransactionKind,
    wanted: &str,
) -> Option<i64> {
    let wanted = wanted.trim();
    if let Ok(id) = wanted.parse::<i64>() {
        return Some(id);
    }
    categories_for(categories, kind)
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
        .map(|c| c.id)
}

fn add<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let kind: TransactionKind = arg(sub, "type")?.parse().map_err(anyhow::Error::msg)?;
    let categories = client.get_categories()?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => find_currency(c)
            .map(|info| info.code.to_string())
            .ok_or_else(|| Error::validation("currency", format!("Unsupported currency '{}'", c)))?,
        None => preferred_currency(client.session().storage())?,
    };
    let rates = get_exchange_rates(source, BASE_CURRENCY);

    let mut dialog = TransactionDialog::new(today());
    dialog.open();
    {
        let form = dialog.form_mut();
        form.set_kind(kind);
        form.amount = arg(sub, "amount")?.to_string();
        form.category_id = resolve_category(&categories, kind, arg(sub, "category")?);
        form.description = arg(sub, "description")?.to_string();
        if let Some(d) = sub.get_one::<String>("date") {
            form.date = d.trim().to_string();
        }
    }

    let created = dialog.submit(client, &categories, &currency, &rates)?;
    ConsoleNotifier.toast(Toast::success("Transaction added successfully"));
    if let Some(id) = created.id {
        println!("Transaction id: {}", id);
    }
    Ok(())
}

fn list<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let size = *sub.get_one::<u32>("size").unwrap_or(&DEFAULT_LIST_SIZE);
    let rows: Vec<TxRow> = client
        .recent_transactions(size)?
        .iter()
        .map(TxRow::from)
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    if rows.is_empty() {
        println!("No transactions found. Add your first one with `expensedesk tx add`.");
        return Ok(());
    }
    let currency = preferred_currency(client.session().storage())?;
    let rates = get_exchange_rates(source, BASE_CURRENCY);
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                r.kind.clone(),
                r.category.clone(),
                r.description.clone(),
                signed_amount(&r.kind, &display_usd(r.amount, &currency, &rates)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Category", "Description", "Amount"], data)
    );
    Ok(())
}
