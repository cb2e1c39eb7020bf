// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::currency::{
    BASE_CURRENCY, CURRENCIES, RateSource, convert_currency, find_currency, format_currency,
    get_exchange_rates,
};
use crate::utils::{arg, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(source: &dyn RateSource, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("rates", sub)) => list_rates(source, sub)?,
        Some(("convert", sub)) => convert_amount(source, sub)?,
        Some(("currencies", sub)) => list_currencies(sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct RateRow {
    code: String,
    name: String,
    rate: rust_decimal::Decimal,
}

fn list_rates(source: &dyn RateSource, sub: &clap::ArgMatches) -> Result<()> {
    let base = arg(sub, "base")?.trim().to_uppercase();
    let rates = get_exchange_rates(source, &base);
    // Only the catalogue is shown; the feed carries many more codes.
    let data: Vec<RateRow> = CURRENCIES
        .iter()
        .filter_map(|c| {
            rates.get(c.code).map(|r| RateRow {
                code: c.code.to_string(),
                name: c.name.to_string(),
                rate: *r,
            })
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| vec![r.code.clone(), r.name.clone(), r.rate.to_string()])
        .collect();
    println!("1 {} =", base);
    println!("{}", pretty_table(&["Code", "Currency", "Rate"], rows));
    Ok(())
}

fn convert_amount(source: &dyn RateSource, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let from = arg(sub, "from")?.trim().to_uppercase();
    let to = arg(sub, "to")?.trim().to_uppercase();
    for code in [&from, &to] {
        if find_currency(code).is_none() {
            bail!("Unsupported currency '{}'", code);
        }
    }
    let rates = get_exchange_rates(source, BASE_CURRENCY);
    let res = convert_currency(amount, &from, &to, &rates);
    println!(
        "{} -> {}",
        format_currency(amount, &from),
        format_currency(res, &to)
    );
    Ok(())
}

fn list_currencies(sub: &clap::ArgMatches) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        code: &'a str,
        symbol: &'a str,
        name: &'a str,
        flag: &'a str,
    }
    let data: Vec<Row> = CURRENCIES
        .iter()
        .map(|c| Row {
            code: c.code,
            symbol: c.symbol,
            name: c.name,
            flag: c.flag,
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| vec![format!("{} {}", r.flag, r.code), r.symbol.to_string(), r.name.to_string()])
        .collect();
    println!("{}", pretty_table(&["Code", "Symbol", "Name"], rows));
    Ok(())
}
