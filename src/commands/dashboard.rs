// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::currency::{
    BASE_CURRENCY, RateRefresher, RateSource, RateTable, REFRESH_INTERVAL, display_usd,
    get_exchange_rates,
};
use crate::dashboard::{DashboardSummary, DashboardView, Period};
use crate::notify::{ConsoleNotifier, Notifier, Toast, Variant};
use crate::preferences::{monthly_budget, preferred_currency};
use crate::utils::{maybe_print_json, pretty_table, signed_amount, today};

pub fn handle<T, S>(client: &mut ApiClient<T>, source: S, m: &clap::ArgMatches) -> Result<()>
where
    T: Transport,
    S: RateSource + Send + 'static,
{
    require_login(client)?;
    match m.subcommand() {
        Some(("show", sub)) => show(client, &source, sub)?,
        Some(("watch", sub)) => watch(client, source, sub)?,
        _ => {}
    }
    Ok(())
}

fn period(sub: &clap::ArgMatches) -> Result<Period> {
    let raw = sub.get_one::<String>("period").map(String::as_str).unwrap_or("month");
    raw.parse::<Period>().map_err(anyhow::Error::msg)
}

fn show<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let mut view = DashboardView::new(period(sub)?);
    view.refresh(client, &ConsoleNotifier, today())?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), view.summary())? {
        return Ok(());
    }
    let rates = get_exchange_rates(source, BASE_CURRENCY);
    let storage = client.session().storage();
    let currency = preferred_currency(storage)?;
    let budget = monthly_budget(storage)?;
    render(view.summary(), &currency, budget, &rates);
    Ok(())
}

fn watch<T, S>(client: &mut ApiClient<T>, source: S, sub: &clap::ArgMatches) -> Result<()>
where
    T: Transport,
    S: RateSource + Send + 'static,
{
    let interval = Duration::from_secs(*sub.get_one::<u64>("interval").unwrap_or(&60));
    let limit = sub.get_one::<u32>("count").copied();
    let refresher = RateRefresher::start(source, BASE_CURRENCY, REFRESH_INTERVAL);
    let notifier = ConsoleNotifier;
    let mut view = DashboardView::new(period(sub)?);
    let mut rounds = 0u32;
    loop {
        let refreshed = view.refresh(client, &notifier, today())?;
        let storage = client.session().storage();
        let currency = preferred_currency(storage)?;
        let budget = monthly_budget(storage)?;
        if refreshed && rounds > 0 {
            notifier.toast(Toast::new(
                "Refreshed",
                "Dashboard data updated successfully",
                Variant::Default,
            ));
        }
        render(view.summary(), &currency, budget, &refresher.rates());
        rounds += 1;
        if limit.is_some_and(|l| rounds >= l) {
            break;
        }
        thread::sleep(interval);
    }
    Ok(())
}

fn trend(v: Decimal) -> String {
    if v > Decimal::ZERO {
        format!("+{}%", v)
    } else {
        format!("{}%", v)
    }
}

pub fn render(s: &DashboardSummary, currency: &str, budget: Decimal, rates: &RateTable) {
    let money = |v: Decimal| display_usd(v, currency, rates);
    let stats = vec![
        vec!["Total balance".into(), money(s.total_balance), String::new()],
        vec!["Income".into(), money(s.total_income), trend(s.income_trend)],
        vec!["Expenses".into(), money(s.total_expenses), trend(s.expense_trend)],
        vec!["Savings rate".into(), format!("{}%", s.savings_rate.round_dp(1)), String::new()],
        vec![
            "Budget used".into(),
            format!("{}%", s.budget_used.round_dp(1)),
            format!("of {}", money(budget)),
        ],
    ];
    println!("Dashboard ({}, {})", s.period, currency);
    println!("{}", pretty_table(&["Metric", "Value", "Trend"], stats));

    if !s.recent_transactions.is_empty() {
        let rows = s
            .recent_transactions
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    format!("{} {}", t.category_icon, t.category),
                    t.description.clone(),
                    signed_amount(t.kind.as_str(), &money(t.amount)),
                ]
            })
            .collect();
        println!("Recent transactions");
        println!("{}", pretty_table(&["Date", "Category", "Description", "Amount"], rows));
    }

    for (title, entries) in [
        ("Spending by category", &s.category_breakdown),
        ("Income by source", &s.income_breakdown),
    ] {
        if entries.is_empty() {
            continue;
        }
        let rows = entries
            .iter()
            .map(|e| {
                vec![
                    format!("{} {}", e.icon, e.name),
                    money(e.value),
                    format!("{}%", e.percentage.round_dp(1)),
                ]
            })
            .collect();
        println!("{}", title);
        println!("{}", pretty_table(&["Category", "Amount", "Share"], rows));
    }

    if !s.monthly_trend.is_empty() {
        let rows = s
            .monthly_trend
            .iter()
            .map(|p| vec![p.label.clone(), money(p.income), money(p.expenses), money(p.net)])
            .collect();
        println!("Monthly trend");
        println!("{}", pretty_table(&["Month", "Income", "Expenses", "Net"], rows));
    }
}
