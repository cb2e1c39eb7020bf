// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard metrics derived from the backend summary.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiClient, Transport};
use crate::errors::{Error, Result};
use crate::expenses::DASHBOARD_FAILED;
use crate::models::{
    Category, DEFAULT_COLOR, DEFAULT_ICON, RawCategorySummary, RawDashboard, RawMonthlyTrend,
    Transaction, TransactionKind, UNCATEGORIZED,
};
use crate::notify::{Notifier, Toast};
use crate::preferences::monthly_budget;

pub const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(format!("Unknown period '{}', expected week, month or year", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub id: Option<i64>,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub category_icon: String,
    pub category_color: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub name: String,
    pub value: Decimal,
    pub percentage: Decimal,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub savings_rate: Decimal,
    pub income_trend: Decimal,
    pub expense_trend: Decimal,
    pub budget_used: Decimal,
    pub recent_transactions: Vec<RecentTransaction>,
    pub category_breakdown: Vec<BreakdownEntry>,
    pub income_breakdown: Vec<BreakdownEntry>,
    pub monthly_trend: Vec<TrendPoint>,
    pub period: Period,
}

/// Percentage change from `previous` to `current`, one decimal place.
/// Zero when there is no previous value.
pub fn calculate_trend(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    current
        .checked_sub(previous)
        .and_then(|d| d.checked_div(previous))
        .and_then(|r| r.checked_mul(dec!(100)))
        .map(|t| t.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

/// Share of the monthly budget spent, clamped to 0..=100. A budget that is
/// not positive counts as nothing spent.
pub fn budget_used(total_expenses: Decimal, budget: Decimal) -> Decimal {
    if budget <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // An overflowing ratio saturates to the matching bound.
    let overflow = if total_expenses.is_sign_negative() {
        Decimal::ZERO
    } else {
        dec!(100)
    };
    total_expenses
        .checked_div(budget)
        .and_then(|r| r.checked_mul(dec!(100)))
        .map(|p| p.round_dp(2))
        .unwrap_or(overflow)
        .clamp(Decimal::ZERO, dec!(100))
}

/// Income and expense trend between the last two monthly entries.
pub fn trends(monthly: &[RawMonthlyTrend]) -> (Decimal, Decimal) {
    match monthly {
        [.., prev, cur] => (
            calculate_trend(or_zero(cur.income), or_zero(prev.income)),
            calculate_trend(or_zero(cur.expense), or_zero(prev.expense)),
        ),
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

fn or_zero(v: Option<Decimal>) -> Decimal {
    v.unwrap_or(Decimal::ZERO)
}

fn text_or(v: &Option<String>, default: &str) -> String {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn recent(tx: &Transaction, today: NaiveDate) -> RecentTransaction {
    RecentTransaction {
        id: tx.id,
        description: text_or(&tx.description, NO_DESCRIPTION),
        amount: or_zero(tx.amount),
        kind: tx
            .kind
            .as_deref()
            .and_then(|k| k.parse::<TransactionKind>().ok())
            .unwrap_or(TransactionKind::Expense),
        category: text_or(&tx.category_name, UNCATEGORIZED),
        category_icon: text_or(&tx.category_icon, DEFAULT_ICON),
        category_color: text_or(&tx.category_color, DEFAULT_COLOR),
        date: tx.transaction_date.unwrap_or(today),
    }
}

fn breakdown(entry: &RawCategorySummary) -> BreakdownEntry {
    BreakdownEntry {
        name: text_or(&entry.category_name, UNCATEGORIZED),
        value: or_zero(entry.amount),
        percentage: or_zero(entry.percentage),
        color: text_or(&entry.category_color, DEFAULT_COLOR),
        icon: text_or(&entry.category_icon, DEFAULT_ICON),
    }
}

fn trend_point(t: &RawMonthlyTrend) -> TrendPoint {
    let label = match (&t.month_name, t.month) {
        (Some(name), _) if !name.trim().is_empty() => name.trim().to_string(),
        (_, Some(m)) => format!("Month {}", m),
        _ => "Month".to_string(),
    };
    TrendPoint {
        label,
        year: t.year,
        month: t.month,
        income: or_zero(t.income),
        expenses: or_zero(t.expense),
        net: or_zero(t.net),
    }
}

/// Turns the raw backend summary into display values. `budget` is USD.
pub fn aggregate(
    raw: &RawDashboard,
    period: Period,
    budget: Decimal,
    today: NaiveDate,
) -> DashboardSummary {
    let (income_trend, expense_trend) = trends(&raw.monthly_trends);
    let total_expenses = or_zero(raw.total_expense);
    DashboardSummary {
        total_balance: or_zero(raw.net_amount),
        total_income: or_zero(raw.total_income),
        total_expenses,
        savings_rate: or_zero(raw.savings_rate),
        income_trend,
        expense_trend,
        budget_used: budget_used(total_expenses, budget),
        recent_transactions: raw
            .recent_transactions
            .iter()
            .map(|t| recent(t, today))
            .collect(),
        category_breakdown: raw.expenses_by_category.iter().map(breakdown).collect(),
        income_breakdown: raw.income_by_source.iter().map(breakdown).collect(),
        monthly_trend: raw.monthly_trends.iter().map(trend_point).collect(),
        period,
    }
}

/// Live dashboard state. A failed refresh keeps whatever was shown before.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    summary: DashboardSummary,
    categories: Vec<Category>,
    loaded: bool,
}

impl DashboardView {
    pub fn new(period: Period) -> Self {
        Self {
            summary: DashboardSummary {
                period,
                ..DashboardSummary::default()
            },
            ..Self::default()
        }
    }

    pub fn summary(&self) -> &DashboardSummary {
        &self.summary
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// True once at least one refresh succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn period(&self) -> Period {
        self.summary.period
    }

    pub fn set_period(&mut self, period: Period) {
        self.summary.period = period;
    }

    /// Fetches the current month and recomputes the summary.
    ///
    /// Returns `Ok(false)` after notifying when the fetch failed; only an
    /// expired session is returned as an error.
    pub fn refresh<T: Transport>(
        &mut self,
        client: &mut ApiClient<T>,
        notifier: &dyn Notifier,
        today: NaiveDate,
    ) -> Result<bool> {
        let budget = monthly_budget(client.session().storage())?;
        let raw = match client.get_dashboard(today.year(), today.month()) {
            Ok(raw) => raw,
            Err(err @ Error::SessionExpired { .. }) => return Err(err),
            Err(err) => {
                warn!(error = %err, loaded = self.loaded, "dashboard refresh failed");
                let message = match err {
                    Error::Api { message, .. } => message,
                    _ => DASHBOARD_FAILED.to_string(),
                };
                notifier.toast(Toast::error(message));
                return Ok(false);
            }
        };
        self.categories = client.get_categories()?;
        self.summary = aggregate(&raw, self.summary.period, budget, today);
        self.loaded = true;
        debug!(
            transactions = self.summary.recent_transactions.len(),
            categories = self.categories.len(),
            "dashboard refreshed"
        );
        Ok(true)
    }
}
