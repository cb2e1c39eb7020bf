// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense-service endpoints: dashboard, categories, transactions and files.

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::api::{ApiClient, Call, Service, Transport};
use crate::errors::{Error, Result};
use crate::models::{Category, NewTransaction, Page, RawDashboard, Transaction, TransactionKind};

pub const DASHBOARD_FAILED: &str = "Failed to load dashboard data. Please try again.";
const CATEGORIES_FAILED: &str = "Failed to load categories";
const CREATE_FAILED: &str = "Failed to add transaction";
const LIST_FAILED: &str = "Failed to load transactions";
const EXPORT_FAILED: &str = "Failed to export transactions";
const TEMPLATE_FAILED: &str = "Failed to download template";

pub const TEMPLATE_FILE_NAME: &str = "expense-import-template.xlsx";
pub const DEFAULT_LIST_SIZE: u32 = 10;

static FALLBACK_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    use TransactionKind::{Expense, Income};
    [
        ("Food & Dining", Expense, "🍔", "#F59E0B"),
        ("Transportation", Expense, "🚗", "#3B82F6"),
        ("Shopping", Expense, "🛍️", "#8B5CF6"),
        ("Entertainment", Expense, "🎬", "#EC4899"),
        ("Bills & Utilities", Expense, "💡", "#10B981"),
        ("Healthcare", Expense, "🏥", "#EF4444"),
        ("Other", Expense, "📌", "#6B7280"),
        ("Salary", Income, "💰", "#10B981"),
        ("Freelance", Income, "💻", "#3B82F6"),
        ("Investment", Income, "📈", "#F59E0B"),
        ("Other Income", Income, "💵", "#8B5CF6"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, kind, icon, color))| Category {
        id: -(i as i64 + 1),
        name: name.to_string(),
        kind,
        icon: icon.to_string(),
        color: color.to_string(),
        is_system: true,
    })
    .collect()
});

/// Built-in categories shown when the backend list cannot be loaded.
pub fn fallback_categories() -> Vec<Category> {
    FALLBACK_CATEGORIES.clone()
}

/// Categories usable for `kind`, in backend order.
pub fn categories_for(categories: &[Category], kind: TransactionKind) -> Vec<&Category> {
    categories.iter().filter(|c| c.kind == kind).collect()
}

/// Only an expired session escapes a degrading call; everything else is
/// logged and replaced by `fallback`.
fn degrade<R>(res: Result<R>, what: &str, fallback: impl FnOnce() -> R) -> Result<R> {
    match res {
        Ok(v) => Ok(v),
        Err(err @ Error::SessionExpired { .. }) => Err(err),
        Err(err) => {
            warn!(error = %err, "{} failed, using fallback", what);
            Ok(fallback())
        }
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn get_dashboard(&mut self, year: i32, month: u32) -> Result<RawDashboard> {
        let call = Call::get(
            Service::Expense,
            format!("/dashboard?year={}&month={}", year, month),
        );
        self.fetch(call, DASHBOARD_FAILED)
    }

    /// Backend categories, or the built-in set when the fetch fails.
    pub fn get_categories(&mut self) -> Result<Vec<Category>> {
        let res = self.fetch(Call::get(Service::Expense, "/categories"), CATEGORIES_FAILED);
        degrade(res, "category fetch", fallback_categories)
    }

    pub fn create_transaction(&mut self, tx: &NewTransaction) -> Result<Transaction> {
        let call = Call::post(Service::Expense, "/transactions").json(tx)?;
        let created: Transaction = self.fetch(call, CREATE_FAILED)?;
        info!(id = ?created.id, "transaction created");
        Ok(created)
    }

    /// Newest transactions first. Degrades to an empty list.
    pub fn recent_transactions(&mut self, size: u32) -> Result<Vec<Transaction>> {
        let call = Call::get(
            Service::Expense,
            format!("/transactions?size={}&sort=transactionDate,desc", size),
        );
        let res = self
            .fetch::<Page<Transaction>>(call, LIST_FAILED)
            .map(|p| p.content);
        degrade(res, "transaction list", Vec::new)
    }

    /// Server-rendered spreadsheet for one month.
    pub fn export_report(&mut self, year: i32, month: u32) -> Result<Vec<u8>> {
        let call = Call::get(
            Service::Expense,
            format!("/files/export?year={}&month={}", year, month),
        );
        Ok(self.send(call)?.ensure_success(EXPORT_FAILED)?.body)
    }

    pub fn download_template(&mut self) -> Result<Vec<u8>> {
        let call = Call::get(Service::Expense, "/files/template");
        Ok(self.send(call)?.ensure_success(TEMPLATE_FAILED)?.body)
    }
}
