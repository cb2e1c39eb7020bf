// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Form state and validation. Everything here runs before any network call.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::api::{ApiClient, Transport};
use crate::currency::{BASE_CURRENCY, RateTable, convert_currency, round_money};
use crate::errors::{Error, FieldErrors, Result};
use crate::models::{Category, Credentials, NewTransaction, Registration, Transaction, TransactionKind};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());
static LOWER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").unwrap());
static UPPER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").unwrap());
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").unwrap());
static REGISTER_SPECIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@$!%*?&]").unwrap());
static REGISTER_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&]+$").unwrap());
static RESET_SPECIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@#$%^&+=]").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.insert("email", "Please enter a valid email address");
    }
}

fn check_name(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) {
    let v = value.trim();
    if v.is_empty() {
        errors.insert(field, format!("{} is required", label));
    } else if v.chars().count() < 2 {
        errors.insert(field, format!("{} must be at least 2 characters", label));
    }
}

fn check_confirm(errors: &mut FieldErrors, password: &str, confirm: &str) {
    if confirm.is_empty() {
        errors.insert("confirmPassword", "Please confirm your password");
    } else if password != confirm {
        errors.insert("confirmPassword", "Passwords do not match");
    }
}

pub fn validate_login(c: &Credentials) -> Result<()> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, &c.email);
    if c.password.is_empty() {
        errors.insert("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_email_only(email: &str) -> Result<()> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, email);
    errors.into_result()
}

pub fn validate_registration(r: &Registration) -> Result<()> {
    let mut errors = FieldErrors::default();
    check_name(&mut errors, "firstName", "First name", &r.first_name);
    check_name(&mut errors, "lastName", "Last name", &r.last_name);
    check_email(&mut errors, &r.email);

    let p = &r.password;
    if p.is_empty() {
        errors.insert("password", "Password is required");
    } else if p.chars().count() < 8 {
        errors.insert("password", "Password must be at least 8 characters");
    } else if !(LOWER_RE.is_match(p)
        && UPPER_RE.is_match(p)
        && DIGIT_RE.is_match(p)
        && REGISTER_SPECIAL_RE.is_match(p)
        && REGISTER_CHARSET_RE.is_match(p))
    {
        errors.insert(
            "password",
            "Password must contain uppercase, lowercase, number, and special character",
        );
    }
    check_confirm(&mut errors, p, &r.confirm_password);
    errors.into_result()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub new_password: String,
    pub confirm_password: String,
}

pub fn validate_reset(r: &PasswordReset) -> Result<()> {
    let mut errors = FieldErrors::default();
    let p = &r.new_password;
    if p.is_empty() {
        errors.insert("newPassword", "Password is required");
    } else if p.chars().count() < 8 {
        errors.insert("newPassword", "Password must be at least 8 characters");
    } else if !(LOWER_RE.is_match(p)
        && UPPER_RE.is_match(p)
        && DIGIT_RE.is_match(p)
        && RESET_SPECIAL_RE.is_match(p))
    {
        errors.insert(
            "newPassword",
            "Password must contain uppercase, lowercase, number and special character",
        );
    }
    check_confirm(&mut errors, p, &r.confirm_password);
    errors.into_result()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

pub fn validate_password_change(c: &PasswordChange) -> Result<()> {
    let mut errors = FieldErrors::default();
    if c.current_password.is_empty() {
        errors.insert("currentPassword", "Current password is required");
    }
    if c.new_password != c.confirm_password {
        errors.insert("newPassword", "New passwords do not match");
    } else if c.new_password.chars().count() < 6 {
        errors.insert("newPassword", "Password must be at least 6 characters long");
    }
    errors.into_result()
}

pub const MIN_TRANSACTION_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(d) => d,
    None => panic!("invalid minimum date"),
};

/// Raw input of the add-transaction dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    pub amount: String,
    pub category_id: Option<i64>,
    pub description: String,
    pub date: String,
}

/// A form that passed validation. Amount is still in the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category_id: i64,
    pub description: String,
    pub date: NaiveDate,
}

impl TransactionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: String::new(),
            category_id: None,
            description: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
        }
    }

    /// Switching type invalidates the chosen category.
    pub fn set_kind(&mut self, kind: TransactionKind) {
        if self.kind != kind {
            self.kind = kind;
            self.category_id = None;
        }
    }

    pub fn validate(&self, categories: &[Category], today: NaiveDate) -> Result<ValidTransaction> {
        let mut errors = FieldErrors::default();

        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|a| *a > Decimal::ZERO);
        if amount.is_none() {
            errors.insert("amount", "Amount must be greater than 0");
        }

        let category = self
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .filter(|c| c.kind == self.kind);
        match category {
            None => errors.insert("category", "Please select a category"),
            Some(c) if c.is_fallback() => errors.insert(
                "category",
                "Categories could not be loaded, please try again later",
            ),
            Some(_) => {}
        }

        if self.description.trim().is_empty() {
            errors.insert("description", "Description is required");
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        match date {
            None => errors.insert("date", "Please select a valid date"),
            Some(d) if d > today => errors.insert("date", "Date cannot be in the future"),
            Some(d) if d < MIN_TRANSACTION_DATE => {
                errors.insert("date", "Date cannot be before 1900-01-01")
            }
            Some(_) => {}
        }

        errors.into_result()?;
        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) => Ok(ValidTransaction {
                kind: self.kind,
                amount,
                category_id: category.id,
                description: self.description.trim().to_string(),
                date,
            }),
            _ => Err(Error::validation("form", "Invalid transaction")),
        }
    }
}

impl ValidTransaction {
    /// Backend payload with the amount converted to USD.
    pub fn to_payload(&self, display_currency: &str, rates: &RateTable) -> NewTransaction {
        let usd = convert_currency(self.amount, display_currency, BASE_CURRENCY, rates);
        NewTransaction {
            category_id: self.category_id,
            amount: round_money(usd),
            kind: self.kind,
            description: self.description.clone(),
            transaction_date: self.date,
        }
    }
}

/// Add-transaction dialog: resets on every open and close.
#[derive(Debug, Clone)]
pub struct TransactionDialog {
    open: bool,
    form: TransactionForm,
    errors: FieldErrors,
    today: NaiveDate,
}

impl TransactionDialog {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            open: false,
            form: TransactionForm::new(today),
            errors: FieldErrors::default(),
            today,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.reset();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.form = TransactionForm::new(self.today);
        self.errors = FieldErrors::default();
    }

    pub fn form(&self) -> &TransactionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TransactionForm {
        &mut self.form
    }

    /// Inline messages from the last failed submit.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Validates, converts and posts the transaction. On success the dialog
    /// closes; the caller decides how to report either outcome.
    pub fn submit<T: Transport>(
        &mut self,
        client: &mut ApiClient<T>,
        categories: &[Category],
        display_currency: &str,
        rates: &RateTable,
    ) -> Result<Transaction> {
        let valid = match self.form.validate(categories, self.today) {
            Ok(v) => v,
            Err(Error::Validation(errs)) => {
                self.errors = errs.clone();
                return Err(Error::Validation(errs));
            }
            Err(other) => return Err(other),
        };
        let payload = valid.to_payload(display_currency, rates);
        debug!(amount = %payload.amount, kind = %payload.kind, "submitting transaction");
        let created = client.create_transaction(&payload)?;
        self.close();
        Ok(created)
    }
}
