// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::NaiveDate;
use common::{logged_in_client, request_json};
use expensedesk::currency::RateTable;
use expensedesk::errors::{Error, FieldErrors};
use expensedesk::expenses::fallback_categories;
use expensedesk::forms::{
    PasswordChange, PasswordReset, TransactionDialog, TransactionForm, validate_password_change,
    validate_registration, validate_reset,
};
use expensedesk::models::{Category, Registration, TransactionKind};
use rust_decimal_macros::dec;
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
}

fn fields(err: Error) -> FieldErrors {
    match err {
        Error::Validation(f) => f,
        other => panic!("expected validation error, got {:?}", other),
    }
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 4,
            name: "Food".into(),
            kind: TransactionKind::Expense,
            icon: "🍔".into(),
            color: "#F59E0B".into(),
            is_system: true,
        },
        Category {
            id: 9,
            name: "Salary".into(),
            kind: TransactionKind::Income,
            icon: "💰".into(),
            color: "#10B981".into(),
            is_system: true,
        },
    ]
}

fn rates() -> RateTable {
    [("USD".to_string(), dec!(1)), ("EUR".to_string(), dec!(0.85))]
        .into_iter()
        .collect()
}

fn registration(password: &str, confirm: &str) -> Registration {
    Registration {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        password: password.into(),
        confirm_password: confirm.into(),
    }
}

#[test]
fn registration_password_rules() {
    assert!(validate_registration(&registration("Secret1!", "Secret1!")).is_ok());

    let f = fields(validate_registration(&registration("short", "short")).unwrap_err());
    assert_eq!(f.get("password"), Some("Password must be at least 8 characters"));

    let f = fields(validate_registration(&registration("secret12!", "secret12!")).unwrap_err());
    assert_eq!(
        f.get("password"),
        Some("Password must contain uppercase, lowercase, number, and special character")
    );

    // '#' is outside the allowed special set for registration.
    let f = fields(validate_registration(&registration("Secret1#", "Secret1#")).unwrap_err());
    assert!(f.get("password").is_some());

    let f = fields(validate_registration(&registration("Secret1!", "Secret2!")).unwrap_err());
    assert_eq!(f.get("confirmPassword"), Some("Passwords do not match"));
}

#[test]
fn registration_names_need_two_characters() {
    let mut r = registration("Secret1!", "Secret1!");
    r.first_name = "A".into();
    r.last_name = "  ".into();
    let f = fields(validate_registration(&r).unwrap_err());
    assert_eq!(f.get("firstName"), Some("First name must be at least 2 characters"));
    assert_eq!(f.get("lastName"), Some("Last name is required"));
}

#[test]
fn reset_accepts_its_own_special_set() {
    let ok = PasswordReset {
        new_password: "Secret1#".into(),
        confirm_password: "Secret1#".into(),
    };
    assert!(validate_reset(&ok).is_ok());

    let bad = PasswordReset {
        new_password: "Secret1!".into(),
        confirm_password: "Secret1!".into(),
    };
    let f = fields(validate_reset(&bad).unwrap_err());
    assert!(f.get("newPassword").is_some());
}

#[test]
fn password_change_rules() {
    let change = |cur: &str, new: &str, confirm: &str| PasswordChange {
        current_password: cur.into(),
        new_password: new.into(),
        confirm_password: confirm.into(),
    };
    assert!(validate_password_change(&change("old", "abcdef", "abcdef")).is_ok());

    let f = fields(validate_password_change(&change("old", "abcdef", "abcdeg")).unwrap_err());
    assert_eq!(f.get("newPassword"), Some("New passwords do not match"));

    let f = fields(validate_password_change(&change("old", "abc", "abc")).unwrap_err());
    assert_eq!(
        f.get("newPassword"),
        Some("Password must be at least 6 characters long")
    );

    let body = serde_json::to_value(change("old", "abcdef", "abcdef")).unwrap();
    assert_eq!(body, json!({"currentPassword": "old", "newPassword": "abcdef"}));
}

#[test]
fn transaction_form_reports_every_field() {
    let mut form = TransactionForm::new(today());
    form.amount = "0".into();
    form.date = "2025-08-16".into();
    let f = fields(form.validate(&categories(), today()).unwrap_err());
    assert_eq!(f.get("amount"), Some("Amount must be greater than 0"));
    assert_eq!(f.get("category"), Some("Please select a category"));
    assert_eq!(f.get("description"), Some("Description is required"));
    assert_eq!(f.get("date"), Some("Date cannot be in the future"));
    assert_eq!(f.len(), 4);
}

#[test]
fn transaction_form_rejects_old_dates_and_wrong_kind_category() {
    let mut form = TransactionForm::new(today());
    form.amount = "10".into();
    form.description = "Lunch".into();
    form.category_id = Some(9);
    form.date = "1899-12-31".into();
    let f = fields(form.validate(&categories(), today()).unwrap_err());
    assert_eq!(f.get("category"), Some("Please select a category"));
    assert_eq!(f.get("date"), Some("Date cannot be before 1900-01-01"));

    form.date = "yesterday".into();
    let f = fields(form.validate(&categories(), today()).unwrap_err());
    assert_eq!(f.get("date"), Some("Please select a valid date"));
}

#[test]
fn switching_kind_clears_category() {
    let mut form = TransactionForm::new(today());
    assert_eq!(form.kind, TransactionKind::Expense);
    assert_eq!(form.date, "2025-08-15");
    form.category_id = Some(4);
    form.set_kind(TransactionKind::Expense);
    assert_eq!(form.category_id, Some(4));
    form.set_kind(TransactionKind::Income);
    assert_eq!(form.category_id, None);
}

#[test]
fn fallback_categories_cannot_be_submitted() {
    let fallback = fallback_categories();
    let mut form = TransactionForm::new(today());
    form.amount = "10".into();
    form.description = "Taxi".into();
    form.category_id = Some(fallback[1].id);
    let f = fields(form.validate(&fallback, today()).unwrap_err());
    assert_eq!(
        f.get("category"),
        Some("Categories could not be loaded, please try again later")
    );
}

#[test]
fn payload_amount_is_converted_to_usd() {
    let mut form = TransactionForm::new(today());
    form.amount = "85".into();
    form.description = " Dinner ".into();
    form.category_id = Some(4);
    let valid = form.validate(&categories(), today()).unwrap();
    let payload = valid.to_payload("EUR", &rates());
    assert_eq!(payload.amount, dec!(100));
    assert_eq!(payload.description, "Dinner");

    let usd = valid.to_payload("USD", &rates());
    assert_eq!(usd.amount, dec!(85));
}

#[test]
fn dialog_submits_and_resets() {
    let mut c = logged_in_client();
    c.transport()
        .push_json(201, json!({"data": {"id": 77, "amount": 100, "type": "EXPENSE"}}));

    let mut dialog = TransactionDialog::new(today());
    dialog.open();
    assert!(dialog.is_open());
    {
        let f = dialog.form_mut();
        f.amount = "85".into();
        f.category_id = Some(4);
        f.description = "Dinner".into();
        f.date = "2025-08-10".into();
    }
    let created = dialog.submit(&mut c, &categories(), "EUR", &rates()).unwrap();
    assert_eq!(created.id, Some(77));
    assert!(!dialog.is_open());
    assert_eq!(dialog.form(), &TransactionForm::new(today()));

    let req = c.transport().last_request();
    assert_eq!(req.url, "http://api.test/api/v1/transactions");
    assert_eq!(
        request_json(&req),
        json!({
            "categoryId": 4,
            "amount": 100.0,
            "type": "EXPENSE",
            "description": "Dinner",
            "transactionDate": "2025-08-10"
        })
    );
}

#[test]
fn invalid_dialog_sends_nothing_and_keeps_errors() {
    let mut c = logged_in_client();
    let mut dialog = TransactionDialog::new(today());
    dialog.open();
    dialog.form_mut().amount = "-3".into();

    let err = dialog.submit(&mut c, &categories(), "USD", &rates()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(dialog.is_open());
    assert_eq!(
        dialog.errors().get("amount"),
        Some("Amount must be greater than 0")
    );
    assert!(c.transport().requests().is_empty());

    dialog.close();
    assert!(dialog.errors().is_empty());
}

#[test]
fn backend_rejection_keeps_dialog_open() {
    let mut c = logged_in_client();
    c.transport().push_json(400, json!({"message": "Category not found"}));
    let mut dialog = TransactionDialog::new(today());
    dialog.open();
    {
        let f = dialog.form_mut();
        f.amount = "5".into();
        f.category_id = Some(4);
        f.description = "Snack".into();
    }
    let err = dialog.submit(&mut c, &categories(), "USD", &rates()).unwrap_err();
    assert_eq!(err.to_string(), "Category not found");
    assert!(dialog.is_open());
    assert_eq!(dialog.form().amount, "5");
}
