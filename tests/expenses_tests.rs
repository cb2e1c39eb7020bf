// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{logged_in_client, request_json};
use expensedesk::errors::Error;
use expensedesk::expenses::{categories_for, fallback_categories};
use expensedesk::forms::PasswordChange;
use expensedesk::models::TransactionKind;
use expensedesk::users::ProfileUpdate;
use serde_json::json;

#[test]
fn categories_come_from_backend_with_display_defaults() {
    let mut c = logged_in_client();
    c.transport().push_json(
        200,
        json!({"success": true, "data": [
            {"id": 1, "name": "Rent", "type": "EXPENSE", "icon": "", "color": null, "isSystem": null},
            {"id": 2, "name": "Salary", "type": "INCOME", "icon": "💰", "color": "#10B981", "isSystem": true}
        ]}),
    );
    let cats = c.get_categories().unwrap();
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].icon, "📁");
    assert_eq!(cats[0].color, "#6B7280");
    assert!(!cats[0].is_system);
    assert_eq!(categories_for(&cats, TransactionKind::Income)[0].name, "Salary");
}

#[test]
fn categories_degrade_to_builtin_set() {
    let mut c = logged_in_client();
    c.transport().push_json(500, json!({"message": "boom"}));
    let cats = c.get_categories().unwrap();
    assert_eq!(cats, fallback_categories());
    assert_eq!(cats.len(), 11);
    assert!(cats.iter().all(|c| c.is_fallback() && c.is_system));
    assert_eq!(categories_for(&cats, TransactionKind::Expense).len(), 7);
    assert_eq!(categories_for(&cats, TransactionKind::Income).len(), 4);
}

#[test]
fn expired_session_escapes_degrading_calls() {
    let mut c = logged_in_client();
    c.transport().push_json(401, json!({}));
    c.transport().push_json(401, json!({}));
    assert!(matches!(
        c.get_categories(),
        Err(Error::SessionExpired { .. })
    ));
}

#[test]
fn recent_transactions_sorted_newest_first() {
    let mut c = logged_in_client();
    c.transport().push_json(
        200,
        json!({"data": {"content": [{"id": 5, "amount": 3, "type": "EXPENSE"}], "totalElements": 1}}),
    );
    let txs = c.recent_transactions(10).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(
        c.transport().last_request().url,
        "http://api.test/api/v1/transactions?size=10&sort=transactionDate,desc"
    );
}

#[test]
fn recent_transactions_degrade_to_empty() {
    let mut c = logged_in_client();
    c.transport().push_network_error();
    assert!(c.recent_transactions(5).unwrap().is_empty());

    c.transport().push_raw(200, b"not json");
    assert!(c.recent_transactions(5).unwrap().is_empty());
}

#[test]
fn template_download_returns_raw_bytes() {
    let mut c = logged_in_client();
    c.transport().push_raw(200, b"PKtemplate");
    assert_eq!(c.download_template().unwrap(), b"PKtemplate");
    assert_eq!(
        c.transport().last_request().url,
        "http://api.test/api/v1/files/template"
    );

    c.transport().push_json(500, json!({}));
    assert_eq!(
        c.download_template().unwrap_err().to_string(),
        "Failed to download template"
    );
}

#[test]
fn profile_update_mirrors_names_into_session() {
    let mut c = logged_in_client();
    c.transport().push_json(200, json!({"success": true}));
    let user = c
        .update_profile(&ProfileUpdate {
            first_name: " Augusta ".into(),
            last_name: "King".into(),
        })
        .unwrap()
        .unwrap();
    assert_eq!(user.display_name(), "Augusta King");
    assert_eq!(c.session().user().unwrap().first_name, "Augusta");

    let req = c.transport().last_request();
    assert_eq!(req.url, "http://api.test/api/v1/api/users/profile");
    assert_eq!(
        request_json(&req),
        json!({"firstName": " Augusta ", "lastName": "King"})
    );
}

#[test]
fn profile_update_needs_both_names() {
    let mut c = logged_in_client();
    let err = c
        .update_profile(&ProfileUpdate {
            first_name: String::new(),
            last_name: "King".into(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(c.transport().requests().is_empty());
}

#[test]
fn failed_profile_update_leaves_cached_user() {
    let mut c = logged_in_client();
    c.transport().push_json(400, json!({"message": "Name too long"}));
    let err = c
        .update_profile(&ProfileUpdate {
            first_name: "X".repeat(3),
            last_name: "Y".repeat(3),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Name too long");
    assert_eq!(c.session().user().unwrap().first_name, "Ada");
}

#[test]
fn change_password_puts_current_and_new() {
    let mut c = logged_in_client();
    c.transport().push_json(200, json!({"success": true}));
    c.change_password(&PasswordChange {
        current_password: "old-secret".into(),
        new_password: "new-secret".into(),
        confirm_password: "new-secret".into(),
    })
    .unwrap();
    let req = c.transport().last_request();
    assert_eq!(req.url, "http://api.test/api/v1/api/users/change-password");
    assert_eq!(
        request_json(&req),
        json!({"currentPassword": "old-secret", "newPassword": "new-secret"})
    );
}
