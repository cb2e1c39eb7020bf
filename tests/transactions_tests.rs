// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{FakeRates, logged_in_client, request_json};
use expensedesk::commands::transactions::{self, TxRow, resolve_category};
use expensedesk::expenses::fallback_categories;
use expensedesk::models::{Page, Transaction, TransactionKind};
use expensedesk::{cli, db::keys};
use rust_decimal_macros::dec;
use serde_json::json;

#[test]
fn category_resolves_by_id_or_name_of_matching_type() {
    let cats = fallback_categories();
    assert_eq!(resolve_category(&cats, TransactionKind::Income, "42"), Some(42));
    assert_eq!(
        resolve_category(&cats, TransactionKind::Income, "salary"),
        Some(-8)
    );
    assert_eq!(resolve_category(&cats, TransactionKind::Expense, "Salary"), None);
}

#[test]
fn transaction_page_tolerates_null_content() {
    let page: Page<Transaction> = serde_json::from_value(json!({"content": null})).unwrap();
    assert!(page.content.is_empty());

    let page: Page<Transaction> = serde_json::from_value(json!({
        "content": [{"id": 7, "amount": "12.50", "type": "EXPENSE", "transactionDate": "2025-08-01"}],
        "totalElements": 1
    }))
    .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].id, Some(7));
    assert_eq!(page.content[0].amount, Some(dec!(12.50)));
}

#[test]
fn row_fills_missing_fields() {
    let row = TxRow::from(&Transaction {
        amount: Some(dec!(9.5)),
        kind: Some("income".into()),
        ..Default::default()
    });
    assert_eq!(row.kind, "INCOME");
    assert_eq!(row.category, "Uncategorized");
    assert_eq!(row.date, "");
    assert_eq!(row.amount, dec!(9.5));
}

#[test]
fn add_command_converts_display_currency_to_usd() {
    let mut c = logged_in_client();
    c.session().storage().set(keys::PREFERRED_CURRENCY, "EUR").unwrap();
    let t = c.transport();
    t.push_json(
        200,
        json!({"data": [{"id": 4, "name": "Food", "type": "EXPENSE"}]}),
    );
    t.push_json(201, json!({"data": {"id": 99}}));

    let rates = FakeRates(Some(
        [("USD".to_string(), dec!(1)), ("EUR".to_string(), dec!(0.85))]
            .into_iter()
            .collect(),
    ));
    let matches = cli::build_cli().get_matches_from([
        "expensedesk",
        "tx",
        "add",
        "--amount",
        "85",
        "--category",
        "food",
        "--description",
        "Dinner",
        "--date",
        "2020-02-02",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    transactions::handle(&mut c, &rates, tx_m).unwrap();

    let body = request_json(&c.transport().last_request());
    assert_eq!(body["amount"], 100.0);
    assert_eq!(body["categoryId"], 4);
    assert_eq!(body["type"], "EXPENSE");
    assert_eq!(body["transactionDate"], "2020-02-02");
}

#[test]
fn add_command_stops_on_invalid_input() {
    let mut c = logged_in_client();
    c.transport().push_json(200, json!({"data": []}));
    let rates = FakeRates(None);
    let matches = cli::build_cli().get_matches_from([
        "expensedesk",
        "tx",
        "add",
        "--amount",
        "abc",
        "--category",
        "1",
        "--description",
        "x",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    assert!(transactions::handle(&mut c, &rates, tx_m).is_err());
    // Only the category fetch went out.
    assert_eq!(c.transport().requests().len(), 1);
}
