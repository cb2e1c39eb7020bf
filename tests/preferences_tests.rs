// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{logged_in_client, request_json};
use expensedesk::currency::RateTable;
use expensedesk::db::{Storage, keys};
use expensedesk::errors::Error;
use expensedesk::preferences::{
    DEFAULT_BUDGET, SyncOutcome, Theme, UserPreferences, monthly_budget, parse_budget_input,
    preferred_currency, set_budget, set_preferred_currency,
};
use rust_decimal_macros::dec;
use serde_json::json;

fn rates() -> RateTable {
    [("USD".to_string(), dec!(1)), ("EUR".to_string(), dec!(0.85))]
        .into_iter()
        .collect()
}

#[test]
fn defaults_match_a_fresh_account() {
    let p = UserPreferences::default();
    assert_eq!(p.currency, "USD");
    assert_eq!(p.theme, Theme::Light);
    assert_eq!(p.language, "en");
    assert_eq!(p.monthly_budget, dec!(5000));
    assert!(p.email_notifications && !p.push_notifications);
    assert!(p.monthly_reports && p.budget_alerts && p.sound_enabled);
}

#[test]
fn budget_defaults_when_missing_or_invalid() {
    let s = Storage::in_memory().unwrap();
    assert_eq!(monthly_budget(&s).unwrap(), DEFAULT_BUDGET);
    s.set(keys::MONTHLY_BUDGET, "abc").unwrap();
    assert_eq!(monthly_budget(&s).unwrap(), DEFAULT_BUDGET);
    s.set(keys::MONTHLY_BUDGET, "-5").unwrap();
    assert_eq!(monthly_budget(&s).unwrap(), DEFAULT_BUDGET);
    s.set(keys::MONTHLY_BUDGET, "1234.5").unwrap();
    assert_eq!(monthly_budget(&s).unwrap(), dec!(1234.5));
}

#[test]
fn budget_input_is_stored_in_usd() {
    let s = Storage::in_memory().unwrap();
    assert_eq!(set_budget(&s, "85", "EUR", &rates()).unwrap(), dec!(100));
    assert_eq!(s.get(keys::MONTHLY_BUDGET).unwrap().as_deref(), Some("100"));
    assert_eq!(monthly_budget(&s).unwrap(), dec!(100));

    // Unknown currency uses a rate of 1.
    assert_eq!(parse_budget_input("42", "KES", &rates()).unwrap(), dec!(42));
}

#[test]
fn invalid_budget_input_is_rejected() {
    for input in ["", "abc", "0", "-10"] {
        let err = parse_budget_input(input, "USD", &rates()).unwrap_err();
        let Error::Validation(f) = err else {
            panic!("expected validation error for {:?}", input);
        };
        assert_eq!(f.get("budget"), Some("Please enter a valid budget amount"));
    }
}

#[test]
fn budget_too_large_to_convert_is_rejected() {
    let mut r = rates();
    r.insert("TINY".to_string(), dec!(0.0000000001));
    let err = parse_budget_input("79228162514264337593543950335", "TINY", &r).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn preferred_currency_only_accepts_catalogue_codes() {
    let s = Storage::in_memory().unwrap();
    assert_eq!(preferred_currency(&s).unwrap(), "USD");
    set_preferred_currency(&s, "gbp").unwrap();
    assert_eq!(preferred_currency(&s).unwrap(), "GBP");
    assert!(set_preferred_currency(&s, "DOGE").is_err());
    assert_eq!(preferred_currency(&s).unwrap(), "GBP");
}

#[test]
fn load_overlays_remote_then_local() {
    let mut c = logged_in_client();
    let storage = c.session().storage();
    storage.set(keys::PREFERRED_CURRENCY, "EUR").unwrap();
    storage.set(keys::THEME, "dark").unwrap();
    c.transport().push_json(
        200,
        json!({"data": {
            "currency": "JPY",
            "theme": "light",
            "language": "fr",
            "pushNotifications": true,
            "soundEnabled": false
        }}),
    );

    let p = c.load_preferences().unwrap();
    assert_eq!(p.currency, "EUR");
    assert_eq!(p.theme, Theme::Dark);
    assert_eq!(p.language, "fr");
    assert!(p.push_notifications);
    assert!(!p.sound_enabled);
    assert!(p.email_notifications);
    assert_eq!(
        c.transport().last_request().url,
        "http://api.test/api/v1/api/users/preferences"
    );
}

#[test]
fn load_uses_defaults_when_backend_is_down() {
    let mut c = logged_in_client();
    c.transport().push_json(404, json!({"error": "Not Found"}));
    let p = c.load_preferences().unwrap();
    assert_eq!(p, UserPreferences::default());
}

#[test]
fn save_is_local_first_and_reports_failed_sync() {
    let mut c = logged_in_client();
    c.transport().push_json(503, json!({"message": "Service unavailable"}));

    let prefs = UserPreferences {
        currency: "GBP".into(),
        theme: Theme::Dark,
        push_notifications: true,
        ..UserPreferences::default()
    };
    let outcome = c.save_preferences(&prefs).unwrap();
    assert_eq!(outcome, SyncOutcome::LocalOnly("Service unavailable".into()));
    assert!(!outcome.is_synced());

    let storage = c.session().storage();
    assert_eq!(storage.get(keys::PREFERRED_CURRENCY).unwrap().as_deref(), Some("GBP"));
    assert_eq!(storage.get(keys::THEME).unwrap().as_deref(), Some("dark"));

    let body = request_json(&c.transport().last_request());
    assert_eq!(body["currency"], "GBP");
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["pushNotifications"], true);
    assert!(body.get("monthlyBudget").is_none());

    // The next load still sees the local values.
    c.transport().push_network_error();
    let loaded = c.load_preferences().unwrap();
    assert_eq!(loaded.currency, "GBP");
    assert_eq!(loaded.theme, Theme::Dark);
}

#[test]
fn save_reports_synced_on_success() {
    let mut c = logged_in_client();
    c.transport().push_json(200, json!({"success": true}));
    let outcome = c.save_preferences(&UserPreferences::default()).unwrap();
    assert!(outcome.is_synced());
}

#[test]
fn theme_parsing() {
    assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
    assert!("sepia".parse::<Theme>().is_err());
    assert_eq!(Theme::Light.to_string(), "light");
}
