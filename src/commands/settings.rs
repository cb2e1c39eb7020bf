// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::api::{ApiClient, Transport};
use crate::commands::require_login;
use crate::currency::{BASE_CURRENCY, RateSource, display_usd, find_currency, get_exchange_rates};
use crate::errors::Error;
use crate::forms::PasswordChange;
use crate::models::User;
use crate::notify::{ConsoleNotifier, Notifier, Toast, Variant};
use crate::preferences::{SyncOutcome, UserPreferences, preferred_currency, set_budget};
use crate::users::ProfileUpdate;
use crate::utils::{arg, maybe_print_json, pretty_table};

pub fn handle<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(client, sub)?,
        Some(("profile", sub)) => profile(client, sub)?,
        Some(("password", sub)) => password(client, sub)?,
        Some(("prefs", sub)) => prefs(client, sub)?,
        Some(("budget", sub)) => budget(client, source, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct SettingsView {
    profile: Option<User>,
    preferences: UserPreferences,
}

fn show<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    let profile = match client.get_profile() {
        Ok(p) => Some(p),
        Err(err @ Error::SessionExpired { .. }) => return Err(err.into()),
        Err(err) => {
            warn!(error = %err, "profile fetch failed, showing cached user");
            ConsoleNotifier.toast(Toast::new(
                "Warning",
                "Some settings could not be loaded. Using defaults.",
                Variant::Warning,
            ));
            client.session().user().cloned()
        }
    };
    let preferences = client.load_preferences()?;
    let view = SettingsView {
        profile,
        preferences,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    let p = &view.preferences;
    let mut rows = Vec::new();
    if let Some(u) = &view.profile {
        rows.push(vec!["Name".to_string(), u.display_name()]);
        rows.push(vec!["Email".to_string(), u.email.clone()]);
    }
    let on_off = |b: bool| if b { "on".to_string() } else { "off".to_string() };
    rows.extend([
        vec!["Currency".to_string(), p.currency.clone()],
        vec!["Theme".to_string(), p.theme.to_string()],
        vec!["Language".to_string(), p.language.clone()],
        vec![
            "Monthly budget".to_string(),
            format!("{} USD", p.monthly_budget.normalize()),
        ],
        vec!["Email notifications".to_string(), on_off(p.email_notifications)],
        vec!["Push notifications".to_string(), on_off(p.push_notifications)],
        vec!["Monthly reports".to_string(), on_off(p.monthly_reports)],
        vec!["Budget alerts".to_string(), on_off(p.budget_alerts)],
        vec!["Sound".to_string(), on_off(p.sound_enabled)],
    ]);
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

fn profile<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    let update = ProfileUpdate {
        first_name: arg(sub, "first-name")?.to_string(),
        last_name: arg(sub, "last-name")?.to_string(),
    };
    client.update_profile(&update)?;
    ConsoleNotifier.toast(Toast::success("Your profile has been updated successfully"));
    Ok(())
}

fn password<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    require_login(client)?;
    let change = PasswordChange {
        current_password: arg(sub, "current")?.to_string(),
        new_password: arg(sub, "new")?.to_string(),
        confirm_password: arg(sub, "confirm")?.to_string(),
    };
    client.change_password(&change)?;
    ConsoleNotifier.toast(Toast::success("Your password has been changed successfully"));
    Ok(())
}

fn prefs<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let mut p = client.load_preferences()?;
    if let Some(c) = sub.get_one::<String>("currency") {
        let info = find_currency(c)
            .ok_or_else(|| Error::validation("currency", format!("Unsupported currency '{}'", c)))?;
        p.currency = info.code.to_string();
    }
    if let Some(t) = sub.get_one::<String>("theme") {
        p.theme = t.parse()?;
    }
    if let Some(l) = sub.get_one::<String>("language") {
        p.language = l.trim().to_string();
    }
    let flags = [
        ("email-notifications", &mut p.email_notifications),
        ("push-notifications", &mut p.push_notifications),
        ("monthly-reports", &mut p.monthly_reports),
        ("budget-alerts", &mut p.budget_alerts),
        ("sound", &mut p.sound_enabled),
    ];
    for (name, slot) in flags {
        if let Some(v) = sub.get_one::<bool>(name) {
            *slot = *v;
        }
    }
    match client.save_preferences(&p)? {
        SyncOutcome::Synced => {
            ConsoleNotifier.toast(Toast::success("Preferences saved"));
        }
        SyncOutcome::LocalOnly(reason) => ConsoleNotifier.toast(Toast::new(
            "Saved locally",
            format!("Preferences saved locally but failed to sync to server ({})", reason),
            Variant::Warning,
        )),
    }
    Ok(())
}

fn budget<T: Transport>(
    client: &mut ApiClient<T>,
    source: &dyn RateSource,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let storage = client.session().storage();
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => find_currency(c)
            .map(|info| info.code.to_string())
            .ok_or_else(|| Error::validation("currency", format!("Unsupported currency '{}'", c)))?,
        None => preferred_currency(storage)?,
    };
    let rates = get_exchange_rates(source, BASE_CURRENCY);
    let usd = set_budget(storage, arg(sub, "amount")?, &currency, &rates)?;
    ConsoleNotifier.toast(Toast::new(
        "Budget Updated",
        format!("Monthly budget set to {}", display_usd(usd, &currency, &rates)),
        Variant::Default,
    ));
    Ok(())
}
