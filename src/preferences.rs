// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User preferences.
//!
//! Currency, theme and monthly budget live in local storage and always win.
//! The remaining fields come from the backend when it answers, else defaults.
//! Saving writes locally first and then tries to sync.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{ApiClient, Call, Service, Transport};
use crate::currency::{BASE_CURRENCY, RateTable, find_currency, round_money};
use crate::db::{Storage, keys};
use crate::errors::{Error, Result};

pub const DEFAULT_BUDGET: Decimal = dec!(5000);
const PREFERENCES_FAILED: &str = "Failed to update preferences";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::validation(
                "theme",
                format!("Unknown theme '{}', expected light or dark", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub currency: String,
    pub theme: Theme,
    pub language: String,
    /// Always USD.
    pub monthly_budget: Decimal,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub monthly_reports: bool,
    pub budget_alerts: bool,
    pub sound_enabled: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            currency: BASE_CURRENCY.to_string(),
            theme: Theme::Light,
            language: "en".to_string(),
            monthly_budget: DEFAULT_BUDGET,
            email_notifications: true,
            push_notifications: false,
            monthly_reports: true,
            budget_alerts: true,
            sound_enabled: true,
        }
    }
}

/// Backend view of the preferences; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePreferences {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub email_notifications: Option<bool>,
    #[serde(default)]
    pub push_notifications: Option<bool>,
    #[serde(default)]
    pub monthly_reports: Option<bool>,
    #[serde(default)]
    pub budget_alerts: Option<bool>,
    #[serde(default)]
    pub sound_enabled: Option<bool>,
}

/// Body of `PUT /api/users/preferences`. The budget stays local.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesPayload<'a> {
    currency: &'a str,
    theme: Theme,
    language: &'a str,
    email_notifications: bool,
    push_notifications: bool,
    monthly_reports: bool,
    budget_alerts: bool,
    sound_enabled: bool,
}

impl<'a> From<&'a UserPreferences> for PreferencesPayload<'a> {
    fn from(p: &'a UserPreferences) -> Self {
        Self {
            currency: &p.currency,
            theme: p.theme,
            language: &p.language,
            email_notifications: p.email_notifications,
            push_notifications: p.push_notifications,
            monthly_reports: p.monthly_reports,
            budget_alerts: p.budget_alerts,
            sound_enabled: p.sound_enabled,
        }
    }
}

impl UserPreferences {
    pub fn merge_remote(&mut self, remote: RemotePreferences) {
        if let Some(c) = remote.currency.filter(|c| find_currency(c).is_some()) {
            self.currency = c.to_ascii_uppercase();
        }
        if let Some(t) = remote.theme.and_then(|t| t.parse::<Theme>().ok()) {
            self.theme = t;
        }
        if let Some(l) = remote.language.filter(|l| !l.trim().is_empty()) {
            self.language = l;
        }
        let flags = [
            (remote.email_notifications, &mut self.email_notifications),
            (remote.push_notifications, &mut self.push_notifications),
            (remote.monthly_reports, &mut self.monthly_reports),
            (remote.budget_alerts, &mut self.budget_alerts),
            (remote.sound_enabled, &mut self.sound_enabled),
        ];
        for (value, slot) in flags {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    /// Overlays the locally stored keys.
    pub fn merge_local(&mut self, storage: &Storage) -> Result<()> {
        if let Some(c) = storage.get(keys::PREFERRED_CURRENCY)? {
            if find_currency(&c).is_some() {
                self.currency = c.to_ascii_uppercase();
            }
        }
        if let Some(t) = storage.get(keys::THEME)? {
            if let Ok(theme) = t.parse::<Theme>() {
                self.theme = theme;
            }
        }
        self.monthly_budget = monthly_budget(storage)?;
        Ok(())
    }

    pub fn save_local(&self, storage: &Storage) -> Result<()> {
        set_preferred_currency(storage, &self.currency)?;
        storage.set(keys::THEME, self.theme.as_str())?;
        if self.monthly_budget > Decimal::ZERO {
            storage.set(keys::MONTHLY_BUDGET, &self.monthly_budget.normalize().to_string())?;
        }
        Ok(())
    }
}

/// Result of a save: local storage always succeeded by the time this exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    LocalOnly(String),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }
}

pub fn preferred_currency(storage: &Storage) -> Result<String> {
    Ok(storage
        .get(keys::PREFERRED_CURRENCY)?
        .filter(|c| find_currency(c).is_some())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| BASE_CURRENCY.to_string()))
}

pub fn set_preferred_currency(storage: &Storage, code: &str) -> Result<()> {
    let info = find_currency(code).ok_or_else(|| {
        Error::validation("currency", format!("Unsupported currency '{}'", code.trim()))
    })?;
    storage.set(keys::PREFERRED_CURRENCY, info.code)?;
    Ok(())
}

/// Stored monthly budget in USD; unreadable or non-positive values fall
/// back to the default.
pub fn monthly_budget(storage: &Storage) -> Result<Decimal> {
    Ok(storage
        .get(keys::MONTHLY_BUDGET)?
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .filter(|b| *b > Decimal::ZERO)
        .unwrap_or(DEFAULT_BUDGET))
}

/// Parses a budget typed in `currency` and returns it in USD.
pub fn parse_budget_input(input: &str, currency: &str, rates: &RateTable) -> Result<Decimal> {
    let amount = input
        .trim()
        .parse::<Decimal>()
        .ok()
        .filter(|a| *a > Decimal::ZERO)
        .ok_or_else(|| Error::validation("budget", "Please enter a valid budget amount"))?;
    if currency.eq_ignore_ascii_case(BASE_CURRENCY) {
        return Ok(amount);
    }
    let rate = rates
        .get(&currency.to_ascii_uppercase())
        .copied()
        .filter(|r| !r.is_zero())
        .unwrap_or(Decimal::ONE);
    amount
        .checked_div(rate)
        .map(round_money)
        .ok_or_else(|| Error::validation("budget", "Please enter a valid budget amount"))
}

/// Stores a budget entered in the display currency. Returns the USD value.
pub fn set_budget(
    storage: &Storage,
    input: &str,
    currency: &str,
    rates: &RateTable,
) -> Result<Decimal> {
    let usd = parse_budget_input(input, currency, rates)?;
    storage.set(keys::MONTHLY_BUDGET, &usd.normalize().to_string())?;
    debug!(budget_usd = %usd, "monthly budget updated");
    Ok(usd)
}

impl<T: Transport> ApiClient<T> {
    pub fn get_remote_preferences(&mut self) -> Result<RemotePreferences> {
        self.fetch(
            Call::get(Service::Expense, "/api/users/preferences"),
            "Failed to load preferences",
        )
    }

    /// Defaults, then backend values when available, then local keys.
    pub fn load_preferences(&mut self) -> Result<UserPreferences> {
        let mut prefs = UserPreferences::default();
        match self.get_remote_preferences() {
            Ok(remote) => prefs.merge_remote(remote),
            Err(err @ Error::SessionExpired { .. }) => return Err(err),
            Err(err) => debug!(error = %err, "no backend preferences, using defaults"),
        }
        prefs.merge_local(self.session().storage())?;
        Ok(prefs)
    }

    /// Local write first; the backend sync is best-effort.
    pub fn save_preferences(&mut self, prefs: &UserPreferences) -> Result<SyncOutcome> {
        prefs.save_local(self.session().storage())?;
        let call = Call::put(Service::Expense, "/api/users/preferences")
            .json(&PreferencesPayload::from(prefs))?;
        let res = self
            .send(call)
            .and_then(|r| r.ensure_success(PREFERENCES_FAILED));
        match res {
            Ok(_) => Ok(SyncOutcome::Synced),
            Err(err @ Error::SessionExpired { .. }) => Err(err),
            Err(err) => {
                warn!(error = %err, "preferences saved locally but failed to sync to server");
                Ok(SyncOutcome::LocalOnly(err.to_string()))
            }
        }
    }
}
