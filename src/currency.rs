// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exchange rates, display-currency conversion and formatting.
//!
//! Amounts of record are always USD. Rates are "1 USD = rate CODE" and a
//! missing or zero rate never raises: the amount is passed through unchanged.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::utils::http_client;

pub const BASE_CURRENCY: &str = "USD";
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub type RateTable = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", name: "US Dollar", flag: "🇺🇸" },
    CurrencyInfo { code: "EUR", symbol: "€", name: "Euro", flag: "🇪🇺" },
    CurrencyInfo { code: "GBP", symbol: "£", name: "British Pound", flag: "🇬🇧" },
    CurrencyInfo { code: "JPY", symbol: "¥", name: "Japanese Yen", flag: "🇯🇵" },
    CurrencyInfo { code: "CAD", symbol: "C$", name: "Canadian Dollar", flag: "🇨🇦" },
    CurrencyInfo { code: "AUD", symbol: "A$", name: "Australian Dollar", flag: "🇦🇺" },
    CurrencyInfo { code: "CHF", symbol: "Fr", name: "Swiss Franc", flag: "🇨🇭" },
    CurrencyInfo { code: "CNY", symbol: "¥", name: "Chinese Yuan", flag: "🇨🇳" },
    CurrencyInfo { code: "INR", symbol: "₹", name: "Indian Rupee", flag: "🇮🇳" },
    CurrencyInfo { code: "KRW", symbol: "₩", name: "South Korean Won", flag: "🇰🇷" },
    CurrencyInfo { code: "BRL", symbol: "R$", name: "Brazilian Real", flag: "🇧🇷" },
    CurrencyInfo { code: "ZAR", symbol: "R", name: "South African Rand", flag: "🇿🇦" },
    CurrencyInfo { code: "KES", symbol: "KSh", name: "Kenyan Shilling", flag: "🇰🇪" },
    CurrencyInfo { code: "NGN", symbol: "₦", name: "Nigerian Naira", flag: "🇳🇬" },
    CurrencyInfo { code: "EGP", symbol: "£", name: "Egyptian Pound", flag: "🇪🇬" },
];

pub fn find_currency(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

static FALLBACK_RATES: Lazy<RateTable> = Lazy::new(|| {
    [
        ("USD", dec!(1)),
        ("EUR", dec!(0.85)),
        ("GBP", dec!(0.73)),
        ("JPY", dec!(110.0)),
        ("CAD", dec!(1.25)),
        ("AUD", dec!(1.35)),
        ("CHF", dec!(0.92)),
        ("CNY", dec!(6.45)),
        ("INR", dec!(74.5)),
        ("KRW", dec!(1180.0)),
        ("BRL", dec!(5.25)),
        ("ZAR", dec!(15.0)),
        ("KES", dec!(110.0)),
        ("NGN", dec!(411.0)),
        ("EGP", dec!(15.7)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
});

/// Static table used whenever live rates cannot be fetched.
pub fn fallback_rates() -> RateTable {
    FALLBACK_RATES.clone()
}

pub trait RateSource {
    fn latest(&self, base: &str) -> Result<RateTable>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: BTreeMap<String, f64>,
}

/// exchangerate-api.com `v4/latest/{base}`.
pub struct ExchangeRateApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ExchangeRateApi {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout)?,
            base_url: config.rates_url.clone(),
        })
    }
}

impl RateSource for ExchangeRateApi {
    fn latest(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/{}", self.base_url, base);
        let resp = self.client.get(url).send()?.error_for_status()?;
        let body: LatestRates = resp.json()?;
        let rates: RateTable = body
            .rates
            .into_iter()
            .filter_map(|(code, r)| Decimal::try_from(r).ok().map(|d| (code, d)))
            .collect();
        if rates.is_empty() {
            return Err(Error::Decode("rates table is empty".into()));
        }
        Ok(rates)
    }
}

/// Live rates for `base`, or the fallback table. Never fails.
pub fn get_exchange_rates(source: &dyn RateSource, base: &str) -> RateTable {
    match source.latest(base) {
        Ok(rates) => {
            debug!(base, count = rates.len(), "fetched exchange rates");
            rates
        }
        Err(err) => {
            warn!(error = %err, "failed to fetch exchange rates, using fallback table");
            fallback_rates()
        }
    }
}

fn rate_for(code: &str, rates: &RateTable) -> Option<Decimal> {
    if code.eq_ignore_ascii_case(BASE_CURRENCY) {
        return Some(Decimal::ONE);
    }
    rates
        .get(code)
        .or_else(|| rates.get(&code.to_ascii_uppercase()))
        .copied()
        .filter(|r| !r.is_zero())
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts `amount` from one code to another through USD, rounded to cents.
pub fn convert_currency(amount: Decimal, from: &str, to: &str, rates: &RateTable) -> Decimal {
    if from.eq_ignore_ascii_case(to) {
        return amount;
    }
    let (Some(from_rate), Some(to_rate)) = (rate_for(from, rates), rate_for(to, rates)) else {
        return amount;
    };
    amount
        .checked_div(from_rate)
        .and_then(|usd| usd.checked_mul(to_rate))
        .map(round_money)
        .unwrap_or(amount)
}

/// en-US currency rendering with two fraction digits.
pub fn format_currency(amount: Decimal, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let grouped = group_thousands(int_part);
    let body = match en_us_symbol(&code) {
        Some(sym) => format!("{}{}.{}", sym, grouped, frac_part),
        None => format!("{}\u{a0}{}.{}", code, grouped, frac_part),
    };
    if negative { format!("-{}", body) } else { body }
}

/// Formats a USD amount of record in the display currency.
pub fn display_usd(amount: Decimal, currency: &str, rates: &RateTable) -> String {
    format_currency(
        convert_currency(amount, BASE_CURRENCY, currency, rates),
        currency,
    )
}

fn en_us_symbol(code: &str) -> Option<&'static str> {
    Some(match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "BRL" => "R$",
        _ => return None,
    })
}

fn group_thousands(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keeps a rate table fresh on a background thread.
///
/// The first fetch happens before `start` returns. Dropping the refresher
/// stops the thread.
pub struct RateRefresher {
    rates: Arc<RwLock<RateTable>>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RateRefresher {
    pub fn start<S>(source: S, base: &str, interval: Duration) -> Self
    where
        S: RateSource + Send + 'static,
    {
        let rates = Arc::new(RwLock::new(get_exchange_rates(&source, base)));
        let (tx, rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&rates);
        let base = base.to_string();
        let handle = thread::spawn(move || {
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let fresh = get_exchange_rates(&source, &base);
                        match shared.write() {
                            Ok(mut guard) => *guard = fresh,
                            Err(_) => break,
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("rate refresher stopped");
        });
        Self {
            rates,
            stop: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn rates(&self) -> RateTable {
        self.rates
            .read()
            .map(|g| g.clone())
            .unwrap_or_else(|_| fallback_rates())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for RateRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}
