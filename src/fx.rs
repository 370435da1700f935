// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::storage::{FX_RATES_KEY, KvStore};
use crate::store::{load_slot, save_slot};

pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.dev/v1/latest";

/// Rates quoted against `base`: 1 unit of base buys `rate` units of a code.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: Option<HashMap<String, Decimal>>,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, Decimal>) -> Self {
        Self {
            base: base.to_uppercase(),
            rates: Some(rates),
        }
    }

    pub fn unavailable(base: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            rates: None,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn is_available(&self) -> bool {
        self.rates.is_some()
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.as_ref()?.get(code).copied()
    }

    pub fn covers(&self, code: &str) -> bool {
        code == self.base || self.rate(code).is_some_and(|r| !r.is_zero())
    }

    /// Converts `amount` of `code` into the base currency. Missing rates
    /// leave the amount untouched.
    pub fn convert(&self, amount: Decimal, code: &str) -> Decimal {
        if code == self.base {
            return amount;
        }
        match self.rate(code) {
            Some(r) if !r.is_zero() => amount.checked_div(r).unwrap_or(amount),
            _ => amount,
        }
    }
}

/// Latest-rates payload as served by Frankfurter/Fixer style endpoints,
/// and as cached in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesSnapshot {
    pub base: String,
    #[serde(default)]
    pub date: Option<String>,
    pub rates: HashMap<String, f64>,
}

impl RatesSnapshot {
    /// Table for `reference`; rates quoted against another base are not usable.
    pub fn to_table(&self, reference: &str) -> RateTable {
        if !self.base.eq_ignore_ascii_case(reference) {
            warn!(
                "cached rates are quoted in {} but reference currency is {}; ignoring them",
                self.base, reference
            );
            return RateTable::unavailable(reference);
        }
        let mut rates = HashMap::new();
        for (code, r) in &self.rates {
            match Decimal::try_from(*r) {
                Ok(d) => {
                    rates.insert(code.to_uppercase(), d);
                }
                Err(_) => warn!("skipping unusable rate {} for {}", r, code),
            }
        }
        RateTable::new(reference, rates)
    }
}

pub fn fetch_latest(
    client: &reqwest::blocking::Client,
    url: &str,
    base: &str,
) -> Result<RatesSnapshot> {
    debug!("fetching rates for {} from {}", base, url);
    let resp = client
        .get(url)
        .query(&[("base", base)])
        .send()
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()?;
    let snap: RatesSnapshot = resp.json().context("Unexpected rates payload")?;
    Ok(snap)
}

pub fn cache_snapshot<S: KvStore + ?Sized>(kv: &S, snap: &RatesSnapshot) -> Result<(), StoreError> {
    save_slot(kv, FX_RATES_KEY, snap)
}

pub fn load_cached<S: KvStore + ?Sized>(kv: &S) -> Option<RatesSnapshot> {
    match load_slot(kv, FX_RATES_KEY) {
        Ok(s) => s,
        Err(e) => {
            warn!("reading cached rates failed: {e}");
            None
        }
    }
}

/// Rates for `reference` from the cache, or an unavailable table.
pub fn rate_table<S: KvStore + ?Sized>(kv: &S, reference: &str) -> RateTable {
    load_cached(kv)
        .map(|s| s.to_table(reference))
        .unwrap_or_else(|| RateTable::unavailable(reference))
}
