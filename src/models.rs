// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_DESCRIPTION_CHARS: usize = 200;

const DEFAULT_INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investment", "Gift", "Other"];
const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Rent",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Shopping",
    "Other",
];

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxType::Income => "Income",
            TxType::Expense => "Expense",
        }
    }

    pub fn default_categories(&self) -> &'static [&'static str] {
        match self {
            TxType::Income => DEFAULT_INCOME_CATEGORIES,
            TxType::Expense => DEFAULT_EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(anyhow::anyhow!(
                "Invalid type '{}', expected income|expense",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    #[serde(with = "amount_json")]
    pub amount: Decimal,
    pub r#type: TxType,
    pub category: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

// Records written before currencies were tracked carry none.
fn default_currency() -> String {
    "USD".to_string()
}

/// Fields supplied by the caller when recording a transaction; the store
/// assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub r#type: TxType,
    pub category: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub r#type: Option<TxType>,
    pub category: Option<String>,
    pub currency: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.r#type.is_none()
            && self.category.is_none()
            && self.currency.is_none()
    }

    pub fn apply_to(self, tx: &mut Transaction) {
        if let Some(d) = self.description {
            tx.description = d;
        }
        if let Some(a) = self.amount {
            tx.amount = a;
        }
        if let Some(t) = self.r#type {
            tx.r#type = t;
        }
        if let Some(c) = self.category {
            tx.category = c;
        }
        if let Some(c) = self.currency {
            tx.currency = c;
        }
    }
}

/// User-added categories, persisted apart from the transactions and merged
/// with the built-in defaults at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCategories {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
}

impl CustomCategories {
    pub fn for_type(&self, t: TxType) -> &[String] {
        match t {
            TxType::Income => &self.income,
            TxType::Expense => &self.expense,
        }
    }

    pub fn for_type_mut(&mut self, t: TxType) -> &mut Vec<String> {
        match t {
            TxType::Income => &mut self.income,
            TxType::Expense => &mut self.expense,
        }
    }
}

fn validate_description(d: &str) -> Result<(), ValidationError> {
    if d.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    let n = d.chars().count();
    if n > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong(n));
    }
    Ok(())
}

fn validate_amount(a: Decimal) -> Result<(), ValidationError> {
    if a <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(a));
    }
    if !amount_json::round_trips(a) {
        return Err(ValidationError::AmountTooPrecise(a));
    }
    Ok(())
}

fn validate_category(c: &str) -> Result<(), ValidationError> {
    if c.trim().is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(())
}

pub fn validate_currency(c: &str) -> Result<(), ValidationError> {
    if !CURRENCY_CODE.is_match(c) {
        return Err(ValidationError::InvalidCurrency(c.to_string()));
    }
    Ok(())
}

pub fn validate_new(tx: &NewTransaction) -> Result<(), ValidationError> {
    validate_description(&tx.description)?;
    validate_amount(tx.amount)?;
    validate_category(&tx.category)?;
    validate_currency(&tx.currency)?;
    Ok(())
}

pub fn validate_patch(p: &TransactionPatch) -> Result<(), ValidationError> {
    if p.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(d) = &p.description {
        validate_description(d)?;
    }
    if let Some(a) = p.amount {
        validate_amount(a)?;
    }
    if let Some(c) = &p.category {
        validate_category(c)?;
    }
    if let Some(c) = &p.currency {
        validate_currency(c)?;
    }
    Ok(())
}

// Amounts are JSON numbers on disk. Going through the shortest f64 text
// keeps 12.34 as 12.34 instead of its binary expansion.
mod amount_json {
    use std::fmt;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    /// Whether `d` reads back unchanged after being written as a number.
    pub fn round_trips(d: Decimal) -> bool {
        d.to_f64()
            .and_then(|f| f.to_string().parse::<Decimal>().ok())
            .is_some_and(|back| back == d)
    }

    pub fn serialize<S: Serializer>(d: &Decimal, s: S) -> Result<S::Ok, S::Error> {
        match d.to_f64() {
            Some(f) => s.serialize_f64(f),
            None => s.serialize_str(&d.to_string()),
        }
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            if !v.is_finite() {
                return Err(E::custom(format!("non-finite amount {}", v)));
            }
            v.to_string().parse::<Decimal>().map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            v.trim().parse::<Decimal>().map_err(E::custom)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        d.deserialize_any(AmountVisitor)
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
