// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::rate_table;
use crate::models::MAX_DESCRIPTION_CHARS;
use crate::storage::{CUSTOM_CATEGORIES_KEY, KvStore};
use crate::store::TransactionStore;
use crate::utils::{get_reference_currency, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let store = TransactionStore::new(conn);

    // 1) Blob that reads as empty because it cannot be parsed
    let txs = match store.load() {
        Ok(txs) => txs,
        Err(e) => {
            rows.push(vec!["unreadable_transactions".into(), e.to_string()]);
            Vec::new()
        }
    };

    // 2) Record-level problems the store never checks
    let mut seen = HashSet::new();
    for t in &txs {
        if !seen.insert(t.id.as_str()) {
            rows.push(vec!["duplicate_id".into(), t.id.clone()]);
        }
        if t.amount <= Decimal::ZERO {
            rows.push(vec!["non_positive_amount".into(), format!("{} {}", t.id, t.amount)]);
        }
        if t.description.trim().is_empty() {
            rows.push(vec!["empty_description".into(), t.id.clone()]);
        } else if t.description.chars().count() > MAX_DESCRIPTION_CHARS {
            rows.push(vec!["long_description".into(), t.id.clone()]);
        }
        if t.category.trim().is_empty() {
            rows.push(vec!["empty_category".into(), t.id.clone()]);
        }
    }

    // 3) Custom categories
    if let Some(raw) = conn.get(CUSTOM_CATEGORIES_KEY)? {
        if let Err(e) = serde_json::from_str::<crate::models::CustomCategories>(&raw) {
            rows.push(vec!["unreadable_categories".into(), e.to_string()]);
        }
    }

    // 4) FX coverage gaps against the reference currency
    let reference = get_reference_currency(conn)?;
    let rates = rate_table(conn, &reference);
    let missing: BTreeSet<&str> = txs
        .iter()
        .map(|t| t.currency.as_str())
        .filter(|c| !rates.covers(c))
        .collect();
    for c in missing {
        rows.push(vec!["missing_fx".into(), format!("{} -> {}", c, reference)]);
    }

    Ok(rows)
}
