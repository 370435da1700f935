// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fintrack::commands::doctor;
use fintrack::fx::{RatesSnapshot, cache_snapshot};
use fintrack::models::{Transaction, TxType};
use fintrack::storage::{KvStore, TRANSACTIONS_KEY};
use fintrack::store::TransactionStore;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();
    conn
}

fn tx(id: &str, amount: Decimal, t: TxType, currency: &str) -> Transaction {
    Transaction {
        id: id.into(),
        description: "Something".into(),
        amount,
        r#type: t,
        category: "Other".into(),
        currency: currency.into(),
        created_at: "2025-03-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap(),
    }
}

fn issue_kinds(conn: &Connection) -> Vec<String> {
    doctor::issues(conn)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect()
}

#[test]
fn clean_data_has_no_issues() {
    let conn = setup();
    TransactionStore::new(&conn)
        .save(&[tx("a", Decimal::from(5), TxType::Income, "EUR")])
        .unwrap();
    assert!(issue_kinds(&conn).is_empty());
}

#[test]
fn flags_duplicates_bad_amounts_and_fx_gaps() {
    let conn = setup();
    TransactionStore::new(&conn)
        .save(&[
            tx("a", Decimal::from(5), TxType::Income, "EUR"),
            tx("a", Decimal::ZERO, TxType::Expense, "EUR"),
            tx("b", Decimal::from(9), TxType::Expense, "USD"),
        ])
        .unwrap();
    let kinds = issue_kinds(&conn);
    assert!(kinds.contains(&"duplicate_id".to_string()));
    assert!(kinds.contains(&"non_positive_amount".to_string()));
    assert!(kinds.contains(&"missing_fx".to_string()));

    cache_snapshot(
        &conn,
        &RatesSnapshot {
            base: "EUR".into(),
            date: None,
            rates: HashMap::from([("USD".to_string(), 1.5)]),
        },
    )
    .unwrap();
    assert!(!issue_kinds(&conn).contains(&"missing_fx".to_string()));
}

#[test]
fn flags_unreadable_blob() {
    let conn = setup();
    conn.set(TRANSACTIONS_KEY, "oops").unwrap();
    assert_eq!(issue_kinds(&conn), vec!["unreadable_transactions"]);
}
