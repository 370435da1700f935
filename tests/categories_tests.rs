// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::models::{CustomCategories, TxType};
use fintrack::storage::{CUSTOM_CATEGORIES_KEY, KvStore, MemoryKv};
use fintrack::store::CategoryStore;
use fintrack::{cli, commands::categories};
use rusqlite::Connection;
use serde_json::json;

#[test]
fn defaults_come_first_then_custom_additions() {
    let kv = MemoryKv::new();
    let store = CategoryStore::new(&kv);
    assert_eq!(
        store.available(TxType::Income),
        vec!["Salary", "Freelance", "Investment", "Gift", "Other"]
    );

    assert!(store.add(TxType::Income, "  Dividends ").unwrap());
    let income = store.available(TxType::Income);
    assert_eq!(income.last().map(String::as_str), Some("Dividends"));
    assert_eq!(store.available(TxType::Expense).len(), 8);
}

#[test]
fn add_skips_blank_and_already_offered_names() {
    let kv = MemoryKv::new();
    let store = CategoryStore::new(&kv);
    assert!(!store.add(TxType::Expense, "   ").unwrap());
    assert!(!store.add(TxType::Expense, "Food").unwrap());
    assert!(store.add(TxType::Expense, "Pets").unwrap());
    assert!(!store.add(TxType::Expense, "Pets").unwrap());
    // same name is fine under the other type
    assert!(store.add(TxType::Income, "Pets").unwrap());
    assert_eq!(
        store.load(),
        CustomCategories {
            income: vec!["Pets".into()],
            expense: vec!["Pets".into()],
        }
    );
}

#[test]
fn persisted_shape_has_income_and_expense_lists() {
    let kv = MemoryKv::new();
    CategoryStore::new(&kv)
        .add(TxType::Expense, "Pets")
        .unwrap();
    let raw = kv.get(CUSTOM_CATEGORIES_KEY).unwrap().unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v, json!({"income": [], "expense": ["Pets"]}));
}

#[test]
fn malformed_custom_categories_fall_back_to_defaults() {
    let kv = MemoryKv::new();
    kv.set(CUSTOM_CATEGORIES_KEY, "[1,2").unwrap();
    let store = CategoryStore::new(&kv);
    assert_eq!(store.load(), CustomCategories::default());
    assert_eq!(store.available(TxType::Expense).len(), 8);
    assert!(store.add(TxType::Expense, "Pets").is_err());
}

#[test]
fn category_commands_round_trip_through_sqlite() {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();

    let matches = cli::build_cli().get_matches_from([
        "fintrack", "category", "add", "--type", "expense", "--name", "Pets",
    ]);
    let Some(("category", cat_m)) = matches.subcommand() else {
        panic!("no category subcommand");
    };
    categories::handle(&conn, cat_m).unwrap();

    let rows = categories::rows(&conn, &[TxType::Expense]);
    let last = rows.last().unwrap();
    assert_eq!(last, &vec!["Expense".to_string(), "Pets".into(), "custom".into()]);
    assert_eq!(rows[0][2], "default");
}
