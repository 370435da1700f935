// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use fintrack::models::{Transaction, TxType};
use fintrack::store::TransactionStore;
use fintrack::{cli, commands::transactions};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn tx(id: &str, t: TxType, amount: i64, category: &str, day: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        description: format!("{} on day {}", category, day),
        amount: Decimal::from(amount),
        r#type: t,
        category: category.to_string(),
        currency: "USD".to_string(),
        created_at: format!("2025-01-{:02}T10:00:00Z", day)
            .parse::<DateTime<Utc>>()
            .unwrap(),
    }
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();
    let store = TransactionStore::new(&conn);
    store
        .save(&[
            tx("t1", TxType::Income, 100, "Salary", 1),
            tx("t2", TxType::Expense, 30, "Food", 2),
            tx("t3", TxType::Income, 50, "Freelance", 3),
            tx("t4", TxType::Expense, 12, "Food", 4),
            tx("t5", TxType::Income, 75, "Salary", 5),
        ])
        .unwrap();
    conn
}

fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["fintrack", "tx"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    match matches.subcommand() {
        Some(("tx", tx_m)) => tx_m.clone(),
        _ => panic!("no tx subcommand"),
    }
}

fn list_ids(conn: &Connection, args: &[&str]) -> Vec<String> {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    let tx_m = tx_matches(&full);
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let page = transactions::query_view(conn, list_m).unwrap();
    page.items.into_iter().map(|t| t.id).collect()
}

#[test]
fn list_defaults_to_newest_first_and_ten_per_page() {
    let conn = setup();
    assert_eq!(list_ids(&conn, &[]), vec!["t5", "t4", "t3", "t2", "t1"]);
}

#[test]
fn list_filters_by_type_and_category() {
    let conn = setup();
    assert_eq!(
        list_ids(&conn, &["--type", "income", "--category", "Salary"]),
        vec!["t5", "t1"]
    );
    assert_eq!(list_ids(&conn, &["--type", "expense"]), vec!["t4", "t2"]);
    assert_eq!(list_ids(&conn, &["--category", "all"]).len(), 5);
}

#[test]
fn list_searches_descriptions() {
    let conn = setup();
    assert_eq!(list_ids(&conn, &["--search", "FOOD ON"]), vec!["t4", "t2"]);
}

#[test]
fn list_sorts_by_amount() {
    let conn = setup();
    assert_eq!(
        list_ids(&conn, &["--sort-amount", "asc"]),
        vec!["t4", "t2", "t3", "t5", "t1"]
    );
    assert_eq!(
        list_ids(&conn, &["--sort-date", "asc"]),
        vec!["t1", "t2", "t3", "t4", "t5"]
    );
}

#[test]
fn list_rejects_two_sort_axes() {
    let res = cli::build_cli().try_get_matches_from([
        "fintrack",
        "tx",
        "list",
        "--sort-date",
        "asc",
        "--sort-amount",
        "desc",
    ]);
    assert!(res.is_err());
}

#[test]
fn list_pages_and_clamps() {
    let conn = setup();
    assert_eq!(
        list_ids(&conn, &["--per-page", "2", "--page", "2"]),
        vec!["t3", "t2"]
    );
    assert_eq!(list_ids(&conn, &["--per-page", "2", "--page", "9"]), vec!["t1"]);
    assert_eq!(list_ids(&conn, &["--all"]).len(), 5);
}

#[test]
fn add_then_edit_keeps_identity() {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();

    let add = tx_matches(&[
        "add",
        "--description",
        "Dinner",
        "--amount",
        "42.50",
        "--type",
        "expense",
        "--category",
        "Food",
        "--currency",
        "eur",
    ]);
    transactions::handle(&conn, &add).unwrap();

    let store = TransactionStore::new(&conn);
    let all = store.get_all();
    assert_eq!(all.len(), 1);
    let orig = all[0].clone();
    assert_eq!(orig.currency, "EUR");
    assert_eq!(orig.amount, Decimal::new(4250, 2));

    let edit = tx_matches(&["edit", &orig.id, "--amount", "40", "--category", "Entertainment"]);
    transactions::handle(&conn, &edit).unwrap();

    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, orig.id);
    assert_eq!(all[0].created_at, orig.created_at);
    assert_eq!(all[0].amount, Decimal::from(40));
    assert_eq!(all[0].category, "Entertainment");
    assert_eq!(all[0].description, "Dinner");
}

#[test]
fn add_rejects_invalid_input() {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();

    let zero = tx_matches(&[
        "add", "-d", "Oops", "-a", "0", "-t", "expense", "-c", "Food",
    ]);
    let err = transactions::handle(&conn, &zero).unwrap_err();
    assert!(err.to_string().contains("positive"));

    let long = "x".repeat(201);
    let too_long = tx_matches(&[
        "add", "-d", &long, "-a", "1", "-t", "expense", "-c", "Food",
    ]);
    assert!(transactions::handle(&conn, &too_long).is_err());

    let bad_ccy = tx_matches(&[
        "add", "-d", "Tea", "-a", "1", "-t", "expense", "-c", "Food", "--currency", "EU",
    ]);
    assert!(transactions::handle(&conn, &bad_ccy).is_err());

    let too_precise = tx_matches(&[
        "add", "-d", "Tea", "-a", "12345678901234567.89", "-t", "expense", "-c", "Food",
    ]);
    let err = transactions::handle(&conn, &too_precise).unwrap_err();
    assert!(err.to_string().contains("significant digits"));

    assert!(TransactionStore::new(&conn).get_all().is_empty());
}

#[test]
fn edit_without_fields_or_unknown_id_fails() {
    let conn = setup();
    let empty = tx_matches(&["edit", "t1"]);
    assert!(transactions::handle(&conn, &empty).is_err());

    let unknown = tx_matches(&["edit", "zzz", "--amount", "3"]);
    let err = transactions::handle(&conn, &unknown).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn rm_deletes_and_reports_unknown_ids() {
    let conn = setup();
    transactions::handle(&conn, &tx_matches(&["rm", "t2"])).unwrap();
    let store = TransactionStore::new(&conn);
    assert!(store.find("t2").is_none());
    assert_eq!(store.get_all().len(), 4);

    assert!(transactions::handle(&conn, &tx_matches(&["rm", "t2"])).is_err());
    assert_eq!(store.get_all().len(), 4);
}

#[test]
fn columns_render_typed_cells() {
    let t = tx("t9", TxType::Expense, 12, "Food", 4);
    let cols = transactions::transaction_columns();
    let row = transactions::render_rows(&cols, std::slice::from_ref(&t)).remove(0);
    let headers: Vec<_> = cols.iter().map(|c| c.header()).collect();
    assert_eq!(
        headers,
        vec!["Date", "Description", "Category", "Type", "Amount", "Id"]
    );
    assert_eq!(row[2], "[Food]");
    assert_eq!(row[3], "[Expense]");
    assert_eq!(row[4], "-USD 12.00");
    assert_eq!(row[5], "t9");
}
