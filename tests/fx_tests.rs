// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use fintrack::config::AppConfig;
use fintrack::error::ValidationError;
use fintrack::fx::{RateTable, RatesSnapshot, cache_snapshot, load_cached, rate_table};
use fintrack::storage::{FX_RATES_KEY, KvStore, MemoryKv};
use fintrack::utils::{get_reference_currency, set_reference_currency};
use fintrack::{cli, commands};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn eur_table() -> RateTable {
    RateTable::new(
        "EUR",
        HashMap::from([
            ("USD".to_string(), Decimal::new(125, 2)),
            ("JPY".to_string(), Decimal::from(160)),
            ("BAD".to_string(), Decimal::ZERO),
        ]),
    )
}

fn snapshot(base: &str) -> RatesSnapshot {
    RatesSnapshot {
        base: base.to_string(),
        date: Some("2025-08-01".to_string()),
        rates: HashMap::from([("USD".to_string(), 1.25), ("GBP".to_string(), 0.5)]),
    }
}

#[test]
fn reference_currency_passes_through() {
    let t = eur_table();
    assert_eq!(t.convert(Decimal::from(100), "EUR"), Decimal::from(100));
}

#[test]
fn unknown_code_passes_through() {
    let t = eur_table();
    assert_eq!(t.convert(Decimal::from(100), "XYZ"), Decimal::from(100));
    assert!(!t.covers("XYZ"));
}

#[test]
fn missing_rates_pass_through() {
    let t = RateTable::unavailable("EUR");
    assert!(!t.is_available());
    assert_eq!(t.convert(Decimal::from(100), "USD"), Decimal::from(100));
}

#[test]
fn zero_rate_is_treated_as_missing() {
    let t = eur_table();
    assert_eq!(t.convert(Decimal::from(7), "BAD"), Decimal::from(7));
    assert!(!t.covers("BAD"));
}

#[test]
fn divides_by_the_quoted_rate() {
    let t = eur_table();
    assert_eq!(t.convert(Decimal::from(100), "USD"), Decimal::from(80));
    assert_eq!(t.convert(Decimal::from(320), "JPY"), Decimal::from(2));
    assert!(t.covers("USD"));
    assert!(t.covers("EUR"));
}

#[test]
fn snapshot_in_another_base_is_not_used() {
    let t = snapshot("USD").to_table("EUR");
    assert!(!t.is_available());
    assert_eq!(t.convert(Decimal::from(10), "GBP"), Decimal::from(10));

    let ok = snapshot("EUR").to_table("EUR");
    assert_eq!(ok.convert(Decimal::from(10), "GBP"), Decimal::from(20));
}

#[test]
fn snapshot_parses_frankfurter_payload() {
    let body = r#"{"amount":1.0,"base":"EUR","date":"2025-08-01","rates":{"USD":1.1,"JPY":170.5}}"#;
    let snap: RatesSnapshot = serde_json::from_str(body).unwrap();
    assert_eq!(snap.base, "EUR");
    assert_eq!(snap.rates.len(), 2);
    let t = snap.to_table("EUR");
    assert_eq!(t.rate("USD"), Some(Decimal::new(11, 1)));
}

#[test]
fn cached_rates_survive_round_trip() {
    let kv = MemoryKv::new();
    assert!(load_cached(&kv).is_none());
    assert!(!rate_table(&kv, "EUR").is_available());

    cache_snapshot(&kv, &snapshot("EUR")).unwrap();
    assert_eq!(load_cached(&kv), Some(snapshot("EUR")));
    let t = rate_table(&kv, "EUR");
    assert_eq!(t.convert(Decimal::from(50), "USD"), Decimal::from(40));
}

#[test]
fn corrupt_cache_means_no_rates() {
    let kv = MemoryKv::new();
    kv.set(FX_RATES_KEY, "garbage").unwrap();
    assert!(load_cached(&kv).is_none());
    assert_eq!(
        rate_table(&kv, "EUR").convert(Decimal::from(3), "USD"),
        Decimal::from(3)
    );
}

#[test]
fn reference_currency_defaults_to_eur_and_can_change() {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();
    assert_eq!(get_reference_currency(&conn).unwrap(), "EUR");
    set_reference_currency(&conn, "USD").unwrap();
    assert_eq!(get_reference_currency(&conn).unwrap(), "USD");

    cache_snapshot(&conn, &snapshot("EUR")).unwrap();
    // rates quoted in EUR are useless once the reference is USD
    assert!(!rate_table(&conn, "USD").is_available());
}

#[test]
fn set_base_accepts_codes_like_transactions_do() {
    let conn = Connection::open_in_memory().unwrap();
    fintrack::db::init_schema(&conn).unwrap();
    let cfg = AppConfig {
        db_path: ":memory:".into(),
        rates_url: "http://localhost/unused".into(),
    };
    let set_base = |code: &str| {
        let matches = cli::build_cli().get_matches_from(["fintrack", "fx", "set-base", code]);
        let Some(("fx", fx_m)) = matches.subcommand() else {
            panic!("no fx subcommand");
        };
        commands::fx::handle(&conn, fx_m, &cfg)
    };

    set_base("gbp").unwrap();
    assert_eq!(get_reference_currency(&conn).unwrap(), "GBP");

    let err = set_base("E1R").unwrap_err();
    assert_eq!(
        err.to_string(),
        ValidationError::InvalidCurrency("E1R".into()).to_string()
    );
    assert_eq!(get_reference_currency(&conn).unwrap(), "GBP");
}
