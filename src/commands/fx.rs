// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::AppConfig;
use crate::fx::{cache_snapshot, fetch_latest, load_cached, rate_table};
use crate::models::validate_currency;
use crate::utils::{
    get_reference_currency, http_client, maybe_print_json, parse_decimal, pretty_table,
    set_reference_currency,
};
use anyhow::Result;
use rusqlite::Connection;

use super::transactions::arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy = arg(sub, "currency")?.trim().to_uppercase();
            validate_currency(&ccy)?;
            set_reference_currency(conn, &ccy)?;
            println!("Reference currency set to {}", ccy);
        }
        Some(("fetch", _)) => fetch_rates(conn, cfg)?,
        Some(("rates", sub)) => list_rates(conn, sub)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn fetch_rates(conn: &Connection, cfg: &AppConfig) -> Result<()> {
    let base = get_reference_currency(conn)?;
    let client = http_client()?;
    let snap = fetch_latest(&client, &cfg.rates_url, &base)?;
    cache_snapshot(conn, &snap)?;
    println!(
        "Cached {} rates for {} ({})",
        snap.rates.len(),
        snap.base,
        snap.date.as_deref().unwrap_or("undated")
    );
    Ok(())
}

fn list_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let Some(snap) = load_cached(conn) else {
        println!("No cached rates; run `fx fetch` first.");
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snap)? {
        return Ok(());
    }
    let mut codes: Vec<_> = snap.rates.iter().collect();
    codes.sort_by(|a, b| a.0.cmp(b.0));
    let date = snap.date.clone().unwrap_or_default();
    let data = codes
        .into_iter()
        .map(|(code, rate)| vec![date.clone(), snap.base.clone(), code.clone(), rate.to_string()])
        .collect();
    println!("{}", pretty_table(&["Date", "Base", "Quote", "Rate"], data));
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let from = arg(sub, "from")?.trim().to_uppercase();
    let reference = get_reference_currency(conn)?;
    let rates = rate_table(conn, &reference);
    if from != reference && !rates.covers(&from) {
        eprintln!("No rate for {}; amount left unconverted.", from);
    }
    let res = rates.convert(amount, &from);
    println!("{} {} -> {:.4} {}", amount, from, res, reference);
    Ok(())
}
