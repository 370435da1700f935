// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::{RateTable, rate_table};
use crate::models::Transaction;
use crate::store::TransactionStore;
use crate::utils::{get_reference_currency, maybe_print_json, pretty_table};
use crate::views::{self, Summary};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Whether report figures are raw amounts or normalized to the reference
/// currency.
pub enum Amounts {
    Raw,
    Reference(RateTable),
}

impl Amounts {
    pub fn from_flag(conn: &Connection, base: bool) -> Result<Self> {
        if !base {
            return Ok(Amounts::Raw);
        }
        let reference = get_reference_currency(conn)?;
        let rates = rate_table(conn, &reference);
        if !rates.is_available() {
            eprintln!(
                "No cached rates for {}; amounts are shown unconverted (run `fx fetch`).",
                reference
            );
        }
        Ok(Amounts::Reference(rates))
    }

    pub fn of(&self, tx: &Transaction) -> Decimal {
        match self {
            Amounts::Raw => tx.amount,
            Amounts::Reference(rates) => rates.convert(tx.amount, &tx.currency),
        }
    }

    fn header(&self, name: &str) -> String {
        match self {
            Amounts::Raw => name.to_string(),
            Amounts::Reference(rates) => format!("{} ({})", name, rates.base()),
        }
    }
}

fn load(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Vec<Transaction>, Amounts)> {
    let txs = TransactionStore::new(conn).get_all();
    let amounts = Amounts::from_flag(conn, sub.get_flag("base"))?;
    Ok((txs, amounts))
}

pub fn summarize(conn: &Connection, base: bool) -> Result<Summary> {
    let txs = TransactionStore::new(conn).get_all();
    let amounts = Amounts::from_flag(conn, base)?;
    Ok(Summary::of(&txs, |t| amounts.of(t)))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (txs, amounts) = load(conn, sub)?;
    let s = Summary::of(&txs, |t| amounts.of(t));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let data = vec![
        vec![
            "Total income".to_string(),
            format!("{:.2}", s.total_income),
            s.income_count.to_string(),
        ],
        vec![
            "Total expenses".to_string(),
            format!("{:.2}", s.total_expenses),
            s.expense_count.to_string(),
        ],
        vec![
            "Balance".to_string(),
            format!("{:.2}", s.balance),
            s.total_count.to_string(),
        ],
    ];
    let amount_hdr = amounts.header("Amount");
    println!(
        "{}",
        pretty_table(&["", &amount_hdr, "Transactions"], data)
    );
    Ok(())
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (txs, amounts) = load(conn, sub)?;
    let items = views::category_breakdown(&txs, |t| amounts.of(t));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let data = items
        .into_iter()
        .map(|c| {
            vec![
                c.category,
                format!("{:.2}", c.income),
                format!("{:.2}", c.expenses),
            ]
        })
        .collect();
    let (inc, exp) = (amounts.header("Income"), amounts.header("Expenses"));
    println!("{}", pretty_table(&["Category", &inc, &exp], data));
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (txs, amounts) = load(conn, sub)?;
    let items = views::monthly_breakdown(&txs, |t| amounts.of(t));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let data = items
        .into_iter()
        .map(|m| {
            vec![
                m.label,
                format!("{:.2}", m.income),
                format!("{:.2}", m.expenses),
            ]
        })
        .collect();
    let (inc, exp) = (amounts.header("Income"), amounts.header("Expenses"));
    println!("{}", pretty_table(&["Month", &inc, &exp], data));
    Ok(())
}
