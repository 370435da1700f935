// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::store::TransactionStore;
use anyhow::{Context, Result, bail};
use chrono::SecondsFormat;
use rusqlite::Connection;
use std::path::Path;

use super::transactions::arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.trim().to_lowercase();
    let out = Path::new(arg(sub, "out")?);
    let txs = TransactionStore::new(conn).get_all();

    match fmt.as_str() {
        "csv" => write_csv(&txs, out)?,
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&txs)?)
                .with_context(|| format!("Writing {}", out.display()))?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", txs.len(), out.display());
    Ok(())
}

fn write_csv(txs: &[Transaction], out: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(out).with_context(|| format!("Creating {}", out.display()))?;
    wtr.write_record([
        "id",
        "createdAt",
        "description",
        "type",
        "category",
        "amount",
        "currency",
    ])?;
    for t in txs {
        let created = t.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let amount = t.amount.to_string();
        wtr.write_record([
            t.id.as_str(),
            created.as_str(),
            t.description.as_str(),
            t.r#type.as_str(),
            t.category.as_str(),
            amount.as_str(),
            t.currency.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
