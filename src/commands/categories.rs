// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxType;
use crate::store::CategoryStore;
use crate::utils::pretty_table;
use anyhow::{Result, bail};
use rusqlite::Connection;

use super::transactions::arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let t = arg(sub, "type")?.parse::<TxType>()?;
            let name = arg(sub, "name")?.trim();
            if name.is_empty() {
                bail!("Category name must not be empty");
            }
            if CategoryStore::new(conn).add(t, name)? {
                println!("Added {} category '{}'", t, name);
            } else {
                println!("{} category '{}' already exists", t.label(), name);
            }
        }
        Some(("list", sub)) => {
            let types = match sub.get_one::<String>("type") {
                Some(s) => vec![s.parse::<TxType>()?],
                None => vec![TxType::Income, TxType::Expense],
            };
            println!("{}", pretty_table(&["Type", "Category", "Source"], rows(conn, &types)));
        }
        _ => {}
    }
    Ok(())
}

pub fn rows(conn: &Connection, types: &[TxType]) -> Vec<Vec<String>> {
    let store = CategoryStore::new(conn);
    let mut data = Vec::new();
    for t in types {
        let defaults = t.default_categories().len();
        for (i, c) in store.available(*t).into_iter().enumerate() {
            let source = if i < defaults { "default" } else { "custom" };
            data.push(vec![t.label().to_string(), c, source.to_string()]);
        }
    }
    data
}
