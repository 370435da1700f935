// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    NewTransaction, Transaction, TransactionPatch, TxType, validate_new, validate_patch,
};
use crate::store::TransactionStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use crate::views::{self, CategoryFilter, Page, SortDir, SortState, TypeFilter, ViewParams};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.as_str())
        .with_context(|| format!("Missing --{}", name))
}

pub fn new_from_args(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let new = NewTransaction {
        description: arg(sub, "description")?.trim().to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        r#type: arg(sub, "type")?.parse::<TxType>()?,
        category: arg(sub, "category")?.trim().to_string(),
        currency: arg(sub, "currency")?.trim().to_uppercase(),
    };
    validate_new(&new)?;
    Ok(new)
}

pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    let patch = TransactionPatch {
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string()),
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        r#type: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TxType>())
            .transpose()?,
        category: sub
            .get_one::<String>("category")
            .map(|s| s.trim().to_string()),
        currency: sub
            .get_one::<String>("currency")
            .map(|s| s.trim().to_uppercase()),
    };
    validate_patch(&patch)?;
    Ok(patch)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_from_args(sub)?;
    let mut store = TransactionStore::new(conn);
    let tx = store.add(new).context("Saving transaction failed")?;
    println!(
        "Recorded {} {} '{}' ({}) id={}",
        tx.r#type,
        fmt_money(&tx.amount, &tx.currency),
        tx.description,
        tx.category,
        tx.id
    );
    Ok(())
}

pub fn view_params(sub: &clap::ArgMatches) -> Result<ViewParams> {
    let mut sort = SortState::default();
    if let Some(d) = sub.get_one::<String>("sort-date") {
        sort.set_date_sort(d.parse::<SortDir>()?);
    }
    if let Some(a) = sub.get_one::<String>("sort-amount") {
        sort.set_amount_sort(a.parse::<SortDir>()?);
    }
    Ok(ViewParams {
        type_filter: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TypeFilter>())
            .transpose()?
            .unwrap_or_default(),
        category: CategoryFilter::from(sub.get_one::<String>("category").map(|s| s.as_str())),
        search: sub.get_one::<String>("search").cloned().unwrap_or_default(),
        sort,
    })
}

/// Filtered, sorted page of stored transactions for `tx list`.
pub fn query_view(conn: &Connection, sub: &clap::ArgMatches) -> Result<Page<Transaction>> {
    let params = view_params(sub)?;
    let store = TransactionStore::new(conn);
    let rows = views::apply(&store.get_all(), &params);
    if sub.get_flag("all") {
        let n = rows.len().max(1);
        return Ok(views::paginate(&rows, 1, n));
    }
    let page = *sub.get_one::<usize>("page").unwrap_or(&1);
    let per_page = *sub
        .get_one::<usize>("per-page")
        .unwrap_or(&views::DEFAULT_PER_PAGE);
    Ok(views::paginate(&rows, page, per_page))
}

/// How a cell of the transaction table is produced.
pub enum Column {
    Text {
        header: &'static str,
        value: fn(&Transaction) -> String,
    },
    Badge {
        header: &'static str,
        value: fn(&Transaction) -> String,
    },
    /// Signed amount in the transaction's own currency.
    Currency { header: &'static str },
    /// The id handed to `tx edit` / `tx rm`.
    Action { header: &'static str },
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Text { header, .. }
            | Column::Badge { header, .. }
            | Column::Currency { header }
            | Column::Action { header } => *header,
        }
    }

    pub fn render(&self, tx: &Transaction) -> String {
        match self {
            Column::Text { value, .. } => value(tx),
            Column::Badge { value, .. } => format!("[{}]", value(tx)),
            Column::Currency { .. } => {
                let sign = match tx.r#type {
                    TxType::Income => "+",
                    TxType::Expense => "-",
                };
                format!("{}{}", sign, fmt_money(&tx.amount, &tx.currency))
            }
            Column::Action { .. } => tx.id.clone(),
        }
    }
}

pub fn transaction_columns() -> Vec<Column> {
    vec![
        Column::Text {
            header: "Date",
            value: |t| t.created_at.format("%b %d, %Y %H:%M").to_string(),
        },
        Column::Text {
            header: "Description",
            value: |t| t.description.clone(),
        },
        Column::Badge {
            header: "Category",
            value: |t| t.category.clone(),
        },
        Column::Badge {
            header: "Type",
            value: |t| t.r#type.label().to_string(),
        },
        Column::Currency { header: "Amount" },
        Column::Action { header: "Id" },
    ]
}

pub fn render_rows(columns: &[Column], txs: &[Transaction]) -> Vec<Vec<String>> {
    txs.iter()
        .map(|t| columns.iter().map(|c| c.render(t)).collect())
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = query_view(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &page.items)? {
        return Ok(());
    }
    if page.total == 0 {
        println!("No transactions yet. Start by adding your first transaction!");
        return Ok(());
    }
    let columns = transaction_columns();
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    println!("{}", pretty_table(&headers, render_rows(&columns, &page.items)));
    println!(
        "Showing {} to {} of {} items (page {} of {})",
        page.start, page.end, page.total, page.page, page.total_pages
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?.trim();
    let store = TransactionStore::new(conn);
    let Some(tx) = store.find(id) else {
        bail!("Transaction '{}' not found", id);
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        return Ok(());
    }
    let rows = transaction_columns()
        .iter()
        .map(|c| vec![c.header().to_string(), c.render(&tx)])
        .collect();
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?.trim();
    let patch = patch_from_args(sub)?;
    let mut store = TransactionStore::new(conn);
    let events = store.subscribe();
    let Some(tx) = store.update(id, patch).context("Saving transaction failed")? else {
        bail!("Transaction '{}' not found", id);
    };
    for ev in events.try_iter() {
        tracing::debug!("{:?} {} at revision {}", ev.change, ev.id, ev.revision);
    }
    println!(
        "Updated {}: {} {} '{}' ({})",
        tx.id,
        tx.r#type,
        fmt_money(&tx.amount, &tx.currency),
        tx.description,
        tx.category
    );
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?.trim();
    let mut store = TransactionStore::new(conn);
    let events = store.subscribe();
    if !store.delete(id).context("Deleting transaction failed")? {
        bail!("Transaction '{}' not found", id);
    }
    for ev in events.try_iter() {
        tracing::debug!("{:?} {} at revision {}", ev.change, ev.id, ev.revision);
    }
    println!("Deleted transaction {}", id);
    Ok(())
}
