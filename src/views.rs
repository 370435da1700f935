// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Filtered, sorted and aggregated projections of a transaction list.
//!
//! Nothing here touches storage; every function is a pure function of the
//! slice it is handed. Aggregations take an `amount` closure so callers can
//! sum raw amounts or amounts normalized through [`crate::fx::RateTable`].

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TxType};

pub const DEFAULT_PER_PAGE: usize = 10;
pub const PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    pub fn matches(&self, t: TxType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => t == TxType::Income,
            TypeFilter::Expense => t == TxType::Expense,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "income" => Ok(TypeFilter::Income),
            "expense" => Ok(TypeFilter::Expense),
            other => Err(anyhow::anyhow!(
                "Invalid type filter '{}', expected all|income|expense",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(c) => c == category,
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(v: Option<&str>) -> Self {
        match v {
            None => CategoryFilter::All,
            Some(s) if s.eq_ignore_ascii_case("all") => CategoryFilter::All,
            Some(s) => CategoryFilter::Named(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    None,
    Asc,
    Desc,
}

impl FromStr for SortDir {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SortDir::None),
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(anyhow::anyhow!(
                "Invalid sort '{}', expected none|asc|desc",
                other
            )),
        }
    }
}

/// Date and amount ordering. At most one axis is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    date: SortDir,
    amount: SortDir,
}

impl SortState {
    pub fn date(&self) -> SortDir {
        self.date
    }

    pub fn amount(&self) -> SortDir {
        self.amount
    }

    pub fn set_date_sort(&mut self, dir: SortDir) {
        self.date = dir;
        if dir != SortDir::None {
            self.amount = SortDir::None;
        }
    }

    pub fn set_amount_sort(&mut self, dir: SortDir) {
        self.amount = dir;
        if dir != SortDir::None {
            self.date = SortDir::None;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewParams {
    pub type_filter: TypeFilter,
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortState,
}

pub fn matches(tx: &Transaction, params: &ViewParams) -> bool {
    if !params.type_filter.matches(tx.r#type) || !params.category.matches(&tx.category) {
        return false;
    }
    let needle = params.search.trim();
    needle.is_empty()
        || tx
            .description
            .to_lowercase()
            .contains(&needle.to_lowercase())
}

pub fn filter(txs: &[Transaction], params: &ViewParams) -> Vec<Transaction> {
    txs.iter().filter(|t| matches(t, params)).cloned().collect()
}

/// Stable sort; with no active axis the newest transaction comes first.
pub fn sort(txs: &mut [Transaction], s: &SortState) {
    match (s.date(), s.amount()) {
        (SortDir::Asc, _) => txs.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        (SortDir::Desc, _) => txs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        (SortDir::None, SortDir::Asc) => txs.sort_by(|a, b| a.amount.cmp(&b.amount)),
        (SortDir::None, SortDir::Desc) => txs.sort_by(|a, b| b.amount.cmp(&a.amount)),
        (SortDir::None, SortDir::None) => txs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

pub fn apply(txs: &[Transaction], params: &ViewParams) -> Vec<Transaction> {
    let mut out = filter(txs, params);
    sort(&mut out, &params.sort);
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based index of the first item shown, 0 when empty.
    pub start: usize,
    pub end: usize,
}

/// Slices out `page` (1-based), clamping it into the available range.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let from = ((page - 1) * per_page).min(total);
    let to = (from + per_page).min(total);
    Page {
        items: items[from..to].to_vec(),
        page,
        per_page,
        total_pages,
        total,
        start: if total == 0 { 0 } else { from + 1 },
        end: to,
    }
}

pub fn raw_amount(tx: &Transaction) -> Decimal {
    tx.amount
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub total_count: usize,
}

impl Summary {
    pub fn of<F>(txs: &[Transaction], amount: F) -> Self
    where
        F: Fn(&Transaction) -> Decimal,
    {
        let mut s = Summary::default();
        for tx in txs {
            match tx.r#type {
                TxType::Income => {
                    s.total_income += amount(tx);
                    s.income_count += 1;
                }
                TxType::Expense => {
                    s.total_expenses += amount(tx);
                    s.expense_count += 1;
                }
            }
        }
        s.balance = s.total_income - s.total_expenses;
        s.total_count = txs.len();
        s
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub category: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// Per-category sums, categories in order of first appearance.
pub fn category_breakdown<F>(txs: &[Transaction], amount: F) -> Vec<CategoryTotals>
where
    F: Fn(&Transaction) -> Decimal,
{
    let mut out: Vec<CategoryTotals> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for tx in txs {
        let i = *index.entry(tx.category.as_str()).or_insert_with(|| {
            out.push(CategoryTotals {
                category: tx.category.clone(),
                income: Decimal::ZERO,
                expenses: Decimal::ZERO,
            });
            out.len() - 1
        });
        match tx.r#type {
            TxType::Income => out[i].income += amount(tx),
            TxType::Expense => out[i].expenses += amount(tx),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    /// Short month and year, e.g. "Jan 2025".
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// Per-month sums keyed on the UTC month of `created_at`, oldest first.
pub fn monthly_breakdown<F>(txs: &[Transaction], amount: F) -> Vec<MonthTotals>
where
    F: Fn(&Transaction) -> Decimal,
{
    let mut buckets: BTreeMap<(i32, u32), MonthTotals> = BTreeMap::new();
    for tx in txs {
        let (year, month) = (tx.created_at.year(), tx.created_at.month());
        let entry = buckets.entry((year, month)).or_insert_with(|| MonthTotals {
            label: tx.created_at.format("%b %Y").to_string(),
            year,
            month,
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
        });
        match tx.r#type {
            TxType::Income => entry.income += amount(tx),
            TxType::Expense => entry.expenses += amount(tx),
        }
    }
    buckets.into_values().collect()
}
