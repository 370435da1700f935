// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Named string slots, the only persistence primitive the stores rely on.
//!
//! The SQLite connection is the production backend. [`MemoryKv`] and
//! [`UnavailableKv`] exist for callers that have no database at hand, and
//! for exercising quota and outage behaviour.

use std::cell::RefCell;
use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const CUSTOM_CATEGORIES_KEY: &str = "customCategories";
pub const REVISION_KEY: &str = "transactionsRevision";
pub const FX_RATES_KEY: &str = "fxRates";

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    /// Writes every pair or none of them.
    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError>;
}

impl KvStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let v: Option<String> = self
            .query_row(
                "SELECT value FROM storage WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v)
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let tx = self.unchecked_transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT INTO storage(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local storage with an optional byte quota across all slots.
#[derive(Debug, Default)]
pub struct MemoryKv {
    slots: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            slots: RefCell::default(),
            quota: Some(limit),
        }
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut slots = self.slots.borrow_mut();
        let mut next = slots.clone();
        for (key, value) in pairs {
            next.insert(key.to_string(), value.to_string());
        }
        if let Some(limit) = self.quota {
            let needed: usize = next.iter().map(|(k, v)| k.len() + v.len()).sum();
            if needed > limit {
                let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
                return Err(StorageError::QuotaExceeded {
                    key: keys.join(", "),
                    needed,
                    limit,
                });
            }
        }
        *slots = next;
        Ok(())
    }
}

/// An environment without any storage capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKv;

impl KvStore for UnavailableKv {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_many(&self, _pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
