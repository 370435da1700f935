// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction collection and the custom category set.
//!
//! Both live as whole JSON blobs in a [`KvStore`] slot and every mutation is
//! a full read-modify-write. There is no locking: when two processes share
//! a database the last writer wins. Each successful mutation bumps a
//! persisted revision so another context can tell its copy is stale, and
//! in-process listeners get a [`StoreEvent`] through [`TransactionStore::subscribe`].

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{SubsecRound, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{CustomCategories, NewTransaction, Transaction, TransactionPatch, TxType};
use crate::storage::{CUSTOM_CATEGORIES_KEY, KvStore, REVISION_KEY, TRANSACTIONS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub change: Change,
    pub id: String,
    pub revision: u64,
}

pub(crate) fn load_slot<S, T>(kv: &S, key: &'static str) -> Result<Option<T>, StoreError>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
{
    match kv.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode { key, source }),
        None => Ok(None),
    }
}

pub(crate) fn save_slot<S, T>(kv: &S, key: &'static str, value: &T) -> Result<(), StoreError>
where
    S: KvStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
    kv.set(key, &raw)?;
    debug!("wrote {} bytes to '{}'", raw.len(), key);
    Ok(())
}

pub struct TransactionStore<'a, S: KvStore + ?Sized> {
    kv: &'a S,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl<'a, S: KvStore + ?Sized> TransactionStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self {
            kv,
            subscribers: Vec::new(),
        }
    }

    /// Strict read used before every write, so an unreadable blob is never
    /// silently replaced.
    pub fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(load_slot(self.kv, TRANSACTIONS_KEY)?.unwrap_or_default())
    }

    /// Persists `all` together with the bumped revision and returns the
    /// new revision. Either both slots are written or neither is.
    pub fn save(&self, all: &[Transaction]) -> Result<u64, StoreError> {
        let raw = serde_json::to_string(all).map_err(|source| StoreError::Encode {
            key: TRANSACTIONS_KEY,
            source,
        })?;
        let next = self.revision() + 1;
        let revision = next.to_string();
        self.kv
            .set_many(&[(TRANSACTIONS_KEY, raw.as_str()), (REVISION_KEY, revision.as_str())])?;
        debug!("wrote {} bytes to '{}' at revision {}", raw.len(), TRANSACTIONS_KEY, next);
        Ok(next)
    }

    /// Every stored transaction in insertion order. Missing, unreadable or
    /// unreachable storage all read as an empty collection.
    pub fn get_all(&self) -> Vec<Transaction> {
        match self.load() {
            Ok(all) => all,
            Err(e) => {
                warn!("reading transactions failed, treating as empty (run `doctor`): {e}");
                Vec::new()
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<Transaction> {
        self.get_all().into_iter().find(|t| t.id == id)
    }

    pub fn get_by_type(&self, t: TxType) -> Vec<Transaction> {
        self.get_all()
            .into_iter()
            .filter(|tx| tx.r#type == t)
            .collect()
    }

    pub fn get_by_category(&self, category: &str) -> Vec<Transaction> {
        self.get_all()
            .into_iter()
            .filter(|tx| tx.category == category)
            .collect()
    }

    pub fn add(&mut self, new: NewTransaction) -> Result<Transaction, StoreError> {
        let mut all = self.load()?;
        let mut id = Uuid::new_v4().to_string();
        while all.iter().any(|t| t.id == id) {
            id = Uuid::new_v4().to_string();
        }
        let tx = Transaction {
            id,
            description: new.description,
            amount: new.amount,
            r#type: new.r#type,
            category: new.category,
            currency: new.currency,
            created_at: Utc::now().trunc_subsecs(3),
        };
        all.push(tx.clone());
        let revision = self.save(&all)?;
        self.notify(Change::Added, &tx.id, revision);
        Ok(tx)
    }

    /// Merges `patch` over the record with `id`. `Ok(None)` when no such
    /// record exists; nothing is written in that case.
    pub fn update(
        &mut self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>, StoreError> {
        let mut all = self.load()?;
        let Some(pos) = all.iter().position(|t| t.id == id) else {
            debug!("update: no transaction with id {id}");
            return Ok(None);
        };
        patch.apply_to(&mut all[pos]);
        let updated = all[pos].clone();
        let revision = self.save(&all)?;
        self.notify(Change::Updated, id, revision);
        Ok(Some(updated))
    }

    /// Removes the record with `id`, returning whether one was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut all = self.load()?;
        let before = all.len();
        all.retain(|t| t.id != id);
        if all.len() == before {
            debug!("delete: no transaction with id {id}");
            return Ok(false);
        }
        let revision = self.save(&all)?;
        self.notify(Change::Deleted, id, revision);
        Ok(true)
    }

    /// Count of successful mutations ever persisted; 0 for fresh storage.
    pub fn revision(&self) -> u64 {
        match self.kv.get(REVISION_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn is_stale(&self, seen_revision: u64) -> bool {
        self.revision() != seen_revision
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: Change, id: &str, revision: u64) {
        let event = StoreEvent {
            change,
            id: id.to_string(),
            revision,
        };
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
    }
}

pub struct CategoryStore<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> CategoryStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> CustomCategories {
        match load_slot(self.kv, CUSTOM_CATEGORIES_KEY) {
            Ok(c) => c.unwrap_or_default(),
            Err(e) => {
                warn!("reading custom categories failed, treating as empty: {e}");
                CustomCategories::default()
            }
        }
    }

    /// Built-in categories for `t` followed by the user's additions.
    pub fn available(&self, t: TxType) -> Vec<String> {
        let custom = self.load();
        t.default_categories()
            .iter()
            .map(|s| s.to_string())
            .chain(custom.for_type(t).iter().cloned())
            .collect()
    }

    /// Adds `name` for `t` unless it is blank or already offered.
    pub fn add(&self, t: TxType, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        if t.default_categories().contains(&name) {
            return Ok(false);
        }
        let mut custom: CustomCategories =
            load_slot(self.kv, CUSTOM_CATEGORIES_KEY)?.unwrap_or_default();
        if custom.for_type(t).iter().any(|c| c == name) {
            return Ok(false);
        }
        custom.for_type_mut(t).push(name.to_string());
        save_slot(self.kv, CUSTOM_CATEGORIES_KEY, &custom)?;
        Ok(true)
    }
}
