// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures of the underlying key-value slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage quota exceeded writing '{key}' ({needed} bytes, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored '{key}' is unreadable")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode '{key}'")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Input rejected at the boundary before it reaches the store.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Description is required")]
    EmptyDescription,
    #[error("Description must be less than 200 characters (got {0})")]
    DescriptionTooLong(usize),
    #[error("Amount must be a positive number (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("Amount {0} has more significant digits than can be stored")]
    AmountTooPrecise(Decimal),
    #[error("Please select or create a category")]
    EmptyCategory,
    #[error("Invalid currency code '{0}', expected three letters like EUR")]
    InvalidCurrency(String),
    #[error("Nothing to update")]
    EmptyPatch,
}
