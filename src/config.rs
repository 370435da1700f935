// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;

use crate::db;
use crate::fx::DEFAULT_RATES_URL;

/// Env var holding a `tracing` filter directive, e.g. `fintrack=debug`.
pub const LOG_ENV: &str = "FINTRACK_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub rates_url: String,
}

impl AppConfig {
    /// Flags win over env vars (handled by clap), which win over defaults.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let db_path = match m.get_one::<PathBuf>("db") {
            Some(p) => p.clone(),
            None => db::default_db_path()?,
        };
        let rates_url = m
            .get_one::<String>("rates-url")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RATES_URL.to_string());
        Ok(Self { db_path, rates_url })
    }
}
