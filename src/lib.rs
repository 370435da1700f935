// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod fx;
pub mod models;
pub mod storage;
pub mod store;
pub mod utils;
pub mod views;
pub mod commands;
