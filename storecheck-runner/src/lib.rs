// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [storecheck](https://crates.io/crates/storecheck),
//! the storefront test harness's result pipeline.
//!
//! The flow of data: the browser-automation engine emits one JSON event per
//! test attempt; [`reporter`] decodes and accumulates them per site project
//! and materializes one result document per project; [`history`] folds those
//! documents into an append-only HTML report, one dated section per run.

pub mod errors;
pub mod helpers;
pub mod history;
pub mod reporter;
