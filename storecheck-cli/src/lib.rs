// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Historical result reporting for multi-site browser test runs.
//!
//! This crate is the command-line front end; the collection and report
//! building logic lives in [storecheck-runner](https://crates.io/crates/storecheck-runner).

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
