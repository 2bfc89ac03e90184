// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to storecheck result documents.
//!
//! This crate defines the durable data model shared by the collector (which
//! writes one [`ProjectResultDocument`] per site project per run) and the
//! report builder (which reads those documents back), along with the naming
//! conventions tying the two together and the process exit codes of the
//! `storecheck` binary.

mod documents;
mod exit_codes;
mod naming;

pub use documents::*;
pub use exit_codes::*;
pub use naming::*;
