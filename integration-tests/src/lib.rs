// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support code for storecheck integration tests.

pub mod events;
pub mod pipeline;
