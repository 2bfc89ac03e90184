// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning engine event streams into materialized result documents.
//!
//! Events enter through an [`EventStream`], get bucketed per project by a
//! [`SiteAccumulator`], and leave as per-project JSON documents via
//! [`materialize_results`]. [`EngineEvent`] and friends are the raw wire
//! shapes; [`normalize_attempt`] and [`normalize_test`] map them onto the
//! durable document model.

mod aggregator;
mod events;
mod materialize;
mod normalize;
mod resolve;
mod stream;

pub use aggregator::*;
pub use events::*;
pub use materialize::*;
pub use normalize::*;
pub use resolve::*;
pub use stream::*;
