// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Defensive project-name resolution.
//!
//! Engines surface project identity inconsistently: sometimes a stable id,
//! sometimes a display name, sometimes only on the test and not the event.
//! Resolution runs an ordered list of total strategies and falls back to the
//! [`UNKNOWN_PROJECT`] sentinel rather than dropping data.

use crate::reporter::events::ProjectDeclaration;
use std::collections::HashMap;

/// Bucket name for attempts whose project could not be resolved.
pub static UNKNOWN_PROJECT: &str = "unknown";

/// Lookup tables seeded from the run-started declarations.
#[derive(Clone, Debug, Default)]
pub struct ProjectRegistry {
    name_by_id: HashMap<String, String>,
    url_by_name: HashMap<String, String>,
}

impl ProjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one declared project. Partial declarations contribute only
    /// the mappings they fully specify.
    pub fn register(&mut self, declaration: &ProjectDeclaration) {
        if let (Some(id), Some(name)) = (&declaration.id, &declaration.name) {
            self.name_by_id.insert(id.clone(), name.clone());
        }
        if let (Some(name), Some(url)) = (&declaration.name, &declaration.tested_url) {
            self.url_by_name.insert(name.clone(), url.clone());
        }
    }

    /// Looks up the display name for a stable project id.
    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.name_by_id.get(id).map(String::as_str)
    }

    /// Looks up the tested URL declared for a project name.
    pub fn tested_url(&self, name: &str) -> Option<&str> {
        self.url_by_name.get(name).map(String::as_str)
    }
}

/// Project identity fields carried by one attempt event.
///
/// Test-level fields take precedence over event-level ones; engines that
/// attach identity to the test do so more reliably.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectHints<'a> {
    /// Id attached to the test.
    pub test_project_id: Option<&'a str>,
    /// Id attached to the event.
    pub event_project_id: Option<&'a str>,
    /// Display name attached to the test.
    pub test_project_name: Option<&'a str>,
    /// Display name attached to the event.
    pub event_project_name: Option<&'a str>,
}

impl ProjectHints<'_> {
    /// The preferred project id: test-level, then event-level.
    fn project_id(&self) -> Option<&str> {
        self.test_project_id.or(self.event_project_id)
    }

    /// The preferred display name: test-level, then event-level.
    fn project_name(&self) -> Option<&str> {
        self.test_project_name.or(self.event_project_name)
    }
}

/// One step of the resolution chain.
///
/// Every strategy is total: given any registry and hints it either produces
/// a candidate name or reports no match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveStrategy {
    /// The preferred project id, mapped through the registry.
    RegistryId,
    /// The preferred project id taken as a name verbatim, for engines whose
    /// ids already are names.
    LiteralId,
    /// The declared display name.
    DeclaredName,
}

/// The resolution chain in priority order; the first match wins.
pub static RESOLVE_ORDER: &[ResolveStrategy] = &[
    ResolveStrategy::RegistryId,
    ResolveStrategy::LiteralId,
    ResolveStrategy::DeclaredName,
];

impl ResolveStrategy {
    /// Applies this strategy. Empty strings count as no match; an empty
    /// bucket name is never useful.
    pub fn apply(self, registry: &ProjectRegistry, hints: &ProjectHints<'_>) -> Option<String> {
        match self {
            Self::RegistryId => hints
                .project_id()
                .and_then(|id| registry.name_for_id(id))
                .map(str::to_owned),
            Self::LiteralId => hints
                .project_id()
                .filter(|id| !id.is_empty())
                .map(str::to_owned),
            Self::DeclaredName => hints
                .project_name()
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Resolves the owning project for one attempt, falling back to
/// [`UNKNOWN_PROJECT`].
pub fn resolve_project_name(registry: &ProjectRegistry, hints: &ProjectHints<'_>) -> String {
    RESOLVE_ORDER
        .iter()
        .find_map(|strategy| strategy.apply(registry, hints))
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_owned())
}
