//! Team registry
//!
//! Named, ordered sets of member identifiers used for bulk watcher
//! notification and assignment-based search. The registry is an explicitly
//! owned, lock-guarded structure shared via `Arc`; it is never a process
//! global.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{RelayError, Result};

/// Registry mapping team name -> ordered member identifiers.
///
/// Names are case-sensitive and unique; registration overwrites the full
/// member list rather than merging. Member insertion order is preserved so
/// query generation stays deterministic.
#[derive(Debug, Default)]
pub struct TeamRegistry {
    teams: RwLock<HashMap<String, Vec<String>>>,
}

impl TeamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded from configuration
    pub fn with_teams(teams: HashMap<String, Vec<String>>) -> Self {
        Self {
            teams: RwLock::new(teams),
        }
    }

    /// Insert or fully replace a team's member list.
    ///
    /// An empty member list is rejected with a validation error; a team with
    /// no members could otherwise be looked up successfully but never match
    /// anything.
    pub async fn add_or_update(&self, name: &str, members: Vec<String>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RelayError::Validation(
                "team name must not be empty".to_string(),
            ));
        }
        if members.is_empty() {
            return Err(RelayError::Validation(format!(
                "team '{}' must have at least one member",
                name
            )));
        }

        let mut teams = self.teams.write().await;
        let replaced = teams.insert(name.to_string(), members).is_some();
        info!(team = name, replaced = replaced, "Registered team");
        Ok(())
    }

    /// Remove a team; fails if the team is unknown
    pub async fn remove(&self, name: &str) -> Result<()> {
        let mut teams = self.teams.write().await;
        if teams.remove(name).is_none() {
            return Err(not_found(name, &teams));
        }
        info!(team = name, "Removed team");
        Ok(())
    }

    /// Ordered member list for a team; fails explicitly if the team is
    /// unknown (never an empty list for a missing name)
    pub async fn members(&self, name: &str) -> Result<Vec<String>> {
        let teams = self.teams.read().await;
        teams
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name, &teams))
    }

    /// Snapshot of all teams (a copy, never a view of live storage)
    pub async fn list(&self) -> HashMap<String, Vec<String>> {
        self.teams.read().await.clone()
    }
}

fn not_found(name: &str, teams: &HashMap<String, Vec<String>>) -> RelayError {
    let mut known: Vec<&str> = teams.keys().map(String::as_str).collect();
    known.sort_unstable();
    RelayError::NotFound(format!(
        "team '{}' not found (known teams: {})",
        name,
        if known.is_empty() {
            "none".to_string()
        } else {
            known.join(", ")
        }
    ))
}
