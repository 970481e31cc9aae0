//! Bulk watcher orchestration
//!
//! Fans a team out as watchers on an issue, one backend call per member,
//! collecting per-member outcomes. One member's failure never aborts the
//! rest; partial failures are data in the aggregate result, not errors.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::jira::types::JiraWatchersResponse;
use crate::teams::TeamRegistry;

/// Watcher operations the orchestrator needs from the backend
#[async_trait]
pub trait WatcherBackend: Send + Sync {
    async fn watcher_add(&self, issue_key: &str, member: &str) -> Result<()>;
    async fn watcher_remove(&self, issue_key: &str, member: &str) -> Result<()>;
    async fn watcher_list(&self, issue_key: &str) -> Result<JiraWatchersResponse>;
}

/// One member's failure inside a bulk operation
#[derive(Debug, Clone, Serialize)]
pub struct MemberFailure {
    pub member: String,
    pub reason: String,
}

/// Aggregate outcome of fanning a team out as watchers.
///
/// Every team member lands in exactly one of `successes` or `failures`,
/// in team order.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOperationResult {
    pub issue_key: String,
    pub team_name: String,
    pub successes: Vec<String>,
    pub failures: Vec<MemberFailure>,
    pub total_added: usize,
    pub total_failed: usize,
}

/// Orchestrates watcher operations against a backend, resolving team names
/// through the shared registry
pub struct WatcherOrchestrator<B> {
    backend: Arc<B>,
    teams: Arc<TeamRegistry>,
}

impl<B: WatcherBackend> WatcherOrchestrator<B> {
    pub fn new(backend: Arc<B>, teams: Arc<TeamRegistry>) -> Self {
        Self { backend, teams }
    }

    /// Add every member of a team as a watcher on an issue.
    ///
    /// Fails only when the team itself cannot be resolved; per-member backend
    /// failures are captured in the result. Member calls are issued
    /// concurrently with one result slot per member, so outcomes keep team
    /// order. Cancelling the returned future abandons in-flight calls without
    /// producing a partial result.
    pub async fn assign_team(&self, issue_key: &str, team_name: &str) -> Result<BulkOperationResult> {
        let members = self.teams.members(team_name).await?;

        info!(
            issue = %issue_key,
            team = %team_name,
            members = members.len(),
            "Assigning team as watchers"
        );

        let outcomes = join_all(members.iter().map(|member| {
            let backend = Arc::clone(&self.backend);
            async move {
                backend
                    .watcher_add(issue_key, member)
                    .await
                    .map_err(|e| format!("{} ({})", e, e.kind()))
            }
        }))
        .await;

        let mut result = BulkOperationResult {
            issue_key: issue_key.to_string(),
            team_name: team_name.to_string(),
            successes: Vec::new(),
            failures: Vec::new(),
            total_added: 0,
            total_failed: 0,
        };

        for (member, outcome) in members.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => result.successes.push(member),
                Err(reason) => {
                    warn!(issue = %issue_key, member = %member, reason = %reason, "Watcher add failed");
                    result.failures.push(MemberFailure { member, reason });
                }
            }
        }
        result.total_added = result.successes.len();
        result.total_failed = result.failures.len();

        info!(
            issue = %issue_key,
            team = %team_name,
            added = result.total_added,
            failed = result.total_failed,
            "Team watcher assignment complete"
        );
        Ok(result)
    }

    /// Single-watcher pass-through
    pub async fn add_single(&self, issue_key: &str, member: &str) -> Result<()> {
        self.backend.watcher_add(issue_key, member).await
    }

    /// Single-watcher pass-through
    pub async fn remove_single(&self, issue_key: &str, member: &str) -> Result<()> {
        self.backend.watcher_remove(issue_key, member).await
    }

    /// Watcher listing pass-through
    pub async fn get_watchers(&self, issue_key: &str) -> Result<JiraWatchersResponse> {
        self.backend.watcher_list(issue_key).await
    }
}
