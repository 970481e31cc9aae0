//! Tool-callable operation surface
//!
//! One async method per exposed operation. This is the layer a transport
//! (CLI, MCP framing, HTTP) dispatches into; it owns the wiring between the
//! backend client, the registries, the watcher orchestrator, and the query
//! builder.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::aliases::AliasRegistry;
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::jira::types::{
    CreateIssueFields, JiraComment, JiraComponent, JiraIssue, JiraLinkType, JiraProject,
    JiraWatchersResponse, JiraWorklog, UpdateIssueFields,
};
use crate::jira::JiraClient;
use crate::query::TeamQueryBuilder;
use crate::teams::TeamRegistry;
use crate::watchers::{BulkOperationResult, WatcherOrchestrator};

/// A created issue plus the watcher fan-out result when a team was attached
#[derive(Debug, Serialize)]
pub struct CreatedIssue {
    pub issue: JiraIssue,
    pub watchers: Option<BulkOperationResult>,
}

/// The relay's tool surface: backend operations plus team/alias management
pub struct RelayTools {
    client: Arc<JiraClient>,
    teams: Arc<TeamRegistry>,
    aliases: Arc<AliasRegistry>,
    watchers: WatcherOrchestrator<JiraClient>,
    query: TeamQueryBuilder,
    max_results: u32,
}

impl RelayTools {
    /// Wire up the full component graph from configuration
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Arc::new(JiraClient::new(config)?);
        let teams = Arc::new(TeamRegistry::with_teams(config.teams.clone()));
        let aliases = Arc::new(AliasRegistry::with_aliases(config.component_aliases.clone()));
        Ok(Self::from_parts(client, teams, aliases, config.max_results))
    }

    /// Assemble from pre-built components
    pub fn from_parts(
        client: Arc<JiraClient>,
        teams: Arc<TeamRegistry>,
        aliases: Arc<AliasRegistry>,
        max_results: u32,
    ) -> Self {
        let watchers = WatcherOrchestrator::new(Arc::clone(&client), Arc::clone(&teams));
        let query = TeamQueryBuilder::new(Arc::clone(&teams));
        Self {
            client,
            teams,
            aliases,
            watchers,
            query,
            max_results,
        }
    }

    fn cap(&self, max_results: Option<u32>) -> u32 {
        max_results.unwrap_or(self.max_results)
    }

    // ============ Search ============

    /// Search issues with a raw JQL query
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: Option<u32>,
    ) -> Result<Vec<JiraIssue>> {
        let result = self.client.search(jql, self.cap(max_results)).await?;
        Ok(result.issues)
    }

    /// Search issues assigned to any member of a registered team
    pub async fn search_issues_by_team(
        &self,
        team_name: &str,
        project_key: Option<&str>,
        status: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<Vec<JiraIssue>> {
        let jql = self.query.build(team_name, project_key, status).await?;
        info!(team = %team_name, jql = %jql, "Searching issues by team");
        self.search_issues(&jql, max_results).await
    }

    // ============ Issue CRUD ============

    pub async fn get_issue(&self, issue_key: &str) -> Result<JiraIssue> {
        self.client.get_issue(issue_key).await
    }

    /// Create an issue. Component names are resolved through the alias
    /// registry first; when `team` is given the team is fanned out as
    /// watchers on the new issue and the bulk result is returned alongside.
    pub async fn create_issue(
        &self,
        mut fields: CreateIssueFields,
        team: Option<&str>,
    ) -> Result<CreatedIssue> {
        // Resolve the team before the backend call so an unknown team fails
        // without creating an orphaned issue.
        if let Some(team_name) = team {
            self.teams.members(team_name).await?;
        }

        fields.components = self.aliases.resolve_many(&fields.components).await;
        let issue = self.client.create_issue(&fields).await?;

        let watchers = match team {
            Some(team_name) => Some(self.watchers.assign_team(&issue.key, team_name).await?),
            None => None,
        };

        Ok(CreatedIssue { issue, watchers })
    }

    /// Update an issue, resolving component aliases in the new field values
    pub async fn update_issue(
        &self,
        issue_key: &str,
        mut fields: UpdateIssueFields,
    ) -> Result<JiraIssue> {
        fields.components = self.aliases.resolve_many(&fields.components).await;
        self.client.update_issue(issue_key, &fields).await
    }

    /// Transition an issue by transition name (case-insensitive).
    ///
    /// Returns the refreshed issue. An unavailable transition is a
    /// validation error naming the transitions the backend offers.
    pub async fn transition_issue(&self, issue_key: &str, transition: &str) -> Result<JiraIssue> {
        let transitions = self.client.transitions(issue_key).await?;

        let matched = transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(transition));

        match matched {
            Some(t) => {
                self.client.apply_transition(issue_key, &t.id).await?;
                self.client.get_issue(issue_key).await
            }
            None => {
                let available: Vec<&str> =
                    transitions.iter().map(|t| t.name.as_str()).collect();
                Err(RelayError::Validation(format!(
                    "transition '{}' not available for {} (available: {})",
                    transition,
                    issue_key,
                    available.join(", ")
                )))
            }
        }
    }

    pub async fn add_comment(
        &self,
        issue_key: &str,
        body: &str,
        security_level: Option<&str>,
    ) -> Result<JiraComment> {
        self.client.add_comment(issue_key, body, security_level).await
    }

    pub async fn link_issue(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        self.client
            .link_issues(link_type, inward_key, outward_key, comment)
            .await
    }

    pub async fn get_link_types(&self) -> Result<Vec<JiraLinkType>> {
        self.client.list_link_types().await
    }

    pub async fn log_time(
        &self,
        issue_key: &str,
        time_spent: &str,
        comment: &str,
        started: Option<&str>,
    ) -> Result<JiraWorklog> {
        self.client
            .log_work(issue_key, time_spent, comment, started)
            .await
    }

    // ============ Projects ============

    pub async fn get_projects(&self) -> Result<Vec<JiraProject>> {
        self.client.list_projects().await
    }

    pub async fn get_project_components(&self, project_key: &str) -> Result<Vec<JiraComponent>> {
        self.client.list_components(project_key).await
    }

    // ============ Teams ============

    pub async fn list_teams(&self) -> std::collections::HashMap<String, Vec<String>> {
        self.teams.list().await
    }

    pub async fn add_team(&self, name: &str, members: Vec<String>) -> Result<()> {
        self.teams.add_or_update(name, members).await
    }

    pub async fn remove_team(&self, name: &str) -> Result<()> {
        self.teams.remove(name).await
    }

    pub async fn assign_team_to_issue(
        &self,
        issue_key: &str,
        team_name: &str,
    ) -> Result<BulkOperationResult> {
        self.watchers.assign_team(issue_key, team_name).await
    }

    // ============ Watchers ============

    pub async fn get_issue_watchers(&self, issue_key: &str) -> Result<JiraWatchersResponse> {
        self.watchers.get_watchers(issue_key).await
    }

    pub async fn add_watcher_to_issue(&self, issue_key: &str, member: &str) -> Result<()> {
        self.watchers.add_single(issue_key, member).await
    }

    pub async fn remove_watcher_from_issue(&self, issue_key: &str, member: &str) -> Result<()> {
        self.watchers.remove_single(issue_key, member).await
    }

    // ============ Component aliases ============

    pub async fn list_component_aliases(&self) -> std::collections::HashMap<String, String> {
        self.aliases.list().await
    }

    pub async fn add_component_alias(&self, alias: &str, component: &str) -> Result<()> {
        self.aliases.add_or_update(alias, component).await
    }

    pub async fn remove_component_alias(&self, alias: &str) -> Result<()> {
        self.aliases.remove(alias).await
    }
}
