//! Team-based JQL generation
//!
//! Turns a registered team into a query matching issues assigned to any of
//! its members, with optional project and status clauses in a fixed order.
//!
//! Values are interpolated into the query unescaped; member identifiers and
//! project/status values must not contain JQL metacharacters (notably
//! quotes). Sanitizing them is the caller's responsibility.

use std::sync::Arc;

use crate::error::{RelayError, Result};
use crate::teams::TeamRegistry;

/// Builds assignee-based JQL from team membership
pub struct TeamQueryBuilder {
    teams: Arc<TeamRegistry>,
}

impl TeamQueryBuilder {
    pub fn new(teams: Arc<TeamRegistry>) -> Self {
        Self { teams }
    }

    /// Build a JQL query matching issues assigned to any member of the team.
    ///
    /// Clause order is fixed: project, then the parenthesized assignee
    /// disjunction, then status; absent optional clauses are omitted along
    /// with their connecting AND.
    pub async fn build(
        &self,
        team_name: &str,
        project_key: Option<&str>,
        status: Option<&str>,
    ) -> Result<String> {
        let members = self.teams.members(team_name).await?;
        if members.is_empty() {
            return Err(RelayError::Validation(format!(
                "team '{}' has no members to search by",
                team_name
            )));
        }

        let assignees = members
            .iter()
            .map(|member| format!("assignee = \"{}\"", member))
            .collect::<Vec<_>>()
            .join(" OR ");

        let mut clauses = Vec::with_capacity(3);
        if let Some(project) = project_key {
            clauses.push(format!("project = \"{}\"", project));
        }
        clauses.push(format!("({})", assignees));
        if let Some(status) = status {
            clauses.push(format!("status = \"{}\"", status));
        }

        Ok(clauses.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn builder_with_frontend() -> TeamQueryBuilder {
        let teams = Arc::new(TeamRegistry::new());
        teams
            .add_or_update("frontend", vec!["alice".into(), "bob".into()])
            .await
            .unwrap();
        TeamQueryBuilder::new(teams)
    }

    #[tokio::test]
    async fn test_full_query() {
        let builder = builder_with_frontend().await;

        let jql = builder
            .build("frontend", Some("PROJ"), Some("Open"))
            .await
            .unwrap();

        assert_eq!(
            jql,
            "project = \"PROJ\" AND (assignee = \"alice\" OR assignee = \"bob\") AND status = \"Open\""
        );
    }

    #[tokio::test]
    async fn test_assignee_clause_only() {
        let builder = builder_with_frontend().await;

        let jql = builder.build("frontend", None, None).await.unwrap();

        assert_eq!(jql, "(assignee = \"alice\" OR assignee = \"bob\")");
    }

    #[tokio::test]
    async fn test_project_only() {
        let builder = builder_with_frontend().await;

        let jql = builder.build("frontend", Some("PROJ"), None).await.unwrap();

        assert_eq!(
            jql,
            "project = \"PROJ\" AND (assignee = \"alice\" OR assignee = \"bob\")"
        );
    }

    #[tokio::test]
    async fn test_status_only() {
        let builder = builder_with_frontend().await;

        let jql = builder.build("frontend", None, Some("Open")).await.unwrap();

        assert_eq!(
            jql,
            "(assignee = \"alice\" OR assignee = \"bob\") AND status = \"Open\""
        );
    }

    #[tokio::test]
    async fn test_single_member_team() {
        let teams = Arc::new(TeamRegistry::new());
        teams
            .add_or_update("devops", vec!["eve".into()])
            .await
            .unwrap();
        let builder = TeamQueryBuilder::new(teams);

        let jql = builder.build("devops", None, None).await.unwrap();

        assert_eq!(jql, "(assignee = \"eve\")");
    }

    #[tokio::test]
    async fn test_unknown_team_fails() {
        let builder = builder_with_frontend().await;

        let err = builder.build("nonexistent", None, None).await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn test_member_order_is_preserved() {
        let teams = Arc::new(TeamRegistry::new());
        teams
            .add_or_update("ordered", vec!["zoe".into(), "adam".into(), "mia".into()])
            .await
            .unwrap();
        let builder = TeamQueryBuilder::new(teams);

        let jql = builder.build("ordered", None, None).await.unwrap();

        assert_eq!(
            jql,
            "(assignee = \"zoe\" OR assignee = \"adam\" OR assignee = \"mia\")"
        );
    }
}
