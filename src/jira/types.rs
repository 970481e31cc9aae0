//! JIRA REST wire types
//!
//! Serde representations of the REST API v2 payloads the relay touches,
//! plus the outbound field builders for issue create/update.

use serde::{Deserialize, Serialize};

/// JIRA issue representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub id: String,
    pub fields: JiraFields,
}

/// JIRA issue fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<JiraIssueType>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub project: Option<JiraProjectRef>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<JiraComponent>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub reporter: Option<JiraUser>,
    #[serde(default)]
    pub resolution: Option<JiraResolution>,
    #[serde(rename = "fixVersions", default)]
    pub fix_versions: Vec<JiraVersion>,
    #[serde(rename = "duedate", default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub security: Option<JiraSecurityLevel>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub comment: Option<JiraCommentPage>,
    #[serde(rename = "issuelinks", default)]
    pub issue_links: Vec<JiraIssueLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraPriority {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraResolution {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSecurityLevel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraVersion {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email: Option<String>,
}

impl JiraUser {
    /// Best identifier for logs and failure rows
    pub fn identifier(&self) -> &str {
        self.name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// Project reference embedded in issue fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProjectRef {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full project record from the project listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lead: Option<JiraUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraComponent {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraComment {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraCommentPage {
    #[serde(default)]
    pub comments: Vec<JiraComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueLink {
    pub id: String,
    #[serde(rename = "type")]
    pub link_type: JiraLinkType,
    #[serde(rename = "inwardIssue", default)]
    pub inward_issue: Option<Box<JiraLinkedIssue>>,
    #[serde(rename = "outwardIssue", default)]
    pub outward_issue: Option<Box<JiraLinkedIssue>>,
}

/// Slim issue embedded on either end of a link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkedIssue {
    pub key: String,
    #[serde(default)]
    pub fields: Option<JiraLinkedFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkedFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkType {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub inward: Option<String>,
    #[serde(default)]
    pub outward: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraLinkTypesResponse {
    #[serde(rename = "issueLinkTypes", default)]
    pub issue_link_types: Vec<JiraLinkType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraWorklog {
    pub id: String,
    #[serde(rename = "timeSpent")]
    pub time_spent: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub started: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: Option<JiraStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraTransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<JiraTransition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraSearchResponse {
    pub total: u32,
    #[serde(rename = "startAt")]
    pub start_at: u32,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraWatchersResponse {
    #[serde(rename = "watchCount", default)]
    pub watch_count: u32,
    #[serde(default)]
    pub watchers: Vec<JiraUser>,
}

/// Fields accepted when creating an issue.
///
/// Component names are expected to be canonical already; alias resolution
/// happens on the tool surface before this struct is built.
#[derive(Debug, Clone, Default)]
pub struct CreateIssueFields {
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub fix_versions: Vec<String>,
    pub security_level: Option<String>,
    pub due_date: Option<String>,
    pub original_estimate: Option<String>,
}

impl CreateIssueFields {
    /// Assemble the REST `fields` payload
    pub fn to_payload(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        fields.insert(
            "project".to_string(),
            serde_json::json!({ "key": self.project_key }),
        );
        fields.insert("summary".to_string(), serde_json::json!(self.summary));
        fields.insert(
            "description".to_string(),
            serde_json::json!(self.description),
        );
        fields.insert(
            "issuetype".to_string(),
            serde_json::json!({ "name": self.issue_type }),
        );
        apply_shared_fields(
            &mut fields,
            &self.labels,
            &self.components,
            &self.fix_versions,
            self.priority.as_deref(),
            self.assignee.as_deref(),
            self.security_level.as_deref(),
            self.due_date.as_deref(),
            self.original_estimate.as_deref(),
        );
        serde_json::json!({ "fields": fields })
    }
}

/// Fields accepted when updating an issue; `None`/empty means "leave as-is"
#[derive(Debug, Clone, Default)]
pub struct UpdateIssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub fix_versions: Vec<String>,
    pub security_level: Option<String>,
    pub due_date: Option<String>,
    pub original_estimate: Option<String>,
}

impl UpdateIssueFields {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.labels.is_empty()
            && self.components.is_empty()
            && self.fix_versions.is_empty()
            && self.security_level.is_none()
            && self.due_date.is_none()
            && self.original_estimate.is_none()
    }

    /// Assemble the REST `fields` payload
    pub fn to_payload(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        if let Some(ref summary) = self.summary {
            fields.insert("summary".to_string(), serde_json::json!(summary));
        }
        if let Some(ref description) = self.description {
            fields.insert("description".to_string(), serde_json::json!(description));
        }
        apply_shared_fields(
            &mut fields,
            &self.labels,
            &self.components,
            &self.fix_versions,
            self.priority.as_deref(),
            self.assignee.as_deref(),
            self.security_level.as_deref(),
            self.due_date.as_deref(),
            self.original_estimate.as_deref(),
        );
        serde_json::json!({ "fields": fields })
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_shared_fields(
    fields: &mut serde_json::Map<String, serde_json::Value>,
    labels: &[String],
    components: &[String],
    fix_versions: &[String],
    priority: Option<&str>,
    assignee: Option<&str>,
    security_level: Option<&str>,
    due_date: Option<&str>,
    original_estimate: Option<&str>,
) {
    if let Some(priority) = priority {
        fields.insert("priority".to_string(), serde_json::json!({ "name": priority }));
    }
    if let Some(assignee) = assignee {
        fields.insert("assignee".to_string(), serde_json::json!({ "name": assignee }));
    }
    if !labels.is_empty() {
        fields.insert("labels".to_string(), serde_json::json!(labels));
    }
    if !components.is_empty() {
        let components: Vec<_> = components
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        fields.insert("components".to_string(), serde_json::json!(components));
    }
    if !fix_versions.is_empty() {
        let versions: Vec<_> = fix_versions
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        fields.insert("fixVersions".to_string(), serde_json::json!(versions));
    }
    if let Some(level) = security_level {
        fields.insert("security".to_string(), serde_json::json!({ "name": level }));
    }
    if let Some(due_date) = due_date {
        fields.insert("duedate".to_string(), serde_json::json!(due_date));
    }
    if let Some(estimate) = original_estimate {
        fields.insert(
            "timetracking".to_string(),
            serde_json::json!({ "originalEstimate": estimate }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_minimal() {
        let fields = CreateIssueFields {
            project_key: "PROJ".to_string(),
            summary: "Broken login".to_string(),
            description: "Steps to reproduce".to_string(),
            issue_type: "Bug".to_string(),
            ..Default::default()
        };

        let payload = fields.to_payload();
        assert_eq!(payload["fields"]["project"]["key"], "PROJ");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Bug");
        assert!(payload["fields"].get("priority").is_none());
        assert!(payload["fields"].get("components").is_none());
    }

    #[test]
    fn test_create_payload_full() {
        let fields = CreateIssueFields {
            project_key: "PROJ".to_string(),
            summary: "Broken login".to_string(),
            description: "Steps".to_string(),
            issue_type: "Bug".to_string(),
            priority: Some("High".to_string()),
            assignee: Some("alice".to_string()),
            labels: vec!["auth".to_string()],
            components: vec!["User Interface".to_string()],
            fix_versions: vec!["1.2".to_string()],
            security_level: Some("Internal".to_string()),
            due_date: Some("2025-12-01".to_string()),
            original_estimate: Some("1h 30m".to_string()),
        };

        let payload = fields.to_payload();
        assert_eq!(payload["fields"]["priority"]["name"], "High");
        assert_eq!(payload["fields"]["assignee"]["name"], "alice");
        assert_eq!(payload["fields"]["components"][0]["name"], "User Interface");
        assert_eq!(payload["fields"]["fixVersions"][0]["name"], "1.2");
        assert_eq!(payload["fields"]["security"]["name"], "Internal");
        assert_eq!(payload["fields"]["duedate"], "2025-12-01");
        assert_eq!(
            payload["fields"]["timetracking"]["originalEstimate"],
            "1h 30m"
        );
    }

    #[test]
    fn test_update_payload_skips_unset() {
        let fields = UpdateIssueFields {
            summary: Some("New title".to_string()),
            ..Default::default()
        };

        let payload = fields.to_payload();
        assert_eq!(payload["fields"]["summary"], "New title");
        assert!(payload["fields"].get("description").is_none());
        assert!(payload["fields"].get("labels").is_none());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateIssueFields::default().is_empty());
        let fields = UpdateIssueFields {
            labels: vec!["x".to_string()],
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_issue_deserialization() {
        let raw = serde_json::json!({
            "key": "PROJ-1",
            "id": "10001",
            "fields": {
                "summary": "Broken login",
                "status": { "name": "Open" },
                "issuetype": { "name": "Bug" },
                "labels": ["auth"],
                "components": [{ "name": "User Interface" }],
                "assignee": { "name": "alice", "displayName": "Alice" }
            }
        });

        let issue: JiraIssue = serde_json::from_value(raw).unwrap();
        assert_eq!(issue.key, "PROJ-1");
        assert_eq!(issue.fields.summary, "Broken login");
        assert_eq!(issue.fields.status.as_ref().unwrap().name, "Open");
        assert_eq!(issue.fields.assignee.as_ref().unwrap().identifier(), "alice");
    }

    #[test]
    fn test_watchers_deserialization() {
        let raw = serde_json::json!({
            "watchCount": 2,
            "watchers": [
                { "name": "alice", "displayName": "Alice" },
                { "displayName": "Bob" }
            ]
        });

        let watchers: JiraWatchersResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(watchers.watch_count, 2);
        assert_eq!(watchers.watchers[0].identifier(), "alice");
        assert_eq!(watchers.watchers[1].identifier(), "Bob");
    }
}
