//! JIRA REST client
//!
//! Wraps each backend operation as: acquire a rate-limit permit, perform the
//! network call with the configured timeout, classify the response into the
//! error taxonomy, and retry transient failures with backoff. Retried
//! attempts re-acquire a permit, so backoff never bypasses pacing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::jira::types::*;
use crate::limiter::RateLimiter;
use crate::retry::{with_retry, RetryConfig};
use crate::watchers::WatcherBackend;

/// Fields requested on every issue read
const ISSUE_FIELDS: &str = "summary,description,issuetype,status,priority,project,labels,\
                            components,assignee,reporter,resolution,fixVersions,duedate,\
                            security,created,updated,comment,issuelinks";

/// Rate-limited, retrying JIRA API client
pub struct JiraClient {
    http: Client,
    base_url: String,
    token: String,
    limiter: RateLimiter,
    retry: RetryConfig,
}

/// Minimal payload JIRA returns from issue creation
#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

impl JiraClient {
    /// Create a client from validated configuration.
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        let base_url = format!("{}/rest/api/2", config.server_url.trim_end_matches('/'));

        let limiter = RateLimiter::new(
            config.rate_limit.requests_per_sec,
            config.rate_limit.burst,
            Duration::from_secs(config.rate_limit.acquire_timeout_secs),
        );

        Ok(Self {
            http,
            base_url,
            token: config.access_token.clone(),
            limiter,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy (tests use quick backoff)
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search for issues using JQL
    pub async fn search(&self, jql: &str, max_results: u32) -> Result<JiraSearchResponse> {
        let url = format!("{}/search", self.base_url);
        debug!(jql = %jql, max_results = max_results, "Searching JIRA issues");

        let result: JiraSearchResponse = with_retry(&self.retry, "search_issues", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(&[
                        ("jql", jql.to_string()),
                        ("maxResults", max_results.to_string()),
                        ("fields", ISSUE_FIELDS.to_string()),
                    ])
                    .send()
                    .await?;
                expect_json(response, &format!("search '{}'", jql)).await
            }
        })
        .await?;

        info!(
            total = result.total,
            returned = result.issues.len(),
            "JIRA search complete"
        );
        Ok(result)
    }

    /// Get a single issue by key
    pub async fn get_issue(&self, key: &str) -> Result<JiraIssue> {
        let url = format!("{}/issue/{}", self.base_url, key);
        debug!(key = %key, "Fetching JIRA issue");

        with_retry(&self.retry, "get_issue", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(&[("fields", ISSUE_FIELDS)])
                    .send()
                    .await?;
                expect_json(response, &format!("issue {}", key)).await
            }
        })
        .await
    }

    /// Create an issue and return it fully populated
    pub async fn create_issue(&self, fields: &CreateIssueFields) -> Result<JiraIssue> {
        if fields.project_key.trim().is_empty() {
            return Err(RelayError::Validation(
                "project key must not be empty".to_string(),
            ));
        }
        if fields.summary.trim().is_empty() {
            return Err(RelayError::Validation(
                "issue summary must not be empty".to_string(),
            ));
        }

        let url = format!("{}/issue", self.base_url);
        let payload = fields.to_payload();
        info!(project = %fields.project_key, summary = %fields.summary, "Creating JIRA issue");

        let created: CreatedIssue = with_retry(&self.retry, "create_issue", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_json(response, &format!("create issue in {}", fields.project_key)).await
            }
        })
        .await?;

        info!(key = %created.key, "Created JIRA issue");
        self.get_issue(&created.key).await
    }

    /// Update an issue and return the refreshed record
    pub async fn update_issue(&self, key: &str, fields: &UpdateIssueFields) -> Result<JiraIssue> {
        if fields.is_empty() {
            return Err(RelayError::Validation(format!(
                "no fields to update on {}",
                key
            )));
        }

        let url = format!("{}/issue/{}", self.base_url, key);
        let payload = fields.to_payload();
        info!(key = %key, "Updating JIRA issue");

        with_retry(&self.retry, "update_issue", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .put(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_ok(response, &format!("update issue {}", key)).await
            }
        })
        .await?;

        self.get_issue(key).await
    }

    /// Get available transitions for an issue
    pub async fn transitions(&self, key: &str) -> Result<Vec<JiraTransition>> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);

        let result: JiraTransitionsResponse = with_retry(&self.retry, "get_transitions", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
                expect_json(response, &format!("transitions of {}", key)).await
            }
        })
        .await?;

        Ok(result.transitions)
    }

    /// Apply a transition by id
    pub async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);
        let payload = serde_json::json!({ "transition": { "id": transition_id } });
        info!(key = %key, transition_id = %transition_id, "Transitioning JIRA issue");

        with_retry(&self.retry, "transition_issue", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_ok(response, &format!("transition issue {}", key)).await
            }
        })
        .await
    }

    /// Add a comment, optionally restricted to a security level group
    pub async fn add_comment(
        &self,
        key: &str,
        body: &str,
        security_level: Option<&str>,
    ) -> Result<JiraComment> {
        let url = format!("{}/issue/{}/comment", self.base_url, key);
        let mut payload = serde_json::json!({ "body": body });
        if let Some(level) = security_level {
            payload["visibility"] = serde_json::json!({ "type": "group", "value": level });
        }
        info!(key = %key, "Adding comment to JIRA issue");

        with_retry(&self.retry, "add_comment", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_json(response, &format!("comment on {}", key)).await
            }
        })
        .await
    }

    /// Link two issues, optionally attaching a comment to the link
    pub async fn link_issues(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/issueLink", self.base_url);
        let mut payload = serde_json::json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": inward_key },
            "outwardIssue": { "key": outward_key },
        });
        if let Some(comment) = comment {
            payload["comment"] = serde_json::json!({ "body": comment });
        }
        info!(link_type = %link_type, inward = %inward_key, outward = %outward_key, "Linking JIRA issues");

        with_retry(&self.retry, "link_issues", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_ok(
                    response,
                    &format!("link {} -> {}", inward_key, outward_key),
                )
                .await
            }
        })
        .await
    }

    /// List the link types the backend supports
    pub async fn list_link_types(&self) -> Result<Vec<JiraLinkType>> {
        let url = format!("{}/issueLinkType", self.base_url);

        let result: JiraLinkTypesResponse = with_retry(&self.retry, "list_link_types", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
                expect_json(response, "issue link types").await
            }
        })
        .await?;

        Ok(result.issue_link_types)
    }

    /// Log work on an issue; `started` defaults to now
    pub async fn log_work(
        &self,
        key: &str,
        time_spent: &str,
        comment: &str,
        started: Option<&str>,
    ) -> Result<JiraWorklog> {
        let url = format!("{}/issue/{}/worklog", self.base_url, key);
        let started = started.map(str::to_string).unwrap_or_else(|| {
            // JIRA's worklog format: 2024-03-01T10:30:00.000+0000
            chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3f%z")
                .to_string()
        });
        let payload = serde_json::json!({
            "timeSpent": time_spent,
            "comment": comment,
            "started": started,
        });
        info!(key = %key, time_spent = %time_spent, "Logging work on JIRA issue");

        with_retry(&self.retry, "log_work", || {
            let url = url.clone();
            let payload = payload.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&payload)
                    .send()
                    .await?;
                expect_json(response, &format!("worklog on {}", key)).await
            }
        })
        .await
    }

    /// List all projects visible to the token
    pub async fn list_projects(&self) -> Result<Vec<JiraProject>> {
        let url = format!("{}/project", self.base_url);
        debug!("Listing JIRA projects");

        with_retry(&self.retry, "list_projects", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
                expect_json(response, "project list").await
            }
        })
        .await
    }

    /// List the components of a project
    pub async fn list_components(&self, project_key: &str) -> Result<Vec<JiraComponent>> {
        let url = format!("{}/project/{}/components", self.base_url, project_key);
        debug!(project = %project_key, "Listing JIRA components");

        with_retry(&self.retry, "list_components", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
                expect_json(response, &format!("components of {}", project_key)).await
            }
        })
        .await
    }

    /// Add a watcher to an issue
    pub async fn add_watcher(&self, key: &str, member: &str) -> Result<()> {
        let url = format!("{}/issue/{}/watchers", self.base_url, key);
        debug!(key = %key, member = %member, "Adding watcher");

        with_retry(&self.retry, "add_watcher", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                // api/2 takes the bare member identifier as a JSON string
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&member)
                    .send()
                    .await?;
                expect_ok(response, &format!("add watcher {} to {}", member, key)).await
            }
        })
        .await
    }

    /// Remove a watcher from an issue
    pub async fn remove_watcher(&self, key: &str, member: &str) -> Result<()> {
        let url = format!("{}/issue/{}/watchers", self.base_url, key);
        debug!(key = %key, member = %member, "Removing watcher");

        with_retry(&self.retry, "remove_watcher", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self
                    .http
                    .delete(&url)
                    .bearer_auth(&self.token)
                    .query(&[("username", member)])
                    .send()
                    .await?;
                expect_ok(response, &format!("remove watcher {} from {}", member, key)).await
            }
        })
        .await
    }

    /// List the watchers of an issue
    pub async fn list_watchers(&self, key: &str) -> Result<JiraWatchersResponse> {
        let url = format!("{}/issue/{}/watchers", self.base_url, key);
        debug!(key = %key, "Listing watchers");

        with_retry(&self.retry, "list_watchers", || {
            let url = url.clone();
            async move {
                self.limiter.acquire().await?;
                let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
                expect_json(response, &format!("watchers of {}", key)).await
            }
        })
        .await
    }
}

#[async_trait]
impl WatcherBackend for JiraClient {
    async fn watcher_add(&self, issue_key: &str, member: &str) -> Result<()> {
        self.add_watcher(issue_key, member).await
    }

    async fn watcher_remove(&self, issue_key: &str, member: &str) -> Result<()> {
        self.remove_watcher(issue_key, member).await
    }

    async fn watcher_list(&self, issue_key: &str) -> Result<JiraWatchersResponse> {
        self.list_watchers(issue_key).await
    }
}

/// Read a JSON body on success, otherwise classify the failure
async fn expect_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    Err(classify_response(response, what).await)
}

/// Discard the body on success, otherwise classify the failure
async fn expect_ok(response: Response, what: &str) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(classify_response(response, what).await)
}

async fn classify_response(response: Response, what: &str) -> RelayError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = response.text().await.unwrap_or_default();
    classify_status(status, what, &body, retry_after)
}

/// Map a backend status code onto the error taxonomy
fn classify_status(status: u16, what: &str, body: &str, retry_after: Option<u64>) -> RelayError {
    match status {
        401 => RelayError::Permission(format!("JIRA authentication failed for {}", what)),
        403 => RelayError::Permission(format!("insufficient rights for {}", what)),
        404 => RelayError::NotFound(what.to_string()),
        429 => RelayError::Transient(format!(
            "throttled by JIRA on {}, retry after {} seconds",
            what,
            retry_after.unwrap_or(60)
        )),
        500..=599 => RelayError::Transient(format!("HTTP {} on {}: {}", status, what, body)),
        _ => RelayError::Validation(format!("JIRA rejected {}: HTTP {}: {}", what, status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{RetryDecision, RetryableError};

    fn test_config() -> RelayConfig {
        RelayConfig {
            server_url: "https://jira.example.com/".to_string(),
            access_token: "token".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = JiraClient::new(&test_config()).expect("client");
        assert_eq!(client.base_url(), "https://jira.example.com/rest/api/2");
    }

    #[test]
    fn test_classify_permission() {
        let err = classify_status(401, "issue PROJ-1", "", None);
        assert!(matches!(err, RelayError::Permission(_)), "{err}");

        let err = classify_status(403, "issue PROJ-1", "", None);
        assert!(matches!(err, RelayError::Permission(_)), "{err}");
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify_status(404, "issue PROJ-999", "", None);
        match err {
            RelayError::NotFound(msg) => assert_eq!(msg, "issue PROJ-999"),
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[test]
    fn test_classify_server_error_is_transient() {
        let err = classify_status(503, "search 'x'", "unavailable", None);
        assert!(matches!(err, RelayError::Transient(_)), "{err}");
        assert_eq!(err.retry_decision(), RetryDecision::Retry);
    }

    #[test]
    fn test_classify_throttle_carries_retry_after() {
        let err = classify_status(429, "search 'x'", "", Some(7));
        assert_eq!(
            err.retry_decision(),
            RetryDecision::RetryAfter(std::time::Duration::from_secs(7))
        );
    }

    #[test]
    fn test_classify_bad_request_is_validation() {
        let err = classify_status(400, "create issue in PROJ", "bad field", None);
        assert!(matches!(err, RelayError::Validation(_)), "{err}");
        assert_eq!(err.retry_decision(), RetryDecision::NoRetry);
    }

    #[tokio::test]
    async fn test_create_issue_rejects_blank_input() {
        let client = JiraClient::new(&test_config()).unwrap();

        let err = client
            .create_issue(&CreateIssueFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)), "{err}");
    }

    #[tokio::test]
    async fn test_update_issue_rejects_empty_fields() {
        let client = JiraClient::new(&test_config()).unwrap();

        let err = client
            .update_issue("PROJ-1", &UpdateIssueFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)), "{err}");
    }
}
