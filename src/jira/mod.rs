//! JIRA backend adapter
//!
//! REST API v2 client plus the serde wire types it exchanges. All calls are
//! paced by the process-wide rate limiter and retried on transient failures.

pub mod client;
pub mod types;

pub use client::JiraClient;
pub use types::{
    CreateIssueFields, JiraComment, JiraComponent, JiraIssue, JiraIssueLink, JiraLinkType,
    JiraProject, JiraSearchResponse, JiraTransition, JiraUser, JiraWatchersResponse, JiraWorklog,
    UpdateIssueFields,
};
