//! jira-relay - Rate-limited JIRA adapter with a tool-callable surface
//!
//! Exposes JIRA issue operations through uniform async methods while adding
//! the cross-cutting behavior the backend does not provide: request pacing,
//! retry with backoff on transient failures, named teams for bulk watcher
//! notification, short aliases for long component names, and
//! partial-failure-tolerant bulk operations.
//!
//! # Architecture
//!
//! - **config**: typed configuration (connection, rate limits, seed maps)
//! - **error**: the error taxonomy shared by every component
//! - **limiter**: process-wide token bucket pacing outbound calls
//! - **retry**: exponential backoff for transient backend failures
//! - **jira**: REST client and wire types
//! - **teams** / **aliases**: lock-guarded registries
//! - **watchers**: bulk watcher fan-out with per-member outcomes
//! - **query**: team membership -> JQL
//! - **tools**: the exposed operation surface a transport dispatches into

pub mod aliases;
pub mod config;
pub mod error;
pub mod jira;
pub mod limiter;
pub mod logging;
pub mod query;
pub mod retry;
pub mod teams;
pub mod tools;
pub mod watchers;

// Re-exports
pub use aliases::AliasRegistry;
pub use config::{RateLimitSettings, RelayConfig};
pub use error::{RelayError, Result};
pub use jira::JiraClient;
pub use limiter::RateLimiter;
pub use query::TeamQueryBuilder;
pub use teams::TeamRegistry;
pub use tools::RelayTools;
pub use watchers::{BulkOperationResult, MemberFailure, WatcherBackend, WatcherOrchestrator};
