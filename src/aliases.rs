//! Component alias registry
//!
//! Short, user-chosen keys mapped to canonical JIRA component names.
//! Resolution never fails: a key with no mapping is treated as already
//! canonical and returned unchanged.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{RelayError, Result};

/// Registry mapping alias -> canonical component name.
///
/// Keys are case-sensitive. When an alias key collides with a real component
/// name, the alias mapping wins.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    aliases: RwLock<HashMap<String, String>>,
}

impl AliasRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded from configuration
    pub fn with_aliases(aliases: HashMap<String, String>) -> Self {
        Self {
            aliases: RwLock::new(aliases),
        }
    }

    /// Resolve one name: the mapped canonical name if `name` is a registered
    /// alias, otherwise `name` unchanged.
    pub async fn resolve(&self, name: &str) -> String {
        let aliases = self.aliases.read().await;
        aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Resolve a list of names independently, preserving order and length
    pub async fn resolve_many(&self, names: &[String]) -> Vec<String> {
        let aliases = self.aliases.read().await;
        names
            .iter()
            .map(|name| {
                aliases
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            })
            .collect()
    }

    /// Insert or overwrite an alias; overwriting is silent
    pub async fn add_or_update(&self, alias: &str, canonical_name: &str) -> Result<()> {
        if alias.trim().is_empty() {
            return Err(RelayError::Validation(
                "alias must not be empty".to_string(),
            ));
        }

        let mut aliases = self.aliases.write().await;
        aliases.insert(alias.to_string(), canonical_name.to_string());
        info!(alias = alias, component = canonical_name, "Registered component alias");
        Ok(())
    }

    /// Remove an alias; fails if the alias is unknown
    pub async fn remove(&self, alias: &str) -> Result<()> {
        let mut aliases = self.aliases.write().await;
        if aliases.remove(alias).is_none() {
            return Err(RelayError::NotFound(format!(
                "component alias '{}' not found",
                alias
            )));
        }
        info!(alias = alias, "Removed component alias");
        Ok(())
    }

    /// Snapshot of all aliases (a copy, never a view of live storage)
    pub async fn list(&self) -> HashMap<String, String> {
        self.aliases.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> AliasRegistry {
        let registry = AliasRegistry::new();
        registry.add_or_update("ui", "User Interface").await.unwrap();
        registry
            .add_or_update("be", "Backend Services")
            .await
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_resolve_registered_alias() {
        let registry = seeded().await;
        assert_eq!(registry.resolve("ui").await, "User Interface");
    }

    #[tokio::test]
    async fn test_resolve_identity_fallback() {
        let registry = seeded().await;
        // Unregistered keys come back unchanged
        assert_eq!(registry.resolve("Database").await, "Database");
    }

    #[tokio::test]
    async fn test_resolve_is_case_sensitive() {
        let registry = seeded().await;
        assert_eq!(registry.resolve("ui").await, "User Interface");
        assert_eq!(registry.resolve("UI").await, "UI");
    }

    #[tokio::test]
    async fn test_resolve_many_preserves_order_and_length() {
        let registry = seeded().await;
        let input: Vec<String> = ["ui", "Database", "be", "ui"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let resolved = registry.resolve_many(&input).await;

        assert_eq!(
            resolved,
            vec![
                "User Interface",
                "Database",
                "Backend Services",
                "User Interface"
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_many_empty() {
        let registry = seeded().await;
        assert!(registry.resolve_many(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_add_overwrites_silently() {
        let registry = seeded().await;
        registry
            .add_or_update("ui", "User Interface v2")
            .await
            .unwrap();
        assert_eq!(registry.resolve("ui").await, "User Interface v2");
    }

    #[tokio::test]
    async fn test_remove_lifecycle() {
        let registry = seeded().await;

        registry.remove("ui").await.unwrap();
        assert_eq!(registry.resolve("ui").await, "ui");

        let err = registry.remove("ui").await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn test_list_returns_snapshot() {
        let registry = seeded().await;

        let mut snapshot = registry.list().await;
        snapshot.insert("new".to_string(), "New Component".to_string());

        assert_eq!(registry.list().await.len(), 2);
    }
}
