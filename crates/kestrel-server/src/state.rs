use crate::ErrorEnvelope;
use async_trait::async_trait;
use axum::http::StatusCode;
use kestrel_browser::{Error, ProfileContext};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the profile used when a request names none
pub const DEFAULT_PROFILE: &str = "default";

/// Routing context consumed by the tab routes: resolves a profile for a
/// request and classifies domain errors from tab operations.
///
/// Absence of a profile is an expected outcome and comes back as an
/// `Err(ErrorEnvelope)` ready to be written, never a panic.
#[async_trait]
pub trait ProfileRouting: Send + Sync {
    /// Look up the profile a request targets, `None` meaning the default.
    async fn profile_context(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn ProfileContext>, ErrorEnvelope>;

    /// Map a tab-operation failure to a status/message, if this error has a
    /// domain-specific meaning. `None` lets the caller fall back to 500.
    fn map_tab_error(&self, err: &Error) -> Option<ErrorEnvelope>;
}

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    routing: Arc<dyn ProfileRouting>,
}

impl AppState {
    pub fn new(routing: Arc<dyn ProfileRouting>) -> Self {
        Self { routing }
    }

    pub fn routing(&self) -> &Arc<dyn ProfileRouting> {
        &self.routing
    }
}

/// In-process profile registry: a fixed name → profile map populated at
/// startup.
#[derive(Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<dyn ProfileContext>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: Arc<dyn ProfileContext>) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl ProfileRouting for ProfileRegistry {
    async fn profile_context(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn ProfileContext>, ErrorEnvelope> {
        let name = name.unwrap_or(DEFAULT_PROFILE);
        self.profiles.get(name).cloned().ok_or_else(|| {
            ErrorEnvelope::new(
                StatusCode::NOT_FOUND,
                format!("unknown profile: {}", name),
            )
        })
    }

    fn map_tab_error(&self, err: &Error) -> Option<ErrorEnvelope> {
        match err {
            Error::TabNotFound(_) => Some(ErrorEnvelope::not_found("tab not found")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_browser::{Result as BrowserResult, Tab};
    use std::time::Duration;

    struct NullProfile;

    #[async_trait]
    impl ProfileContext for NullProfile {
        async fn is_reachable(&self, _timeout: Duration) -> bool {
            false
        }

        async fn ensure_browser_available(&self) -> BrowserResult<()> {
            Ok(())
        }

        async fn list_tabs(&self) -> BrowserResult<Vec<Tab>> {
            Ok(vec![])
        }

        async fn open_tab(&self, url: &str) -> BrowserResult<Tab> {
            let mut tab = Tab::new("T0");
            tab.url = Some(url.to_string());
            Ok(tab)
        }

        async fn focus_tab(&self, _target_id: &str) -> BrowserResult<()> {
            Ok(())
        }

        async fn close_tab(&self, _target_id: &str) -> BrowserResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_registry_resolves_default_profile() {
        let mut registry = ProfileRegistry::new();
        registry.insert(DEFAULT_PROFILE, Arc::new(NullProfile));

        assert!(registry.profile_context(None).await.is_ok());
        assert!(registry.profile_context(Some("default")).await.is_ok());
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_profile() {
        let registry = ProfileRegistry::new();

        let err = registry.profile_context(Some("nope")).await.err().unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "unknown profile: nope");
    }

    #[test]
    fn test_classifier_maps_tab_not_found_only() {
        let registry = ProfileRegistry::new();

        let mapped = registry
            .map_tab_error(&Error::TabNotFound("T9".to_string()))
            .unwrap();
        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
        assert_eq!(mapped.message, "tab not found");

        assert!(
            registry
                .map_tab_error(&Error::Cdp("ws closed".to_string()))
                .is_none()
        );
    }

    #[test]
    fn test_registry_names_are_sorted() {
        let mut registry = ProfileRegistry::new();
        registry.insert("work", Arc::new(NullProfile));
        registry.insert("default", Arc::new(NullProfile));

        assert_eq!(registry.names(), vec!["default", "work"]);
    }
}
