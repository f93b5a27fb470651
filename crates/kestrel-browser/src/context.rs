use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One open browser page, identified by its CDP target id
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Tab {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            url: None,
            title: None,
        }
    }
}

/// Control surface for one browser profile's tab set.
///
/// Implementations own the transport (process launch, CDP connection) and
/// must serialize concurrent operations against the same profile. Expected
/// absence of the browser is reported through `is_reachable`, not as an
/// error; `focus_tab`/`close_tab` on a vanished target yield
/// [`Error::TabNotFound`](crate::Error::TabNotFound).
#[async_trait]
pub trait ProfileContext: Send + Sync {
    /// Whether the profile's browser answers on its DevTools endpoint
    /// within the given budget.
    async fn is_reachable(&self, timeout: Duration) -> bool;

    /// Start the browser for this profile if it is not already running.
    async fn ensure_browser_available(&self) -> Result<()>;

    /// Enumerate open tabs in the order the browser reports them.
    async fn list_tabs(&self) -> Result<Vec<Tab>>;

    /// Open a new tab at `url`.
    async fn open_tab(&self, url: &str) -> Result<Tab>;

    /// Bring the tab with `target_id` to the front.
    async fn focus_tab(&self, target_id: &str) -> Result<()>;

    /// Close the tab with `target_id`.
    async fn close_tab(&self, target_id: &str) -> Result<()>;
}
