use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppResult;

/// One page of a remote collection as returned by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage {
    pub entries: Vec<RawBugTask>,
    #[serde(default)]
    pub next_collection_link: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBugTask {
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub bug_link: Option<String>,
    pub web_link: String,
    #[serde(default)]
    pub title: String,
    pub status: String,
    pub importance: String,
    pub assignee_link: Option<String>,
    pub date_created: String,
}

#[async_trait]
pub trait BugTrackerService: Send + Sync {
    /// Requests one page. `params` is empty when `url` is a server-provided
    /// next-page link, which already carries the whole query.
    async fn get_page(&self, url: &str, params: &[(String, String)]) -> AppResult<CollectionPage>;
}
