use std::sync::Arc;
use std::time::Duration;

use crate::cache::AggregateCache;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::services::BugTrackerService;
use crate::view::DashboardView;
use crate::workflow::orchestrator::FetchOrchestrator;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub cache: Arc<AggregateCache>,
    pub view: Arc<DashboardView>,
}

impl AppContext {
    pub fn new(config: AppConfig, bug_tracker: Arc<dyn BugTrackerService>) -> AppResult<Self> {
        let orchestrator = FetchOrchestrator::new(bug_tracker, config.descriptors(), &config.fetch);
        let cache = AggregateCache::new(
            Arc::new(orchestrator),
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.serve_stale_on_error,
        );

        Ok(Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
            view: Arc::new(DashboardView::new()?),
        })
    }
}
