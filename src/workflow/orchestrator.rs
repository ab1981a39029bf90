use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::FetchSettings;
use crate::domain::aggregate::Aggregate;
use crate::domain::query::QueryDescriptor;
use crate::error::{AppError, AppResult};
use crate::services::{AggregateSource, BugTrackerService};
use crate::workflow::collection::fetch_collection;

/// Runs every descriptor concurrently. All page requests of a run share one
/// admission gate, so at most `max_concurrency` are in flight at once.
pub struct FetchOrchestrator {
    tracker: Arc<dyn BugTrackerService>,
    descriptors: Vec<QueryDescriptor>,
    api_base: String,
    page_size: usize,
    gate: Arc<Semaphore>,
}

impl FetchOrchestrator {
    pub fn new(
        tracker: Arc<dyn BugTrackerService>,
        descriptors: Vec<QueryDescriptor>,
        settings: &FetchSettings,
    ) -> Self {
        Self {
            tracker,
            descriptors,
            api_base: settings.api_base.clone(),
            page_size: settings.page_size,
            gate: Arc::new(Semaphore::new(settings.max_concurrency.max(1))),
        }
    }

    pub async fn fetch_all(&self) -> AppResult<Aggregate> {
        let mut tasks = JoinSet::new();
        for descriptor in &self.descriptors {
            let tracker = Arc::clone(&self.tracker);
            let gate = Arc::clone(&self.gate);
            let key = descriptor.key.clone();
            let url = descriptor.endpoint(&self.api_base);
            let params = descriptor.query_params(self.page_size);

            tasks.spawn(async move {
                let result = fetch_collection(tracker.as_ref(), &gate, url, params).await;
                (key, result)
            });
        }

        let mut bugs = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (key, result) =
                joined.map_err(|err| AppError::Fetch(format!("fetch task failed: {err}")))?;
            match result {
                Ok(found) => {
                    debug!(project = %key, bugs = found.len(), "query complete");
                    bugs.insert(key, found);
                }
                Err(err) => {
                    error!(project = %key, %err, "query failed, abandoning refresh");
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        let aggregate = Aggregate::new(bugs);
        info!(
            queries = aggregate.len(),
            bugs = aggregate.total_bugs(),
            "fetched bug aggregate"
        );
        Ok(aggregate)
    }
}

#[async_trait]
impl AggregateSource for FetchOrchestrator {
    async fn fetch_aggregate(&self) -> AppResult<Aggregate> {
        self.fetch_all().await
    }
}
