use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::aggregate::Aggregate;
use crate::error::AppResult;
use crate::services::AggregateSource;

struct CacheEntry {
    aggregate: Arc<Aggregate>,
    expires_at: Instant,
}

/// Single-entry cache in front of the aggregate fetch.
///
/// The expiry check, the refresh and the store all happen under one lock, so
/// callers arriving during a refresh wait for it instead of starting another
/// one. A failed refresh leaves the expiry untouched; the next call retries.
pub struct AggregateCache {
    source: Arc<dyn AggregateSource>,
    ttl: Duration,
    serve_stale_on_error: bool,
    entry: Mutex<Option<CacheEntry>>,
}

impl AggregateCache {
    pub fn new(source: Arc<dyn AggregateSource>, ttl: Duration, serve_stale_on_error: bool) -> Self {
        Self {
            source,
            ttl,
            serve_stale_on_error,
            entry: Mutex::new(None),
        }
    }

    pub async fn fetch(&self) -> AppResult<Arc<Aggregate>> {
        let mut entry = self.entry.lock().await;

        if let Some(current) = entry.as_ref() {
            if Instant::now() < current.expires_at {
                return Ok(Arc::clone(&current.aggregate));
            }
        }

        info!("bug aggregate is stale, refreshing");
        match self.source.fetch_aggregate().await {
            Ok(aggregate) => {
                let aggregate = Arc::new(aggregate);
                *entry = Some(CacheEntry {
                    aggregate: Arc::clone(&aggregate),
                    expires_at: Instant::now() + self.ttl,
                });
                Ok(aggregate)
            }
            Err(err) => match entry.as_ref() {
                Some(stale) if self.serve_stale_on_error => {
                    warn!(%err, "refresh failed, serving stale bug aggregate");
                    Ok(Arc::clone(&stale.aggregate))
                }
                _ => Err(err),
            },
        }
    }
}
