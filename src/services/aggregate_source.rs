use async_trait::async_trait;

use crate::domain::aggregate::Aggregate;
use crate::error::AppResult;

#[async_trait]
pub trait AggregateSource: Send + Sync {
    async fn fetch_aggregate(&self) -> AppResult<Aggregate>;
}
