use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::bug::Bug;
use crate::error::{AppError, AppResult};
use crate::services::BugTrackerService;

/// Fetches every page of one query, in order. Each page request holds a
/// permit from `gate` for exactly the duration of the request.
pub async fn fetch_collection(
    tracker: &dyn BugTrackerService,
    gate: &Semaphore,
    url: String,
    params: Vec<(String, String)>,
) -> AppResult<Vec<Bug>> {
    let mut bugs = Vec::new();
    let mut next = Some(url);
    let mut params = params;
    let mut pages = 0usize;

    while let Some(url) = next.take() {
        let page = {
            let _permit = gate
                .acquire()
                .await
                .map_err(|err| AppError::Fetch(format!("request gate closed: {err}")))?;
            tracker.get_page(&url, &params).await?
        };
        pages += 1;
        if pages == 1 {
            debug!(url = %url, total = ?page.total_size, "first page received");
        }

        bugs.extend(page.entries.into_iter().map(Bug::from_raw));
        next = page.next_collection_link;
        // The next link already encodes the full query.
        params.clear();
    }

    debug!(pages, bugs = bugs.len(), "collection exhausted");
    Ok(bugs)
}
