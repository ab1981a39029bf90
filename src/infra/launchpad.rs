use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::BugTrackerService;
use crate::services::bug_tracker::CollectionPage;

pub struct LaunchpadClient {
    http: Client,
}

impl LaunchpadClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bug-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl BugTrackerService for LaunchpadClient {
    async fn get_page(&self, url: &str, params: &[(String, String)]) -> AppResult<CollectionPage> {
        debug!(url, params = params.len(), "requesting collection page");

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AppError::Fetch(format!("failed to call {url}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Fetch(format!("{url} responded with {status}: {body}")));
        }

        response
            .json::<CollectionPage>()
            .await
            .map_err(|err| AppError::Payload(format!("failed to parse page from {url}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{RawQuery, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<Option<String>>>>;

    fn task(n: u32) -> Value {
        json!({
            "self_link": format!("https://api.launchpad.net/1.0/ironic/+bug/{n}"),
            "bug_link": format!("https://api.launchpad.net/1.0/bugs/{n}"),
            "web_link": format!("https://bugs.launchpad.net/ironic/+bug/{n}"),
            "title": format!("Bug #{n}"),
            "status": "New",
            "importance": "Undecided",
            "assignee_link": null,
            "date_created": "2024-03-01T12:00:00.000000+00:00",
        })
    }

    async fn collection(State(seen): State<Seen>, RawQuery(query): RawQuery) -> Json<Value> {
        seen.lock().unwrap().push(query.clone());
        let page = query.as_deref().unwrap_or_default();
        if page.contains("memo=100") {
            Json(json!({ "entries": [task(3)], "total_size": 3 }))
        } else {
            Json(json!({
                "entries": [task(1), task(2)],
                "next_collection_link": "NEXT",
                "total_size": 3,
            }))
        }
    }

    async fn spawn_server() -> (SocketAddr, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/ironic", get(collection))
            .route("/broken", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }))
            .route("/empty", get(|| async { Json(json!({ "total_size": 0 })) }))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (addr, seen)
    }

    fn client() -> LaunchpadClient {
        LaunchpadClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_query_params_and_parses_page() {
        let (addr, seen) = spawn_server().await;
        let params = vec![
            ("ws.op".to_string(), "searchTasks".to_string()),
            ("status".to_string(), "New".to_string()),
            ("status".to_string(), "In Progress".to_string()),
        ];

        let page = client()
            .get_page(&format!("http://{addr}/ironic"), &params)
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.next_collection_link.as_deref(), Some("NEXT"));
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].as_deref(),
            Some("ws.op=searchTasks&status=New&status=In+Progress")
        );
    }

    #[tokio::test]
    async fn follows_link_without_extra_params() {
        let (addr, seen) = spawn_server().await;

        let page = client()
            .get_page(&format!("http://{addr}/ironic?ws.op=searchTasks&memo=100"), &[])
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 1);
        assert!(page.next_collection_link.is_none());
        assert_eq!(
            seen.lock().unwrap()[0].as_deref(),
            Some("ws.op=searchTasks&memo=100")
        );
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let (addr, _) = spawn_server().await;

        let err = client()
            .get_page(&format!("http://{addr}/broken"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Fetch(message) if message.contains("503")));
    }

    #[tokio::test]
    async fn missing_entries_is_payload_error() {
        let (addr, _) = spawn_server().await;

        let err = client()
            .get_page(&format!("http://{addr}/empty"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Payload(_)));
    }
}
