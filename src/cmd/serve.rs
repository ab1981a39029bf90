use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use tracing::{error, info};

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::dashboard::{Dashboard, current_dashboard};

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind; overrides `server.host`.
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind; overrides `server.port`.
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "dashboard request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/dashboard.json", get(dashboard_json))
        .with_state(Arc::new(ctx))
}

async fn index(State(ctx): State<Arc<AppContext>>) -> Result<Html<String>, AppError> {
    let dashboard = current_dashboard(&ctx).await?;
    Ok(Html(ctx.view.render(&dashboard)?))
}

async fn dashboard_json(State(ctx): State<Arc<AppContext>>) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(current_dashboard(&ctx).await?))
}

pub async fn run(ctx: AppContext, args: ServeArgs) -> AppResult<()> {
    let host = args.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = args.port.unwrap_or(ctx.config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, project = %ctx.config.name, "serving bug dashboard");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}
