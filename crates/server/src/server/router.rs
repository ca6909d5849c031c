use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RequestError;
use crate::server::apikey::issue_api_key;
use crate::server::resources::{
    click, create_resource, downvote, get_resource, list_resources, update_resource, upvote,
};
use crate::server::search::search;
use crate::server::state::AppState;
use crate::server::taxonomy::{get_category, get_language, list_categories, list_languages};

pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/resources", get(list_resources).post(create_resource))
        .route("/resources/:id", get(get_resource).put(update_resource))
        .route("/resources/:id/upvote", put(upvote))
        .route("/resources/:id/downvote", put(downvote))
        .route("/resources/:id/click", put(click))
        .route("/search", get(search))
        .route("/languages", get(list_languages))
        .route("/languages/:id", get(get_language))
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
        .route("/apikey", post(issue_api_key))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn unknown_route() -> RequestError {
    RequestError::NotFound
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.server.address.clone();
    let app = build(state);

    let listener = TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
