//! Inspector - note citation and search highlighting server.
//!
//! The application is organized into the following modules:
//!
//! - `citations`: Citation descriptor parsing and cited-text lookup
//! - `search`: Case-insensitive overlapping range search
//! - `navigation`: Current-match cursors
//! - `debounce`: Quiescence timers for query commits
//! - `compositor`: Merging search and citation ranges into segments
//! - `render`: Markdown rendering with highlight marks
//! - `session`: Per-connection inspection store
//! - `handlers`: HTTP routes and the websocket session loop

use std::process::ExitCode;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inspector::{handlers, load_review, AppState, Config};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,inspector=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();
    let review = match load_review(&config.data_path) {
        Ok(review) => review,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    let addr = config.addr.clone();
    let state = Arc::new(AppState::new(review, config));

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(handlers::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, "failed to bind: {}", err);
            return ExitCode::FAILURE;
        }
    };

    info!(
        %addr,
        data = %state.config.data_path.display(),
        guidelines = state.review.guidelines.len(),
        "inspector running at http://{}",
        addr
    );

    if let Err(err) = axum::serve(listener, app).await {
        error!("server error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
