//! Two small backends in front of the evaluation service.
//!
//! # Services
//!
//! ## Ranking (port 8080)
//! - `GET /users`: top 5 users by post count
//! - `GET /posts?type=latest|popular`: 5 newest posts, or every post tied at the most comments
//! - `GET /comments/{postId}`: upstream comments payload, untouched
//!
//! ## Numbers (port 9876)
//! - `GET /numbers/{typeCode}`: fetch `p`rimes, `e`ven, `f`ibo or `r`and numbers,
//!   push them through the sliding window, report previous/current window and average
//!
//! # Upstream
//!
//! Every request fans out to the evaluation service with the bearer token read
//! from `auth_token.json` at startup. One upstream failure fails the whole
//! request with a 500, partial results are never returned.
//!
//! Fan-out is sequential unless `FANOUT_LIMIT` is raised. Results keep
//! enumeration order either way, so rankings stay deterministic.
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `RUST_PORT` | `8080` ranking, `9876` numbers |
//! | `UPSTREAM_URL` | `http://20.244.56.144/evaluation-service` |
//! | `UPSTREAM_TIMEOUT_MS` | `5000` |
//! | `AUTH_TOKEN_PATH` | `auth_token.json` |
//! | `REQUIRE_TOKEN` | `false`, refuse to start without a token when set |
//! | `FANOUT_LIMIT` | `1` |
//! | `WINDOW_SIZE` | `10` |
//!
//! # Setup
//!
//! Run the ranking service with logs.
//! ```sh
//! RUST_LOG=info cargo run --bin ranking
//! ```
//!
//! Run the numbers service.
//! ```sh
//! RUST_LOG=info cargo run --bin numbers
//! ```
//!
//! Log every window update.
//! ```sh
//! RUST_LOG=info cargo run --bin numbers --features verbose
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod fanout;
pub mod ranking;
pub mod routes;
pub mod state;
pub mod window;

use config::{Config, Service};
use routes::{comments_handler, numbers_handler, posts_handler, top_users_handler};
use state::{NumbersState, RankingState};

pub fn init_tracing() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

pub fn ranking_router(state: Arc<RankingState>) -> Router {
    Router::new()
        .route("/users", get(top_users_handler))
        .route("/posts", get(posts_handler))
        .route("/comments/{post_id}", get(comments_handler))
        .layer(cors())
        .with_state(state)
}

pub fn numbers_router(state: Arc<NumbersState>) -> Router {
    Router::new()
        .route("/numbers/{type_code}", get(numbers_handler))
        .layer(cors())
        .with_state(state)
}

pub async fn start_ranking_server() -> anyhow::Result<()> {
    info!("Initializing ranking state...");
    let config = Config::load(Service::Ranking)?;
    let port = config.port;
    let state = RankingState::new(config)?;

    serve(ranking_router(state), port).await
}

pub async fn start_numbers_server() -> anyhow::Result<()> {
    info!("Initializing numbers state...");
    let config = Config::load(Service::Numbers)?;
    let port = config.port;
    let state = NumbersState::new(config)?;

    serve(numbers_router(state), port).await
}

async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
