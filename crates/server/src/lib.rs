//! nertag Server - HTTP endpoint for token-level NER tagging
//!
//! Wraps a [`nertag::PredictionService`] in an axum router. The service is
//! built once at startup from [`ServerConfig::pipeline`] and shared by every
//! request; nothing is loaded lazily.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /predict` (also `/predict/`) - tag a token list
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe, 503 after a model failure
//! - `GET /metrics` - Prometheus metrics
//!
//! Errors are returned as `{"error": "...", "code": "..."}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
