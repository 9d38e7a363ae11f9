/// Posting Service Library
///
/// Image posts with detector-sourced tags, the followed-users feed and the
/// follow/like graph that feeds it.
///
/// # Modules
///
/// - `services`: ingestion, tag catalog, feed queries, social graph writes
/// - `repository`: storage ports and their PostgreSQL implementation
/// - `clients`: blob store and label detector adapters (S3, Rekognition)
/// - `auth`: bearer token validation and session revocation
/// - `handlers`: HTTP request handlers
/// - `middleware`: JWT authentication middleware and identity extractors
/// - `models`: rows, response shapes and pagination
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors and the `/metrics` handler
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
