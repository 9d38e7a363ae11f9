use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use db_pool::create_pool as create_pg_pool;
use posting_service::auth::{JwtValidator, RedisRevocationStore, RevocationStore};
use posting_service::clients::{BlobStore, LabelDetector, RekognitionLabelDetector, S3BlobStore};
use posting_service::handlers::{self, AppState};
use posting_service::middleware::JwtAuthMiddleware;
use posting_service::repository::{FeedStore, PostStore, PostgresStore, SocialGraphStore};
use posting_service::services::{
    FeedQueryService, PostIngestionService, PostService, SocialGraphGate,
};
use s3_utils::S3Operations;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "posting-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "posting-service"
        })),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Posting Service
///
/// Image posts tagged by a label detector, a followed-users feed with like
/// aggregates, and the follow/like graph behind it.
///
/// # Routes
///
/// - `/api/v1/posts/*` - Create (multipart upload), read, edit, delete posts
/// - `/api/v1/users/me/posts` - Own posts, oldest first
/// - `/api/v1/feed` - Followed-users feed, newest first
/// - `/api/v1/follows/{user_id}`, `/api/v1/likes/{post_id}` - Graph edges
/// - `/api/v1/auth/logout` - Revoke the current session
///
/// # Dependencies
///
/// - PostgreSQL for posts, tags and graph edges
/// - Redis for revoked sessions
/// - S3 for images, Rekognition for labels
#[actix_web::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing();

    // Load configuration
    let config = posting_service::Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting posting-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    if !config.app.is_production() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set; using the development secret");
    }

    // Initialize database connection pool
    config.database.pool.log_config();
    let db_pool = create_pg_pool(config.database.pool.clone())
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    // Redis for session revocation
    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Invalid REDIS_URL")?;
    let redis_manager = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("Failed to initialize Redis connection")?;

    // AWS clients
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(config.s3.region.clone()))
        .load()
        .await;
    let s3_client = Arc::new(s3_utils::build_client(&aws_config, &config.s3));
    let rekognition_client = aws_sdk_rekognition::Client::new(&aws_config);

    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(S3Operations::new(
        s3_client,
        config.s3.clone(),
    )));
    let detector: Arc<dyn LabelDetector> = Arc::new(RekognitionLabelDetector::new(
        rekognition_client,
        config.s3.bucket.clone(),
        config.detection.max_labels,
    ));

    let store = Arc::new(PostgresStore::new(db_pool.clone()));
    let post_store: Arc<dyn PostStore> = store.clone();
    let feed_store: Arc<dyn FeedStore> = store.clone();
    let graph_store: Arc<dyn SocialGraphStore> = store;
    let revocations: Arc<dyn RevocationStore> = Arc::new(RedisRevocationStore::new(redis_manager));

    let state = web::Data::new(AppState {
        ingestion: Arc::new(PostIngestionService::new(
            post_store.clone(),
            blobs,
            detector,
            config.detection.external_call_timeout(),
        )),
        posts: PostService::new(post_store),
        feed: FeedQueryService::new(feed_store),
        graph: SocialGraphGate::new(graph_store),
        revocations: revocations.clone(),
    });

    let auth = JwtAuthMiddleware::new(
        Arc::new(JwtValidator::new(config.auth.jwt_secret.as_bytes())),
        revocations,
    );
    let health_state = web::Data::new(HealthState { db_pool });

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(health_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(posting_service::metrics::serve_metrics),
            )
            .route("/api/v1/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .wrap(auth.clone())
                    .configure(handlers::routes),
            )
    })
    .bind(&http_bind_address)
    .with_context(|| format!("Failed to bind {}", http_bind_address))?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => result.context("HTTP server error"),
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            Ok(())
        }
    }
}
