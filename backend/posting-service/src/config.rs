/// Configuration management for Posting Service
///
/// Loaded from environment variables; `.env` is read by `main` via dotenvy.
use db_pool::env_utils::{parse_env_flag, parse_env_with_default};
use db_pool::DbConfig;
use s3_utils::S3Config;
use std::fmt;
use std::time::Duration;

const SERVICE_NAME: &str = "posting-service";
const DEV_JWT_SECRET: &str = "posting-service-development-secret-not-for-prod";
const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database pool configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Image bucket
    pub s3: S3Config,
    /// Label detection and external call limits
    pub detection: DetectionConfig,
    /// Token validation
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub pool: DbConfig,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Labels requested per DetectLabels call
    pub max_labels: i32,
    /// Bound on each blob upload and detector call
    pub external_call_timeout_ms: u64,
}

impl DetectionConfig {
    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_millis(self.external_call_timeout_ms)
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POSTING_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("POSTING_SERVICE_PORT", 8082),
            },
            database: DatabaseConfig {
                pool: DbConfig::from_env(SERVICE_NAME)?,
                run_migrations: parse_env_flag("RUN_MIGRATIONS", true),
            },
            cache: CacheConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            s3: S3Config::from_env().map_err(|e| e.to_string())?,
            detection: {
                let max_labels: i32 = parse_env_with_default("DETECTION_MAX_LABELS", 5);
                if max_labels < 1 {
                    return Err("DETECTION_MAX_LABELS must be at least 1".to_string());
                }
                let external_call_timeout_ms: u64 =
                    parse_env_with_default("EXTERNAL_CALL_TIMEOUT_MS", 10_000);
                if external_call_timeout_ms == 0 {
                    return Err("EXTERNAL_CALL_TIMEOUT_MS must be greater than 0".to_string());
                }

                DetectionConfig {
                    max_labels,
                    external_call_timeout_ms,
                }
            },
            auth: AuthConfig {
                jwt_secret: load_jwt_secret(is_production)?,
            },
        })
    }
}

fn load_jwt_secret(is_production: bool) -> Result<String, String> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if is_production && secret.len() < MIN_PRODUCTION_SECRET_BYTES => Err(format!(
            "JWT_SECRET must be at least {} bytes in production",
            MIN_PRODUCTION_SECRET_BYTES
        )),
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if is_production => Err("JWT_SECRET must be set in production".to_string()),
        _ => Ok(DEV_JWT_SECRET.to_string()),
    }
}
