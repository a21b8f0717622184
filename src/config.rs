// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Toutes les valeurs viennent des variables d'environnement (.env chargé par
// dotenv dans main.rs). Seule DATABASE_URL est obligatoire.
//
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;
use crate::utils::jwt::JwtConfig;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub password_iterations: u32,
    pub media_root: PathBuf,
    pub media_url: String,
    pub trending_cache_ttl: Duration,
    pub notification_delay: Duration,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set in .env file".to_string()))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl: chrono::Duration::minutes(parse_var("JWT_ACCESS_TTL_MINUTES", 60)?),
                refresh_ttl: chrono::Duration::hours(parse_var("JWT_REFRESH_TTL_HOURS", 24)?),
            },
            password_iterations: parse_var("PASSWORD_ITERATIONS", 260_000)?,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            media_url: env::var("MEDIA_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "/media".to_string()),
            trending_cache_ttl: Duration::from_secs(parse_var("TRENDING_CACHE_TTL_SECONDS", 900)?),
            notification_delay: Duration::from_secs(parse_var("NOTIFICATION_DELAY_SECONDS", 5)?),
            seed_demo_data: parse_var("SEED_DEMO_DATA", false)?,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Lit une variable optionnelle ; une valeur présente mais invalide est une erreur.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
