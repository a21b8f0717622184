mod config;
mod db;
mod errors;
mod logging;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod utils;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::config::AppConfig;
use crate::logging::LoggingConfig;
use crate::services::notification_service::{spawn_notification_worker, LogNotificationSender, NotificationQueue};
use crate::services::seed_service::SeedService;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    logging::init_logging(&LoggingConfig::from_env())
        .map_err(|e| std::io::Error::other(format!("failed to initialize logging: {}", e)))?;

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::create_schema(&db).await.map_err(std::io::Error::other)?;

    if config.seed_demo_data {
        let created = SeedService::seed_demo_data(&db).await.map_err(std::io::Error::other)?;
        tracing::info!(jobs = created, "demo data seeding done");
    }

    // Worker des notifications : consomme la file tant que le serveur tourne
    let (notifications, receiver) = NotificationQueue::new();
    spawn_notification_worker(receiver, Arc::new(LogNotificationSender), config.notification_delay);

    let bind_address = config.bind_address();
    let cleanup_every = config.trending_cache_ttl.max(Duration::from_secs(1));
    let state = web::Data::new(AppState::new(db, config, notifications));

    // Purge périodique des réponses expirées du cache "trending"
    let cache = state.trending_cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            cache.cleanup_expired();
            tracing::debug!(entries = cache.len(), "trending cache cleaned");
        }
    });

    tracing::info!(host = %bind_address.0, port = bind_address.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::configure_routes)
    })
        .bind(bind_address)?
        .run()
        .await
}
