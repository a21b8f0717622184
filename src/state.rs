use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::notification_service::NotificationQueue;
use crate::services::response_cache::ResponseCache;

/// État partagé entre toutes les requêtes (web::Data<AppState>)
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub trending_cache: ResponseCache,
    pub notifications: NotificationQueue,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, notifications: NotificationQueue) -> Self {
        let trending_cache = ResponseCache::new(config.trending_cache_ttl);
        Self {
            db,
            config,
            trending_cache,
            notifications,
        }
    }
}
