// Outils partagés par les tests : base SQLite en mémoire, état, fixtures

use std::path::PathBuf;
use std::time::Duration;

use actix_web::web;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::AppConfig;
use crate::db;
use crate::middleware::AuthUser;
use crate::models::application::{self, ApplicationStatus};
use crate::models::{company, job_offer, users};
use crate::services::notification_service::{JobNotification, NotificationQueue};
use crate::state::AppState;
use crate::utils::jwt::{self, JwtConfig, TokenType};
use crate::utils::password;

pub const TEST_PASSWORD_ITERATIONS: u32 = 1_000;

/// Une seule connexion : chaque connexion SQLite `:memory:` aurait sa propre base
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    db::create_schema(&db).await.unwrap();
    db
}

pub fn test_config() -> AppConfig {
    let media_root: PathBuf = std::env::temp_dir().join(format!("jobpulse-test-{}", uuid::Uuid::new_v4()));

    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_ttl: chrono::Duration::minutes(5),
            refresh_ttl: chrono::Duration::hours(1),
        },
        password_iterations: TEST_PASSWORD_ITERATIONS,
        media_root,
        media_url: "/media".to_string(),
        trending_cache_ttl: Duration::from_secs(900),
        notification_delay: Duration::ZERO,
        seed_demo_data: false,
    }
}

/// État complet + récepteur de la file de notifications (pour vérifier les envois)
pub async fn test_state() -> (web::Data<AppState>, UnboundedReceiver<JobNotification>) {
    let db = setup_db().await;
    let (queue, receiver) = NotificationQueue::new();
    (web::Data::new(AppState::new(db, test_config(), queue)), receiver)
}

pub async fn insert_user(db: &DatabaseConnection, username: &str, is_staff: bool) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(password::hash_password("pw123", TEST_PASSWORD_ITERATIONS).unwrap()),
        is_staff: Set(is_staff),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn insert_company(db: &DatabaseConnection, name: &str, owner_id: Option<i32>) -> company::Model {
    company::ActiveModel {
        name: Set(name.to_string()),
        sector: Set(String::new()),
        description: Set(String::new()),
        owner_id: Set(owner_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn insert_job(
    db: &DatabaseConnection,
    title: &str,
    company_id: Option<i32>,
    salary: Option<i64>,
    location: &str,
) -> job_offer::Model {
    job_offer::ActiveModel {
        title: Set(title.to_string()),
        company_id: Set(company_id),
        description: Set(String::new()),
        salary: Set(salary.map(Decimal::from)),
        location: Set(location.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub async fn insert_application(db: &DatabaseConnection, user_id: i32, job_offer_id: i32) -> application::Model {
    application::ActiveModel {
        user_id: Set(user_id),
        job_offer_id: Set(job_offer_id),
        message: Set(String::new()),
        status: Set(ApplicationStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .unwrap()
}

pub fn auth_user(user: &users::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        username: user.username.clone(),
    }
}

/// Header `Authorization` prêt à l'emploi pour TestRequest
pub fn bearer(user: &users::Model, config: &AppConfig) -> (&'static str, String) {
    let token = jwt::generate_token(&config.jwt, user.id, &user.username, TokenType::Access).unwrap();
    ("Authorization", format!("Bearer {}", token))
}
