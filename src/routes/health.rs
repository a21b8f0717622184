use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::models::health::HealthResponse;
use crate::state::AppState;

/// GET /api/health - état du service et de la base (PUBLIC)
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            "unavailable"
        }
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use crate::test_support;

    #[actix_web::test]
    async fn test_health_reports_database() {
        let (state, _receiver) = test_support::test_state().await;
        let app = test::init_service(App::new().app_data(state).service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
    }
}
