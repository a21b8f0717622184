pub mod applications;
pub mod auth;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod profiles;

use actix_web::web;

use crate::errors::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Un JSON ou une query string mal formés renvoient le même format d'erreur que le reste
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .app_data(query_config)
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(companies::companies_routes)
            .configure(jobs::jobs_routes)
            .configure(applications::applications_routes)
            .configure(profiles::profiles_routes)
    );
}
