use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ApplicationCreate, ApplicationPatch};
use crate::services::application_service::ApplicationService;
use crate::services::pagination::PageRequest;
use crate::state::AppState;

/// GET /api/applications - mes candidatures (toutes pour le staff)
#[get("")]
pub async fn list_applications(
    req: HttpRequest,
    auth_user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = PageRequest::from_request(req.path(), req.query_string());
    let applications = ApplicationService::list(&state.db, &auth_user, &page).await?;
    Ok(HttpResponse::Ok().json(applications))
}

#[get("/{id}")]
pub async fn get_application(
    auth_user: AuthUser,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let application = ApplicationService::get(&state.db, &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(application))
}

/// POST /api/applications - postuler à une offre
#[post("")]
pub async fn create_application(
    auth_user: AuthUser,
    body: web::Json<ApplicationCreate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let application = ApplicationService::create(&state.db, &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(application))
}

#[patch("/{id}")]
pub async fn update_application(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ApplicationPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let application = ApplicationService::update(&state.db, &auth_user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(application))
}

#[delete("/{id}")]
pub async fn delete_application(
    auth_user: AuthUser,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    ApplicationService::delete(&state.db, &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn applications_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/applications")
            .service(list_applications)
            .service(create_application)
            .service(get_application)
            .service(update_application)
            .service(delete_application)
    );
}
