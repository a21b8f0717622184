use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{JobOfferPatch, JobOfferPayload};
use crate::services::job_filter::{JobOfferFilter, JobOfferQuery};
use crate::services::job_offer_service::JobOfferService;
use crate::services::pagination::PageRequest;
use crate::state::AppState;

/// GET /api/jobs - Liste filtrée et paginée (PUBLIC)
#[get("")]
pub async fn list_jobs(
    req: HttpRequest,
    query: web::Query<JobOfferQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let filter = JobOfferFilter::from(query.into_inner());
    let page = PageRequest::from_request(req.path(), req.query_string());

    let jobs = JobOfferService::list(&state.db, &filter, &page).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// GET /api/jobs/trending - Les 10 offres les plus récentes (PUBLIC, en cache)
#[get("/trending")]
pub async fn trending_jobs(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cache_key = req.uri().to_string();

    if let Some(cached) = state.trending_cache.get(&cache_key) {
        tracing::debug!(key = %cache_key, "trending served from cache");
        return Ok(HttpResponse::Ok().json(cached));
    }

    let jobs = JobOfferService::trending(&state.db).await?;
    let body = serde_json::to_value(&jobs)
        .map_err(|e| AppError::Internal(format!("cannot serialize trending jobs: {}", e)))?;
    state.trending_cache.insert(&cache_key, body.clone());

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/jobs/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_job(path: web::Path<i32>, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let job = JobOfferService::get(&state.db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/jobs - Publier une offre (PROTÉGÉ)
#[post("")]
pub async fn create_job(
    auth_user: AuthUser,
    body: web::Json<JobOfferPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let job = JobOfferService::create(&state.db, &state.notifications, &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

/// PUT /api/jobs/{id} (PROTÉGÉ)
#[put("/{id}")]
pub async fn replace_job(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<JobOfferPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let job = JobOfferService::replace(&state.db, &auth_user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// PATCH /api/jobs/{id} (PROTÉGÉ)
#[patch("/{id}")]
pub async fn update_job(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<JobOfferPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let job = JobOfferService::update(&state.db, &auth_user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// DELETE /api/jobs/{id} (PROTÉGÉ)
#[delete("/{id}")]
pub async fn delete_job(
    auth_user: AuthUser,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    JobOfferService::delete(&state.db, &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn jobs_routes(cfg: &mut web::ServiceConfig) {
    // trending avant {id}, sinon "trending" serait pris pour un id
    cfg.service(
        web::scope("/jobs")
            .service(list_jobs)
            .service(create_job)
            .service(trending_jobs)
            .service(get_job)
            .service(replace_job)
            .service(update_job)
            .service(delete_job)
    );
}
