use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CompanyPatch, CompanyPayload};
use crate::services::company_service::{CompanyQuery, CompanyService};
use crate::services::pagination::PageRequest;
use crate::state::AppState;

/// GET /api/companies (PUBLIC)
#[get("")]
pub async fn list_companies(
    req: HttpRequest,
    query: web::Query<CompanyQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = PageRequest::from_request(req.path(), req.query_string());
    let companies = CompanyService::list(&state.db, &query, &page).await?;
    Ok(HttpResponse::Ok().json(companies))
}

/// GET /api/companies/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_company(path: web::Path<i32>, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let company = CompanyService::get(&state.db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(company))
}

/// POST /api/companies - le créateur devient propriétaire (PROTÉGÉ)
#[post("")]
pub async fn create_company(
    auth_user: AuthUser,
    body: web::Json<CompanyPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let company = CompanyService::create(&state.db, &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(company))
}

#[put("/{id}")]
pub async fn replace_company(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CompanyPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let company = CompanyService::replace(&state.db, &auth_user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(company))
}

#[patch("/{id}")]
pub async fn update_company(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CompanyPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let company = CompanyService::update(&state.db, &auth_user, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(company))
}

#[delete("/{id}")]
pub async fn delete_company(
    auth_user: AuthUser,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    CompanyService::delete(&state.db, &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn companies_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/companies")
            .service(list_companies)
            .service(create_company)
            .service(get_company)
            .service(replace_company)
            .service(update_company)
            .service(delete_company)
    );
}
