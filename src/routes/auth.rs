use actix_web::{delete, get, post, web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AccessResponse, LoginRequest, RefreshRequest, RegisterRequest};
use crate::services::profile_service::ProfileService;
use crate::services::user_service::UserService;
use crate::state::AppState;

/// POST /api/auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let response = UserService::register(&state.db, body.into_inner(), state.config.password_iterations).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/auth/login - access + refresh (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let pair = UserService::login(
        &state.db,
        &state.config.jwt,
        body.username.as_deref(),
        body.password.as_deref(),
    )
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// POST /api/auth/refresh - nouvel access token (PUBLIC)
#[post("/refresh")]
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let access = UserService::refresh(&state.db, &state.config.jwt, body.refresh.as_deref()).await?;
    Ok(HttpResponse::Ok().json(AccessResponse { access }))
}

/// GET /api/auth/me - Infos de l'utilisateur connecté (PROTÉGÉ)
#[get("/me")]
pub async fn me(auth_user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let response = UserService::me(&state.db, &auth_user).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/auth/me - Supprimer son compte (PROTÉGÉ)
#[delete("/me")]
pub async fn delete_me(auth_user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    UserService::delete_account(&state.db, &auth_user).await?;
    ProfileService::remove_user_media(&state.config.media_root, auth_user.user_id).await;

    Ok(HttpResponse::NoContent().finish())
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(refresh)
            .service(me)
            .service(delete_me)
    );
}
