use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::utils::jwt::{self, TokenType};

/// Identité de l'utilisateur authentifié.
/// Extraite du header `Authorization: Bearer <token>` et passée explicitement
/// à chaque service : il n'y a pas d'utilisateur "courant" global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState is not configured".to_string()))?;

    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".to_string()))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid Authorization header".to_string()))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Authentication(
            "Invalid Authorization format (expected: Bearer <token>)".to_string(),
        )
    })?;

    // 4. Vérifier le token JWT (access uniquement)
    let claims = jwt::verify_token(&state.config.jwt, token.trim(), TokenType::Access)
        .map_err(AppError::Authentication)?;

    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.username,
    })
}
