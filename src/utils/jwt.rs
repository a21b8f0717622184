use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

/// Type de token : l'access token authentifie les requêtes,
/// le refresh token sert uniquement à obtenir un nouvel access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub username: String,
    pub token_type: TokenType,
    pub exp: i64,        // expiration timestamp
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Paire de tokens renvoyée au login
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Génère un JWT du type demandé pour un utilisateur
pub fn generate_token(
    config: &JwtConfig,
    user_id: i32,
    username: &str,
    token_type: TokenType,
) -> Result<String, String> {
    let ttl = match token_type {
        TokenType::Access => config.access_ttl,
        TokenType::Refresh => config.refresh_ttl,
    };

    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        token_type,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Génère access + refresh en une fois (POST /auth/login)
pub fn generate_pair(config: &JwtConfig, user_id: i32, username: &str) -> Result<TokenPair, String> {
    Ok(TokenPair {
        access: generate_token(config, user_id, username, TokenType::Access)?,
        refresh: generate_token(config, user_id, username, TokenType::Refresh)?,
    })
}

/// Vérifie la signature et l'expiration, puis le type attendu
pub fn verify_token(config: &JwtConfig, token: &str, expected: TokenType) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))?;

    if claims.token_type != expected {
        return Err("Invalid token: wrong token type".to_string());
    }

    Ok(claims)
}
