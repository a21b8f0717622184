use sea_orm::*;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{MeResponse, RegisterRequest, RegisterResponse};
use crate::models::user_profile::{self, Role};
use crate::models::users;
use crate::utils::jwt::{self, JwtConfig, TokenPair, TokenType};
use crate::utils::password;

pub struct UserService;

impl UserService {
    /// Inscription : username + password obligatoires, rôle candidate par défaut.
    /// User et UserProfile sont créés dans la même transaction.
    pub async fn register(
        db: &DatabaseConnection,
        request: RegisterRequest,
        password_iterations: u32,
    ) -> Result<RegisterResponse, AppError> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default();
        let raw_password = request.password.as_deref().unwrap_or_default();

        if username.is_empty() || raw_password.is_empty() {
            return Err(AppError::Validation("username and password are required".to_string()));
        }
        if username.chars().count() > 150 {
            return Err(AppError::Validation("username must be at most 150 characters".to_string()));
        }

        let role = Role::parse_or_default(request.role.as_deref());

        // 1. Vérifier si l'utilisateur existe déjà (l'index unique reste le garde-fou)
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        // 2. Hash le mot de passe
        let password_hash = password::hash_password(raw_password, password_iterations)
            .map_err(AppError::Internal)?;

        // 3. Créer l'utilisateur et son rôle
        let txn = db.begin().await?;

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(request.email.unwrap_or_default().trim().to_string()),
            password_hash: Set(password_hash),
            is_staff: Set(false),
            date_joined: Set(chrono::Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Username already exists".to_string()),
                other => other,
            })?;

        user_profile::ActiveModel {
            user_id: Set(user.id),
            role: Set(role),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(user_id = user.id, username = %user.username, role = role.as_str(), "user registered");

        Ok(RegisterResponse {
            id: user.id,
            username: user.username,
            role,
        })
    }

    /// Vérifie les identifiants et délivre access + refresh
    pub async fn login(
        db: &DatabaseConnection,
        jwt_config: &JwtConfig,
        username: Option<&str>,
        raw_password: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        let (Some(username), Some(raw_password)) = (username, raw_password) else {
            return Err(AppError::Validation("username and password are required".to_string()));
        };

        let invalid = || AppError::Authentication("Invalid username or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(db)
            .await?
            .ok_or_else(invalid)?;

        let is_valid = password::verify_password(raw_password, &user.password_hash)
            .map_err(AppError::Internal)?;
        if !is_valid {
            return Err(invalid());
        }

        jwt::generate_pair(jwt_config, user.id, &user.username).map_err(AppError::Internal)
    }

    /// Nouvel access token à partir d'un refresh token valide
    pub async fn refresh(
        db: &DatabaseConnection,
        jwt_config: &JwtConfig,
        refresh_token: Option<&str>,
    ) -> Result<String, AppError> {
        let token = refresh_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Validation("refresh is required".to_string()))?;

        let claims = jwt::verify_token(jwt_config, token.trim(), TokenType::Refresh)
            .map_err(AppError::Authentication)?;

        // Le compte a pu être supprimé depuis l'émission du token
        let user = users::Entity::find_by_id(claims.sub)
            .one(db)
            .await?
            .ok_or_else(|| AppError::Authentication("User no longer exists".to_string()))?;

        jwt::generate_token(jwt_config, user.id, &user.username, TokenType::Access)
            .map_err(AppError::Internal)
    }

    /// Utilisateur authentifié, ou 401 si le compte n'existe plus
    pub async fn find_user<C: ConnectionTrait>(db: &C, auth_user: &AuthUser) -> Result<users::Model, AppError> {
        users::Entity::find_by_id(auth_user.user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::Authentication("User no longer exists".to_string()))
    }

    pub async fn is_staff<C: ConnectionTrait>(db: &C, auth_user: &AuthUser) -> Result<bool, AppError> {
        Ok(Self::find_user(db, auth_user).await?.is_staff)
    }

    /// Rôle de l'utilisateur, créé à `candidate` au premier accès.
    /// Insert puis relecture en cas de conflit : deux premiers accès concurrents
    /// ne peuvent pas créer deux profils (user_id est unique).
    pub async fn get_or_create_role<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Role, AppError> {
        if let Some(profile) = Self::find_role_profile(db, user_id).await? {
            return Ok(profile.role);
        }

        let inserted = user_profile::ActiveModel {
            user_id: Set(user_id),
            role: Set(Role::default()),
            ..Default::default()
        }
            .insert(db)
            .await;

        match inserted {
            Ok(profile) => Ok(profile.role),
            Err(e) => match AppError::from(e) {
                AppError::Conflict(_) => Self::find_role_profile(db, user_id)
                    .await?
                    .map(|profile| profile.role)
                    .ok_or_else(|| AppError::Internal("role profile vanished after conflict".to_string())),
                other => Err(other),
            },
        }
    }

    async fn find_role_profile<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<user_profile::Model>, AppError> {
        Ok(user_profile::Entity::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(db)
            .await?)
    }

    /// GET /auth/me
    pub async fn me(db: &DatabaseConnection, auth_user: &AuthUser) -> Result<MeResponse, AppError> {
        let user = Self::find_user(db, auth_user).await?;
        let role = Self::get_or_create_role(db, user.id).await?;

        Ok(MeResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role,
            is_candidate: role.is_candidate(),
            is_recruiter: role.is_recruiter(),
        })
    }

    /// Supprime le compte. Les clés étrangères suppriment profils et candidatures,
    /// et passent owner_id à NULL sur les entreprises possédées.
    pub async fn delete_account(db: &DatabaseConnection, auth_user: &AuthUser) -> Result<(), AppError> {
        let result = users::Entity::delete_by_id(auth_user.user_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::Authentication("User no longer exists".to_string()));
        }

        tracing::info!(user_id = auth_user.user_id, "user account deleted");
        Ok(())
    }
}
