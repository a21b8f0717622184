use std::collections::HashMap;

use sea_orm::*;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ApplicationCreate, ApplicationPatch, ApplicationResponse};
use crate::models::{application, job_offer, users};
use crate::models::application::ApplicationStatus;
use crate::services::pagination::{PageRequest, Paginated, PAGE_SIZE};
use crate::services::user_service::UserService;

const DUPLICATE_APPLICATION: &str = "You have already applied to this job offer";

pub struct ApplicationService;

impl ApplicationService {
    /// Candidatures visibles par le demandeur : les siennes, ou toutes pour le staff.
    /// Le filtre est posé sur la requête : une candidature hors périmètre
    /// n'existe tout simplement pas pour lui.
    async fn scoped<C: ConnectionTrait>(db: &C, auth_user: &AuthUser) -> Result<Select<application::Entity>, AppError> {
        let query = application::Entity::find();
        if UserService::is_staff(db, auth_user).await? {
            Ok(query)
        } else {
            Ok(query.filter(application::Column::UserId.eq(auth_user.user_id)))
        }
    }

    pub async fn list(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        page: &PageRequest,
    ) -> Result<Paginated<ApplicationResponse>, AppError> {
        let paginator = Self::scoped(db, auth_user)
            .await?
            .order_by_desc(application::Column::CreatedAt)
            .order_by_desc(application::Column::Id)
            .paginate(db, PAGE_SIZE);

        let count = paginator.num_items().await?;
        let applications = paginator.fetch_page(page.page_index(count)?).await?;
        let results = Self::to_responses(db, applications).await?;

        Ok(page.build(results, count))
    }

    pub async fn get(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        application_id: i32,
    ) -> Result<ApplicationResponse, AppError> {
        let application = Self::find_scoped(db, auth_user, application_id).await?;
        Self::to_response(db, application).await
    }

    /// Postuler : l'utilisateur est toujours le demandeur, le statut toujours pending.
    /// Vérification + insertion dans une transaction, l'index unique
    /// (user_id, job_offer_id) tranche les requêtes concurrentes.
    pub async fn create(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        payload: ApplicationCreate,
    ) -> Result<ApplicationResponse, AppError> {
        let txn = db.begin().await?;

        // 1. L'utilisateur et l'offre doivent exister
        let user = UserService::find_user(&txn, auth_user).await?;
        let job = job_offer::Entity::find_by_id(payload.job_offer)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Job offer {} does not exist", payload.job_offer)))?;

        // 2. Une seule candidature par offre
        let already_applied = application::Entity::find()
            .filter(application::Column::UserId.eq(user.id))
            .filter(application::Column::JobOfferId.eq(job.id))
            .count(&txn)
            .await?;
        if already_applied > 0 {
            return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
        }

        // 3. Insertion (une violation d'unicité concurrente devient un Conflict)
        let application = application::ActiveModel {
            user_id: Set(user.id),
            job_offer_id: Set(job.id),
            message: Set(payload.message),
            status: Set(ApplicationStatus::Pending),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
            .insert(&txn)
            .await
            .map_err(conflict_as_duplicate)?;

        txn.commit().await.map_err(conflict_as_duplicate)?;

        tracing::info!(application_id = application.id, user_id = user.id, job_id = job.id, "application submitted");

        Ok(ApplicationResponse {
            id: application.id,
            user: user.id,
            user_username: user.username,
            job_offer: job.id,
            job_offer_title: job.title,
            message: application.message,
            status: application.status,
            created_at: application.created_at,
        })
    }

    /// Le candidat modifie son message ; seul le staff change le statut
    pub async fn update(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        application_id: i32,
        patch: ApplicationPatch,
    ) -> Result<ApplicationResponse, AppError> {
        let application = Self::find_scoped(db, auth_user, application_id).await?;
        let is_staff = UserService::is_staff(db, auth_user).await?;

        let mut active_model: application::ActiveModel = application.into();
        if let Some(message) = patch.message {
            active_model.message = Set(message);
        }
        match patch.status {
            Some(status) if is_staff => active_model.status = Set(status),
            Some(_) => {
                tracing::debug!(application_id, user_id = auth_user.user_id, "status change ignored for non-staff user");
            }
            None => {}
        }

        let application = active_model.update(db).await?;
        Self::to_response(db, application).await
    }

    /// Retrait de la candidature (propriétaire ou staff)
    pub async fn delete(db: &DatabaseConnection, auth_user: &AuthUser, application_id: i32) -> Result<(), AppError> {
        let application = Self::find_scoped(db, auth_user, application_id).await?;
        application::Entity::delete_by_id(application.id).exec(db).await?;

        tracing::info!(application_id, user_id = auth_user.user_id, "application withdrawn");
        Ok(())
    }

    async fn find_scoped(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        application_id: i32,
    ) -> Result<application::Model, AppError> {
        Self::scoped(db, auth_user)
            .await?
            .filter(application::Column::Id.eq(application_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Application"))
    }

    async fn to_response(db: &DatabaseConnection, application: application::Model) -> Result<ApplicationResponse, AppError> {
        Self::to_responses(db, vec![application])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("application response lost".to_string()))
    }

    /// Charge usernames et titres en deux requêtes pour toute la page
    async fn to_responses(
        db: &DatabaseConnection,
        applications: Vec<application::Model>,
    ) -> Result<Vec<ApplicationResponse>, AppError> {
        let user_ids: Vec<i32> = applications.iter().map(|a| a.user_id).collect();
        let job_ids: Vec<i32> = applications.iter().map(|a| a.job_offer_id).collect();

        let usernames: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let titles: HashMap<i32, String> = job_offer::Entity::find()
            .filter(job_offer::Column::Id.is_in(job_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|j| (j.id, j.title))
            .collect();

        Ok(applications
            .into_iter()
            .map(|a| ApplicationResponse {
                id: a.id,
                user: a.user_id,
                user_username: usernames.get(&a.user_id).cloned().unwrap_or_default(),
                job_offer: a.job_offer_id,
                job_offer_title: titles.get(&a.job_offer_id).cloned().unwrap_or_default(),
                message: a.message,
                status: a.status,
                created_at: a.created_at,
            })
            .collect())
    }
}

fn conflict_as_duplicate(err: DbErr) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::Conflict(DUPLICATE_APPLICATION.to_string()),
        other => other,
    }
}
