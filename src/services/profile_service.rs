// ============================================================================
// PROFIL CANDIDAT (/api/profiles/me)
// ============================================================================
//
// Description:
//   Un profil par utilisateur, créé vide au premier accès. Toujours adressé
//   via l'utilisateur authentifié, jamais par id.
//
// Stockage du CV:
//   MEDIA_ROOT/cvs/user_<id>/cv.<ext>
//   - un seul CV par utilisateur, l'ancien fichier est remplacé
//   - la colonne `cv` contient le chemin relatif à MEDIA_ROOT
//
// ============================================================================

use std::path::{Path, PathBuf};

use sea_orm::*;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::candidate_profile;
use crate::models::dto::{ProfilePatch, ProfilePayload};

pub const MAX_CV_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_CV_EXTENSION: &str = "pdf";
const MAX_EXTENSION_LEN: usize = 8;

pub struct ProfileService;

impl ProfileService {
    /// Profil du demandeur, créé au premier accès.
    /// Insert puis relecture en cas de conflit (user_id unique).
    pub async fn get_or_create(db: &DatabaseConnection, auth_user: &AuthUser) -> Result<candidate_profile::Model, AppError> {
        if let Some(profile) = Self::find(db, auth_user.user_id).await? {
            return Ok(profile);
        }

        let now = chrono::Utc::now();
        let inserted = candidate_profile::ActiveModel {
            user_id: Set(auth_user.user_id),
            full_name: Set(String::new()),
            phone: Set(String::new()),
            cv: Set(None),
            cover_letter: Set(String::new()),
            skills: Set(String::new()),
            experience: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
            .insert(db)
            .await;

        match inserted {
            Ok(profile) => {
                tracing::info!(user_id = auth_user.user_id, "candidate profile created");
                Ok(profile)
            }
            Err(e) => match AppError::from(e) {
                AppError::Conflict(_) => Self::find(db, auth_user.user_id)
                    .await?
                    .ok_or_else(|| AppError::Internal("candidate profile vanished after conflict".to_string())),
                // FK : le compte a été supprimé entre-temps
                AppError::Validation(_) => Err(AppError::Authentication("User no longer exists".to_string())),
                other => Err(other),
            },
        }
    }

    /// PUT : les champs omis reprennent leur valeur vide
    pub async fn replace(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        payload: ProfilePayload,
    ) -> Result<candidate_profile::Model, AppError> {
        let patch = ProfilePatch {
            full_name: Some(payload.full_name),
            phone: Some(payload.phone),
            cover_letter: Some(payload.cover_letter),
            skills: Some(payload.skills),
            experience: Some(payload.experience),
        };
        Self::update(db, auth_user, patch).await
    }

    /// PATCH : seuls les champs fournis changent, updated_at est toujours rafraîchi
    pub async fn update(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        patch: ProfilePatch,
    ) -> Result<candidate_profile::Model, AppError> {
        let profile = Self::get_or_create(db, auth_user).await?;

        let mut active_model: candidate_profile::ActiveModel = profile.into();
        if let Some(full_name) = patch.full_name {
            active_model.full_name = Set(full_name.trim().to_string());
        }
        if let Some(phone) = patch.phone {
            active_model.phone = Set(phone.trim().to_string());
        }
        if let Some(cover_letter) = patch.cover_letter {
            active_model.cover_letter = Set(cover_letter);
        }
        if let Some(skills) = patch.skills {
            active_model.skills = Set(skills);
        }
        if let Some(experience) = patch.experience {
            active_model.experience = Set(experience);
        }
        active_model.updated_at = Set(chrono::Utc::now());

        Ok(active_model.update(db).await?)
    }

    /// Enregistre le CV sous cvs/user_<id>/cv.<ext> et met à jour le profil
    pub async fn upload_cv(
        db: &DatabaseConnection,
        media_root: &Path,
        auth_user: &AuthUser,
        filename: Option<&str>,
        content: &[u8],
    ) -> Result<candidate_profile::Model, AppError> {
        if content.is_empty() {
            return Err(AppError::Validation("The submitted CV file is empty".to_string()));
        }
        if content.len() > MAX_CV_BYTES {
            return Err(AppError::Validation("The CV must not exceed 5 MiB".to_string()));
        }

        let profile = Self::get_or_create(db, auth_user).await?;

        // 1. Écrire le nouveau fichier
        let relative_path = cv_relative_path(auth_user.user_id, filename);
        let absolute_path = media_root.join(&relative_path);
        if let Some(parent) = absolute_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("cannot create CV directory: {}", e)))?;
        }
        tokio::fs::write(&absolute_path, content)
            .await
            .map_err(|e| AppError::Internal(format!("cannot write CV: {}", e)))?;

        // 2. Supprimer l'ancien s'il avait une autre extension
        if let Some(previous) = profile.cv.as_deref().filter(|p| *p != relative_path) {
            if let Err(e) = tokio::fs::remove_file(media_root.join(previous)).await {
                tracing::warn!(user_id = auth_user.user_id, error = %e, "failed to remove previous CV");
            }
        }

        // 3. Enregistrer le chemin
        let mut active_model: candidate_profile::ActiveModel = profile.into();
        active_model.cv = Set(Some(relative_path));
        active_model.updated_at = Set(chrono::Utc::now());
        let profile = active_model.update(db).await?;

        tracing::info!(user_id = auth_user.user_id, size = content.len(), "CV uploaded");
        Ok(profile)
    }

    /// Contenu et nom du CV du demandeur
    pub async fn read_cv(
        db: &DatabaseConnection,
        media_root: &Path,
        auth_user: &AuthUser,
    ) -> Result<(String, Vec<u8>), AppError> {
        let cv = Self::find(db, auth_user.user_id)
            .await?
            .and_then(|profile| profile.cv)
            .ok_or_else(|| AppError::not_found("CV"))?;

        let content = match tokio::fs::read(media_root.join(&cv)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::not_found("CV")),
            Err(e) => return Err(AppError::Internal(format!("cannot read CV: {}", e))),
        };

        let filename = Path::new(&cv)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("cv.{}", DEFAULT_CV_EXTENSION));

        Ok((filename, content))
    }

    /// Supprime le dossier des CV de l'utilisateur (suppression de compte)
    pub async fn remove_user_media(media_root: &Path, user_id: i32) {
        let dir = user_cv_dir(media_root, user_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::info!(user_id, "user media removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(user_id, error = %e, "failed to remove user media"),
        }
    }

    async fn find(db: &DatabaseConnection, user_id: i32) -> Result<Option<candidate_profile::Model>, AppError> {
        Ok(candidate_profile::Entity::find()
            .filter(candidate_profile::Column::UserId.eq(user_id))
            .one(db)
            .await?)
    }
}

fn user_cv_dir(media_root: &Path, user_id: i32) -> PathBuf {
    media_root.join("cvs").join(format!("user_{}", user_id))
}

/// "Mon CV.PDF" -> cvs/user_3/cv.pdf ; extension absente ou suspecte -> pdf
fn cv_relative_path(user_id: i32, filename: Option<&str>) -> String {
    let extension = filename
        .and_then(|name| Path::new(name).extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_CV_EXTENSION.to_string());

    format!("cvs/user_{}/cv.{}", user_id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_cv_path_convention() {
        assert_eq!(cv_relative_path(3, Some("Mon CV.PDF")), "cvs/user_3/cv.pdf");
        assert_eq!(cv_relative_path(3, Some("resume.docx")), "cvs/user_3/cv.docx");
        assert_eq!(cv_relative_path(3, None), "cvs/user_3/cv.pdf");
        assert_eq!(cv_relative_path(3, Some("noextension")), "cvs/user_3/cv.pdf");
        assert_eq!(cv_relative_path(3, Some("evil.p/../x")), "cvs/user_3/cv.pdf");
    }

    #[tokio::test]
    async fn test_profile_created_once_on_concurrent_access() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;
        let auth = test_support::auth_user(&alice);

        let (first, second) = tokio::join!(
            ProfileService::get_or_create(&db, &auth),
            ProfileService::get_or_create(&db, &auth)
        );

        assert_eq!(first.unwrap().id, second.unwrap().id);
        assert_eq!(candidate_profile::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_patch_changes_only_given_fields() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;
        let auth = test_support::auth_user(&alice);

        let payload = ProfilePayload {
            full_name: "Alice Martin".to_string(),
            skills: "rust, sql".to_string(),
            ..Default::default()
        };
        let created = ProfileService::replace(&db, &auth, payload).await.unwrap();

        let patch = ProfilePatch { phone: Some("0601020304".to_string()), ..Default::default() };
        let updated = ProfileService::update(&db, &auth, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.full_name, "Alice Martin");
        assert_eq!(updated.skills, "rust, sql");
        assert_eq!(updated.phone, "0601020304");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_cv_upload_replaces_previous_file() {
        let db = test_support::setup_db().await;
        let config = test_support::test_config();
        let alice = test_support::insert_user(&db, "alice", false).await;
        let auth = test_support::auth_user(&alice);

        let profile = ProfileService::upload_cv(&db, &config.media_root, &auth, Some("cv.docx"), b"first")
            .await
            .unwrap();
        let first_path = config.media_root.join(profile.cv.as_deref().unwrap());
        assert!(first_path.exists());

        let profile = ProfileService::upload_cv(&db, &config.media_root, &auth, Some("cv.pdf"), b"second")
            .await
            .unwrap();
        assert_eq!(profile.cv.as_deref(), Some(format!("cvs/user_{}/cv.pdf", alice.id).as_str()));
        assert!(!first_path.exists());

        let (filename, content) = ProfileService::read_cv(&db, &config.media_root, &auth).await.unwrap();
        assert_eq!(filename, "cv.pdf");
        assert_eq!(content, b"second");

        ProfileService::remove_user_media(&config.media_root, alice.id).await;
        assert!(!user_cv_dir(&config.media_root, alice.id).exists());
    }

    #[tokio::test]
    async fn test_empty_cv_is_rejected_and_missing_cv_is_not_found() {
        let db = test_support::setup_db().await;
        let config = test_support::test_config();
        let alice = test_support::insert_user(&db, "alice", false).await;
        let auth = test_support::auth_user(&alice);

        let err = ProfileService::upload_cv(&db, &config.media_root, &auth, Some("cv.pdf"), b"")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ProfileService::read_cv(&db, &config.media_root, &auth).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
