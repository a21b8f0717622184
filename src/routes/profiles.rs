use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, patch, put, web, HttpResponse};
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CvUploadQuery, ProfilePatch, ProfilePayload, ProfileResponse};
use crate::services::profile_service::{ProfileService, MAX_CV_BYTES};
use crate::state::AppState;

/// GET /api/profiles/me - mon profil, créé au premier accès
#[get("/me")]
pub async fn get_my_profile(auth_user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let profile = ProfileService::get_or_create(&state.db, &auth_user).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from_model(profile, &state.config.media_url)))
}

#[put("/me")]
pub async fn replace_my_profile(
    auth_user: AuthUser,
    body: web::Json<ProfilePayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let profile = ProfileService::replace(&state.db, &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from_model(profile, &state.config.media_url)))
}

#[patch("/me")]
pub async fn update_my_profile(
    auth_user: AuthUser,
    body: web::Json<ProfilePatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let profile = ProfileService::update(&state.db, &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from_model(profile, &state.config.media_url)))
}

/// PUT /api/profiles/me/cv?filename=cv.pdf - fichier brut dans le body
#[put("/me/cv")]
pub async fn upload_my_cv(
    auth_user: AuthUser,
    query: web::Query<CvUploadQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = ProfileService::upload_cv(
        &state.db,
        &state.config.media_root,
        &auth_user,
        query.filename.as_deref(),
        &body,
    )
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from_model(profile, &state.config.media_url)))
}

#[get("/me/cv")]
pub async fn download_my_cv(auth_user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (filename, content) = ProfileService::read_cv(&state.db, &state.config.media_root, &auth_user).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(content))
}

pub fn profiles_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profiles")
            .app_data(web::PayloadConfig::new(MAX_CV_BYTES))
            .service(get_my_profile)
            .service(replace_my_profile)
            .service(update_my_profile)
            .service(upload_my_cv)
            .service(download_my_cv)
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::routes::configure_routes;
    use crate::test_support;

    #[actix_web::test]
    async fn test_profile_is_scoped_to_requester() {
        let (state, _receiver) = test_support::test_state().await;
        let alice = test_support::insert_user(&state.db, "alice", false).await;
        let bob = test_support::insert_user(&state.db, "bob", false).await;
        let alice_header = test_support::bearer(&alice, &state.config);
        let bob_header = test_support::bearer(&bob, &state.config);
        let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

        let req = test::TestRequest::patch()
            .uri("/api/profiles/me")
            .insert_header(alice_header)
            .set_json(json!({"full_name": "Alice Martin", "skills": "rust"}))
            .to_request();
        let alice_profile: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(alice_profile["full_name"], "Alice Martin");
        assert_eq!(alice_profile["cv"], Value::Null);

        let req = test::TestRequest::get()
            .uri("/api/profiles/me")
            .insert_header(bob_header)
            .to_request();
        let bob_profile: Value = test::call_and_read_body_json(&app, req).await;
        assert_ne!(bob_profile["id"], alice_profile["id"]);
        assert_eq!(bob_profile["full_name"], "");

        let req = test::TestRequest::get().uri("/api/profiles/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn test_cv_upload_and_download() {
        let (state, _receiver) = test_support::test_state().await;
        let alice = test_support::insert_user(&state.db, "alice", false).await;
        let header = test_support::bearer(&alice, &state.config);
        let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

        let req = test::TestRequest::put()
            .uri("/api/profiles/me/cv?filename=Resume.PDF")
            .insert_header(header.clone())
            .set_payload("%PDF-1.4 fake")
            .to_request();
        let profile: Value = test::call_and_read_body_json(&app, req).await;
        let expected = format!("cvs/user_{}/cv.pdf", alice.id);
        assert_eq!(profile["cv"], expected.as_str());
        assert_eq!(profile["cv_url"], format!("/media/{}", expected).as_str());

        let req = test::TestRequest::get()
            .uri("/api/profiles/me/cv")
            .insert_header(header)
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"%PDF-1.4 fake");
    }
}
