//pour les requêtes et réponses structurées
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::application::ApplicationStatus;
use crate::models::job_offer::DEFAULT_LOCATION;
use crate::models::user_profile::Role;
use crate::models::{candidate_profile, company, job_offer};

/// Distingue un champ absent (None) d'un champ explicitement à null (Some(None))
/// pour les mises à jour partielles
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Espaces de début et de fin retirés avant validation : "   " devient ""
/// et échoue sur `length(min = 1)`
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

fn trimmed_some<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.map(|v| v.trim().to_string()))
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

// ---------------------------------------------------------------------------
// AUTH
// ---------------------------------------------------------------------------

// Champs optionnels : l'absence est une ValidationError explicite, pas une erreur serde
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

// Réponse pour /auth/me
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_candidate: bool,
    pub is_recruiter: bool,
}

// ---------------------------------------------------------------------------
// COMPANIES
// ---------------------------------------------------------------------------

/// POST / PUT : le champ owner éventuel du payload est ignoré
#[derive(Debug, Deserialize, Validate)]
pub struct CompanyPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 255))]
    pub sector: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompanyPatch {
    #[serde(default, deserialize_with = "trimmed_some")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_some")]
    #[validate(length(max = 255))]
    pub sector: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// JOB OFFERS
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct JobOfferPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub company: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary: Option<Decimal>,
    #[serde(default = "default_location", deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct JobOfferPatch {
    #[serde(default, deserialize_with = "trimmed_some")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub company: Option<Option<i32>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "trimmed_some")]
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
}

/// Offre sérialisée : la référence brute `company` et l'entreprise complète
/// dans `company_detail`
#[derive(Debug, Serialize)]
pub struct JobOfferResponse {
    pub id: i32,
    pub title: String,
    pub company: Option<i32>,
    pub company_detail: Option<company::Model>,
    pub description: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl JobOfferResponse {
    pub fn from_parts(job: job_offer::Model, company: Option<company::Model>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company_id,
            company_detail: company,
            description: job.description,
            salary: job.salary,
            location: job.location,
            created_at: job.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// APPLICATIONS
// ---------------------------------------------------------------------------

/// `user` et `status` ne sont jamais lus depuis le client
#[derive(Debug, Deserialize)]
pub struct ApplicationCreate {
    pub job_offer: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationPatch {
    pub message: Option<String>,
    // Appliqué uniquement pour le staff
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: i32,
    pub user: i32,
    pub user_username: String,
    pub job_offer: i32,
    pub job_offer_title: String,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CANDIDATE PROFILE
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfilePayload {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub full_name: String,
    pub phone: String,
    pub cv: Option<String>,
    pub cv_url: Option<String>,
    pub cover_letter: String,
    pub skills: String,
    pub experience: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn from_model(profile: candidate_profile::Model, media_url: &str) -> Self {
        let cv_url = profile.cv.as_ref().map(|path| format!("{}/{}", media_url, path));
        Self {
            id: profile.id,
            full_name: profile.full_name,
            phone: profile.phone,
            cv: profile.cv,
            cv_url,
            cover_letter: profile.cover_letter,
            skills: profile.skills,
            experience: profile.experience,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CvUploadQuery {
    pub filename: Option<String>,
}
