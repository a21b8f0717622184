use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{JobOfferPatch, JobOfferPayload, JobOfferResponse};
use crate::models::{company, job_offer};
use crate::services::job_filter::{newest_first, JobOfferFilter};
use crate::services::notification_service::{notify_job_created, NotificationQueue};
use crate::services::pagination::{PageRequest, Paginated, PAGE_SIZE};

pub const TRENDING_LIMIT: u64 = 10;

// DECIMAL(10, 2) : 8 chiffres avant la virgule, 2 après
const MAX_SALARY_SCALE: u32 = 2;
const MAX_SALARY_INTEGER_DIGITS: usize = 8;

pub struct JobOfferService;

impl JobOfferService {
    /// Liste filtrée, triée et paginée (lecture publique)
    pub async fn list(
        db: &DatabaseConnection,
        filter: &JobOfferFilter,
        page: &PageRequest,
    ) -> Result<Paginated<JobOfferResponse>, AppError> {
        let query = filter.apply(job_offer::Entity::find().find_also_related(company::Entity));

        let paginator = query.paginate(db, PAGE_SIZE);
        let count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page_index(count)?).await?;

        let results = rows
            .into_iter()
            .map(|(job, company)| JobOfferResponse::from_parts(job, company))
            .collect();

        Ok(page.build(results, count))
    }

    /// Les 10 offres les plus récentes, sans filtre
    pub async fn trending(db: &DatabaseConnection) -> Result<Vec<JobOfferResponse>, AppError> {
        let rows = newest_first(job_offer::Entity::find().find_also_related(company::Entity))
            .limit(TRENDING_LIMIT)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(job, company)| JobOfferResponse::from_parts(job, company))
            .collect())
    }

    pub async fn get(db: &DatabaseConnection, job_id: i32) -> Result<JobOfferResponse, AppError> {
        let (job, company) = job_offer::Entity::find_by_id(job_id)
            .find_also_related(company::Entity)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Job offer"))?;

        Ok(JobOfferResponse::from_parts(job, company))
    }

    /// Crée l'offre puis met la notification en file (jamais bloquant)
    pub async fn create(
        db: &DatabaseConnection,
        notifications: &NotificationQueue,
        auth_user: &AuthUser,
        payload: JobOfferPayload,
    ) -> Result<JobOfferResponse, AppError> {
        let company = Self::resolve_company(db, payload.company).await?;
        if let Some(salary) = payload.salary {
            validate_salary(salary)?;
        }

        let job = job_offer::ActiveModel {
            title: Set(payload.title.trim().to_string()),
            company_id: Set(company.as_ref().map(|c| c.id)),
            description: Set(payload.description),
            salary: Set(payload.salary),
            location: Set(payload.location.trim().to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
            .insert(db)
            .await?;

        tracing::info!(job_id = job.id, created_by = auth_user.user_id, "job offer created");

        notify_job_created(
            notifications,
            job.id,
            &job.title,
            company.as_ref().map(|c| c.name.as_str()),
        );

        Ok(JobOfferResponse::from_parts(job, company))
    }

    /// PUT : les champs optionnels omis reprennent leur valeur par défaut
    pub async fn replace(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        job_id: i32,
        payload: JobOfferPayload,
    ) -> Result<JobOfferResponse, AppError> {
        let patch = JobOfferPatch {
            title: Some(payload.title),
            company: Some(payload.company),
            description: Some(payload.description),
            salary: Some(payload.salary),
            location: Some(payload.location),
        };
        Self::update(db, auth_user, job_id, patch).await
    }

    /// PATCH : seuls les champs fournis changent, `null` vide les champs nullables.
    /// Pas de notification sur mise à jour.
    pub async fn update(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        job_id: i32,
        patch: JobOfferPatch,
    ) -> Result<JobOfferResponse, AppError> {
        let job = job_offer::Entity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Job offer"))?;

        let company = match patch.company {
            Some(company_id) => Self::resolve_company(db, company_id).await?,
            None => match job.company_id {
                Some(id) => company::Entity::find_by_id(id).one(db).await?,
                None => None,
            },
        };

        let mut active_model: job_offer::ActiveModel = job.into();
        if let Some(title) = patch.title {
            active_model.title = Set(title.trim().to_string());
        }
        if patch.company.is_some() {
            active_model.company_id = Set(company.as_ref().map(|c| c.id));
        }
        if let Some(description) = patch.description {
            active_model.description = Set(description);
        }
        if let Some(salary) = patch.salary {
            if let Some(value) = salary {
                validate_salary(value)?;
            }
            active_model.salary = Set(salary);
        }
        if let Some(location) = patch.location {
            active_model.location = Set(location.trim().to_string());
        }

        let job = active_model.update(db).await?;
        tracing::info!(job_id = job.id, updated_by = auth_user.user_id, "job offer updated");

        Ok(JobOfferResponse::from_parts(job, company))
    }

    /// Supprime l'offre ; ses candidatures suivent (CASCADE)
    pub async fn delete(db: &DatabaseConnection, auth_user: &AuthUser, job_id: i32) -> Result<(), AppError> {
        let result = job_offer::Entity::delete_by_id(job_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Job offer"));
        }

        tracing::info!(job_id, deleted_by = auth_user.user_id, "job offer deleted");
        Ok(())
    }

    /// Une référence vers une entreprise inconnue est une erreur de validation
    async fn resolve_company(
        db: &DatabaseConnection,
        company_id: Option<i32>,
    ) -> Result<Option<company::Model>, AppError> {
        let Some(company_id) = company_id else {
            return Ok(None);
        };

        company::Entity::find_by_id(company_id)
            .one(db)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Company {} does not exist", company_id)))
    }
}

fn validate_salary(salary: Decimal) -> Result<(), AppError> {
    let normalized = salary.normalize();
    let integer_digits = normalized.trunc().abs().to_string().trim_start_matches('0').len();

    if normalized.scale() > MAX_SALARY_SCALE || integer_digits > MAX_SALARY_INTEGER_DIGITS {
        return Err(AppError::Validation(
            "salary must have at most 8 digits before and 2 after the decimal point".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_offer::DEFAULT_LOCATION;
    use crate::services::job_filter::JobOfferQuery;
    use crate::test_support;

    fn filter(pairs: &[(&str, &str)]) -> JobOfferFilter {
        let mut query = JobOfferQuery::default();
        for (key, value) in pairs {
            let value = Some((*value).to_owned());
            match *key {
                "location" => query.location = value,
                "company" => query.company = value,
                "salary_min" => query.salary_min = value,
                "salary_max" => query.salary_max = value,
                "search" => query.search = value,
                "ordering" => query.ordering = value,
                _ => {}
            }
        }
        JobOfferFilter::from(query)
    }

    fn first_page() -> PageRequest {
        PageRequest::from_request("/api/jobs", "")
    }

    async fn seed(db: &DatabaseConnection) {
        let techcorp = test_support::insert_company(db, "TechCorp France", None).await;
        let dataflow = test_support::insert_company(db, "DataFlow SAS", None).await;
        test_support::insert_job(db, "Développeur Python", Some(techcorp.id), Some(45000), "Paris").await;
        test_support::insert_job(db, "Ingénieur DevOps", Some(techcorp.id), Some(55000), "Lyon").await;
        test_support::insert_job(db, "Data Scientist", Some(dataflow.id), Some(50000), "Paris").await;
        test_support::insert_job(db, "Consultant Data", Some(dataflow.id), Some(38000), "paris 15e").await;
        test_support::insert_job(db, "Stage", None, None, "Remote").await;
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let db = test_support::setup_db().await;
        seed(&db).await;

        let page = JobOfferService::list(&db, &filter(&[("location", "Paris"), ("salary_min", "40000")]), &first_page())
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        for job in &page.results {
            assert!(job.location.to_lowercase().contains("paris"));
            assert!(job.salary.unwrap() >= Decimal::from(40000));
        }
    }

    #[tokio::test]
    async fn test_company_and_salary_range() {
        let db = test_support::setup_db().await;
        seed(&db).await;

        let page = JobOfferService::list(
            &db,
            &filter(&[("company", "techcorp"), ("salary_max", "50000")]),
            &first_page(),
        )
            .await
            .unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].title, "Développeur Python");
        assert_eq!(page.results[0].company_detail.as_ref().unwrap().name, "TechCorp France");
    }

    #[tokio::test]
    async fn test_search_matches_title_description_or_company() {
        let db = test_support::setup_db().await;
        seed(&db).await;

        // "data" : 2 titres + l'entreprise DataFlow
        let page = JobOfferService::list(&db, &filter(&[("search", "DATA")]), &first_page())
            .await
            .unwrap();
        assert_eq!(page.count, 2);

        let page = JobOfferService::list(&db, &filter(&[("search", "100%")]), &first_page())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn test_ordering_and_default_newest_first() {
        let db = test_support::setup_db().await;
        seed(&db).await;

        let page = JobOfferService::list(&db, &JobOfferFilter::default(), &first_page())
            .await
            .unwrap();
        assert_eq!(page.results[0].title, "Stage");
        assert_eq!(page.results[4].title, "Développeur Python");

        let page = JobOfferService::list(
            &db,
            &filter(&[("ordering", "-salary"), ("salary_min", "1")]),
            &first_page(),
        )
            .await
            .unwrap();
        let titles: Vec<&str> = page.results.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Ingénieur DevOps", "Data Scientist", "Développeur Python", "Consultant Data"]);
    }

    #[tokio::test]
    async fn test_pagination_fixed_page_size() {
        let db = test_support::setup_db().await;
        for i in 0..23 {
            test_support::insert_job(&db, &format!("Job {}", i), None, None, "Paris").await;
        }

        let page3 = PageRequest::from_request("/api/jobs", "page=3");
        let page = JobOfferService::list(&db, &JobOfferFilter::default(), &page3).await.unwrap();
        assert_eq!(page.count, 23);
        assert_eq!(page.results.len(), 3);
        assert!(page.next.is_none());

        let page4 = PageRequest::from_request("/api/jobs", "page=4");
        let err = JobOfferService::list(&db, &JobOfferFilter::default(), &page4).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_trending_returns_ten_newest() {
        let db = test_support::setup_db().await;
        for i in 0..12 {
            test_support::insert_job(&db, &format!("Job {}", i), None, None, "Paris").await;
        }

        let trending = JobOfferService::trending(&db).await.unwrap();

        assert_eq!(trending.len(), 10);
        assert_eq!(trending[0].title, "Job 11");
        assert_eq!(trending[9].title, "Job 2");
    }

    #[tokio::test]
    async fn test_create_enqueues_notification_but_update_does_not() {
        let db = test_support::setup_db().await;
        let (queue, mut receiver) = NotificationQueue::new();
        let alice = test_support::insert_user(&db, "alice", false).await;
        let auth = test_support::auth_user(&alice);
        let acme = test_support::insert_company(&db, "Acme", Some(alice.id)).await;

        let payload = JobOfferPayload {
            title: "Engineer".to_string(),
            company: Some(acme.id),
            description: String::new(),
            salary: Some(Decimal::from(52000)),
            location: DEFAULT_LOCATION.to_string(),
        };
        let job = JobOfferService::create(&db, &queue, &auth, payload).await.unwrap();

        let notification = receiver.try_recv().unwrap();
        assert_eq!(notification.job_id, job.id);
        assert_eq!(notification.company, "Acme");

        let patch = JobOfferPatch { title: Some("Senior Engineer".to_string()), ..Default::default() };
        let updated = JobOfferService::update(&db, &auth, job.id, patch).await.unwrap();
        assert_eq!(updated.title, "Senior Engineer");
        assert_eq!(updated.company_detail.unwrap().name, "Acme");
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_with_unknown_company_is_rejected() {
        let db = test_support::setup_db().await;
        let (queue, mut receiver) = NotificationQueue::new();
        let alice = test_support::insert_user(&db, "alice", false).await;

        let payload = JobOfferPayload {
            title: "Engineer".to_string(),
            company: Some(999),
            description: String::new(),
            salary: None,
            location: "Paris".to_string(),
        };
        let err = JobOfferService::create(&db, &queue, &test_support::auth_user(&alice), payload)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_patch_null_clears_salary_and_company() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;
        let acme = test_support::insert_company(&db, "Acme", None).await;
        let job = test_support::insert_job(&db, "Engineer", Some(acme.id), Some(50000), "Paris").await;

        let patch: JobOfferPatch = serde_json::from_str(r#"{"salary": null, "company": null}"#).unwrap();
        let updated = JobOfferService::update(&db, &test_support::auth_user(&alice), job.id, patch)
            .await
            .unwrap();

        assert_eq!(updated.salary, None);
        assert_eq!(updated.company, None);
        assert!(updated.company_detail.is_none());
        assert_eq!(updated.location, "Paris");
    }

    #[test]
    fn test_salary_precision() {
        assert!(validate_salary(Decimal::new(4500000, 2)).is_ok());
        assert!(validate_salary(Decimal::new(99_999_999, 0)).is_ok());
        assert!(validate_salary(Decimal::new(100_000_000, 0)).is_err());
        assert!(validate_salary(Decimal::new(1234, 3)).is_err());
        assert!(validate_salary(Decimal::new(1230, 3)).is_ok());
    }
}
