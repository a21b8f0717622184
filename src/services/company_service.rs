use sea_orm::*;
use sea_orm::sea_query::Order;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::company;
use crate::models::dto::{CompanyPatch, CompanyPayload};
use crate::services::job_filter::icontains;
use crate::services::pagination::{PageRequest, Paginated, PAGE_SIZE};
use crate::services::user_service::UserService;

/// ?search= et ?ordering= pour /api/companies
#[derive(Debug, Default, serde::Deserialize)]
pub struct CompanyQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

pub struct CompanyService;

impl CompanyService {
    /// Liste publique, triée par nom par défaut
    pub async fn list(
        db: &DatabaseConnection,
        query: &CompanyQuery,
        page: &PageRequest,
    ) -> Result<Paginated<company::Model>, AppError> {
        let mut select = company::Entity::find();

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(icontains(company::Column::Name, term))
                    .add(icontains(company::Column::Sector, term))
                    .add(icontains(company::Column::Description, term)),
            );
        }

        let (column, order) = match query.ordering.as_deref().map(str::trim) {
            Some("created_at") => (company::Column::CreatedAt, Order::Asc),
            Some("-created_at") => (company::Column::CreatedAt, Order::Desc),
            Some("-name") => (company::Column::Name, Order::Desc),
            _ => (company::Column::Name, Order::Asc),
        };
        select = select
            .order_by(column, order.clone())
            .order_by(company::Column::Id, order);

        let paginator = select.paginate(db, PAGE_SIZE);
        let count = paginator.num_items().await?;
        let companies = paginator.fetch_page(page.page_index(count)?).await?;

        Ok(page.build(companies, count))
    }

    pub async fn get(db: &DatabaseConnection, company_id: i32) -> Result<company::Model, AppError> {
        company::Entity::find_by_id(company_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Company"))
    }

    /// Le créateur devient automatiquement propriétaire
    pub async fn create(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        payload: CompanyPayload,
    ) -> Result<company::Model, AppError> {
        let owner = UserService::find_user(db, auth_user).await?;

        let company = company::ActiveModel {
            name: Set(payload.name.trim().to_string()),
            sector: Set(payload.sector.trim().to_string()),
            description: Set(payload.description),
            owner_id: Set(Some(owner.id)),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
            .insert(db)
            .await?;

        tracing::info!(company_id = company.id, owner_id = owner.id, "company created");
        Ok(company)
    }

    /// PUT : remplace tous les champs modifiables
    pub async fn replace(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        company_id: i32,
        payload: CompanyPayload,
    ) -> Result<company::Model, AppError> {
        Self::update(
            db,
            auth_user,
            company_id,
            CompanyPatch {
                name: Some(payload.name),
                sector: Some(payload.sector),
                description: Some(payload.description),
            },
        )
            .await
    }

    /// PATCH : seuls les champs fournis changent ; owner n'est jamais modifiable
    pub async fn update(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        company_id: i32,
        patch: CompanyPatch,
    ) -> Result<company::Model, AppError> {
        let company = Self::get_for_write(db, auth_user, company_id).await?;

        let mut active_model: company::ActiveModel = company.into();
        if let Some(name) = patch.name {
            active_model.name = Set(name.trim().to_string());
        }
        if let Some(sector) = patch.sector {
            active_model.sector = Set(sector.trim().to_string());
        }
        if let Some(description) = patch.description {
            active_model.description = Set(description);
        }

        Ok(active_model.update(db).await?)
    }

    /// Supprime l'entreprise ; ses offres et leurs candidatures suivent (CASCADE)
    pub async fn delete(db: &DatabaseConnection, auth_user: &AuthUser, company_id: i32) -> Result<(), AppError> {
        let company = Self::get_for_write(db, auth_user, company_id).await?;
        company::Entity::delete_by_id(company.id).exec(db).await?;

        tracing::info!(company_id, user_id = auth_user.user_id, "company deleted");
        Ok(())
    }

    /// Propriétaire ou staff ; une entreprise sans propriétaire (démo / admin)
    /// reste modifiable par tout utilisateur authentifié
    async fn get_for_write(
        db: &DatabaseConnection,
        auth_user: &AuthUser,
        company_id: i32,
    ) -> Result<company::Model, AppError> {
        let company = Self::get(db, company_id).await?;
        let user = UserService::find_user(db, auth_user).await?;

        match company.owner_id {
            None => Ok(company),
            Some(owner_id) if owner_id == user.id || user.is_staff => Ok(company),
            Some(_) => Err(AppError::Authorization(
                "Only the owner of this company can modify it".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{application, job_offer};
    use crate::test_support;

    fn payload(name: &str) -> CompanyPayload {
        CompanyPayload {
            name: name.to_string(),
            sector: "Technologie".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_records_owner() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;

        let company = CompanyService::create(&db, &test_support::auth_user(&alice), payload("Acme"))
            .await
            .unwrap();

        assert_eq!(company.owner_id, Some(alice.id));
        assert_eq!(company.name, "Acme");
    }

    #[tokio::test]
    async fn test_only_owner_or_staff_can_modify() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;
        let bob = test_support::insert_user(&db, "bob", false).await;
        let admin = test_support::insert_user(&db, "admin", true).await;
        let acme = test_support::insert_company(&db, "Acme", Some(alice.id)).await;

        let err = CompanyService::update(
            &db,
            &test_support::auth_user(&bob),
            acme.id,
            CompanyPatch { name: Some("Hijacked".to_string()), ..Default::default() },
        )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        let updated = CompanyService::update(
            &db,
            &test_support::auth_user(&admin),
            acme.id,
            CompanyPatch { sector: Some("Industrie".to_string()), ..Default::default() },
        )
            .await
            .unwrap();
        assert_eq!(updated.sector, "Industrie");
        assert_eq!(updated.name, "Acme");
        assert_eq!(updated.owner_id, Some(alice.id));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_offers_and_applications() {
        let db = test_support::setup_db().await;
        let alice = test_support::insert_user(&db, "alice", false).await;
        let bob = test_support::insert_user(&db, "bob", false).await;
        let acme = test_support::insert_company(&db, "Acme", Some(alice.id)).await;
        let other = test_support::insert_company(&db, "Other", None).await;
        let job = test_support::insert_job(&db, "Engineer", Some(acme.id), None, "Paris").await;
        let kept = test_support::insert_job(&db, "Designer", Some(other.id), None, "Lyon").await;
        test_support::insert_application(&db, bob.id, job.id).await;
        test_support::insert_application(&db, bob.id, kept.id).await;

        CompanyService::delete(&db, &test_support::auth_user(&alice), acme.id)
            .await
            .unwrap();

        assert!(job_offer::Entity::find_by_id(job.id).one(&db).await.unwrap().is_none());
        assert_eq!(job_offer::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(application::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_search_and_default_ordering() {
        let db = test_support::setup_db().await;
        test_support::insert_company(&db, "Zeta", None).await;
        test_support::insert_company(&db, "Alpha", None).await;
        test_support::insert_company(&db, "GreenEnergy", None).await;

        let page = PageRequest::from_request("/api/companies", "");
        let all = CompanyService::list(&db, &CompanyQuery::default(), &page).await.unwrap();
        let names: Vec<&str> = all.results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "GreenEnergy", "Zeta"]);

        let query = CompanyQuery { search: Some("energy".to_string()), ordering: None };
        let found = CompanyService::list(&db, &query, &page).await.unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.results[0].name, "GreenEnergy");
    }
}
