use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::AppError;
use crate::models::{company, job_offer};

/// (nom, secteur)
const DEMO_COMPANIES: [(&str, &str); 3] = [
    ("TechCorp France", "Technologie"),
    ("DataFlow SAS", "Data & IA"),
    ("GreenEnergy", "Énergie"),
];

/// (titre, index de l'entreprise, salaire annuel, lieu)
const DEMO_JOBS: [(&str, usize, i64, &str); 9] = [
    ("Développeur Python", 0, 45000, "Paris"),
    ("Ingénieur DevOps", 0, 55000, "Lyon"),
    ("Data Scientist", 1, 50000, "Paris"),
    ("Développeur Full Stack", 0, 48000, "Remote"),
    ("Chef de projet IT", 0, 52000, "Paris"),
    ("Ingénieur Machine Learning", 1, 58000, "Lyon"),
    ("Consultant Data", 1, 47000, "Paris"),
    ("Ingénieur Énergie", 2, 44000, "Nantes"),
    ("Analyste Business Intelligence", 1, 42000, "Remote"),
];

pub struct SeedService;

impl SeedService {
    /// Insère les données de démo si aucune entreprise n'existe.
    /// Retourne le nombre d'offres créées (0 si la base était déjà remplie).
    pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<usize, AppError> {
        if company::Entity::find().count(db).await? > 0 {
            tracing::info!("demo data skipped: companies already exist");
            return Ok(0);
        }

        let txn = db.begin().await?;
        let now = chrono::Utc::now();

        let mut company_ids = Vec::with_capacity(DEMO_COMPANIES.len());
        for (name, sector) in DEMO_COMPANIES {
            let company = company::ActiveModel {
                name: Set(name.to_string()),
                sector: Set(sector.to_string()),
                description: Set(String::new()),
                owner_id: Set(None),
                created_at: Set(now),
                ..Default::default()
            }
                .insert(&txn)
                .await?;
            company_ids.push(company.id);
        }

        for (title, company_index, salary, location) in DEMO_JOBS {
            job_offer::ActiveModel {
                title: Set(title.to_string()),
                company_id: Set(Some(company_ids[company_index])),
                description: Set(format!(
                    "Rejoignez notre équipe pour le poste de {}. Expérience souhaitée, esprit d'équipe.",
                    title
                )),
                salary: Set(Some(Decimal::from(salary))),
                location: Set(location.to_string()),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(companies = DEMO_COMPANIES.len(), jobs = DEMO_JOBS.len(), "demo data inserted");
        Ok(DEMO_JOBS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn test_seed_runs_only_on_empty_database() {
        let db = test_support::setup_db().await;

        assert_eq!(SeedService::seed_demo_data(&db).await.unwrap(), 9);
        assert_eq!(company::Entity::find().count(&db).await.unwrap(), 3);
        assert_eq!(job_offer::Entity::find().count(&db).await.unwrap(), 9);

        assert_eq!(SeedService::seed_demo_data(&db).await.unwrap(), 0);
        assert_eq!(job_offer::Entity::find().count(&db).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_seeded_companies_have_no_owner() {
        let db = test_support::setup_db().await;
        SeedService::seed_demo_data(&db).await.unwrap();

        let owned = company::Entity::find()
            .filter(company::Column::OwnerId.is_not_null())
            .count(&db)
            .await
            .unwrap();
        assert_eq!(owned, 0);
    }
}
