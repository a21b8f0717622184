// connexion BD + création du schéma

use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::models::{application, candidate_profile, company, job_offer, user_profile, users};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables si elles n'existent pas, dans l'ordre des dépendances.
/// Les clés étrangères (CASCADE / SET NULL) viennent des relations des entités.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, user_profile::Entity).await?;
    create_table(db, candidate_profile::Entity).await?;
    create_table(db, company::Entity).await?;
    create_table(db, job_offer::Entity).await?;
    create_table(db, application::Entity).await?;

    // Un utilisateur ne peut postuler qu'une seule fois par offre
    let unique_application = Index::create()
        .if_not_exists()
        .name(application::UNIQUE_USER_JOB_INDEX)
        .table(application::Entity)
        .col(application::Column::UserId)
        .col(application::Column::JobOfferId)
        .unique()
        .to_owned();

    let backend = db.get_database_backend();
    db.execute(backend.build(&unique_application)).await?;

    tracing::info!("database schema ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let statement = schema
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned();

    db.execute(backend.build(&statement)).await?;
    Ok(())
}
