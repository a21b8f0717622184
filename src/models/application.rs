// ============================================================================
// MODÈLE : APPLICATION (candidature)
// ============================================================================
//
// Colonnes de la table applications:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - job_offer_id (INTEGER, NOT NULL, FK vers job_offers, ON DELETE CASCADE)
//   - message (TEXT)
//   - status (VARCHAR(20)) - pending | accepted | rejected, défaut pending
//   - created_at (TIMESTAMP)
//
// Contrainte:
//   - UNIQUE (user_id, job_offer_id) : index unique_application_per_user_job
//     créé par db::create_schema. Un utilisateur postule une seule fois par offre.
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const UNIQUE_USER_JOB_INDEX: &str = "unique_application_per_user_job";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub job_offer_id: i32,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub status: ApplicationStatus,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::job_offer::Entity",
        from = "Column::JobOfferId",
        to = "super::job_offer::Column::Id",
        on_delete = "Cascade"
    )]
    JobOffer,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::job_offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobOffer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
