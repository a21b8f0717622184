// ============================================================================
// MODÈLE : CANDIDATE PROFILE
// ============================================================================
//
// Colonnes de la table candidate_profiles:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, UNIQUE, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - full_name, phone (VARCHAR)
//   - cv (VARCHAR, NULL) - chemin relatif à MEDIA_ROOT : cvs/user_<id>/cv.<ext>
//   - cover_letter, skills, experience (TEXT)
//   - created_at, updated_at (TIMESTAMP)
//
// Points d'attention:
//   - Un seul profil par utilisateur, accessible uniquement via /profiles/me
//   - skills : compétences séparées par des virgules
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidate_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub full_name: String,
    pub phone: String,
    pub cv: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub cover_letter: String,
    #[sea_orm(column_type = "Text")]
    pub skills: String,
    #[sea_orm(column_type = "Text")]
    pub experience: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
