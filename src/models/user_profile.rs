// ============================================================================
// MODÈLE : USER PROFILE (rôle)
// ============================================================================
//
// Colonnes de la table user_profiles:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, UNIQUE, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - role (VARCHAR(20), NOT NULL) - candidate | recruiter | both
//
// Points d'attention:
//   - Créé à l'inscription, ou paresseusement au premier accès (rôle candidate)
//   - L'unicité de user_id garantit un seul profil même en cas de requêtes
//     concurrentes (voir UserService::get_or_create_role)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "candidate")]
    Candidate,
    #[sea_orm(string_value = "recruiter")]
    Recruiter,
    #[sea_orm(string_value = "both")]
    Both,
}

impl Role {
    /// Un rôle absent ou inconnu retombe sur `candidate`
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("recruiter") => Role::Recruiter,
            Some("both") => Role::Both,
            _ => Role::Candidate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
            Role::Both => "both",
        }
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self, Role::Candidate | Role::Both)
    }

    pub fn is_recruiter(&self) -> bool {
        matches!(self, Role::Recruiter | Role::Both)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub role: Role,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_defaults_to_candidate() {
        assert_eq!(Role::parse_or_default(None), Role::Candidate);
        assert_eq!(Role::parse_or_default(Some("admin")), Role::Candidate);
        assert_eq!(Role::parse_or_default(Some("")), Role::Candidate);
        assert_eq!(Role::parse_or_default(Some("recruiter")), Role::Recruiter);
        assert_eq!(Role::parse_or_default(Some("both")), Role::Both);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Candidate.is_candidate());
        assert!(!Role::Candidate.is_recruiter());
        assert!(Role::Recruiter.is_recruiter());
        assert!(!Role::Recruiter.is_candidate());
        assert!(Role::Both.is_candidate() && Role::Both.is_recruiter());
    }
}
