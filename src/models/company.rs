use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub sector: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    // NULL pour les données de démo / admin, ou si le recruteur a supprimé son compte
    #[serde(rename = "owner")]
    pub owner_id: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Owner,

    #[sea_orm(has_many = "super::job_offer::Entity")]
    JobOffer,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::job_offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobOffer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
