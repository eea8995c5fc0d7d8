//! User account entity - the authentication identity behind an athlete.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Login identity. The athlete profile mirrors its email.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Account email, kept equal to the athlete's email
    pub email: String,
    /// When the account was created
    pub created_at: DateTime,
}

/// Defines relationships between `UserAccount` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has at most one athlete profile
    #[sea_orm(has_one = "super::athlete::Entity")]
    Athlete,
}

impl Related<super::athlete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
