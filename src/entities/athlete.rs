//! Athlete entity - identity and contact record for each coached individual.
//!
//! Each athlete is linked one-to-one to a `user_account`. Deleting an athlete
//! removes its subscriptions and workouts through cascading foreign keys.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Athlete database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "athletes")]
pub struct Model {
    /// Unique identifier for the athlete
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Linked authentication account
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Contact email, mirrored onto the linked account on every save
    #[sea_orm(unique)]
    pub email: String,
    /// Phone number, `+CC` prefix optional
    pub contact_number: String,
    /// Billing address printed on invoices
    pub address: String,
    /// Bio, background, etc.
    pub profile: String,
    /// Athlete's goals
    pub goals: String,
    /// Initial fitness assessment
    pub fitness_evaluation: String,
    /// When the athlete was created
    pub created_at: DateTime,
    /// When the athlete was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Athlete and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each athlete belongs to one user account
    #[sea_orm(
        belongs_to = "super::user_account::Entity",
        from = "Column::UserId",
        to = "super::user_account::Column::Id",
        on_delete = "Cascade"
    )]
    UserAccount,
    /// One athlete has many subscriptions
    #[sea_orm(has_many = "super::athlete_subscription::Entity")]
    Subscriptions,
    /// One athlete has many assigned workouts
    #[sea_orm(has_many = "super::workout::Entity")]
    Workouts,
}

impl Related<super::user_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAccount.def()
    }
}

impl Related<super::athlete_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl Related<super::workout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
