//! Athlete subscription entity - an athlete bound to a billing plan.
//!
//! Carries an optional percentage and flat discount. The final price is
//! computed from the plan's base price in the save hook and stored, so later
//! catalog price changes do not rewrite historical subscriptions until they are
//! saved again.

use super::active_value;
use crate::core::{
    money::{Money, Percent},
    pricing::final_price,
};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Lifecycle of a subscription
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Being billed
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Temporarily on hold
    #[sea_orm(string_value = "PAUSED")]
    Paused,
    /// Ended
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Subscription database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "athlete_subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Subscribed athlete
    pub athlete_id: i64,
    /// Plan the athlete is on
    pub billing_plan_id: i64,
    /// Percentage discount (0-100%)
    pub custom_discount_percent: Percent,
    /// Flat discount amount
    pub custom_discount_amount: Money,
    /// Derived: base price minus discounts, never below zero
    pub final_price: Money,
    /// First day of the subscription
    pub start_date: Date,
    /// Last day, `None` for ongoing subscriptions
    pub end_date: Option<Date>,
    /// Current status
    pub status: SubscriptionStatus,
    /// Free-form notes
    pub notes: String,
    /// When the subscription was created
    pub created_at: DateTime,
    /// When the subscription was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `AthleteSubscription` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription belongs to one athlete; removed with the athlete
    #[sea_orm(
        belongs_to = "super::athlete::Entity",
        from = "Column::AthleteId",
        to = "super::athlete::Column::Id",
        on_delete = "Cascade"
    )]
    Athlete,
    /// Each subscription belongs to one plan; a plan in use cannot be deleted
    #[sea_orm(
        belongs_to = "super::billing_plan::Entity",
        from = "Column::BillingPlanId",
        to = "super::billing_plan::Column::Id",
        on_delete = "Restrict"
    )]
    BillingPlan,
    /// One subscription has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::athlete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl Related<super::billing_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingPlan.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(plan_id) = active_value(&self.billing_plan_id).copied() else {
            return Ok(self);
        };

        let plan = super::billing_plan::Entity::find_by_id(plan_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("billing plan {plan_id}")))?;

        let percent = active_value(&self.custom_discount_percent)
            .copied()
            .unwrap_or(Percent::ZERO);
        let flat = active_value(&self.custom_discount_amount)
            .copied()
            .unwrap_or(Money::ZERO);

        self.final_price = Set(final_price(plan.base_price, percent, flat));
        Ok(self)
    }
}
