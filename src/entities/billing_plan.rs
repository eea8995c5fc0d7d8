//! Billing plan entity - the catalog of offerable plan/price tiers.
//!
//! A plan is keyed by the (plan type, service level, billing period) triple,
//! which is unique across the table. The HSN/SAC tax code is derived from the
//! triple in the save hook, so it is stable across saves and cannot be set
//! directly.

use super::active_value;
use crate::core::{money::Money, pricing::derive_hsn_sac};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Sport the plan covers
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    /// Running coaching
    #[sea_orm(string_value = "RUNNING")]
    Running,
    /// Triathlon coaching
    #[sea_orm(string_value = "TRIATHLON")]
    Triathlon,
}

/// How hands-on the coaching is
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceLevel {
    /// Focus tier
    #[sea_orm(string_value = "FOCUS")]
    Focus,
    /// Personal tier
    #[sea_orm(string_value = "PERSONAL")]
    Personal,
}

/// How often the plan is billed
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPeriod {
    /// Billed every month
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    /// Billed every three months
    #[sea_orm(string_value = "QUARTERLY")]
    Quarterly,
}

impl BillingPeriod {
    /// Number of months one billing period spans.
    #[must_use]
    pub const fn months(self) -> i64 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
        }
    }
}

/// Billing plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_plans")]
pub struct Model {
    /// Unique identifier for the plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Running Focus - Monthly")
    pub name: String,
    /// Sport
    pub plan_type: PlanType,
    /// Coaching tier
    pub service_level: ServiceLevel,
    /// Billing cadence
    pub billing_period: BillingPeriod,
    /// Derived tax classification code, e.g. `RUNFOCUS1MO`
    pub hsn_sac: String,
    /// Catalog price for one billing period
    pub base_price: Money,
    /// Plan details and features
    pub description: String,
    /// Whether the plan is available for new subscriptions
    pub is_active: bool,
    /// When the plan was created
    pub created_at: DateTime,
    /// When the plan was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `BillingPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One plan has many subscriptions
    #[sea_orm(has_many = "super::athlete_subscription::Entity")]
    Subscriptions,
}

impl Related<super::athlete_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(plan_type), Some(service_level), Some(billing_period)) = (
            active_value(&self.plan_type).copied(),
            active_value(&self.service_level).copied(),
            active_value(&self.billing_period).copied(),
        ) {
            self.hsn_sac = Set(derive_hsn_sac(plan_type, service_level, billing_period));
        }
        Ok(self)
    }
}
