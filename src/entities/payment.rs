//! Payment entity - an amount owed by a subscription for a billing window.
//!
//! Payments move from `PENDING` to `PAID`, `FAILED` or `REFUNDED`. Being
//! overdue is derived on read: still pending with the due date in the past.

use crate::core::money::Money;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Owed, not yet collected
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Collected
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Collection attempt failed
    #[sea_orm(string_value = "FAILED")]
    Failed,
    /// Returned to the athlete
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

impl PaymentStatus {
    /// Whether a payment may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Failed | Self::Refunded) | (Self::Paid, Self::Refunded)
        )
    }
}

/// How the payment was made
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Unified Payments Interface
    #[sea_orm(string_value = "UPI")]
    Upi,
    /// Direct bank transfer
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// Cash
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Cheque
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    /// Anything else
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Subscription this payment is owed against
    pub subscription_id: i64,
    /// Amount owed
    pub amount: Money,
    /// Date the money arrived
    pub payment_date: Option<Date>,
    /// Date the money is due
    pub due_date: Date,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// How the payment was made, once known
    pub payment_method: Option<PaymentMethod>,
    /// UPI transaction ID or other reference
    pub transaction_id: String,
    /// Human label for the covered window, e.g. "February 2026" or "Jan-Mar 2026"
    pub months_covered: String,
    /// Free-form notes
    pub notes: String,
    /// When the payment was created
    pub created_at: DateTime,
    /// When the payment was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Pending with a due date strictly before `today`.
    #[must_use]
    pub fn is_overdue_on(&self, today: Date) -> bool {
        self.status == PaymentStatus::Pending && self.due_date < today
    }

    /// [`Model::is_overdue_on`] evaluated against today's UTC date.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one subscription
    #[sea_orm(
        belongs_to = "super::athlete_subscription::Entity",
        from = "Column::SubscriptionId",
        to = "super::athlete_subscription::Column::Id",
        on_delete = "Cascade"
    )]
    Subscription,
    /// A payment has at most one invoice
    #[sea_orm(has_one = "super::invoice::Entity")]
    Invoice,
}

impl Related<super::athlete_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
