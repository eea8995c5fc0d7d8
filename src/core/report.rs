//! Back-office summary reporting.
//!
//! Collects the headline numbers a coach checks each morning: how many athletes
//! and active subscriptions there are, what they bring in per month, and what is
//! pending or overdue.

use crate::{
    core::money::Money,
    entities::{
        Athlete, AthleteSubscription, BillingPlan, Payment, PaymentStatus, SubscriptionStatus,
        Workout, WorkoutStatus, athlete_subscription, payment, workout,
    },
    errors::Result,
};
use sea_orm::{DatabaseConnection, prelude::*};
use std::fmt;

/// Headline figures as of a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackOfficeSummary {
    /// Day the overdue checks were evaluated against
    pub as_of: Date,
    /// Number of athletes on file
    pub athlete_count: u64,
    /// Subscriptions with status `ACTIVE`
    pub active_subscriptions: u64,
    /// Active subscription prices normalised to one month
    pub monthly_recurring_revenue: Money,
    /// Payments still pending
    pub pending_payments: u64,
    /// Pending payments past their due date
    pub overdue_payments: u64,
    /// Sum of all pending payment amounts
    pub outstanding_amount: Money,
    /// Upcoming workouts dated before `as_of`
    pub overdue_workouts: u64,
}

impl fmt::Display for BackOfficeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} athletes, {} active subscriptions ({}/month), {} pending payments ({} overdue, {} outstanding), {} overdue workouts",
            self.as_of,
            self.athlete_count,
            self.active_subscriptions,
            self.monthly_recurring_revenue,
            self.pending_payments,
            self.overdue_payments,
            self.outstanding_amount,
            self.overdue_workouts,
        )
    }
}

/// Builds the summary, evaluating every overdue rule against `today`.
///
/// Quarterly subscriptions contribute a third of their price to the monthly
/// revenue figure.
pub async fn generate_summary(db: &DatabaseConnection, today: Date) -> Result<BackOfficeSummary> {
    let athlete_count = Athlete::find().count(db).await?;

    let active = AthleteSubscription::find()
        .filter(athlete_subscription::Column::Status.eq(SubscriptionStatus::Active))
        .find_also_related(BillingPlan)
        .all(db)
        .await?;
    let monthly_recurring_revenue = active
        .iter()
        .filter_map(|(subscription, plan)| {
            plan.as_ref()
                .map(|plan| subscription.final_price.divide_by(plan.billing_period.months()))
        })
        .sum();

    let pending = Payment::find()
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .all(db)
        .await?;
    let outstanding_amount = pending.iter().map(|payment| payment.amount).sum();
    let overdue_payments = pending
        .iter()
        .filter(|payment| payment.is_overdue_on(today))
        .count();

    let overdue_workouts = Workout::find()
        .filter(workout::Column::Status.eq(WorkoutStatus::Upcoming))
        .filter(workout::Column::Date.lt(today))
        .count(db)
        .await?;

    Ok(BackOfficeSummary {
        as_of: today,
        athlete_count,
        active_subscriptions: active.len() as u64,
        monthly_recurring_revenue,
        pending_payments: pending.len() as u64,
        overdue_payments: overdue_payments as u64,
        outstanding_amount,
        overdue_workouts,
    })
}
