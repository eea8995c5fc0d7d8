//! Subscription business logic - binding athletes to billing plans.
//!
//! `final_price` is never written here; the entity save hook recomputes it from
//! the plan's current base price every time a subscription is saved.

use crate::{
    core::{
        money::{Money, Percent},
        validation,
    },
    entities::{
        Athlete, AthleteSubscription, BillingPlan, SubscriptionStatus, athlete_subscription,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Editable subscription fields, used for both create and update.
#[derive(Clone, Debug)]
pub struct SubscriptionDetails {
    /// Plan the athlete is on
    pub billing_plan_id: i64,
    /// Percentage discount (0-100%)
    pub custom_discount_percent: Percent,
    /// Flat discount amount
    pub custom_discount_amount: Money,
    /// First day of the subscription
    pub start_date: Date,
    /// Last day, `None` for ongoing
    pub end_date: Option<Date>,
    /// Free-form notes
    pub notes: String,
}

impl SubscriptionDetails {
    fn validate(&self) -> Result<()> {
        validation::percent_range(
            "custom_discount_percent",
            self.custom_discount_percent,
            Percent::ZERO,
            Percent::FULL,
        )?;
        validation::min_amount("custom_discount_amount", self.custom_discount_amount, Money::ZERO)
    }
}

/// Fails unless the plan exists and is open for new subscriptions.
async fn ensure_plan_active(db: &DatabaseConnection, plan_id: i64) -> Result<()> {
    let plan = BillingPlan::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("billing plan", plan_id))?;
    if !plan.is_active {
        return Err(Error::validation(
            "billing_plan_id",
            format!("Billing plan '{}' is not active", plan.name),
        ));
    }
    Ok(())
}

/// Subscribes an athlete to an active plan. The subscription starts `ACTIVE`.
#[instrument(skip(db, details), fields(plan_id = details.billing_plan_id))]
pub async fn create_subscription(
    db: &DatabaseConnection,
    athlete_id: i64,
    details: SubscriptionDetails,
) -> Result<athlete_subscription::Model> {
    details.validate()?;

    Athlete::find_by_id(athlete_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("athlete", athlete_id))?;
    ensure_plan_active(db, details.billing_plan_id).await?;

    let now = chrono::Utc::now().naive_utc();
    let subscription = athlete_subscription::ActiveModel {
        athlete_id: Set(athlete_id),
        billing_plan_id: Set(details.billing_plan_id),
        custom_discount_percent: Set(details.custom_discount_percent),
        custom_discount_amount: Set(details.custom_discount_amount),
        start_date: Set(details.start_date),
        end_date: Set(details.end_date),
        status: Set(SubscriptionStatus::Active),
        notes: Set(details.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        subscription_id = subscription.id,
        final_price = %subscription.final_price,
        "Created subscription"
    );
    Ok(subscription)
}

/// Replaces a subscription's plan, discounts, dates and notes.
///
/// Moving to a different plan requires that plan to be active; keeping the
/// current plan is allowed even after it has been retired.
#[instrument(skip(db, details))]
pub async fn update_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
    details: SubscriptionDetails,
) -> Result<athlete_subscription::Model> {
    details.validate()?;

    let existing = AthleteSubscription::find_by_id(subscription_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("subscription", subscription_id))?;
    if existing.billing_plan_id != details.billing_plan_id {
        ensure_plan_active(db, details.billing_plan_id).await?;
    }

    let mut subscription: athlete_subscription::ActiveModel = existing.into();
    subscription.billing_plan_id = Set(details.billing_plan_id);
    subscription.custom_discount_percent = Set(details.custom_discount_percent);
    subscription.custom_discount_amount = Set(details.custom_discount_amount);
    subscription.start_date = Set(details.start_date);
    subscription.end_date = Set(details.end_date);
    subscription.notes = Set(details.notes);
    subscription.updated_at = Set(chrono::Utc::now().naive_utc());

    subscription.update(db).await.map_err(Into::into)
}

/// Moves a subscription to `status` (pause, resume or cancel).
#[instrument(skip(db))]
pub async fn set_subscription_status(
    db: &DatabaseConnection,
    subscription_id: i64,
    status: SubscriptionStatus,
) -> Result<athlete_subscription::Model> {
    let existing = AthleteSubscription::find_by_id(subscription_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("subscription", subscription_id))?;

    let mut subscription: athlete_subscription::ActiveModel = existing.into();
    subscription.status = Set(status);
    subscription.updated_at = Set(chrono::Utc::now().naive_utc());
    subscription.update(db).await.map_err(Into::into)
}

/// Finds a subscription by id.
pub async fn get_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<Option<athlete_subscription::Model>> {
    AthleteSubscription::find_by_id(subscription_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// An athlete's subscriptions, newest start date first.
pub async fn list_subscriptions_for_athlete(
    db: &DatabaseConnection,
    athlete_id: i64,
) -> Result<Vec<athlete_subscription::Model>> {
    AthleteSubscription::find()
        .filter(athlete_subscription::Column::AthleteId.eq(athlete_id))
        .order_by_desc(athlete_subscription::Column::StartDate)
        .order_by_desc(athlete_subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::billing_plan;
    use crate::entities::{BillingPeriod, PlanType, ServiceLevel};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_final_price_is_derived_on_create() -> Result<()> {
        let db = setup_test_db().await?;
        let athlete = create_test_athlete(&db, "Asha", "asha@example.com").await?;
        let plan = create_test_plan(&db, Money::from_rupees(2000)).await?;

        let mut details = subscription_details(plan.id, date(2026, 1, 1));
        details.custom_discount_percent = Percent::from_whole(10);
        details.custom_discount_amount = Money::from_rupees(50);
        let subscription = create_subscription(&db, athlete.id, details).await?;

        assert_eq!(subscription.final_price, Money::from_rupees(1750));
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn test_final_price_never_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let athlete = create_test_athlete(&db, "Asha", "asha@example.com").await?;
        let plan = create_test_plan(&db, Money::from_rupees(100)).await?;

        let mut details = subscription_details(plan.id, date(2026, 1, 1));
        details.custom_discount_percent = Percent::FULL;
        details.custom_discount_amount = Money::from_rupees(50);
        let subscription = create_subscription(&db, athlete.id, details).await?;

        assert_eq!(subscription.final_price, Money::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_price_change_applies_on_next_save() -> Result<()> {
        let (db, fixture) = setup_with_subscription().await?;
        assert_eq!(fixture.subscription.final_price, Money::from_rupees(2000));

        let mut details = plan_details(
            fixture.plan.plan_type,
            fixture.plan.service_level,
            fixture.plan.billing_period,
            Money::from_rupees(2400),
        );
        details.name = fixture.plan.name.clone();
        billing_plan::update_billing_plan(&db, fixture.plan.id, details).await?;

        // Stored price is untouched until the subscription is saved again
        let stored = get_subscription(&db, fixture.subscription.id).await?.unwrap();
        assert_eq!(stored.final_price, Money::from_rupees(2000));

        let paused =
            set_subscription_status(&db, fixture.subscription.id, SubscriptionStatus::Paused)
                .await?;
        assert_eq!(paused.status, SubscriptionStatus::Paused);
        assert_eq!(paused.final_price, Money::from_rupees(2400));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_subscription_recomputes_price() -> Result<()> {
        let (db, fixture) = setup_with_subscription().await?;

        let mut details = subscription_details(fixture.plan.id, date(2026, 2, 1));
        details.custom_discount_percent = Percent::from_whole(25);
        let updated = update_subscription(&db, fixture.subscription.id, details).await?;

        assert_eq!(updated.final_price, Money::from_rupees(1500));
        assert_eq!(updated.start_date, date(2026, 2, 1));
        Ok(())
    }

    #[tokio::test]
    async fn test_discount_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut details = subscription_details(1, date(2026, 1, 1));
        details.custom_discount_percent = Percent::from_whole(101);
        let result = create_subscription(&db, 1, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "custom_discount_percent", .. }
        ));

        let mut details = subscription_details(1, date(2026, 1, 1));
        details.custom_discount_amount = Money::from_rupees(-1);
        let result = create_subscription(&db, 1, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "custom_discount_amount", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_plan_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let athlete = create_test_athlete(&db, "Asha", "asha@example.com").await?;
        let mut details = plan_details(
            PlanType::Running,
            ServiceLevel::Personal,
            BillingPeriod::Monthly,
            Money::from_rupees(4000),
        );
        details.is_active = false;
        let plan = billing_plan::create_billing_plan(&db, details).await?;

        let result =
            create_subscription(&db, athlete.id, subscription_details(plan.id, date(2026, 1, 1)))
                .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "billing_plan_id", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_subscriptions_newest_first() -> Result<()> {
        let (db, fixture) = setup_with_subscription().await?;
        let later = create_subscription(
            &db,
            fixture.athlete.id,
            subscription_details(fixture.plan.id, date(2026, 6, 1)),
        )
        .await?;

        let subscriptions = list_subscriptions_for_athlete(&db, fixture.athlete.id).await?;
        assert_eq!(subscriptions.len(), 2);
        assert_eq!(subscriptions[0].id, later.id);
        assert_eq!(subscriptions[1].id, fixture.subscription.id);
        Ok(())
    }
}
