//! Billing plan business logic - the catalog of plan/price tiers.
//!
//! A plan is identified by its (type, level, period) triple. The HSN/SAC code is
//! filled in by the entity save hook, so none of these functions accept one.

use crate::{
    config::catalog::PlanConfig,
    core::{money::Money, validation},
    entities::{
        AthleteSubscription, BillingPeriod, BillingPlan, PlanType, ServiceLevel,
        athlete_subscription, billing_plan,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Smallest price a plan may carry.
const MIN_BASE_PRICE: Money = Money::from_paise(1);

/// Editable plan fields, used for both create and update.
#[derive(Clone, Debug)]
pub struct PlanDetails {
    /// Human-readable name
    pub name: String,
    /// Sport
    pub plan_type: PlanType,
    /// Coaching tier
    pub service_level: ServiceLevel,
    /// Billing cadence
    pub billing_period: BillingPeriod,
    /// Price for one billing period
    pub base_price: Money,
    /// Plan details and features
    pub description: String,
    /// Whether new subscriptions may use the plan
    pub is_active: bool,
}

impl PlanDetails {
    fn validate(&self) -> Result<()> {
        validation::require_text("name", &self.name)?;
        validation::min_amount("base_price", self.base_price, MIN_BASE_PRICE)
    }
}

impl From<&PlanConfig> for PlanDetails {
    fn from(config: &PlanConfig) -> Self {
        Self {
            name: config.name.clone(),
            plan_type: config.plan_type,
            service_level: config.service_level,
            billing_period: config.billing_period,
            base_price: config.base_price,
            description: config.description.clone(),
            is_active: config.is_active,
        }
    }
}

/// Looks up the plan occupying a (type, level, period) triple.
pub async fn find_plan_by_triple<C>(
    db: &C,
    plan_type: PlanType,
    service_level: ServiceLevel,
    billing_period: BillingPeriod,
) -> Result<Option<billing_plan::Model>>
where
    C: ConnectionTrait,
{
    BillingPlan::find()
        .filter(billing_plan::Column::PlanType.eq(plan_type))
        .filter(billing_plan::Column::ServiceLevel.eq(service_level))
        .filter(billing_plan::Column::BillingPeriod.eq(billing_period))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn ensure_triple_free<C>(db: &C, details: &PlanDetails, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = find_plan_by_triple(
        db,
        details.plan_type,
        details.service_level,
        details.billing_period,
    )
    .await?;
    match existing {
        Some(plan) if Some(plan.id) != except_id => Err(Error::Conflict {
            message: format!(
                "plan '{}' already covers {:?}/{:?}/{:?}",
                plan.name, details.plan_type, details.service_level, details.billing_period
            ),
        }),
        _ => Ok(()),
    }
}

async fn insert_plan<C>(db: &C, details: PlanDetails) -> Result<billing_plan::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();
    let plan = billing_plan::ActiveModel {
        name: Set(details.name.trim().to_string()),
        plan_type: Set(details.plan_type),
        service_level: Set(details.service_level),
        billing_period: Set(details.billing_period),
        base_price: Set(details.base_price),
        description: Set(details.description),
        is_active: Set(details.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    plan.insert(db).await.map_err(Into::into)
}

/// Creates a plan. Fails with `Conflict` if the triple is already taken.
#[instrument(skip(db, details), fields(name = %details.name))]
pub async fn create_billing_plan(
    db: &DatabaseConnection,
    details: PlanDetails,
) -> Result<billing_plan::Model> {
    details.validate()?;
    ensure_triple_free(db, &details, None).await?;

    let plan = insert_plan(db, details).await?;
    info!(plan_id = plan.id, hsn_sac = %plan.hsn_sac, "Created billing plan");
    Ok(plan)
}

/// Replaces a plan's fields. Existing subscriptions keep their stored final
/// price until they are saved again.
#[instrument(skip(db, details))]
pub async fn update_billing_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    details: PlanDetails,
) -> Result<billing_plan::Model> {
    details.validate()?;

    let existing = BillingPlan::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("billing plan", plan_id))?;
    ensure_triple_free(db, &details, Some(plan_id)).await?;

    let mut plan: billing_plan::ActiveModel = existing.into();
    plan.name = Set(details.name.trim().to_string());
    plan.plan_type = Set(details.plan_type);
    plan.service_level = Set(details.service_level);
    plan.billing_period = Set(details.billing_period);
    plan.base_price = Set(details.base_price);
    plan.description = Set(details.description);
    plan.is_active = Set(details.is_active);
    plan.updated_at = Set(chrono::Utc::now().naive_utc());

    plan.update(db).await.map_err(Into::into)
}

/// Finds a plan by id.
pub async fn get_billing_plan(
    db: &DatabaseConnection,
    plan_id: i64,
) -> Result<Option<billing_plan::Model>> {
    BillingPlan::find_by_id(plan_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All plans, ordered by type, level and period.
pub async fn list_billing_plans(db: &DatabaseConnection) -> Result<Vec<billing_plan::Model>> {
    BillingPlan::find()
        .order_by_asc(billing_plan::Column::PlanType)
        .order_by_asc(billing_plan::Column::ServiceLevel)
        .order_by_asc(billing_plan::Column::BillingPeriod)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Plans available for new subscriptions, ordered by type, level and period.
pub async fn list_active_plans(db: &DatabaseConnection) -> Result<Vec<billing_plan::Model>> {
    BillingPlan::find()
        .filter(billing_plan::Column::IsActive.eq(true))
        .order_by_asc(billing_plan::Column::PlanType)
        .order_by_asc(billing_plan::Column::ServiceLevel)
        .order_by_asc(billing_plan::Column::BillingPeriod)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a plan. Plans still referenced by subscriptions are protected.
#[instrument(skip(db))]
pub async fn delete_billing_plan(db: &DatabaseConnection, plan_id: i64) -> Result<()> {
    let subscriptions = AthleteSubscription::find()
        .filter(athlete_subscription::Column::BillingPlanId.eq(plan_id))
        .count(db)
        .await?;
    if subscriptions > 0 {
        return Err(Error::Protected {
            entity: "billing plan",
            id: plan_id,
            dependents: format!("{subscriptions} subscription(s)"),
        });
    }

    let result = BillingPlan::delete_by_id(plan_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("billing plan", plan_id));
    }
    info!(plan_id, "Deleted billing plan");
    Ok(())
}

/// Inserts catalog plans whose triple is not in the table yet.
///
/// Existing plans are left as they are, edited prices included. Returns the
/// number of plans inserted.
#[instrument(skip(db, plans), fields(count = plans.len()))]
pub async fn seed_catalog(db: &DatabaseConnection, plans: &[PlanConfig]) -> Result<usize> {
    for config in plans {
        PlanDetails::from(config).validate()?;
    }

    let txn = db.begin().await?;
    let mut inserted = 0;

    for config in plans {
        let details = PlanDetails::from(config);
        let existing = find_plan_by_triple(
            &txn,
            details.plan_type,
            details.service_level,
            details.billing_period,
        )
        .await?;
        if let Some(plan) = existing {
            debug!(plan_id = plan.id, name = %plan.name, "Catalog plan already present");
            continue;
        }
        let plan = insert_plan(&txn, details).await?;
        debug!(plan_id = plan.id, name = %plan.name, "Seeded catalog plan");
        inserted += 1;
    }

    txn.commit().await?;
    info!(inserted, "Finished seeding plan catalog");
    Ok(inserted)
}
