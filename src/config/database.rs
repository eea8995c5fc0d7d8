//! Database configuration module for the back office.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so column types, unique columns and foreign keys (with their deletion rules) follow the
//! Rust structs. Composite uniqueness that an entity cannot express is added as unique
//! indexes afterwards.

use crate::entities::{
    ActiveConfiguration, Athlete, AthleteSubscription, BillingPlan, EmailSettings, Invoice,
    InvoiceSequence, InvoiceTemplate, Payment, UserAccount, Workout, WorkoutCompletion,
    billing_plan, workout,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info};

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/tailwind.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the
/// default local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

/// Creates every table and unique index the back office needs. Safe to run on
/// an existing database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents before children
    create_table(db, &schema, UserAccount).await?;
    create_table(db, &schema, Athlete).await?;
    create_table(db, &schema, BillingPlan).await?;
    create_table(db, &schema, AthleteSubscription).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, InvoiceTemplate).await?;
    create_table(db, &schema, Invoice).await?;
    create_table(db, &schema, InvoiceSequence).await?;
    create_table(db, &schema, EmailSettings).await?;
    create_table(db, &schema, ActiveConfiguration).await?;
    create_table(db, &schema, Workout).await?;
    create_table(db, &schema, WorkoutCompletion).await?;

    let plan_triple = Index::create()
        .name("idx_billing_plans_type_level_period")
        .table(BillingPlan)
        .col(billing_plan::Column::PlanType)
        .col(billing_plan::Column::ServiceLevel)
        .col(billing_plan::Column::BillingPeriod)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&plan_triple)).await?;

    let workout_slot = Index::create()
        .name("idx_workouts_athlete_date_type")
        .table(Workout)
        .col(workout::Column::AthleteId)
        .col(workout::Column::Date)
        .col(workout::Column::WorkoutType)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&workout_slot)).await?;

    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::money::Money;
    use crate::entities::{BillingPeriod, PlanType, ServiceLevel};
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        UserAccount::find().limit(1).all(&db).await?;
        Athlete::find().limit(1).all(&db).await?;
        BillingPlan::find().limit(1).all(&db).await?;
        AthleteSubscription::find().limit(1).all(&db).await?;
        Payment::find().limit(1).all(&db).await?;
        InvoiceTemplate::find().limit(1).all(&db).await?;
        Invoice::find().limit(1).all(&db).await?;
        InvoiceSequence::find().limit(1).all(&db).await?;
        EmailSettings::find().limit(1).all(&db).await?;
        ActiveConfiguration::find().limit(1).all(&db).await?;
        Workout::find().limit(1).all(&db).await?;
        WorkoutCompletion::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_plan_triple_index_is_unique() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let now = chrono::Utc::now().naive_utc();
        let plan = |name: &str| billing_plan::ActiveModel {
            name: Set(name.to_string()),
            plan_type: Set(PlanType::Running),
            service_level: Set(ServiceLevel::Focus),
            billing_period: Set(BillingPeriod::Monthly),
            base_price: Set(Money::from_rupees(2000)),
            description: Set(String::new()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        plan("first").insert(&db).await?;
        assert!(plan("second").insert(&db).await.is_err());
        Ok(())
    }

    #[test]
    fn test_default_database_url() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
        assert!(DEFAULT_DATABASE_URL.ends_with("mode=rwc"));
    }
}
