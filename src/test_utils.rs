//! Shared test utilities for the back office.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults. Details builders return
//! valid input that a test can tweak before passing it on.

use crate::{
    core::{
        athlete::{self, AthleteDetails},
        billing_plan::{self, PlanDetails},
        email_settings::{self, EmailSettingsDetails},
        invoice::{self, GenerateInvoice},
        invoice_template::{self, TemplateDetails},
        money::{Money, Percent},
        payment::{self, NewPayment},
        pricing::TaxSupply,
        subscription::{self, SubscriptionDetails},
        workout::{self, WorkoutDetails},
    },
    entities::{self, BillingPeriod, EmailProvider, PlanType, ServiceLevel, WorkoutType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date. Panics on an impossible date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Valid athlete details with the given name and email.
pub fn athlete_details(name: &str, email: &str) -> AthleteDetails {
    AthleteDetails {
        name: name.to_string(),
        email: email.to_string(),
        contact_number: "+919876543210".to_string(),
        address: "12 Marine Drive, Mumbai 400002".to_string(),
        ..Default::default()
    }
}

/// Creates a user account (username = email) and an athlete linked to it.
pub async fn create_test_athlete(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::athlete::Model> {
    let account = athlete::create_user_account(db, email, email).await?;
    athlete::create_athlete(db, account.id, athlete_details(name, email)).await
}

/// Active plan details named after the triple.
pub fn plan_details(
    plan_type: PlanType,
    service_level: ServiceLevel,
    billing_period: BillingPeriod,
    base_price: Money,
) -> PlanDetails {
    PlanDetails {
        name: format!("{plan_type:?} {service_level:?} - {billing_period:?}"),
        plan_type,
        service_level,
        billing_period,
        base_price,
        description: String::new(),
        is_active: true,
    }
}

/// Creates the Running / Focus / Monthly plan at `base_price`.
///
/// # Defaults
/// * HSN/SAC: `RUNFOCUS1MO`
pub async fn create_test_plan(
    db: &DatabaseConnection,
    base_price: Money,
) -> Result<entities::billing_plan::Model> {
    billing_plan::create_billing_plan(
        db,
        plan_details(
            PlanType::Running,
            ServiceLevel::Focus,
            BillingPeriod::Monthly,
            base_price,
        ),
    )
    .await
}

/// Open-ended subscription details without any discount.
pub fn subscription_details(billing_plan_id: i64, start_date: NaiveDate) -> SubscriptionDetails {
    SubscriptionDetails {
        billing_plan_id,
        custom_discount_percent: Percent::ZERO,
        custom_discount_amount: Money::ZERO,
        start_date,
        end_date: None,
        notes: String::new(),
    }
}

/// Records created by [`setup_with_subscription`].
pub struct TestFixture {
    /// Athlete "Asha Rao"
    pub athlete: entities::athlete::Model,
    /// Running / Focus / Monthly at ₹2000
    pub plan: entities::billing_plan::Model,
    /// Active since 2026-01-01, final price ₹2000
    pub subscription: entities::athlete_subscription::Model,
}

/// Sets up an athlete subscribed to a ₹2000 monthly plan.
pub async fn setup_with_subscription() -> Result<(DatabaseConnection, TestFixture)> {
    let db = setup_test_db().await?;
    let athlete = create_test_athlete(&db, "Asha Rao", "asha@example.com").await?;
    let plan = create_test_plan(&db, Money::from_rupees(2000)).await?;
    let subscription = subscription::create_subscription(
        &db,
        athlete.id,
        subscription_details(plan.id, date(2026, 1, 1)),
    )
    .await?;
    Ok((
        db,
        TestFixture {
            athlete,
            plan,
            subscription,
        },
    ))
}

/// Creates a pending ₹2000 payment due on `due_date`.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    subscription_id: i64,
    due_date: NaiveDate,
) -> Result<entities::payment::Model> {
    payment::create_payment(
        db,
        subscription_id,
        NewPayment {
            amount: Money::from_rupees(2000),
            due_date,
            months_covered: due_date.format("%B %Y").to_string(),
            notes: String::new(),
        },
    )
    .await
}

/// Valid template details charging 18% GST.
pub fn template_details(is_default: bool) -> TemplateDetails {
    TemplateDetails {
        company_name: "Tailwind Coaching".to_string(),
        company_address: "4 Carter Road, Bandra West, Mumbai 400050".to_string(),
        company_gstin: Some("27ABCDE1234F1Z5".to_string()),
        company_pan: "ABCDE1234F".to_string(),
        company_email: "billing@tailwind.example".to_string(),
        company_phone: "+912226001234".to_string(),
        company_website: Some("https://tailwind.example".to_string()),
        bank_name: Some("HDFC Bank".to_string()),
        bank_account_number: Some("50100012345678".to_string()),
        bank_ifsc: Some("HDFC0001234".to_string()),
        bank_account_holder: Some("Tailwind Coaching".to_string()),
        bank_upi_id: Some("tailwind@hdfcbank".to_string()),
        terms_and_conditions: "Fees are non-refundable.".to_string(),
        footer_note: "Thank you for training with us.".to_string(),
        include_gst: true,
        gst_rate: Percent::from_whole(18),
        is_default,
    }
}

/// Creates an invoice template from [`template_details`].
pub async fn create_test_template(
    db: &DatabaseConnection,
    is_default: bool,
) -> Result<entities::invoice_template::Model> {
    invoice_template::create_invoice_template(db, template_details(is_default)).await
}

/// Valid Gmail SMTP settings.
pub fn email_settings_details(is_active: bool) -> EmailSettingsDetails {
    EmailSettingsDetails {
        provider: EmailProvider::Gmail,
        smtp_host: "smtp.gmail.com".to_string(),
        smtp_port: 587,
        smtp_use_tls: true,
        smtp_username: "coach@tailwind.example".to_string(),
        smtp_password: "app-password".to_string(),
        from_email: "coach@tailwind.example".to_string(),
        from_name: "Tailwind Coaching".to_string(),
        is_active,
    }
}

/// Creates email settings from [`email_settings_details`].
pub async fn create_test_email_settings(
    db: &DatabaseConnection,
    is_active: bool,
) -> Result<entities::email_settings::Model> {
    email_settings::create_email_settings(db, email_settings_details(is_active)).await
}

/// A workout of `workout_type` on `date` with a target distance.
pub fn workout_details(date: NaiveDate, workout_type: WorkoutType) -> WorkoutDetails {
    WorkoutDetails {
        date,
        workout_type,
        title: format!("{workout_type:?} run"),
        description: "Conversational pace throughout".to_string(),
        target_distance: Some(8.0),
        target_duration: Some(50),
        target_tss: None,
        coach_notes: String::new(),
    }
}

/// Creates an easy workout for the athlete on `date`.
pub async fn create_test_workout(
    db: &DatabaseConnection,
    athlete_id: i64,
    date: NaiveDate,
) -> Result<entities::workout::Model> {
    workout::create_workout(db, athlete_id, workout_details(date, WorkoutType::Easy)).await
}

/// Intra-state invoice request using the default template.
pub fn invoice_request(payment_id: i64, invoice_date: NaiveDate) -> GenerateInvoice {
    GenerateInvoice {
        payment_id,
        template_id: None,
        invoice_date,
        due_date: None,
        supply: TaxSupply::IntraState,
        payment_terms: "Payable within 7 days".to_string(),
    }
}

/// Sets up [`setup_with_subscription`] plus a default template and one
/// invoice, numbered `INV-2026-03-0001`, for a payment due 2026-03-05.
pub async fn setup_with_invoice() -> Result<(DatabaseConnection, entities::invoice::Model)> {
    let (db, fixture) = setup_with_subscription().await?;
    create_test_template(&db, true).await?;
    let payment = create_test_payment(&db, fixture.subscription.id, date(2026, 3, 5)).await?;
    let invoice = invoice::generate_invoice(&db, invoice_request(payment.id, date(2026, 3, 1))).await?;
    Ok((db, invoice))
}
