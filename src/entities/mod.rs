//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod active_configuration;
pub mod athlete;
pub mod athlete_subscription;
pub mod billing_plan;
pub mod email_settings;
pub mod invoice;
pub mod invoice_sequence;
pub mod invoice_template;
pub mod payment;
pub mod user_account;
pub mod workout;
pub mod workout_completion;

use sea_orm::{ActiveValue, Value};

// Re-export specific types to avoid conflicts
pub use active_configuration::Entity as ActiveConfiguration;
pub use athlete::{Entity as Athlete, Model as AthleteModel};
pub use athlete_subscription::{
    Entity as AthleteSubscription, Model as AthleteSubscriptionModel, SubscriptionStatus,
};
pub use billing_plan::{
    BillingPeriod, Entity as BillingPlan, Model as BillingPlanModel, PlanType, ServiceLevel,
};
pub use email_settings::{EmailProvider, Entity as EmailSettings, Model as EmailSettingsModel};
pub use invoice::{Entity as Invoice, InvoiceStatus, LineItem, Model as InvoiceModel};
pub use invoice_sequence::Entity as InvoiceSequence;
pub use invoice_template::{Entity as InvoiceTemplate, Model as InvoiceTemplateModel};
pub use payment::{Entity as Payment, Model as PaymentModel, PaymentMethod, PaymentStatus};
pub use user_account::{Entity as UserAccount, Model as UserAccountModel};
pub use workout::{Entity as Workout, Model as WorkoutModel, WorkoutStatus, WorkoutType};
pub use workout_completion::{
    CompletionQuality, Entity as WorkoutCompletion, Model as WorkoutCompletionModel,
};

/// The value an active model field will hold after saving, if it is known.
pub(crate) fn active_value<V>(value: &ActiveValue<V>) -> Option<&V>
where
    V: Into<Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}
