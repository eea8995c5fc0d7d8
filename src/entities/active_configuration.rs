//! Active configuration entity - a single row naming the default invoice
//! template and the email settings in use.
//!
//! Keeping the pointers here means "only one default" holds by construction
//! instead of by clearing flags on every other row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only row in the table.
pub const SINGLETON_ID: i32 = 1;

/// Active configuration database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "active_configuration")]
pub struct Model {
    /// Always [`SINGLETON_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Template used when an invoice is generated without an explicit one
    pub default_invoice_template_id: Option<i64>,
    /// Email settings used to send invoices
    pub active_email_settings_id: Option<i64>,
}

/// Defines relationships between `ActiveConfiguration` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Default template; cleared if the template is deleted
    #[sea_orm(
        belongs_to = "super::invoice_template::Entity",
        from = "Column::DefaultInvoiceTemplateId",
        to = "super::invoice_template::Column::Id",
        on_delete = "SetNull"
    )]
    DefaultInvoiceTemplate,
    /// Active email settings; cleared if the settings are deleted
    #[sea_orm(
        belongs_to = "super::email_settings::Entity",
        from = "Column::ActiveEmailSettingsId",
        to = "super::email_settings::Column::Id",
        on_delete = "SetNull"
    )]
    ActiveEmailSettings,
}

impl ActiveModelBehavior for ActiveModel {}
