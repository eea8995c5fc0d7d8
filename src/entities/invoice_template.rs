//! Invoice template entity - reusable letterhead, tax and bank details.
//!
//! Which template is the default lives in `active_configuration`, not on the
//! template row itself.

use crate::core::money::Percent;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice template database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trading name printed on the invoice
    pub company_name: String,
    /// Registered address
    pub company_address: String,
    /// 15-character GSTIN, if registered
    pub company_gstin: Option<String>,
    /// 10-character PAN
    pub company_pan: String,
    /// Contact email
    pub company_email: String,
    /// Contact phone
    pub company_phone: String,
    /// Website
    pub company_website: Option<String>,
    /// Bank name for transfers
    pub bank_name: Option<String>,
    /// Bank account number
    pub bank_account_number: Option<String>,
    /// IFSC routing code
    pub bank_ifsc: Option<String>,
    /// Name on the bank account
    pub bank_account_holder: Option<String>,
    /// UPI handle, e.g. `coach@ybl`
    pub bank_upi_id: Option<String>,
    /// Terms printed under the totals
    pub terms_and_conditions: String,
    /// Closing line
    pub footer_note: String,
    /// Whether GST is charged at all
    pub include_gst: bool,
    /// Combined GST rate (0-28%)
    pub gst_rate: Percent,
    /// When the template was created
    pub created_at: DateTime,
    /// When the template was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `InvoiceTemplate` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Invoices rendered from this template
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
