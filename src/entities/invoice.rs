//! Invoice entity - an immutable tax document generated from a payment.
//!
//! Company and customer details, line items and the tax breakdown are
//! snapshotted at creation. The invoice number is allocated once and the save
//! hook refuses any attempt to change it afterwards.

use crate::core::money::{Money, Percent};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

/// Lifecycle of an invoice document
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Generated, not yet sent
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Emailed to the customer
    #[sea_orm(string_value = "SENT")]
    Sent,
    /// Settled
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Voided
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// One billed line, stored inside the invoice's JSON `line_items` column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What is being billed
    pub description: String,
    /// Tax classification code of the plan
    pub hsn_sac: String,
    /// Quantity
    pub qty: i64,
    /// Unit price
    pub rate: Money,
    /// `qty × rate`
    pub amount: Money,
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Payment being invoiced (one invoice per payment)
    #[sea_orm(unique)]
    pub payment_id: i64,
    /// Template the snapshot was taken from
    pub template_id: i64,
    /// `INV-{year}-{month}-{seq}`
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Date printed on the invoice; scopes the number sequence
    pub invoice_date: Date,
    /// Payment due date
    pub due_date: Option<Date>,

    /// Company name (snapshot)
    pub company_name: String,
    /// Company address (snapshot)
    pub company_address: String,
    /// Company GSTIN (snapshot)
    pub company_gstin: Option<String>,
    /// Company PAN (snapshot)
    pub company_pan: String,
    /// Company email (snapshot)
    pub company_email: String,
    /// Company phone (snapshot)
    pub company_phone: String,

    /// Customer name (snapshot)
    pub customer_name: String,
    /// Customer email (snapshot)
    pub customer_email: String,
    /// Customer phone (snapshot)
    pub customer_phone: String,
    /// Customer billing address (snapshot)
    pub customer_address: String,

    /// JSON array of [`LineItem`]
    pub line_items: Json,

    /// Sum of line amounts
    pub subtotal: Money,
    /// Percentage discount applied
    pub discount_percent: Percent,
    /// Total discount in currency (percentage part plus flat part)
    pub discount_amount: Money,
    /// Subtotal less discount
    pub taxable_amount: Money,
    /// Central GST rate
    pub cgst_rate: Percent,
    /// Central GST amount
    pub cgst_amount: Money,
    /// State GST rate
    pub sgst_rate: Percent,
    /// State GST amount
    pub sgst_amount: Money,
    /// Integrated GST rate
    pub igst_rate: Percent,
    /// Integrated GST amount
    pub igst_amount: Money,
    /// Taxable amount plus all taxes
    pub total_amount: Money,
    /// Total spelled out in the Indian numbering system
    pub amount_in_words: String,

    /// Payment terms text
    pub payment_terms: String,
    /// Lifecycle status
    pub status: InvoiceStatus,
    /// Path of the stored PDF, once generated
    pub pdf_file: Option<String>,
    /// When the PDF was stored
    pub pdf_generated_at: Option<DateTime>,
    /// When the invoice was emailed
    pub emailed_at: Option<DateTime>,
    /// When the invoice was created
    pub created_at: DateTime,
    /// When the invoice was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Decodes the snapshotted line items.
    pub fn line_items(&self) -> Result<Vec<LineItem>, serde_json::Error> {
        serde_json::from_value(self.line_items.clone())
    }

    /// Total tax charged across all components.
    #[must_use]
    pub fn total_tax(&self) -> Money {
        self.cgst_amount + self.sgst_amount + self.igst_amount
    }
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice belongs to one payment
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id",
        on_delete = "Cascade"
    )]
    Payment,
    /// The template cannot be deleted while invoices use it
    #[sea_orm(
        belongs_to = "super::invoice_template::Entity",
        from = "Column::TemplateId",
        to = "super::invoice_template::Column::Id",
        on_delete = "Restrict"
    )]
    Template,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::invoice_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert && matches!(self.invoice_number, ActiveValue::Set(_)) {
            return Err(DbErr::Custom(
                "invoice number is assigned once and cannot be changed".to_string(),
            ));
        }
        Ok(self)
    }
}
