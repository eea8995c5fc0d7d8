//! Invoice template business logic - letterhead, tax and bank details.
//!
//! The default template is the one named by `active_configuration`; saving a
//! template with `is_default` set moves that pointer.

use crate::{
    core::{configuration, money::Percent, validation},
    entities::{Invoice, InvoiceTemplate, invoice, invoice_template},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Highest GST rate a template may charge.
const MAX_GST_RATE: Percent = Percent::from_whole(28);

/// Editable template fields, used for both create and update.
///
/// The default values describe a GST-registered sender at 18%, so only the
/// company identifiers and contact details need filling in.
#[derive(Clone, Debug)]
pub struct TemplateDetails {
    /// Business name printed on the letterhead
    pub company_name: String,
    /// Registered office address
    pub company_address: String,
    /// GST identification number, if registered
    pub company_gstin: Option<String>,
    /// Permanent Account Number
    pub company_pan: String,
    /// Billing contact email
    pub company_email: String,
    /// Billing contact phone
    pub company_phone: String,
    /// Company website
    pub company_website: Option<String>,
    /// Bank for transfers
    pub bank_name: Option<String>,
    /// Account number
    pub bank_account_number: Option<String>,
    /// IFSC code of the branch
    pub bank_ifsc: Option<String>,
    /// Name on the account
    pub bank_account_holder: Option<String>,
    /// UPI handle
    pub bank_upi_id: Option<String>,
    /// Terms printed below the totals
    pub terms_and_conditions: String,
    /// Closing line of the invoice
    pub footer_note: String,
    /// Whether GST is charged at all
    pub include_gst: bool,
    /// Combined GST rate; intra-state invoices split it equally
    pub gst_rate: Percent,
    /// Make this the default template (or stop it being the default)
    pub is_default: bool,
}

impl Default for TemplateDetails {
    fn default() -> Self {
        Self {
            company_name: "TAILWIND".to_string(),
            company_address: String::new(),
            company_gstin: None,
            company_pan: String::new(),
            company_email: String::new(),
            company_phone: String::new(),
            company_website: None,
            bank_name: None,
            bank_account_number: None,
            bank_ifsc: None,
            bank_account_holder: None,
            bank_upi_id: None,
            terms_and_conditions: String::new(),
            footer_note: "Thank you for your business!".to_string(),
            include_gst: true,
            gst_rate: Percent::from_whole(18),
            is_default: false,
        }
    }
}

impl TemplateDetails {
    fn validate(&self) -> Result<()> {
        validation::require_text("company_name", &self.company_name)?;
        validation::require_text("company_address", &self.company_address)?;
        validation::optional("company_gstin", self.company_gstin.as_deref(), validation::gstin)?;
        validation::pan("company_pan", &self.company_pan)?;
        validation::email("company_email", &self.company_email)?;
        validation::phone("company_phone", &self.company_phone)?;
        validation::optional("company_website", self.company_website.as_deref(), validation::url)?;
        validation::optional("bank_ifsc", self.bank_ifsc.as_deref(), validation::ifsc)?;
        validation::percent_range("gst_rate", self.gst_rate, Percent::ZERO, MAX_GST_RATE)?;
        // CGST and SGST each print as half the rate
        if self.gst_rate.basis_points() % 2 != 0 {
            return Err(Error::validation(
                "gst_rate",
                "GST rate must split evenly into CGST and SGST (use steps of 0.02%)",
            ));
        }
        Ok(())
    }
}

/// Creates a template, optionally making it the default.
#[instrument(skip(db, details), fields(company = %details.company_name))]
pub async fn create_invoice_template(
    db: &DatabaseConnection,
    details: TemplateDetails,
) -> Result<invoice_template::Model> {
    details.validate()?;

    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();
    let is_default = details.is_default;

    let template = invoice_template::ActiveModel {
        company_name: Set(details.company_name),
        company_address: Set(details.company_address),
        company_gstin: Set(details.company_gstin),
        company_pan: Set(details.company_pan),
        company_email: Set(details.company_email),
        company_phone: Set(details.company_phone),
        company_website: Set(details.company_website),
        bank_name: Set(details.bank_name),
        bank_account_number: Set(details.bank_account_number),
        bank_ifsc: Set(details.bank_ifsc),
        bank_account_holder: Set(details.bank_account_holder),
        bank_upi_id: Set(details.bank_upi_id),
        terms_and_conditions: Set(details.terms_and_conditions),
        footer_note: Set(details.footer_note),
        include_gst: Set(details.include_gst),
        gst_rate: Set(details.gst_rate),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if is_default {
        configuration::set_default_invoice_template_id(&txn, Some(template.id)).await?;
    }
    txn.commit().await?;

    info!(template_id = template.id, is_default, "Created invoice template");
    Ok(template)
}

/// Replaces a template's fields and applies its default flag.
#[instrument(skip(db, details))]
pub async fn update_invoice_template(
    db: &DatabaseConnection,
    template_id: i64,
    details: TemplateDetails,
) -> Result<invoice_template::Model> {
    details.validate()?;

    let txn = db.begin().await?;
    let existing = InvoiceTemplate::find_by_id(template_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("invoice template", template_id))?;

    let mut template: invoice_template::ActiveModel = existing.into();
    template.company_name = Set(details.company_name);
    template.company_address = Set(details.company_address);
    template.company_gstin = Set(details.company_gstin);
    template.company_pan = Set(details.company_pan);
    template.company_email = Set(details.company_email);
    template.company_phone = Set(details.company_phone);
    template.company_website = Set(details.company_website);
    template.bank_name = Set(details.bank_name);
    template.bank_account_number = Set(details.bank_account_number);
    template.bank_ifsc = Set(details.bank_ifsc);
    template.bank_account_holder = Set(details.bank_account_holder);
    template.bank_upi_id = Set(details.bank_upi_id);
    template.terms_and_conditions = Set(details.terms_and_conditions);
    template.footer_note = Set(details.footer_note);
    template.include_gst = Set(details.include_gst);
    template.gst_rate = Set(details.gst_rate);
    template.updated_at = Set(chrono::Utc::now().naive_utc());
    let template = template.update(&txn).await?;

    let current_default = configuration::default_invoice_template_id(&txn).await?;
    if details.is_default {
        configuration::set_default_invoice_template_id(&txn, Some(template_id)).await?;
    } else if current_default == Some(template_id) {
        configuration::set_default_invoice_template_id(&txn, None).await?;
    }
    txn.commit().await?;

    Ok(template)
}

/// Makes an existing template the default.
#[instrument(skip(db))]
pub async fn set_default_invoice_template(db: &DatabaseConnection, template_id: i64) -> Result<()> {
    InvoiceTemplate::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("invoice template", template_id))?;
    configuration::set_default_invoice_template_id(db, Some(template_id)).await?;
    info!(template_id, "Default invoice template changed");
    Ok(())
}

/// Finds a template by id.
pub async fn get_invoice_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Option<invoice_template::Model>> {
    InvoiceTemplate::find_by_id(template_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The default template, if one has been chosen.
pub async fn get_default_invoice_template<C>(db: &C) -> Result<Option<invoice_template::Model>>
where
    C: ConnectionTrait,
{
    let Some(template_id) = configuration::default_invoice_template_id(db).await? else {
        return Ok(None);
    };
    InvoiceTemplate::find_by_id(template_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether `template_id` is the current default.
pub async fn is_default_invoice_template(db: &DatabaseConnection, template_id: i64) -> Result<bool> {
    Ok(configuration::default_invoice_template_id(db).await? == Some(template_id))
}

/// Deletes a template that no invoice references, clearing the default pointer if needed.
#[instrument(skip(db))]
pub async fn delete_invoice_template(db: &DatabaseConnection, template_id: i64) -> Result<()> {
    let invoices = Invoice::find()
        .filter(invoice::Column::TemplateId.eq(template_id))
        .count(db)
        .await?;
    if invoices > 0 {
        return Err(Error::Protected {
            entity: "invoice template",
            id: template_id,
            dependents: format!("{invoices} invoice(s)"),
        });
    }

    let txn = db.begin().await?;
    if configuration::default_invoice_template_id(&txn).await? == Some(template_id) {
        configuration::set_default_invoice_template_id(&txn, None).await?;
    }
    let result = InvoiceTemplate::delete_by_id(template_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("invoice template", template_id));
    }
    txn.commit().await?;

    info!(template_id, "Deleted invoice template");
    Ok(())
}
