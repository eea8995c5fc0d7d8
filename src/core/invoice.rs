//! Invoice business logic - generating tax invoices from payments.
//!
//! Generation runs in one transaction: it snapshots the template, customer and
//! plan, computes the GST breakdown and allocates the next number from the
//! per-month counter. After that only status, PDF and email bookkeeping change.

use crate::{
    core::{
        invoice_template::get_default_invoice_template,
        pricing::{TaxSupply, amount_in_words, gst_breakdown},
    },
    entities::{
        Athlete, AthleteSubscription, BillingPlan, Invoice, InvoiceSequence, InvoiceStatus,
        InvoiceTemplate, LineItem, Payment, invoice, invoice_sequence,
    },
    errors::{Error, Result},
};
use chrono::Datelike;
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{info, instrument};

/// What to invoice and how.
#[derive(Clone, Debug)]
pub struct GenerateInvoice {
    /// Payment being invoiced
    pub payment_id: i64,
    /// Template to use; `None` uses the default template
    pub template_id: Option<i64>,
    /// Date printed on the invoice; picks the number sequence
    pub invoice_date: Date,
    /// Payment due date printed on the invoice
    pub due_date: Option<Date>,
    /// Whether CGST+SGST or IGST applies
    pub supply: TaxSupply,
    /// Payment terms text
    pub payment_terms: String,
}

/// Formats an invoice number, e.g. `INV-2026-03-0007`.
#[must_use]
pub fn format_invoice_number(year: i32, month: u32, sequence: i32) -> String {
    format!("INV-{year}-{month:02}-{sequence:04}")
}

/// Takes the next number in the (year, month) sequence of `invoice_date`.
///
/// The counter row is created or incremented by a single upsert, so two
/// callers never read the same value. Must run inside the invoice transaction
/// so a rolled-back invoice also returns its number.
pub async fn allocate_invoice_number<C>(db: &C, invoice_date: Date) -> Result<String>
where
    C: ConnectionTrait,
{
    let year = invoice_date.year();
    let month = invoice_date.month();
    #[allow(clippy::cast_possible_wrap)] // 1..=12
    let month_key = month as i32;

    let first = invoice_sequence::ActiveModel {
        year: Set(year),
        month: Set(month_key),
        last_value: Set(1),
    };
    InvoiceSequence::insert(first)
        .on_conflict(
            OnConflict::columns([
                invoice_sequence::Column::Year,
                invoice_sequence::Column::Month,
            ])
            .value(
                invoice_sequence::Column::LastValue,
                Expr::col(invoice_sequence::Column::LastValue).add(1),
            )
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let sequence = InvoiceSequence::find_by_id((year, month_key))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("invoice sequence", format!("{year}-{month:02}")))?;

    Ok(format_invoice_number(year, month, sequence.last_value))
}

/// Generates the invoice for a payment.
///
/// Fails with `Conflict` if the payment already has an invoice and with
/// `NotConfigured` if no template was given and no default is set. The payment
/// amount must equal the subscription's final price, otherwise the call fails
/// with `Validation` on `amount`.
#[instrument(skip(db, request), fields(payment_id = request.payment_id))]
pub async fn generate_invoice(
    db: &DatabaseConnection,
    request: GenerateInvoice,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;

    let payment = Payment::find_by_id(request.payment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("payment", request.payment_id))?;

    if let Some(existing) = Invoice::find()
        .filter(invoice::Column::PaymentId.eq(payment.id))
        .one(&txn)
        .await?
    {
        return Err(Error::Conflict {
            message: format!(
                "payment {} is already invoiced as {}",
                payment.id, existing.invoice_number
            ),
        });
    }

    let template = match request.template_id {
        Some(template_id) => InvoiceTemplate::find_by_id(template_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("invoice template", template_id))?,
        None => get_default_invoice_template(&txn)
            .await?
            .ok_or(Error::NotConfigured {
                what: "default invoice template",
            })?,
    };

    let subscription = AthleteSubscription::find_by_id(payment.subscription_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("subscription", payment.subscription_id))?;
    // The invoice documents one full billing period at the subscription price
    if payment.amount != subscription.final_price {
        return Err(Error::validation(
            "amount",
            format!(
                "payment {} is for {} but the subscription bills {}",
                payment.id, payment.amount, subscription.final_price
            ),
        ));
    }
    let plan = BillingPlan::find_by_id(subscription.billing_plan_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("billing plan", subscription.billing_plan_id))?;
    let athlete = Athlete::find_by_id(subscription.athlete_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("athlete", subscription.athlete_id))?;

    let line = LineItem {
        description: format!("{} - {}", plan.name, payment.months_covered),
        hsn_sac: plan.hsn_sac.clone(),
        qty: 1,
        rate: plan.base_price,
        amount: plan.base_price,
    };
    let subtotal = line.amount;
    let taxable = subscription.final_price;
    let tax = gst_breakdown(taxable, template.gst_rate, template.include_gst, request.supply);
    let total = taxable + tax.total_tax();

    let invoice_number = allocate_invoice_number(&txn, request.invoice_date).await?;
    let now = chrono::Utc::now().naive_utc();

    let invoice = invoice::ActiveModel {
        payment_id: Set(payment.id),
        template_id: Set(template.id),
        invoice_number: Set(invoice_number),
        invoice_date: Set(request.invoice_date),
        due_date: Set(request.due_date),
        company_name: Set(template.company_name),
        company_address: Set(template.company_address),
        company_gstin: Set(template.company_gstin),
        company_pan: Set(template.company_pan),
        company_email: Set(template.company_email),
        company_phone: Set(template.company_phone),
        customer_name: Set(athlete.name),
        customer_email: Set(athlete.email),
        customer_phone: Set(athlete.contact_number),
        customer_address: Set(athlete.address),
        line_items: Set(serde_json::to_value(vec![line])?),
        subtotal: Set(subtotal),
        discount_percent: Set(subscription.custom_discount_percent),
        discount_amount: Set(subtotal - taxable),
        taxable_amount: Set(taxable),
        cgst_rate: Set(tax.cgst_rate),
        cgst_amount: Set(tax.cgst_amount),
        sgst_rate: Set(tax.sgst_rate),
        sgst_amount: Set(tax.sgst_amount),
        igst_rate: Set(tax.igst_rate),
        igst_amount: Set(tax.igst_amount),
        total_amount: Set(total),
        amount_in_words: Set(amount_in_words(total)),
        payment_terms: Set(request.payment_terms),
        status: Set(InvoiceStatus::Draft),
        pdf_file: Set(None),
        pdf_generated_at: Set(None),
        emailed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        invoice_id = invoice.id,
        invoice_number = %invoice.invoice_number,
        total = %invoice.total_amount,
        "Generated invoice"
    );
    Ok(invoice)
}

async fn find_invoice<C>(db: &C, invoice_id: i64) -> Result<invoice::Model>
where
    C: ConnectionTrait,
{
    Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("invoice", invoice_id))
}

/// Sets an invoice's status.
#[instrument(skip(db))]
pub async fn update_invoice_status(
    db: &DatabaseConnection,
    invoice_id: i64,
    status: InvoiceStatus,
) -> Result<invoice::Model> {
    let mut invoice: invoice::ActiveModel = find_invoice(db, invoice_id).await?.into();
    invoice.status = Set(status);
    invoice.updated_at = Set(chrono::Utc::now().naive_utc());
    invoice.update(db).await.map_err(Into::into)
}

/// Records where the rendered PDF was stored.
#[instrument(skip(db))]
pub async fn record_invoice_pdf(
    db: &DatabaseConnection,
    invoice_id: i64,
    pdf_path: &str,
) -> Result<invoice::Model> {
    let now = chrono::Utc::now().naive_utc();
    let mut invoice: invoice::ActiveModel = find_invoice(db, invoice_id).await?.into();
    invoice.pdf_file = Set(Some(pdf_path.to_string()));
    invoice.pdf_generated_at = Set(Some(now));
    invoice.updated_at = Set(now);
    invoice.update(db).await.map_err(Into::into)
}

/// Stamps `emailed_at`; a draft becomes `SENT`.
#[instrument(skip(db))]
pub async fn mark_invoice_emailed<C>(db: &C, invoice_id: i64) -> Result<invoice::Model>
where
    C: ConnectionTrait,
{
    let existing = find_invoice(db, invoice_id).await?;
    let was_draft = existing.status == InvoiceStatus::Draft;
    let now = chrono::Utc::now().naive_utc();

    let mut invoice: invoice::ActiveModel = existing.into();
    invoice.emailed_at = Set(Some(now));
    if was_draft {
        invoice.status = Set(InvoiceStatus::Sent);
    }
    invoice.updated_at = Set(now);
    invoice.update(db).await.map_err(Into::into)
}

/// Finds an invoice by id.
pub async fn get_invoice(db: &DatabaseConnection, invoice_id: i64) -> Result<Option<invoice::Model>> {
    Invoice::find_by_id(invoice_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an invoice by its number.
pub async fn get_invoice_by_number(
    db: &DatabaseConnection,
    invoice_number: &str,
) -> Result<Option<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::InvoiceNumber.eq(invoice_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// The invoice generated for a payment, if any.
pub async fn get_invoice_for_payment(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Option<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::PaymentId.eq(payment_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All invoices, newest invoice date first.
pub async fn list_invoices(db: &DatabaseConnection) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .order_by_desc(invoice::Column::InvoiceDate)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
