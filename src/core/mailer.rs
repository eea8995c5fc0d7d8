//! Invoice delivery by email.
//!
//! Messages are built with `lettre` from the active email settings and handed
//! to a [`MailTransport`]. [`SmtpMailer`] is the real transport; tests plug in
//! their own.

use crate::{
    core::{email_settings::get_active_email_settings, invoice::mark_invoice_emailed},
    entities::{Invoice, email_settings, invoice},
    errors::{Error, Result},
};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::fmt::{self, Write as _};
use std::path::Path;
use tracing::{info, instrument};

/// Something that can deliver a built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers `message`.
    async fn send(&self, message: Message) -> Result<()>;
}

/// SMTP transport configured from stored [`email_settings::Model`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Builds a transport: STARTTLS relay when TLS is on, plain SMTP otherwise.
    /// Credentials are only attached when a username is configured.
    pub fn from_settings(settings: &email_settings::Model) -> Result<Self> {
        let port = u16::try_from(settings.smtp_port)
            .map_err(|_| Error::validation("smtp_port", "Ensure this value is between 1 and 65535"))?;

        let builder = if settings.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
        };
        let mut builder = builder.port(port);
        if !settings.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.smtp_username.clone(),
                settings.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Builds a transport from the active email settings.
    pub async fn from_active_settings(db: &DatabaseConnection) -> Result<Self> {
        let settings = get_active_email_settings(db)
            .await?
            .ok_or(Error::NotConfigured {
                what: "email settings",
            })?;
        Self::from_settings(&settings)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<()> {
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Plain-text rendering of an invoice used as the email body.
pub fn render_invoice_text(invoice: &invoice::Model) -> Result<String> {
    let items = invoice.line_items()?;
    let mut text = String::new();
    write_invoice_text(&mut text, invoice, &items).map_err(|e| Error::Email {
        message: format!("Failed to render invoice {}: {e}", invoice.invoice_number),
    })?;
    Ok(text)
}

fn write_invoice_text(
    text: &mut String,
    invoice: &invoice::Model,
    items: &[invoice::LineItem],
) -> fmt::Result {
    writeln!(text, "{}", invoice.company_name)?;
    writeln!(text, "{}", invoice.company_address)?;
    if let Some(gstin) = &invoice.company_gstin {
        writeln!(text, "GSTIN: {gstin}")?;
    }
    writeln!(text, "PAN: {}", invoice.company_pan)?;
    writeln!(text)?;

    writeln!(text, "TAX INVOICE {}", invoice.invoice_number)?;
    writeln!(text, "Date: {}", invoice.invoice_date.format("%d %b %Y"))?;
    if let Some(due) = invoice.due_date {
        writeln!(text, "Due: {}", due.format("%d %b %Y"))?;
    }
    writeln!(text)?;

    writeln!(text, "Bill to:")?;
    writeln!(text, "{}", invoice.customer_name)?;
    writeln!(text, "{}", invoice.customer_address)?;
    writeln!(text, "{} | {}", invoice.customer_email, invoice.customer_phone)?;
    writeln!(text)?;

    for item in items {
        writeln!(
            text,
            "{} (HSN/SAC {}) x{} @ {} = {}",
            item.description, item.hsn_sac, item.qty, item.rate, item.amount
        )?;
    }
    writeln!(text)?;

    writeln!(text, "Subtotal: {}", invoice.subtotal)?;
    if invoice.discount_amount.paise() != 0 {
        writeln!(text, "Discount: -{}", invoice.discount_amount)?;
    }
    writeln!(text, "Taxable amount: {}", invoice.taxable_amount)?;
    for (label, rate, amount) in [
        ("CGST", invoice.cgst_rate, invoice.cgst_amount),
        ("SGST", invoice.sgst_rate, invoice.sgst_amount),
        ("IGST", invoice.igst_rate, invoice.igst_amount),
    ] {
        if amount.paise() != 0 {
            writeln!(text, "{label} @ {rate}: {amount}")?;
        }
    }
    writeln!(text, "Total: {}", invoice.total_amount)?;
    writeln!(text, "{}", invoice.amount_in_words)?;

    if !invoice.payment_terms.is_empty() {
        writeln!(text)?;
        writeln!(text, "{}", invoice.payment_terms)?;
    }
    Ok(())
}

/// Builds the invoice email, attaching the stored PDF when one is recorded.
pub async fn build_invoice_message(
    settings: &email_settings::Model,
    invoice: &invoice::Model,
) -> Result<Message> {
    let from = Mailbox::new(Some(settings.from_name.clone()), settings.from_email.parse()?);
    let to = Mailbox::new(Some(invoice.customer_name.clone()), invoice.customer_email.parse()?);
    let body = render_invoice_text(invoice)?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(format!(
            "Invoice {} from {}",
            invoice.invoice_number, invoice.company_name
        ));

    let Some(pdf_path) = &invoice.pdf_file else {
        return builder
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(Into::into);
    };

    let pdf = tokio::fs::read(pdf_path).await?;
    let filename = Path::new(pdf_path)
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| format!("{}.pdf", invoice.invoice_number), str::to_string);
    let pdf_type = ContentType::parse("application/pdf").map_err(|e| Error::Email {
        message: e.to_string(),
    })?;

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(filename).body(pdf, pdf_type)),
        )
        .map_err(Into::into)
}

/// Emails an invoice with the active settings and records `emailed_at`.
#[instrument(skip(db, transport))]
pub async fn send_invoice_email<T>(
    db: &DatabaseConnection,
    transport: &T,
    invoice_id: i64,
) -> Result<invoice::Model>
where
    T: MailTransport + ?Sized,
{
    let settings = get_active_email_settings(db)
        .await?
        .ok_or(Error::NotConfigured {
            what: "email settings",
        })?;
    let invoice = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("invoice", invoice_id))?;

    let message = build_invoice_message(&settings, &invoice).await?;
    transport.send(message).await?;

    let invoice = mark_invoice_emailed(db, invoice_id).await?;
    info!(
        invoice_number = %invoice.invoice_number,
        to = %invoice.customer_email,
        "Invoice emailed"
    );
    Ok(invoice)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::invoice::record_invoice_pdf;
    use crate::entities::InvoiceStatus;
    use crate::test_utils::*;
    use std::io::Write as _;
    use std::sync::Mutex;

    /// Keeps every message instead of delivering it.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> Result<()> {
            self.sent.lock().unwrap().push(message.formatted());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_render_invoice_text() -> Result<()> {
        let (_db, invoice) = setup_with_invoice().await?;
        let text = render_invoice_text(&invoice)?;

        assert!(text.contains("TAX INVOICE INV-2026-03-0001"));
        assert!(text.contains("HSN/SAC RUNFOCUS1MO"));
        assert!(text.contains("CGST @ 9.00%: ₹180.00"));
        assert!(text.contains("Total: ₹2360.00"));
        assert!(!text.contains("IGST"));
        assert!(text.contains(&invoice.amount_in_words));
        Ok(())
    }

    #[tokio::test]
    async fn test_render_invoice_text_optional_sections() -> Result<()> {
        let (_db, mut invoice) = setup_with_invoice().await?;
        invoice.payment_terms = String::new();
        invoice.due_date = None;

        let text = render_invoice_text(&invoice)?;
        assert!(!text.contains("Due:"));
        assert!(!text.contains("Discount:"));
        assert!(text.ends_with(&format!("{}\n", invoice.amount_in_words)));

        // Corrupt line items surface as a JSON error, not a partial body
        invoice.line_items = serde_json::json!({ "not": "a list" });
        assert!(matches!(
            render_invoice_text(&invoice).unwrap_err(),
            Error::Json(_)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_send_invoice_email_marks_sent() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        create_test_email_settings(&db, true).await?;
        let transport = RecordingTransport::default();

        let sent = send_invoice_email(&db, &transport, invoice.id).await?;
        assert_eq!(sent.status, InvoiceStatus::Sent);
        assert!(sent.emailed_at.is_some());

        let messages = transport.sent.lock().unwrap();
        assert_eq!(messages.len(), 1);
        let raw = String::from_utf8_lossy(&messages[0]);
        assert!(raw.contains("Subject: Invoice INV-2026-03-0001"));
        assert!(raw.contains(&invoice.customer_email));
        Ok(())
    }

    #[tokio::test]
    async fn test_send_without_active_settings() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let transport = RecordingTransport::default();

        let result = send_invoice_email(&db, &transport, invoice.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotConfigured { .. }));
        assert!(transport.sent.lock().unwrap().is_empty());

        // Nothing was recorded on the invoice
        let stored = Invoice::find_by_id(invoice.id).one(&db).await?.unwrap();
        assert!(stored.emailed_at.is_none());
        assert_eq!(stored.status, InvoiceStatus::Draft);
        Ok(())
    }

    #[tokio::test]
    async fn test_pdf_is_attached_when_recorded() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let settings = create_test_email_settings(&db, true).await?;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("INV-2026-03-0001.pdf");
        let mut file = std::fs::File::create(&path)?;
        file.write_all(b"%PDF-1.4 test")?;

        let invoice = record_invoice_pdf(&db, invoice.id, path.to_str().unwrap()).await?;
        let message = build_invoice_message(&settings, &invoice).await?;
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("INV-2026-03-0001.pdf"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_pdf_file_is_an_io_error() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let settings = create_test_email_settings(&db, true).await?;

        let invoice = record_invoice_pdf(&db, invoice.id, "/nonexistent/invoice.pdf").await?;
        let result = build_invoice_message(&settings, &invoice).await;
        assert!(matches!(result.unwrap_err(), Error::Io(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_smtp_mailer_from_settings() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = create_test_email_settings(&db, false).await?;
        assert!(SmtpMailer::from_settings(&settings).is_ok());

        let mut bad = settings;
        bad.smtp_port = 70_000;
        assert!(matches!(
            SmtpMailer::from_settings(&bad),
            Err(Error::Validation { field: "smtp_port", .. })
        ));
        Ok(())
    }
}
