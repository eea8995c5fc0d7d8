/// Athlete directory and linked user accounts
pub mod athlete;
/// Billing plan catalog
pub mod billing_plan;
/// Single-row pointers to the default template and active email settings
pub mod configuration;
/// Outbound email settings
pub mod email_settings;
/// Invoice generation and bookkeeping
pub mod invoice;
/// Invoice templates
pub mod invoice_template;
/// Invoice delivery over SMTP
pub mod mailer;
/// Fixed-point money and percentages
pub mod money;
/// Payments owed and collected
pub mod payment;
/// Tax codes, discounts, GST and amounts in words
pub mod pricing;
/// Back-office summary
pub mod report;
/// Athlete subscriptions
pub mod subscription;
/// Field validation rules
pub mod validation;
/// Training schedule and completions
pub mod workout;
