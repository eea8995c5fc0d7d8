//! Email settings entity - outbound mail provider configuration.
//!
//! Several rows may exist; the one in use is referenced from
//! `active_configuration`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mail provider kind
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailProvider {
    /// Gmail with an app password
    #[sea_orm(string_value = "GMAIL")]
    Gmail,
    /// Generic SMTP relay
    #[sea_orm(string_value = "SMTP")]
    Smtp,
    /// `SendGrid` SMTP relay
    #[sea_orm(string_value = "SENDGRID")]
    Sendgrid,
    /// Mailgun SMTP relay
    #[sea_orm(string_value = "MAILGUN")]
    Mailgun,
    /// Amazon SES SMTP interface
    #[sea_orm(string_value = "SES")]
    Ses,
    /// Anything else
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Email settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Provider kind
    pub provider: EmailProvider,
    /// SMTP host name
    pub smtp_host: String,
    /// SMTP port
    pub smtp_port: i32,
    /// Whether to upgrade the connection with STARTTLS
    pub smtp_use_tls: bool,
    /// SMTP login
    pub smtp_username: String,
    /// SMTP password (app password for Gmail)
    #[serde(skip_serializing)]
    pub smtp_password: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// When the settings were created
    pub created_at: DateTime,
    /// When the settings were last modified
    pub updated_at: DateTime,
}

/// `EmailSettings` is only referenced from `active_configuration`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
