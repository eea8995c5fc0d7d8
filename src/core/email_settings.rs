//! Email settings business logic - outbound SMTP configuration.
//!
//! Any number of configurations may be stored; `active_configuration` names the
//! one used for sending.

use crate::{
    core::{configuration, validation},
    entities::{EmailProvider, EmailSettings, email_settings},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Editable settings fields, used for both create and update.
#[derive(Clone, Debug)]
pub struct EmailSettingsDetails {
    /// Provider kind
    pub provider: EmailProvider,
    /// SMTP host name
    pub smtp_host: String,
    /// SMTP port
    pub smtp_port: i32,
    /// Upgrade the connection with STARTTLS
    pub smtp_use_tls: bool,
    /// SMTP login
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// Make these the active settings (or stop them being active)
    pub is_active: bool,
}

impl Default for EmailSettingsDetails {
    fn default() -> Self {
        Self {
            provider: EmailProvider::Gmail,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_use_tls: true,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: String::new(),
            from_name: "TAILWIND Coaching".to_string(),
            is_active: true,
        }
    }
}

impl EmailSettingsDetails {
    fn validate(&self) -> Result<()> {
        validation::require_text("smtp_host", &self.smtp_host)?;
        validation::int_range("smtp_port", i64::from(self.smtp_port), 1, 65_535)?;
        validation::email("from_email", &self.from_email)?;
        validation::require_text("from_name", &self.from_name)
    }
}

/// Stores a mail configuration, optionally activating it.
#[instrument(skip(db, details), fields(host = %details.smtp_host))]
pub async fn create_email_settings(
    db: &DatabaseConnection,
    details: EmailSettingsDetails,
) -> Result<email_settings::Model> {
    details.validate()?;

    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();
    let is_active = details.is_active;

    let settings = email_settings::ActiveModel {
        provider: Set(details.provider),
        smtp_host: Set(details.smtp_host),
        smtp_port: Set(details.smtp_port),
        smtp_use_tls: Set(details.smtp_use_tls),
        smtp_username: Set(details.smtp_username),
        smtp_password: Set(details.smtp_password),
        from_email: Set(details.from_email),
        from_name: Set(details.from_name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if is_active {
        configuration::set_active_email_settings_id(&txn, Some(settings.id)).await?;
    }
    txn.commit().await?;

    info!(settings_id = settings.id, is_active, "Created email settings");
    Ok(settings)
}

/// Replaces a configuration's fields and applies its active flag.
#[instrument(skip(db, details))]
pub async fn update_email_settings(
    db: &DatabaseConnection,
    settings_id: i64,
    details: EmailSettingsDetails,
) -> Result<email_settings::Model> {
    details.validate()?;

    let txn = db.begin().await?;
    let existing = EmailSettings::find_by_id(settings_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("email settings", settings_id))?;

    let mut settings: email_settings::ActiveModel = existing.into();
    settings.provider = Set(details.provider);
    settings.smtp_host = Set(details.smtp_host);
    settings.smtp_port = Set(details.smtp_port);
    settings.smtp_use_tls = Set(details.smtp_use_tls);
    settings.smtp_username = Set(details.smtp_username);
    settings.smtp_password = Set(details.smtp_password);
    settings.from_email = Set(details.from_email);
    settings.from_name = Set(details.from_name);
    settings.updated_at = Set(chrono::Utc::now().naive_utc());
    let settings = settings.update(&txn).await?;

    let current = configuration::active_email_settings_id(&txn).await?;
    if details.is_active {
        configuration::set_active_email_settings_id(&txn, Some(settings_id)).await?;
    } else if current == Some(settings_id) {
        configuration::set_active_email_settings_id(&txn, None).await?;
    }
    txn.commit().await?;

    Ok(settings)
}

/// Makes an existing configuration the active one.
#[instrument(skip(db))]
pub async fn activate_email_settings(db: &DatabaseConnection, settings_id: i64) -> Result<()> {
    EmailSettings::find_by_id(settings_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("email settings", settings_id))?;
    configuration::set_active_email_settings_id(db, Some(settings_id)).await?;
    info!(settings_id, "Active email settings changed");
    Ok(())
}

/// Finds a configuration by id.
pub async fn get_email_settings(
    db: &DatabaseConnection,
    settings_id: i64,
) -> Result<Option<email_settings::Model>> {
    EmailSettings::find_by_id(settings_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The configuration used for sending, if one is active.
pub async fn get_active_email_settings(
    db: &DatabaseConnection,
) -> Result<Option<email_settings::Model>> {
    let Some(settings_id) = configuration::active_email_settings_id(db).await? else {
        return Ok(None);
    };
    get_email_settings(db, settings_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_defaults_point_at_gmail() {
        let details = EmailSettingsDetails::default();
        assert_eq!(details.provider, EmailProvider::Gmail);
        assert_eq!(details.smtp_host, "smtp.gmail.com");
        assert_eq!(details.smtp_port, 587);
        assert!(details.smtp_use_tls);
        assert_eq!(details.from_name, "TAILWIND Coaching");
        assert!(details.is_active);
    }

    #[tokio::test]
    async fn test_settings_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut details = email_settings_details(false);
        details.smtp_port = 0;
        let result = create_email_settings(&db, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "smtp_port", .. }
        ));

        let mut details = email_settings_details(false);
        details.from_email = "coach".to_string();
        let result = create_email_settings(&db, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "from_email", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_only_one_active_configuration() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_active_email_settings(&db).await?.is_none());

        let first = create_test_email_settings(&db, true).await?;
        let second = create_test_email_settings(&db, true).await?;
        assert_eq!(get_active_email_settings(&db).await?.unwrap().id, second.id);

        activate_email_settings(&db, first.id).await?;
        assert_eq!(get_active_email_settings(&db).await?.unwrap().id, first.id);

        update_email_settings(&db, first.id, email_settings_details(false)).await?;
        assert!(get_active_email_settings(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_activate_missing_settings() -> Result<()> {
        let db = setup_test_db().await?;
        let result = activate_email_settings(&db, 9).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
