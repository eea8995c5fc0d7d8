//! Single-row active configuration: default invoice template and active email settings.
//!
//! Both pointers are written with one upsert on the fixed primary key, so there is
//! never more than one default template or one active email configuration.

use crate::{
    entities::{ActiveConfiguration, active_configuration},
    errors::Result,
};
use sea_orm::{ConnectionTrait, EntityTrait, Set, sea_query::OnConflict};

/// Reads the configuration row, if it has been written yet.
pub async fn get_active_configuration<C>(db: &C) -> Result<Option<active_configuration::Model>>
where
    C: ConnectionTrait,
{
    ActiveConfiguration::find_by_id(active_configuration::SINGLETON_ID)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Points the default invoice template at `template_id` (or clears it with `None`).
pub async fn set_default_invoice_template_id<C>(db: &C, template_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = active_configuration::ActiveModel {
        id: Set(active_configuration::SINGLETON_ID),
        default_invoice_template_id: Set(template_id),
        ..Default::default()
    };
    ActiveConfiguration::insert(row)
        .on_conflict(
            OnConflict::column(active_configuration::Column::Id)
                .update_column(active_configuration::Column::DefaultInvoiceTemplateId)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Points the active email settings at `settings_id` (or clears it with `None`).
pub async fn set_active_email_settings_id<C>(db: &C, settings_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = active_configuration::ActiveModel {
        id: Set(active_configuration::SINGLETON_ID),
        active_email_settings_id: Set(settings_id),
        ..Default::default()
    };
    ActiveConfiguration::insert(row)
        .on_conflict(
            OnConflict::column(active_configuration::Column::Id)
                .update_column(active_configuration::Column::ActiveEmailSettingsId)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Id of the default invoice template.
pub async fn default_invoice_template_id<C>(db: &C) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    Ok(get_active_configuration(db)
        .await?
        .and_then(|config| config.default_invoice_template_id))
}

/// Id of the active email settings.
pub async fn active_email_settings_id<C>(db: &C) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    Ok(get_active_configuration(db)
        .await?
        .and_then(|config| config.active_email_settings_id))
}
