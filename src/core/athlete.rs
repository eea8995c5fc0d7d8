//! Athlete business logic - the athlete directory and its login identities.
//!
//! Every athlete save also writes the athlete's email onto the linked user
//! account inside the same transaction, so the two never disagree.

use crate::{
    core::validation,
    entities::{Athlete, UserAccount, athlete, user_account},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Editable athlete fields, used for both create and update.
#[derive(Clone, Debug, Default)]
pub struct AthleteDetails {
    /// Display name
    pub name: String,
    /// Contact email; also becomes the account email
    pub email: String,
    /// Phone number
    pub contact_number: String,
    /// Billing address
    pub address: String,
    /// Bio, background, etc.
    pub profile: String,
    /// Goals
    pub goals: String,
    /// Initial fitness assessment
    pub fitness_evaluation: String,
}

impl AthleteDetails {
    fn validate(&self) -> Result<()> {
        validation::require_text("name", &self.name)?;
        validation::email("email", &self.email)?;
        validation::phone("contact_number", &self.contact_number)?;
        validation::require_text("address", &self.address)?;
        Ok(())
    }
}

/// Creates the login identity an athlete profile hangs off.
///
/// The username is trimmed before it is stored and compared, so `" asha "`
/// collides with an existing `asha` and fails with `Conflict`.
#[instrument(skip(db))]
pub async fn create_user_account(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
) -> Result<user_account::Model> {
    validation::require_text("username", username)?;
    validation::email("email", email)?;

    let taken = UserAccount::find()
        .filter(user_account::Column::Username.eq(username.trim()))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(Error::Conflict {
            message: format!("username '{}' is already taken", username.trim()),
        });
    }

    let account = user_account::ActiveModel {
        username: Set(username.trim().to_string()),
        email: Set(email.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    account.insert(db).await.map_err(Into::into)
}

/// Fails with `Conflict` when another athlete already uses `email`.
async fn ensure_email_free<C>(db: &C, email: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Athlete::find().filter(athlete::Column::Email.eq(email));
    if let Some(id) = except_id {
        query = query.filter(athlete::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(Error::Conflict {
            message: format!("an athlete with email '{email}' already exists"),
        });
    }
    Ok(())
}

/// Writes the athlete email onto the linked account.
async fn sync_account_email<C>(db: &C, user_id: i64, email: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut account: user_account::ActiveModel = UserAccount::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user account", user_id))?
        .into();
    account.email = Set(email.to_string());
    account.update(db).await?;
    Ok(())
}

/// Creates an athlete profile for an existing user account.
///
/// An account carries at most one profile and athlete emails are unique. Both
/// checks and the account email sync run in one transaction.
#[instrument(skip(db, details), fields(email = %details.email))]
pub async fn create_athlete(
    db: &DatabaseConnection,
    user_id: i64,
    details: AthleteDetails,
) -> Result<athlete::Model> {
    details.validate()?;

    let txn = db.begin().await?;

    UserAccount::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("user account", user_id))?;

    let linked = Athlete::find()
        .filter(athlete::Column::UserId.eq(user_id))
        .count(&txn)
        .await?;
    if linked > 0 {
        return Err(Error::Conflict {
            message: format!("user account {user_id} already has an athlete profile"),
        });
    }
    ensure_email_free(&txn, &details.email, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let athlete = athlete::ActiveModel {
        user_id: Set(user_id),
        name: Set(details.name.trim().to_string()),
        email: Set(details.email.clone()),
        contact_number: Set(details.contact_number),
        address: Set(details.address),
        profile: Set(details.profile),
        goals: Set(details.goals),
        fitness_evaluation: Set(details.fitness_evaluation),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    sync_account_email(&txn, user_id, &athlete.email).await?;
    txn.commit().await?;

    info!(athlete_id = athlete.id, "Created athlete");
    Ok(athlete)
}

/// Replaces an athlete's editable fields and re-syncs the account email.
#[instrument(skip(db, details))]
pub async fn update_athlete(
    db: &DatabaseConnection,
    athlete_id: i64,
    details: AthleteDetails,
) -> Result<athlete::Model> {
    details.validate()?;

    let txn = db.begin().await?;

    let existing = Athlete::find_by_id(athlete_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("athlete", athlete_id))?;
    ensure_email_free(&txn, &details.email, Some(athlete_id)).await?;

    let user_id = existing.user_id;
    let mut athlete: athlete::ActiveModel = existing.into();
    athlete.name = Set(details.name.trim().to_string());
    athlete.email = Set(details.email.clone());
    athlete.contact_number = Set(details.contact_number);
    athlete.address = Set(details.address);
    athlete.profile = Set(details.profile);
    athlete.goals = Set(details.goals);
    athlete.fitness_evaluation = Set(details.fitness_evaluation);
    athlete.updated_at = Set(chrono::Utc::now().naive_utc());
    let athlete = athlete.update(&txn).await?;

    sync_account_email(&txn, user_id, &athlete.email).await?;
    txn.commit().await?;

    Ok(athlete)
}

/// Finds an athlete by id.
pub async fn get_athlete(db: &DatabaseConnection, athlete_id: i64) -> Result<Option<athlete::Model>> {
    Athlete::find_by_id(athlete_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All athletes, ordered by name.
pub async fn list_athletes(db: &DatabaseConnection) -> Result<Vec<athlete::Model>> {
    Athlete::find()
        .order_by_asc(athlete::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Athletes whose name, email or contact number contains `term`.
pub async fn search_athletes(db: &DatabaseConnection, term: &str) -> Result<Vec<athlete::Model>> {
    let term = term.trim();
    Athlete::find()
        .filter(
            Condition::any()
                .add(athlete::Column::Name.contains(term))
                .add(athlete::Column::Email.contains(term))
                .add(athlete::Column::ContactNumber.contains(term)),
        )
        .order_by_asc(athlete::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an athlete together with everything that belongs to them.
///
/// Subscriptions, payments, invoices, workouts and completions go through the
/// foreign-key cascades. The user account and the invoice templates are kept.
#[instrument(skip(db))]
pub async fn delete_athlete(db: &DatabaseConnection, athlete_id: i64) -> Result<()> {
    let result = Athlete::delete_by_id(athlete_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("athlete", athlete_id));
    }
    info!(athlete_id, "Deleted athlete and dependent records");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{subscription, workout};
    use crate::entities::{CompletionQuality, Invoice, InvoiceTemplate, Payment, WorkoutCompletion};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_athlete_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut details = athlete_details("Asha", "asha@example.com");
        details.contact_number = "12-34".to_string();
        let result = create_athlete(&db, 1, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "contact_number", .. }
        ));

        let details = athlete_details("Asha", "not-an-email");
        let result = create_athlete(&db, 1, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "email", .. }
        ));

        let details = athlete_details("   ", "asha@example.com");
        let result = create_athlete(&db, 1, details).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_athlete_syncs_account_email() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_user_account(&db, "asha", "old@example.com").await?;

        let athlete = create_athlete(&db, account.id, athlete_details("Asha", "asha@example.com"))
            .await?;
        assert_eq!(athlete.user_id, account.id);

        let account = UserAccount::find_by_id(account.id).one(&db).await?.unwrap();
        assert_eq!(account.email, "asha@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_athlete_syncs_account_email() -> Result<()> {
        let db = setup_test_db().await?;
        let athlete = create_test_athlete(&db, "Ravi", "ravi@example.com").await?;

        let updated = update_athlete(&db, athlete.id, athlete_details("Ravi K", "ravi.k@example.com"))
            .await?;
        assert_eq!(updated.name, "Ravi K");

        let account = UserAccount::find_by_id(athlete.user_id).one(&db).await?.unwrap();
        assert_eq!(account.email, "ravi.k@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_athlete(&db, "Asha", "asha@example.com").await?;
        let account = create_user_account(&db, "other", "other@example.com").await?;

        let result = create_athlete(&db, account.id, athlete_details("Other", "asha@example.com")).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        // The failed write left the account untouched
        let account = UserAccount::find_by_id(account.id).one(&db).await?.unwrap();
        assert_eq!(account.email, "other@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_one_profile_per_account() -> Result<()> {
        let db = setup_test_db().await?;
        let athlete = create_test_athlete(&db, "Asha", "asha@example.com").await?;

        let result = create_athlete(&db, athlete.user_id, athlete_details("Twin", "twin@example.com")).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_search_athletes() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_athlete(&db, "Zoya", "zoya@example.com").await?;
        create_test_athlete(&db, "Arjun", "arjun@example.com").await?;

        let all = list_athletes(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Arjun");
        assert_eq!(all[1].name, "Zoya");

        let found = search_athletes(&db, "zoya@").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Zoya");

        assert!(search_athletes(&db, "nobody").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_athlete_cascades() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let payment = Payment::find_by_id(invoice.payment_id).one(&db).await?.unwrap();
        let subscription = subscription::get_subscription(&db, payment.subscription_id)
            .await?
            .unwrap();
        let athlete_id = subscription.athlete_id;
        let user_id = get_athlete(&db, athlete_id).await?.unwrap().user_id;

        let planned = create_test_workout(&db, athlete_id, date(2026, 3, 2)).await?;
        let completion = workout::record_completion(
            &db,
            planned.id,
            workout::CompletionDetails {
                athlete_link: None,
                actual_distance: Some(8.1),
                actual_duration: Some(49),
                actual_tss: None,
                completion_quality: CompletionQuality::Good,
                actual_date: None,
                athlete_comments: String::new(),
            },
        )
        .await?;

        delete_athlete(&db, athlete_id).await?;

        assert!(get_athlete(&db, athlete_id).await?.is_none());
        assert!(
            subscription::get_subscription(&db, subscription.id)
                .await?
                .is_none()
        );
        assert!(Payment::find_by_id(payment.id).one(&db).await?.is_none());
        assert!(Invoice::find_by_id(invoice.id).one(&db).await?.is_none());
        assert!(
            workout::list_workouts_for_athlete(&db, athlete_id)
                .await?
                .is_empty()
        );
        assert!(
            WorkoutCompletion::find_by_id(completion.id)
                .one(&db)
                .await?
                .is_none()
        );

        // The login account and the template stay behind
        assert!(UserAccount::find_by_id(user_id).one(&db).await?.is_some());
        assert!(InvoiceTemplate::find_by_id(invoice.template_id).one(&db).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        create_user_account(&db, "asha", "asha@example.com").await?;

        let result = create_user_account(&db, "  asha ", "asha.rao@example.com").await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        assert_eq!(UserAccount::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_athlete() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_athlete(&db, 404).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
