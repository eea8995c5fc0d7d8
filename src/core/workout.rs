//! Workout business logic - training schedule and reported completions.
//!
//! An athlete has at most one workout of a given type per day. Completions are
//! one-to-one with workouts; recording one and moving the workout to
//! `COMPLETED` happen in a single transaction.

use crate::{
    core::validation,
    entities::{
        Athlete, CompletionQuality, Workout, WorkoutCompletion, WorkoutStatus, WorkoutType,
        workout, workout_completion,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, TryIntoModel, prelude::*};
use tracing::{debug, info, instrument};

/// Editable workout fields, used for both create and update.
#[derive(Clone, Debug)]
pub struct WorkoutDetails {
    /// Scheduled date
    pub date: Date,
    /// Kind of session
    pub workout_type: WorkoutType,
    /// Short title
    pub title: String,
    /// Plan details
    pub description: String,
    /// Target distance in kilometers
    pub target_distance: Option<f64>,
    /// Target duration in minutes
    pub target_duration: Option<i32>,
    /// Target Training Stress Score
    pub target_tss: Option<i32>,
    /// Notes from the coach
    pub coach_notes: String,
}

impl WorkoutDetails {
    fn validate(&self) -> Result<()> {
        validation::require_text("title", &self.title)?;
        validation::non_negative("target_distance", self.target_distance)?;
        non_negative_int("target_duration", self.target_duration)?;
        non_negative_int("target_tss", self.target_tss)
    }
}

/// What the athlete reports after a session.
#[derive(Clone, Debug)]
pub struct CompletionDetails {
    /// Strava/Garmin activity link
    pub athlete_link: Option<String>,
    /// Distance covered in kilometers
    pub actual_distance: Option<f64>,
    /// Duration in minutes
    pub actual_duration: Option<i32>,
    /// Training Stress Score achieved
    pub actual_tss: Option<i32>,
    /// How it went
    pub completion_quality: CompletionQuality,
    /// Day it was actually done
    pub actual_date: Option<Date>,
    /// Athlete's comments
    pub athlete_comments: String,
}

impl CompletionDetails {
    fn validate(&self) -> Result<()> {
        validation::optional("athlete_link", self.athlete_link.as_deref(), validation::url)?;
        validation::non_negative("actual_distance", self.actual_distance)?;
        non_negative_int("actual_duration", self.actual_duration)?;
        non_negative_int("actual_tss", self.actual_tss)
    }
}

fn non_negative_int(field: &'static str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) => validation::int_range(field, i64::from(v), 0, i64::from(i32::MAX)),
        None => Ok(()),
    }
}

/// Fails with `Conflict` when the athlete already has this workout type on `date`.
async fn ensure_slot_free<C>(
    db: &C,
    athlete_id: i64,
    date: Date,
    workout_type: WorkoutType,
    except_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Workout::find()
        .filter(workout::Column::AthleteId.eq(athlete_id))
        .filter(workout::Column::Date.eq(date))
        .filter(workout::Column::WorkoutType.eq(workout_type));
    if let Some(id) = except_id {
        query = query.filter(workout::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(Error::Conflict {
            message: format!("athlete {athlete_id} already has a {workout_type:?} workout on {date}"),
        });
    }
    Ok(())
}

async fn find_workout<C>(db: &C, workout_id: i64) -> Result<workout::Model>
where
    C: ConnectionTrait,
{
    Workout::find_by_id(workout_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("workout", workout_id))
}

/// Schedules a workout for an athlete. It starts `UPCOMING`.
#[instrument(skip(db, details), fields(date = %details.date))]
pub async fn create_workout(
    db: &DatabaseConnection,
    athlete_id: i64,
    details: WorkoutDetails,
) -> Result<workout::Model> {
    details.validate()?;

    Athlete::find_by_id(athlete_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("athlete", athlete_id))?;
    ensure_slot_free(db, athlete_id, details.date, details.workout_type, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let workout = workout::ActiveModel {
        athlete_id: Set(athlete_id),
        date: Set(details.date),
        workout_type: Set(details.workout_type),
        title: Set(details.title.trim().to_string()),
        description: Set(details.description),
        target_distance: Set(details.target_distance),
        target_duration: Set(details.target_duration),
        target_tss: Set(details.target_tss),
        status: Set(WorkoutStatus::Upcoming),
        original_date: Set(None),
        coach_notes: Set(details.coach_notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(workout_id = workout.id, "Created workout");
    Ok(workout)
}

/// Replaces a workout's plan fields. Status and original date are untouched.
#[instrument(skip(db, details))]
pub async fn update_workout(
    db: &DatabaseConnection,
    workout_id: i64,
    details: WorkoutDetails,
) -> Result<workout::Model> {
    details.validate()?;

    let existing = find_workout(db, workout_id).await?;
    ensure_slot_free(
        db,
        existing.athlete_id,
        details.date,
        details.workout_type,
        Some(workout_id),
    )
    .await?;

    let mut workout: workout::ActiveModel = existing.into();
    workout.date = Set(details.date);
    workout.workout_type = Set(details.workout_type);
    workout.title = Set(details.title.trim().to_string());
    workout.description = Set(details.description);
    workout.target_distance = Set(details.target_distance);
    workout.target_duration = Set(details.target_duration);
    workout.target_tss = Set(details.target_tss);
    workout.coach_notes = Set(details.coach_notes);
    workout.updated_at = Set(chrono::Utc::now().naive_utc());

    workout.update(db).await.map_err(Into::into)
}

/// Moves a workout to `new_date`, remembering the first scheduled date.
///
/// Completed and skipped workouts cannot be rescheduled.
#[instrument(skip(db))]
pub async fn reschedule_workout(
    db: &DatabaseConnection,
    workout_id: i64,
    new_date: Date,
) -> Result<workout::Model> {
    let existing = find_workout(db, workout_id).await?;
    if matches!(existing.status, WorkoutStatus::Completed | WorkoutStatus::Skipped) {
        return Err(Error::InvalidTransition {
            entity: "workout",
            from: format!("{:?}", existing.status),
            to: format!("{:?}", WorkoutStatus::Rescheduled),
        });
    }
    ensure_slot_free(
        db,
        existing.athlete_id,
        new_date,
        existing.workout_type,
        Some(workout_id),
    )
    .await?;

    let original_date = existing.original_date.unwrap_or(existing.date);
    let mut workout: workout::ActiveModel = existing.into();
    workout.original_date = Set(Some(original_date));
    workout.date = Set(new_date);
    workout.status = Set(WorkoutStatus::Rescheduled);
    workout.updated_at = Set(chrono::Utc::now().naive_utc());

    let workout = workout.update(db).await?;
    info!(workout_id, %original_date, %new_date, "Rescheduled workout");
    Ok(workout)
}

/// Marks a workout as deliberately skipped. Completed workouts stay completed.
#[instrument(skip(db))]
pub async fn skip_workout(db: &DatabaseConnection, workout_id: i64) -> Result<workout::Model> {
    let existing = find_workout(db, workout_id).await?;
    if existing.status == WorkoutStatus::Completed {
        return Err(Error::InvalidTransition {
            entity: "workout",
            from: format!("{:?}", existing.status),
            to: format!("{:?}", WorkoutStatus::Skipped),
        });
    }

    let mut workout: workout::ActiveModel = existing.into();
    workout.status = Set(WorkoutStatus::Skipped);
    workout.updated_at = Set(chrono::Utc::now().naive_utc());
    workout.update(db).await.map_err(Into::into)
}

/// Finds a workout by id.
pub async fn get_workout(db: &DatabaseConnection, workout_id: i64) -> Result<Option<workout::Model>> {
    Workout::find_by_id(workout_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// An athlete's workouts, newest date first.
pub async fn list_workouts_for_athlete(
    db: &DatabaseConnection,
    athlete_id: i64,
) -> Result<Vec<workout::Model>> {
    Workout::find()
        .filter(workout::Column::AthleteId.eq(athlete_id))
        .order_by_desc(workout::Column::Date)
        .order_by_asc(workout::Column::WorkoutType)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Upcoming workouts dated before `today`, oldest first.
pub async fn list_overdue_workouts(
    db: &DatabaseConnection,
    today: Date,
) -> Result<Vec<workout::Model>> {
    Workout::find()
        .filter(workout::Column::Status.eq(WorkoutStatus::Upcoming))
        .filter(workout::Column::Date.lt(today))
        .order_by_asc(workout::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates or replaces the completion of a workout.
///
/// Any quality other than `INCOMPLETE` also moves the workout to `COMPLETED`;
/// both writes commit together. Coach feedback on a replaced completion is kept.
#[instrument(skip(db, details), fields(quality = ?details.completion_quality))]
pub async fn record_completion(
    db: &DatabaseConnection,
    workout_id: i64,
    details: CompletionDetails,
) -> Result<workout_completion::Model> {
    details.validate()?;

    let txn = db.begin().await?;
    let workout = find_workout(&txn, workout_id).await?;
    let existing = WorkoutCompletion::find()
        .filter(workout_completion::Column::WorkoutId.eq(workout_id))
        .one(&txn)
        .await?;

    let now = chrono::Utc::now().naive_utc();
    let quality = details.completion_quality;
    let mut completion: workout_completion::ActiveModel = match existing {
        Some(model) => model.into(),
        None => workout_completion::ActiveModel {
            workout_id: Set(workout_id),
            coach_feedback: Set(String::new()),
            reviewed_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        },
    };
    completion.athlete_link = Set(details.athlete_link);
    completion.actual_distance = Set(details.actual_distance);
    completion.actual_duration = Set(details.actual_duration);
    completion.actual_tss = Set(details.actual_tss);
    completion.completion_quality = Set(quality);
    completion.actual_date = Set(details.actual_date);
    completion.athlete_comments = Set(details.athlete_comments);
    completion.updated_at = Set(now);
    let completion = completion.save(&txn).await?.try_into_model()?;

    if quality != CompletionQuality::Incomplete && workout.status != WorkoutStatus::Completed {
        let mut workout: workout::ActiveModel = workout.into();
        workout.status = Set(WorkoutStatus::Completed);
        workout.updated_at = Set(now);
        workout.update(&txn).await?;
    }

    txn.commit().await?;
    info!(workout_id, completion_id = completion.id, "Recorded workout completion");
    Ok(completion)
}

/// Stores the coach's feedback on a completion and stamps `reviewed_at`.
#[instrument(skip(db, feedback))]
pub async fn review_completion(
    db: &DatabaseConnection,
    completion_id: i64,
    feedback: &str,
) -> Result<workout_completion::Model> {
    let existing = WorkoutCompletion::find_by_id(completion_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("workout completion", completion_id))?;

    let now = chrono::Utc::now().naive_utc();
    let mut completion: workout_completion::ActiveModel = existing.into();
    completion.coach_feedback = Set(feedback.to_string());
    completion.reviewed_at = Set(Some(now));
    completion.updated_at = Set(now);
    completion.update(db).await.map_err(Into::into)
}

/// The completion recorded for a workout, if any.
pub async fn get_completion_for_workout(
    db: &DatabaseConnection,
    workout_id: i64,
) -> Result<Option<workout_completion::Model>> {
    WorkoutCompletion::find()
        .filter(workout_completion::Column::WorkoutId.eq(workout_id))
        .one(db)
        .await
        .map_err(Into::into)
}
