//! Workout completion entity - the athlete's reported outcome for a workout.
//!
//! At most one per workout. Saving it through `core::workout::record_completion`
//! also moves the parent workout to `COMPLETED` unless the quality is
//! `INCOMPLETE`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How well the session went
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionQuality {
    /// Excellent
    #[sea_orm(string_value = "EXCELLENT")]
    Excellent,
    /// Good
    #[sea_orm(string_value = "GOOD")]
    Good,
    /// Satisfactory
    #[sea_orm(string_value = "SATISFACTORY")]
    Satisfactory,
    /// Finished but struggled
    #[sea_orm(string_value = "STRUGGLED")]
    Struggled,
    /// Not finished
    #[sea_orm(string_value = "INCOMPLETE")]
    Incomplete,
}

/// Workout completion database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_completions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Workout this completion belongs to
    #[sea_orm(unique)]
    pub workout_id: i64,
    /// Strava/Garmin activity link
    pub athlete_link: Option<String>,
    /// Distance covered in kilometers
    pub actual_distance: Option<f64>,
    /// Duration in minutes
    pub actual_duration: Option<i32>,
    /// Training Stress Score achieved
    pub actual_tss: Option<i32>,
    /// Reported quality
    pub completion_quality: CompletionQuality,
    /// Day it was actually done
    pub actual_date: Option<Date>,
    /// Athlete's comments
    pub athlete_comments: String,
    /// Coach's feedback
    pub coach_feedback: String,
    /// When the coach reviewed it
    pub reviewed_at: Option<DateTime>,
    /// When the completion was created
    pub created_at: DateTime,
    /// When the completion was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `WorkoutCompletion` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each completion belongs to one workout
    #[sea_orm(
        belongs_to = "super::workout::Entity",
        from = "Column::WorkoutId",
        to = "super::workout::Column::Id",
        on_delete = "Cascade"
    )]
    Workout,
}

impl Related<super::workout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
