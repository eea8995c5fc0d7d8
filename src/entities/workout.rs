//! Workout entity - a training session assigned to an athlete.
//!
//! Unique per (athlete, date, workout type). Overdue is derived on read:
//! still upcoming with the date in the past.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the workout stands
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutStatus {
    /// Scheduled, not yet done
    #[sea_orm(string_value = "UPCOMING")]
    Upcoming,
    /// Done
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Deliberately not done
    #[sea_orm(string_value = "SKIPPED")]
    Skipped,
    /// Moved to another date
    #[sea_orm(string_value = "RESCHEDULED")]
    Rescheduled,
}

/// Kind of session
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutType {
    /// Easy run
    #[sea_orm(string_value = "EASY")]
    Easy,
    /// Tempo run
    #[sea_orm(string_value = "TEMPO")]
    Tempo,
    /// Intervals
    #[sea_orm(string_value = "INTERVALS")]
    Intervals,
    /// Long run
    #[sea_orm(string_value = "LONG_RUN")]
    LongRun,
    /// Recovery run
    #[sea_orm(string_value = "RECOVERY")]
    Recovery,
    /// Speed work
    #[sea_orm(string_value = "SPEED_WORK")]
    SpeedWork,
    /// Hill repeats
    #[sea_orm(string_value = "HILL_REPEATS")]
    HillRepeats,
    /// Fartlek
    #[sea_orm(string_value = "FARTLEK")]
    Fartlek,
    /// Bike
    #[sea_orm(string_value = "BIKE")]
    Bike,
    /// Swim
    #[sea_orm(string_value = "SWIM")]
    Swim,
    /// Bike-to-run brick workout
    #[sea_orm(string_value = "BRICK")]
    Brick,
    /// Rest day
    #[sea_orm(string_value = "REST")]
    Rest,
    /// Cross training
    #[sea_orm(string_value = "CROSS_TRAINING")]
    CrossTraining,
}

/// Workout database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workouts")]
pub struct Model {
    /// Unique identifier for the workout
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Athlete the workout is assigned to
    pub athlete_id: i64,
    /// Scheduled date
    pub date: Date,
    /// Kind of session
    pub workout_type: WorkoutType,
    /// Short title
    pub title: String,
    /// Workout plan details
    pub description: String,
    /// Target distance in kilometers
    pub target_distance: Option<f64>,
    /// Target duration in minutes
    pub target_duration: Option<i32>,
    /// Target Training Stress Score
    pub target_tss: Option<i32>,
    /// Where the workout stands
    pub status: WorkoutStatus,
    /// First scheduled date, kept when the workout is rescheduled
    pub original_date: Option<Date>,
    /// Notes from the coach
    pub coach_notes: String,
    /// When the workout was created
    pub created_at: DateTime,
    /// When the workout was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Still upcoming with a date strictly before `today`.
    #[must_use]
    pub fn is_overdue_on(&self, today: Date) -> bool {
        self.status == WorkoutStatus::Upcoming && self.date < today
    }

    /// [`Model::is_overdue_on`] evaluated against today's UTC date.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }
}

/// Defines relationships between Workout and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each workout belongs to one athlete; removed with the athlete
    #[sea_orm(
        belongs_to = "super::athlete::Entity",
        from = "Column::AthleteId",
        to = "super::athlete::Column::Id",
        on_delete = "Cascade"
    )]
    Athlete,
    /// A workout has at most one completion record
    #[sea_orm(has_one = "super::workout_completion::Entity")]
    Completion,
}

impl Related<super::athlete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl Related<super::workout_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
