//! Rust implementation of the weekly timetable placement engine.
//!
//! Assignments (course × teacher × class) are split into contiguous blocks and
//! placed onto a school week in two phases: a difficulty-first greedy pass and
//! a bounded repair pass that evicts blocking lessons. The result is a class
//! grid plus the blocks that could not be placed.

pub mod config;
pub mod error;
pub mod interner;
pub mod logging;
pub mod models;
pub mod timetable;

#[cfg(feature = "python")]
mod python;

pub use config::EngineConfig;
pub use error::TimetableError;
pub use models::{
    Assignment, BlockId, ClassId, Course, CourseId, LessonCell, OpenHour, ScheduledLesson,
    SchoolClass, SkipReason, SkippedAssignment, Teacher, TeacherId, TeacherOpenHour,
    TimetableInput, UnplacedRecord,
};
pub use timetable::{PlacementEngine, RepairStop, RunStats, ScheduleGrid, TimetableResult};

/// Build a timetable for `input` in one call.
///
/// Fails on an invalid config or when a teacher's demand exceeds their
/// available hours; blocks left unplaced are reported in the result.
pub fn generate_timetable(
    input: &TimetableInput,
    config: EngineConfig,
) -> Result<TimetableResult, TimetableError> {
    PlacementEngine::new(input, config)?.run()
}
