//! Weekly timetable placement.
//!
//! Data flows through the submodules in this order:
//! - `calendar`, `availability`: the open-hours domain and declared availability
//! - `blocks`: assignments split into contiguous blocks
//! - `state`: the live schedule with derived remaining capacity
//! - `ranking`, `conflict`: heuristics used by the two phases
//! - `engine`: greedy pass plus repair
//! - `export`: the result handed back to callers

pub mod availability;
pub mod blocks;
pub mod calendar;
pub mod conflict;
pub mod engine;
pub mod export;
pub mod ranking;
pub mod state;

pub use availability::{AvailabilityGrid, DeclaredAvailability, OpenHours};
pub use blocks::{decompose, parse_distribution, BlockIdx, BlockSet, CourseBlock};
pub use calendar::{Calendar, SlotIdx, TimeSlot, WEEK};
pub use conflict::{check_block_conflict, evict_blocks, find_conflicting_blocks};
pub use engine::{PlacementEngine, RepairProgress, SwapOutcome};
pub use export::{
    ClassSchedule, DaySchedule, HourCell, RepairStop, RunStats, ScheduleGrid, TeacherLesson,
    TimetableResult,
};
pub use ranking::{rank_slots, rank_teachers, SlotDifficulty, TeacherWorkload};
pub use state::PlacementState;
