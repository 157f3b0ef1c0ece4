//! Errors raised by the placement engine.

use chrono::Weekday;
use thiserror::Error;

use crate::models::{BlockId, ClassId, TeacherId};

/// Errors that can occur while building or running a timetable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    #[error(
        "Teacher {teacher_id}: unplaced demand of {unplaced_hours}h exceeds {available_hours}h of availability"
    )]
    Infeasible {
        teacher_id: TeacherId,
        unplaced_hours: u32,
        available_hours: u32,
    },
    #[error("Cell already occupied: class {class_id} on {day} hour {hour} (block {block_id})")]
    CellOccupied {
        class_id: ClassId,
        day: Weekday,
        hour: u8,
        block_id: BlockId,
    },
    #[error("Teacher {teacher_id} already teaching on {day} hour {hour} (block {block_id})")]
    TeacherDoubleBooked {
        teacher_id: TeacherId,
        day: Weekday,
        hour: u8,
        block_id: BlockId,
    },
    #[error("Block {block_id} does not fit the open hours at {day} hour {hour}")]
    OutsideOpenHours { block_id: BlockId, day: Weekday, hour: u8 },
    #[error("Block {block_id} is already placed")]
    AlreadyPlaced { block_id: BlockId },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_message_names_teacher() {
        let err = TimetableError::Infeasible {
            teacher_id: 7,
            unplaced_hours: 4,
            available_hours: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Teacher 7"));
        assert!(msg.contains("4h"));
        assert!(msg.contains("2h"));
    }
}
