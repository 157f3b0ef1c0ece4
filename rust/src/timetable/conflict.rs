//! Conflict detection and eviction for the repair phase.

use crate::log_changes;

use super::blocks::BlockIdx;
use super::calendar::{SlotIdx, TimeSlot};
use super::state::PlacementState;

/// Dense slots a block would cover at `at`, or None if any hour is closed.
fn open_slots(state: &PlacementState, idx: BlockIdx, at: TimeSlot) -> Option<Vec<SlotIdx>> {
    let calendar = state.calendar();
    let open = state.open_hours();
    calendar
        .block_hours(at.hour, state.block(idx).size)?
        .map(|h| {
            calendar
                .index(at.day, h)
                .filter(|&slot| open.is_open_idx(slot))
        })
        .collect()
}

/// Would placing the block at `at` clash with the current schedule?
///
/// True when an hour is outside the open hours, a class cell is already taken,
/// or the teacher is teaching another block at one of the hours in any class.
pub fn check_block_conflict(state: &PlacementState, idx: BlockIdx, at: TimeSlot) -> bool {
    let Some(slots) = open_slots(state, idx, at) else {
        return true;
    };
    let block = state.block(idx);
    slots.into_iter().any(|slot| {
        state.class_occupant(block.class, slot).is_some()
            || state
                .teacher_occupant(block.teacher, slot)
                .is_some_and(|other| other != idx)
    })
}

/// Blocks that would have to move for the block to fit at `at`.
///
/// Occupants of the class cells come first, then the teacher's lessons in
/// other classes, each listed once in hour order. Closed hours are skipped.
pub fn find_conflicting_blocks(
    state: &PlacementState,
    idx: BlockIdx,
    at: TimeSlot,
) -> Vec<BlockIdx> {
    let calendar = state.calendar();
    let block = state.block(idx);
    let Some(hours) = calendar.block_hours(at.hour, block.size) else {
        return Vec::new();
    };
    let slots: Vec<SlotIdx> = hours
        .filter_map(|h| calendar.index(at.day, h))
        .filter(|&slot| state.open_hours().is_open_idx(slot))
        .collect();

    let mut conflicting: Vec<BlockIdx> = Vec::new();
    let class_occupants = slots.iter().filter_map(|&s| state.class_occupant(block.class, s));
    let teacher_occupants = slots
        .iter()
        .filter_map(|&s| state.teacher_occupant(block.teacher, s));
    for other in class_occupants.chain(teacher_occupants) {
        if other != idx && !conflicting.contains(&other) {
            conflicting.push(other);
        }
    }
    conflicting
}

/// Take the given blocks off the schedule; returns how many were actually on it.
///
/// Their cells become free again for both the class and the teacher, and the
/// blocks count as unplaced from now on.
pub fn evict_blocks(state: &mut PlacementState, blocks: &[BlockIdx], verbosity: u8) -> usize {
    let mut evicted = 0;
    for &idx in blocks {
        let at = state.block(idx).placement();
        if state.evict(idx) {
            evicted += 1;
            let block = state.block(idx);
            log_changes!(
                verbosity,
                "  Evicted block {} (course {}, class {}, teacher {}) from {:?}",
                block.block_id,
                block.course_id,
                block.class_id,
                block.teacher_id,
                at
            );
        }
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{
        Assignment, Course, OpenHour, SchoolClass, Teacher, TeacherOpenHour, TimetableInput,
    };
    use crate::timetable::availability::DeclaredAvailability;
    use crate::timetable::blocks::decompose;
    use chrono::Weekday::Mon;

    /// Monday 1-4 open. Teacher 1 teaches 9A (block 0) and 9B (block 1),
    /// teacher 2 teaches 9B (block 2). All 2-hour blocks.
    fn conflict_state() -> PlacementState {
        let school_hours = (1..=4).map(|h| OpenHour::new(Mon, h, true)).collect();
        let teacher_hours = [1, 2]
            .iter()
            .flat_map(|&t| (1..=4).map(move |h| TeacherOpenHour::new(t, Mon, h, true)))
            .collect();
        let input = TimetableInput {
            teachers: vec![Teacher::new(1, "Ali", "Kaya"), Teacher::new(2, "Can", "Demir")],
            classes: vec![SchoolClass::new(10, "9A"), SchoolClass::new(20, "9B")],
            courses: vec![Course::new(5, "Math", 2, "2"), Course::new(6, "Art", 2, "2")],
            assignments: vec![
                Assignment::new(5, 1, 10),
                Assignment::new(5, 1, 20),
                Assignment::new(6, 2, 20),
            ],
            school_hours,
            teacher_hours,
        };
        let declared = DeclaredAvailability::build(&input, &EngineConfig::default());
        let blocks = decompose(&input, &declared, 0);
        PlacementState::new(declared, blocks)
    }

    #[test]
    fn test_no_conflict_on_empty_schedule() {
        let state = conflict_state();
        assert!(!check_block_conflict(&state, 0, TimeSlot::new(Mon, 1)));
        assert!(find_conflicting_blocks(&state, 0, TimeSlot::new(Mon, 1)).is_empty());
    }

    #[test]
    fn test_closed_hours_conflict() {
        let state = conflict_state();
        assert!(check_block_conflict(&state, 0, TimeSlot::new(Mon, 4)));
        assert!(check_block_conflict(&state, 0, TimeSlot::new(Mon, 9)));
    }

    #[test]
    fn test_teacher_busy_in_other_class_conflicts() {
        let mut state = conflict_state();
        state.commit(1, TimeSlot::new(Mon, 2)).unwrap(); // teacher 1 in 9B, Mon 2-3

        assert!(check_block_conflict(&state, 0, TimeSlot::new(Mon, 1)));
        assert_eq!(find_conflicting_blocks(&state, 0, TimeSlot::new(Mon, 1)), vec![1]);
    }

    #[test]
    fn test_class_occupants_listed_before_teacher_lessons() {
        let mut state = conflict_state();
        state.commit(2, TimeSlot::new(Mon, 1)).unwrap(); // teacher 2 in 9B, Mon 1-2
        state.commit(0, TimeSlot::new(Mon, 3)).unwrap(); // teacher 1 in 9A, Mon 3-4

        // Teacher 1's 9B block at Mon 2 hits 9B's Art lesson and 9A's Math lesson
        let conflicting = find_conflicting_blocks(&state, 1, TimeSlot::new(Mon, 2));
        assert_eq!(conflicting, vec![2, 0]);

        let evicted = evict_blocks(&mut state, &conflicting, 0);
        assert_eq!(evicted, 2);
        assert!(!check_block_conflict(&state, 1, TimeSlot::new(Mon, 2)));
        assert_eq!(evict_blocks(&mut state, &conflicting, 0), 0);
    }
}
