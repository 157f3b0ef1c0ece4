//! Difficulty orderings used by the greedy phase.
//!
//! Two rankings, both computed from the live state on demand:
//! - slots by scarcity: fewest free teachers first
//! - teachers by workload ratio: least slack per hour of pending demand first

use std::cmp::Ordering;

use crate::error::TimetableError;
use crate::interner::DenseId;
use crate::models::TeacherId;

use super::calendar::TimeSlot;
use super::state::PlacementState;

/// An open slot and how many teachers are still free in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotDifficulty {
    pub slot: TimeSlot,
    pub free_teachers: usize,
}

/// Slack figures for a teacher with pending blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct TeacherWorkload {
    pub teacher: DenseId,
    pub teacher_id: TeacherId,
    /// Free cells across all open days
    pub available_hours: u32,
    /// Days with at least one free cell
    pub available_days: u32,
    /// Total size of the teacher's unplaced blocks
    pub unplaced_hours: u32,
    /// available_hours / unplaced_hours * available_days²; lower = tighter
    pub ratio: f64,
}

/// Compare f64 values for sorting, treating NaN as equal.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Open slots ordered scarcest first; ties keep canonical (day, hour) order.
pub fn rank_slots(state: &PlacementState) -> Vec<SlotDifficulty> {
    let calendar = state.calendar();
    let teacher_count = state.declared().teachers().len();

    let mut ranked: Vec<SlotDifficulty> = state
        .open_hours()
        .slots()
        .filter_map(|slot| {
            let idx = calendar.index(slot.day, slot.hour)?;
            let free_teachers = (0..teacher_count)
                .filter(|&t| state.teacher_free(t, idx))
                .count();
            Some(SlotDifficulty {
                slot,
                free_teachers,
            })
        })
        .collect();

    // Stable sort keeps canonical order among equally scarce slots
    ranked.sort_by_key(|s| s.free_teachers);
    ranked
}

/// Hours of unplaced blocks per dense teacher.
pub fn unplaced_demand(state: &PlacementState) -> Vec<u32> {
    let mut demand = vec![0u32; state.declared().teachers().len()];
    for block in state.blocks().iter().filter(|b| !b.is_placed()) {
        demand[block.teacher] += block.size as u32;
    }
    demand
}

/// Teachers with pending blocks, most constrained first.
///
/// Fails with [`TimetableError::Infeasible`] for the first teacher (in
/// declaration order) whose pending demand exceeds their free hours.
pub fn rank_teachers(state: &PlacementState) -> Result<Vec<TeacherWorkload>, TimetableError> {
    let demand = unplaced_demand(state);
    let teachers = state.declared().teachers();

    let mut ranked: Vec<TeacherWorkload> = Vec::new();
    for (teacher, &unplaced_hours) in demand.iter().enumerate() {
        if unplaced_hours == 0 {
            continue;
        }
        let teacher_id = teachers.resolve(teacher).unwrap_or_default();
        let (available_hours, available_days) = state.teacher_slack(teacher);
        if unplaced_hours > available_hours {
            return Err(TimetableError::Infeasible {
                teacher_id,
                unplaced_hours,
                available_hours,
            });
        }
        let days = available_days as f64;
        ranked.push(TeacherWorkload {
            teacher,
            teacher_id,
            available_hours,
            available_days,
            unplaced_hours,
            ratio: available_hours as f64 / unplaced_hours as f64 * days * days,
        });
    }

    ranked.sort_by(|a, b| cmp_f64(a.ratio, b.ratio));
    Ok(ranked)
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
    use chrono::Weekday::{Mon, Tue};

    /// School open Mon/Tue hours 1-3.
    /// Teacher 1: Mon 1-3 and Tue 1-3 (6h), teaches a 3h course.
    /// Teacher 2: Mon 1-2 (2h), teaches a 2h course.
    /// Teacher 3: Mon 1 only, no assignment.
    fn ranking_state() -> PlacementState {
        let mut school_hours = Vec::new();
        let mut teacher_hours = Vec::new();
        for day in [Mon, Tue] {
            for hour in 1..=3 {
                school_hours.push(OpenHour::new(day, hour, true));
                teacher_hours.push(TeacherOpenHour::new(1, day, hour, true));
            }
        }
        teacher_hours.push(TeacherOpenHour::new(2, Mon, 1, true));
        teacher_hours.push(TeacherOpenHour::new(2, Mon, 2, true));
        teacher_hours.push(TeacherOpenHour::new(3, Mon, 1, true));

        let input = TimetableInput {
            teachers: vec![
                Teacher::new(1, "Ali", "Kaya"),
                Teacher::new(2, "Can", "Demir"),
                Teacher::new(3, "Ece", "Şahin"),
            ],
            classes: vec![SchoolClass::new(10, "9A")],
            courses: vec![
                Course::new(100, "Math", 3, "2+1"),
                Course::new(200, "Music", 2, "2"),
            ],
            assignments: vec![Assignment::new(100, 1, 10), Assignment::new(200, 2, 10)],
            school_hours,
            teacher_hours,
        };
        let declared = DeclaredAvailability::build(&input, &EngineConfig::default());
        let blocks = decompose(&input, &declared, 0);
        PlacementState::new(declared, blocks)
    }

    #[test]
    fn test_slots_scarcest_first_with_canonical_ties() {
        let state = ranking_state();
        let ranked: Vec<(TimeSlot, usize)> = rank_slots(&state)
            .iter()
            .map(|s| (s.slot, s.free_teachers))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (TimeSlot::new(Mon, 3), 1),
                (TimeSlot::new(Tue, 1), 1),
                (TimeSlot::new(Tue, 2), 1),
                (TimeSlot::new(Tue, 3), 1),
                (TimeSlot::new(Mon, 2), 2),
                (TimeSlot::new(Mon, 1), 3),
            ]
        );
    }

    #[test]
    fn test_teacher_ratio_and_order() {
        let state = ranking_state();
        let ranked = rank_teachers(&state).unwrap();

        // Teacher 3 has no pending blocks and is left out
        assert_eq!(ranked.len(), 2);
        // Teacher 2: 2h free / 2h demand * 1 day² = 1
        assert_eq!(ranked[0].teacher_id, 2);
        assert_eq!(ranked[0].ratio, 1.0);
        // Teacher 1: 6h free / 3h demand * 2 days² = 8
        assert_eq!(ranked[1].teacher_id, 1);
        assert_eq!(ranked[1].available_hours, 6);
        assert_eq!(ranked[1].available_days, 2);
        assert_eq!(ranked[1].unplaced_hours, 3);
        assert_eq!(ranked[1].ratio, 8.0);
    }

    #[test]
    fn test_ranking_reflects_progress() {
        let mut state = ranking_state();
        // Place teacher 1's 2h block on Monday
        state.commit(0, TimeSlot::new(Mon, 1)).unwrap();

        let ranked = rank_teachers(&state).unwrap();
        let t1 = ranked.iter().find(|w| w.teacher_id == 1).unwrap();
        assert_eq!(t1.unplaced_hours, 1);
        assert_eq!(t1.available_hours, 4);

        // Teacher 1 is no longer free at Mon 1
        let mon1 = rank_slots(&state)
            .into_iter()
            .find(|s| s.slot == TimeSlot::new(Mon, 1))
            .unwrap();
        assert_eq!(mon1.free_teachers, 2);
    }

    #[test]
    fn test_infeasible_teacher_is_reported() {
        let input = TimetableInput {
            teachers: vec![Teacher::new(7, "Oya", "Aksoy")],
            classes: vec![SchoolClass::new(10, "9A")],
            courses: vec![Course::new(1, "Chemistry", 4, "2+2")],
            assignments: vec![Assignment::new(1, 7, 10)],
            school_hours: (1..=5).map(|h| OpenHour::new(Mon, h, true)).collect(),
            teacher_hours: vec![
                TeacherOpenHour::new(7, Mon, 1, true),
                TeacherOpenHour::new(7, Mon, 2, true),
            ],
        };
        let declared = DeclaredAvailability::build(&input, &EngineConfig::default());
        let blocks = decompose(&input, &declared, 0);
        let state = PlacementState::new(declared, blocks);

        assert_eq!(
            rank_teachers(&state),
            Err(TimetableError::Infeasible {
                teacher_id: 7,
                unplaced_hours: 4,
                available_hours: 2,
            })
        );
    }
}
