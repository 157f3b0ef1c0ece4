//! Packaging the final schedule and the unplaced report.

use chrono::Weekday;
use std::collections::BTreeMap;

use crate::models::{
    BlockId, ClassId, CourseId, LessonCell, ScheduledLesson, SkippedAssignment, TeacherId,
    UnplacedRecord,
};

use super::calendar::TimeSlot;
use super::state::PlacementState;

/// One hour of a class-day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HourCell {
    pub hour: u8,
    pub lesson: Option<LessonCell>,
}

/// The open hours of one day for one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySchedule {
    pub day: Weekday,
    pub hours: Vec<HourCell>,
}

/// Weekly grid of one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSchedule {
    pub class_id: ClassId,
    pub class_name: String,
    pub days: Vec<DaySchedule>,
}

impl ClassSchedule {
    pub fn lesson(&self, day: Weekday, hour: u8) -> Option<&LessonCell> {
        self.days
            .iter()
            .find(|d| d.day == day)?
            .hours
            .iter()
            .find(|c| c.hour == hour)?
            .lesson
            .as_ref()
    }
}

/// A lesson seen from the teacher's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeacherLesson {
    pub day: Weekday,
    pub hour: u8,
    pub class_id: ClassId,
    pub course_id: CourseId,
    pub block_id: BlockId,
}

/// class → day → hour → lesson-or-empty, covering every open cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleGrid {
    pub classes: Vec<ClassSchedule>,
}

impl ScheduleGrid {
    pub fn class(&self, class_id: ClassId) -> Option<&ClassSchedule> {
        self.classes.iter().find(|c| c.class_id == class_id)
    }

    pub fn lesson(&self, class_id: ClassId, day: Weekday, hour: u8) -> Option<&LessonCell> {
        self.class(class_id)?.lesson(day, hour)
    }

    /// Occupied cells as flat rows, in class, day, hour order.
    pub fn lessons(&self) -> Vec<ScheduledLesson> {
        let mut rows = Vec::new();
        for class in &self.classes {
            for day in &class.days {
                for cell in &day.hours {
                    if let Some(lesson) = cell.lesson {
                        rows.push(ScheduledLesson {
                            class_id: class.class_id,
                            day: day.day,
                            hour: cell.hour,
                            course_id: lesson.course_id,
                            teacher_id: lesson.teacher_id,
                            block_id: lesson.block_id,
                        });
                    }
                }
            }
        }
        rows
    }

    /// Lessons regrouped per teacher, each list in (day, hour) order.
    pub fn by_teacher(&self) -> BTreeMap<TeacherId, Vec<TeacherLesson>> {
        let mut view: BTreeMap<TeacherId, Vec<TeacherLesson>> = BTreeMap::new();
        for row in self.lessons() {
            view.entry(row.teacher_id).or_default().push(TeacherLesson {
                day: row.day,
                hour: row.hour,
                class_id: row.class_id,
                course_id: row.course_id,
                block_id: row.block_id,
            });
        }
        for lessons in view.values_mut() {
            lessons.sort_by_key(|l| TimeSlot::new(l.day, l.hour));
        }
        view
    }
}

/// Why the repair phase stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepairStop {
    /// Every block is placed
    Completed,
    /// An iteration changed nothing, so later ones would not either
    Stalled,
    IterationLimit,
    TimeBudget,
}

/// Counters describing one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub blocks: usize,
    pub greedy_placed: usize,
    pub repair_iterations: usize,
    pub repair_placed: usize,
    pub evictions: usize,
    pub repair_stop: Option<RepairStop>,
}

/// Everything handed back to the caller after a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableResult {
    pub schedule: ScheduleGrid,
    pub unplaced: Vec<UnplacedRecord>,
    pub skipped: Vec<SkippedAssignment>,
    pub stats: RunStats,
}

/// Build the result from the final state.
///
/// `class_names` is indexed by dense class id.
pub fn export(state: &PlacementState, class_names: &[String], stats: RunStats) -> TimetableResult {
    let calendar = state.calendar();
    let classes = state.declared().classes();

    let schedule = ScheduleGrid {
        classes: (0..classes.len())
            .map(|class| ClassSchedule {
                class_id: classes.resolve(class).unwrap_or_default(),
                class_name: class_names.get(class).cloned().unwrap_or_default(),
                days: state
                    .open_hours()
                    .by_day()
                    .iter()
                    .map(|(day, hours)| DaySchedule {
                        day: *day,
                        hours: hours
                            .iter()
                            .map(|&hour| HourCell {
                                hour,
                                lesson: calendar
                                    .index(*day, hour)
                                    .and_then(|slot| state.class_occupant(class, slot))
                                    .map(|b| {
                                        let block = state.block(b);
                                        LessonCell {
                                            block_id: block.block_id,
                                            course_id: block.course_id,
                                            teacher_id: block.teacher_id,
                                        }
                                    }),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    };

    let blocks = state.blocks();
    let unplaced = (0..blocks.class_count())
        .flat_map(|class| blocks.class_blocks(class).iter())
        .map(|&b| blocks.get(b))
        .filter(|block| !block.is_placed())
        .map(|block| block.to_unplaced_record())
        .collect();

    TimetableResult {
        schedule,
        unplaced,
        skipped: blocks.skipped().to_vec(),
        stats,
    }
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

    fn exported() -> TimetableResult {
        let mut school_hours = vec![OpenHour::new(Mon, 1, true), OpenHour::new(Mon, 2, true)];
        school_hours.push(OpenHour::new(Tue, 4, true));
        let teacher_hours = school_hours
            .iter()
            .flat_map(|o| {
                [1, 2]
                    .into_iter()
                    .map(move |t| TeacherOpenHour::new(t, o.day, o.hour, true))
            })
            .collect();
        let input = TimetableInput {
            teachers: vec![Teacher::new(1, "Ali", "Kaya"), Teacher::new(2, "Can", "Demir")],
            classes: vec![SchoolClass::new(10, "9A"), SchoolClass::new(20, "9B")],
            courses: vec![Course::new(5, "Math", 3, "2+1"), Course::new(6, "Art", 1, "1")],
            assignments: vec![
                Assignment::new(5, 1, 10),
                Assignment::new(6, 2, 20),
                Assignment::new(6, 7, 20),
            ],
            school_hours,
            teacher_hours,
        };
        let declared = DeclaredAvailability::build(&input, &EngineConfig::default());
        let blocks = decompose(&input, &declared, 0);
        let mut state = PlacementState::new(declared, blocks);
        state.commit(0, TimeSlot::new(Mon, 1)).unwrap(); // Math 2h, 9A
        state.commit(2, TimeSlot::new(Tue, 4)).unwrap(); // Art 1h, 9B

        let names = vec!["9A".to_string(), "9B".to_string()];
        export(&state, &names, RunStats::default())
    }

    #[test]
    fn test_grid_covers_open_cells_only() {
        let result = exported();
        let nine_a = result.schedule.class(10).unwrap();
        assert_eq!(nine_a.class_name, "9A");
        let days: Vec<(Weekday, usize)> =
            nine_a.days.iter().map(|d| (d.day, d.hours.len())).collect();
        assert_eq!(days, vec![(Mon, 2), (Tue, 1)]);

        let cell = result.schedule.lesson(10, Mon, 2).unwrap();
        assert_eq!((cell.block_id, cell.course_id, cell.teacher_id), (1, 5, 1));
        assert!(result.schedule.lesson(10, Tue, 4).is_none());
        assert!(result.schedule.lesson(10, Mon, 3).is_none());
    }

    #[test]
    fn test_unplaced_and_skipped_are_reported() {
        let result = exported();
        let unplaced: Vec<(BlockId, u32)> =
            result.unplaced.iter().map(|u| (u.block_id, u.size)).collect();
        assert_eq!(unplaced, vec![(2, 1)]);
        assert_eq!(result.unplaced[0].teacher_name, "Ali Kaya");
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].assignment.teacher_id, 7);
    }

    #[test]
    fn test_flat_rows_and_teacher_view() {
        let result = exported();
        let rows = result.schedule.lessons();
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].class_id, rows[0].day, rows[0].hour), (10, Mon, 1));
        assert_eq!((rows[2].class_id, rows[2].day, rows[2].hour), (20, Tue, 4));

        let view = result.schedule.by_teacher();
        assert_eq!(view.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(view[&1].len(), 2);
        assert_eq!(view[&2][0].class_id, 20);
    }
}
