//! Open-hours calendar and declared availability grids.
//!
//! Declared availability never changes during a run. What is still free is
//! derived from it together with the live occupancy in
//! [`PlacementState`](super::state::PlacementState).

use chrono::Weekday;
use rustc_hash::FxHashSet;

use crate::config::EngineConfig;
use crate::interner::{DenseId, DenseIndex};
use crate::log_checks;
use crate::models::{ClassId, OpenHour, TeacherId, TimetableInput};

use super::calendar::{Calendar, SlotIdx, TimeSlot, WEEK};

/// The school's open hours, per day, in canonical order.
///
/// Days without any open hour are not listed at all.
#[derive(Clone, Debug)]
pub struct OpenHours {
    calendar: Calendar,
    by_day: Vec<(Weekday, Vec<u8>)>,
    open: Vec<bool>,
}

impl OpenHours {
    /// Build from school calendar records. A cell is open when any record for
    /// it is open; hours outside the domain are ignored.
    pub fn from_records(calendar: Calendar, records: &[OpenHour], verbosity: u8) -> Self {
        let mut open = vec![false; calendar.slot_count()];
        for record in records {
            match calendar.index(record.day, record.hour) {
                Some(idx) => open[idx] |= record.is_open,
                None => log_checks!(
                    verbosity,
                    "Ignoring school hour {} {}: outside the hour domain",
                    record.day,
                    record.hour
                ),
            }
        }

        let by_day = WEEK
            .iter()
            .filter_map(|&day| {
                let hours: Vec<u8> = calendar
                    .hours()
                    .filter(|&h| calendar.index(day, h).is_some_and(|idx| open[idx]))
                    .collect();
                (!hours.is_empty()).then_some((day, hours))
            })
            .collect();

        Self {
            calendar,
            by_day,
            open,
        }
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// `open_hours_by_day`: each open day with its ascending open hours.
    pub fn by_day(&self) -> &[(Weekday, Vec<u8>)] {
        &self.by_day
    }

    /// Open hours of a day (empty if the day is closed).
    pub fn hours(&self, day: Weekday) -> &[u8] {
        self.by_day
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, hours)| hours.as_slice())
            .unwrap_or(&[])
    }

    #[inline]
    pub fn is_open_idx(&self, idx: SlotIdx) -> bool {
        self.open[idx]
    }

    /// Every open slot in canonical (day, hour) order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.by_day
            .iter()
            .flat_map(|(day, hours)| hours.iter().map(move |&hour| TimeSlot::new(*day, hour)))
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

/// Dense entity × slot boolean grid.
#[derive(Clone, Debug)]
pub struct AvailabilityGrid {
    slot_count: usize,
    cells: Vec<bool>,
}

impl AvailabilityGrid {
    pub fn new(entities: usize, slot_count: usize) -> Self {
        Self {
            slot_count,
            cells: vec![false; entities * slot_count],
        }
    }

    #[inline]
    pub fn is_free(&self, entity: DenseId, slot: SlotIdx) -> bool {
        self.cells[entity * self.slot_count + slot]
    }

    #[inline]
    pub fn set(&mut self, entity: DenseId, slot: SlotIdx, free: bool) {
        self.cells[entity * self.slot_count + slot] = free;
    }
}

/// Declared capability of every class and teacher, restricted to school hours.
#[derive(Clone, Debug)]
pub struct DeclaredAvailability {
    open_hours: OpenHours,
    teachers: DenseIndex<TeacherId>,
    classes: DenseIndex<ClassId>,
    teacher_grid: AvailabilityGrid,
    class_grid: AvailabilityGrid,
}

impl DeclaredAvailability {
    /// Derive open hours and both grids from the caller's records.
    pub fn build(input: &TimetableInput, config: &EngineConfig) -> Self {
        let verbosity = config.verbosity;
        let calendar = Calendar::new(config.hours_per_day);
        let open_hours = OpenHours::from_records(calendar, &input.school_hours, verbosity);
        let slot_count = calendar.slot_count();

        let teachers: DenseIndex<TeacherId> = input.teachers.iter().map(|t| t.id).collect();
        let classes: DenseIndex<ClassId> = input.classes.iter().map(|c| c.id).collect();

        // Every class can use every school-open slot
        let mut class_grid = AvailabilityGrid::new(classes.len(), slot_count);
        for class in 0..classes.len() {
            for slot in 0..slot_count {
                class_grid.set(class, slot, open_hours.is_open_idx(slot));
            }
        }

        let mut teacher_grid = AvailabilityGrid::new(teachers.len(), slot_count);
        let mut declared: FxHashSet<DenseId> = FxHashSet::default();
        for record in &input.teacher_hours {
            let Some(teacher) = teachers.get(record.teacher_id) else {
                log_checks!(
                    verbosity,
                    "Ignoring availability of unknown teacher {}",
                    record.teacher_id
                );
                continue;
            };
            declared.insert(teacher);
            let Some(slot) = calendar.index(record.day, record.hour) else {
                log_checks!(
                    verbosity,
                    "Ignoring teacher {} hour {} {}: outside the hour domain",
                    record.teacher_id,
                    record.day,
                    record.hour
                );
                continue;
            };
            // Any open record opens the cell; closed records never close it again
            if record.is_open && open_hours.is_open_idx(slot) {
                teacher_grid.set(teacher, slot, true);
            }
        }

        if config.inherit_school_hours {
            for teacher in (0..teachers.len()).filter(|t| !declared.contains(t)) {
                log_checks!(
                    verbosity,
                    "Teacher {:?} declared no hours, inheriting school hours",
                    teachers.resolve(teacher)
                );
                for slot in 0..slot_count {
                    teacher_grid.set(teacher, slot, open_hours.is_open_idx(slot));
                }
            }
        }

        Self {
            open_hours,
            teachers,
            classes,
            teacher_grid,
            class_grid,
        }
    }

    pub fn open_hours(&self) -> &OpenHours {
        &self.open_hours
    }

    pub fn calendar(&self) -> Calendar {
        self.open_hours.calendar()
    }

    pub fn teachers(&self) -> &DenseIndex<TeacherId> {
        &self.teachers
    }

    pub fn classes(&self) -> &DenseIndex<ClassId> {
        &self.classes
    }

    #[inline]
    pub fn teacher_declared(&self, teacher: DenseId, slot: SlotIdx) -> bool {
        self.teacher_grid.is_free(teacher, slot)
    }

    #[inline]
    pub fn class_declared(&self, class: DenseId, slot: SlotIdx) -> bool {
        self.class_grid.is_free(class, slot)
    }
}
