//! Python bindings for the placement engine.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::Weekday;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::EngineConfig;
use crate::models::{
    Assignment, Course, OpenHour, SchoolClass, Teacher, TeacherOpenHour, TimetableInput,
};
use crate::timetable::{RepairStop, RunStats, TimetableResult};

/// Engine tunables (PyO3 wrapper around `EngineConfig`).
#[pyclass(name = "EngineConfig")]
#[derive(Clone, Debug)]
pub struct PyEngineConfig {
    /// Hours per day in the calendar domain (1-24)
    #[pyo3(get, set)]
    pub hours_per_day: u8,
    /// Cap on repair iterations
    #[pyo3(get, set)]
    pub max_repair_iterations: usize,
    /// How many of the most constrained teachers the greedy pass serves per slot
    #[pyo3(get, set)]
    pub constrained_teacher_limit: Option<usize>,
    /// Teachers without availability records get the school hours
    #[pyo3(get, set)]
    pub inherit_school_hours: bool,
    /// Wall clock budget for the repair phase
    #[pyo3(get, set)]
    pub repair_time_budget_ms: Option<u64>,
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl From<&PyEngineConfig> for EngineConfig {
    fn from(config: &PyEngineConfig) -> Self {
        Self {
            hours_per_day: config.hours_per_day,
            max_repair_iterations: config.max_repair_iterations,
            constrained_teacher_limit: config.constrained_teacher_limit,
            inherit_school_hours: config.inherit_school_hours,
            repair_time_budget_ms: config.repair_time_budget_ms,
            verbosity: config.verbosity,
        }
    }
}

#[pymethods]
impl PyEngineConfig {
    #[new]
    #[pyo3(signature = (
        hours_per_day=None,
        max_repair_iterations=None,
        constrained_teacher_limit=None,
        inherit_school_hours=None,
        repair_time_budget_ms=None,
        verbosity=None
    ))]
    fn new(
        hours_per_day: Option<u8>,
        max_repair_iterations: Option<usize>,
        constrained_teacher_limit: Option<usize>,
        inherit_school_hours: Option<bool>,
        repair_time_budget_ms: Option<u64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = EngineConfig::default();
        Self {
            hours_per_day: hours_per_day.unwrap_or(defaults.hours_per_day),
            max_repair_iterations: max_repair_iterations
                .unwrap_or(defaults.max_repair_iterations),
            constrained_teacher_limit: constrained_teacher_limit
                .or(defaults.constrained_teacher_limit),
            inherit_school_hours: inherit_school_hours.unwrap_or(defaults.inherit_school_hours),
            repair_time_budget_ms: repair_time_budget_ms.or(defaults.repair_time_budget_ms),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(hours_per_day={}, max_repair_iterations={}, constrained_teacher_limit={:?}, inherit_school_hours={}, repair_time_budget_ms={:?}, verbosity={})",
            self.hours_per_day,
            self.max_repair_iterations,
            self.constrained_teacher_limit,
            self.inherit_school_hours,
            self.repair_time_budget_ms,
            self.verbosity
        )
    }
}

/// One occupied class cell.
#[pyclass(name = "Lesson")]
#[derive(Clone, Debug)]
pub struct PyLesson {
    #[pyo3(get)]
    pub class_id: i64,
    /// English day name, e.g. "Monday"
    #[pyo3(get)]
    pub day: String,
    #[pyo3(get)]
    pub hour: u8,
    #[pyo3(get)]
    pub course_id: i64,
    #[pyo3(get)]
    pub teacher_id: i64,
    #[pyo3(get)]
    pub block_id: u32,
}

#[pymethods]
impl PyLesson {
    fn __repr__(&self) -> String {
        format!(
            "Lesson(class_id={}, day={}, hour={}, course_id={}, teacher_id={}, block_id={})",
            self.class_id, self.day, self.hour, self.course_id, self.teacher_id, self.block_id
        )
    }
}

/// A block that could not be placed.
#[pyclass(name = "UnplacedBlock")]
#[derive(Clone, Debug)]
pub struct PyUnplacedBlock {
    #[pyo3(get)]
    pub block_id: u32,
    #[pyo3(get)]
    pub course_id: i64,
    #[pyo3(get)]
    pub teacher_id: i64,
    #[pyo3(get)]
    pub class_id: i64,
    #[pyo3(get)]
    pub course_name: String,
    #[pyo3(get)]
    pub class_name: String,
    #[pyo3(get)]
    pub teacher_name: String,
    #[pyo3(get)]
    pub size: u32,
    #[pyo3(get)]
    pub placed_hours: u32,
}

#[pymethods]
impl PyUnplacedBlock {
    fn __repr__(&self) -> String {
        format!(
            "UnplacedBlock(block_id={}, course={:?}, class={:?}, teacher={:?}, size={})",
            self.block_id, self.course_name, self.class_name, self.teacher_name, self.size
        )
    }
}

/// An assignment that produced no blocks.
#[pyclass(name = "SkippedAssignment")]
#[derive(Clone, Debug)]
pub struct PySkippedAssignment {
    #[pyo3(get)]
    pub course_id: i64,
    #[pyo3(get)]
    pub teacher_id: i64,
    #[pyo3(get)]
    pub class_id: i64,
    #[pyo3(get)]
    pub reason: String,
}

#[pymethods]
impl PySkippedAssignment {
    fn __repr__(&self) -> String {
        format!(
            "SkippedAssignment(course_id={}, teacher_id={}, class_id={}, reason={:?})",
            self.course_id, self.teacher_id, self.class_id, self.reason
        )
    }
}

/// Counters describing one run.
#[pyclass(name = "RunStats")]
#[derive(Clone, Debug)]
pub struct PyRunStats {
    #[pyo3(get)]
    pub blocks: usize,
    #[pyo3(get)]
    pub greedy_placed: usize,
    #[pyo3(get)]
    pub repair_iterations: usize,
    #[pyo3(get)]
    pub repair_placed: usize,
    #[pyo3(get)]
    pub evictions: usize,
    /// "completed", "stalled", "iteration_limit" or "time_budget"
    #[pyo3(get)]
    pub repair_stop: Option<String>,
}

fn repair_stop_name(stop: RepairStop) -> &'static str {
    match stop {
        RepairStop::Completed => "completed",
        RepairStop::Stalled => "stalled",
        RepairStop::IterationLimit => "iteration_limit",
        RepairStop::TimeBudget => "time_budget",
    }
}

impl From<RunStats> for PyRunStats {
    fn from(stats: RunStats) -> Self {
        Self {
            blocks: stats.blocks,
            greedy_placed: stats.greedy_placed,
            repair_iterations: stats.repair_iterations,
            repair_placed: stats.repair_placed,
            evictions: stats.evictions,
            repair_stop: stats.repair_stop.map(|s| repair_stop_name(s).to_string()),
        }
    }
}

#[pymethods]
impl PyRunStats {
    fn __repr__(&self) -> String {
        format!(
            "RunStats(blocks={}, greedy_placed={}, repair_iterations={}, repair_placed={}, evictions={}, repair_stop={:?})",
            self.blocks,
            self.greedy_placed,
            self.repair_iterations,
            self.repair_placed,
            self.evictions,
            self.repair_stop
        )
    }
}

/// Result of `generate_timetable`.
#[pyclass(name = "TimetableResult")]
#[derive(Clone, Debug)]
pub struct PyTimetableResult {
    /// Occupied cells in class, day, hour order
    #[pyo3(get)]
    pub lessons: Vec<PyLesson>,
    #[pyo3(get)]
    pub unplaced: Vec<PyUnplacedBlock>,
    #[pyo3(get)]
    pub skipped: Vec<PySkippedAssignment>,
    #[pyo3(get)]
    pub stats: PyRunStats,
}

impl From<TimetableResult> for PyTimetableResult {
    fn from(result: TimetableResult) -> Self {
        let lessons = result
            .schedule
            .lessons()
            .into_iter()
            .map(|l| PyLesson {
                class_id: l.class_id,
                day: day_name(l.day).to_string(),
                hour: l.hour,
                course_id: l.course_id,
                teacher_id: l.teacher_id,
                block_id: l.block_id,
            })
            .collect();
        let unplaced = result
            .unplaced
            .into_iter()
            .map(|u| PyUnplacedBlock {
                block_id: u.block_id,
                course_id: u.course_id,
                teacher_id: u.teacher_id,
                class_id: u.class_id,
                course_name: u.course_name,
                class_name: u.class_name,
                teacher_name: u.teacher_name,
                size: u.size,
                placed_hours: u.placed_hours,
            })
            .collect();
        let skipped = result
            .skipped
            .into_iter()
            .map(|s| PySkippedAssignment {
                course_id: s.assignment.course_id,
                teacher_id: s.assignment.teacher_id,
                class_id: s.assignment.class_id,
                reason: s.reason.to_string(),
            })
            .collect();
        Self {
            lessons,
            unplaced,
            skipped,
            stats: result.stats.into(),
        }
    }
}

#[pymethods]
impl PyTimetableResult {
    fn __repr__(&self) -> String {
        format!(
            "TimetableResult(lessons={}, unplaced={}, skipped={})",
            self.lessons.len(),
            self.unplaced.len(),
            self.skipped.len()
        )
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn parse_day(name: &str) -> PyResult<Weekday> {
    name.parse::<Weekday>()
        .map_err(|_| PyValueError::new_err(format!("Unknown day name: {:?}", name)))
}

/// Build a timetable from plain records.
///
/// # Arguments
/// * `teachers` - (id, name, surname)
/// * `classes` - (id, name)
/// * `courses` - (id, name, weekly_hours, distribution such as "2+2+1")
/// * `assignments` - (course_id, teacher_id, class_id)
/// * `school_hours` - (day, hour, is_open), day names like "Monday" or "mon"
/// * `teacher_hours` - (teacher_id, day, hour, is_open)
/// * `config` - Optional EngineConfig, defaults when omitted
///
/// # Raises
/// * ValueError for unknown day names, an invalid config, or a teacher whose
///   demand exceeds their available hours
#[pyfunction]
#[pyo3(
    name = "generate_timetable",
    signature = (teachers, classes, courses, assignments, school_hours, teacher_hours, config=None)
)]
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
fn py_generate_timetable(
    teachers: Vec<(i64, String, String)>,
    classes: Vec<(i64, String)>,
    courses: Vec<(i64, String, u32, String)>,
    assignments: Vec<(i64, i64, i64)>,
    school_hours: Vec<(String, u8, bool)>,
    teacher_hours: Vec<(i64, String, u8, bool)>,
    config: Option<PyEngineConfig>,
) -> PyResult<PyTimetableResult> {
    let input = TimetableInput {
        teachers: teachers
            .iter()
            .map(|(id, name, surname)| Teacher::new(*id, name, surname))
            .collect(),
        classes: classes
            .iter()
            .map(|(id, name)| SchoolClass::new(*id, name))
            .collect(),
        courses: courses
            .iter()
            .map(|(id, name, weekly_hours, distribution)| {
                Course::new(*id, name, *weekly_hours, distribution)
            })
            .collect(),
        assignments: assignments
            .iter()
            .map(|&(course_id, teacher_id, class_id)| {
                Assignment::new(course_id, teacher_id, class_id)
            })
            .collect(),
        school_hours: school_hours
            .iter()
            .map(|(day, hour, is_open)| Ok(OpenHour::new(parse_day(day)?, *hour, *is_open)))
            .collect::<PyResult<_>>()?,
        teacher_hours: teacher_hours
            .iter()
            .map(|(teacher_id, day, hour, is_open)| {
                Ok(TeacherOpenHour::new(
                    *teacher_id,
                    parse_day(day)?,
                    *hour,
                    *is_open,
                ))
            })
            .collect::<PyResult<_>>()?,
    };
    let config = config
        .as_ref()
        .map(EngineConfig::from)
        .unwrap_or_default();

    match crate::generate_timetable(&input, config) {
        Ok(result) => Ok(result.into()),
        Err(e) => Err(PyValueError::new_err(e.to_string())),
    }
}

#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Result types
    m.add_class::<PyLesson>()?;
    m.add_class::<PyUnplacedBlock>()?;
    m.add_class::<PySkippedAssignment>()?;
    m.add_class::<PyRunStats>()?;
    m.add_class::<PyTimetableResult>()?;

    // Config types
    m.add_class::<PyEngineConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_generate_timetable, m)?)?;

    Ok(())
}
