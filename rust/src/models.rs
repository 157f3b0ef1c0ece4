//! Core data types exchanged with the caller.

use chrono::Weekday;

pub type TeacherId = i64;
pub type ClassId = i64;
pub type CourseId = i64;
/// Per-run block id, handed out by the block decomposition sequence.
pub type BlockId = u32;

/// A teacher that can be assigned to courses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub surname: String,
}

impl Teacher {
    pub fn new(id: TeacherId, name: &str, surname: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
        }
    }

    /// Display name as shown on reports.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// A class (group of students) that receives lessons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolClass {
    pub id: ClassId,
    pub name: String,
}

impl SchoolClass {
    pub fn new(id: ClassId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// A course with its weekly load and how that load is split into blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub weekly_hours: u32,
    /// Block sizes joined by '+', e.g. "2+2+1"
    pub distribution: String,
}

impl Course {
    pub fn new(id: CourseId, name: &str, weekly_hours: u32, distribution: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            weekly_hours,
            distribution: distribution.to_string(),
        }
    }
}

/// A teacher teaching a course to a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
}

impl Assignment {
    pub fn new(course_id: CourseId, teacher_id: TeacherId, class_id: ClassId) -> Self {
        Self {
            course_id,
            teacher_id,
            class_id,
        }
    }
}

/// One cell of the school calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenHour {
    pub day: Weekday,
    pub hour: u8,
    pub is_open: bool,
}

impl OpenHour {
    pub fn new(day: Weekday, hour: u8, is_open: bool) -> Self {
        Self { day, hour, is_open }
    }
}

/// One cell of a teacher's declared availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeacherOpenHour {
    pub teacher_id: TeacherId,
    pub day: Weekday,
    pub hour: u8,
    pub is_open: bool,
}

impl TeacherOpenHour {
    pub fn new(teacher_id: TeacherId, day: Weekday, hour: u8, is_open: bool) -> Self {
        Self {
            teacher_id,
            day,
            hour,
            is_open,
        }
    }
}

/// Everything a placement run consumes.
#[derive(Clone, Debug, Default)]
pub struct TimetableInput {
    pub teachers: Vec<Teacher>,
    pub classes: Vec<SchoolClass>,
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
    pub school_hours: Vec<OpenHour>,
    pub teacher_hours: Vec<TeacherOpenHour>,
}

/// Lesson occupying one schedule cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LessonCell {
    pub block_id: BlockId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
}

/// One occupied cell, flattened for persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledLesson {
    pub class_id: ClassId,
    pub day: Weekday,
    pub hour: u8,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub block_id: BlockId,
}

/// A block that is not on the final grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnplacedRecord {
    pub block_id: BlockId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    pub course_name: String,
    pub class_name: String,
    pub teacher_name: String,
    /// Block size in hours
    pub size: u32,
    /// Always 0: blocks are never partially placed
    pub placed_hours: u32,
}

/// Why an assignment produced no blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingCourse,
    MissingTeacher,
    MissingClass,
    InvalidDistribution(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCourse => write!(f, "course not found"),
            Self::MissingTeacher => write!(f, "teacher not found"),
            Self::MissingClass => write!(f, "class not found"),
            Self::InvalidDistribution(pattern) => {
                write!(f, "invalid distribution pattern {:?}", pattern)
            }
        }
    }
}

/// An assignment left out of the run, with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedAssignment {
    pub assignment: Assignment,
    pub reason: SkipReason,
}
