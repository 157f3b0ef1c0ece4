//! Splitting assignments into indivisible placement blocks.

use rustc_hash::FxHashMap;

use crate::interner::DenseId;
use crate::log_debug;
use crate::models::{
    Assignment, BlockId, ClassId, CourseId, SkipReason, SkippedAssignment, TeacherId,
    TimetableInput, UnplacedRecord,
};

use super::availability::DeclaredAvailability;
use super::calendar::TimeSlot;

/// Position of a block in its [`BlockSet`].
pub type BlockIdx = usize;

/// One contiguous chunk of a course assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseBlock {
    pub block_id: BlockId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    /// Contiguous hours this block needs
    pub size: u8,
    pub course_name: String,
    pub class_name: String,
    pub teacher_name: String,
    pub(crate) teacher: DenseId,
    pub(crate) class: DenseId,
    /// First hour of the block when placed
    placement: Option<TimeSlot>,
}

impl CourseBlock {
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    pub fn placement(&self) -> Option<TimeSlot> {
        self.placement
    }

    pub(crate) fn set_placement(&mut self, placement: Option<TimeSlot>) {
        self.placement = placement;
    }

    pub fn to_unplaced_record(&self) -> UnplacedRecord {
        UnplacedRecord {
            block_id: self.block_id,
            course_id: self.course_id,
            teacher_id: self.teacher_id,
            class_id: self.class_id,
            course_name: self.course_name.clone(),
            class_name: self.class_name.clone(),
            teacher_name: self.teacher_name.clone(),
            size: self.size as u32,
            placed_hours: 0,
        }
    }
}

/// Block id allocation owned by one decomposition, starting at 1.
#[derive(Debug)]
struct BlockIdSequence {
    next: BlockId,
}

impl BlockIdSequence {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn next_id(&mut self) -> BlockId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// All blocks of a run plus the per-class placement order.
#[derive(Clone, Debug, Default)]
pub struct BlockSet {
    blocks: Vec<CourseBlock>,
    /// Dense class -> block indices, largest block first
    by_class: Vec<Vec<BlockIdx>>,
    skipped: Vec<SkippedAssignment>,
}

impl BlockSet {
    #[inline]
    pub fn get(&self, idx: BlockIdx) -> &CourseBlock {
        &self.blocks[idx]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: BlockIdx) -> &mut CourseBlock {
        &mut self.blocks[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of classes with a (possibly empty) block list.
    pub fn class_count(&self) -> usize {
        self.by_class.len()
    }

    /// Block indices of a class in placement order.
    pub fn class_blocks(&self, class: DenseId) -> &[BlockIdx] {
        &self.by_class[class]
    }

    /// Unplaced blocks grouped by class, classes and blocks in placement order.
    pub fn unplaced_by_class(&self) -> Vec<(DenseId, Vec<BlockIdx>)> {
        self.by_class
            .iter()
            .enumerate()
            .filter_map(|(class, list)| {
                let pending: Vec<BlockIdx> = list
                    .iter()
                    .copied()
                    .filter(|&b| !self.blocks[b].is_placed())
                    .collect();
                (!pending.is_empty()).then_some((class, pending))
            })
            .collect()
    }

    pub fn unplaced_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_placed()).count()
    }

    /// Assignments that produced no blocks.
    pub fn skipped(&self) -> &[SkippedAssignment] {
        &self.skipped
    }
}

/// Parse a distribution pattern such as "2+2+1" into block sizes.
///
/// Empty parts are ignored. Returns None for non-numeric or zero parts, or
/// when nothing is left.
pub fn parse_distribution(pattern: &str) -> Option<Vec<u8>> {
    let mut sizes = Vec::new();
    for part in pattern.split('+').map(str::trim) {
        if part.is_empty() {
            continue;
        }
        match part.parse::<u8>() {
            Ok(size) if size > 0 => sizes.push(size),
            _ => return None,
        }
    }
    (!sizes.is_empty()).then_some(sizes)
}

fn skip(skipped: &mut Vec<SkippedAssignment>, assignment: &Assignment, reason: SkipReason) {
    tracing::warn!(
        course_id = assignment.course_id,
        teacher_id = assignment.teacher_id,
        class_id = assignment.class_id,
        "Skipping assignment: {}",
        reason
    );
    skipped.push(SkippedAssignment {
        assignment: *assignment,
        reason,
    });
}

/// Expand every assignment into blocks, one per pattern part.
///
/// Assignments that reference unknown entities or carry an unusable pattern
/// are skipped with a warning and recorded in [`BlockSet::skipped`].
pub fn decompose(
    input: &TimetableInput,
    declared: &DeclaredAvailability,
    verbosity: u8,
) -> BlockSet {
    let courses: FxHashMap<CourseId, _> = input.courses.iter().map(|c| (c.id, c)).collect();
    let teacher_names: FxHashMap<TeacherId, String> = input
        .teachers
        .iter()
        .map(|t| (t.id, t.full_name()))
        .collect();
    let class_names: FxHashMap<ClassId, &str> = input
        .classes
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut ids = BlockIdSequence::new();
    let mut blocks: Vec<CourseBlock> = Vec::new();
    let mut by_class: Vec<Vec<BlockIdx>> = vec![Vec::new(); declared.classes().len()];
    let mut skipped: Vec<SkippedAssignment> = Vec::new();

    for assignment in &input.assignments {
        let Some(course) = courses.get(&assignment.course_id) else {
            skip(&mut skipped, assignment, SkipReason::MissingCourse);
            continue;
        };
        let Some(teacher) = declared.teachers().get(assignment.teacher_id) else {
            skip(&mut skipped, assignment, SkipReason::MissingTeacher);
            continue;
        };
        let Some(class) = declared.classes().get(assignment.class_id) else {
            skip(&mut skipped, assignment, SkipReason::MissingClass);
            continue;
        };
        let Some(sizes) = parse_distribution(&course.distribution) else {
            skip(
                &mut skipped,
                assignment,
                SkipReason::InvalidDistribution(course.distribution.clone()),
            );
            continue;
        };

        for size in sizes {
            let block_id = ids.next_id();
            by_class[class].push(blocks.len());
            blocks.push(CourseBlock {
                block_id,
                course_id: course.id,
                teacher_id: assignment.teacher_id,
                class_id: assignment.class_id,
                size,
                course_name: course.name.clone(),
                class_name: class_names
                    .get(&assignment.class_id)
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                teacher_name: teacher_names
                    .get(&assignment.teacher_id)
                    .cloned()
                    .unwrap_or_default(),
                teacher,
                class,
                placement: None,
            });
        }
    }

    // Largest blocks first; stable so equal sizes keep declaration order
    for list in &mut by_class {
        list.sort_by(|&a, &b| blocks[b].size.cmp(&blocks[a].size));
    }

    log_debug!(
        verbosity,
        "Decomposed {} assignments into {} blocks ({} skipped)",
        input.assignments.len(),
        blocks.len(),
        skipped.len()
    );

    BlockSet {
        blocks,
        by_class,
        skipped,
    }
}
