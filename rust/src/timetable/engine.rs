//! Placement engine: difficulty-first greedy pass followed by bounded repair.

use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::TimetableError;
use crate::interner::DenseId;
use crate::models::TimetableInput;
use crate::{log_changes, log_checks, log_debug};

use super::availability::DeclaredAvailability;
use super::blocks::{decompose, BlockIdx};
use super::calendar::TimeSlot;
use super::conflict::{check_block_conflict, evict_blocks, find_conflicting_blocks};
use super::export::{export, RepairStop, RunStats, TimetableResult};
use super::ranking::{rank_slots, rank_teachers};
use super::state::PlacementState;

/// What one repair iteration changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairProgress {
    pub placed: usize,
    pub evicted: usize,
}

impl RepairProgress {
    fn is_idle(&self) -> bool {
        self.placed == 0 && self.evicted == 0
    }
}

/// Outcome of one swap attempt for a single block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapOutcome {
    pub placed: bool,
    pub evicted: usize,
}

/// Runs both placement phases over one input.
///
/// An engine holds the state of a single run. Build a new one per run.
pub struct PlacementEngine {
    config: EngineConfig,
    state: PlacementState,
    /// Dense class -> display name
    class_names: Vec<String>,
    stats: RunStats,
}

impl PlacementEngine {
    /// Validate the config, derive availability and decompose assignments.
    pub fn new(input: &TimetableInput, config: EngineConfig) -> Result<Self, TimetableError> {
        config.validate()?;

        let declared = DeclaredAvailability::build(input, &config);
        let blocks = decompose(input, &declared, config.verbosity);

        let mut class_names = vec![String::new(); declared.classes().len()];
        for class in &input.classes {
            if let Some(idx) = declared.classes().get(class.id) {
                if class_names[idx].is_empty() {
                    class_names[idx] = class.name.clone();
                }
            }
        }

        let stats = RunStats {
            blocks: blocks.len(),
            ..Default::default()
        };

        Ok(Self {
            config,
            state: PlacementState::new(declared, blocks),
            class_names,
            stats,
        })
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the feasibility check, both phases and export the result.
    pub fn run(&mut self) -> Result<TimetableResult, TimetableError> {
        let verbosity = self.config.verbosity;

        self.check_feasibility()?;
        log_changes!(
            verbosity,
            "Placing {} blocks across {} classes",
            self.state.blocks().len(),
            self.class_names.len()
        );

        self.place_greedy()?;
        log_changes!(
            verbosity,
            "Greedy pass placed {} of {} blocks",
            self.stats.greedy_placed,
            self.stats.blocks
        );

        let stop = self.repair()?;
        log_changes!(
            verbosity,
            "Repair stopped ({:?}) after {} iterations, {} blocks still unplaced",
            stop,
            self.stats.repair_iterations,
            self.state.blocks().unplaced_count()
        );

        Ok(export(&self.state, &self.class_names, self.stats.clone()))
    }

    /// Fail before any placement if a teacher's demand exceeds their free hours.
    ///
    /// A teacher's free hours only shrink through their own placements, which
    /// shrink demand by the same amount, so passing here means the per-slot
    /// rankings of the greedy pass cannot fail later.
    pub fn check_feasibility(&self) -> Result<(), TimetableError> {
        rank_teachers(&self.state).map(|_| ())
    }

    /// Phase 1: walk slots scarcest first and place blocks of the most
    /// constrained teachers wherever the validity rules allow.
    pub fn place_greedy(&mut self) -> Result<usize, TimetableError> {
        let verbosity = self.config.verbosity;
        let slots = rank_slots(&self.state);
        let mut placed = 0;

        for difficulty in slots {
            let at = difficulty.slot;
            let ranked = rank_teachers(&self.state)?;
            let limit = self.config.constrained_teacher_limit.unwrap_or(ranked.len());
            let constrained: FxHashSet<DenseId> =
                ranked.iter().take(limit).map(|w| w.teacher).collect();

            log_debug!(
                verbosity,
                "Slot {:?} ({} free teachers), constrained teachers: {:?}",
                at,
                difficulty.free_teachers,
                ranked
                    .iter()
                    .take(limit)
                    .map(|w| (w.teacher_id, w.ratio))
                    .collect::<Vec<_>>()
            );

            for class in 0..self.state.blocks().class_count() {
                let candidates = self.state.blocks().class_blocks(class).to_vec();
                for idx in candidates {
                    let block = self.state.block(idx);
                    if block.is_placed() || !constrained.contains(&block.teacher) {
                        continue;
                    }
                    if !self.is_valid_placement(idx, at) {
                        continue;
                    }
                    self.state.commit(idx, at)?;
                    placed += 1;

                    let block = self.state.block(idx);
                    log_changes!(
                        verbosity,
                        "  Placed block {} (course {}, class {}, teacher {}) at {} hour {}, {}h",
                        block.block_id,
                        block.course_id,
                        block.class_id,
                        block.teacher_id,
                        at.day,
                        at.hour,
                        block.size
                    );
                }
            }
        }

        self.stats.greedy_placed += placed;
        Ok(placed)
    }

    /// Greedy-phase rules for putting the block's first hour at `at`.
    ///
    /// Every covered hour must be open with a free class cell and a free
    /// teacher. The hours just before and after the block may not hold a
    /// lesson by the same teacher in this class, and the class-day may not
    /// already hold this teacher's lesson of the same course.
    pub fn is_valid_placement(&self, idx: BlockIdx, at: TimeSlot) -> bool {
        let verbosity = self.config.verbosity;
        let state = &self.state;
        let calendar = state.calendar();
        let block = state.block(idx);

        if block.is_placed() {
            return false;
        }
        let Some(hours) = calendar.block_hours(at.hour, block.size) else {
            return false;
        };
        let end = hours.end;

        for hour in hours {
            let Some(slot) = calendar.index(at.day, hour) else {
                return false;
            };
            if !state.open_hours().is_open_idx(slot)
                || !state.class_free(block.class, slot)
                || !state.teacher_free(block.teacher, slot)
            {
                return false;
            }
        }

        let same_teacher = |hour: u8| {
            state
                .lesson_at(block.class, at.day, hour)
                .is_some_and(|other| other.teacher_id == block.teacher_id)
        };
        if (at.hour > 1 && same_teacher(at.hour - 1)) || same_teacher(end) {
            log_checks!(
                verbosity,
                "  Block {} at {} hour {}: same teacher in an adjacent hour",
                block.block_id,
                at.day,
                at.hour
            );
            return false;
        }

        let repeats_course = state.open_hours().hours(at.day).iter().any(|&hour| {
            state.lesson_at(block.class, at.day, hour).is_some_and(|other| {
                other.teacher_id == block.teacher_id && other.course_id == block.course_id
            })
        });
        if repeats_course {
            log_checks!(
                verbosity,
                "  Block {} at {}: course already taught that day",
                block.block_id,
                at.day
            );
            return false;
        }

        true
    }

    /// Phase 2: repeat repair iterations until every block is placed, an
    /// iteration changes nothing, or a limit is hit.
    pub fn repair(&mut self) -> Result<RepairStop, TimetableError> {
        let verbosity = self.config.verbosity;
        let started = Instant::now();
        let budget = self.config.repair_time_budget_ms.map(Duration::from_millis);
        let mut iterations = 0;

        let stop = loop {
            if self.state.blocks().unplaced_count() == 0 {
                break RepairStop::Completed;
            }
            if iterations >= self.config.max_repair_iterations {
                break RepairStop::IterationLimit;
            }
            if budget.is_some_and(|budget| started.elapsed() >= budget) {
                break RepairStop::TimeBudget;
            }

            let progress = self.repair_iteration()?;
            iterations += 1;
            log_debug!(
                verbosity,
                "Repair iteration {}: placed {}, evicted {}",
                iterations,
                progress.placed,
                progress.evicted
            );
            if progress.is_idle() {
                break RepairStop::Stalled;
            }
        };

        self.stats.repair_iterations += iterations;
        self.stats.repair_stop = Some(stop);
        Ok(stop)
    }

    /// One pass over a snapshot of the unplaced blocks, class by class.
    ///
    /// Blocks evicted during the pass wait for the next one.
    pub fn repair_iteration(&mut self) -> Result<RepairProgress, TimetableError> {
        let mut progress = RepairProgress::default();
        let snapshot = self.state.blocks().unplaced_by_class();
        for (_, pending) in snapshot {
            for idx in pending {
                if self.state.block(idx).is_placed() {
                    continue;
                }
                let outcome = self.try_swap_placement(idx)?;
                progress.evicted += outcome.evicted;
                if outcome.placed {
                    progress.placed += 1;
                }
            }
        }
        self.stats.repair_placed += progress.placed;
        self.stats.evictions += progress.evicted;
        Ok(progress)
    }

    /// Try to place one block, evicting whatever blocks its first free class slot.
    pub fn try_swap_placement(&mut self, idx: BlockIdx) -> Result<SwapOutcome, TimetableError> {
        let verbosity = self.config.verbosity;
        let Some(at) = self.find_available_slot(idx) else {
            log_checks!(
                verbosity,
                "  Block {}: no free class slot",
                self.state.block(idx).block_id
            );
            return Ok(SwapOutcome::default());
        };

        if !check_block_conflict(&self.state, idx, at) {
            let placed = self.commit_if_teacher_free(idx, at)?;
            return Ok(SwapOutcome { placed, evicted: 0 });
        }

        let conflicting = find_conflicting_blocks(&self.state, idx, at);
        let evicted = evict_blocks(&mut self.state, &conflicting, verbosity);

        let placed = match self.find_available_slot(idx) {
            Some(retry) if !check_block_conflict(&self.state, idx, retry) => {
                self.commit_if_teacher_free(idx, retry)?
            }
            _ => false,
        };
        Ok(SwapOutcome { placed, evicted })
    }

    /// First slot in canonical order where every hour of the block is open
    /// and free for its class. Teacher availability is not considered.
    pub fn find_available_slot(&self, idx: BlockIdx) -> Option<TimeSlot> {
        let state = &self.state;
        let calendar = state.calendar();
        let block = state.block(idx);

        state.open_hours().slots().find(|at| {
            calendar
                .block_hours(at.hour, block.size)
                .is_some_and(|mut hours| {
                    hours.all(|hour| {
                        calendar.index(at.day, hour).is_some_and(|slot| {
                            state.open_hours().is_open_idx(slot)
                                && state.class_free(block.class, slot)
                        })
                    })
                })
        })
    }

    /// Commit under the hard rules only, if the teacher is free at every hour.
    fn commit_if_teacher_free(
        &mut self,
        idx: BlockIdx,
        at: TimeSlot,
    ) -> Result<bool, TimetableError> {
        let verbosity = self.config.verbosity;
        let calendar = self.state.calendar();
        let block = self.state.block(idx);
        let teacher_free = calendar
            .block_hours(at.hour, block.size)
            .is_some_and(|mut hours| {
                hours.all(|hour| {
                    calendar
                        .index(at.day, hour)
                        .is_some_and(|slot| self.state.teacher_free(block.teacher, slot))
                })
            });
        if !teacher_free {
            log_checks!(
                verbosity,
                "  Block {}: teacher {} unavailable at {} hour {}",
                block.block_id,
                block.teacher_id,
                at.day,
                at.hour
            );
            return Ok(false);
        }

        self.state.commit(idx, at)?;
        let block = self.state.block(idx);
        log_changes!(
            verbosity,
            "  Repair placed block {} (course {}, class {}, teacher {}) at {} hour {}",
            block.block_id,
            block.course_id,
            block.class_id,
            block.teacher_id,
            at.day,
            at.hour
        );
        Ok(true)
    }
}
