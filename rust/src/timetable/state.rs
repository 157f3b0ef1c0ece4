//! Live placement state: who occupies which cell right now.
//!
//! Remaining capacity is never stored. A cell is free for a class or teacher
//! when it is declared available and nothing occupies it, so commits and
//! evictions keep the schedule and the capacity view in step automatically.

use chrono::Weekday;

use crate::error::TimetableError;
use crate::interner::DenseId;

use super::availability::{DeclaredAvailability, OpenHours};
use super::blocks::{BlockIdx, BlockSet, CourseBlock};
use super::calendar::{Calendar, SlotIdx, TimeSlot};

/// Schedule grid plus teacher occupancy for one run.
#[derive(Clone, Debug)]
pub struct PlacementState {
    declared: DeclaredAvailability,
    blocks: BlockSet,
    slot_count: usize,
    /// Dense class × slot -> occupying block
    class_cells: Vec<Option<BlockIdx>>,
    /// Dense teacher × slot -> occupying block (in whichever class)
    teacher_cells: Vec<Option<BlockIdx>>,
}

impl PlacementState {
    /// Start from an empty schedule.
    pub fn new(declared: DeclaredAvailability, blocks: BlockSet) -> Self {
        let slot_count = declared.calendar().slot_count();
        let class_cells = vec![None; declared.classes().len() * slot_count];
        let teacher_cells = vec![None; declared.teachers().len() * slot_count];
        Self {
            declared,
            blocks,
            slot_count,
            class_cells,
            teacher_cells,
        }
    }

    pub fn declared(&self) -> &DeclaredAvailability {
        &self.declared
    }

    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    pub fn block(&self, idx: BlockIdx) -> &CourseBlock {
        self.blocks.get(idx)
    }

    pub fn calendar(&self) -> Calendar {
        self.declared.calendar()
    }

    pub fn open_hours(&self) -> &OpenHours {
        self.declared.open_hours()
    }

    #[inline]
    pub fn class_occupant(&self, class: DenseId, slot: SlotIdx) -> Option<BlockIdx> {
        self.class_cells[class * self.slot_count + slot]
    }

    #[inline]
    pub fn teacher_occupant(&self, teacher: DenseId, slot: SlotIdx) -> Option<BlockIdx> {
        self.teacher_cells[teacher * self.slot_count + slot]
    }

    /// Lesson in a class cell, None for empty cells and hours outside the domain.
    pub fn lesson_at(&self, class: DenseId, day: Weekday, hour: u8) -> Option<&CourseBlock> {
        let slot = self.calendar().index(day, hour)?;
        self.class_occupant(class, slot).map(|b| self.blocks.get(b))
    }

    /// Remaining capacity of a class cell.
    #[inline]
    pub fn class_free(&self, class: DenseId, slot: SlotIdx) -> bool {
        self.declared.class_declared(class, slot) && self.class_occupant(class, slot).is_none()
    }

    /// Remaining capacity of a teacher cell.
    #[inline]
    pub fn teacher_free(&self, teacher: DenseId, slot: SlotIdx) -> bool {
        self.declared.teacher_declared(teacher, slot)
            && self.teacher_occupant(teacher, slot).is_none()
    }

    /// Free hours and days with at least one free hour for a teacher.
    pub fn teacher_slack(&self, teacher: DenseId) -> (u32, u32) {
        let calendar = self.calendar();
        let mut hours = 0;
        let mut days = 0;
        for (day, open) in self.open_hours().by_day() {
            let free = open
                .iter()
                .filter_map(|&h| calendar.index(*day, h))
                .filter(|&slot| self.teacher_free(teacher, slot))
                .count() as u32;
            if free > 0 {
                hours += free;
                days += 1;
            }
        }
        (hours, days)
    }

    /// Occupy `block.size` hours starting at `at` and mark the block placed.
    ///
    /// Enforces the hard rules only: the block is not yet placed, every hour is
    /// open, the class cells are empty and the teacher is not teaching
    /// elsewhere. Nothing is mutated unless all checks pass.
    pub fn commit(&mut self, idx: BlockIdx, at: TimeSlot) -> Result<(), TimetableError> {
        let calendar = self.calendar();
        let block = self.blocks.get(idx);
        if block.is_placed() {
            return Err(TimetableError::AlreadyPlaced {
                block_id: block.block_id,
            });
        }

        let outside = TimetableError::OutsideOpenHours {
            block_id: block.block_id,
            day: at.day,
            hour: at.hour,
        };
        let hours = calendar.block_hours(at.hour, block.size).ok_or(outside.clone())?;
        let mut slots: Vec<SlotIdx> = Vec::with_capacity(block.size as usize);
        for hour in hours {
            let slot = calendar
                .index(at.day, hour)
                .filter(|&slot| self.open_hours().is_open_idx(slot))
                .ok_or(outside.clone())?;
            if self.class_occupant(block.class, slot).is_some() {
                return Err(TimetableError::CellOccupied {
                    class_id: block.class_id,
                    day: at.day,
                    hour,
                    block_id: block.block_id,
                });
            }
            if self.teacher_occupant(block.teacher, slot).is_some() {
                return Err(TimetableError::TeacherDoubleBooked {
                    teacher_id: block.teacher_id,
                    day: at.day,
                    hour,
                    block_id: block.block_id,
                });
            }
            slots.push(slot);
        }

        let (class, teacher) = (block.class, block.teacher);
        for slot in slots {
            self.class_cells[class * self.slot_count + slot] = Some(idx);
            self.teacher_cells[teacher * self.slot_count + slot] = Some(idx);
        }
        self.blocks.get_mut(idx).set_placement(Some(at));
        Ok(())
    }

    /// Remove a placed block from the schedule; returns false if it was not placed.
    pub fn evict(&mut self, idx: BlockIdx) -> bool {
        let calendar = self.calendar();
        let block = self.blocks.get(idx);
        let Some(at) = block.placement() else {
            return false;
        };
        let (class, teacher) = (block.class, block.teacher);
        if let Some(hours) = calendar.block_hours(at.hour, block.size) {
            for slot in hours.filter_map(|h| calendar.index(at.day, h)) {
                let class_cell = &mut self.class_cells[class * self.slot_count + slot];
                if *class_cell == Some(idx) {
                    *class_cell = None;
                }
                let teacher_cell = &mut self.teacher_cells[teacher * self.slot_count + slot];
                if *teacher_cell == Some(idx) {
                    *teacher_cell = None;
                }
            }
        }
        self.blocks.get_mut(idx).set_placement(None);
        true
    }
}
