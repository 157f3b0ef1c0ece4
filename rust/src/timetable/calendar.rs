//! The fixed weekly calendar: ordered days, ordered hours, dense slot indices.

use chrono::Weekday;
use std::cmp::Ordering;
use std::ops::Range;

/// Canonical day order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Dense index of a (day, hour) cell: `day * hours_per_day + (hour - 1)`.
pub type SlotIdx = usize;

/// A (day, hour) coordinate in the weekly calendar.
///
/// Ordered by day (Monday first), then hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub day: Weekday,
    pub hour: u8,
}

impl TimeSlot {
    pub fn new(day: Weekday, hour: u8) -> Self {
        Self { day, hour }
    }
}

impl Ord for TimeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .num_days_from_monday()
            .cmp(&other.day.num_days_from_monday())
            .then(self.hour.cmp(&other.hour))
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hour domain `1..=hours_per_day` over the seven-day week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calendar {
    hours_per_day: u8,
}

impl Calendar {
    pub fn new(hours_per_day: u8) -> Self {
        Self { hours_per_day }
    }

    pub fn hours_per_day(&self) -> u8 {
        self.hours_per_day
    }

    /// Number of cells in a dense per-entity grid.
    pub fn slot_count(&self) -> usize {
        WEEK.len() * self.hours_per_day as usize
    }

    #[inline]
    pub fn contains_hour(&self, hour: u8) -> bool {
        (1..=self.hours_per_day).contains(&hour)
    }

    /// Hours of the domain in ascending order.
    pub fn hours(&self) -> impl Iterator<Item = u8> {
        1..=self.hours_per_day
    }

    /// Dense index of a cell, or None when the hour is outside the domain.
    #[inline]
    pub fn index(&self, day: Weekday, hour: u8) -> Option<SlotIdx> {
        if !self.contains_hour(hour) {
            return None;
        }
        Some(
            day.num_days_from_monday() as usize * self.hours_per_day as usize
                + (hour as usize - 1),
        )
    }

    /// Hours `start..start + size`, or None if any of them leaves the domain.
    pub fn block_hours(&self, start: u8, size: u8) -> Option<Range<u8>> {
        let end = start as u16 + size as u16;
        if start == 0 || size == 0 || end - 1 > self.hours_per_day as u16 {
            return None;
        }
        Some(start..end as u8)
    }

    /// Inverse of [`Calendar::index`].
    pub fn slot(&self, idx: SlotIdx) -> TimeSlot {
        let per_day = self.hours_per_day as usize;
        TimeSlot {
            day: WEEK[idx / per_day],
            hour: (idx % per_day) as u8 + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ordering_is_day_then_hour() {
        let mut slots = vec![
            TimeSlot::new(Weekday::Tue, 1),
            TimeSlot::new(Weekday::Mon, 5),
            TimeSlot::new(Weekday::Sun, 2),
            TimeSlot::new(Weekday::Mon, 2),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                TimeSlot::new(Weekday::Mon, 2),
                TimeSlot::new(Weekday::Mon, 5),
                TimeSlot::new(Weekday::Tue, 1),
                TimeSlot::new(Weekday::Sun, 2),
            ]
        );
    }

    #[test]
    fn test_index_round_trip_and_bounds() {
        let calendar = Calendar::new(10);
        assert_eq!(calendar.slot_count(), 70);
        assert_eq!(calendar.index(Weekday::Mon, 1), Some(0));
        assert_eq!(calendar.index(Weekday::Wed, 4), Some(23));
        assert_eq!(calendar.slot(23), TimeSlot::new(Weekday::Wed, 4));
        assert_eq!(calendar.index(Weekday::Mon, 0), None);
        assert_eq!(calendar.index(Weekday::Mon, 11), None);
    }

    #[test]
    fn test_block_hours_stay_in_domain() {
        let calendar = Calendar::new(5);
        assert_eq!(calendar.block_hours(1, 3), Some(1..4));
        assert_eq!(calendar.block_hours(3, 3), Some(3..6));
        assert_eq!(calendar.block_hours(4, 3), None);
        assert_eq!(calendar.block_hours(0, 1), None);
        assert_eq!(calendar.block_hours(2, 0), None);
        assert_eq!(calendar.block_hours(5, 255), None);
    }
}
