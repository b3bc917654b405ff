//! Tracks which stations have been mutated since the last clean point.
//!
//! The host uses this to persist incrementally: only dirty stations need
//! their records rewritten. Call [`mark_clean`](DirtyTracker::mark_clean)
//! after persisting.

use crate::id::StationId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty: BTreeSet<StationId>,
    any_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a station as mutated.
    pub fn mark(&mut self, station: StationId) {
        self.dirty.insert(station);
        self.any_dirty = true;
    }

    /// Returns `true` if anything has been marked since the last clean.
    pub fn is_dirty(&self) -> bool {
        self.any_dirty
    }

    /// Returns `true` if the given station has been marked.
    pub fn is_station_dirty(&self, station: StationId) -> bool {
        self.dirty.contains(&station)
    }

    /// The set of all dirty station IDs.
    pub fn dirty_stations(&self) -> &BTreeSet<StationId> {
        &self.dirty
    }

    /// Reset all flags, marking everything as clean.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
        self.any_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_ids(count: usize) -> Vec<StationId> {
        let mut sm: SlotMap<StationId, ()> = SlotMap::with_key();
        (0..count).map(|_| sm.insert(())).collect()
    }

    #[test]
    fn initially_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert!(tracker.dirty_stations().is_empty());
    }

    #[test]
    fn mark_and_query() {
        let ids = make_ids(3);
        let mut tracker = DirtyTracker::new();
        tracker.mark(ids[0]);
        tracker.mark(ids[2]);

        assert!(tracker.is_dirty());
        assert!(tracker.is_station_dirty(ids[0]));
        assert!(!tracker.is_station_dirty(ids[1]));
        assert_eq!(tracker.dirty_stations().len(), 2);
    }

    #[test]
    fn duplicate_marks_idempotent() {
        let ids = make_ids(1);
        let mut tracker = DirtyTracker::new();
        tracker.mark(ids[0]);
        tracker.mark(ids[0]);
        assert_eq!(tracker.dirty_stations().len(), 1);
    }

    #[test]
    fn mark_clean_resets() {
        let ids = make_ids(2);
        let mut tracker = DirtyTracker::new();
        tracker.mark(ids[0]);
        tracker.mark(ids[1]);
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_station_dirty(ids[0]));
        assert!(tracker.dirty_stations().is_empty());
    }
}
