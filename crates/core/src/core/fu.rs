//! Functional units: a one-entry pipeline with a fixed latency countdown
//! (spec.md §4.6). Each FU holds only a [`RobTag`] — never a copy of the
//! IQE — so the ROB stays the single source of truth for its contents.

use super::iqe::RobTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    tag: RobTag,
    cycles_left: u64,
}

/// A single-slot, fixed-latency functional unit.
#[derive(Debug, Clone)]
pub struct FunctionalUnit {
    latency: u64,
    in_flight: Option<InFlight>,
}

impl FunctionalUnit {
    #[must_use]
    pub fn new(latency: u64) -> Self {
        Self { latency: latency.max(1), in_flight: None }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accepts a newly issued instruction; `false` if already busy.
    pub fn accept(&mut self, tag: RobTag) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(InFlight { tag, cycles_left: self.latency });
        true
    }

    /// Advances the countdown by one cycle. Returns the tag that just
    /// reached zero (ready for this cycle's execute/writeback), if any,
    /// clearing the slot so the unit is free next cycle.
    pub fn tick(&mut self) -> Option<RobTag> {
        let slot = self.in_flight.as_mut()?;
        slot.cycles_left -= 1;
        if slot.cycles_left == 0 {
            let tag = slot.tag;
            self.in_flight = None;
            Some(tag)
        } else {
            None
        }
    }

    /// Drops the in-flight instruction if its tag is strictly younger
    /// than `after`, on squash (spec.md §4.7 step 2).
    pub fn flush_after(&mut self, after: RobTag) {
        if self.in_flight.is_some_and(|f| f.tag.0 > after.0) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cycle_latency_completes_next_tick() {
        let mut fu = FunctionalUnit::new(1);
        assert!(fu.accept(RobTag(0)));
        assert_eq!(fu.tick(), Some(RobTag(0)));
        assert!(!fu.is_busy());
    }

    #[test]
    fn multi_cycle_latency_holds_until_countdown_ends() {
        let mut fu = FunctionalUnit::new(4);
        fu.accept(RobTag(0));
        assert_eq!(fu.tick(), None);
        assert_eq!(fu.tick(), None);
        assert_eq!(fu.tick(), None);
        assert_eq!(fu.tick(), Some(RobTag(0)));
    }

    #[test]
    fn busy_unit_rejects_new_work() {
        let mut fu = FunctionalUnit::new(4);
        assert!(fu.accept(RobTag(0)));
        assert!(!fu.accept(RobTag(1)));
    }

    #[test]
    fn flush_after_drops_only_younger_in_flight() {
        let mut fu = FunctionalUnit::new(4);
        fu.accept(RobTag(5));
        fu.flush_after(RobTag(5));
        assert!(fu.is_busy());
        fu.flush_after(RobTag(4));
        assert!(!fu.is_busy());
    }
}
