//! Reservation stations: IRS, MRS, LSQ. Each holds non-owning
//! [`RobTag`]s into ROB-resident IQEs (spec.md §4.5, §9's
//! "ROB-owned IQEs, RS references" note).

use super::iqe::RobTag;
use super::rob::Rob;

/// A bounded, capacity-checked queue of [`RobTag`]s in dispatch order.
///
/// Because entries are pushed strictly in dispatch-timestamp order, a
/// front-to-back scan for the first ready entry already yields the
/// *oldest* ready entry — no separate sort is needed.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    capacity: usize,
    entries: Vec<RobTag>,
}

impl ReservationStation {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Vec::with_capacity(capacity) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has_space(&self) -> bool {
        self.entries.len() < self.capacity
    }

    pub fn push(&mut self, tag: RobTag) -> bool {
        if !self.has_space() {
            return false;
        }
        self.entries.push(tag);
        true
    }

    /// Picks the oldest entry whose operands are all ready, removes it
    /// from the station, and returns its tag for issue to a functional
    /// unit.
    pub fn issue_oldest_ready(&mut self, rob: &Rob) -> Option<RobTag> {
        let pos = self.entries.iter().position(|&tag| {
            rob.find(tag).is_some_and(super::iqe::Iqe::operands_ready)
        })?;
        Some(self.entries.remove(pos))
    }

    /// Drops every entry whose dispatch timestamp is strictly greater
    /// than `after`, on squash (spec.md §4.7 step 3).
    pub fn flush_after(&mut self, after: RobTag) {
        self.entries.retain(|tag| tag.0 <= after.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = RobTag> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::cc::Cc;
    use crate::config::Config;
    use crate::core::bis::BisSnapshot;
    use crate::core::iqe::Iqe;
    use crate::isa::op::Op;

    fn dummy_iqe(tag: u64, ready: bool) -> Iqe {
        let config = Config::default();
        Iqe {
            tag: RobTag(tag),
            op: Op::Add,
            pc: 4000,
            next_pc: 4004,
            rd: 1,
            rs1: 33,
            rs2: 34,
            rs3: -1,
            imm: -1,
            cc: 0,
            prev_rd: -1,
            prev_cc: -1,
            rs1_value: 0,
            rs2_value: 0,
            rs3_value: 0,
            rs1_valid: ready,
            rs2_valid: ready,
            rs3_valid: true,
            cc_input: Cc::default(),
            cc_input_valid: true,
            result_buffer: 0,
            cc_value: Cc::default(),
            ras_done_at_fetch: false,
            completed: false,
            bis: BisSnapshot::blank(&config),
        }
    }

    #[test]
    fn capacity_is_enforced() {
        let mut rs = ReservationStation::new(1);
        assert!(rs.push(RobTag(0)));
        assert!(!rs.push(RobTag(1)));
    }

    #[test]
    fn issue_picks_oldest_ready_not_merely_first() {
        let mut rob = Rob::new(8);
        rob.allocate(dummy_iqe(0, false)).expect("should allocate");
        rob.allocate(dummy_iqe(1, true)).expect("should allocate");
        let mut rs = ReservationStation::new(8);
        rs.push(RobTag(0));
        rs.push(RobTag(1));
        let issued = rs.issue_oldest_ready(&rob).expect("one entry ready");
        assert_eq!(issued, RobTag(1));
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn flush_after_drops_younger_entries() {
        let mut rs = ReservationStation::new(8);
        rs.push(RobTag(0));
        rs.push(RobTag(1));
        rs.push(RobTag(2));
        rs.flush_after(RobTag(0));
        assert_eq!(rs.iter().collect::<Vec<_>>(), vec![RobTag(0)]);
    }
}
