//! Reorder buffer: sole owner of in-flight [`Iqe`] storage, ordered FIFO
//! by program order (spec.md §4.8).
//!
//! Modelled as a circular buffer of capacity ≥ 80, the way the teacher's
//! own ROB is built — RS/FU only ever hold a [`RobTag`], never a copy of
//! the entry itself, so writeback and commit can't desynchronize.

use super::iqe::{Iqe, RobTag};
use crate::common::error::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct Rob {
    entries: Vec<Option<Iqe>>,
    head: usize,
    count: usize,
    next_tag: u64,
}

impl Rob {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: (0..capacity).map(|_| None).collect(), head: 0, count: 0, next_tag: 0 }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn has_space(&self) -> bool {
        self.count < self.capacity()
    }

    /// The tag the *next* [`Self::allocate`] call will hand out, without
    /// consuming it — used by Dispatch to stamp the IQE before insertion.
    #[must_use]
    pub fn peek_next_tag(&self) -> RobTag {
        RobTag(self.next_tag)
    }

    /// Appends `iqe` at the tail. The caller must already have stamped
    /// `iqe.tag` with [`Self::peek_next_tag`].
    pub fn allocate(&mut self, iqe: Iqe) -> SimResult<RobTag> {
        if !self.has_space() {
            return Err(SimError::RobOverflow);
        }
        let tag = iqe.tag;
        let tail = (self.head + self.count) % self.capacity();
        self.entries[tail] = Some(iqe);
        self.count += 1;
        self.next_tag += 1;
        Ok(tag)
    }

    fn position_of(&self, tag: RobTag) -> Option<usize> {
        for i in 0..self.count {
            let idx = (self.head + i) % self.capacity();
            if self.entries[idx].as_ref().is_some_and(|e| e.tag == tag) {
                return Some(idx);
            }
        }
        None
    }

    #[must_use]
    pub fn find(&self, tag: RobTag) -> Option<&Iqe> {
        self.position_of(tag).and_then(|i| self.entries[i].as_ref())
    }

    pub fn find_mut(&mut self, tag: RobTag) -> Option<&mut Iqe> {
        self.position_of(tag).and_then(move |i| self.entries[i].as_mut())
    }

    #[must_use]
    pub fn peek_head(&self) -> Option<&Iqe> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.head].as_ref()
    }

    /// Removes and returns the head entry unconditionally; the caller
    /// (the commit stage) is responsible for only calling this when the
    /// head is completed.
    pub fn commit_head(&mut self) -> Option<Iqe> {
        if self.count == 0 {
            return None;
        }
        let iqe = self.entries[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        iqe
    }

    /// Removes every entry with `tag.0 > tag.0` of `after`, used on
    /// squash (spec.md §4.7 step 4). Returns the removed entries in no
    /// particular order.
    pub fn flush_after(&mut self, after: RobTag) -> Vec<Iqe> {
        let mut removed = Vec::new();
        let mut kept = Vec::new();
        for i in 0..self.count {
            let idx = (self.head + i) % self.capacity();
            if let Some(iqe) = self.entries[idx].take() {
                if iqe.tag.0 > after.0 {
                    removed.push(iqe);
                } else {
                    kept.push(iqe);
                }
            }
        }
        self.head = 0;
        self.count = kept.len();
        for (i, iqe) in kept.into_iter().enumerate() {
            self.entries[i] = Some(iqe);
        }
        removed
    }

    /// Iterates every live entry, head to tail (program order).
    pub fn iter(&self) -> impl Iterator<Item = &Iqe> {
        (0..self.count).map(move |i| {
            let idx = (self.head + i) % self.capacity();
            #[allow(clippy::unwrap_used)]
            self.entries[idx].as_ref().unwrap()
        })
    }

    /// Mutably iterates every live entry, head to tail — used to refresh
    /// pending operands against the forwarding banks each cycle (spec.md
    /// §4.5's operand-capture rule).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Iqe> {
        let head = self.head;
        let count = self.count;
        let capacity = self.entries.len();
        self.entries.iter_mut().enumerate().filter_map(move |(idx, slot)| {
            let rel = (idx + capacity - head) % capacity;
            if rel < count { slot.as_mut() } else { None }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::cc::Cc;
    use crate::config::Config;
    use crate::core::bis::BisSnapshot;
    use crate::isa::op::Op;

    fn dummy_iqe(tag: u64, op: Op) -> Iqe {
        let config = Config::default();
        Iqe {
            tag: RobTag(tag),
            op,
            pc: 4000,
            next_pc: 4004,
            rd: -1,
            rs1: -1,
            rs2: -1,
            rs3: -1,
            imm: -1,
            cc: 0,
            prev_rd: -1,
            prev_cc: -1,
            rs1_value: 0,
            rs2_value: 0,
            rs3_value: 0,
            rs1_valid: true,
            rs2_valid: true,
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
    fn allocate_and_commit_in_order() {
        let mut rob = Rob::new(4);
        let t0 = rob.peek_next_tag();
        rob.allocate(dummy_iqe(t0.0, Op::Nop)).expect("should allocate");
        let t1 = rob.peek_next_tag();
        rob.allocate(dummy_iqe(t1.0, Op::Nop)).expect("should allocate");
        assert_eq!(rob.len(), 2);
        let committed = rob.commit_head().expect("head present");
        assert_eq!(committed.tag, t0);
        assert_eq!(rob.len(), 1);
    }

    #[test]
    fn full_rob_rejects_allocation() {
        let mut rob = Rob::new(1);
        let t0 = rob.peek_next_tag();
        rob.allocate(dummy_iqe(t0.0, Op::Nop)).expect("first fits");
        assert!(!rob.has_space());
        let t1 = rob.peek_next_tag();
        assert_eq!(rob.allocate(dummy_iqe(t1.0, Op::Nop)), Err(SimError::RobOverflow));
    }

    #[test]
    fn flush_after_drops_only_younger_entries() {
        let mut rob = Rob::new(8);
        for i in 0..4 {
            let t = rob.peek_next_tag();
            assert_eq!(t.0, i);
            rob.allocate(dummy_iqe(i, Op::Nop)).expect("should allocate");
        }
        let removed = rob.flush_after(RobTag(1));
        assert_eq!(removed.len(), 2);
        assert_eq!(rob.len(), 2);
        assert_eq!(rob.peek_head().map(|e| e.tag), Some(RobTag(0)));
    }

    #[test]
    fn find_mut_locates_by_tag_after_wraparound() {
        let mut rob = Rob::new(2);
        for i in 0..2 {
            let t = rob.peek_next_tag();
            rob.allocate(dummy_iqe(i, Op::Nop)).expect("should allocate");
            assert_eq!(t.0, i);
        }
        rob.commit_head();
        let t2 = rob.peek_next_tag();
        rob.allocate(dummy_iqe(t2.0, Op::Nop)).expect("should allocate after wrap");
        assert!(rob.find_mut(t2).is_some());
    }
}
