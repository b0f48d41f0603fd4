//! Single-entry latches between Fetch, Decode1, Decode2, and Dispatch.

use crate::isa::instruction::Instruction;

/// An in-flight instruction sitting in a latch, plus the one piece of
/// bookkeeping that doesn't fit spec.md §3's fixed decoded-instruction
/// shape but still has to ride along: whether Fetch already performed
/// the RAS push/pop this instruction implies (JALP/RET only). IntFU
/// needs this to decide whether to reconcile (spec.md §4.6).
#[derive(Debug, Clone, Copy)]
pub struct LatchEntry {
    pub inst: Instruction,
    pub ras_done_at_fetch: bool,
}

/// A single-slot latch: occupied or not, nothing more.
pub type Latch = Option<LatchEntry>;
