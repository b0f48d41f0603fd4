//! Decode1/Decode2 and rename (spec.md §4.4).
//!
//! Decode1 and Decode2 are named stage functions purely to preserve
//! spec.md §5's fixed eight-phase cycle; the actual work — renaming
//! sources and the destination, capturing the BIS snapshot, and
//! dispatching into the ROB and the target reservation station — happens
//! atomically in [`try_dispatch`], called from `forward_pipeline` (the
//! stage spec.md §9 calls out as where "dispatch from Decode2 to ROB+RS"
//! happens). Doing the rename any earlier would let a dispatch that then
//! stalls on a full ROB/RS leave a half-renamed instruction with no way
//! to undo the allocation it already made.

use crate::common::cc::Cc;
use crate::common::error::SimResult;
use crate::core::bis::BisSnapshot;
use crate::core::cpu::Cpu;
use crate::core::iqe::Iqe;
use crate::core::regfile::Uprf;
use crate::isa::instruction::{Instruction, SENTINEL};
use crate::isa::op::OpClass;

/// Decode1 does no work of its own; the instruction just sits in its
/// latch for one cycle before `forward_pipeline` advances it.
pub fn decode1(_cpu: &mut Cpu) {}

/// Decode2 likewise does no work directly; see the module docs.
pub fn decode2(_cpu: &mut Cpu) {}

/// Renames one physical source operand, fetching its value from the
/// **architectural** bank (spec.md §4.5's "operand capture at make-IQE").
/// A sentinel operand index needs no value and is trivially "valid".
fn capture_operand(bank: &Uprf, phys: i32) -> (i32, bool) {
    if phys < 0 {
        return (0, true);
    }
    match bank.read(phys) {
        Some(v) => (v, true),
        None => (0, false),
    }
}

/// Attempts to rename and dispatch the instruction sitting in
/// `cpu.decode2_latch`. Returns `Ok(true)` if dispatch happened (the
/// latch is now clear), `Ok(false)` if it stalled (ROB/RS full — the
/// latch is untouched and no rename was performed), and `Err` only on a
/// fatal free-list exhaustion (should not happen with well-sized pools,
/// but `RenameTable` returns a real `Result` rather than panicking).
pub fn try_dispatch(cpu: &mut Cpu) -> SimResult<bool> {
    let Some(entry) = cpu.decode2_latch else {
        return Ok(false);
    };
    let inst: Instruction = entry.inst;
    let class = inst.op.class();
    let rs_has_space = match class {
        OpClass::Irs => cpu.irs.has_space(),
        OpClass::Mrs => cpu.mrs.has_space(),
        OpClass::Lsq => cpu.lsq.has_space(),
    };
    if !cpu.rob.has_space() {
        cpu.stats.rob_dispatch_stalls += 1;
        return Ok(false);
    }
    if !rs_has_space {
        match class {
            OpClass::Irs => cpu.stats.irs_dispatch_stalls += 1,
            OpClass::Mrs => cpu.stats.mrs_dispatch_stalls += 1,
            OpClass::Lsq => cpu.stats.lsq_dispatch_stalls += 1,
        }
        return Ok(false);
    }

    // Rename sources first (spec.md §4.4).
    let rs1 = if inst.rs1 == SENTINEL { SENTINEL } else { cpu.rename.map_source(inst.rs1) };
    let rs2 = if inst.rs2 == SENTINEL { SENTINEL } else { cpu.rename.map_source(inst.rs2) };
    let rs3 = if inst.rs3 == SENTINEL { SENTINEL } else { cpu.rename.map_source(inst.rs3) };

    let (rs1_value, rs1_valid) = capture_operand(&cpu.arch_uprf, rs1);
    let (rs2_value, rs2_valid) = capture_operand(&cpu.arch_uprf, rs2);
    let (rs3_value, rs3_valid) = capture_operand(&cpu.arch_uprf, rs3);

    let (cc_input, cc_input_valid) = if inst.op.reads_cc() {
        let idx = cpu.rename.current_cc();
        match cpu.arch_ucrf.read(idx) {
            Some(c) => (c, true),
            None => (Cc::default(), false),
        }
    } else {
        (Cc::default(), true)
    };

    // Then the destination: allocates a fresh physical slot, displacing
    // the previous mapping (released to the free list at commit).
    let (rd, prev_rd) = if inst.rd == SENTINEL {
        (SENTINEL, SENTINEL)
    } else {
        cpu.rename.map_dest(inst.rd)?
    };
    let (cc, prev_cc) = if inst.op.writes_cc() {
        cpu.rename.map_cc()?
    } else {
        (cpu.rename.current_cc(), SENTINEL)
    };

    if rd != SENTINEL {
        cpu.arch_uprf.invalidate(rd);
        cpu.fwd_uprf.invalidate(rd);
    }
    if inst.op.writes_cc() {
        cpu.arch_ucrf.invalidate(cc);
        cpu.fwd_ucrf.invalidate(cc);
    }

    // BIS snapshot: taken *after* this instruction's own rename effects,
    // so restoring it on a later squash undoes everything younger while
    // keeping this instruction's own renames intact (spec.md §4.7).
    let bis = BisSnapshot::capture(&cpu.rename, &cpu.predictor, &cpu.ras, &cpu.fwd_uprf, &cpu.fwd_ucrf);

    let tag = cpu.rob.peek_next_tag();
    let iqe = Iqe {
        tag,
        op: inst.op,
        pc: inst.pc,
        next_pc: inst.next_pc,
        rd,
        rs1,
        rs2,
        rs3,
        imm: inst.imm,
        cc,
        prev_rd,
        prev_cc,
        rs1_value,
        rs2_value,
        rs3_value,
        rs1_valid,
        rs2_valid,
        rs3_valid,
        cc_input,
        cc_input_valid,
        result_buffer: 0,
        cc_value: Cc::default(),
        ras_done_at_fetch: entry.ras_done_at_fetch,
        completed: false,
        bis,
    };

    cpu.trace_log("D2", &format!("dispatch tag={} {}", tag.0, inst));
    let _ = cpu.rob.allocate(iqe)?;
    let pushed = match class {
        OpClass::Irs => cpu.irs.push(tag),
        OpClass::Mrs => cpu.mrs.push(tag),
        OpClass::Lsq => cpu.lsq.push(tag),
    };
    debug_assert!(pushed, "capacity was checked above");
    cpu.decode2_latch = None;
    Ok(true)
}
