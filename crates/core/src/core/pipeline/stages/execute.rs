//! IntFU, MulFU, MemFU: timed execution and writeback (spec.md §4.6),
//! including IntFU's branch resolution and the BIS-based squash recovery
//! of spec.md §4.7.

use crate::common::cc::Cc;
use crate::common::error::SimResult;
use crate::core::cpu::Cpu;
use crate::core::iqe::{Iqe, RobTag};
use crate::core::predictor::PredictorKind;
use crate::isa::instruction::SENTINEL;
use crate::isa::op::Op;

/// Drops every piece of in-flight state younger than `offending`, then
/// restores rename/predictor/RAS/forwarding from its own BIS snapshot —
/// the full recovery procedure of spec.md §4.7, steps 1–5. Step 6 (set
/// PC to the resolved target) is the caller's job since only it knows
/// the resolved target.
fn squash(cpu: &mut Cpu, offending: &Iqe) {
    let after = offending.tag;
    cpu.trace_log("FL", &format!("squash after tag={}", after.0));

    cpu.fetch_latch = None;
    cpu.decode1_latch = None;
    cpu.decode2_latch = None;

    cpu.int_fu.flush_after(after);
    cpu.mul_fu.flush_after(after);
    cpu.mem_fu.flush_after(after);

    cpu.irs.flush_after(after);
    cpu.mrs.flush_after(after);
    cpu.lsq.flush_after(after);
    let _removed = cpu.rob.flush_after(after);

    cpu.rename = offending.bis.rename.clone();
    cpu.predictor = offending.bis.predictor.clone();
    cpu.ras = offending.bis.ras.clone();
    cpu.fwd_uprf = offending.bis.fwd_uprf.clone();
    cpu.fwd_ucrf = offending.bis.fwd_ucrf.clone();
}

fn predictor_kind(op: Op) -> PredictorKind {
    match op {
        Op::Jalp => PredictorKind::Jalp,
        Op::Ret => PredictorKind::Ret,
        _ => PredictorKind::Branch,
    }
}

/// Resolves a control-flow op's target against the speculative `next_pc`
/// Fetch recorded, squashing and restoring on a misprediction (spec.md
/// §4.6). RAS reconciliation for JALP/RET applies unconditionally
/// whenever Fetch didn't already do the push/pop — independent of
/// whether the prediction was correct.
fn resolve_branch(cpu: &mut Cpu, iqe: &Iqe, resolved_target: i32) -> SimResult<()> {
    let mispredicted = resolved_target != iqe.next_pc;
    if mispredicted {
        cpu.stats.mispredictions += 1;
        squash(cpu, iqe);
    }

    if !iqe.ras_done_at_fetch {
        match iqe.op {
            Op::Jalp => cpu.ras.push(iqe.pc + 4)?,
            Op::Ret => {
                let _ = cpu.ras.pop()?;
            }
            _ => {}
        }
    }

    cpu.predictor.update(iqe.pc, resolved_target, predictor_kind(iqe.op));

    if mispredicted {
        cpu.pc = resolved_target;
    }
    Ok(())
}

fn branch_taken(op: Op, cc: Cc) -> bool {
    match op {
        Op::Bz => cc.z,
        Op::Bnz => !cc.z,
        Op::Bp => cc.p,
        Op::Bn => cc.n,
        Op::Bnp => !cc.p,
        _ => false,
    }
}

/// Computes an IntFU-class op's result/CC and, for control-flow ops,
/// its resolved target; writes back into the ROB-resident IQE.
fn execute_int(cpu: &mut Cpu, tag: RobTag) -> SimResult<()> {
    let Some(iqe) = cpu.rob.find(tag) else { return Ok(()) };
    let iqe = iqe.clone();

    let mut result = 0i32;
    let mut cc_value = Cc::default();
    let mut resolved_target = None;

    match iqe.op {
        Op::Add => {
            result = iqe.rs1_value.wrapping_add(iqe.rs2_value);
            cc_value = Cc::from_result(result);
        }
        Op::Sub => {
            result = iqe.rs1_value.wrapping_sub(iqe.rs2_value);
            cc_value = Cc::from_result(result);
        }
        Op::And => {
            result = iqe.rs1_value & iqe.rs2_value;
            cc_value = Cc::from_result(result);
        }
        Op::Or => {
            result = iqe.rs1_value | iqe.rs2_value;
            cc_value = Cc::from_result(result);
        }
        Op::Xor => {
            result = iqe.rs1_value ^ iqe.rs2_value;
            cc_value = Cc::from_result(result);
        }
        Op::Addl => {
            result = iqe.rs1_value.wrapping_add(iqe.imm);
            cc_value = Cc::from_result(result);
        }
        Op::Subl => {
            result = iqe.rs1_value.wrapping_sub(iqe.imm);
            cc_value = Cc::from_result(result);
        }
        Op::Movc => {
            result = iqe.imm;
        }
        Op::Cmp => {
            cc_value = Cc::from_result(iqe.rs1_value.wrapping_sub(iqe.rs2_value));
        }
        Op::Cml => {
            cc_value = Cc::from_result(iqe.rs1_value.wrapping_sub(iqe.imm));
        }
        Op::Bz | Op::Bnz | Op::Bp | Op::Bn | Op::Bnp => {
            let taken = branch_taken(iqe.op, iqe.cc_input);
            resolved_target = Some(if taken { iqe.pc + iqe.imm } else { iqe.pc + 4 });
        }
        Op::Jump => {
            resolved_target = Some(iqe.rs1_value + iqe.imm);
        }
        Op::Jalp => {
            result = iqe.pc + 4;
            resolved_target = Some(iqe.pc + iqe.imm);
        }
        Op::Ret => {
            resolved_target = Some(iqe.rs1_value);
        }
        Op::Halt | Op::Nop => {}
        // Dispatch only ever routes these three classes to IntFU; MUL/DIV
        // and the memory ops never reach this function.
        Op::Mul | Op::Div | Op::Load | Op::Store | Op::Ldr | Op::Str => {}
    }

    if let Some(target) = resolved_target {
        resolve_branch(cpu, &iqe, target)?;
    }

    if let Some(e) = cpu.rob.find_mut(tag) {
        e.result_buffer = result;
        e.cc_value = cc_value;
        e.completed = true;
    }
    if iqe.rd != SENTINEL {
        cpu.fwd_uprf.write(iqe.rd, result);
    }
    if iqe.op.writes_cc() {
        cpu.fwd_ucrf.write(iqe.cc, cc_value);
    }
    cpu.trace_log("FU", &format!("int tag={} {} -> {}", tag.0, iqe.op, result));
    Ok(())
}

/// Advances IntFU's countdown and, on completion, executes + writes back
/// (spec.md §4.6). Branch misprediction handling lives here since
/// resolution is defined to happen "in IntFU".
pub fn int_fu(cpu: &mut Cpu) -> SimResult<()> {
    if let Some(tag) = cpu.int_fu.tick() {
        execute_int(cpu, tag)?;
    }
    Ok(())
}

fn execute_mul(cpu: &mut Cpu, tag: RobTag) {
    let Some(iqe) = cpu.rob.find(tag) else { return };
    let iqe = iqe.clone();

    let result = match iqe.op {
        Op::Mul => iqe.rs1_value.wrapping_mul(iqe.rs2_value),
        Op::Div => {
            if iqe.rs2_value == 0 {
                0
            } else {
                iqe.rs1_value.wrapping_div(iqe.rs2_value)
            }
        }
        _ => 0,
    };
    let cc_value = Cc::from_result(result);

    if let Some(e) = cpu.rob.find_mut(tag) {
        e.result_buffer = result;
        e.cc_value = cc_value;
        e.completed = true;
    }
    if iqe.rd != SENTINEL {
        cpu.fwd_uprf.write(iqe.rd, result);
    }
    if iqe.op.writes_cc() {
        cpu.fwd_ucrf.write(iqe.cc, cc_value);
    }
    cpu.trace_log("FU", &format!("mul tag={} {} -> {}", tag.0, iqe.op, result));
}

/// Advances MulFU's countdown and, on completion, executes + writes back.
pub fn mul_fu(cpu: &mut Cpu) {
    if let Some(tag) = cpu.mul_fu.tick() {
        execute_mul(cpu, tag);
    }
}

/// MemFU computes the effective address only; the access itself happens
/// at commit (spec.md §4.6, §4.9). No forwarding happens here — a load's
/// *value* isn't known until its memory read at commit.
fn execute_mem(cpu: &mut Cpu, tag: RobTag) {
    let Some(iqe) = cpu.rob.find(tag) else { return };
    let iqe = iqe.clone();

    let addr = match iqe.op {
        Op::Load => iqe.rs1_value + iqe.imm,
        Op::Ldr => iqe.rs1_value + iqe.rs2_value,
        Op::Store => iqe.rs2_value + iqe.imm,
        Op::Str => iqe.rs2_value + iqe.rs3_value,
        _ => 0,
    };

    if let Some(e) = cpu.rob.find_mut(tag) {
        e.result_buffer = addr;
        e.completed = true;
    }
    cpu.trace_log("FU", &format!("mem tag={} {} addr={}", tag.0, iqe.op, addr));
}

/// Advances MemFU's countdown and, on completion, computes the address.
pub fn mem_fu(cpu: &mut Cpu) {
    if let Some(tag) = cpu.mem_fu.tick() {
        execute_mem(cpu, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bnp_is_taken_when_not_positive() {
        assert!(branch_taken(Op::Bnp, Cc { z: true, n: false, p: false }));
        assert!(branch_taken(Op::Bnp, Cc { z: false, n: true, p: false }));
        assert!(!branch_taken(Op::Bnp, Cc { z: false, n: false, p: true }));
    }

    #[test]
    fn bnz_is_taken_when_not_zero() {
        assert!(branch_taken(Op::Bnz, Cc { z: false, n: true, p: false }));
        assert!(!branch_taken(Op::Bnz, Cc { z: true, n: false, p: false }));
    }
}
