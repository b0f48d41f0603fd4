//! Fetch (spec.md §4.2): one in-order instruction per cycle into the
//! fetch latch, with PC-prediction via the branch predictor and the RAS.
//!
//! Fetch is the one stage that *writes into* a latch from a source other
//! than another latch (the decoded program), so — unlike Decode1/Decode2,
//! which are pure pass-through stage markers — it does its work here
//! rather than in `forward_pipeline`'s latch-to-latch movement.

use crate::common::error::SimResult;
use crate::core::cpu::Cpu;
use crate::core::pipeline::latches::LatchEntry;
use crate::isa::op::Op;

/// Computes the PC Fetch predicts will follow `inst`, and whether Fetch
/// performed a RAS push/pop for it (JALP/RET only), per spec.md §4.2.
///
/// A fetch-time RAS push/pop only ever runs when a predictor entry
/// already exists for this PC (`ras_done_at_fetch=true` below); in that
/// case IntFU never repeats the operation (spec.md §9's RAS-reconciliation
/// note), so a failure here has nowhere else to surface and must be
/// propagated rather than swallowed (spec.md §4.3, §7).
fn predict(cpu: &mut Cpu, op: Op, pc: i32, imm: i32) -> SimResult<(i32, bool)> {
    let fallthrough = pc + 4;
    Ok(match op {
        Op::Bz | Op::Bnz | Op::Bp | Op::Bn | Op::Bnp => {
            // Backward (negative-immediate) conditional branches are
            // always predicted taken, regardless of the predictor table.
            if imm < 0 {
                (pc + imm, false)
            } else {
                match cpu.predictor.lookup(pc) {
                    Some(entry) => (entry.target, false),
                    None => (fallthrough, false),
                }
            }
        }
        Op::Jump => match cpu.predictor.lookup(pc) {
            Some(entry) => (entry.target, false),
            None => (fallthrough, false),
        },
        Op::Jalp => match cpu.predictor.lookup(pc) {
            Some(entry) => {
                cpu.ras.push(fallthrough)?;
                (entry.target, true)
            }
            None => (fallthrough, false),
        },
        Op::Ret => match cpu.predictor.lookup(pc) {
            Some(entry) => {
                let _ = cpu.ras.pop()?;
                (entry.target, true)
            }
            None => (fallthrough, false),
        },
        _ => (fallthrough, false),
    })
}

/// Fetches one instruction into the fetch latch, unless it's already
/// occupied (stall) or the PC has run off the end of the program (not
/// fatal — spec.md §7; existing in-flight work keeps draining).
///
/// # Errors
/// A fatal [`crate::common::error::SimError`] if predicting a JALP/RET
/// overflows or underflows the return-address stack.
pub fn fetch(cpu: &mut Cpu) -> SimResult<()> {
    if cpu.fetch_latch.is_some() {
        return Ok(());
    }
    let Some(idx) = cpu.config.pc_to_index(cpu.pc) else {
        return Ok(());
    };
    let Some(&raw) = cpu.code.get(idx) else {
        return Ok(());
    };

    let mut inst = raw;
    inst.pc = cpu.pc;
    let (next_pc, ras_done_at_fetch) = predict(cpu, inst.op, inst.pc, inst.imm)?;
    inst.next_pc = next_pc;

    cpu.trace_log("FE", &format!("pc={} {inst} -> next_pc={next_pc}", inst.pc));
    cpu.pc = next_pc;
    cpu.fetch_latch = Some(LatchEntry { inst, ras_done_at_fetch });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::predictor::PredictorKind;

    #[test]
    fn fetch_stalls_when_latch_occupied() {
        let mut cpu = Cpu::new(vec![], Config::default());
        cpu.fetch_latch = Some(LatchEntry {
            inst: crate::isa::Instruction::bare(Op::Nop),
            ras_done_at_fetch: false,
        });
        let before = cpu.pc;
        fetch(&mut cpu).expect("should not error");
        assert_eq!(cpu.pc, before);
    }

    #[test]
    fn backward_branch_always_predicted_taken() {
        let mut cpu = Cpu::new(vec![], Config::default());
        let (target, _) = predict(&mut cpu, Op::Bp, 4008, -4).expect("should not error");
        assert_eq!(target, 4004);
    }

    #[test]
    fn forward_branch_without_entry_predicts_fallthrough() {
        let mut cpu = Cpu::new(vec![], Config::default());
        let (target, _) = predict(&mut cpu, Op::Bz, 4000, 8).expect("should not error");
        assert_eq!(target, 4004);
    }

    #[test]
    fn forward_branch_with_entry_predicts_entry_target() {
        let mut cpu = Cpu::new(vec![], Config::default());
        cpu.predictor.update(4000, 4012, PredictorKind::Branch);
        let (target, _) = predict(&mut cpu, Op::Bz, 4000, 8).expect("should not error");
        assert_eq!(target, 4012);
    }

    #[test]
    fn jalp_pushes_ras_only_when_entry_exists() {
        let mut cpu = Cpu::new(vec![], Config::default());
        let (_, done) = predict(&mut cpu, Op::Jalp, 4000, 8).expect("should not error");
        assert!(!done);
        assert_eq!(cpu.ras.pop(), Err(crate::common::SimError::ReturnStackUnderflow));

        cpu.predictor.update(4000, 4008, PredictorKind::Jalp);
        let (target, done) = predict(&mut cpu, Op::Jalp, 4000, 8).expect("should not error");
        assert!(done);
        assert_eq!(target, 4008);
        assert_eq!(cpu.ras.pop(), Ok(4004));
    }

    #[test]
    fn ras_underflow_predicting_ret_is_propagated() {
        let mut cpu = Cpu::new(vec![], Config::default());
        cpu.predictor.update(4000, 3996, PredictorKind::Ret);
        let err = predict(&mut cpu, Op::Ret, 4000, 0).unwrap_err();
        assert_eq!(err, crate::common::SimError::ReturnStackUnderflow);
    }
}
