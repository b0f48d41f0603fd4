//! Commit (spec.md §4.8, §4.9): the in-order retirement of the ROB head,
//! the only place data memory is actually touched, and HALT's drain.

use crate::common::error::SimResult;
use crate::core::cpu::Cpu;
use crate::core::iqe::Iqe;
use crate::isa::instruction::SENTINEL;
use crate::isa::op::Op;

/// HALT never computes anything in IntFU; at commit it behaves like a
/// squash against its own tag (dropping every younger piece of
/// speculative state) but restores from its own BIS rather than resolving
/// a new PC, since the machine is stopping (spec.md §4.9's HALT note).
fn drain(cpu: &mut Cpu, halt: &Iqe) {
    let after = halt.tag;
    cpu.trace_log("CM", &format!("HALT drain after tag={}", after.0));

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

    cpu.rename = halt.bis.rename.clone();
    cpu.predictor = halt.bis.predictor.clone();
    cpu.ras = halt.bis.ras.clone();
    cpu.fwd_uprf = halt.bis.fwd_uprf.clone();
    cpu.fwd_ucrf = halt.bis.fwd_ucrf.clone();
}

/// Retires the ROB head if it has completed execution. Stalls silently
/// (returns `Ok(())` with nothing done) if the head isn't there yet or
/// hasn't finished — commit only ever looks at the oldest instruction,
/// never reorders past it.
pub fn commit(cpu: &mut Cpu) -> SimResult<()> {
    let Some(head) = cpu.rob.peek_head() else { return Ok(()) };
    if !head.completed {
        return Ok(());
    }
    let iqe = head.clone();

    if iqe.op == Op::Halt {
        let _ = cpu.rob.commit_head();
        drain(cpu, &iqe);
        cpu.halted = true;
        cpu.stats.instructions_committed += 1;
        cpu.trace_log("CM", &format!("tag={} HALT", iqe.tag.0));
        return Ok(());
    }

    // LOAD/STORE/LDR/STR touch data memory only here (spec.md §4.9); every
    // other op's result was already computed by its functional unit and
    // just needs writing to the architectural state.
    let result = match iqe.op {
        Op::Load | Op::Ldr => cpu.memory.read(iqe.result_buffer),
        Op::Store | Op::Str => {
            cpu.memory.write(iqe.result_buffer, iqe.rs1_value);
            iqe.result_buffer
        }
        _ => iqe.result_buffer,
    };

    if iqe.rd != SENTINEL {
        cpu.arch_uprf.write(iqe.rd, result);
        cpu.fwd_uprf.write(iqe.rd, result);
    }
    if iqe.op.writes_cc() {
        cpu.arch_ucrf.write(iqe.cc, iqe.cc_value);
        cpu.fwd_ucrf.write(iqe.cc, iqe.cc_value);
    }

    cpu.rename.release(iqe.prev_rd)?;
    cpu.rename.release_cc(iqe.prev_cc)?;

    cpu.trace_log("CM", &format!("tag={} {} commit result={}", iqe.tag.0, iqe.op, result));
    cpu.stats.instructions_committed += 1;
    let _ = cpu.rob.commit_head();
    Ok(())
}
