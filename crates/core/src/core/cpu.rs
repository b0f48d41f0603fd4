//! The aggregate CPU: every piece of architectural and
//! micro-architectural state lives on this one owning struct, the way the
//! teacher's own `Cpu` aggregates everything rather than scattering state
//! across singletons (spec.md §9, "Global/shared state").
//!
//! Unlike the teacher, there is no raw memory pointer here: APEX's data
//! memory is a flat `Vec<i32>` with no `unsafe`, since the flat-array
//! memory model and the Non-goals (no MMU/caches) make a host mmap
//! unnecessary.

use crate::common::cc::Cc;
use crate::common::error::SimResult;
use crate::config::Config;
use crate::isa::instruction::Instruction;
use crate::stats::Stats;

use super::fu::FunctionalUnit;
use super::memory::DataMemory;
use super::pipeline::latches::Latch;
use super::predictor::{Predictor, Ras};
use super::regfile::{Ucrf, Uprf};
use super::rename::RenameTable;
use super::rob::Rob;
use super::rs::ReservationStation;

/// Outcome of a single [`Cpu::tick`]: whether the machine halted this
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Halted,
}

/// The entire pipeline engine.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub config: Config,
    pub code: Vec<Instruction>,

    pub pc: i32,
    pub halted: bool,
    pub trace: bool,

    pub fetch_latch: Latch,
    pub decode1_latch: Latch,
    pub decode2_latch: Latch,

    pub arch_uprf: Uprf,
    pub arch_ucrf: Ucrf,
    pub fwd_uprf: Uprf,
    pub fwd_ucrf: Ucrf,
    pub rename: RenameTable,
    pub predictor: Predictor,
    pub ras: Ras,

    pub rob: Rob,
    pub irs: ReservationStation,
    pub mrs: ReservationStation,
    pub lsq: ReservationStation,

    pub int_fu: FunctionalUnit,
    pub mul_fu: FunctionalUnit,
    pub mem_fu: FunctionalUnit,

    pub memory: DataMemory,
    pub stats: Stats,
}

impl Cpu {
    #[must_use]
    pub fn new(code: Vec<Instruction>, config: Config) -> Self {
        let mut arch_uprf = Uprf::new(config.uprf_size);
        arch_uprf.preset_valid(32);
        let mut arch_ucrf = Ucrf::new(config.ucrf_size);
        arch_ucrf.preset_valid(1);
        let mut fwd_uprf = Uprf::new(config.uprf_size);
        fwd_uprf.preset_valid(32);
        let mut fwd_ucrf = Ucrf::new(config.ucrf_size);
        fwd_ucrf.preset_valid(1);

        Self {
            pc: config.code_base,
            halted: false,
            trace: false,
            fetch_latch: None,
            decode1_latch: None,
            decode2_latch: None,
            arch_uprf,
            arch_ucrf,
            fwd_uprf,
            fwd_ucrf,
            rename: RenameTable::new(&config),
            predictor: Predictor::new(config.predictor_table_size),
            ras: Ras::new(config.return_stack_capacity),
            rob: Rob::new(config.rob_capacity),
            irs: ReservationStation::new(config.irs_capacity),
            mrs: ReservationStation::new(config.mrs_capacity),
            lsq: ReservationStation::new(config.lsq_capacity),
            int_fu: FunctionalUnit::new(config.int_fu_latency),
            mul_fu: FunctionalUnit::new(config.mul_fu_latency),
            mem_fu: FunctionalUnit::new(config.mem_fu_latency),
            memory: DataMemory::new(config.data_memory_size),
            stats: Stats::new(),
            code,
        }
    }

    /// The architectural value of register `r`, read through the live
    /// rename mapping — what `Display` shows (spec.md §6).
    #[must_use]
    pub fn architectural_register(&self, r: i32) -> i32 {
        let phys = self.rename.map_source(r);
        self.arch_uprf.read(phys).unwrap_or(0)
    }

    /// The architectural CC, read through the live mapping.
    #[must_use]
    pub fn architectural_cc(&self) -> Cc {
        let phys = self.rename.current_cc();
        self.arch_ucrf.read(phys).unwrap_or_default()
    }

    pub(crate) fn trace_log(&self, tag: &str, msg: &str) {
        if self.trace {
            eprintln!("[{tag}] {msg}");
        }
    }

    /// Runs one full pipeline cycle in spec.md §5's fixed order.
    pub fn tick(&mut self) -> SimResult<TickOutcome> {
        if self.halted {
            return Ok(TickOutcome::Halted);
        }
        self.stats.cycles += 1;
        super::pipeline::stages::fetch::fetch(self)?;
        super::pipeline::stages::decode::decode1(self);
        super::pipeline::stages::decode::decode2(self);
        super::pipeline::stages::execute::int_fu(self)?;
        super::pipeline::stages::execute::mul_fu(self);
        super::pipeline::stages::execute::mem_fu(self);
        super::pipeline::stages::commit::commit(self)?;
        super::pipeline::stages::forward::forward_pipeline(self)?;

        Ok(if self.halted { TickOutcome::Halted } else { TickOutcome::Running })
    }
}
