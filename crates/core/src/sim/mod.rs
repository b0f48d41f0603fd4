//! The REPL-facing wrapper around [`Cpu`] (spec.md §6).
//!
//! `Simulator` has no filesystem I/O of its own: `apex-cli` reads the
//! assembly file and the memory-image file and hands their contents here
//! as strings, which keeps this type directly testable without a
//! temp-file dance.

use std::fmt::Write as _;

use crate::common::error::SimResult;
use crate::config::Config;
use crate::core::cpu::{Cpu, TickOutcome};
use crate::isa::parser::parse_program;

/// Parses a `SetMem` memory-image file: one line of comma-separated
/// signed integers (spec.md §6). Bad tokens are a REPL input error, not
/// a fatal [`crate::common::error::SimError`] — the REPL is meant to
/// print these and keep going.
///
/// # Errors
/// Returns an error message if any token fails to parse as `i32`.
pub fn parse_memory_image(text: &str) -> Result<Vec<i32>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(',')
        .map(|tok| {
            let tok = tok.trim();
            tok.parse::<i32>().map_err(|_| format!("invalid integer '{tok}'"))
        })
        .collect()
}

/// Drives one APEX program: holds the assembly source text and, once
/// [`Simulator::initialize`] has run, the live [`Cpu`].
#[derive(Debug, Clone)]
pub struct Simulator {
    config: Config,
    source: String,
    cpu: Option<Cpu>,
}

impl Simulator {
    #[must_use]
    pub fn new(config: Config, source: impl Into<String>) -> Self {
        Self { config, source: source.into(), cpu: None }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cpu.is_some()
    }

    /// The architectural value of register `r`, or `None` before
    /// `Initialize` has run.
    #[must_use]
    pub fn register(&self, r: i32) -> Option<i32> {
        Some(self.cpu.as_ref()?.architectural_register(r))
    }

    /// Committed/cycle/misprediction/stall counters, or `None` before
    /// `Initialize` has run.
    #[must_use]
    pub fn stats(&self) -> Option<&crate::stats::Stats> {
        Some(&self.cpu.as_ref()?.stats)
    }

    /// Enables per-stage `eprintln!` tracing on the live machine, if any
    /// (a no-op before the first `Initialize`).
    pub fn set_trace(&mut self, trace: bool) {
        if let Some(cpu) = &mut self.cpu {
            cpu.trace = trace;
        }
    }

    /// `Initialize`: (re)parses the assembly source and resets every
    /// piece of machine state. Running it twice in a row is equivalent to
    /// running it once (spec.md §8) since it always rebuilds from
    /// scratch rather than mutating existing state.
    ///
    /// # Errors
    /// Fatal [`SimError::Parse`](crate::common::error::SimError::Parse)
    /// if the source doesn't decode.
    pub fn initialize(&mut self) -> SimResult<()> {
        let program = parse_program(&self.source)?;
        self.cpu = Some(Cpu::new(program, self.config));
        Ok(())
    }

    /// `Single_step`: runs exactly one tick. `None` if `Initialize`
    /// hasn't run yet — a REPL input error, not a fatal one.
    pub fn single_step(&mut self) -> Option<SimResult<TickOutcome>> {
        Some(self.cpu.as_mut()?.tick())
    }

    /// `Simulate <N>`: runs up to `n` ticks, stopping early on halt.
    pub fn simulate(&mut self, n: u64) -> Option<SimResult<TickOutcome>> {
        let cpu = self.cpu.as_mut()?;
        let mut outcome = TickOutcome::Running;
        for _ in 0..n {
            match cpu.tick() {
                Ok(o) => {
                    outcome = o;
                    if outcome == TickOutcome::Halted {
                        break;
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(outcome))
    }

    /// `Display`: stage latches, all 32 architectural registers (through
    /// the live rename mapping), CC, and the first 20 memory cells.
    ///
    /// # Errors
    /// A REPL input error string if `Initialize` hasn't run yet.
    pub fn display(&self) -> Result<String, String> {
        let cpu = self.cpu.as_ref().ok_or_else(not_initialized)?;
        let mut out = String::new();
        let _ = writeln!(out, "cycle {}", cpu.stats.cycles);
        let _ = writeln!(out, "Fetch:   {}", latch_display(&cpu.fetch_latch));
        let _ = writeln!(out, "Decode1: {}", latch_display(&cpu.decode1_latch));
        let _ = writeln!(out, "Decode2: {}", latch_display(&cpu.decode2_latch));
        for r in 0..32 {
            let _ = writeln!(out, "R{r} = {}", cpu.architectural_register(r));
        }
        let cc = cpu.architectural_cc();
        let _ = writeln!(out, "CC: Z={} N={} P={}", u8::from(cc.z), u8::from(cc.n), u8::from(cc.p));
        let _ = writeln!(out, "memory[0..20] = {:?}", cpu.memory.first(20));
        Ok(out)
    }

    /// `ShowMem <addr>`: `memory[addr]` in hex and decimal.
    ///
    /// # Errors
    /// A REPL input error string if uninitialized or `addr` is outside
    /// `[0, 4096)`.
    pub fn show_mem(&self, addr: i32) -> Result<String, String> {
        let cpu = self.cpu.as_ref().ok_or_else(not_initialized)?;
        let len = i32::try_from(cpu.memory.len()).unwrap_or(i32::MAX);
        if !(0..len).contains(&addr) {
            return Err(format!("address {addr} out of range [0,{len})"));
        }
        let value = cpu.memory.read(addr);
        let bits = value as u32;
        Ok(format!("memory[{addr}] = 0x{bits:08x} ({value})"))
    }

    /// `SetMem <file>`: loads `values` into data memory from offset 0.
    ///
    /// # Errors
    /// A REPL input error string if uninitialized or `values` would
    /// overflow data memory.
    pub fn set_mem(&mut self, values: &[i32]) -> Result<(), String> {
        let cpu = self.cpu.as_mut().ok_or_else(not_initialized)?;
        if values.len() > cpu.memory.len() {
            return Err(format!("image has {} values, exceeds memory size {}", values.len(), cpu.memory.len()));
        }
        cpu.memory.load_image(values);
        Ok(())
    }
}

fn not_initialized() -> String {
    "simulator not initialized — run Initialize first".to_string()
}

fn latch_display(latch: &crate::core::pipeline::latches::Latch) -> String {
    match latch {
        Some(entry) => format!("pc={} {}", entry.inst.pc, entry.inst),
        None => "-".to_string(),
    }
}
