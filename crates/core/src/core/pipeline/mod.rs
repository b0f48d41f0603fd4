//! The per-cycle pipeline controller: latches, and the eight ordered
//! stage functions [`Cpu::tick`](super::cpu::Cpu::tick) drives each cycle
//! (spec.md §5, §C8).

pub mod latches;
pub mod stages;
