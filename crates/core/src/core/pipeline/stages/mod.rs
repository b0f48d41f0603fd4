//! The eight ordered per-cycle stage functions of spec.md §5:
//! `fetch → decode1 → decode2 → int_fu → mul_fu → mem_fu → commit →
//! forward_pipeline`. [`super::super::cpu::Cpu::tick`] calls them in this
//! fixed order; nothing here reorders or interleaves them.

pub mod commit;
pub mod decode;
pub mod execute;
pub mod fetch;
pub mod forward;
