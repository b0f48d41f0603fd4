//! Instruction model, opcode set, and assembly parser (spec.md §3, §6).

pub mod instruction;
pub mod op;
pub mod parser;

pub use instruction::{Instruction, SENTINEL};
pub use op::{FuKind, Op, OpClass};
pub use parser::parse_program;
