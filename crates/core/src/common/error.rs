//! Fatal error conditions, per spec.md §7. Non-fatal conditions (RS full,
//! invalid fetch PC, unknown opcode at a functional unit, bad REPL input)
//! are deliberately not represented here — they're local stall returns or
//! `eprintln!` warnings instead.

use thiserror::Error;

/// Every condition that terminates the simulator process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A line of the assembly source could not be decoded.
    #[error("line {line}: {msg}")]
    Parse {
        /// 1-based source line number.
        line: usize,
        /// Human-readable description of what went wrong.
        msg: String,
    },

    /// A free list was popped while empty.
    #[error("free list underflow")]
    FreeListUnderflow,

    /// A free list was pushed while already at capacity.
    #[error("free list overflow")]
    FreeListOverflow,

    /// The return-address stack was pushed while already at capacity.
    #[error("return-address stack overflow")]
    ReturnStackOverflow,

    /// The return-address stack was popped while empty.
    #[error("return-address stack underflow")]
    ReturnStackUnderflow,

    /// Dispatch tried to allocate a ROB slot with none free.
    ///
    /// The controller always checks [`crate::core::rob::Rob::has_space`]
    /// before dispatching, so this should be unreachable in practice; it
    /// exists so allocation can return a `Result` instead of panicking.
    #[error("reorder buffer overflow")]
    RobOverflow,
}

pub type SimResult<T> = Result<T, SimError>;
