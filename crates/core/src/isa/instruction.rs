//! The fixed-shape decoded instruction record (spec.md §3).

use std::fmt;

use super::op::Op;

/// Sentinel value for an unused register or immediate field.
pub const SENTINEL: i32 = -1;

/// One decoded instruction, architectural-register form (pre-rename).
///
/// For STORE and STR, by the convention resolved in `DESIGN.md`, `rs1`
/// carries the *data* register and `rs2`/`rs3` carry the base address
/// register(s); `rd` stays [`SENTINEL`] since neither op has an
/// architectural destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub rd: i32,
    pub rs1: i32,
    pub rs2: i32,
    pub rs3: i32,
    pub imm: i32,
    /// Set by Fetch to this instruction's own address.
    pub pc: i32,
    /// The PC Fetch selected as the following instruction — possibly a
    /// prediction, verified later in IntFU for control-flow ops.
    pub next_pc: i32,
    /// Sentinel at decode time; meaningful only after renaming assigns a
    /// physical CC index (see `core::iqe::Iqe`).
    pub cc: i32,
}

impl Instruction {
    /// A bare instruction with every field sentinel except the opcode;
    /// `pc`/`next_pc` are filled in by Fetch.
    #[must_use]
    pub fn bare(op: Op) -> Self {
        Self {
            op,
            rd: SENTINEL,
            rs1: SENTINEL,
            rs2: SENTINEL,
            rs3: SENTINEL,
            imm: SENTINEL,
            pc: SENTINEL,
            next_pc: SENTINEL,
            cc: SENTINEL,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = |n: i32| format!("R{n}");
        match self.op {
            Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor | Op::Mul | Op::Div => {
                write!(f, "{} {},{},{}", self.op, r(self.rd), r(self.rs1), r(self.rs2))
            }
            Op::Addl | Op::Subl => {
                write!(f, "{} {},{},#{}", self.op, r(self.rd), r(self.rs1), self.imm)
            }
            Op::Movc => write!(f, "{} {},#{}", self.op, r(self.rd), self.imm),
            Op::Load => write!(f, "{} {},{},#{}", self.op, r(self.rd), r(self.rs1), self.imm),
            Op::Store => write!(f, "{} {},{},#{}", self.op, r(self.rs1), r(self.rs2), self.imm),
            Op::Ldr => write!(f, "{} {},{},{}", self.op, r(self.rd), r(self.rs1), r(self.rs2)),
            Op::Str => write!(f, "{} {},{},{}", self.op, r(self.rs1), r(self.rs2), r(self.rs3)),
            Op::Cmp => write!(f, "{} {},{}", self.op, r(self.rs1), r(self.rs2)),
            Op::Cml => write!(f, "{} {},#{}", self.op, r(self.rs1), self.imm),
            Op::Bz | Op::Bnz | Op::Bp | Op::Bn | Op::Bnp => write!(f, "{} #{}", self.op, self.imm),
            Op::Jump => write!(f, "{} {},#{}", self.op, r(self.rs1), self.imm),
            Op::Jalp => write!(f, "{} {},#{}", self.op, r(self.rd), self.imm),
            Op::Ret => write!(f, "{} {}", self.op, r(self.rs1)),
            Op::Halt | Op::Nop => write!(f, "{}", self.op),
        }
    }
}
