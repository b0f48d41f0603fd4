//! The APEX opcode set, modelled as a closed variant instead of the
//! source's integer-tag switch (spec.md §9 explicitly asks for this).

use std::fmt;

/// Which reservation station an op dispatches into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Irs,
    Mrs,
    Lsq,
}

/// Which functional unit carries out an issued op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuKind {
    Int,
    Mul,
    Mem,
}

/// One APEX instruction opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Addl,
    Subl,
    Movc,
    Load,
    Store,
    Ldr,
    Str,
    Cmp,
    Cml,
    Bz,
    Bnz,
    Bp,
    Bn,
    Bnp,
    Jump,
    Jalp,
    Ret,
    Halt,
    Nop,
}

impl Op {
    /// The reservation station this opcode dispatches into (spec.md §4.5).
    #[must_use]
    pub fn class(self) -> OpClass {
        match self {
            Self::Mul | Self::Div => OpClass::Mrs,
            Self::Load | Self::Store | Self::Ldr | Self::Str => OpClass::Lsq,
            _ => OpClass::Irs,
        }
    }

    /// The functional unit that executes an issued instance of this opcode.
    #[must_use]
    pub fn fu_kind(self) -> FuKind {
        match self.class() {
            OpClass::Mrs => FuKind::Mul,
            OpClass::Lsq => FuKind::Mem,
            OpClass::Irs => FuKind::Int,
        }
    }

    /// Whether this opcode allocates and writes an architectural
    /// destination register at commit.
    #[must_use]
    pub fn has_dest_reg(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Addl
                | Self::Subl
                | Self::Movc
                | Self::Load
                | Self::Ldr
                | Self::Jalp
        )
    }

    /// Whether this opcode allocates a new CC mapping (writes CC).
    #[must_use]
    pub fn writes_cc(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Addl
                | Self::Subl
                | Self::Cmp
                | Self::Cml
        )
    }

    /// Whether this opcode's result depends on the current CC.
    #[must_use]
    pub fn reads_cc(self) -> bool {
        matches!(self, Self::Bz | Self::Bnz | Self::Bp | Self::Bn | Self::Bnp)
    }

    /// Whether this opcode is a control-flow op whose target is resolved
    /// in IntFU and checked against Fetch's prediction.
    #[must_use]
    pub fn is_control_flow(self) -> bool {
        self.reads_cc() || matches!(self, Self::Jump | Self::Jalp | Self::Ret)
    }

    /// The mnemonic as it appears in assembly source and in the `Display`
    /// round-trip.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Addl => "ADDL",
            Self::Subl => "SUBL",
            Self::Movc => "MOVC",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Ldr => "LDR",
            Self::Str => "STR",
            Self::Cmp => "CMP",
            Self::Cml => "CML",
            Self::Bz => "BZ",
            Self::Bnz => "BNZ",
            Self::Bp => "BP",
            Self::Bn => "BN",
            Self::Bnp => "BNP",
            Self::Jump => "JUMP",
            Self::Jalp => "JALP",
            Self::Ret => "RET",
            Self::Halt => "HALT",
            Self::Nop => "NOP",
        }
    }

    /// Parses a mnemonic token, case-sensitive as spec.md §6 requires.
    #[must_use]
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s {
            "ADD" => Self::Add,
            "SUB" => Self::Sub,
            "MUL" => Self::Mul,
            "DIV" => Self::Div,
            "AND" => Self::And,
            "OR" => Self::Or,
            "XOR" => Self::Xor,
            "ADDL" => Self::Addl,
            "SUBL" => Self::Subl,
            "MOVC" => Self::Movc,
            "LOAD" => Self::Load,
            "STORE" => Self::Store,
            "LDR" => Self::Ldr,
            "STR" => Self::Str,
            "CMP" => Self::Cmp,
            "CML" => Self::Cml,
            "BZ" => Self::Bz,
            "BNZ" => Self::Bnz,
            "BP" => Self::Bp,
            "BN" => Self::Bn,
            "BNP" => Self::Bnp,
            "JUMP" => Self::Jump,
            "JALP" => Self::Jalp,
            "RET" => Self::Ret,
            "HALT" => Self::Halt,
            "NOP" => Self::Nop,
            _ => return None,
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_routes_to_the_right_station() {
        assert_eq!(Op::Mul.class(), OpClass::Mrs);
        assert_eq!(Op::Div.class(), OpClass::Mrs);
        assert_eq!(Op::Load.class(), OpClass::Lsq);
        assert_eq!(Op::Str.class(), OpClass::Lsq);
        assert_eq!(Op::Add.class(), OpClass::Irs);
        assert_eq!(Op::Halt.class(), OpClass::Irs);
    }

    #[test]
    fn mnemonic_round_trips() {
        for op in [
            Op::Add, Op::Sub, Op::Mul, Op::Div, Op::And, Op::Or, Op::Xor, Op::Addl, Op::Subl,
            Op::Movc, Op::Load, Op::Store, Op::Ldr, Op::Str, Op::Cmp, Op::Cml, Op::Bz, Op::Bnz,
            Op::Bp, Op::Bn, Op::Bnp, Op::Jump, Op::Jalp, Op::Ret, Op::Halt, Op::Nop,
        ] {
            assert_eq!(Op::from_mnemonic(op.mnemonic()), Some(op));
        }
    }

    #[test]
    fn movc_does_not_write_cc() {
        assert!(!Op::Movc.writes_cc());
        assert!(Op::Cmp.writes_cc());
    }
}
