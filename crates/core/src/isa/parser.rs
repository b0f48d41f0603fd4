//! The assembly text parser (external to the core contract per spec.md §1,
//! implemented here since nothing else can produce the `Instruction` list).

use crate::common::error::{SimError, SimResult};

use super::instruction::Instruction;
use super::op::Op;

const MAX_REG: i32 = 32;

fn tokenize(line: &str, lineno: usize) -> SimResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if ch == ',' || ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '#' || ch == '-' {
            current.push(ch);
            continue;
        }
        return Err(SimError::Parse {
            line: lineno,
            msg: format!("illegal character '{ch}'"),
        });
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_reg(tok: &str, lineno: usize) -> SimResult<i32> {
    let digits = tok.strip_prefix('R').ok_or_else(|| SimError::Parse {
        line: lineno,
        msg: format!("expected register, found '{tok}'"),
    })?;
    let n: i32 = digits.parse().map_err(|_| SimError::Parse {
        line: lineno,
        msg: format!("invalid register token '{tok}'"),
    })?;
    if !(0..MAX_REG).contains(&n) {
        return Err(SimError::Parse {
            line: lineno,
            msg: format!("register index {n} out of range [0,{MAX_REG})"),
        });
    }
    Ok(n)
}

fn parse_imm(tok: &str, lineno: usize) -> SimResult<i32> {
    let digits = tok.strip_prefix('#').ok_or_else(|| SimError::Parse {
        line: lineno,
        msg: format!("expected immediate, found '{tok}'"),
    })?;
    digits.parse().map_err(|_| SimError::Parse {
        line: lineno,
        msg: format!("invalid immediate '{tok}'"),
    })
}

fn expect_len(op: Op, tokens: &[String], n: usize, lineno: usize) -> SimResult<()> {
    if tokens.len() != n {
        return Err(SimError::Parse {
            line: lineno,
            msg: format!(
                "{} expects {n} operand(s), found {}",
                op.mnemonic(),
                tokens.len()
            ),
        });
    }
    Ok(())
}

/// Parses one line of assembly (mnemonic plus its shape-specific operands)
/// into a decoded instruction. `pc`/`next_pc`/`cc` are left sentinel;
/// Fetch fills `pc`/`next_pc`, Decode2 fills `cc`.
fn parse_line(line: &str, lineno: usize) -> SimResult<Instruction> {
    let tokens = tokenize(line, lineno)?;
    let (mnemonic, operands) = tokens.split_first().ok_or_else(|| SimError::Parse {
        line: lineno,
        msg: "empty instruction".to_string(),
    })?;
    let op = Op::from_mnemonic(mnemonic).ok_or_else(|| SimError::Parse {
        line: lineno,
        msg: format!("unknown mnemonic '{mnemonic}'"),
    })?;

    let mut inst = Instruction::bare(op);
    match op {
        // D,S,S
        Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor | Op::Mul | Op::Div => {
            expect_len(op, operands, 3, lineno)?;
            inst.rd = parse_reg(&operands[0], lineno)?;
            inst.rs1 = parse_reg(&operands[1], lineno)?;
            inst.rs2 = parse_reg(&operands[2], lineno)?;
        }
        // D,S,I
        Op::Addl | Op::Subl | Op::Load => {
            expect_len(op, operands, 3, lineno)?;
            inst.rd = parse_reg(&operands[0], lineno)?;
            inst.rs1 = parse_reg(&operands[1], lineno)?;
            inst.imm = parse_imm(&operands[2], lineno)?;
        }
        // D,I
        Op::Movc => {
            expect_len(op, operands, 2, lineno)?;
            inst.rd = parse_reg(&operands[0], lineno)?;
            inst.imm = parse_imm(&operands[1], lineno)?;
        }
        Op::Jalp => {
            expect_len(op, operands, 2, lineno)?;
            inst.rd = parse_reg(&operands[0], lineno)?;
            inst.imm = parse_imm(&operands[1], lineno)?;
        }
        // STORE: Rsrc(data), Rbase, #imm — rs1 holds the data register, rs2
        // the base, per the convention documented in DESIGN.md.
        Op::Store => {
            expect_len(op, operands, 3, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
            inst.rs2 = parse_reg(&operands[1], lineno)?;
            inst.imm = parse_imm(&operands[2], lineno)?;
        }
        // D,S,S
        Op::Ldr => {
            expect_len(op, operands, 3, lineno)?;
            inst.rd = parse_reg(&operands[0], lineno)?;
            inst.rs1 = parse_reg(&operands[1], lineno)?;
            inst.rs2 = parse_reg(&operands[2], lineno)?;
        }
        // STR: Rsrc(data), Rbase1, Rbase2 — same data-first convention.
        Op::Str => {
            expect_len(op, operands, 3, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
            inst.rs2 = parse_reg(&operands[1], lineno)?;
            inst.rs3 = parse_reg(&operands[2], lineno)?;
        }
        // S,S
        Op::Cmp => {
            expect_len(op, operands, 2, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
            inst.rs2 = parse_reg(&operands[1], lineno)?;
        }
        // S,I
        Op::Cml => {
            expect_len(op, operands, 2, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
            inst.imm = parse_imm(&operands[1], lineno)?;
        }
        // I
        Op::Bz | Op::Bnz | Op::Bp | Op::Bn | Op::Bnp => {
            expect_len(op, operands, 1, lineno)?;
            inst.imm = parse_imm(&operands[0], lineno)?;
        }
        // S,I
        Op::Jump => {
            expect_len(op, operands, 2, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
            inst.imm = parse_imm(&operands[1], lineno)?;
        }
        // S
        Op::Ret => {
            expect_len(op, operands, 1, lineno)?;
            inst.rs1 = parse_reg(&operands[0], lineno)?;
        }
        // nothing
        Op::Halt | Op::Nop => {
            expect_len(op, operands, 0, lineno)?;
        }
    }
    Ok(inst)
}

/// Parses a complete assembly source file into the flat instruction array
/// that Fetch indexes into. Blank lines are skipped; every other line must
/// decode.
pub fn parse_program(source: &str) -> SimResult<Vec<Instruction>> {
    let mut program = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        program.push(parse_line(line, idx + 1)?);
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MOVC R1,#5", "MOVC R1,#5")]
    #[case("ADD R3, R1, R2", "ADD R3,R1,R2")]
    #[case("STORE R1,R2,#5", "STORE R1,R2,#5")]
    #[case("STR R1,R2,R3", "STR R1,R2,R3")]
    #[case("BZ #8", "BZ #8")]
    #[case("BP #-4", "BP #-4")]
    #[case("JALP R2,#8", "JALP R2,#8")]
    #[case("RET R2", "RET R2")]
    #[case("HALT", "HALT")]
    fn parses_and_round_trips(#[case] src: &str, #[case] expected: &str) {
        let program = parse_program(src).expect("should parse");
        assert_eq!(program.len(), 1);
        assert_eq!(program[0].to_string(), expected);
    }

    #[test]
    fn register_out_of_range_is_fatal() {
        let err = parse_program("MOVC R32,#1").unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 1, .. }));
    }

    #[test]
    fn unknown_mnemonic_is_fatal() {
        let err = parse_program("FOO R1,R2").unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 1, .. }));
    }

    #[test]
    fn comma_and_whitespace_are_interchangeable_separators() {
        let a = parse_program("ADD R1,R2,R3").expect("comma form");
        let b = parse_program("ADD R1 R2 R3").expect("whitespace form");
        assert_eq!(a, b);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let program = parse_program("MOVC R1,#1\n\nHALT\n").expect("should parse");
        assert_eq!(program.len(), 2);
    }
}
