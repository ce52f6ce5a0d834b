//! APEX assembly loader.
//!
//! Parses assembly text into the code-memory image the pipeline consumes.
//! One instruction per line; the mnemonic is followed by operands separated
//! by commas and/or whitespace; registers are written `R<n>` and literals
//! `#<imm>`. Blank lines and `;` comments are ignored. Mnemonics are
//! case-insensitive.
//!
//! ```
//! use apexsim_core::sim::loader;
//!
//! let program = loader::parse_program("MOVC R1,#5\nADD R3,R1,R1 ; double it\nHALT\n").unwrap();
//! assert_eq!(program.len(), 3);
//! ```

use std::fs;
use std::path::Path;

use crate::common::error::SimError;
use crate::isa::{Instruction, Opcode, OperandForm};

/// Reads and parses a program file.
///
/// # Errors
///
/// [`SimError::Io`] when the file cannot be read, [`SimError::Parse`] when a
/// line is malformed.
pub fn load_program(path: &Path) -> Result<Vec<Instruction>, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_program(&text)
}

/// Parses assembly text into code memory.
///
/// # Errors
///
/// [`SimError::Parse`] with the 1-based line number of the first malformed
/// line.
pub fn parse_program(text: &str) -> Result<Vec<Instruction>, SimError> {
    let mut program = Vec::new();
    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        program.push(parse_line(line).map_err(|msg| SimError::Parse {
            line: line_no + 1,
            msg,
        })?);
    }
    Ok(program)
}

fn parse_line(line: &str) -> Result<Instruction, String> {
    let mut tokens = line.split(|c: char| c == ',' || c.is_whitespace());
    let mnemonic = tokens.next().unwrap_or("");
    let operands: Vec<&str> = tokens.filter(|t| !t.is_empty()).collect();

    let opcode =
        Opcode::from_mnemonic(mnemonic).ok_or_else(|| format!("unknown opcode `{mnemonic}`"))?;

    let mut inst = Instruction::new(opcode);
    let form = opcode.operand_form();
    expect_operands(&operands, operand_count(form))?;

    match form {
        OperandForm::RegRegReg => {
            inst.rd = register(operands[0])?;
            inst.rs1 = register(operands[1])?;
            inst.rs2 = register(operands[2])?;
        }
        OperandForm::RegRegImm => {
            inst.rd = register(operands[0])?;
            inst.rs1 = register(operands[1])?;
            inst.imm = literal(operands[2])?;
        }
        OperandForm::RegImm => {
            inst.rd = register(operands[0])?;
            inst.imm = literal(operands[1])?;
        }
        OperandForm::RegReg => {
            inst.rs1 = register(operands[0])?;
            inst.rs2 = register(operands[1])?;
        }
        OperandForm::SrcSrcImm => {
            inst.rs1 = register(operands[0])?;
            inst.rs2 = register(operands[1])?;
            inst.imm = literal(operands[2])?;
        }
        OperandForm::SrcSrcSrc => {
            inst.rs3 = register(operands[0])?;
            inst.rs1 = register(operands[1])?;
            inst.rs2 = register(operands[2])?;
        }
        OperandForm::Imm => {
            inst.imm = literal(operands[0])?;
        }
        OperandForm::None => {}
    }
    Ok(inst)
}

fn expect_operands(operands: &[&str], count: usize) -> Result<(), String> {
    if operands.len() == count {
        Ok(())
    } else {
        Err(format!(
            "expected {} operand(s), found {}",
            count,
            operands.len()
        ))
    }
}

fn operand_count(form: OperandForm) -> usize {
    match form {
        OperandForm::RegRegReg | OperandForm::RegRegImm | OperandForm::SrcSrcImm
        | OperandForm::SrcSrcSrc => 3,
        OperandForm::RegImm | OperandForm::RegReg => 2,
        OperandForm::Imm => 1,
        OperandForm::None => 0,
    }
}

fn register(token: &str) -> Result<usize, String> {
    let body = token
        .strip_prefix(['R', 'r'])
        .ok_or_else(|| format!("expected a register, found `{token}`"))?;
    body.parse()
        .map_err(|_| format!("invalid register `{token}`"))
}

fn literal(token: &str) -> Result<i32, String> {
    let body = token
        .strip_prefix('#')
        .ok_or_else(|| format!("expected a literal, found `{token}`"))?;
    let body = body.strip_prefix('+').unwrap_or(body);
    body.parse()
        .map_err(|_| format!("invalid literal `{token}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_form() {
        let program = parse_program(
            "MOVC R1,#5\n\
             ADD R3,R1,R2\n\
             ADDL R4,R1,#-3\n\
             CMP R1,R2\n\
             STORE R1,R2,#20\n\
             STR R7,R1,R2\n\
             LOAD R5,R2,#20\n\
             BZ,#+8\n\
             NOP\n\
             HALT",
        )
        .unwrap();
        assert_eq!(program.len(), 10);

        assert_eq!(program[0].opcode, Opcode::Movc);
        assert_eq!(program[0].imm, 5);
        assert_eq!(program[1].rd, 3);
        assert_eq!(program[2].imm, -3);
        assert_eq!(program[4].rs2, 2);
        assert_eq!(program[5].rs3, 7);
        assert_eq!(program[7].imm, 8);
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let program = parse_program(
            "; a whole-line comment\n\
             \n\
             MOVC R1,#1 ; trailing comment\n\
             HALT\n",
        )
        .unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_program("MOVC R1,#1\nFMA R1,R2,R3\n").unwrap_err();
        match err {
            SimError::Parse { line, msg } => {
                assert_eq!(line, 2);
                assert!(msg.contains("FMA"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_operand_mismatch() {
        assert!(parse_program("ADD R1,R2").is_err());
        assert!(parse_program("MOVC R1,5").is_err());
        assert!(parse_program("BZ R1").is_err());
    }
}
