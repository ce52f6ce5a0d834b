//! APEX Instruction Set Architecture definitions.
//!
//! This module defines the closed APEX opcode set and the static instruction
//! record stored in code memory. It provides:
//! 1. **Opcode taxonomy:** The full mnemonic set with exhaustive matching.
//! 2. **Operand metadata:** Which sources gate readiness, which opcodes
//!    produce a register result or the zero flag, and the operand form used
//!    by the assembler and the disassembler.
//! 3. **Function-unit routing:** The dispatch class for every opcode.

pub mod disasm;

/// APEX opcode set.
///
/// A closed enumeration: every stage dispatches on it exhaustively, so an
/// opcode can never be silently ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `ADD rd, rs1, rs2` — register add; writes the zero flag.
    Add,
    /// `ADDL rd, rs1, #imm` — add literal; writes the zero flag.
    Addl,
    /// `SUB rd, rs1, rs2` — register subtract; writes the zero flag.
    Sub,
    /// `SUBL rd, rs1, #imm` — subtract literal; writes the zero flag.
    Subl,
    /// `MUL rd, rs1, rs2` — multiply; writes the zero flag.
    Mul,
    /// `DIV rd, rs1, rs2` — divide; division by zero yields 0.
    Div,
    /// `AND rd, rs1, rs2` — bitwise and.
    And,
    /// `OR rd, rs1, rs2` — bitwise or.
    Or,
    /// `XOR rd, rs1, rs2` — bitwise exclusive-or.
    Xor,
    /// `MOVC rd, #imm` — move literal into a register.
    Movc,
    /// `LOAD rd, rs1, #imm` — load from `mem[rs1 + imm]`.
    Load,
    /// `LDR rd, rs1, rs2` — load from `mem[rs1 + rs2]`.
    Ldr,
    /// `STORE rs1, rs2, #imm` — store rs1 to `mem[rs2 + imm]`.
    Store,
    /// `STR rs3, rs1, rs2` — store rs3 to `mem[rs1 + rs2]`.
    Str,
    /// `CMP rs1, rs2` — compare; writes only the zero flag.
    Cmp,
    /// `BZ #imm` — branch to `pc + imm` when the zero flag is set.
    Bz,
    /// `BNZ #imm` — branch to `pc + imm` when the zero flag is clear.
    Bnz,
    /// `NOP` — no operation.
    Nop,
    /// `HALT` — stop the simulation once it retires.
    Halt,
}

/// Function-unit routing class for the multi-FU pipeline variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuClass {
    /// Single-cycle integer unit (ALU, branches, NOP, HALT).
    Integer,
    /// Three-cycle multiplier unit.
    Multiplier,
    /// Four-cycle load/store unit.
    LoadStore,
}

/// Operand layout of an assembly line, used by the loader and disassembler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandForm {
    /// `rd, rs1, rs2`
    RegRegReg,
    /// `rd, rs1, #imm`
    RegRegImm,
    /// `rd, #imm`
    RegImm,
    /// `rs1, rs2` (CMP)
    RegReg,
    /// `rs1, rs2, #imm` (STORE)
    SrcSrcImm,
    /// `rs3, rs1, rs2` (STR)
    SrcSrcSrc,
    /// `#imm` (branches)
    Imm,
    /// no operands (HALT, NOP)
    None,
}

impl Opcode {
    /// Returns the assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Addl => "ADDL",
            Self::Sub => "SUB",
            Self::Subl => "SUBL",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Movc => "MOVC",
            Self::Load => "LOAD",
            Self::Ldr => "LDR",
            Self::Store => "STORE",
            Self::Str => "STR",
            Self::Cmp => "CMP",
            Self::Bz => "BZ",
            Self::Bnz => "BNZ",
            Self::Nop => "NOP",
            Self::Halt => "HALT",
        }
    }

    /// Looks up an opcode by mnemonic, case-insensitively.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADD" => Some(Self::Add),
            "ADDL" => Some(Self::Addl),
            "SUB" => Some(Self::Sub),
            "SUBL" => Some(Self::Subl),
            "MUL" => Some(Self::Mul),
            "DIV" => Some(Self::Div),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "XOR" => Some(Self::Xor),
            "MOVC" => Some(Self::Movc),
            "LOAD" => Some(Self::Load),
            "LDR" => Some(Self::Ldr),
            "STORE" => Some(Self::Store),
            "STR" => Some(Self::Str),
            "CMP" => Some(Self::Cmp),
            "BZ" => Some(Self::Bz),
            "BNZ" => Some(Self::Bnz),
            "NOP" => Some(Self::Nop),
            "HALT" => Some(Self::Halt),
            _ => None,
        }
    }

    /// Returns the operand layout of this opcode's assembly form.
    pub fn operand_form(self) -> OperandForm {
        match self {
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Ldr => OperandForm::RegRegReg,
            Self::Addl | Self::Subl | Self::Load => OperandForm::RegRegImm,
            Self::Movc => OperandForm::RegImm,
            Self::Cmp => OperandForm::RegReg,
            Self::Store => OperandForm::SrcSrcImm,
            Self::Str => OperandForm::SrcSrcSrc,
            Self::Bz | Self::Bnz => OperandForm::Imm,
            Self::Nop | Self::Halt => OperandForm::None,
        }
    }

    /// Returns the function unit this opcode dispatches to.
    ///
    /// Branches, NOP and HALT ride the integer unit; branches additionally
    /// read the zero flag there.
    pub fn fu_class(self) -> FuClass {
        match self {
            Self::Mul => FuClass::Multiplier,
            Self::Load | Self::Ldr | Self::Store | Self::Str => FuClass::LoadStore,
            Self::Add
            | Self::Addl
            | Self::Sub
            | Self::Subl
            | Self::Div
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Movc
            | Self::Cmp
            | Self::Bz
            | Self::Bnz
            | Self::Nop
            | Self::Halt => FuClass::Integer,
        }
    }

    /// Whether decode readiness is gated on rs1.
    pub fn reads_rs1(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Addl
                | Self::Sub
                | Self::Subl
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Load
                | Self::Ldr
                | Self::Store
                | Self::Str
                | Self::Cmp
        )
    }

    /// Whether decode readiness is gated on rs2.
    pub fn reads_rs2(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Ldr
                | Self::Store
                | Self::Str
                | Self::Cmp
        )
    }

    /// Whether decode readiness is gated on rs3 (STR only).
    pub fn reads_rs3(self) -> bool {
        matches!(self, Self::Str)
    }

    /// Whether the opcode commits a result to `rd` at writeback.
    pub fn writes_register(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Addl
                | Self::Sub
                | Self::Subl
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Movc
                | Self::Load
                | Self::Ldr
        )
    }

    /// Whether the opcode finalizes the zero flag at writeback.
    pub fn writes_zero_flag(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Addl | Self::Sub | Self::Subl | Self::Mul | Self::Cmp
        )
    }

    /// Whether the opcode is a conditional branch (reads the zero flag).
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Bz | Self::Bnz)
    }

    /// Whether the opcode touches data memory.
    pub fn is_memory(self) -> bool {
        matches!(self, Self::Load | Self::Ldr | Self::Store | Self::Str)
    }
}

/// One decoded code-memory slot.
///
/// Operand fields an opcode does not use are left at zero, matching the
/// loader contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode.
    pub opcode: Opcode,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Third source register index (STR only).
    pub rs3: usize,
    /// Signed literal operand.
    pub imm: i32,
}

impl Default for Opcode {
    fn default() -> Self {
        Self::Nop
    }
}

impl Instruction {
    /// Creates an instruction with all operand fields zeroed.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            ..Self::default()
        }
    }
}
