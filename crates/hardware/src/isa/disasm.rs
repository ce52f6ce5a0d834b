//! Instruction disassembly for stage traces and diagnostics.
//!
//! Renders an [`Instruction`] back into its assembly form, in the comma
//! layout the verbose run modes print (`ADD,R3,R1,R2`, `MOVC,R1,#5`, ...).

use std::fmt;

use super::{Instruction, Opcode, OperandForm};

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        match op.operand_form() {
            OperandForm::RegRegReg => {
                write!(f, "{},R{},R{},R{}", op, self.rd, self.rs1, self.rs2)
            }
            OperandForm::RegRegImm => {
                write!(f, "{},R{},R{},#{}", op, self.rd, self.rs1, self.imm)
            }
            OperandForm::RegImm => write!(f, "{},R{},#{}", op, self.rd, self.imm),
            OperandForm::RegReg => write!(f, "{},R{},R{}", op, self.rs1, self.rs2),
            OperandForm::SrcSrcImm => {
                write!(f, "{},R{},R{},#{}", op, self.rs1, self.rs2, self.imm)
            }
            OperandForm::SrcSrcSrc => {
                write!(f, "{},R{},R{},R{}", op, self.rs3, self.rs1, self.rs2)
            }
            OperandForm::Imm => write!(f, "{},#{}", op, self.imm),
            OperandForm::None => write!(f, "{op}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        let add = Instruction {
            opcode: Opcode::Add,
            rd: 3,
            rs1: 1,
            rs2: 2,
            ..Instruction::default()
        };
        assert_eq!(add.to_string(), "ADD,R3,R1,R2");

        let movc = Instruction {
            opcode: Opcode::Movc,
            rd: 1,
            imm: -5,
            ..Instruction::default()
        };
        assert_eq!(movc.to_string(), "MOVC,R1,#-5");

        let str_inst = Instruction {
            opcode: Opcode::Str,
            rs1: 1,
            rs2: 2,
            rs3: 7,
            ..Instruction::default()
        };
        assert_eq!(str_inst.to_string(), "STR,R7,R1,R2");

        assert_eq!(Instruction::new(Opcode::Halt).to_string(), "HALT");
    }
}
