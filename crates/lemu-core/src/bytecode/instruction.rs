//! Bytecode Instruction Representation
//!
//! Instructions arrive from the loader with their byte offset and a resolved
//! operand. This layer contains no execution semantics.

use std::fmt;

use crate::error::{VmError, VmResult};

use super::method::{MemberRef, MethodId};
use super::opcode::OpCode;

/// Resolved instruction operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    Int32(i32),
    String(String),
    /// Local or argument slot
    Index(u16),
    /// Branch target as an absolute byte offset within the method body
    Target(u32),
    /// Interpreted callee
    Method(MethodId),
    /// Native callee
    Member(MemberRef),
}

/// Decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of this instruction within its method body
    pub offset: u32,
    /// Raw opcode number; may lie outside the interpreted subset
    pub opcode: u16,
    pub operand: Operand,
}

impl Instruction {
    /// Create an instruction with no operand
    pub fn new(offset: u32, opcode: OpCode) -> Self {
        Instruction {
            offset,
            opcode: opcode as u16,
            operand: Operand::None,
        }
    }

    /// Create an instruction with a single operand
    pub fn with_operand(offset: u32, opcode: OpCode, operand: Operand) -> Self {
        Instruction {
            offset,
            opcode: opcode as u16,
            operand,
        }
    }

    /// Create an instruction from a raw opcode number
    pub fn raw(offset: u32, opcode: u16, operand: Operand) -> Self {
        Instruction {
            offset,
            opcode,
            operand,
        }
    }

    pub fn int32(&self) -> VmResult<i32> {
        match self.operand {
            Operand::Int32(value) => Ok(value),
            _ => Err(self.invalid_operand("int32 constant")),
        }
    }

    pub fn string(&self) -> VmResult<&str> {
        match &self.operand {
            Operand::String(value) => Ok(value),
            _ => Err(self.invalid_operand("string literal")),
        }
    }

    pub fn index(&self) -> VmResult<usize> {
        match self.operand {
            Operand::Index(index) => Ok(index as usize),
            _ => Err(self.invalid_operand("slot index")),
        }
    }

    pub fn target(&self) -> VmResult<u32> {
        match self.operand {
            Operand::Target(offset) => Ok(offset),
            _ => Err(self.invalid_operand("branch target")),
        }
    }

    fn invalid_operand(&self, expected: &'static str) -> VmError {
        VmError::InvalidOperand {
            offset: self.offset,
            expected,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04X}: ", self.offset)?;
        match OpCode::from_u16(self.opcode) {
            Some(op) => write!(f, "{}", op.mnemonic())?,
            None => write!(f, "0x{:04X}", self.opcode)?,
        }
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Int32(value) => write!(f, " {}", value),
            Operand::String(value) => write!(f, " {:?}", value),
            Operand::Index(index) => write!(f, " {}", index),
            Operand::Target(offset) => write!(f, " IL_{:04X}", offset),
            Operand::Method(id) => write!(f, " {}", id),
            Operand::Member(member) => write!(f, " {}", member),
        }
    }
}
