//! Bytecode Opcode Definitions
//!
//! Defines the interpreted opcode subset. Opcode values are the managed
//! bytecode (CIL) encodings; two-byte opcodes carry their `0xFE` prefix in
//! the high byte. This file contains no execution semantics.

/// Interpreted opcodes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Nop = 0x00,

    // Arguments
    LdArg0 = 0x02,
    LdArg1 = 0x03,
    LdArg2 = 0x04,
    LdArg3 = 0x05,
    LdArgS = 0x0E,
    StArgS = 0x10,

    // Locals
    LdLoc0 = 0x06,
    LdLoc1 = 0x07,
    LdLoc2 = 0x08,
    LdLoc3 = 0x09,
    StLoc0 = 0x0A,
    StLoc1 = 0x0B,
    StLoc2 = 0x0C,
    StLoc3 = 0x0D,
    LdLocS = 0x11,
    StLocS = 0x13,

    // Constants
    LdNull = 0x14,
    LdcI4M1 = 0x15,
    LdcI4_0 = 0x16,
    LdcI4_1 = 0x17,
    LdcI4_2 = 0x18,
    LdcI4_3 = 0x19,
    LdcI4_4 = 0x1A,
    LdcI4_5 = 0x1B,
    LdcI4_6 = 0x1C,
    LdcI4_7 = 0x1D,
    LdcI4_8 = 0x1E,
    LdcI4S = 0x1F,
    LdcI4 = 0x20,
    LdStr = 0x72,

    // Stack
    Dup = 0x25,
    Pop = 0x26,

    // Calls
    Call = 0x28,
    Ret = 0x2A,

    // Control flow
    BrS = 0x2B,
    BrFalseS = 0x2C,
    BrTrueS = 0x2D,
    Br = 0x38,
    BrFalse = 0x39,
    BrTrue = 0x3A,

    // Arithmetic
    Add = 0x58,
    Sub = 0x59,
    Mul = 0x5A,
    Div = 0x5B,
    Rem = 0x5D,
    Neg = 0x65,

    // Comparison
    Ceq = 0xFE01,
    Cgt = 0xFE02,
    Clt = 0xFE04,
}

/// Shape of the operand an opcode carries in its encoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// 8-bit signed constant
    ShortInt,
    /// 32-bit signed constant
    Int,
    /// metadata token of a string literal
    String,
    /// 8-bit local or argument index
    ShortIndex,
    /// 8-bit relative branch
    ShortTarget,
    /// 32-bit relative branch
    Target,
    /// metadata token of a callee
    Method,
}

impl OperandKind {
    /// Encoded operand size in bytes
    pub fn size(self) -> u32 {
        match self {
            OperandKind::None => 0,
            OperandKind::ShortInt | OperandKind::ShortIndex | OperandKind::ShortTarget => 1,
            OperandKind::Int | OperandKind::String | OperandKind::Target | OperandKind::Method => 4,
        }
    }
}

impl OpCode {
    /// Convert a raw opcode number to an interpreted opcode
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x00 => Some(OpCode::Nop),
            0x02 => Some(OpCode::LdArg0),
            0x03 => Some(OpCode::LdArg1),
            0x04 => Some(OpCode::LdArg2),
            0x05 => Some(OpCode::LdArg3),
            0x0E => Some(OpCode::LdArgS),
            0x10 => Some(OpCode::StArgS),
            0x06 => Some(OpCode::LdLoc0),
            0x07 => Some(OpCode::LdLoc1),
            0x08 => Some(OpCode::LdLoc2),
            0x09 => Some(OpCode::LdLoc3),
            0x0A => Some(OpCode::StLoc0),
            0x0B => Some(OpCode::StLoc1),
            0x0C => Some(OpCode::StLoc2),
            0x0D => Some(OpCode::StLoc3),
            0x11 => Some(OpCode::LdLocS),
            0x13 => Some(OpCode::StLocS),
            0x14 => Some(OpCode::LdNull),
            0x15 => Some(OpCode::LdcI4M1),
            0x16 => Some(OpCode::LdcI4_0),
            0x17 => Some(OpCode::LdcI4_1),
            0x18 => Some(OpCode::LdcI4_2),
            0x19 => Some(OpCode::LdcI4_3),
            0x1A => Some(OpCode::LdcI4_4),
            0x1B => Some(OpCode::LdcI4_5),
            0x1C => Some(OpCode::LdcI4_6),
            0x1D => Some(OpCode::LdcI4_7),
            0x1E => Some(OpCode::LdcI4_8),
            0x1F => Some(OpCode::LdcI4S),
            0x20 => Some(OpCode::LdcI4),
            0x72 => Some(OpCode::LdStr),
            0x25 => Some(OpCode::Dup),
            0x26 => Some(OpCode::Pop),
            0x28 => Some(OpCode::Call),
            0x2A => Some(OpCode::Ret),
            0x2B => Some(OpCode::BrS),
            0x2C => Some(OpCode::BrFalseS),
            0x2D => Some(OpCode::BrTrueS),
            0x38 => Some(OpCode::Br),
            0x39 => Some(OpCode::BrFalse),
            0x3A => Some(OpCode::BrTrue),
            0x58 => Some(OpCode::Add),
            0x59 => Some(OpCode::Sub),
            0x5A => Some(OpCode::Mul),
            0x5B => Some(OpCode::Div),
            0x5D => Some(OpCode::Rem),
            0x65 => Some(OpCode::Neg),
            0xFE01 => Some(OpCode::Ceq),
            0xFE02 => Some(OpCode::Cgt),
            0xFE04 => Some(OpCode::Clt),
            _ => None,
        }
    }

    /// Assembly mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Nop => "nop",
            OpCode::LdArg0 => "ldarg.0",
            OpCode::LdArg1 => "ldarg.1",
            OpCode::LdArg2 => "ldarg.2",
            OpCode::LdArg3 => "ldarg.3",
            OpCode::LdArgS => "ldarg.s",
            OpCode::StArgS => "starg.s",
            OpCode::LdLoc0 => "ldloc.0",
            OpCode::LdLoc1 => "ldloc.1",
            OpCode::LdLoc2 => "ldloc.2",
            OpCode::LdLoc3 => "ldloc.3",
            OpCode::StLoc0 => "stloc.0",
            OpCode::StLoc1 => "stloc.1",
            OpCode::StLoc2 => "stloc.2",
            OpCode::StLoc3 => "stloc.3",
            OpCode::LdLocS => "ldloc.s",
            OpCode::StLocS => "stloc.s",
            OpCode::LdNull => "ldnull",
            OpCode::LdcI4M1 => "ldc.i4.m1",
            OpCode::LdcI4_0 => "ldc.i4.0",
            OpCode::LdcI4_1 => "ldc.i4.1",
            OpCode::LdcI4_2 => "ldc.i4.2",
            OpCode::LdcI4_3 => "ldc.i4.3",
            OpCode::LdcI4_4 => "ldc.i4.4",
            OpCode::LdcI4_5 => "ldc.i4.5",
            OpCode::LdcI4_6 => "ldc.i4.6",
            OpCode::LdcI4_7 => "ldc.i4.7",
            OpCode::LdcI4_8 => "ldc.i4.8",
            OpCode::LdcI4S => "ldc.i4.s",
            OpCode::LdcI4 => "ldc.i4",
            OpCode::LdStr => "ldstr",
            OpCode::Dup => "dup",
            OpCode::Pop => "pop",
            OpCode::Call => "call",
            OpCode::Ret => "ret",
            OpCode::BrS => "br.s",
            OpCode::BrFalseS => "brfalse.s",
            OpCode::BrTrueS => "brtrue.s",
            OpCode::Br => "br",
            OpCode::BrFalse => "brfalse",
            OpCode::BrTrue => "brtrue",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Rem => "rem",
            OpCode::Neg => "neg",
            OpCode::Ceq => "ceq",
            OpCode::Cgt => "cgt",
            OpCode::Clt => "clt",
        }
    }

    /// Operand shape in the encoded instruction stream
    pub fn operand_kind(self) -> OperandKind {
        match self {
            OpCode::LdcI4S => OperandKind::ShortInt,
            OpCode::LdcI4 => OperandKind::Int,
            OpCode::LdStr => OperandKind::String,
            OpCode::LdArgS | OpCode::StArgS | OpCode::LdLocS | OpCode::StLocS => {
                OperandKind::ShortIndex
            }
            OpCode::BrS | OpCode::BrFalseS | OpCode::BrTrueS => OperandKind::ShortTarget,
            OpCode::Br | OpCode::BrFalse | OpCode::BrTrue => OperandKind::Target,
            OpCode::Call => OperandKind::Method,
            _ => OperandKind::None,
        }
    }

    /// Total encoded size (opcode bytes plus operand bytes)
    pub fn encoded_len(self) -> u32 {
        let opcode_len = if (self as u16) > 0xFF { 2 } else { 1 };
        opcode_len + self.operand_kind().size()
    }

    /// Slot index baked into the short local/argument forms
    pub fn implicit_index(self) -> Option<usize> {
        match self {
            OpCode::LdArg0 | OpCode::LdLoc0 | OpCode::StLoc0 => Some(0),
            OpCode::LdArg1 | OpCode::LdLoc1 | OpCode::StLoc1 => Some(1),
            OpCode::LdArg2 | OpCode::LdLoc2 | OpCode::StLoc2 => Some(2),
            OpCode::LdArg3 | OpCode::LdLoc3 | OpCode::StLoc3 => Some(3),
            _ => None,
        }
    }

    /// Constant baked into the `ldc.i4.<n>` forms
    pub fn implicit_constant(self) -> Option<i32> {
        match self {
            OpCode::LdcI4M1 => Some(-1),
            OpCode::LdcI4_0 => Some(0),
            OpCode::LdcI4_1 => Some(1),
            OpCode::LdcI4_2 => Some(2),
            OpCode::LdcI4_3 => Some(3),
            OpCode::LdcI4_4 => Some(4),
            OpCode::LdcI4_5 => Some(5),
            OpCode::LdcI4_6 => Some(6),
            OpCode::LdcI4_7 => Some(7),
            OpCode::LdcI4_8 => Some(8),
            _ => None,
        }
    }

    /// Whether the opcode transfers control to a branch target
    pub fn is_branch(self) -> bool {
        matches!(
            self.operand_kind(),
            OperandKind::Target | OperandKind::ShortTarget
        )
    }
}
