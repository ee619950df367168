//! Lemu Error Types
//!
//! Defines all core error conditions produced by the interpreter.
//! Every error is fatal to the current call chain and propagates to the
//! top-level `run` caller unchanged.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    // Bytecode errors
    #[error("malformed bytecode: no instruction at offset IL_{0:04X}")]
    MalformedBytecode(u32),

    #[error("unsupported instruction 0x{opcode:04X} at IL_{offset:04X}")]
    UnsupportedInstruction { opcode: u16, offset: u32 },

    #[error("invalid operand at IL_{offset:04X}: expected {expected}")]
    InvalidOperand { offset: u32, expected: &'static str },

    #[error("invalid method id: {0}")]
    InvalidMethod(usize),

    #[error("label {0} was referenced but never marked")]
    UnboundLabel(usize),

    // Execution errors
    #[error("stack underflow")]
    StackUnderflow,

    #[error("stack overflow: limit of {0} values exceeded")]
    StackOverflow(usize),

    #[error("type mismatch in {op}: expected {expected}, found {found}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid local index {index} (method declares {count})")]
    InvalidLocalIndex { index: usize, count: usize },

    #[error("invalid argument index {index} (method declares {count})")]
    InvalidArgumentIndex { index: usize, count: usize },

    #[error("{method} expects {expected} arguments, got {found}")]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("division by zero")]
    DivideByZero,

    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    // Resource limits
    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("method declares {declared} locals, limit is {limit}")]
    TooManyLocals { declared: usize, limit: usize },

    // Native boundary
    #[error("native call {type_name}::{member} is not registered")]
    UnsupportedNativeCall { type_name: String, member: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type VmResult<T> = Result<T, VmError>;
