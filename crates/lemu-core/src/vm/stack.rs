//! VM Stack Implementation
//!
//! Evaluation stack owned by a single frame.
//! No execution semantics.

use crate::error::{VmError, VmResult};
use super::value::Value;

/// Per-frame evaluation stack
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    max_size: usize,
}

impl Stack {
    /// Create new stack with maximum size
    pub fn new(max_size: usize) -> Self {
        Stack {
            values: Vec::new(),
            max_size,
        }
    }

    /// Push value onto stack
    pub fn push(&mut self, value: Value) -> VmResult<()> {
        if self.values.len() >= self.max_size {
            return Err(VmError::StackOverflow(self.max_size));
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> VmResult<Value> {
        self.values.pop().ok_or(VmError::StackUnderflow)
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> VmResult<&Value> {
        self.values.last().ok_or(VmError::StackUnderflow)
    }

    /// Duplicate top value
    pub fn dup(&mut self) -> VmResult<()> {
        let value = self.peek()?.clone();
        self.push(value)
    }

    /// Get current stack size
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
