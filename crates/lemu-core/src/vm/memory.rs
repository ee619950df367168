//! VM Memory Model
//!
//! Fixed-size, index-addressed slot arrays owned by a single frame.

use crate::error::{VmError, VmResult};
use super::value::Value;

/// What a slot array holds; selects the error reported on a bad index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Local,
    Argument,
}

/// Local variables or arguments of a single call frame
#[derive(Debug)]
pub struct Slots {
    kind: SlotKind,
    values: Vec<Value>,
}

impl Slots {
    /// `size` local slots, all `Null`
    pub fn locals(size: usize) -> Self {
        Slots {
            kind: SlotKind::Local,
            values: vec![Value::Null; size],
        }
    }

    /// Argument slots filled in declaration order
    pub fn arguments(values: Vec<Value>) -> Self {
        Slots {
            kind: SlotKind::Argument,
            values,
        }
    }

    pub fn load(&self, index: usize) -> VmResult<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| self.invalid(index))
    }

    pub fn store(&mut self, index: usize, value: Value) -> VmResult<()> {
        if index >= self.values.len() {
            return Err(self.invalid(index));
        }
        self.values[index] = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn invalid(&self, index: usize) -> VmError {
        let count = self.values.len();
        match self.kind {
            SlotKind::Local => VmError::InvalidLocalIndex { index, count },
            SlotKind::Argument => VmError::InvalidArgumentIndex { index, count },
        }
    }
}
