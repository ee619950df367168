//! Offset Resolver
//!
//! Maps branch-target byte offsets to instruction indices. A map is built
//! once per method body and is immutable afterwards, so the engine shares it
//! between invocations of the same method.

use std::collections::HashMap;

use crate::bytecode::Instruction;
use crate::error::{VmError, VmResult};

#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    index: HashMap<u32, usize>,
}

impl OffsetMap {
    pub fn build(instructions: &[Instruction]) -> Self {
        let index = instructions
            .iter()
            .enumerate()
            .map(|(i, instruction)| (instruction.offset, i))
            .collect();
        OffsetMap { index }
    }

    /// Index of the instruction that starts at `offset`
    pub fn resolve(&self, offset: u32) -> VmResult<usize> {
        self.index
            .get(&offset)
            .copied()
            .ok_or(VmError::MalformedBytecode(offset))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// One-shot resolution without keeping the map
pub fn resolve(offset: u32, instructions: &[Instruction]) -> VmResult<usize> {
    OffsetMap::build(instructions).resolve(offset)
}
