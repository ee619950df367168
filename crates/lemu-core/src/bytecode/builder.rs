//! In-memory method assembler.
//!
//! Produces resolved [`MethodDescriptor`]s without going through a container
//! format: byte offsets follow the encoded size of each opcode, and branches
//! may name labels that are bound before or after the branch.

use crate::error::{VmError, VmResult};

use super::instruction::{Instruction, Operand};
use super::method::{MemberRef, MethodDescriptor, MethodId, ReturnKind};
use super::opcode::OpCode;

/// Branch destination inside a method under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    param_count: usize,
    local_count: usize,
    returns: ReturnKind,
    body: Vec<Instruction>,
    offset: u32,
    labels: Vec<Option<u32>>,
    // (instruction index, label)
    fixups: Vec<(usize, Label)>,
    // first label marked here that this builder never created
    foreign: Option<Label>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        MethodBuilder {
            name: name.into(),
            param_count: 0,
            local_count: 0,
            returns: ReturnKind::Void,
            body: Vec::new(),
            offset: 0,
            labels: Vec::new(),
            fixups: Vec::new(),
            foreign: None,
        }
    }

    pub fn params(mut self, count: usize) -> Self {
        self.param_count = count;
        self
    }

    pub fn locals(mut self, count: usize) -> Self {
        self.local_count = count;
        self
    }

    pub fn returns(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    pub fn op(&mut self, opcode: OpCode) -> &mut Self {
        self.op_with(opcode, Operand::None)
    }

    pub fn op_with(&mut self, opcode: OpCode, operand: Operand) -> &mut Self {
        self.body
            .push(Instruction::with_operand(self.offset, opcode, operand));
        self.offset += opcode.encoded_len();
        self
    }

    pub fn ldc_i4(&mut self, value: i32) -> &mut Self {
        self.op_with(OpCode::LdcI4, Operand::Int32(value))
    }

    pub fn ldstr(&mut self, value: impl Into<String>) -> &mut Self {
        self.op_with(OpCode::LdStr, Operand::String(value.into()))
    }

    pub fn ldloc(&mut self, index: u16) -> &mut Self {
        self.op_with(OpCode::LdLocS, Operand::Index(index))
    }

    pub fn stloc(&mut self, index: u16) -> &mut Self {
        self.op_with(OpCode::StLocS, Operand::Index(index))
    }

    pub fn ldarg(&mut self, index: u16) -> &mut Self {
        self.op_with(OpCode::LdArgS, Operand::Index(index))
    }

    pub fn starg(&mut self, index: u16) -> &mut Self {
        self.op_with(OpCode::StArgS, Operand::Index(index))
    }

    pub fn call(&mut self, method: MethodId) -> &mut Self {
        self.op_with(OpCode::Call, Operand::Method(method))
    }

    pub fn call_native(&mut self, member: MemberRef) -> &mut Self {
        self.op_with(OpCode::Call, Operand::Member(member))
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the offset of the next emitted instruction
    pub fn mark(&mut self, label: Label) -> &mut Self {
        match self.labels.get_mut(label.0) {
            Some(slot) => *slot = Some(self.offset),
            None => {
                self.foreign.get_or_insert(label);
            }
        }
        self
    }

    /// Emit a branch opcode whose target is resolved when the method is built
    pub fn branch(&mut self, opcode: OpCode, label: Label) -> &mut Self {
        self.fixups.push((self.body.len(), label));
        self.op_with(opcode, Operand::Target(0))
    }

    pub fn build(mut self) -> VmResult<MethodDescriptor> {
        if let Some(label) = self.foreign {
            return Err(VmError::UnboundLabel(label.0));
        }
        for (index, label) in self.fixups.drain(..) {
            let target = self
                .labels
                .get(label.0)
                .copied()
                .flatten()
                .ok_or(VmError::UnboundLabel(label.0))?;
            self.body[index].operand = Operand::Target(target);
        }
        Ok(MethodDescriptor {
            name: self.name,
            param_count: self.param_count,
            local_count: self.local_count,
            returns: self.returns,
            body: self.body,
        })
    }
}
