//! Method descriptors and the program method table.
//!
//! Descriptors are produced by the loader and never mutated by the VM.

use std::fmt;

use crate::error::{VmError, VmResult};

use super::instruction::Instruction;

/// Index of an interpreted method in its [`Program`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub usize);

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

/// Return classification of a callee signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Value,
}

impl ReturnKind {
    pub fn is_value(self) -> bool {
        self == ReturnKind::Value
    }
}

/// Immutable description of one interpreted method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub param_count: usize,
    pub local_count: usize,
    pub returns: ReturnKind,
    pub body: Vec<Instruction>,
}

/// Reference to a host-implemented member, resolved by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Fully-qualified declaring type, e.g. `System.Console`
    pub type_name: String,
    pub member: String,
    pub param_count: usize,
    pub returns: ReturnKind,
}

impl MemberRef {
    pub fn new(
        type_name: impl Into<String>,
        member: impl Into<String>,
        param_count: usize,
        returns: ReturnKind,
    ) -> Self {
        MemberRef {
            type_name: type_name.into(),
            member: member.into(),
            param_count,
            returns,
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}/{}", self.type_name, self.member, self.param_count)
    }
}

/// Method table plus entry point
#[derive(Debug, Clone, Default)]
pub struct Program {
    methods: Vec<MethodDescriptor>,
    entry_point: MethodId,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for a method whose body is supplied later with [`Program::define`].
    /// Lets recursive and mutually recursive bodies reference their own ids.
    pub fn declare(&mut self, name: impl Into<String>) -> MethodId {
        let id = MethodId(self.methods.len());
        self.methods.push(MethodDescriptor {
            name: name.into(),
            param_count: 0,
            local_count: 0,
            returns: ReturnKind::Void,
            body: Vec::new(),
        });
        id
    }

    /// Replace the descriptor behind a declared id
    pub fn define(&mut self, id: MethodId, method: MethodDescriptor) -> VmResult<()> {
        let slot = self
            .methods
            .get_mut(id.0)
            .ok_or(VmError::InvalidMethod(id.0))?;
        *slot = method;
        Ok(())
    }

    /// Append a fully-built method
    pub fn add(&mut self, method: MethodDescriptor) -> MethodId {
        let id = MethodId(self.methods.len());
        self.methods.push(method);
        id
    }

    pub fn method(&self, id: MethodId) -> VmResult<&MethodDescriptor> {
        self.methods.get(id.0).ok_or(VmError::InvalidMethod(id.0))
    }

    pub fn entry_point(&self) -> MethodId {
        self.entry_point
    }

    pub fn set_entry_point(&mut self, id: MethodId) {
        self.entry_point = id;
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
