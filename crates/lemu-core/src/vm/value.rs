//! Runtime Value Representation
//!
//! Defines the closed set of values that live on evaluation stacks and in
//! local and argument slots.

use std::fmt;

use crate::error::{VmError, VmResult};

/// Opaque handle to a host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

/// Runtime value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absence of a value; initial content of every slot
    #[default]
    Null,

    Bool(bool),

    Int(i32),

    Str(String),

    Object(ObjectHandle),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int32",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// Integer operand for `op`
    pub fn as_int(&self, op: &'static str) -> VmResult<i32> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(VmError::TypeMismatch {
                op,
                expected: "int32",
                found: other.type_name(),
            }),
        }
    }

    /// Truthiness for conditional branches: booleans as is, integers by non-zero
    pub fn as_condition(&self, op: &'static str) -> VmResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(v) => Ok(*v != 0),
            other => Err(VmError::TypeMismatch {
                op,
                expected: "bool or int32",
                found: other.type_name(),
            }),
        }
    }
}

/// Textual representation handed to native members
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::Object(h) => write!(f, "object#{}", h.0),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
