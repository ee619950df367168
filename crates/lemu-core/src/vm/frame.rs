//! Invocation frame and the synchronous part of opcode dispatch.
//!
//! A frame owns its evaluation stack, locals and arguments exclusively.
//! Everything except calls is executed here; calls are handed back to the
//! VM as [`Flow::CallMethod`] / [`Flow::CallNative`].

use std::sync::Arc;

use crate::bytecode::{Instruction, MemberRef, MethodDescriptor, MethodId, OpCode, Operand};
use crate::error::{VmError, VmResult};

use super::memory::Slots;
use super::offsets::OffsetMap;
use super::stack::Stack;
use super::value::Value;

/// What the dispatch loop does after an instruction
#[derive(Debug, PartialEq)]
pub enum Flow<'i> {
    Next,
    /// Continue at the instruction starting at this byte offset
    Jump(u32),
    CallMethod(MethodId),
    CallNative(&'i MemberRef),
    Return(Option<Value>),
}

#[derive(Debug)]
pub struct Frame<'m> {
    pub id: MethodId,
    pub method: &'m MethodDescriptor,
    pub stack: Stack,
    pub locals: Slots,
    pub args: Slots,
    /// Index of the instruction being executed
    pub ip: usize,
    pub depth: usize,
    pub(crate) offsets: Option<Arc<OffsetMap>>,
}

impl<'m> Frame<'m> {
    pub fn new(
        id: MethodId,
        method: &'m MethodDescriptor,
        args: Vec<Value>,
        max_stack_size: usize,
        depth: usize,
    ) -> VmResult<Self> {
        if args.len() != method.param_count {
            return Err(VmError::ArgumentCountMismatch {
                method: method.name.clone(),
                expected: method.param_count,
                found: args.len(),
            });
        }
        Ok(Frame {
            id,
            method,
            stack: Stack::new(max_stack_size),
            locals: Slots::locals(method.local_count),
            args: Slots::arguments(args),
            ip: 0,
            depth,
            offsets: None,
        })
    }

    /// Result of running past the last instruction without `ret`
    pub fn fall_through_result(&self) -> Option<Value> {
        self.method.returns.is_value().then_some(Value::Null)
    }

    /// Execute one non-call instruction against this frame's state
    pub fn step<'i>(&mut self, opcode: OpCode, instruction: &'i Instruction) -> VmResult<Flow<'i>> {
        let op = opcode.mnemonic();
        match opcode {
            OpCode::Nop => {}

            OpCode::LdNull => self.stack.push(Value::Null)?,
            OpCode::LdcI4 | OpCode::LdcI4S => self.stack.push(Value::Int(instruction.int32()?))?,
            OpCode::LdcI4M1
            | OpCode::LdcI4_0
            | OpCode::LdcI4_1
            | OpCode::LdcI4_2
            | OpCode::LdcI4_3
            | OpCode::LdcI4_4
            | OpCode::LdcI4_5
            | OpCode::LdcI4_6
            | OpCode::LdcI4_7
            | OpCode::LdcI4_8 => {
                let value = opcode.implicit_constant().unwrap_or_default();
                self.stack.push(Value::Int(value))?
            }
            OpCode::LdStr => self.stack.push(Value::Str(instruction.string()?.to_string()))?,

            OpCode::LdLoc0 | OpCode::LdLoc1 | OpCode::LdLoc2 | OpCode::LdLoc3 | OpCode::LdLocS => {
                let value = self.locals.load(slot_index(opcode, instruction)?)?;
                self.stack.push(value)?
            }
            OpCode::StLoc0 | OpCode::StLoc1 | OpCode::StLoc2 | OpCode::StLoc3 | OpCode::StLocS => {
                let index = slot_index(opcode, instruction)?;
                let value = self.stack.pop()?;
                self.locals.store(index, value)?
            }
            OpCode::LdArg0 | OpCode::LdArg1 | OpCode::LdArg2 | OpCode::LdArg3 | OpCode::LdArgS => {
                let value = self.args.load(slot_index(opcode, instruction)?)?;
                self.stack.push(value)?
            }
            OpCode::StArgS => {
                let index = instruction.index()?;
                let value = self.stack.pop()?;
                self.args.store(index, value)?
            }

            OpCode::Dup => self.stack.dup()?,
            OpCode::Pop => {
                self.stack.pop()?;
            }

            OpCode::Add => self.binary(op, |a, b| Ok(a.wrapping_add(b)))?,
            OpCode::Sub => self.binary(op, |a, b| Ok(a.wrapping_sub(b)))?,
            OpCode::Mul => self.binary(op, |a, b| Ok(a.wrapping_mul(b)))?,
            OpCode::Div => self.binary(op, |a, b| {
                if b == 0 {
                    return Err(VmError::DivideByZero);
                }
                a.checked_div(b).ok_or(VmError::ArithmeticOverflow("div"))
            })?,
            OpCode::Rem => self.binary(op, |a, b| {
                if b == 0 {
                    return Err(VmError::DivideByZero);
                }
                a.checked_rem(b).ok_or(VmError::ArithmeticOverflow("rem"))
            })?,
            OpCode::Neg => {
                let value = self.stack.pop()?.as_int(op)?;
                self.stack.push(Value::Int(value.wrapping_neg()))?
            }

            OpCode::Ceq => {
                let right = self.stack.pop()?;
                let left = self.stack.pop()?;
                let equal = values_equal(&left, &right)?;
                self.stack.push(Value::Int(equal as i32))?
            }
            OpCode::Cgt => self.binary(op, |a, b| Ok((a > b) as i32))?,
            OpCode::Clt => self.binary(op, |a, b| Ok((a < b) as i32))?,

            OpCode::Br | OpCode::BrS => return Ok(Flow::Jump(instruction.target()?)),
            OpCode::BrTrue | OpCode::BrTrueS | OpCode::BrFalse | OpCode::BrFalseS => {
                let target = instruction.target()?;
                let condition = self.stack.pop()?.as_condition(op)?;
                let on_true = matches!(opcode, OpCode::BrTrue | OpCode::BrTrueS);
                if condition == on_true {
                    return Ok(Flow::Jump(target));
                }
            }

            OpCode::Call => {
                return match &instruction.operand {
                    Operand::Method(id) => Ok(Flow::CallMethod(*id)),
                    Operand::Member(member) => Ok(Flow::CallNative(member)),
                    _ => Err(VmError::InvalidOperand {
                        offset: instruction.offset,
                        expected: "method or member reference",
                    }),
                };
            }
            OpCode::Ret => {
                let value = if self.method.returns.is_value() {
                    Some(self.stack.pop()?)
                } else {
                    None
                };
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    /// Pop right then left, push `f(left, right)`
    fn binary<F>(&mut self, op: &'static str, f: F) -> VmResult<()>
    where
        F: FnOnce(i32, i32) -> VmResult<i32>,
    {
        let right = self.stack.pop()?.as_int(op)?;
        let left = self.stack.pop()?.as_int(op)?;
        self.stack.push(Value::Int(f(left, right)?))
    }
}

fn slot_index(opcode: OpCode, instruction: &Instruction) -> VmResult<usize> {
    match opcode.implicit_index() {
        Some(index) => Ok(index),
        None => instruction.index(),
    }
}

/// `ceq` contract: same tags, or null against a reference-like value
fn values_equal(left: &Value, right: &Value) -> VmResult<bool> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Object(a), Value::Object(b)) => Ok(a == b),
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, Value::Str(_) | Value::Object(_))
        | (Value::Str(_) | Value::Object(_), Value::Null) => Ok(false),
        (left, right) => Err(VmError::TypeMismatch {
            op: "ceq",
            expected: left.type_name(),
            found: right.type_name(),
        }),
    }
}
