//! Argument Marshaler
//!
//! Arguments are pushed in declaration order, so the last-pushed value is
//! the last parameter.

use crate::error::{VmError, VmResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;

/// Pop `count` values and return them in declaration order.
/// Leaves the stack untouched when fewer than `count` values are present.
pub fn marshal(count: usize, stack: &mut Stack) -> VmResult<Vec<Value>> {
    if stack.size() < count {
        return Err(VmError::StackUnderflow);
    }
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        args.push(stack.pop()?);
    }
    args.reverse();
    Ok(args)
}
