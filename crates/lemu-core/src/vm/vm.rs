//! Virtual Machine Core
//!
//! Drives the dispatch loop of each frame and handles calls. Interpreted
//! calls recurse through boxed futures, one frame per call; native calls go
//! through the [`NativeTable`] and may suspend on host I/O.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::bytecode::{MemberRef, MethodId, OpCode, Program};
use crate::capability::{marshal, Dispatch, Host, NativeTable};
use crate::config::VmConfig;
use crate::error::{VmError, VmResult};

use super::frame::{Flow, Frame};
use super::offsets::OffsetMap;
use super::value::Value;

/// Lemu Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine<H: Host> {
    config: VmConfig,
    natives: NativeTable,
    host: H,
    // keyed by method id; valid for the program of the current run
    offsets: HashMap<MethodId, Arc<OffsetMap>>,
}

impl<H: Host> VirtualMachine<H> {
    /// VM with the baseline native table
    pub fn new(config: VmConfig, host: H) -> Self {
        Self::with_natives(config, NativeTable::baseline(), host)
    }

    pub fn with_natives(config: VmConfig, natives: NativeTable, host: H) -> Self {
        VirtualMachine {
            config,
            natives,
            host,
            offsets: HashMap::new(),
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Run the program's entry point with no arguments
    pub async fn run(&mut self, program: &Program) -> VmResult<Option<Value>> {
        self.run_method(program, program.entry_point(), Vec::new()).await
    }

    /// Run one method of `program` with explicit arguments
    pub async fn run_method(
        &mut self,
        program: &Program,
        id: MethodId,
        args: Vec<Value>,
    ) -> VmResult<Option<Value>> {
        self.offsets.clear();
        let result = self.invoke(program, id, args, 0).await;
        if let Err(err) = &result {
            debug!(%err, "execution aborted");
        }
        result
    }

    fn invoke<'a>(
        &'a mut self,
        program: &'a Program,
        id: MethodId,
        args: Vec<Value>,
        depth: usize,
    ) -> BoxFuture<'a, VmResult<Option<Value>>> {
        async move {
            if depth >= self.config.max_call_depth {
                return Err(VmError::CallDepthExceeded(self.config.max_call_depth));
            }
            let method = program.method(id)?;
            if method.local_count > self.config.max_locals {
                return Err(VmError::TooManyLocals {
                    declared: method.local_count,
                    limit: self.config.max_locals,
                });
            }

            debug!(method = %method.name, depth, argc = args.len(), "enter");
            let mut frame = Frame::new(id, method, args, self.config.max_stack_size, depth)?;
            let result = self.execute(program, &mut frame).await?;
            debug!(method = %method.name, depth, "leave");
            Ok(result)
        }
        .boxed()
    }

    /// Dispatch loop for one frame; returns the frame's result.
    /// Only reachable through `invoke`, so cached offset maps always belong to the
    /// program of the current run.
    async fn execute(
        &mut self,
        program: &Program,
        frame: &mut Frame<'_>,
    ) -> VmResult<Option<Value>> {
        let method = frame.method;
        while let Some(instruction) = method.body.get(frame.ip) {
            let opcode =
                OpCode::from_u16(instruction.opcode).ok_or(VmError::UnsupportedInstruction {
                    opcode: instruction.opcode,
                    offset: instruction.offset,
                })?;
            trace!(
                method = %frame.method.name,
                offset = instruction.offset,
                op = opcode.mnemonic(),
                stack = frame.stack.size(),
                "step"
            );

            match frame.step(opcode, instruction)? {
                Flow::Next => frame.ip += 1,
                Flow::Jump(target) => frame.ip = self.resolve_target(frame, target)?,
                Flow::Return(value) => return Ok(value),
                Flow::CallMethod(callee) => {
                    self.call_method(program, frame, callee).await?;
                    frame.ip += 1;
                }
                Flow::CallNative(member) => {
                    self.call_native(frame, member).await?;
                    frame.ip += 1;
                }
            }
        }
        Ok(frame.fall_through_result())
    }

    async fn call_method(
        &mut self,
        program: &Program,
        frame: &mut Frame<'_>,
        callee: MethodId,
    ) -> VmResult<()> {
        let target = program.method(callee)?;
        let args = marshal(target.param_count, &mut frame.stack)?;
        let result = self.invoke(program, callee, args, frame.depth + 1).await?;
        if target.returns.is_value() {
            frame.stack.push(result.unwrap_or_default())?;
        }
        Ok(())
    }

    async fn call_native(&mut self, frame: &mut Frame<'_>, member: &MemberRef) -> VmResult<()> {
        let args = marshal(member.param_count, &mut frame.stack)?;
        let dispatch = self
            .natives
            .invoke(&mut self.host, &member.type_name, &member.member, args)
            .await?;
        let result = match dispatch {
            Dispatch::Returned(value) => value,
            Dispatch::Ignored if self.config.strict_natives => {
                return Err(VmError::UnsupportedNativeCall {
                    type_name: member.type_name.clone(),
                    member: member.member.clone(),
                });
            }
            Dispatch::Ignored => None,
        };
        if member.returns.is_value() {
            frame.stack.push(result.unwrap_or_default())?;
        }
        Ok(())
    }

    /// Branch target offset to instruction index, building the method's map on first use
    fn resolve_target(&mut self, frame: &mut Frame<'_>, target: u32) -> VmResult<usize> {
        let map = match &frame.offsets {
            Some(map) => Arc::clone(map),
            None => {
                let map = self
                    .offsets
                    .entry(frame.id)
                    .or_insert_with(|| Arc::new(OffsetMap::build(&frame.method.body)))
                    .clone();
                frame.offsets = Some(Arc::clone(&map));
                map
            }
        };
        map.resolve(target)
    }
}
