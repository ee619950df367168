//! Lemu - Core Library
//!
//! Interpreter for resolved managed-bytecode methods: value model, offset
//! resolution, the evaluation engine and the capability-restricted native
//! call surface.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod capability;

// Re-export commonly used types
pub use error::{VmError, VmResult};
pub use config::VmConfig;
pub use bytecode::{MemberRef, MethodBuilder, MethodDescriptor, MethodId, OpCode, Program, ReturnKind};
pub use capability::{BufferedHost, Host, NativeTable};
pub use vm::{Value, VirtualMachine};
