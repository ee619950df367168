pub mod builder;
pub mod instruction;
pub mod method;
pub mod opcode;

pub use builder::{Label, MethodBuilder};
pub use instruction::{Instruction, Operand};
pub use method::{MemberRef, MethodDescriptor, MethodId, Program, ReturnKind};
pub use opcode::OpCode;
