pub mod frame;
pub mod memory;
pub mod offsets;
pub mod stack;
pub mod value;
pub mod vm;

pub use frame::{Flow, Frame};
pub use offsets::OffsetMap;
pub use value::{ObjectHandle, Value};
pub use vm::VirtualMachine;
