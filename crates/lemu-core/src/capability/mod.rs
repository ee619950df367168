pub mod baseline;
pub mod host;
pub mod marshal;
pub mod registry;

pub use host::{BufferedHost, Host};
pub use marshal::marshal;
pub use registry::{Arity, Dispatch, NativeEntry, NativeFn, NativeTable};
