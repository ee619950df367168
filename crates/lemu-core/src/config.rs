//! Lemu Configuration
//!
//! Defines runtime limits for the interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Maximum evaluation stack depth per frame
    pub max_stack_size: usize,

    /// Maximum number of local variables per method
    pub max_locals: usize,

    /// Maximum call depth (recursion limit).
    ///
    /// Every interpreted call nests one boxed future inside its caller's, and
    /// polling walks the whole chain, so each level still costs host stack.
    /// Raising this well past the default can overflow the thread's stack
    /// before `CallDepthExceeded` is reported; run deep programs on a thread
    /// with a larger stack.
    pub max_call_depth: usize,

    /// Fail on native calls the dispatch table does not know, instead of ignoring them
    pub strict_natives: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_stack_size: 1024,
            max_locals: 256,
            max_call_depth: 256,
            strict_natives: false,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Same limits, with unregistered native calls treated as errors
    pub fn strict(mut self) -> Self {
        self.strict_natives = true;
        self
    }
}
