//! Native Dispatch Table
//!
//! The only channel from interpreted code to host functionality. Entries are
//! registered explicitly, keyed by declaring type and member name. Lookups
//! that miss are ignored rather than failing; the VM decides whether that is
//! acceptable (see `VmConfig::strict_natives`).

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::VmResult;
use crate::vm::value::Value;

use super::baseline;
use super::host::Host;

/// Host-implemented member. Receives arguments in declaration order;
/// `None` means the member produced no value.
pub type NativeFn =
    for<'h> fn(&'h mut dyn Host, Vec<Value>) -> BoxFuture<'h, VmResult<Option<Value>>>;

/// Accepted argument count of a native entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => n == count,
            Arity::Variadic => true,
        }
    }
}

#[derive(Clone, Copy)]
pub struct NativeEntry {
    pub arity: Arity,
    pub handler: NativeFn,
}

/// Outcome of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Returned(Option<Value>),
    /// No registered entry accepted the call; nothing happened
    Ignored,
}

/// Registry of native members; deny-by-default.
#[derive(Default)]
pub struct NativeTable {
    entries: HashMap<&'static str, HashMap<&'static str, NativeEntry>>,
}

impl NativeTable {
    /// Empty table; every call is ignored
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the console and string members
    pub fn baseline() -> Self {
        let mut table = Self::new();
        baseline::register(&mut table);
        table
    }

    /// Register (or replace) a member (host-level operation)
    pub fn register(
        &mut self,
        type_name: &'static str,
        member: &'static str,
        arity: Arity,
        handler: NativeFn,
    ) {
        self.entries
            .entry(type_name)
            .or_default()
            .insert(member, NativeEntry { arity, handler });
    }

    pub fn lookup(&self, type_name: &str, member: &str) -> Option<NativeEntry> {
        self.entries
            .get(type_name)
            .and_then(|members| members.get(member))
            .copied()
    }

    pub fn contains(&self, type_name: &str, member: &str) -> bool {
        self.lookup(type_name, member).is_some()
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn invoke(
        &self,
        host: &mut dyn Host,
        type_name: &str,
        member: &str,
        args: Vec<Value>,
    ) -> VmResult<Dispatch> {
        let Some(entry) = self.lookup(type_name, member) else {
            warn!(type_name, member, "ignoring call to unregistered native member");
            return Ok(Dispatch::Ignored);
        };
        if !entry.arity.accepts(args.len()) {
            warn!(
                type_name,
                member,
                argc = args.len(),
                arity = ?entry.arity,
                "ignoring native call with unsupported argument count"
            );
            return Ok(Dispatch::Ignored);
        }
        debug!(type_name, member, argc = args.len(), "native call");
        let result = (entry.handler)(host, args).await?;
        Ok(Dispatch::Returned(result))
    }
}

impl std::fmt::Debug for NativeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .flat_map(|(ty, members)| members.keys().map(move |m| format!("{}::{}", ty, m)))
            .collect();
        keys.sort();
        f.debug_struct("NativeTable").field("entries", &keys).finish()
    }
}
