//! Baseline native members: console I/O and string helpers.

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::VmResult;
use crate::vm::value::Value;

use super::host::Host;
use super::registry::{Arity, NativeTable};

pub const CONSOLE: &str = "System.Console";
pub const STRING: &str = "System.String";

type NativeResult<'h> = BoxFuture<'h, VmResult<Option<Value>>>;

pub(crate) fn register(table: &mut NativeTable) {
    table.register(CONSOLE, "WriteLine", Arity::Exact(1), write_line);
    table.register(CONSOLE, "ReadLine", Arity::Exact(0), read_line);
    table.register(CONSOLE, "set_Title", Arity::Exact(1), set_title);
    table.register(CONSOLE, "SetTitle", Arity::Exact(1), set_title);

    table.register(STRING, "op_Equality", Arity::Exact(2), equals);
    table.register(STRING, "Equals", Arity::Exact(2), equals);
    table.register(STRING, "Concat", Arity::Variadic, concat);
}

fn text(args: &[Value], index: usize) -> String {
    args.get(index).map(Value::to_string).unwrap_or_default()
}

fn write_line(host: &mut dyn Host, args: Vec<Value>) -> NativeResult<'_> {
    let result = host.write_line(&text(&args, 0)).map(|()| None);
    future::ready(result).boxed()
}

/// Suspends the invocation until the host has a line (or reports end of input)
fn read_line(host: &mut dyn Host, _args: Vec<Value>) -> NativeResult<'_> {
    async move {
        let line = host.read_line().await?;
        Ok(Some(line.map(Value::Str).unwrap_or(Value::Null)))
    }
    .boxed()
}

fn set_title(host: &mut dyn Host, args: Vec<Value>) -> NativeResult<'_> {
    let result = host.set_title(&text(&args, 0)).map(|()| None);
    future::ready(result).boxed()
}

fn equals(_host: &mut dyn Host, args: Vec<Value>) -> NativeResult<'_> {
    let equal = text(&args, 0) == text(&args, 1);
    future::ready(Ok(Some(Value::Bool(equal)))).boxed()
}

fn concat(_host: &mut dyn Host, args: Vec<Value>) -> NativeResult<'_> {
    let joined: String = args.iter().map(Value::to_string).collect();
    future::ready(Ok(Some(Value::Str(joined)))).boxed()
}
