//! Built-in demo programs, assembled with [`MethodBuilder`].

use clap::ValueEnum;

use lemu_core::capability::baseline::{CONSOLE, STRING};
use lemu_core::{MemberRef, MethodBuilder, OpCode, Program, ReturnKind, VmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    Hello,
    Greeter,
    Countdown,
    Factorial,
}

impl Demo {
    pub const ALL: [Demo; 4] = [Demo::Hello, Demo::Greeter, Demo::Countdown, Demo::Factorial];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Hello => "hello",
            Demo::Greeter => "greeter",
            Demo::Countdown => "countdown",
            Demo::Factorial => "factorial",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Demo::Hello => "set the title and print a greeting",
            Demo::Greeter => "read a name and greet it, refusing \"root\"",
            Demo::Countdown => "loop from 5 down to 1 with a local counter",
            Demo::Factorial => "print 10! computed by a recursive method",
        }
    }

    pub fn build(self) -> VmResult<Program> {
        match self {
            Demo::Hello => hello(),
            Demo::Greeter => greeter(),
            Demo::Countdown => countdown(),
            Demo::Factorial => factorial(),
        }
    }
}

fn write_line() -> MemberRef {
    MemberRef::new(CONSOLE, "WriteLine", 1, ReturnKind::Void)
}

fn concat(count: usize) -> MemberRef {
    MemberRef::new(STRING, "Concat", count, ReturnKind::Value)
}

fn single(builder: MethodBuilder) -> VmResult<Program> {
    let mut program = Program::new();
    let id = program.add(builder.build()?);
    program.set_entry_point(id);
    Ok(program)
}

fn hello() -> VmResult<Program> {
    let mut b = MethodBuilder::new("Main");
    b.ldstr("lemu")
        .call_native(MemberRef::new(CONSOLE, "set_Title", 1, ReturnKind::Void))
        .ldstr("Hello, World!")
        .call_native(write_line())
        .op(OpCode::Ret);
    single(b)
}

fn greeter() -> VmResult<Program> {
    let mut b = MethodBuilder::new("Main").locals(1);
    let greet = b.new_label();
    let end = b.new_label();
    b.ldstr("What is your name?")
        .call_native(write_line())
        .call_native(MemberRef::new(CONSOLE, "ReadLine", 0, ReturnKind::Value))
        .stloc(0)
        .ldloc(0)
        .ldstr("root")
        .call_native(MemberRef::new(STRING, "op_Equality", 2, ReturnKind::Value))
        .branch(OpCode::BrFalseS, greet)
        .ldstr("Access denied.")
        .call_native(write_line())
        .branch(OpCode::BrS, end)
        .mark(greet)
        .ldstr("Hello, ")
        .ldloc(0)
        .ldstr("!")
        .call_native(concat(3))
        .call_native(write_line())
        .mark(end)
        .op(OpCode::Ret);
    single(b)
}

fn countdown() -> VmResult<Program> {
    let mut b = MethodBuilder::new("Main").locals(1);
    let head = b.new_label();
    let done = b.new_label();
    b.ldc_i4(5)
        .stloc(0)
        .mark(head)
        .ldloc(0)
        .branch(OpCode::BrFalseS, done)
        .ldstr("T-")
        .ldloc(0)
        .call_native(concat(2))
        .call_native(write_line())
        .ldloc(0)
        .op(OpCode::LdcI4_1)
        .op(OpCode::Sub)
        .stloc(0)
        .branch(OpCode::BrS, head)
        .mark(done)
        .ldstr("liftoff")
        .call_native(write_line())
        .op(OpCode::Ret);
    single(b)
}

fn factorial() -> VmResult<Program> {
    let mut program = Program::new();
    let fact = program.declare("Factorial");

    // n > 1 ? n * Factorial(n - 1) : 1
    let mut f = MethodBuilder::new("Factorial")
        .params(1)
        .returns(ReturnKind::Value);
    let recurse = f.new_label();
    f.op(OpCode::LdArg0)
        .op(OpCode::LdcI4_1)
        .op(OpCode::Cgt)
        .branch(OpCode::BrTrueS, recurse)
        .op(OpCode::LdcI4_1)
        .op(OpCode::Ret)
        .mark(recurse)
        .op(OpCode::LdArg0)
        .op(OpCode::LdArg0)
        .op(OpCode::LdcI4_1)
        .op(OpCode::Sub)
        .call(fact)
        .op(OpCode::Mul)
        .op(OpCode::Ret);
    program.define(fact, f.build()?)?;

    let mut main = MethodBuilder::new("Main");
    main.ldstr("10! = ")
        .ldc_i4(10)
        .call(fact)
        .call_native(concat(2))
        .call_native(write_line())
        .op(OpCode::Ret);
    let entry = program.add(main.build()?);
    program.set_entry_point(entry);
    Ok(program)
}
