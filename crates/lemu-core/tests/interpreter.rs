use lemu_core::bytecode::{Instruction, Operand};
use lemu_core::capability::baseline::{CONSOLE, STRING};
use lemu_core::{
    BufferedHost, MemberRef, MethodBuilder, MethodDescriptor, OpCode, Program, ReturnKind, Value,
    VirtualMachine, VmConfig, VmError,
};

fn vm() -> VirtualMachine<BufferedHost> {
    VirtualMachine::new(VmConfig::new(), BufferedHost::new())
}

fn entry(method: MethodDescriptor) -> Program {
    let mut program = Program::new();
    let id = program.add(method);
    program.set_entry_point(id);
    program
}

async fn binary(op: OpCode, a: i32, b: i32) -> Result<Option<Value>, VmError> {
    let mut m = MethodBuilder::new("Arith").returns(ReturnKind::Value);
    m.ldc_i4(a).ldc_i4(b).op(op).op(OpCode::Ret);
    vm().run(&entry(m.build()?)).await
}

#[tokio::test]
async fn arithmetic_uses_push_order() {
    let pairs = [(7, 3), (-4, 9), (0, 1), (100, -7)];
    for (a, b) in pairs {
        assert_eq!(binary(OpCode::Add, a, b).await.unwrap(), Some(Value::Int(a + b)));
        assert_eq!(binary(OpCode::Sub, a, b).await.unwrap(), Some(Value::Int(a - b)));
        assert_eq!(binary(OpCode::Mul, a, b).await.unwrap(), Some(Value::Int(a * b)));
        assert_eq!(binary(OpCode::Div, a, b).await.unwrap(), Some(Value::Int(a / b)));
        assert_eq!(binary(OpCode::Rem, a, b).await.unwrap(), Some(Value::Int(a % b)));
    }
    assert!(matches!(binary(OpCode::Div, 5, 0).await, Err(VmError::DivideByZero)));
    assert_eq!(
        binary(OpCode::Add, i32::MAX, 1).await.unwrap(),
        Some(Value::Int(i32::MIN))
    );
}

#[tokio::test]
async fn arithmetic_rejects_non_integers() {
    let mut m = MethodBuilder::new("Bad").returns(ReturnKind::Value);
    m.ldc_i4(1).ldstr("2").op(OpCode::Add).op(OpCode::Ret);
    match vm().run(&entry(m.build().unwrap())).await {
        Err(VmError::TypeMismatch { op, expected, found }) => {
            assert_eq!(op, "add");
            assert_eq!(expected, "int32");
            assert_eq!(found, "string");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn unconditional_branch_lands_on_target_not_predecessor() {
    // IL_0000: br IL_000A ; IL_0005: ldc.i4 1 ; IL_000A: ldc.i4 2 ; IL_000F: ret
    let method = MethodDescriptor {
        name: "Jump".to_string(),
        param_count: 0,
        local_count: 0,
        returns: ReturnKind::Value,
        body: vec![
            Instruction::with_operand(0x00, OpCode::Br, Operand::Target(0x0A)),
            Instruction::with_operand(0x05, OpCode::LdcI4, Operand::Int32(1)),
            Instruction::with_operand(0x0A, OpCode::LdcI4, Operand::Int32(2)),
            Instruction::new(0x0F, OpCode::Ret),
        ],
    };
    assert_eq!(vm().run(&entry(method)).await.unwrap(), Some(Value::Int(2)));
}

#[tokio::test]
async fn branch_to_first_instruction() {
    // while (arg0 < 5) arg0++; return arg0;  the loop head is IL_0000
    let mut m = MethodBuilder::new("CountUp")
        .params(1)
        .returns(ReturnKind::Value);
    let head = m.new_label();
    let done = m.new_label();
    m.mark(head)
        .op(OpCode::LdArg0)
        .op(OpCode::LdcI4_5)
        .op(OpCode::Clt)
        .branch(OpCode::BrFalseS, done)
        .op(OpCode::LdArg0)
        .op(OpCode::LdcI4_1)
        .op(OpCode::Add)
        .starg(0)
        .branch(OpCode::BrS, head)
        .mark(done)
        .op(OpCode::LdArg0)
        .op(OpCode::Ret);
    let method = m.build().unwrap();
    assert_eq!(method.body.last().map(|i| i.offset), Some(14));

    let mut program = Program::new();
    let id = program.add(method);
    let result = vm().run_method(&program, id, vec![Value::Int(0)]).await.unwrap();
    assert_eq!(result, Some(Value::Int(5)));
}

#[tokio::test]
async fn bad_branch_target_is_malformed() {
    let method = MethodDescriptor {
        name: "Lost".to_string(),
        param_count: 0,
        local_count: 0,
        returns: ReturnKind::Void,
        body: vec![
            Instruction::with_operand(0, OpCode::BrS, Operand::Target(1)),
            Instruction::new(2, OpCode::Ret),
        ],
    };
    assert!(matches!(
        vm().run(&entry(method)).await,
        Err(VmError::MalformedBytecode(1))
    ));
}

async fn conditional(op: OpCode, condition: Value) -> Vec<String> {
    let write = MemberRef::new(CONSOLE, "WriteLine", 1, ReturnKind::Void);
    let mut m = MethodBuilder::new("Cond");
    let taken = m.new_label();
    m.ldstr("marker");
    match condition {
        // a genuine bool comes out of String.Equals
        Value::Bool(b) => m
            .ldstr(if b { "x" } else { "y" })
            .ldstr("x")
            .call_native(MemberRef::new(STRING, "Equals", 2, ReturnKind::Value)),
        Value::Int(v) => m.ldc_i4(v),
        other => panic!("unsupported condition {:?}", other),
    };
    m.branch(op, taken)
        .ldstr("fell through")
        .call_native(write.clone())
        .mark(taken)
        .call_native(write)
        .op(OpCode::Ret);
    let program = entry(m.build().unwrap());
    let mut vm = vm();
    vm.run(&program).await.expect("execution failed");
    vm.into_host().output().to_vec()
}

#[tokio::test]
async fn conditional_branches_consume_one_value() {
    // taken: only the marker is written, proving the condition was the only value consumed
    assert_eq!(conditional(OpCode::BrTrue, Value::Bool(true)).await, vec!["marker"]);
    assert_eq!(conditional(OpCode::BrFalse, Value::Bool(false)).await, vec!["marker"]);
    assert_eq!(conditional(OpCode::BrTrueS, Value::Int(5)).await, vec!["marker"]);
    // not taken: falls through, then the marker is still there for the second write
    assert_eq!(
        conditional(OpCode::BrTrue, Value::Bool(false)).await,
        vec!["fell through", "marker"]
    );
    assert_eq!(
        conditional(OpCode::BrFalseS, Value::Int(7)).await,
        vec!["fell through", "marker"]
    );
}

#[tokio::test]
async fn conditional_on_string_is_a_type_mismatch() {
    let mut m = MethodBuilder::new("Cond");
    let l = m.new_label();
    m.ldstr("").branch(OpCode::BrTrue, l).mark(l).op(OpCode::Ret);
    assert!(matches!(
        vm().run(&entry(m.build().unwrap())).await,
        Err(VmError::TypeMismatch { op: "brtrue", .. })
    ));
}

#[tokio::test]
async fn store_then_load_local_round_trips() {
    for value in [Value::Int(-9), Value::from("text")] {
        let mut m = MethodBuilder::new("Slots").locals(4).returns(ReturnKind::Value);
        match &value {
            Value::Int(v) => m.ldc_i4(*v),
            other => m.ldstr(other.to_string()),
        };
        m.stloc(3).ldloc(3).op(OpCode::Ret);
        assert_eq!(vm().run(&entry(m.build().unwrap())).await.unwrap(), Some(value));
    }

    let mut m = MethodBuilder::new("Slots").locals(1);
    m.op(OpCode::LdNull).stloc(1).op(OpCode::Ret);
    assert!(matches!(
        vm().run(&entry(m.build().unwrap())).await,
        Err(VmError::InvalidLocalIndex { index: 1, count: 1 })
    ));
}

#[tokio::test]
async fn interpreted_call_pushes_exactly_one_value() {
    let mut program = Program::new();
    let mut answer = MethodBuilder::new("Answer").returns(ReturnKind::Value);
    answer.ldc_i4(42).op(OpCode::Ret);
    let answer = program.add(answer.build().unwrap());

    let mut main = MethodBuilder::new("Main").returns(ReturnKind::Value);
    main.ldstr("below").call(answer).op(OpCode::Ret);
    let main = program.add(main.build().unwrap());
    program.set_entry_point(main);

    assert_eq!(vm().run(&program).await.unwrap(), Some(Value::Int(42)));

    // the value below the call site is untouched and 42 sits directly on top of it
    let mut check = MethodBuilder::new("Check").returns(ReturnKind::Value);
    check
        .ldstr("below")
        .call(answer)
        .call_native(MemberRef::new(STRING, "Concat", 2, ReturnKind::Value))
        .op(OpCode::Ret);
    let check = program.add(check.build().unwrap());
    let result = vm().run_method(&program, check, Vec::new()).await.unwrap();
    assert_eq!(result, Some(Value::from("below42")));
}

#[tokio::test]
async fn void_callee_pushes_nothing() {
    let mut program = Program::new();
    let mut noop = MethodBuilder::new("Noop");
    noop.ldc_i4(1).op(OpCode::Ret);
    let noop = program.add(noop.build().unwrap());

    let mut main = MethodBuilder::new("Main").returns(ReturnKind::Value);
    main.call(noop).op(OpCode::Ret);
    let main = program.add(main.build().unwrap());

    let err = vm().run_method(&program, main, Vec::new()).await.unwrap_err();
    assert!(matches!(err, VmError::StackUnderflow));
}

#[tokio::test]
async fn recursive_factorial_through_arguments() {
    let mut program = Program::new();
    let fact = program.declare("Factorial");
    let mut b = MethodBuilder::new("Factorial")
        .params(1)
        .returns(ReturnKind::Value);
    let recurse = b.new_label();
    b.op(OpCode::LdArg0)
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
    program.define(fact, b.build().unwrap()).unwrap();

    let result = vm()
        .run_method(&program, fact, vec![Value::Int(10)])
        .await
        .unwrap();
    assert_eq!(result, Some(Value::Int(3_628_800)));
}

#[tokio::test]
async fn runaway_recursion_hits_depth_limit() {
    let mut program = Program::new();
    let forever = program.declare("Forever");
    let mut b = MethodBuilder::new("Forever");
    b.call(forever).op(OpCode::Ret);
    program.define(forever, b.build().unwrap()).unwrap();

    let mut config = VmConfig::new();
    config.max_call_depth = 16;
    let mut vm = VirtualMachine::new(config, BufferedHost::new());
    assert!(matches!(
        vm.run_method(&program, forever, Vec::new()).await,
        Err(VmError::CallDepthExceeded(16))
    ));
}

#[tokio::test]
async fn unregistered_native_is_ignored() {
    let mut m = MethodBuilder::new("Main").returns(ReturnKind::Value);
    m.ldc_i4(5)
        .ldstr("/tmp/x")
        .call_native(MemberRef::new("System.IO.File", "Delete", 1, ReturnKind::Void))
        .op(OpCode::Ret);
    // the argument was consumed, the frame kept going and returned the value below it
    assert_eq!(vm().run(&entry(m.build().unwrap())).await.unwrap(), Some(Value::Int(5)));
}

#[tokio::test]
async fn unregistered_value_native_yields_null() {
    let mut m = MethodBuilder::new("Main").returns(ReturnKind::Value);
    m.call_native(MemberRef::new("System.Environment", "get_UserName", 0, ReturnKind::Value))
        .op(OpCode::Ret);
    assert_eq!(vm().run(&entry(m.build().unwrap())).await.unwrap(), Some(Value::Null));
}

#[tokio::test]
async fn value_method_falling_off_the_end_returns_null() {
    let mut m = MethodBuilder::new("NoRet").returns(ReturnKind::Value);
    m.op(OpCode::Nop);
    assert_eq!(vm().run(&entry(m.build().unwrap())).await.unwrap(), Some(Value::Null));

    let mut v = MethodBuilder::new("NoRetVoid");
    v.op(OpCode::LdcI4_3);
    assert_eq!(vm().run(&entry(v.build().unwrap())).await.unwrap(), None);
}

#[tokio::test]
async fn set_title_and_concat_reach_the_host() {
    let mut m = MethodBuilder::new("Main");
    m.ldstr("a")
        .ldstr("b")
        .ldstr("c")
        .call_native(MemberRef::new(STRING, "Concat", 3, ReturnKind::Value))
        .op(OpCode::Dup)
        .call_native(MemberRef::new(CONSOLE, "set_Title", 1, ReturnKind::Void))
        .call_native(MemberRef::new(CONSOLE, "WriteLine", 1, ReturnKind::Void))
        .op(OpCode::Ret);
    let mut vm = vm();
    vm.run(&entry(m.build().unwrap())).await.unwrap();
    assert_eq!(vm.host().title(), Some("abc"));
    assert_eq!(vm.host().output(), ["abc".to_string()]);
}

#[tokio::test]
async fn every_consuming_opcode_underflows_cleanly() {
    fn with(f: impl FnOnce(&mut MethodBuilder)) -> MethodDescriptor {
        let mut m = MethodBuilder::new("Short").locals(1).returns(ReturnKind::Value);
        f(&mut m);
        m.build().unwrap()
    }
    let cases: Vec<(&str, MethodDescriptor)> = vec![
        ("add on empty stack", with(|m| {
            m.op(OpCode::Add).op(OpCode::Ret);
        })),
        ("sub with one operand", with(|m| {
            m.op(OpCode::LdcI4_1).op(OpCode::Sub).op(OpCode::Ret);
        })),
        ("neg on empty stack", with(|m| {
            m.op(OpCode::Neg).op(OpCode::Ret);
        })),
        ("ceq with one operand", with(|m| {
            m.op(OpCode::LdcI4_1).op(OpCode::Ceq).op(OpCode::Ret);
        })),
        ("brtrue on empty stack", with(|m| {
            let end = m.new_label();
            m.branch(OpCode::BrTrue, end).mark(end).op(OpCode::Ret);
        })),
        ("brfalse.s on empty stack", with(|m| {
            let end = m.new_label();
            m.branch(OpCode::BrFalseS, end).mark(end).op(OpCode::Ret);
        })),
        ("stloc on empty stack", with(|m| {
            m.stloc(0).op(OpCode::Ret);
        })),
        ("pop on empty stack", with(|m| {
            m.op(OpCode::Pop).op(OpCode::Ret);
        })),
        ("dup on empty stack", with(|m| {
            m.op(OpCode::Dup).op(OpCode::Ret);
        })),
        ("native call short of arguments", with(|m| {
            m.ldstr("a")
                .call_native(MemberRef::new(STRING, "Concat", 2, ReturnKind::Value))
                .op(OpCode::Ret);
        })),
        ("value return on empty stack", with(|m| {
            m.op(OpCode::Ret);
        })),
    ];

    for (case, method) in cases {
        let result = vm().run(&entry(method)).await;
        assert!(
            matches!(result, Err(VmError::StackUnderflow)),
            "{}: {:?}",
            case,
            result
        );
    }
}

#[tokio::test]
async fn interpreted_call_short_of_arguments_underflows() {
    let mut program = Program::new();
    let mut pair = MethodBuilder::new("Pair").params(2).returns(ReturnKind::Value);
    pair.op(OpCode::LdArg0).op(OpCode::Ret);
    let pair = program.add(pair.build().unwrap());

    let mut main = MethodBuilder::new("Main").returns(ReturnKind::Value);
    main.op(OpCode::LdcI4_1).call(pair).op(OpCode::Ret);
    let main = program.add(main.build().unwrap());
    program.set_entry_point(main);

    assert!(matches!(
        vm().run(&program).await,
        Err(VmError::StackUnderflow)
    ));
}
