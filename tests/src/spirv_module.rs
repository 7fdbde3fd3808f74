use insta::assert_snapshot;
use spirv::Op;
use spvsl_bin::spv::{decode_module, decode_string};
use spvsl_bin::{ScalarType, Type};
use spvsl_compiler::scope::Scope;
use spvsl_compiler::variable::{Qualifier, StorageClass};
use spvsl_compiler::{CompileParams, ExecutionModel};

use crate::{_compile, _disassemble, _ops};

fn stripped() -> CompileParams {
    CompileParams {
        debug_names: false,
        ..CompileParams::default()
    }
}

fn unfolded() -> CompileParams {
    CompileParams {
        fold_constants: false,
        ..CompileParams::default()
    }
}

#[test]
fn whole_module() {
    assert_snapshot!(_disassemble("float x; x * 2.0", stripped()), @r"
    OpCapability 1
    OpMemoryModel 0 1
    OpEntryPoint 5 9 1852399981 0
    OpExecutionMode 9 17 1 1 1
    OpTypeFloat 1 32
    OpTypePointer 2 6 1
    OpVariable 2 3 6
    OpConstant 1 5 1073741824
    OpTypeVoid 7
    OpTypeFunction 8 7
    OpFunction 7 9 0 8
    OpLabel 10
    OpLoad 1 4 3
    OpFMul 1 6 4 5
    OpReturn
    OpFunctionEnd
    ");
}

#[test]
fn header() {
    let words = _compile("float x; x * 2.0", stripped());
    assert_eq!(words[0], spirv::MAGIC_NUMBER);

    let (header, _) = decode_module(&words).unwrap();
    assert_eq!(header.bound, 11);
}

#[test]
fn constants_are_folded() {
    let ops = _ops("vec3(1.0, 2.0, 3.0) * 2.0", CompileParams::default());
    assert!(ops.contains(&Op::ConstantComposite));
    assert!(!ops.contains(&Op::VectorTimesScalar));

    let ops = _ops("vec3(1.0, 2.0, 3.0) * 2.0", unfolded());
    assert!(ops.contains(&Op::CompositeConstruct));
    assert!(ops.contains(&Op::VectorTimesScalar));
}

#[test]
fn fragment_entry_point() {
    let params = CompileParams {
        execution_model: ExecutionModel::Fragment,
        ..CompileParams::default()
    };
    let words = _compile("out vec4 color; color = vec4(1.0)", params);
    let (_, instructions) = decode_module(&words).unwrap();

    let entry = instructions.iter().find(|i| i.op == Op::EntryPoint).unwrap();
    assert_eq!(entry.operands[0], spirv::ExecutionModel::Fragment as u32);
    assert_eq!(decode_string(&entry.operands[2..]).as_deref(), Some("main"));

    // the output variable is part of the interface
    let color = instructions
        .iter()
        .find(|i| i.op == Op::Variable)
        .map(|i| i.operands[1])
        .unwrap();
    assert_eq!(entry.operands.last(), Some(&color));

    let mode = instructions.iter().find(|i| i.op == Op::ExecutionMode).unwrap();
    assert_eq!(mode.operands[1], spirv::ExecutionMode::OriginUpperLeft as u32);
    assert!(instructions.iter().any(|i| i.op == Op::Store));
}

#[test]
fn capabilities() {
    let words = _compile("double d; d * 2.0", CompileParams::default());
    let (_, instructions) = decode_module(&words).unwrap();
    let capabilities: Vec<u32> = instructions
        .iter()
        .filter(|i| i.op == Op::Capability)
        .map(|i| i.operands[0])
        .collect();
    assert_eq!(
        capabilities,
        vec![
            spirv::Capability::Shader as u32,
            spirv::Capability::Float64 as u32
        ]
    );

    let ops = _ops("float x; x * 2.0", CompileParams::default());
    assert!(!ops.contains(&Op::ExtInstImport));
}

#[test]
fn native_functions() {
    let ops = _ops("float x; sin(x) + max(x, 1.0)", CompileParams::default());
    assert!(ops.contains(&Op::ExtInstImport));
    assert_eq!(ops.iter().filter(|op| **op == Op::ExtInst).count(), 2);

    // a scalar paired with a vector parameter is splat
    let ops = _ops("vec3 v; min(v, 0.5)", CompileParams::default());
    assert!(ops.contains(&Op::CompositeConstruct));
}

#[test]
fn debug_names() {
    let source = "struct S { float a; vec2 b; }; S s; s.b.y = 1.0";

    let ops = _ops(source, CompileParams::default());
    assert!(ops.contains(&Op::Name));
    assert!(ops.contains(&Op::MemberName));

    let ops = _ops(source, stripped());
    assert!(!ops.contains(&Op::Name));
    assert!(!ops.contains(&Op::MemberName));
}

#[test]
fn member_store() {
    let ops = _ops("struct S { float a; vec2 b; }; S s; s.b = vec2(1.0)", stripped());
    assert!(ops.contains(&Op::TypeStruct));
    assert!(ops.contains(&Op::AccessChain));
    assert!(ops.contains(&Op::Store));
}

#[test]
fn parameters_and_locals() {
    let mut scope = Scope::new();
    scope.add_parameter("p", Type::vector(ScalarType::float, 2));
    scope.add_variable(
        "t",
        Type::FLOAT,
        Qualifier::new(StorageClass::Local),
        None,
    );

    let program = spvsl_compiler::parse_in_scope("t = p.x * p.y", scope).unwrap();
    let words = spvsl_compiler::compile(&program, stripped());
    let (_, instructions) = decode_module(&words).unwrap();
    let ops: Vec<Op> = instructions.iter().map(|i| i.op).collect();

    assert!(!ops.contains(&Op::EntryPoint));

    // locals are declared at the start of the function body
    let label = ops.iter().position(|op| *op == Op::Label).unwrap();
    let parameter = ops.iter().position(|op| *op == Op::FunctionParameter).unwrap();
    assert!(parameter < label);
    assert_eq!(ops[label + 1], Op::Variable);
    assert_eq!(ops[ops.len() - 3], Op::Store);
}
