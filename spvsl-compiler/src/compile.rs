use crate::error::Error;
use crate::expr::Expression;
use crate::scope::Scope;
use crate::spirv::SpvWriter;

/// Options of the emitted module.
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[derive(Debug, Clone)]
pub struct CompileParams {
    /// Execution model of the entry point.
    #[cfg_attr(feature = "clap", arg(long, value_enum, default_value_t))]
    pub execution_model: ExecutionModel,

    /// Do not emit OpName and OpMemberName.
    #[cfg_attr(feature = "clap", arg(long = "strip-names", action = clap::ArgAction::SetFalse))]
    pub debug_names: bool,

    /// Emit constant subexpressions as instructions instead of folding them.
    #[cfg_attr(feature = "clap", arg(long = "no-fold", action = clap::ArgAction::SetFalse))]
    pub fold_constants: bool,
}

impl Default for CompileParams {
    fn default() -> Self {
        CompileParams {
            execution_model: ExecutionModel::default(),
            debug_names: true,
            fold_constants: true,
        }
    }
}

#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExecutionModel {
    #[default]
    Compute,
    Fragment,
}

/// A checked source file: the scope its declarations produced and the
/// expression that follows them.
#[derive(Debug)]
pub struct Program {
    pub scope: Scope,
    pub expression: Expression,
}

/// Parses and checks a source file in a fresh scope.
pub fn parse(source: &str) -> Result<Program, Error> {
    parse_in_scope(source, Scope::new())
}

/// Parses and checks a source file. Declarations are added to `scope`, on
/// top of what the caller already declared.
#[tracing::instrument(name = "parse", skip_all)]
pub fn parse_in_scope(source: &str, mut scope: Scope) -> Result<Program, Error> {
    let (expression, diagnostics) = crate::parser::parse_program(source, &mut scope);
    tracing::debug!("{} diagnostics", diagnostics.len());

    match expression {
        Some(expression) if diagnostics.is_empty() => Ok(Program { scope, expression }),
        _ => Err(Error::from_diagnostics(diagnostics, source)),
    }
}

/// Emits a module whose body function evaluates the program's expression.
///
/// Parameters declared in the scope become parameters of the body function,
/// whether the expression uses them or not.
#[tracing::instrument(name = "compile", skip_all)]
pub fn compile(program: &Program, params: CompileParams) -> Vec<u32> {
    let mut writer = SpvWriter::new(params);

    for parameter in program.scope.variables().filter(|v| v.is_parameter()) {
        writer.get_id_for_variable(parameter);
    }
    let result = program.expression.write_spv(&mut writer);
    tracing::debug!("expression result is %{result}");

    writer.finish()
}

/// [parse] followed by [compile].
pub fn compile_source(source: &str, params: CompileParams) -> Result<Vec<u32>, Error> {
    let program = parse(source)?;
    Ok(compile(&program, params))
}

#[cfg(test)]
mod test {
    use spvsl_bin::{ScalarType, Type};

    use super::*;

    #[test]
    fn parameters_suppress_entry_point() {
        let mut scope = Scope::new();
        scope.add_parameter("p", Type::vector(ScalarType::float, 2));

        let program = parse_in_scope("p * 2.0", scope).unwrap();
        let words = compile(&program, CompileParams::default());

        let (_, instructions) = spvsl_bin::spv::decode_module(&words).unwrap();
        let ops: Vec<_> = instructions.iter().map(|i| i.op).collect();
        assert!(!ops.contains(&spirv::Op::EntryPoint));
        assert!(ops.contains(&spirv::Op::FunctionParameter));
        assert!(ops.contains(&spirv::Op::VectorTimesScalar));
    }

    #[test]
    fn errors_prevent_compilation() {
        let err = compile_source("1 + true", CompileParams::default()).unwrap_err();
        let Error::Compile { diagnostics } = err else {
            panic!("{err:?}");
        };
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), "E0004");
    }
}
