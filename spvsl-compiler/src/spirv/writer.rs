use std::rc::Rc;

use indexmap::IndexMap;
use spirv::{GLOp, Op};
use spvsl_bin::spv::{self, ModuleHeader, Section};
use spvsl_bin::{Scalar, ScalarType, Type, Value};

use crate::compile::{CompileParams, ExecutionModel};
use crate::utils::IdGenerator;
use crate::variable::{StorageClass, Variable, VariableId};

/// Accumulates the words of one module.
///
/// Types, pointer types, constants and variables are interned: asking for
/// the id of an equal key twice returns the same id and emits the
/// definition only once.
pub struct SpvWriter {
    params: CompileParams,

    ids: IdGenerator<u32>,
    sections: [Vec<u32>; Section::COUNT],

    types: IndexMap<Type, u32>,
    pointer_types: IndexMap<(Type, spirv::StorageClass), u32>,
    values: IndexMap<Value, u32>,
    variables: IndexMap<VariableId, u32>,

    /// Parameters of the body function: id and pointer type id.
    parameters: Vec<(u32, u32)>,
    /// Input and output variables, listed by the entry point.
    interface: Vec<u32>,

    glsl_ext: Option<u32>,
    uses_float64: bool,
}

impl SpvWriter {
    pub fn new(params: CompileParams) -> Self {
        SpvWriter {
            params,
            // id 0 is invalid
            ids: IdGenerator::starting_at(1),
            sections: Default::default(),
            types: IndexMap::new(),
            pointer_types: IndexMap::new(),
            values: IndexMap::new(),
            variables: IndexMap::new(),
            parameters: Vec::new(),
            interface: Vec::new(),
            glsl_ext: None,
            uses_float64: false,
        }
    }

    pub fn fold_constants(&self) -> bool {
        self.params.fold_constants
    }

    pub fn next_id(&mut self) -> u32 {
        self.ids.gen()
    }

    pub fn section(&self, section: Section) -> &[u32] {
        &self.sections[section.index()]
    }

    /// Appends an instruction without a result.
    pub fn add(&mut self, section: Section, op: Op, operands: &[u32]) {
        spv::push_instruction(&mut self.sections[section.index()], op, operands);
    }

    /// Appends an instruction with a result type and a fresh result id.
    pub fn add_result(&mut self, section: Section, op: Op, ty: &Type, operands: &[u32]) -> u32 {
        let ty = self.get_id_for_type(ty);
        let id = self.next_id();

        let mut words = Vec::with_capacity(operands.len() + 2);
        words.extend([ty, id]);
        words.extend_from_slice(operands);
        self.add(section, op, &words);
        id
    }

    /// Appends an instruction with a result to the code section.
    pub fn code(&mut self, op: Op, ty: &Type, operands: &[u32]) -> u32 {
        self.add_result(Section::Code, op, ty, operands)
    }

    /// Calls a function of the GLSL.std.450 instruction set.
    pub fn ext_inst(&mut self, ty: &Type, op: GLOp, arguments: &[u32]) -> u32 {
        let set = self.glsl_ext();

        let mut operands = vec![set, op as u32];
        operands.extend_from_slice(arguments);
        self.code(Op::ExtInst, ty, &operands)
    }

    fn glsl_ext(&mut self) -> u32 {
        if let Some(id) = self.glsl_ext {
            return id;
        }
        let id = self.next_id();
        self.glsl_ext = Some(id);
        id
    }

    fn name(&mut self, id: u32, name: &str) {
        if !self.params.debug_names {
            return;
        }
        let mut operands = vec![id];
        operands.extend(spv::encode_string(name));
        self.add(Section::Debug, Op::Name, &operands);
    }

    pub fn get_id_for_type(&mut self, ty: &Type) -> u32 {
        if let Some(id) = self.types.get(ty) {
            return *id;
        }

        // dependencies first, their definitions must precede ours
        let operands: Vec<u32> = match ty {
            Type::Scalar(ScalarType::void) | Type::Scalar(ScalarType::bool) => vec![],
            Type::Scalar(ScalarType::float) => vec![32],
            Type::Scalar(ScalarType::double) => {
                self.uses_float64 = true;
                vec![64]
            }
            Type::Scalar(ScalarType::int) => vec![32, 1],
            Type::Scalar(ScalarType::uint) => vec![32, 0],
            Type::Vector { scalar, length } => {
                vec![self.get_id_for_type(&Type::Scalar(*scalar)), *length as u32]
            }
            Type::Matrix { columns, .. } => {
                let column = ty.index_type().unwrap_or(Type::VOID);
                vec![self.get_id_for_type(&column), *columns as u32]
            }
            Type::Struct(s) => s.members.iter().map(|m| self.get_id_for_type(&m.ty)).collect(),
        };
        let op = match ty {
            Type::Scalar(ScalarType::void) => Op::TypeVoid,
            Type::Scalar(ScalarType::bool) => Op::TypeBool,
            Type::Scalar(ScalarType::float | ScalarType::double) => Op::TypeFloat,
            Type::Scalar(ScalarType::int | ScalarType::uint) => Op::TypeInt,
            Type::Vector { .. } => Op::TypeVector,
            Type::Matrix { .. } => Op::TypeMatrix,
            Type::Struct(_) => Op::TypeStruct,
        };

        let id = self.next_id();
        let mut words = vec![id];
        words.extend(operands);
        self.add(Section::Define, op, &words);
        self.types.insert(ty.clone(), id);
        tracing::trace!("type {ty} is %{id}");

        if let Type::Struct(s) = ty {
            if let Some(name) = &s.name {
                self.name(id, name);
            }
            if self.params.debug_names {
                for (i, member) in s.members.iter().enumerate() {
                    let mut operands = vec![id, i as u32];
                    operands.extend(spv::encode_string(&member.name));
                    self.add(Section::Debug, Op::MemberName, &operands);
                }
            }
        }
        id
    }

    pub fn get_id_for_pointer_type(&mut self, ty: &Type, storage: StorageClass) -> u32 {
        let class = storage.to_spirv();
        let key = (ty.clone(), class);
        if let Some(id) = self.pointer_types.get(&key) {
            return *id;
        }

        let pointee = self.get_id_for_type(ty);
        let id = self.next_id();
        self.add(Section::Define, Op::TypePointer, &[id, class as u32, pointee]);
        self.pointer_types.insert(key, id);
        id
    }

    pub fn get_id_for_value(&mut self, value: &Value) -> u32 {
        if let Some(id) = self.values.get(value) {
            return *id;
        }

        let ty = value.ty();
        let id = match ty {
            Type::Scalar(_) => match value.get(0) {
                Scalar::Bool(true) => self.add_result(Section::Define, Op::ConstantTrue, ty, &[]),
                Scalar::Bool(false) => {
                    self.add_result(Section::Define, Op::ConstantFalse, ty, &[])
                }
                scalar => self.add_result(Section::Define, Op::Constant, ty, &scalar.to_words()),
            },
            _ => {
                let elements: Vec<Value> = if ty.is_struct() {
                    (0..ty.members().len()).filter_map(|i| value.member(i)).collect()
                } else {
                    (0..ty.length()).filter_map(|i| value.element(i)).collect()
                };
                let ids: Vec<u32> = elements.iter().map(|e| self.get_id_for_value(e)).collect();
                self.add_result(Section::Define, Op::ConstantComposite, ty, &ids)
            }
        };
        self.values.insert(value.clone(), id);
        tracing::trace!("constant {value} is %{id}");
        id
    }

    pub fn get_id_for_zero(&mut self, ty: &Type) -> u32 {
        self.get_id_for_value(&Value::new(ty.clone()))
    }

    pub fn get_id_for_one(&mut self, ty: &Type) -> u32 {
        let one = Scalar::one(ty.scalar_type());
        let value = Value::from_components(ty.clone(), std::iter::repeat(one).take(ty.n_components()));
        self.get_id_for_value(&value)
    }

    /// Id of the pointer to a variable's storage, declaring it on first use.
    pub fn get_id_for_variable(&mut self, variable: &Rc<Variable>) -> u32 {
        if let Some(id) = self.variables.get(&variable.id) {
            return *id;
        }

        let storage = variable.qualifier.storage;
        let pointer_type = self.get_id_for_pointer_type(&variable.ty, storage);
        let id = self.next_id();

        if variable.is_parameter() {
            self.parameters.push((id, pointer_type));
        } else {
            let section = match storage {
                StorageClass::Local => Section::Declare,
                _ => Section::Define,
            };

            let mut operands = vec![pointer_type, id, storage.to_spirv() as u32];
            if storage.can_initialize() {
                if let Some(value) = &variable.initial_value {
                    operands.push(self.get_id_for_value(value));
                }
            }
            self.add(section, Op::Variable, &operands);

            if matches!(storage, StorageClass::In | StorageClass::Out) {
                self.interface.push(id);
            }
        }
        self.name(id, &variable.name);
        self.variables.insert(variable.id, id);
        tracing::trace!("variable {} is %{id}", variable.name);
        id
    }

    /// Broadcasts a scalar into every component of the vector type `to`.
    /// Scalar targets are returned as they are.
    pub fn splat(&mut self, id: u32, to: &Type) -> u32 {
        if to.is_scalar() {
            return id;
        }
        let components = vec![id; to.length()];
        self.code(Op::CompositeConstruct, to, &components)
    }

    /// Converts between basic types of the same shape.
    pub fn convert(&mut self, id: u32, from: &Type, to: &Type) -> u32 {
        if from == to {
            return id;
        }

        if let (Type::Matrix { columns, .. }, Some(from_col), Some(to_col)) =
            (from, from.index_type(), to.index_type())
        {
            let converted: Vec<u32> = (0..*columns as u32)
                .map(|i| {
                    let column = self.code(Op::CompositeExtract, &from_col, &[id, i]);
                    self.convert(column, &from_col, &to_col)
                })
                .collect();
            return self.code(Op::CompositeConstruct, to, &converted);
        }

        use ScalarType as S;
        match (from.scalar_type(), to.scalar_type()) {
            (S::int, S::uint) | (S::uint, S::int) => self.code(Op::Bitcast, to, &[id]),
            (S::int, S::float | S::double) => self.code(Op::ConvertSToF, to, &[id]),
            (S::uint, S::float | S::double) => self.code(Op::ConvertUToF, to, &[id]),
            (S::float | S::double, S::int) => self.code(Op::ConvertFToS, to, &[id]),
            (S::float | S::double, S::uint) => self.code(Op::ConvertFToU, to, &[id]),
            (S::float, S::double) | (S::double, S::float) => self.code(Op::FConvert, to, &[id]),
            (S::int | S::uint, S::bool) => {
                let zero = self.get_id_for_zero(from);
                self.code(Op::INotEqual, to, &[id, zero])
            }
            (S::float | S::double, S::bool) => {
                let zero = self.get_id_for_zero(from);
                self.code(Op::FUnordNotEqual, to, &[id, zero])
            }
            (S::bool, _) => {
                let one = self.get_id_for_one(to);
                let zero = self.get_id_for_zero(to);
                self.code(Op::Select, to, &[id, one, zero])
            }
            (f, t) => unreachable!("conversion from {f} to {t}"),
        }
    }

    /// Assembles the module. The code section becomes the body of a
    /// function, which is the entry point when it takes no parameters.
    pub fn finish(mut self) -> Vec<u32> {
        let void = self.get_id_for_type(&Type::VOID);
        let mut fn_type_operands = vec![void];
        fn_type_operands.extend(self.parameters.iter().map(|(_, ty)| *ty));
        let fn_type = self.next_id();
        let mut words = vec![fn_type];
        words.extend(fn_type_operands);
        self.add(Section::Define, Op::TypeFunction, &words);

        let function = self.next_id();
        let label = self.next_id();
        self.name(function, "main");

        self.write_header(function);

        let bound = self.ids.peek();
        let mut out = ModuleHeader::new(bound).to_words().to_vec();
        for section in [Section::Header, Section::Debug, Section::Decorate, Section::Define] {
            out.extend_from_slice(self.section(section));
        }

        spv::push_instruction(&mut out, Op::Function, &[void, function, 0, fn_type]);
        for (id, ty) in &self.parameters {
            spv::push_instruction(&mut out, Op::FunctionParameter, &[*ty, *id]);
        }
        spv::push_instruction(&mut out, Op::Label, &[label]);
        out.extend_from_slice(self.section(Section::Declare));
        out.extend_from_slice(self.section(Section::Code));
        spv::push_instruction(&mut out, Op::Return, &[]);
        spv::push_instruction(&mut out, Op::FunctionEnd, &[]);

        tracing::debug!("assembled module: {} words, bound {bound}", out.len());
        out
    }

    fn write_header(&mut self, function: u32) {
        self.add(Section::Header, Op::Capability, &[spirv::Capability::Shader as u32]);
        if self.uses_float64 {
            self.add(Section::Header, Op::Capability, &[spirv::Capability::Float64 as u32]);
        }
        if let Some(ext) = self.glsl_ext {
            let mut operands = vec![ext];
            operands.extend(spv::encode_string("GLSL.std.450"));
            self.add(Section::Header, Op::ExtInstImport, &operands);
        }
        self.add(
            Section::Header,
            Op::MemoryModel,
            &[
                spirv::AddressingModel::Logical as u32,
                spirv::MemoryModel::GLSL450 as u32,
            ],
        );

        // functions with parameters can only be called
        if !self.parameters.is_empty() {
            return;
        }

        let (model, mode, mode_operands): (_, _, &[u32]) = match self.params.execution_model {
            ExecutionModel::Compute => (
                spirv::ExecutionModel::GLCompute,
                spirv::ExecutionMode::LocalSize,
                &[1, 1, 1],
            ),
            ExecutionModel::Fragment => (
                spirv::ExecutionModel::Fragment,
                spirv::ExecutionMode::OriginUpperLeft,
                &[],
            ),
        };

        let mut operands = vec![model as u32, function];
        operands.extend(spv::encode_string("main"));
        operands.extend_from_slice(&self.interface);
        self.add(Section::Header, Op::EntryPoint, &operands);

        let mut operands = vec![function, mode as u32];
        operands.extend_from_slice(mode_operands);
        self.add(Section::Header, Op::ExecutionMode, &operands);
    }
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;
    use itertools::Itertools;
    use spvsl_bin::spv::decode_instructions;

    use super::*;

    fn disassemble(words: &[u32]) -> String {
        decode_instructions(words).unwrap().iter().join("\n")
    }

    #[test]
    fn types_are_interned() {
        let mut w = SpvWriter::new(CompileParams::default());

        let vec3 = Type::vector(ScalarType::float, 3);
        let a = w.get_id_for_type(&vec3);
        let b = w.get_id_for_type(&Type::vector(ScalarType::float, 3));
        assert_eq!(a, b);

        let m = w.get_id_for_type(&Type::matrix(ScalarType::float, 2, 3));
        assert_ne!(m, a);

        assert_snapshot!(disassemble(w.section(Section::Define)), @r"
        OpTypeFloat 1 32
        OpTypeVector 2 1 3
        OpTypeMatrix 3 2 2
        ");
    }

    #[test]
    fn values_are_interned() {
        let mut w = SpvWriter::new(CompileParams::default());

        let v = Value::from_components(
            Type::vector(ScalarType::uint, 2),
            [Scalar::Uint(7), Scalar::Uint(7)],
        );
        let a = w.get_id_for_value(&v);
        let b = w.get_id_for_value(&v.clone());
        assert_eq!(a, b);
        w.get_id_for_value(&Value::from_scalar(true));

        assert_snapshot!(disassemble(w.section(Section::Define)), @r"
        OpTypeInt 1 32 0
        OpConstant 1 2 7
        OpTypeVector 3 1 2
        OpConstantComposite 3 4 2 2
        OpTypeBool 5
        OpConstantTrue 5 6
        ");
    }

    #[test]
    fn empty_module() {
        let w = SpvWriter::new(CompileParams {
            debug_names: false,
            ..Default::default()
        });
        assert_snapshot!(disassemble(&w.finish()[5..]), @r"
        OpCapability 1
        OpMemoryModel 0 1
        OpEntryPoint 5 3 1852399981 0
        OpExecutionMode 3 17 1 1 1
        OpTypeVoid 1
        OpTypeFunction 2 1
        OpFunction 1 3 0 2
        OpLabel 4
        OpReturn
        OpFunctionEnd
        ");
    }
}
