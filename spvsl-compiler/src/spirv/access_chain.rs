use std::rc::Rc;

use spirv::Op;
use spvsl_bin::{Scalar, Type, Value};

use super::SpvWriter;
use crate::variable::Variable;

/// A path from a variable to a part of it: struct members, followed by an
/// optional swizzle of the addressed vector.
#[derive(Debug, Clone)]
pub struct AccessChain {
    variable: Rc<Variable>,
    variable_id: u32,

    /// Ids of the index constants.
    indexes: Vec<u32>,

    /// Type addressed by the indexes.
    ty: Type,

    swizzle: Option<Vec<u8>>,
}

impl AccessChain {
    pub fn new(writer: &mut SpvWriter, variable: &Rc<Variable>) -> Self {
        AccessChain {
            variable_id: writer.get_id_for_variable(variable),
            variable: variable.clone(),
            indexes: Vec::new(),
            ty: variable.ty.clone(),
            swizzle: None,
        }
    }

    /// Descends into member `index`. Not possible after a swizzle.
    pub fn add_index(&mut self, writer: &mut SpvWriter, index: usize, ty: Type) {
        assert!(self.swizzle.is_none(), "indexing a swizzled access chain");

        let index = Value::from_scalar(Scalar::Int(index as i32));
        self.indexes.push(writer.get_id_for_value(&index));
        self.ty = ty;
    }

    /// Selects components. Swizzles of swizzles are composed.
    pub fn swizzle(&mut self, indexes: &[u8]) {
        let composed = match &self.swizzle {
            Some(current) => indexes.iter().map(|i| current[*i as usize]).collect(),
            None => indexes.to_vec(),
        };
        self.swizzle = Some(composed);
    }

    /// Type of the value that [AccessChain::load] produces.
    pub fn ty(&self) -> Type {
        match &self.swizzle {
            Some(swizzle) => Type::vector_or_scalar(self.ty.scalar_type(), swizzle.len() as u8),
            None => self.ty.clone(),
        }
    }

    fn pointer(&self, writer: &mut SpvWriter) -> u32 {
        if self.indexes.is_empty() {
            return self.variable_id;
        }

        let storage = self.variable.qualifier.storage;
        let pointer_type = writer.get_id_for_pointer_type(&self.ty, storage);
        let id = writer.next_id();

        let mut operands = vec![pointer_type, id, self.variable_id];
        operands.extend_from_slice(&self.indexes);
        writer.add(spvsl_bin::spv::Section::Code, Op::AccessChain, &operands);
        id
    }

    pub fn load(&self, writer: &mut SpvWriter) -> u32 {
        let pointer = self.pointer(writer);
        let loaded = writer.code(Op::Load, &self.ty, &[pointer]);

        let Some(swizzle) = &self.swizzle else {
            return loaded;
        };
        let ty = self.ty();
        match (&self.ty, swizzle.as_slice()) {
            (Type::Scalar(_), [_]) => loaded,
            (Type::Scalar(_), _) => {
                let components = vec![loaded; swizzle.len()];
                writer.code(Op::CompositeConstruct, &ty, &components)
            }
            (_, [index]) => writer.code(Op::CompositeExtract, &ty, &[loaded, *index as u32]),
            (_, indexes) => {
                let mut operands = vec![loaded, loaded];
                operands.extend(indexes.iter().map(|i| *i as u32));
                writer.code(Op::VectorShuffle, &ty, &operands)
            }
        }
    }

    /// Stores a value of type [AccessChain::ty]. Swizzled stores read the
    /// vector, replace the selected components and write it back.
    pub fn store(&self, writer: &mut SpvWriter, value: u32) {
        let pointer = self.pointer(writer);

        let value = match &self.swizzle {
            None => value,
            Some(_) if self.ty.is_scalar() => value,
            Some(swizzle) => {
                let current = writer.code(Op::Load, &self.ty, &[pointer]);
                if let [index] = swizzle.as_slice() {
                    writer.code(
                        Op::CompositeInsert,
                        &self.ty,
                        &[value, current, *index as u32],
                    )
                } else {
                    // components of `value` follow those of `current`
                    let length = self.ty.length() as u32;
                    let mut operands = vec![current, value];
                    operands.extend((0..length).map(|c| {
                        match swizzle.iter().position(|i| *i as u32 == c) {
                            Some(p) => length + p as u32,
                            None => c,
                        }
                    }));
                    writer.code(Op::VectorShuffle, &self.ty, &operands)
                }
            }
        };
        writer.add(spvsl_bin::spv::Section::Code, Op::Store, &[pointer, value]);
    }
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;
    use itertools::Itertools;
    use spvsl_bin::spv::{decode_instructions, Section};
    use spvsl_bin::ScalarType;

    use super::*;
    use crate::compile::CompileParams;
    use crate::variable::{Qualifier, StorageClass};

    fn variable(ty: Type) -> Rc<Variable> {
        Rc::new(Variable {
            id: 0.into(),
            name: "v".into(),
            ty,
            qualifier: Qualifier::new(StorageClass::Local),
            initial_value: None,
        })
    }

    fn code(writer: &SpvWriter) -> String {
        decode_instructions(writer.section(Section::Code))
            .unwrap()
            .iter()
            .join("\n")
    }

    #[test]
    fn swizzle_composition() {
        let mut w = SpvWriter::new(CompileParams::default());
        let var = variable(Type::vector(ScalarType::float, 4));

        let mut chain = AccessChain::new(&mut w, &var);
        chain.swizzle(&[3, 2, 1]);
        chain.swizzle(&[0, 0]);
        assert_eq!(chain.ty(), Type::vector(ScalarType::float, 2));

        chain.load(&mut w);
        // %2 is vec4, %4 the variable and %6 vec2
        assert_snapshot!(code(&w), @r"
        OpLoad 2 5 4
        OpVectorShuffle 6 7 5 5 3 3
        ");
    }

    #[test]
    fn swizzled_store() {
        let mut w = SpvWriter::new(CompileParams::default());
        let var = variable(Type::vector(ScalarType::float, 3));

        let mut chain = AccessChain::new(&mut w, &var);
        chain.swizzle(&[2, 0]);
        let value = w.get_id_for_zero(&chain.ty());
        chain.store(&mut w, value);

        // vec3 becomes (value.y, current.y, value.x)
        let code = code(&w);
        let shuffle = code.lines().find(|l| l.starts_with("OpVectorShuffle")).unwrap();
        assert!(shuffle.ends_with("4 1 3"), "{shuffle}");
        assert!(code.lines().last().unwrap().starts_with("OpStore"));
    }
}
