mod native;

pub use native::{all_overloads, Native, NativeOverload};

use std::rc::Rc;

use itertools::Itertools;
use spvsl_bin::{Type, Value};

use crate::spirv::SpvWriter;

/// Something that can be called with arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Native(NativeOverload),

    /// Constructor of a struct type, taking one argument per member.
    Constructor { ty: Type, parameters: Vec<Type> },
}

impl Function {
    pub fn new_constructor(ty: Type) -> Function {
        let parameters = ty.members().iter().map(|m| m.ty.clone()).collect();
        Function::Constructor { ty, parameters }
    }

    pub fn name(&self) -> String {
        match self {
            Function::Native(native) => native.name(),
            Function::Constructor { ty, .. } => ty.to_string(),
        }
    }

    pub fn return_type(&self) -> &Type {
        match self {
            Function::Native(native) => &native.return_type,
            Function::Constructor { ty, .. } => ty,
        }
    }

    pub fn parameters(&self) -> &[Type] {
        match self {
            Function::Native(native) => &native.parameters,
            Function::Constructor { parameters, .. } => parameters,
        }
    }

    /// Evaluates a call at compile time. Arguments have the types of the
    /// call site and are converted here.
    pub fn get_constant(&self, arguments: Vec<Value>) -> Option<Value> {
        let arguments: Vec<Value> = (arguments.into_iter().zip(self.parameters()))
            .map(|(value, ty)| value.convert(ty).ok())
            .collect::<Option<_>>()?;

        match self {
            Function::Native(native) => native.evaluate(&arguments),
            Function::Constructor { ty, .. } => Value::from_members(ty.clone(), arguments).ok(),
        }
    }

    /// Emits the call. Arguments are ids of values of the parameter types.
    pub fn write_spv(&self, writer: &mut SpvWriter, arguments: &[u32]) -> u32 {
        match self {
            Function::Native(native) => native.write_spv(writer, arguments),
            Function::Constructor { ty, .. } => {
                writer.code(spirv::Op::CompositeConstruct, ty, arguments)
            }
        }
    }
}

/// Narrows a set of overloads down to the one a call resolves to.
pub struct FunctionMatcher {
    /// Candidates and whether all arguments so far matched their type
    /// exactly.
    candidates: Vec<(Rc<Function>, bool)>,
}

impl FunctionMatcher {
    pub fn new(functions: impl IntoIterator<Item = Rc<Function>>) -> Self {
        FunctionMatcher {
            candidates: functions.into_iter().map(|f| (f, true)).collect(),
        }
    }

    pub fn has_matches(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Keeps candidates whose parameter `n` accepts a value of type `ty`.
    pub fn match_argument(&mut self, n: usize, ty: &Type) {
        self.candidates.retain_mut(|(function, exact)| {
            let Some(param) = function.parameters().get(n) else {
                return false;
            };
            *exact &= param == ty;
            Type::can_convert(ty, param)
        });
    }

    /// Keeps candidates that take exactly `n` arguments.
    pub fn match_n_arguments(&mut self, n: usize) {
        self.candidates
            .retain(|(function, _)| function.parameters().len() == n);
    }

    /// The single remaining candidate, or failing that the single candidate
    /// that matched all arguments exactly.
    pub fn get_match(&self) -> Option<Rc<Function>> {
        if let Ok((function, _)) = self.candidates.iter().exactly_one() {
            return Some(function.clone());
        }
        let (function, _) = self
            .candidates
            .iter()
            .filter(|(_, exact)| *exact)
            .exactly_one()
            .ok()?;
        Some(function.clone())
    }
}

#[cfg(test)]
mod test {
    use spvsl_bin::{Member, ScalarType};

    use super::*;

    fn matcher(name: &str) -> FunctionMatcher {
        FunctionMatcher::new(
            all_overloads()
                .filter(|o| o.name() == name)
                .map(|o| Rc::new(Function::Native(o))),
        )
    }

    fn resolve(name: &str, args: &[Type]) -> Option<Rc<Function>> {
        let mut m = matcher(name);
        for (i, ty) in args.iter().enumerate() {
            m.match_argument(i, ty);
        }
        m.match_n_arguments(args.len());
        m.get_match()
    }

    #[test]
    fn exact_match_wins() {
        let f = resolve("min", &[Type::INT, Type::INT]).unwrap();
        assert_eq!(f.parameters(), &[Type::INT, Type::INT]);

        let f = resolve("min", &[Type::UINT, Type::UINT]).unwrap();
        assert_eq!(f.return_type(), &Type::UINT);
    }

    #[test]
    fn conversion_match() {
        // only the float overload accepts both
        let f = resolve("min", &[Type::INT, Type::FLOAT]).unwrap();
        assert_eq!(f.return_type(), &Type::FLOAT);

        let vec3 = Type::vector(ScalarType::float, 3);
        let f = resolve("mix", &[vec3.clone(), vec3.clone(), Type::INT]).unwrap();
        assert_eq!(f.parameters()[2], Type::FLOAT);
    }

    #[test]
    fn ambiguous() {
        // both the uint and the float overload accept, neither exactly
        assert!(resolve("max", &[Type::INT, Type::UINT]).is_none());

        let f = resolve("abs", &[Type::UINT]).unwrap();
        assert_eq!(f.return_type(), &Type::FLOAT);
    }

    #[test]
    fn argument_count() {
        let mut m = matcher("atan");
        m.match_argument(0, &Type::FLOAT);
        assert!(m.has_matches());
        m.match_n_arguments(3);
        assert!(!m.has_matches());
    }

    #[test]
    fn struct_constructor() {
        let ty = Type::new_struct(
            Some("Light".into()),
            vec![
                Member {
                    name: "position".into(),
                    ty: Type::vector(ScalarType::float, 3),
                },
                Member {
                    name: "power".into(),
                    ty: Type::FLOAT,
                },
            ],
        );
        let ctor = Function::new_constructor(ty.clone());
        assert_eq!(ctor.name(), "Light");
        assert_eq!(ctor.parameters().len(), 2);

        let value = ctor
            .get_constant(vec![
                Value::new(Type::vector(ScalarType::float, 3)),
                Value::from_scalar(2),
            ])
            .unwrap();
        assert_eq!(value.ty(), &ty);
        assert_eq!(value.member(1), Some(Value::from_scalar(2.0f32)));
    }
}
