use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use spvsl_bin::{Type, Value};

use crate::function::{all_overloads, Function, FunctionMatcher};
use crate::utils::IdGenerator;
use crate::variable::{Qualifier, StorageClass, Variable, VariableId};

/// Names visible to an expression: struct types, variables and functions.
///
/// Builtin functions are always present.
#[derive(Debug)]
pub struct Scope {
    types: HashMap<String, Type>,
    variables: IndexMap<String, Rc<Variable>>,
    functions: HashMap<String, Vec<Rc<Function>>>,

    variable_ids: IdGenerator<VariableId>,
}

impl Scope {
    pub fn new() -> Self {
        let mut functions: HashMap<_, Vec<_>> = HashMap::new();
        for overload in all_overloads() {
            functions
                .entry(overload.name())
                .or_default()
                .push(Rc::new(Function::Native(overload)));
        }

        Scope {
            types: HashMap::new(),
            variables: IndexMap::new(),
            functions,
            variable_ids: IdGenerator::new(),
        }
    }

    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&Rc<Variable>> {
        self.variables.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// A matcher over every overload of `name`.
    pub fn match_function(&self, name: &str) -> FunctionMatcher {
        let overloads = self.functions.get(name).into_iter().flatten().cloned();
        FunctionMatcher::new(overloads)
    }

    /// Registers a named type. Returns false if the name is taken.
    pub fn add_type(&mut self, name: String, ty: Type) -> bool {
        if self.types.contains_key(&name) {
            return false;
        }
        self.types.insert(name, ty);
        true
    }

    /// Declares a variable, replacing a previous one with the same name.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        qualifier: Qualifier,
        initial_value: Option<Value>,
    ) -> Rc<Variable> {
        let name = name.into();
        let variable = Rc::new(Variable {
            id: self.variable_ids.gen(),
            name: name.clone(),
            ty,
            qualifier,
            initial_value,
        });
        tracing::trace!("declared {} {}", variable.ty, variable.name);

        self.variables.insert(name, variable.clone());
        variable
    }

    /// Declares a parameter of the body function that a compiled program
    /// evaluates in.
    pub fn add_parameter(&mut self, name: impl Into<String>, ty: Type) -> Rc<Variable> {
        self.add_variable(name, ty, Qualifier::new(StorageClass::Parameter), None)
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Rc<Variable>> {
        self.variables.values()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use spvsl_bin::ScalarType;

    use super::*;

    #[test]
    fn builtins_are_visible() {
        let scope = Scope::new();
        assert!(scope.has_function("normalize"));
        assert!(scope.has_function("roundEven"));
        assert!(!scope.has_function("main"));
        assert!(scope.match_function("sqrt").has_matches());
        assert!(!scope.match_function("main").has_matches());
    }

    #[test]
    fn variables() {
        let mut scope = Scope::new();
        let a = scope.add_variable("a", Type::FLOAT, Qualifier::default(), None);
        let b = scope.add_variable(
            "b",
            Type::vector(ScalarType::int, 2),
            Qualifier::new(StorageClass::In),
            None,
        );
        assert_ne!(a.id, b.id);
        assert_eq!(scope.lookup_variable("b").map(|v| v.id), Some(b.id));
        let p = scope.add_parameter("p", Type::UINT);
        assert!(p.is_parameter());
        assert_eq!(
            scope.variables().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "p"]
        );
    }
}
