use bitflags::bitflags;
use spvsl_bin::{Type, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

impl From<u32> for VariableId {
    fn from(id: u32) -> Self {
        VariableId(id)
    }
}

bitflags! {
    /// Qualifiers that do not influence where a variable lives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QualifierFlags: u32 {
        const CONST = 1;
        const INVARIANT = 1 << 1;
        const COHERENT = 1 << 2;
        const VOLATILE = 1 << 3;
        const RESTRICT = 1 << 4;
        const READONLY = 1 << 5;
        const WRITEONLY = 1 << 6;
    }
}

/// Where a variable is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageClass {
    /// Module-scope variable private to the invocation.
    #[default]
    Global,
    /// Function-scope variable of the body function.
    Local,
    /// Parameter of the body function.
    Parameter,
    In,
    Out,
    Uniform,
}

impl StorageClass {
    pub fn to_spirv(self) -> spirv::StorageClass {
        match self {
            StorageClass::Global => spirv::StorageClass::Private,
            StorageClass::Local | StorageClass::Parameter => spirv::StorageClass::Function,
            StorageClass::In => spirv::StorageClass::Input,
            StorageClass::Out => spirv::StorageClass::Output,
            StorageClass::Uniform => spirv::StorageClass::Uniform,
        }
    }

    /// Storage that can be given an initial value by the declaration.
    pub fn can_initialize(self) -> bool {
        matches!(self, StorageClass::Global | StorageClass::Local)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Qualifier {
    pub storage: StorageClass,
    pub flags: QualifierFlags,
}

impl Qualifier {
    pub fn new(storage: StorageClass) -> Self {
        Qualifier {
            storage,
            flags: QualifierFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: QualifierFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_constant(&self) -> bool {
        self.flags.contains(QualifierFlags::CONST)
    }

    pub fn is_readonly(&self) -> bool {
        self.is_constant()
            || self.flags.contains(QualifierFlags::READONLY)
            || matches!(self.storage, StorageClass::In | StorageClass::Uniform)
    }
}

#[derive(Debug)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub ty: Type,
    pub qualifier: Qualifier,

    /// Value the variable holds before the body runs. Present for constants.
    pub initial_value: Option<Value>,
}

impl Variable {
    pub fn is_parameter(&self) -> bool {
        self.qualifier.storage == StorageClass::Parameter
    }

    /// The value of a constant, known at compile time.
    pub fn constant_value(&self) -> Option<&Value> {
        if self.qualifier.is_constant() {
            self.initial_value.as_ref()
        } else {
            None
        }
    }
}
