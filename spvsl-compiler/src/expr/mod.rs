//! Typed expression trees.
//!
//! Trees are built by the parser and never changed afterwards. Every
//! variant supports printing ([Expression::print]), its result type
//! ([Expression::return_type]), compile-time evaluation
//! ([Expression::get_constant]) and SPIR-V emission
//! ([Expression::write_spv]).

mod codegen;
mod constant;

use std::rc::Rc;

use enum_as_inner::EnumAsInner;
use spvsl_bin::{ScalarType, Type, Value};

use crate::check::{BinaryOp, OpFamily};
use crate::function::Function;
use crate::variable::Variable;

#[derive(Debug, Clone, EnumAsInner)]
pub enum Expression {
    Assignment(Box<Assignment>),

    /// `*`, including linear algebra products.
    Multiplication(Box<Binary>),

    /// `+`, `-` and `/`.
    Arithmetic(Box<Binary>),

    /// Remaining binary operators: `%`, shifts, bitwise, relational,
    /// equality and logical.
    Operation(Box<Binary>),

    Reference(Rc<Variable>),

    /// Builtin constructor of a scalar, vector or matrix type.
    Constructor {
        ty: Type,
        arguments: Vec<Expression>,
    },

    FunctionCall {
        function: Rc<Function>,
        arguments: Vec<Expression>,
    },

    /// Struct member access.
    Member {
        expr: Box<Expression>,
        index: usize,
    },

    Swizzle(Box<Swizzle>),

    Negation(Box<Expression>),

    Constant(Value),
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Expression,
    pub right: Expression,

    /// Result type, as determined by [BinaryOp::check].
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub lvalue: Expression,

    /// Operator of a compound assignment.
    pub op: Option<BinaryOp>,
    pub rvalue: Expression,

    /// Type of the assigned value before conversion to the lvalue type.
    pub ty: Type,
}

/// Letter sets that can name vector components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwizzleNames {
    Position,
    Color,
    TexCoord,
}

impl SwizzleNames {
    pub const ALL: [SwizzleNames; 3] = [
        SwizzleNames::Position,
        SwizzleNames::Color,
        SwizzleNames::TexCoord,
    ];

    pub fn letters(self) -> &'static str {
        match self {
            SwizzleNames::Position => "xyzw",
            SwizzleNames::Color => "rgba",
            SwizzleNames::TexCoord => "stpq",
        }
    }

    /// The set that contains `c`.
    pub fn for_letter(c: char) -> Option<SwizzleNames> {
        Self::ALL.into_iter().find(|n| n.letters().contains(c))
    }

    pub fn index_of(self, c: char) -> Option<u8> {
        self.letters().find(c).map(|i| i as u8)
    }

    pub fn letter(self, index: u8) -> char {
        self.letters().as_bytes()[index as usize] as char
    }
}

#[derive(Debug, Clone)]
pub struct Swizzle {
    pub expr: Expression,
    pub names: SwizzleNames,
    pub indexes: Vec<u8>,
}

impl Swizzle {
    pub fn ty(&self) -> Type {
        let scalar = self.expr.return_type().scalar_type();
        Type::vector_or_scalar(scalar, self.indexes.len() as u8)
    }
}

impl Binary {
    pub fn family(&self) -> OpFamily {
        self.op.family()
    }
}

impl Expression {
    /// Wraps an operator application into the variant of its family.
    pub fn new_binary(op: BinaryOp, left: Expression, right: Expression, ty: Type) -> Expression {
        let binary = Box::new(Binary {
            op,
            left,
            right,
            ty,
        });
        match op.family() {
            OpFamily::Multiplication => Expression::Multiplication(binary),
            OpFamily::Arithmetic => Expression::Arithmetic(binary),
            _ => Expression::Operation(binary),
        }
    }

    /// Placeholder for an expression that failed to parse or check. It is a
    /// well-typed constant, so checking of the surrounding tree can go on.
    pub fn error() -> Expression {
        Expression::Constant(Value::from_scalar(0.0f32))
    }

    pub fn return_type(&self) -> Type {
        match self {
            Expression::Assignment(a) => a.lvalue.return_type(),
            Expression::Multiplication(b)
            | Expression::Arithmetic(b)
            | Expression::Operation(b) => b.ty.clone(),
            Expression::Reference(var) => var.ty.clone(),
            Expression::Constructor { ty, .. } => ty.clone(),
            Expression::FunctionCall { function, .. } => function.return_type().clone(),
            Expression::Member { expr, index } => {
                expr.return_type().members()[*index].ty.clone()
            }
            Expression::Swizzle(swizzle) => swizzle.ty(),
            Expression::Negation(expr) => expr.return_type(),
            Expression::Constant(value) => value.ty().clone(),
        }
    }

    /// Can this expression be the left side of an assignment?
    pub fn is_assignable(&self) -> bool {
        match self {
            Expression::Reference(_) => true,
            Expression::Member { expr, .. } => expr.is_assignable(),
            Expression::Swizzle(swizzle) => {
                let mut seen = [false; 4];
                for i in &swizzle.indexes {
                    if std::mem::replace(&mut seen[*i as usize], true) {
                        return false;
                    }
                }
                swizzle.expr.is_assignable()
            }
            _ => false,
        }
    }

    /// The variable an assignable expression writes to.
    pub fn assigned_variable(&self) -> Option<&Rc<Variable>> {
        match self {
            Expression::Reference(var) => Some(var),
            Expression::Member { expr, .. } => expr.assigned_variable(),
            Expression::Swizzle(swizzle) => swizzle.expr.assigned_variable(),
            _ => None,
        }
    }

    /// Is the result type a non-void scalar?
    pub fn is_scalar_valued(&self) -> bool {
        matches!(self.return_type(), Type::Scalar(s) if s != ScalarType::void)
    }
}
