//! Compile-time evaluation.

use spvsl_bin::{Scalar, ScalarType, Type, Value};

use super::{Binary, Expression, Swizzle};
use crate::check::BinaryOp;

impl Expression {
    /// Value of this expression, if it can be computed at compile time.
    pub fn get_constant(&self) -> Option<Value> {
        match self {
            Expression::Constant(value) => Some(value.clone()),
            Expression::Reference(var) => var.constant_value().cloned(),

            Expression::Multiplication(binary) | Expression::Arithmetic(binary) => {
                binary.get_constant()
            }
            Expression::Operation(_) | Expression::Assignment(_) => None,

            Expression::Negation(expr) => {
                let mut value = expr.get_constant()?;
                for i in 0..value.ty().n_components() {
                    let negated = negate(value.get(i));
                    value.set(i, negated);
                }
                Some(value)
            }
            Expression::Constructor { ty, arguments } => {
                let values = arguments
                    .iter()
                    .map(Expression::get_constant)
                    .collect::<Option<Vec<_>>>()?;
                Some(construct(ty, &values))
            }
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                let values = arguments
                    .iter()
                    .map(Expression::get_constant)
                    .collect::<Option<Vec<_>>>()?;
                function.get_constant(values)
            }
            Expression::Member { expr, index } => expr.get_constant()?.member(*index),
            Expression::Swizzle(swizzle) => swizzle.get_constant(),
        }
    }
}

impl Binary {
    fn get_constant(&self) -> Option<Value> {
        let scalar = self.ty.scalar_type();
        let left = self.left.get_constant()?;
        let right = self.right.get_constant()?;

        // operands are evaluated in the scalar type of the result
        let left = left.convert(&left.ty().matching(scalar)).ok()?;
        let right = right.convert(&right.ty().matching(scalar)).ok()?;

        let value = match self.op {
            BinaryOp::Mul if is_linear_algebra(left.ty(), right.ty()) => {
                contract(&self.ty, &left, &right)
            }
            BinaryOp::Div if left.ty().is_matrix() || right.ty().is_matrix() => {
                // reciprocal-then-scale
                let mut reciprocal = right;
                for i in 0..reciprocal.ty().n_components() {
                    let one = Scalar::one(scalar);
                    let r = fold_component(BinaryOp::Div, one, reciprocal.get(i));
                    reciprocal.set(i, r);
                }
                component_wise(BinaryOp::Mul, &self.ty, &left, &reciprocal)
            }
            op => component_wise(op, &self.ty, &left, &right),
        };
        tracing::trace!("folded {} to {value}", self.op);
        Some(value)
    }
}

impl Swizzle {
    fn get_constant(&self) -> Option<Value> {
        let value = self.expr.get_constant()?;
        let components = self.indexes.iter().map(|i| {
            if value.ty().is_scalar() {
                value.get(0)
            } else {
                value.get(*i as usize)
            }
        });
        Some(Value::from_components(self.ty(), components))
    }
}

fn is_linear_algebra(left: &Type, right: &Type) -> bool {
    matches!(
        (left, right),
        (Type::Matrix { .. }, Type::Matrix { .. })
            | (Type::Matrix { .. }, Type::Vector { .. })
            | (Type::Vector { .. }, Type::Matrix { .. })
    )
}

/// Products of matrices and vectors, accumulated in the result's scalar
/// type.
///
/// Vectors act as a single column on the right and as a single row on the
/// left.
fn contract(ty: &Type, left: &Value, right: &Value) -> Value {
    let scalar = ty.scalar_type();

    // (rows, columns) of an operand
    let dims = |value: &Value, on_left: bool| match value.ty() {
        Type::Matrix { columns, rows, .. } => (*rows as usize, *columns as usize),
        Type::Vector { length, .. } if on_left => (1, *length as usize),
        Type::Vector { length, .. } => (*length as usize, 1),
        _ => unreachable!("contraction of {}", value.ty()),
    };
    let (l_rows, inner) = dims(left, true);
    let (_, r_cols) = dims(right, false);

    // element at (row, column) is stored at column * rows + row
    let at = |value: &Value, rows: usize, row: usize, col: usize| value.get(col * rows + row);
    let r_rows = inner;

    let mut res = Value::new(ty.clone());
    for col in 0..r_cols {
        for row in 0..l_rows {
            let mut acc = Scalar::zero(scalar);
            for k in 0..inner {
                let l = at(left, l_rows, row, k);
                let r = at(right, r_rows, k, col);
                acc = fold_component(BinaryOp::Add, acc, fold_component(BinaryOp::Mul, l, r));
            }
            res.set(col * l_rows + row, acc);
        }
    }
    res
}

/// Applies `op` component by component. A single-component operand is
/// broadcast.
fn component_wise(op: BinaryOp, ty: &Type, left: &Value, right: &Value) -> Value {
    let pick = |value: &Value, i: usize| {
        if value.ty().n_components() == 1 {
            value.get(0)
        } else {
            value.get(i)
        }
    };

    let mut res = Value::new(ty.clone());
    for i in 0..ty.n_components() {
        res.set(i, fold_component(op, pick(left, i), pick(right, i)));
    }
    res
}

/// Both operands have the same scalar type.
fn fold_component(op: BinaryOp, left: Scalar, right: Scalar) -> Scalar {
    use Scalar::*;

    match (op, left, right) {
        (BinaryOp::Add, Float(l), Float(r)) => Float(l + r),
        (BinaryOp::Add, Double(l), Double(r)) => Double(l + r),
        (BinaryOp::Add, Int(l), Int(r)) => Int(l.wrapping_add(r)),
        (BinaryOp::Add, Uint(l), Uint(r)) => Uint(l.wrapping_add(r)),

        (BinaryOp::Sub, Float(l), Float(r)) => Float(l - r),
        (BinaryOp::Sub, Double(l), Double(r)) => Double(l - r),
        (BinaryOp::Sub, Int(l), Int(r)) => Int(l.wrapping_sub(r)),
        (BinaryOp::Sub, Uint(l), Uint(r)) => Uint(l.wrapping_sub(r)),

        (BinaryOp::Mul, Float(l), Float(r)) => Float(l * r),
        (BinaryOp::Mul, Double(l), Double(r)) => Double(l * r),
        (BinaryOp::Mul, Int(l), Int(r)) => Int(l.wrapping_mul(r)),
        (BinaryOp::Mul, Uint(l), Uint(r)) => Uint(l.wrapping_mul(r)),

        (BinaryOp::Div, Float(l), Float(r)) => Float(l / r),
        (BinaryOp::Div, Double(l), Double(r)) => Double(l / r),
        // integer division by zero saturates
        (BinaryOp::Div, Int(_), Int(0)) => Int(i32::MAX),
        (BinaryOp::Div, Int(l), Int(r)) => Int(l.wrapping_div(r)),
        (BinaryOp::Div, Uint(_), Uint(0)) => Uint(u32::MAX),
        (BinaryOp::Div, Uint(l), Uint(r)) => Uint(l / r),

        (op, l, r) => unreachable!("cannot fold {l} {op} {r}"),
    }
}

fn negate(s: Scalar) -> Scalar {
    match s {
        Scalar::Float(v) => Scalar::Float(-v),
        Scalar::Double(v) => Scalar::Double(-v),
        Scalar::Int(v) => Scalar::Int(v.wrapping_neg()),
        Scalar::Uint(v) => Scalar::Uint(v.wrapping_neg()),
        Scalar::Bool(_) => unreachable!("negation of a boolean"),
    }
}

/// Builtin constructor semantics.
///
/// A single scalar fills a vector or the diagonal of a matrix. A single
/// matrix argument to a matrix type copies the overlap and continues the
/// identity. Otherwise components are consumed in order.
pub(super) fn construct(ty: &Type, arguments: &[Value]) -> Value {
    let scalar = ty.scalar_type();
    let mut res = Value::new(ty.clone());

    match (ty, arguments) {
        (Type::Matrix { columns, rows, .. }, [arg]) if arg.ty().is_scalar() => {
            for i in 0..(*columns).min(*rows) as usize {
                res.set(i * *rows as usize + i, arg.get(0));
            }
        }
        (_, [arg]) if arg.ty().is_scalar() => {
            for i in 0..ty.n_components() {
                res.set(i, arg.get(0));
            }
        }
        (Type::Matrix { columns, rows, .. }, [arg]) if arg.ty().is_matrix() => {
            let src_columns = arg.ty().length();
            let src_rows = arg.ty().index_type().map_or(0, |column| column.length());
            for col in 0..*columns as usize {
                for row in 0..*rows as usize {
                    let component = if col < src_columns && row < src_rows {
                        arg.get(col * src_rows + row)
                    } else if col == row {
                        Scalar::one(scalar)
                    } else {
                        Scalar::zero(scalar)
                    };
                    res.set(col * *rows as usize + row, component);
                }
            }
        }
        _ => {
            let components = arguments.iter().flat_map(Value::components);
            for (i, c) in components.take(ty.n_components()).enumerate() {
                res.set(i, c);
            }
        }
    }
    res
}
