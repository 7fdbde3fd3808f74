//! SPIR-V emission.
//!
//! Every expression is lowered into straight-line code in the code section
//! of the writer. Operands are converted to the scalar type an operator
//! works in before the operator itself is emitted.

use spirv::Op;
use spvsl_bin::{ScalarType, Type};

use super::{Assignment, Binary, Expression, Swizzle};
use crate::check::{common_scalar_type, BinaryOp, OpFamily};
use crate::spirv::{AccessChain, SpvWriter};

impl Expression {
    /// Emits instructions that compute this expression and returns the id
    /// of the result.
    pub fn write_spv(&self, writer: &mut SpvWriter) -> u32 {
        if writer.fold_constants() {
            if let Some(value) = self.get_constant() {
                return writer.get_id_for_value(&value);
            }
        }

        if let Some(chain) = self.access_chain(writer) {
            return chain.load(writer);
        }

        match self {
            Expression::Assignment(assignment) => assignment.write_spv(writer),
            Expression::Multiplication(binary)
            | Expression::Arithmetic(binary)
            | Expression::Operation(binary) => binary.write_spv(writer),
            Expression::Reference(var) => unreachable!("reference to {} without chain", var.name),
            Expression::Constructor { ty, arguments } => {
                let arguments: Vec<(u32, Type)> = arguments
                    .iter()
                    .map(|a| (a.write_spv(writer), a.return_type()))
                    .collect();
                write_constructor(writer, ty, &arguments)
            }
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                let ids: Vec<u32> = (arguments.iter().zip(function.parameters()))
                    .map(|(arg, param)| {
                        let id = arg.write_spv(writer);
                        writer.convert(id, &arg.return_type(), param)
                    })
                    .collect();
                function.write_spv(writer, &ids)
            }
            Expression::Member { expr, index } => {
                let base = expr.write_spv(writer);
                let ty = self.return_type();
                writer.code(Op::CompositeExtract, &ty, &[base, *index as u32])
            }
            Expression::Swizzle(swizzle) => swizzle.write_spv(writer),
            Expression::Negation(expr) => {
                let ty = expr.return_type();
                let id = expr.write_spv(writer);
                write_negation(writer, &ty, id)
            }
            Expression::Constant(value) => writer.get_id_for_value(value),
        }
    }

    /// The storage an assignable expression refers to. None for
    /// expressions that only produce values.
    pub(crate) fn access_chain(&self, writer: &mut SpvWriter) -> Option<AccessChain> {
        match self {
            Expression::Reference(var) => Some(AccessChain::new(writer, var)),
            Expression::Member { expr, index } => {
                let mut chain = expr.access_chain(writer)?;
                chain.add_index(writer, *index, self.return_type());
                Some(chain)
            }
            Expression::Swizzle(swizzle) => {
                let mut chain = swizzle.expr.access_chain(writer)?;
                chain.swizzle(&swizzle.indexes);
                Some(chain)
            }
            _ => None,
        }
    }
}

impl Binary {
    fn write_spv(&self, writer: &mut SpvWriter) -> u32 {
        let left = (self.left.write_spv(writer), self.left.return_type());
        let right = (self.right.write_spv(writer), self.right.return_type());
        write_binary(writer, self.op, &self.ty, left, right)
    }
}

impl Assignment {
    fn write_spv(&self, writer: &mut SpvWriter) -> u32 {
        let Some(chain) = self.lvalue.access_chain(writer) else {
            unreachable!("assignment to a value that has no storage")
        };
        let lty = chain.ty();

        let rty = self.rvalue.return_type();
        let rvalue = self.rvalue.write_spv(writer);

        let value = match self.op {
            Some(op) => {
                let current = chain.load(writer);
                let result = write_binary(writer, op, &self.ty, (current, lty.clone()), (rvalue, rty));
                writer.convert(result, &self.ty, &lty)
            }
            None => writer.convert(rvalue, &rty, &lty),
        };
        chain.store(writer, value);
        value
    }
}

impl Swizzle {
    fn write_spv(&self, writer: &mut SpvWriter) -> u32 {
        let base = self.expr.write_spv(writer);
        let ty = self.ty();

        match (self.expr.return_type(), self.indexes.as_slice()) {
            (Type::Scalar(_), [_]) => base,
            (Type::Scalar(_), indexes) => {
                let components = vec![base; indexes.len()];
                writer.code(Op::CompositeConstruct, &ty, &components)
            }
            (_, [index]) => writer.code(Op::CompositeExtract, &ty, &[base, *index as u32]),
            (_, indexes) => {
                let mut operands = vec![base, base];
                operands.extend(indexes.iter().map(|i| *i as u32));
                writer.code(Op::VectorShuffle, &ty, &operands)
            }
        }
    }
}

/// Emits `left <op> right`, where `ty` is the checked result type.
pub(super) fn write_binary(
    writer: &mut SpvWriter,
    op: BinaryOp,
    ty: &Type,
    left: (u32, Type),
    right: (u32, Type),
) -> u32 {
    match op.family() {
        OpFamily::Multiplication => {
            let left = convert_to(writer, left, ty.scalar_type());
            let right = convert_to(writer, right, ty.scalar_type());
            write_multiplication(writer, ty, left, right)
        }
        OpFamily::Arithmetic => {
            let left = convert_to(writer, left, ty.scalar_type());
            let right = convert_to(writer, right, ty.scalar_type());
            write_arithmetic(writer, op, ty, left, right)
        }
        OpFamily::Modulo | OpFamily::Bitwise => {
            let scalar = ty.scalar_type();
            let (l, lty) = convert_to(writer, left, scalar);
            let (r, rty) = convert_to(writer, right, scalar);
            let l = broadcast(writer, l, &lty, ty);
            let r = broadcast(writer, r, &rty, ty);

            let op = match (op, scalar) {
                (BinaryOp::Mod, ScalarType::uint) => Op::UMod,
                (BinaryOp::Mod, _) => Op::SMod,
                (BinaryOp::BitAnd, _) => Op::BitwiseAnd,
                (BinaryOp::BitXor, _) => Op::BitwiseXor,
                (BinaryOp::BitOr, _) => Op::BitwiseOr,
                (op, _) => unreachable!("{op} is not bitwise"),
            };
            writer.code(op, ty, &[l, r])
        }
        OpFamily::Shift => {
            let (l, lty) = left;
            let (r, rty) = right;
            let r = if lty.is_vector() && rty.is_scalar() {
                writer.splat(r, &Type::vector(rty.scalar_type(), lty.length() as u8))
            } else {
                r
            };

            let op = match (op, lty.scalar_type()) {
                (BinaryOp::Shl, _) => Op::ShiftLeftLogical,
                (_, ScalarType::int) => Op::ShiftRightArithmetic,
                _ => Op::ShiftRightLogical,
            };
            writer.code(op, ty, &[l, r])
        }
        OpFamily::Relational => {
            let scalar = operand_scalar(&left.1, &right.1);
            let (l, _) = convert_to(writer, left, scalar);
            let (r, _) = convert_to(writer, right, scalar);

            use ScalarType as S;
            let op = match (op, scalar) {
                (BinaryOp::Lt, S::int) => Op::SLessThan,
                (BinaryOp::Lt, S::uint) => Op::ULessThan,
                (BinaryOp::Lt, _) => Op::FOrdLessThan,
                (BinaryOp::Gt, S::int) => Op::SGreaterThan,
                (BinaryOp::Gt, S::uint) => Op::UGreaterThan,
                (BinaryOp::Gt, _) => Op::FOrdGreaterThan,
                (BinaryOp::Le, S::int) => Op::SLessThanEqual,
                (BinaryOp::Le, S::uint) => Op::ULessThanEqual,
                (BinaryOp::Le, _) => Op::FOrdLessThanEqual,
                (BinaryOp::Ge, S::int) => Op::SGreaterThanEqual,
                (BinaryOp::Ge, S::uint) => Op::UGreaterThanEqual,
                (BinaryOp::Ge, _) => Op::FOrdGreaterThanEqual,
                (op, _) => unreachable!("{op} is not relational"),
            };
            writer.code(op, &Type::BOOL, &[l, r])
        }
        OpFamily::Equality => {
            let scalar = operand_scalar(&left.1, &right.1);
            let (l, lty) = convert_to(writer, left, scalar);
            let (r, _) = convert_to(writer, right, scalar);
            write_equality(writer, op == BinaryOp::Eq, &lty, l, r)
        }
        OpFamily::Logical => {
            let op = match op {
                BinaryOp::And => Op::LogicalAnd,
                BinaryOp::Or => Op::LogicalOr,
                BinaryOp::Xor => Op::LogicalNotEqual,
                op => unreachable!("{op} is not logical"),
            };
            writer.code(op, &Type::BOOL, &[left.0, right.0])
        }
    }
}

fn operand_scalar(left: &Type, right: &Type) -> ScalarType {
    match common_scalar_type(left, right) {
        Ok(scalar) => scalar,
        Err(message) => unreachable!("{message}"),
    }
}

/// Converts an operand to the same shape over `scalar`.
fn convert_to(writer: &mut SpvWriter, (id, ty): (u32, Type), scalar: ScalarType) -> (u32, Type) {
    let to = ty.matching(scalar);
    (writer.convert(id, &ty, &to), to)
}

/// Splats a scalar operand to a vector result type.
fn broadcast(writer: &mut SpvWriter, id: u32, from: &Type, to: &Type) -> u32 {
    if from.is_scalar() && to.is_vector() {
        writer.splat(id, to)
    } else {
        id
    }
}

fn column_type(ty: &Type) -> Type {
    match ty.index_type() {
        Some(column) => column,
        None => unreachable!("{ty} has no columns"),
    }
}

fn write_multiplication(
    writer: &mut SpvWriter,
    ty: &Type,
    (l, lty): (u32, Type),
    (r, rty): (u32, Type),
) -> u32 {
    let floating = ty.scalar_type().is_floating();

    match (&lty, &rty) {
        (Type::Matrix { .. }, Type::Matrix { .. }) => {
            writer.code(Op::MatrixTimesMatrix, ty, &[l, r])
        }
        (Type::Vector { .. }, Type::Matrix { .. }) => {
            writer.code(Op::VectorTimesMatrix, ty, &[l, r])
        }
        (Type::Matrix { .. }, Type::Vector { .. }) => {
            writer.code(Op::MatrixTimesVector, ty, &[l, r])
        }
        (Type::Matrix { .. }, Type::Scalar(_)) => writer.code(Op::MatrixTimesScalar, ty, &[l, r]),
        (Type::Scalar(_), Type::Matrix { .. }) => writer.code(Op::MatrixTimesScalar, ty, &[r, l]),
        (Type::Vector { .. }, Type::Scalar(_)) if floating => {
            writer.code(Op::VectorTimesScalar, ty, &[l, r])
        }
        (Type::Scalar(_), Type::Vector { .. }) if floating => {
            writer.code(Op::VectorTimesScalar, ty, &[r, l])
        }
        _ => {
            let l = broadcast(writer, l, &lty, ty);
            let r = broadcast(writer, r, &rty, ty);
            let op = if floating { Op::FMul } else { Op::IMul };
            writer.code(op, ty, &[l, r])
        }
    }
}

fn write_arithmetic(
    writer: &mut SpvWriter,
    op: BinaryOp,
    ty: &Type,
    (l, lty): (u32, Type),
    (r, rty): (u32, Type),
) -> u32 {
    if op == BinaryOp::Div && (lty.is_matrix() || rty.is_matrix()) {
        return write_matrix_division(writer, ty, (l, lty), (r, rty));
    }

    use ScalarType as S;
    let code = match (op, ty.scalar_type()) {
        (BinaryOp::Add, S::float | S::double) => Op::FAdd,
        (BinaryOp::Add, _) => Op::IAdd,
        (BinaryOp::Sub, S::float | S::double) => Op::FSub,
        (BinaryOp::Sub, _) => Op::ISub,
        (BinaryOp::Div, S::float | S::double) => Op::FDiv,
        (BinaryOp::Div, S::uint) => Op::UDiv,
        (BinaryOp::Div, _) => Op::SDiv,
        (op, _) => unreachable!("{op} is not arithmetic"),
    };

    if ty.is_matrix() {
        return per_column(writer, code, ty, (l, &lty), (r, &rty));
    }
    let l = broadcast(writer, l, &lty, ty);
    let r = broadcast(writer, r, &rty, ty);
    writer.code(code, ty, &[l, r])
}

/// Divides by multiplying with the reciprocal of the divisor.
fn write_matrix_division(
    writer: &mut SpvWriter,
    ty: &Type,
    (l, lty): (u32, Type),
    (r, rty): (u32, Type),
) -> u32 {
    let reciprocal = if rty.is_matrix() {
        let column = column_type(&rty);
        let ones = writer.get_id_for_one(&column);
        let columns: Vec<u32> = (0..rty.length() as u32)
            .map(|i| {
                let c = writer.code(Op::CompositeExtract, &column, &[r, i]);
                writer.code(Op::FDiv, &column, &[ones, c])
            })
            .collect();
        writer.code(Op::CompositeConstruct, &rty, &columns)
    } else {
        let one = writer.get_id_for_one(&rty);
        writer.code(Op::FDiv, &rty, &[one, r])
    };

    match (&lty, &rty) {
        (Type::Scalar(_), _) => writer.code(Op::MatrixTimesScalar, ty, &[reciprocal, l]),
        (_, Type::Scalar(_)) => writer.code(Op::MatrixTimesScalar, ty, &[l, reciprocal]),
        _ => per_column(writer, Op::FMul, ty, (l, &lty), (reciprocal, &rty)),
    }
}

/// Applies `op` to each column of a matrix result. Scalar operands are
/// splatted to a column first.
fn per_column(
    writer: &mut SpvWriter,
    op: Op,
    ty: &Type,
    (l, lty): (u32, &Type),
    (r, rty): (u32, &Type),
) -> u32 {
    let column = column_type(ty);
    let l_splat = lty.is_scalar().then(|| writer.splat(l, &column));
    let r_splat = rty.is_scalar().then(|| writer.splat(r, &column));

    let mut columns = Vec::with_capacity(ty.length());
    for i in 0..ty.length() as u32 {
        let a = match l_splat {
            Some(id) => id,
            None => writer.code(Op::CompositeExtract, &column, &[l, i]),
        };
        let b = match r_splat {
            Some(id) => id,
            None => writer.code(Op::CompositeExtract, &column, &[r, i]),
        };
        columns.push(writer.code(op, &column, &[a, b]));
    }
    writer.code(Op::CompositeConstruct, ty, &columns)
}

/// Compares two values of type `ty` as a whole.
fn write_equality(writer: &mut SpvWriter, equal: bool, ty: &Type, l: u32, r: u32) -> u32 {
    use ScalarType as S;

    let compare = match (equal, ty.scalar_type()) {
        (true, S::bool) => Op::LogicalEqual,
        (true, S::float | S::double) => Op::FOrdEqual,
        (true, _) => Op::IEqual,
        (false, S::bool) => Op::LogicalNotEqual,
        (false, S::float | S::double) => Op::FUnordNotEqual,
        (false, _) => Op::INotEqual,
    };
    let reduce = if equal { Op::All } else { Op::Any };

    match ty {
        Type::Scalar(_) => writer.code(compare, &Type::BOOL, &[l, r]),
        Type::Vector { length, .. } => {
            let bvec = Type::vector(S::bool, *length);
            let components = writer.code(compare, &bvec, &[l, r]);
            writer.code(reduce, &Type::BOOL, &[components])
        }
        Type::Matrix { columns, .. } => {
            let column = column_type(ty);
            let combine = if equal { Op::LogicalAnd } else { Op::LogicalOr };

            let mut result = None;
            for i in 0..*columns as u32 {
                let a = writer.code(Op::CompositeExtract, &column, &[l, i]);
                let b = writer.code(Op::CompositeExtract, &column, &[r, i]);
                let column_result = write_equality(writer, equal, &column, a, b);
                result = Some(match result {
                    Some(acc) => writer.code(combine, &Type::BOOL, &[acc, column_result]),
                    None => column_result,
                });
            }
            result.unwrap_or_else(|| unreachable!("matrix without columns"))
        }
        Type::Struct(_) => unreachable!("comparison of structs"),
    }
}

fn write_negation(writer: &mut SpvWriter, ty: &Type, id: u32) -> u32 {
    let op = if ty.scalar_type().is_floating() {
        Op::FNegate
    } else {
        Op::SNegate
    };

    if !ty.is_matrix() {
        return writer.code(op, ty, &[id]);
    }
    let column = column_type(ty);
    let columns: Vec<u32> = (0..ty.length() as u32)
        .map(|i| {
            let c = writer.code(Op::CompositeExtract, &column, &[id, i]);
            writer.code(op, &column, &[c])
        })
        .collect();
    writer.code(Op::CompositeConstruct, ty, &columns)
}

/// Builtin constructor of a scalar, vector or matrix type.
fn write_constructor(writer: &mut SpvWriter, ty: &Type, arguments: &[(u32, Type)]) -> u32 {
    let scalar = ty.scalar_type();

    match (ty, arguments) {
        (_, [(id, arg_ty)]) if arg_ty.is_scalar() => {
            let (value, _) = convert_to(writer, (*id, arg_ty.clone()), scalar);
            match ty {
                Type::Matrix { columns, rows, .. } => {
                    let column = column_type(ty);
                    let zero = writer.get_id_for_zero(&Type::Scalar(scalar));

                    let mut column_ids = Vec::with_capacity(*columns as usize);
                    for col in 0..*columns {
                        let components: Vec<u32> = (0..*rows)
                            .map(|row| if row == col { value } else { zero })
                            .collect();
                        column_ids.push(writer.code(Op::CompositeConstruct, &column, &components));
                    }
                    writer.code(Op::CompositeConstruct, ty, &column_ids)
                }
                _ => writer.splat(value, ty),
            }
        }
        (Type::Matrix { columns, rows, .. }, [(id, arg_ty)]) if arg_ty.is_matrix() => {
            let (source, source_ty) = convert_to(writer, (*id, arg_ty.clone()), scalar);
            let source_columns = source_ty.length() as u8;
            let source_rows = column_type(&source_ty).length() as u8;

            let column = column_type(ty);
            let zero = writer.get_id_for_zero(&Type::Scalar(scalar));
            let one = writer.get_id_for_one(&Type::Scalar(scalar));

            let mut column_ids = Vec::with_capacity(*columns as usize);
            for col in 0..*columns {
                let components: Vec<u32> = (0..*rows)
                    .map(|row| {
                        if col < source_columns && row < source_rows {
                            let indexes = [source, col as u32, row as u32];
                            writer.code(Op::CompositeExtract, &Type::Scalar(scalar), &indexes)
                        } else if col == row {
                            one
                        } else {
                            zero
                        }
                    })
                    .collect();
                column_ids.push(writer.code(Op::CompositeConstruct, &column, &components));
            }
            writer.code(Op::CompositeConstruct, ty, &column_ids)
        }
        _ => {
            let components = gather_components(writer, scalar, arguments, ty.n_components());
            match ty {
                Type::Scalar(_) => components[0],
                Type::Vector { .. } => writer.code(Op::CompositeConstruct, ty, &components),
                Type::Matrix { rows, .. } => {
                    let column = column_type(ty);
                    let column_ids: Vec<u32> = components
                        .chunks(*rows as usize)
                        .map(|c| writer.code(Op::CompositeConstruct, &column, c))
                        .collect();
                    writer.code(Op::CompositeConstruct, ty, &column_ids)
                }
                Type::Struct(_) => unreachable!("builtin constructor of a struct"),
            }
        }
    }
}

/// The first `count` components of all arguments, in order, converted to
/// `scalar`.
fn gather_components(
    writer: &mut SpvWriter,
    scalar: ScalarType,
    arguments: &[(u32, Type)],
    count: usize,
) -> Vec<u32> {
    let component_ty = Type::Scalar(scalar);

    let mut components = Vec::with_capacity(count);
    for (id, ty) in arguments {
        if components.len() >= count {
            break;
        }
        let (id, ty) = convert_to(writer, (*id, ty.clone()), scalar);
        match &ty {
            Type::Scalar(_) => components.push(id),
            Type::Vector { length, .. } => {
                for i in 0..*length as u32 {
                    components.push(writer.code(Op::CompositeExtract, &component_ty, &[id, i]));
                }
            }
            Type::Matrix { columns, rows, .. } => {
                for col in 0..*columns as u32 {
                    for row in 0..*rows as u32 {
                        let indexes = [id, col, row];
                        components.push(writer.code(Op::CompositeExtract, &component_ty, &indexes));
                    }
                }
            }
            Type::Struct(_) => unreachable!("struct argument to builtin constructor"),
        }
    }
    components.truncate(count);
    components
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use insta::assert_snapshot;
    use itertools::Itertools;
    use spvsl_bin::spv::{decode_instructions, Section};
    use spvsl_bin::{Scalar, Value};

    use super::*;
    use crate::compile::CompileParams;
    use crate::variable::{Qualifier, StorageClass, Variable};

    fn writer() -> SpvWriter {
        SpvWriter::new(CompileParams {
            debug_names: false,
            ..Default::default()
        })
    }

    fn code(writer: &SpvWriter) -> String {
        decode_instructions(writer.section(Section::Code))
            .unwrap()
            .iter()
            .map(|i| format!("Op{:?}", i.op))
            .join("\n")
    }

    fn variable(id: u32, name: &str, ty: Type) -> Expression {
        Expression::Reference(Rc::new(Variable {
            id: id.into(),
            name: name.into(),
            ty,
            qualifier: Qualifier::new(StorageClass::Local),
            initial_value: None,
        }))
    }

    fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
        let ty = op.check(&left.return_type(), &right.return_type()).unwrap();
        Expression::new_binary(op, left, right, ty)
    }

    #[test]
    fn constants_are_folded() {
        let mut w = writer();
        let expr = binary(
            BinaryOp::Mul,
            Expression::Constant(Value::from_scalar(2)),
            Expression::Constant(Value::from_scalar(3.0f32)),
        );
        expr.write_spv(&mut w);
        assert_eq!(code(&w), "");
    }

    #[test]
    fn constants_without_folding() {
        let mut w = SpvWriter::new(CompileParams {
            fold_constants: false,
            ..Default::default()
        });
        let expr = binary(
            BinaryOp::Mul,
            Expression::Constant(Value::from_scalar(2)),
            Expression::Constant(Value::from_scalar(3.0f32)),
        );
        expr.write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpConvertSToF
        OpFMul
        ");
    }

    #[test]
    fn linear_algebra() {
        let mut w = writer();
        let m = variable(0, "m", Type::matrix(ScalarType::float, 3, 3));
        let v = variable(1, "v", Type::vector(ScalarType::float, 3));

        binary(BinaryOp::Mul, m.clone(), v.clone()).write_spv(&mut w);
        binary(BinaryOp::Mul, v.clone(), m.clone()).write_spv(&mut w);
        binary(BinaryOp::Mul, v, Expression::Constant(Value::from_scalar(2.0f32))).write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpLoad
        OpMatrixTimesVector
        OpLoad
        OpLoad
        OpVectorTimesMatrix
        OpLoad
        OpVectorTimesScalar
        ");
    }

    #[test]
    fn integer_vector_scaling() {
        let mut w = writer();
        let v = variable(0, "v", Type::vector(ScalarType::int, 2));
        binary(BinaryOp::Mul, Expression::Constant(Value::from_scalar(3)), v).write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpCompositeConstruct
        OpIMul
        ");
    }

    #[test]
    fn division_by_matrix() {
        let mut w = writer();
        let m = variable(0, "m", Type::matrix(ScalarType::float, 2, 2));
        binary(BinaryOp::Div, Expression::Constant(Value::from_scalar(1.0f32)), m).write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpCompositeExtract
        OpFDiv
        OpCompositeExtract
        OpFDiv
        OpCompositeConstruct
        OpMatrixTimesScalar
        ");
    }

    #[test]
    fn vector_equality() {
        let mut w = writer();
        let a = variable(0, "a", Type::vector(ScalarType::uint, 3));
        let b = variable(1, "b", Type::vector(ScalarType::int, 3));
        binary(BinaryOp::Ne, a, b).write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpLoad
        OpBitcast
        OpINotEqual
        OpAny
        ");
    }

    #[test]
    fn shift_of_vector_by_scalar() {
        let mut w = writer();
        let v = variable(0, "v", Type::vector(ScalarType::int, 2));
        binary(BinaryOp::Shr, v, Expression::Constant(Value::from_scalar(1u32))).write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpCompositeConstruct
        OpShiftRightArithmetic
        ");
    }

    #[test]
    fn matrix_from_scalar() {
        let mut w = writer();
        let f = variable(0, "f", Type::FLOAT);
        let ctor = Expression::Constructor {
            ty: Type::matrix(ScalarType::float, 2, 2),
            arguments: vec![f],
        };
        ctor.write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpCompositeConstruct
        OpCompositeConstruct
        OpCompositeConstruct
        ");

        // the diagonal holds the argument, everything else is zero
        let define = decode_instructions(w.section(Section::Define)).unwrap();
        assert!(define
            .iter()
            .any(|i| i.op == Op::Constant && i.operands[2] == Scalar::Float(0.0).to_words()[0]));
    }

    #[test]
    fn compound_assignment() {
        let mut w = writer();
        let v = variable(0, "v", Type::vector(ScalarType::float, 2));
        let assignment = Expression::Assignment(Box::new(Assignment {
            lvalue: v,
            op: Some(BinaryOp::Mul),
            rvalue: Expression::Constant(Value::from_scalar(2.0f32)),
            ty: Type::vector(ScalarType::float, 2),
        }));
        assignment.write_spv(&mut w);
        assert_snapshot!(code(&w), @r"
        OpLoad
        OpVectorTimesScalar
        OpStore
        ");
    }
}
