//! Result types of binary operators.
//!
//! Each operator family has its own rules for combining operand shapes.
//! Failures are returned as messages, which the parser reports as
//! [crate::diagnostic::DiagnosticCode::TYPE_MISMATCH].

use spvsl_bin::{ScalarType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum BinaryOp {
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "%")]
    Mod,
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "<<")]
    Shl,
    #[strum(to_string = ">>")]
    Shr,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = "<=")]
    Le,
    #[strum(to_string = ">=")]
    Ge,
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    Ne,
    #[strum(to_string = "&")]
    BitAnd,
    #[strum(to_string = "^")]
    BitXor,
    #[strum(to_string = "|")]
    BitOr,
    #[strum(to_string = "&&")]
    And,
    #[strum(to_string = "^^")]
    Xor,
    #[strum(to_string = "||")]
    Or,
}

/// How an operator's operands are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    Multiplication,
    Arithmetic,
    Modulo,
    Shift,
    Bitwise,
    Relational,
    Equality,
    Logical,
}

impl BinaryOp {
    pub fn family(self) -> OpFamily {
        use BinaryOp::*;

        match self {
            Mul => OpFamily::Multiplication,
            Div | Add | Sub => OpFamily::Arithmetic,
            Mod => OpFamily::Modulo,
            Shl | Shr => OpFamily::Shift,
            BitAnd | BitXor | BitOr => OpFamily::Bitwise,
            Lt | Gt | Le | Ge => OpFamily::Relational,
            Eq | Ne => OpFamily::Equality,
            And | Xor | Or => OpFamily::Logical,
        }
    }

    /// Binding strength. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;

        match self {
            Mul | Div | Mod => 12,
            Add | Sub => 11,
            Shl | Shr => 10,
            Lt | Gt | Le | Ge => 9,
            Eq | Ne => 8,
            BitAnd => 7,
            BitXor => 6,
            BitOr => 5,
            And => 4,
            Xor => 3,
            Or => 2,
        }
    }

    /// Type of `left <op> right`.
    pub fn check(self, left: &Type, right: &Type) -> Result<Type, String> {
        match self.family() {
            OpFamily::Multiplication => multiplication_type_check(left, right),
            OpFamily::Arithmetic => arithmetic_type_check(left, right),
            OpFamily::Modulo | OpFamily::Bitwise => bitwise_type_check(left, right),
            OpFamily::Shift => shift_type_check(left, right),
            OpFamily::Relational => relational_type_check(left, right),
            OpFamily::Equality => equality_type_check(left, right),
            OpFamily::Logical => logical_type_check(left, right),
        }
    }
}

/// Scalar type both operands are converted to before they are combined.
pub fn common_scalar_type(left: &Type, right: &Type) -> Result<ScalarType, String> {
    let l = left.scalar_type();
    let r = right.scalar_type();
    if ScalarType::can_convert(l, r) {
        Ok(r)
    } else if ScalarType::can_convert(r, l) {
        Ok(l)
    } else {
        Err(format!(
            "Operand types {left} and {right} do not share compatible scalar types."
        ))
    }
}

fn ensure_basic(left: &Type, right: &Type) -> Result<(), String> {
    for ty in [left, right] {
        if !ty.is_basic() {
            return Err(format!(
                "Operand types {left} and {right} are not scalars, vectors or matrices."
            ));
        }
    }
    Ok(())
}

fn multiplication_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    ensure_basic(left, right)?;
    if left.scalar_type() == ScalarType::bool || right.scalar_type() == ScalarType::bool {
        return Err("Cannot multiply booleans.".into());
    }
    let scalar = common_scalar_type(left, right)?;

    match (left, right) {
        (
            Type::Matrix {
                columns: lc,
                rows: lr,
                ..
            },
            Type::Matrix {
                columns: rc,
                rows: rr,
                ..
            },
        ) => {
            if lc != rr {
                return Err(format!(
                    "Matrices to multiplication have incompatible dimensions: {left} and {right}."
                ));
            }
            Ok(Type::matrix(scalar, *rc, *lr))
        }
        (Type::Matrix { columns, rows, .. }, Type::Vector { length, .. }) => {
            if columns != length {
                return Err(format!(
                    "Matrix column count doesn't match vector length: {left} and {right}."
                ));
            }
            Ok(Type::vector(scalar, *rows))
        }
        (Type::Vector { length, .. }, Type::Matrix { columns, rows, .. }) => {
            if length != rows {
                return Err(format!(
                    "Vector length doesn't match matrix row count: {left} and {right}."
                ));
            }
            Ok(Type::vector(scalar, *columns))
        }
        (Type::Vector { length: ll, .. }, Type::Vector { length: rl, .. }) => {
            if ll != rl {
                return Err(format!(
                    "Vector operands {left} and {right} to multiplication have different length."
                ));
            }
            Ok(Type::vector(scalar, *ll))
        }
        (Type::Scalar(_), other) | (other, Type::Scalar(_)) => Ok(other.matching(scalar)),
        _ => unreachable!("operands are basic"),
    }
}

fn arithmetic_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    ensure_basic(left, right)?;
    if left.scalar_type() == ScalarType::bool || right.scalar_type() == ScalarType::bool {
        return Err(format!(
            "Operand types {left} and {right} are booleans, which do not support arithmetic."
        ));
    }
    let scalar = common_scalar_type(left, right)?;

    match (left, right) {
        (Type::Matrix { .. }, Type::Matrix { .. }) => {
            if left.length() != right.length() || left.index_type() != right.index_type() {
                return Err(format!("Matrix types {left} and {right} have different size."));
            }
            Ok(left.matching(scalar))
        }
        (Type::Matrix { .. }, Type::Vector { .. }) | (Type::Vector { .. }, Type::Matrix { .. }) => {
            Err(format!(
                "Cannot perform arithmetic on vector {} and matrix {}.",
                if left.is_vector() { left } else { right },
                if left.is_matrix() { left } else { right },
            ))
        }
        (Type::Vector { length: ll, .. }, Type::Vector { length: rl, .. }) => {
            if ll != rl {
                return Err(format!(
                    "Vector operands {left} and {right} to arithmetic operation have different length."
                ));
            }
            Ok(Type::vector(scalar, *ll))
        }
        (Type::Scalar(_), other) | (other, Type::Scalar(_)) => Ok(other.matching(scalar)),
        _ => unreachable!("operands are basic"),
    }
}

fn ensure_integer_scalar_or_vector(left: &Type, right: &Type) -> Result<(), String> {
    for ty in [left, right] {
        if !(ty.is_scalar() || ty.is_vector()) || !ty.scalar_type().is_integer() {
            return Err(format!(
                "Operand types {left} and {right} must be integer scalars or vectors."
            ));
        }
    }
    Ok(())
}

fn bitwise_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    ensure_integer_scalar_or_vector(left, right)?;

    let scalar = if left.scalar_type() == ScalarType::uint || right.scalar_type() == ScalarType::uint
    {
        ScalarType::uint
    } else {
        ScalarType::int
    };

    match (left, right) {
        (Type::Vector { length: ll, .. }, Type::Vector { length: rl, .. }) if ll != rl => Err(
            format!("Vector operands {left} and {right} do not have the same length."),
        ),
        (Type::Vector { length, .. }, _) | (_, Type::Vector { length, .. }) => {
            Ok(Type::vector(scalar, *length))
        }
        _ => Ok(Type::Scalar(scalar)),
    }
}

fn shift_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    ensure_integer_scalar_or_vector(left, right)?;

    match (left, right) {
        (Type::Scalar(_), Type::Vector { .. }) => Err(format!(
            "Right operand {right} to shift cannot be a vector if left operand {left} is a scalar."
        )),
        (Type::Vector { length: ll, .. }, Type::Vector { length: rl, .. }) if ll != rl => Err(
            format!("Vector operands {left} and {right} do not have the same length."),
        ),
        _ => Ok(left.clone()),
    }
}

fn relational_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    for ty in [left, right] {
        if !ty.is_scalar() || ty.scalar_type() == ScalarType::bool || ty.is_void() {
            return Err(format!(
                "Operand types {left} and {right} must be non-boolean scalars."
            ));
        }
    }
    common_scalar_type(left, right)?;
    Ok(Type::BOOL)
}

fn equality_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    ensure_basic(left, right)?;
    if !Type::can_convert(left, right) && !Type::can_convert(right, left) {
        return Err(format!("Cannot compare types {left} and {right}."));
    }
    Ok(Type::BOOL)
}

fn logical_type_check(left: &Type, right: &Type) -> Result<Type, String> {
    for ty in [left, right] {
        if !Type::can_convert(ty, &Type::BOOL) {
            return Err(format!(
                "Operand types {left} and {right} cannot both be converted to bool."
            ));
        }
    }
    Ok(Type::BOOL)
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use super::*;

    fn mat(columns: u8, rows: u8) -> Type {
        Type::matrix(ScalarType::float, columns, rows)
    }

    fn vec(length: u8) -> Type {
        Type::vector(ScalarType::float, length)
    }

    #[test]
    fn matrix_multiplication() {
        let m = mat(3, 2);
        let n = mat(2, 3);

        assert_eq!(BinaryOp::Mul.check(&m, &n), Ok(mat(2, 2)));
        assert_eq!(BinaryOp::Mul.check(&n, &m), Ok(mat(3, 3)));
        assert_snapshot!(BinaryOp::Mul.check(&m, &m).unwrap_err(), @"Matrices to multiplication have incompatible dimensions: mat3x2 and mat3x2.");

        assert_eq!(BinaryOp::Mul.check(&m, &vec(3)), Ok(vec(2)));
        assert_eq!(BinaryOp::Mul.check(&vec(2), &m), Ok(vec(3)));
        assert!(BinaryOp::Mul.check(&m, &vec(2)).is_err());
        assert_eq!(BinaryOp::Mul.check(&Type::INT, &m), Ok(m.clone()));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(BinaryOp::Add.check(&Type::INT, &Type::FLOAT), Ok(Type::FLOAT));
        assert_eq!(BinaryOp::Sub.check(&Type::UINT, &Type::INT), Ok(Type::UINT));
        assert_eq!(BinaryOp::Div.check(&vec(3), &Type::INT), Ok(vec(3)));
        assert_eq!(BinaryOp::Add.check(&mat(2, 3), &mat(2, 3)), Ok(mat(2, 3)));

        assert_snapshot!(BinaryOp::Add.check(&mat(2, 3), &mat(3, 2)).unwrap_err(), @"Matrix types mat2x3 and mat3x2 have different size.");
        assert_snapshot!(BinaryOp::Add.check(&vec(3), &mat(3, 3)).unwrap_err(), @"Cannot perform arithmetic on vector vec3 and matrix mat3.");
        assert_snapshot!(BinaryOp::Add.check(&Type::FLOAT, &Type::BOOL).unwrap_err(), @"Operand types float and bool are booleans, which do not support arithmetic.");
        assert_snapshot!(BinaryOp::Add.check(&Type::DOUBLE, &Type::FLOAT).unwrap(), @"double");
    }

    #[test]
    fn unsigned_contamination() {
        let ivec3 = Type::vector(ScalarType::int, 3);
        let uvec3 = Type::vector(ScalarType::uint, 3);

        assert_eq!(BinaryOp::BitAnd.check(&Type::INT, &Type::INT), Ok(Type::INT));
        assert_eq!(BinaryOp::BitOr.check(&ivec3, &Type::UINT), Ok(uvec3.clone()));
        assert_eq!(BinaryOp::Mod.check(&uvec3, &ivec3), Ok(uvec3));
        assert!(BinaryOp::BitXor.check(&Type::FLOAT, &Type::INT).is_err());
    }

    #[test]
    fn shift_keeps_left_type() {
        let ivec2 = Type::vector(ScalarType::int, 2);
        let uvec2 = Type::vector(ScalarType::uint, 2);

        assert_eq!(BinaryOp::Shl.check(&ivec2, &Type::UINT), Ok(ivec2.clone()));
        assert_eq!(BinaryOp::Shr.check(&ivec2, &uvec2), Ok(ivec2.clone()));
        assert_snapshot!(BinaryOp::Shl.check(&Type::INT, &ivec2).unwrap_err(), @"Right operand ivec2 to shift cannot be a vector if left operand int is a scalar.");
    }

    #[test]
    fn comparisons() {
        assert_eq!(BinaryOp::Lt.check(&Type::INT, &Type::FLOAT), Ok(Type::BOOL));
        assert!(BinaryOp::Lt.check(&vec(2), &vec(2)).is_err());
        assert!(BinaryOp::Ge.check(&Type::BOOL, &Type::BOOL).is_err());

        assert_eq!(BinaryOp::Eq.check(&vec(2), &vec(2)), Ok(Type::BOOL));
        assert_eq!(BinaryOp::Ne.check(&Type::INT, &Type::DOUBLE), Ok(Type::BOOL));
        assert!(BinaryOp::Eq.check(&vec(2), &vec(3)).is_err());

        assert_eq!(BinaryOp::Xor.check(&Type::BOOL, &Type::BOOL), Ok(Type::BOOL));
        assert!(BinaryOp::Or.check(&Type::BOOL, &Type::INT).is_err());
    }
}
