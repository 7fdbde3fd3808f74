use std::fmt;
use std::rc::Rc;

use enum_as_inner::EnumAsInner;

/// Element type of every GLSL value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[allow(non_camel_case_types)]
pub enum ScalarType {
    void,
    float,
    double,
    int,
    uint,
    bool,
}

impl ScalarType {
    /// Size of one component in bytes. Booleans are stored as 32-bit words.
    pub fn size(self) -> usize {
        match self {
            ScalarType::void => 0,
            ScalarType::float | ScalarType::int | ScalarType::uint | ScalarType::bool => 4,
            ScalarType::double => 8,
        }
    }

    /// Can a value of type `from` be implicitly converted to `to`?
    ///
    /// Follows the GLSL promotion lattice: `int -> uint -> float -> double`.
    /// Never narrows and never converts to or from `bool`.
    pub fn can_convert(from: ScalarType, to: ScalarType) -> bool {
        use ScalarType as S;

        if from == to {
            return from != S::void;
        }
        matches!(
            (from, to),
            (S::int, S::uint | S::float | S::double)
                | (S::uint, S::float | S::double)
                | (S::float, S::double)
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(self, ScalarType::int | ScalarType::uint)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, ScalarType::float | ScalarType::double)
    }

    /// Prefix used by vector and matrix type names (`ivec3`, `dmat2`, ...).
    fn prefix(self) -> &'static str {
        match self {
            ScalarType::float => "",
            ScalarType::double => "d",
            ScalarType::int => "i",
            ScalarType::uint => "u",
            ScalarType::bool => "b",
            ScalarType::void => unreachable!("void has no vector types"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumAsInner)]
pub enum Type {
    Scalar(ScalarType),

    /// Length is 2..=4
    Vector {
        scalar: ScalarType,
        length: u8,
    },

    /// Column-major; both dimensions are 2..=4.
    Matrix {
        scalar: ScalarType,
        columns: u8,
        rows: u8,
    },

    Struct(Rc<StructType>),
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct StructType {
    /// Anonymous structs can only be constructed inline.
    pub name: Option<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub name: String,
    pub ty: Type,
}

impl Type {
    pub const VOID: Type = Type::Scalar(ScalarType::void);
    pub const BOOL: Type = Type::Scalar(ScalarType::bool);
    pub const INT: Type = Type::Scalar(ScalarType::int);
    pub const UINT: Type = Type::Scalar(ScalarType::uint);
    pub const FLOAT: Type = Type::Scalar(ScalarType::float);
    pub const DOUBLE: Type = Type::Scalar(ScalarType::double);

    pub fn vector(scalar: ScalarType, length: u8) -> Type {
        debug_assert!((2..=4).contains(&length));
        Type::Vector { scalar, length }
    }

    pub fn matrix(scalar: ScalarType, columns: u8, rows: u8) -> Type {
        debug_assert!((2..=4).contains(&columns) && (2..=4).contains(&rows));
        Type::Matrix {
            scalar,
            columns,
            rows,
        }
    }

    pub fn new_struct(name: Option<String>, members: Vec<Member>) -> Type {
        Type::Struct(Rc::new(StructType { name, members }))
    }

    /// Vector of `length` or a plain scalar when `length` is 1.
    pub fn vector_or_scalar(scalar: ScalarType, length: u8) -> Type {
        if length == 1 {
            Type::Scalar(scalar)
        } else {
            Type::vector(scalar, length)
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Scalar(ScalarType::void))
    }

    /// Scalars, vectors and matrices, excluding `void`.
    pub fn is_basic(&self) -> bool {
        match self {
            Type::Scalar(s) => *s != ScalarType::void,
            Type::Vector { .. } | Type::Matrix { .. } => true,
            Type::Struct(_) => false,
        }
    }

    /// Scalar type of components. Structs report `void`.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Type::Scalar(s) => *s,
            Type::Vector { scalar, .. } | Type::Matrix { scalar, .. } => *scalar,
            Type::Struct(_) => ScalarType::void,
        }
    }

    /// Number of elements reachable by indexing: 0 for scalars, components
    /// for vectors and columns for matrices.
    pub fn length(&self) -> usize {
        match self {
            Type::Scalar(_) | Type::Struct(_) => 0,
            Type::Vector { length, .. } => *length as usize,
            Type::Matrix { columns, .. } => *columns as usize,
        }
    }

    /// Number of scalar components. Structs have none in this sense,
    /// which keeps them out of builtin constructors.
    pub fn n_components(&self) -> usize {
        match self {
            Type::Scalar(ScalarType::void) => 0,
            Type::Scalar(_) => 1,
            Type::Vector { length, .. } => *length as usize,
            Type::Matrix { columns, rows, .. } => *columns as usize * *rows as usize,
            Type::Struct(_) => 0,
        }
    }

    /// Type of one element of [Type::length]: the column of a matrix or the
    /// scalar of a vector.
    pub fn index_type(&self) -> Option<Type> {
        match self {
            Type::Vector { scalar, .. } => Some(Type::Scalar(*scalar)),
            Type::Matrix { scalar, rows, .. } => Some(Type::vector(*scalar, *rows)),
            Type::Scalar(_) | Type::Struct(_) => None,
        }
    }

    /// Distance in bytes between consecutive elements of [Type::index_type].
    pub fn index_stride(&self) -> usize {
        match self {
            Type::Vector { scalar, .. } => scalar.size(),
            Type::Matrix { scalar, rows, .. } => scalar.size() * *rows as usize,
            Type::Scalar(_) | Type::Struct(_) => 0,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Type::Scalar(s) => s.size(),
            Type::Vector { .. } | Type::Matrix { .. } => {
                self.scalar_type().size() * self.n_components()
            }
            Type::Struct(s) => s.members.iter().map(|m| m.ty.size()).sum(),
        }
    }

    /// The same shape with a different scalar type.
    pub fn matching(&self, scalar: ScalarType) -> Type {
        match self {
            Type::Scalar(_) => Type::Scalar(scalar),
            Type::Vector { length, .. } => Type::vector(scalar, *length),
            Type::Matrix { columns, rows, .. } => Type::matrix(scalar, *columns, *rows),
            Type::Struct(_) => unreachable!("structs have no matching type"),
        }
    }

    /// Can a value of type `from` be implicitly converted to `to`?
    ///
    /// Shapes must be identical; only the scalar type may widen.
    pub fn can_convert(from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Scalar(f), Type::Scalar(t)) => ScalarType::can_convert(*f, *t),
            (
                Type::Vector {
                    scalar: f,
                    length: fl,
                },
                Type::Vector {
                    scalar: t,
                    length: tl,
                },
            ) => fl == tl && ScalarType::can_convert(*f, *t),
            (
                Type::Matrix {
                    scalar: f,
                    columns: fc,
                    rows: fr,
                },
                Type::Matrix {
                    scalar: t,
                    columns: tc,
                    rows: tr,
                },
            ) => fc == tc && fr == tr && ScalarType::can_convert(*f, *t),
            (Type::Struct(f), Type::Struct(t)) => f == t,
            _ => false,
        }
    }

    /// Finds a struct member by name.
    pub fn member(&self, name: &str) -> Option<(usize, &Member)> {
        let Type::Struct(s) = self else {
            return None;
        };
        s.members.iter().enumerate().find(|(_, m)| m.name == name)
    }

    pub fn members(&self) -> &[Member] {
        match self {
            Type::Struct(s) => &s.members,
            _ => &[],
        }
    }

    /// Byte offset of struct member `index` within a value.
    pub fn member_offset(&self, index: usize) -> usize {
        self.members()[..index].iter().map(|m| m.ty.size()).sum()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(s) => write!(f, "{s}"),
            Type::Vector { scalar, length } => write!(f, "{}vec{length}", scalar.prefix()),
            Type::Matrix {
                scalar,
                columns,
                rows,
            } => {
                if columns == rows {
                    write!(f, "{}mat{columns}", scalar.prefix())
                } else {
                    write!(f, "{}mat{columns}x{rows}", scalar.prefix())
                }
            }
            Type::Struct(s) => match &s.name {
                Some(name) => f.write_str(name),
                None => {
                    f.write_str("struct { ")?;
                    for m in &s.members {
                        write!(f, "{} {}; ", m.ty, m.name)?;
                    }
                    f.write_str("}")
                }
            },
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn scalar_conversion_is_asymmetric() {
        for a in ScalarType::iter() {
            for b in ScalarType::iter() {
                if a == b {
                    continue;
                }
                assert!(
                    !(ScalarType::can_convert(a, b) && ScalarType::can_convert(b, a)),
                    "{a} and {b} convert both ways"
                );
            }
        }

        assert!(ScalarType::can_convert(ScalarType::int, ScalarType::float));
        assert!(!ScalarType::can_convert(ScalarType::float, ScalarType::int));
        assert!(!ScalarType::can_convert(ScalarType::uint, ScalarType::int));
        assert!(!ScalarType::can_convert(ScalarType::double, ScalarType::float));
        assert!(!ScalarType::can_convert(ScalarType::int, ScalarType::bool));
        assert!(!ScalarType::can_convert(ScalarType::bool, ScalarType::int));
    }

    #[test]
    fn names() {
        let names = [
            Type::FLOAT,
            Type::vector(ScalarType::float, 3),
            Type::vector(ScalarType::bool, 2),
            Type::vector(ScalarType::uint, 4),
            Type::matrix(ScalarType::float, 2, 2),
            Type::matrix(ScalarType::float, 3, 2),
            Type::matrix(ScalarType::double, 4, 3),
        ]
        .map(|t| t.to_string());

        assert_eq!(
            names,
            ["float", "vec3", "bvec2", "uvec4", "mat2", "mat3x2", "dmat4x3"]
        );
    }

    #[test]
    fn shape() {
        let m = Type::matrix(ScalarType::double, 3, 2);

        assert_eq!(m.length(), 3);
        assert_eq!(m.n_components(), 6);
        assert_eq!(m.size(), 48);
        assert_eq!(m.index_type(), Some(Type::vector(ScalarType::double, 2)));
        assert_eq!(m.index_stride(), 16);
        assert_eq!(m.matching(ScalarType::float).size(), 24);

        assert_eq!(Type::FLOAT.length(), 0);
        assert_eq!(Type::FLOAT.n_components(), 1);
        assert_eq!(Type::VOID.n_components(), 0);
    }

    #[test]
    fn shape_conversion() {
        let ivec3 = Type::vector(ScalarType::int, 3);
        let vec3 = Type::vector(ScalarType::float, 3);
        let vec2 = Type::vector(ScalarType::float, 2);

        assert!(Type::can_convert(&ivec3, &vec3));
        assert!(!Type::can_convert(&vec3, &ivec3));
        assert!(!Type::can_convert(&vec2, &vec3));
        assert!(!Type::can_convert(&Type::FLOAT, &vec3));
    }

    #[test]
    fn struct_members() {
        let s = Type::new_struct(
            Some("Light".into()),
            vec![
                Member {
                    name: "color".into(),
                    ty: Type::vector(ScalarType::float, 3),
                },
                Member {
                    name: "intensity".into(),
                    ty: Type::FLOAT,
                },
            ],
        );

        assert_eq!(s.to_string(), "Light");
        assert_eq!(s.size(), 16);
        assert_eq!(s.member("intensity").map(|(i, _)| i), Some(1));
        assert_eq!(s.member_offset(1), 12);
        assert!(s.member("position").is_none());
    }
}
