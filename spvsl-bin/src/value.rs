use std::fmt;

use itertools::Itertools;

use crate::{Error, Result, ScalarType, Type};

/// One scalar component of a [Value].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f32),
    Double(f64),
    Int(i32),
    Uint(u32),
    Bool(bool),
}

impl Scalar {
    pub fn zero(ty: ScalarType) -> Scalar {
        Scalar::Int(0).convert(ty)
    }

    pub fn one(ty: ScalarType) -> Scalar {
        Scalar::Int(1).convert(ty)
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Float(_) => ScalarType::float,
            Scalar::Double(_) => ScalarType::double,
            Scalar::Int(_) => ScalarType::int,
            Scalar::Uint(_) => ScalarType::uint,
            Scalar::Bool(_) => ScalarType::bool,
        }
    }

    /// Converts with C cast semantics. Float to integer casts saturate.
    pub fn convert(self, to: ScalarType) -> Scalar {
        match to {
            ScalarType::float => Scalar::Float(match self {
                Scalar::Float(v) => v,
                Scalar::Double(v) => v as f32,
                Scalar::Int(v) => v as f32,
                Scalar::Uint(v) => v as f32,
                Scalar::Bool(v) => v as u8 as f32,
            }),
            ScalarType::double => Scalar::Double(match self {
                Scalar::Float(v) => v as f64,
                Scalar::Double(v) => v,
                Scalar::Int(v) => v as f64,
                Scalar::Uint(v) => v as f64,
                Scalar::Bool(v) => v as u8 as f64,
            }),
            ScalarType::int => Scalar::Int(match self {
                Scalar::Float(v) => v as i32,
                Scalar::Double(v) => v as i32,
                Scalar::Int(v) => v,
                Scalar::Uint(v) => v as i32,
                Scalar::Bool(v) => v as i32,
            }),
            ScalarType::uint => Scalar::Uint(match self {
                Scalar::Float(v) => v as u32,
                Scalar::Double(v) => v as u32,
                Scalar::Int(v) => v as u32,
                Scalar::Uint(v) => v,
                Scalar::Bool(v) => v as u32,
            }),
            ScalarType::bool => Scalar::Bool(match self {
                Scalar::Float(v) => v != 0.0,
                Scalar::Double(v) => v != 0.0,
                Scalar::Int(v) => v != 0,
                Scalar::Uint(v) => v != 0,
                Scalar::Bool(v) => v,
            }),
            ScalarType::void => unreachable!("cannot convert to void"),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self.convert(ScalarType::double) {
            Scalar::Double(v) => v,
            _ => unreachable!(),
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self.convert(ScalarType::bool), Scalar::Bool(true))
    }

    fn read(ty: ScalarType, bytes: &[u8]) -> Scalar {
        let word = |b: &[u8]| [b[0], b[1], b[2], b[3]];
        match ty {
            ScalarType::float => Scalar::Float(f32::from_le_bytes(word(bytes))),
            ScalarType::int => Scalar::Int(i32::from_le_bytes(word(bytes))),
            ScalarType::uint => Scalar::Uint(u32::from_le_bytes(word(bytes))),
            ScalarType::bool => Scalar::Bool(u32::from_le_bytes(word(bytes)) != 0),
            ScalarType::double => {
                let mut buf = [0; 8];
                buf.copy_from_slice(&bytes[..8]);
                Scalar::Double(f64::from_le_bytes(buf))
            }
            ScalarType::void => unreachable!("void has no data"),
        }
    }

    fn write(self, out: &mut [u8]) {
        match self {
            Scalar::Float(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            Scalar::Double(v) => out[..8].copy_from_slice(&v.to_le_bytes()),
            Scalar::Int(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            Scalar::Uint(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            Scalar::Bool(v) => out[..4].copy_from_slice(&(v as u32).to_le_bytes()),
        }
    }

    /// Words of this scalar as SPIR-V literal operands (low-order word first).
    pub fn to_words(self) -> Vec<u32> {
        match self {
            Scalar::Float(v) => vec![v.to_bits()],
            Scalar::Double(v) => {
                let bits = v.to_bits();
                vec![bits as u32, (bits >> 32) as u32]
            }
            Scalar::Int(v) => vec![v as u32],
            Scalar::Uint(v) => vec![v],
            Scalar::Bool(v) => vec![v as u32],
        }
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Double(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Uint(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Float(v) => write!(f, "{v:?}"),
            Scalar::Double(v) => write!(f, "{v:?}lf"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Uint(v) => write!(f, "{v}u"),
            Scalar::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// A compile-time constant: a type and its little-endian bytes.
///
/// Matrices are stored column-major. Struct members are packed in
/// declaration order without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    ty: Type,
    data: Vec<u8>,
}

impl Value {
    /// A zero-initialized value.
    pub fn new(ty: Type) -> Value {
        let data = vec![0; ty.size()];
        Value { ty, data }
    }

    /// Adopts a buffer whose length must match the size of the type.
    pub fn for_data(ty: Type, data: Vec<u8>) -> Result<Value> {
        if ty.is_void() {
            return Err(Error::InvalidType { ty: ty.to_string() });
        }
        if data.len() != ty.size() {
            return Err(Error::InvalidData {
                ty: ty.to_string(),
                expected: ty.size(),
                found: data.len(),
            });
        }
        Ok(Value { ty, data })
    }

    pub fn from_scalar(scalar: impl Into<Scalar>) -> Value {
        let scalar = scalar.into();
        let mut value = Value::new(Type::Scalar(scalar.scalar_type()));
        value.set(0, scalar);
        value
    }

    /// Builds a value of a basic type from its components, converting each
    /// of them to the scalar type of `ty`.
    pub fn from_components(ty: Type, components: impl IntoIterator<Item = Scalar>) -> Value {
        let mut value = Value::new(ty);
        for (i, c) in components.into_iter().enumerate() {
            value.set(i, c);
        }
        value
    }

    /// Builds a struct value from one value per member.
    pub fn from_members(ty: Type, members: Vec<Value>) -> Result<Value> {
        let data: Vec<u8> = members
            .into_iter()
            .zip(ty.members())
            .map(|(v, m)| v.convert(&m.ty).map(Value::into_data))
            .flatten_ok()
            .try_collect()?;
        Value::for_data(ty, data)
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Reads component `index` of a basic value.
    pub fn get(&self, index: usize) -> Scalar {
        let scalar = self.ty.scalar_type();
        Scalar::read(scalar, &self.data[index * scalar.size()..])
    }

    /// Writes component `index`, converting to the scalar type of the value.
    pub fn set(&mut self, index: usize, component: Scalar) {
        let scalar = self.ty.scalar_type();
        let size = scalar.size();
        component
            .convert(scalar)
            .write(&mut self.data[index * size..(index + 1) * size]);
    }

    pub fn components(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.ty.n_components()).map(|i| self.get(i))
    }

    /// Element `index` of [Type::index_type]: a column of a matrix, a
    /// component of a vector.
    pub fn element(&self, index: usize) -> Option<Value> {
        let ty = self.ty.index_type()?;
        let stride = self.ty.index_stride();
        if index >= self.ty.length() {
            return None;
        }
        let data = self.data[index * stride..(index + 1) * stride].to_vec();
        Some(Value { ty, data })
    }

    pub fn member(&self, index: usize) -> Option<Value> {
        let member = self.ty.members().get(index)?;
        let offset = self.ty.member_offset(index);
        let data = self.data[offset..offset + member.ty.size()].to_vec();
        Some(Value {
            ty: member.ty.clone(),
            data,
        })
    }

    /// Converts component-wise into a type of the same shape.
    pub fn convert(&self, ty: &Type) -> Result<Value> {
        if &self.ty == ty {
            return Ok(self.clone());
        }
        if !self.ty.is_basic() || !ty.is_basic() || self.ty.n_components() != ty.n_components() {
            return Err(Error::TypeMismatch {
                expected: ty.to_string(),
                found: self.ty.to_string(),
            });
        }
        Ok(Value::from_components(ty.clone(), self.components()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Type::Scalar(_) => write!(f, "{}", self.get(0)),
            Type::Vector { .. } | Type::Matrix { .. } => {
                write!(f, "{}({})", self.ty, self.components().join(", "))
            }
            Type::Struct(_) => {
                let members = (0..self.ty.members().len()).filter_map(|i| self.member(i));
                write!(f, "{}({})", self.ty, members.format(", "))
            }
        }
    }
}
