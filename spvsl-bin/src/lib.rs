//! Data representation shared by the spvsl compiler: the GLSL type system,
//! compile-time constant values and SPIR-V binary word framing.

mod error;
mod ty;
mod value;

pub mod spv;

pub use error::{Error, Result};
pub use ty::{Member, ScalarType, StructType, Type};
pub use value::{Scalar, Value};
