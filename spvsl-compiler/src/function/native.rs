//! GLSL builtin functions.
//!
//! Overloads are generated from each function's signature family. Constant
//! evaluation is done component-wise in `f64` and converted to the result
//! type afterwards. Integer overloads use wrapping 32-bit arithmetic.

use spirv::GLOp;
use spvsl_bin::{Scalar, ScalarType, Type, Value};
use strum::IntoEnumIterator;

use crate::spirv::SpvWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Native {
    Radians,
    Degrees,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Pow,
    Exp,
    Log,
    Exp2,
    Log2,
    Sqrt,
    Inversesqrt,
    Abs,
    Sign,
    Floor,
    Trunc,
    Round,
    RoundEven,
    Ceil,
    Fract,
    Mod,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    Smoothstep,
    Isnan,
    Isinf,
    Length,
    Distance,
    Dot,
    Cross,
    Normalize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeOverload {
    pub native: Native,
    pub return_type: Type,
    pub parameters: Vec<Type>,
}

/// `genType`, `genIType`, ... : the scalar and its vectors.
fn gen_types(scalar: ScalarType) -> impl Iterator<Item = Type> {
    (1..=4).map(move |len| Type::vector_or_scalar(scalar, len))
}

const FLOAT: ScalarType = ScalarType::float;
const NUMERIC: [ScalarType; 3] = [ScalarType::float, ScalarType::int, ScalarType::uint];

impl Native {
    /// Every overload of this function.
    pub fn overloads(self) -> Vec<NativeOverload> {
        use Native::*;

        let mut res = Vec::new();
        let mut add = |ret: &Type, params: &[&Type]| {
            res.push(NativeOverload {
                native: self,
                return_type: ret.clone(),
                parameters: params.iter().map(|t| (*t).clone()).collect(),
            })
        };

        match self {
            Radians | Degrees | Sin | Cos | Tan | Asin | Acos | Exp | Log | Exp2 | Log2 | Sqrt
            | Inversesqrt | Floor | Trunc | Round | RoundEven | Ceil | Fract | Normalize => {
                for t in gen_types(FLOAT) {
                    add(&t, &[&t]);
                }
            }
            Atan => {
                for t in gen_types(FLOAT) {
                    add(&t, &[&t]);
                    add(&t, &[&t, &t]);
                }
            }
            Pow => {
                for t in gen_types(FLOAT) {
                    add(&t, &[&t, &t]);
                }
            }
            Abs | Sign => {
                for scalar in [ScalarType::float, ScalarType::int] {
                    for t in gen_types(scalar) {
                        add(&t, &[&t]);
                    }
                }
            }
            Mod => {
                let s = Type::Scalar(FLOAT);
                for t in gen_types(FLOAT) {
                    add(&t, &[&t, &t]);
                    if !t.is_scalar() {
                        add(&t, &[&t, &s]);
                    }
                }
            }
            Min | Max => {
                for scalar in NUMERIC {
                    let s = Type::Scalar(scalar);
                    for t in gen_types(scalar) {
                        add(&t, &[&t, &t]);
                        if !t.is_scalar() {
                            add(&t, &[&t, &s]);
                        }
                    }
                }
            }
            Clamp => {
                for scalar in NUMERIC {
                    let s = Type::Scalar(scalar);
                    for t in gen_types(scalar) {
                        add(&t, &[&t, &t, &t]);
                        if !t.is_scalar() {
                            add(&t, &[&t, &s, &s]);
                        }
                    }
                }
            }
            Mix => {
                let s = Type::Scalar(FLOAT);
                for t in gen_types(FLOAT) {
                    add(&t, &[&t, &t, &t]);
                    if !t.is_scalar() {
                        add(&t, &[&t, &t, &s]);
                    }
                }
            }
            Step => {
                let s = Type::Scalar(FLOAT);
                for t in gen_types(FLOAT) {
                    add(&t, &[&t, &t]);
                    if !t.is_scalar() {
                        add(&t, &[&s, &t]);
                    }
                }
            }
            Smoothstep => {
                let s = Type::Scalar(FLOAT);
                for t in gen_types(FLOAT) {
                    add(&t, &[&t, &t, &t]);
                    if !t.is_scalar() {
                        add(&t, &[&s, &s, &t]);
                    }
                }
            }
            Isnan | Isinf => {
                for t in gen_types(FLOAT) {
                    add(&t.matching(ScalarType::bool), &[&t]);
                }
            }
            Length => {
                for t in gen_types(FLOAT) {
                    add(&Type::FLOAT, &[&t]);
                }
            }
            Distance | Dot => {
                for t in gen_types(FLOAT) {
                    add(&Type::FLOAT, &[&t, &t]);
                }
            }
            Cross => {
                let v = Type::vector(FLOAT, 3);
                add(&v, &[&v, &v]);
            }
        }
        res
    }

    /// Result depends on whole vectors rather than matching components.
    fn is_reducing(self) -> bool {
        matches!(
            self,
            Native::Length | Native::Distance | Native::Dot | Native::Cross | Native::Normalize
        )
    }

    fn apply(self, x: &[f64]) -> f64 {
        use Native::*;

        let b = |v: bool| if v { 1.0 } else { 0.0 };
        match self {
            Radians => x[0].to_radians(),
            Degrees => x[0].to_degrees(),
            Sin => x[0].sin(),
            Cos => x[0].cos(),
            Tan => x[0].tan(),
            Asin => x[0].asin(),
            Acos => x[0].acos(),
            Atan if x.len() == 2 => x[0].atan2(x[1]),
            Atan => x[0].atan(),
            Pow => x[0].powf(x[1]),
            Exp => x[0].exp(),
            Log => x[0].ln(),
            Exp2 => x[0].exp2(),
            Log2 => x[0].log2(),
            Sqrt => x[0].sqrt(),
            Inversesqrt => 1.0 / x[0].sqrt(),
            Abs => x[0].abs(),
            Sign if x[0] > 0.0 => 1.0,
            Sign if x[0] < 0.0 => -1.0,
            Sign => 0.0,
            Floor => x[0].floor(),
            Trunc => x[0].trunc(),
            Round => x[0].round(),
            RoundEven => x[0].round_ties_even(),
            Ceil => x[0].ceil(),
            Fract => x[0] - x[0].floor(),
            Mod => x[0] - x[1] * (x[0] / x[1]).floor(),
            Min => x[0].min(x[1]),
            Max => x[0].max(x[1]),
            Clamp => x[0].max(x[1]).min(x[2]),
            Mix => x[0] * (1.0 - x[2]) + x[1] * x[2],
            Step => b(x[1] >= x[0]),
            Smoothstep => {
                let t = ((x[2] - x[0]) / (x[1] - x[0])).clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            Isnan => b(x[0].is_nan()),
            Isinf => b(x[0].is_infinite()),
            Length | Distance | Dot | Cross | Normalize => unreachable!("{self} is reducing"),
        }
    }

    fn apply_int(self, x: &[i32]) -> Option<i32> {
        Some(match self {
            Native::Abs => x[0].wrapping_abs(),
            Native::Sign => x[0].signum(),
            Native::Min => x[0].min(x[1]),
            Native::Max => x[0].max(x[1]),
            Native::Clamp => x[0].max(x[1]).min(x[2]),
            _ => return None,
        })
    }

    fn apply_uint(self, x: &[u32]) -> Option<u32> {
        Some(match self {
            Native::Min => x[0].min(x[1]),
            Native::Max => x[0].max(x[1]),
            Native::Clamp => x[0].max(x[1]).min(x[2]),
            _ => return None,
        })
    }

    fn apply_integer(self, x: &[Scalar]) -> Option<Scalar> {
        match x.first()? {
            Scalar::Int(_) => {
                let x: Vec<i32> = x.iter().map(|s| int(s.convert(ScalarType::int))).collect();
                self.apply_int(&x).map(Scalar::Int)
            }
            Scalar::Uint(_) => {
                let x: Vec<u32> = x.iter().map(|s| uint(s.convert(ScalarType::uint))).collect();
                self.apply_uint(&x).map(Scalar::Uint)
            }
            _ => None,
        }
    }
}

fn int(scalar: Scalar) -> i32 {
    match scalar {
        Scalar::Int(v) => v,
        _ => 0,
    }
}

fn uint(scalar: Scalar) -> u32 {
    match scalar {
        Scalar::Uint(v) => v,
        _ => 0,
    }
}

fn scalar_component(value: &Value, index: usize) -> Scalar {
    if value.ty().is_scalar() {
        value.get(0)
    } else {
        value.get(index)
    }
}

fn component(value: &Value, index: usize) -> f64 {
    scalar_component(value, index).as_f64()
}

fn components(value: &Value) -> Vec<f64> {
    value.components().map(Scalar::as_f64).collect()
}

impl NativeOverload {
    pub fn name(&self) -> String {
        self.native.to_string()
    }

    pub fn evaluate(&self, args: &[Value]) -> Option<Value> {
        let ty = self.return_type.clone();

        if matches!(ty.scalar_type(), ScalarType::int | ScalarType::uint) {
            let res = (0..ty.n_components())
                .map(|i| {
                    let x: Vec<Scalar> = args.iter().map(|a| scalar_component(a, i)).collect();
                    self.native.apply_integer(&x)
                })
                .collect::<Option<Vec<_>>>()?;
            return Some(Value::from_components(ty, res));
        }

        let res: Vec<f64> = match self.native {
            Native::Length => vec![components(&args[0]).iter().map(|x| x * x).sum::<f64>().sqrt()],
            Native::Distance => {
                let (a, b) = (components(&args[0]), components(&args[1]));
                let sq: f64 = a.iter().zip(&b).map(|(a, b)| (a - b) * (a - b)).sum();
                vec![sq.sqrt()]
            }
            Native::Dot => {
                let (a, b) = (components(&args[0]), components(&args[1]));
                vec![a.iter().zip(&b).map(|(a, b)| a * b).sum()]
            }
            Native::Cross => {
                let (a, b) = (components(&args[0]), components(&args[1]));
                vec![
                    a[1] * b[2] - a[2] * b[1],
                    a[2] * b[0] - a[0] * b[2],
                    a[0] * b[1] - a[1] * b[0],
                ]
            }
            Native::Normalize => {
                let a = components(&args[0]);
                let len = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                a.iter().map(|x| x / len).collect()
            }
            native => (0..ty.n_components())
                .map(|i| {
                    let x: Vec<f64> = args.iter().map(|a| component(a, i)).collect();
                    native.apply(&x)
                })
                .collect(),
        };

        Some(Value::from_components(
            ty,
            res.into_iter().map(Scalar::Double),
        ))
    }

    /// Emits the call. Arguments are already converted to the parameter
    /// types.
    pub fn write_spv(&self, writer: &mut SpvWriter, args: &[u32]) -> u32 {
        use Native::*;

        let ty = &self.return_type;

        // scalar arguments of vector overloads are splatted
        let width = self.parameters.iter().map(Type::length).max().unwrap_or(0);
        let args: Vec<u32> = if self.native.is_reducing() || width == 0 {
            args.to_vec()
        } else {
            (args.iter().zip(&self.parameters))
                .map(|(id, param)| {
                    if param.is_scalar() {
                        let wide = Type::vector(param.scalar_type(), width as u8);
                        writer.splat(*id, &wide)
                    } else {
                        *id
                    }
                })
                .collect()
        };

        let scalar = self.parameters[0].scalar_type();
        let by_scalar = |float: GLOp, int: GLOp, uint: GLOp| match scalar {
            ScalarType::int => int,
            ScalarType::uint => uint,
            _ => float,
        };

        let op = match self.native {
            Radians => GLOp::Radians,
            Degrees => GLOp::Degrees,
            Sin => GLOp::Sin,
            Cos => GLOp::Cos,
            Tan => GLOp::Tan,
            Asin => GLOp::Asin,
            Acos => GLOp::Acos,
            Atan if args.len() == 2 => GLOp::Atan2,
            Atan => GLOp::Atan,
            Pow => GLOp::Pow,
            Exp => GLOp::Exp,
            Log => GLOp::Log,
            Exp2 => GLOp::Exp2,
            Log2 => GLOp::Log2,
            Sqrt => GLOp::Sqrt,
            Inversesqrt => GLOp::InverseSqrt,
            Abs => by_scalar(GLOp::FAbs, GLOp::SAbs, GLOp::SAbs),
            Sign => by_scalar(GLOp::FSign, GLOp::SSign, GLOp::SSign),
            Floor => GLOp::Floor,
            Trunc => GLOp::Trunc,
            Round => GLOp::Round,
            RoundEven => GLOp::RoundEven,
            Ceil => GLOp::Ceil,
            Fract => GLOp::Fract,
            Min => by_scalar(GLOp::FMin, GLOp::SMin, GLOp::UMin),
            Max => by_scalar(GLOp::FMax, GLOp::SMax, GLOp::UMax),
            Clamp => by_scalar(GLOp::FClamp, GLOp::SClamp, GLOp::UClamp),
            Mix => GLOp::FMix,
            Step => GLOp::Step,
            Smoothstep => GLOp::SmoothStep,
            Length => GLOp::Length,
            Distance => GLOp::Distance,
            Cross => GLOp::Cross,
            Normalize => GLOp::Normalize,

            Mod => return writer.code(spirv::Op::FMod, ty, &args),
            Isnan => return writer.code(spirv::Op::IsNan, ty, &args),
            Isinf => return writer.code(spirv::Op::IsInf, ty, &args),
            Dot if self.parameters[0].is_scalar() => {
                return writer.code(spirv::Op::FMul, ty, &args)
            }
            Dot => return writer.code(spirv::Op::Dot, ty, &args),
        };
        writer.ext_inst(ty, op, &args)
    }
}

/// Every overload of every builtin function.
pub fn all_overloads() -> impl Iterator<Item = NativeOverload> {
    Native::iter().flat_map(Native::overloads)
}

#[cfg(test)]
mod test {
    use super::*;

    fn find(native: Native, params: &[Type]) -> NativeOverload {
        native
            .overloads()
            .into_iter()
            .find(|o| o.parameters == params)
            .unwrap()
    }

    fn vec3(x: f32, y: f32, z: f32) -> Value {
        Value::from_components(
            Type::vector(FLOAT, 3),
            [x, y, z].into_iter().map(Scalar::Float),
        )
    }

    #[test]
    fn names() {
        assert_eq!(Native::RoundEven.to_string(), "roundEven");
        assert_eq!(Native::Inversesqrt.to_string(), "inversesqrt");
        assert_eq!(Native::Exp2.to_string(), "exp2");
        assert_eq!(Native::Smoothstep.to_string(), "smoothstep");
    }

    #[test]
    fn overload_counts() {
        assert_eq!(Native::Sin.overloads().len(), 4);
        // (T, T) for 4 widths and (T, float) for 3 vector widths
        assert_eq!(Native::Mod.overloads().len(), 7);
        assert_eq!(Native::Min.overloads().len(), 21);
        assert_eq!(Native::Cross.overloads().len(), 1);
    }

    #[test]
    fn evaluate_component_wise() {
        let clamp = find(
            Native::Clamp,
            &[Type::vector(FLOAT, 3), Type::FLOAT, Type::FLOAT],
        );
        let res = clamp
            .evaluate(&[
                vec3(-1.0, 0.5, 2.0),
                Value::from_scalar(0.0f32),
                Value::from_scalar(1.0f32),
            ])
            .unwrap();
        assert_eq!(res, vec3(0.0, 0.5, 1.0));

        let modulo = find(Native::Mod, &[Type::FLOAT, Type::FLOAT]);
        let res = modulo
            .evaluate(&[Value::from_scalar(-1.0f32), Value::from_scalar(3.0f32)])
            .unwrap();
        assert_eq!(res, Value::from_scalar(2.0f32));

        let abs = find(Native::Abs, &[Type::INT]);
        let res = abs.evaluate(&[Value::from_scalar(-7)]).unwrap();
        assert_eq!(res, Value::from_scalar(7));
    }

    #[test]
    fn evaluate_integers() {
        // wraps like OpSAbs
        let abs = find(Native::Abs, &[Type::INT]);
        let res = abs.evaluate(&[Value::from_scalar(i32::MIN)]).unwrap();
        assert_eq!(res, Value::from_scalar(i32::MIN));

        let sign = find(Native::Sign, &[Type::vector(ScalarType::int, 2)]);
        let arg = Value::from_components(
            Type::vector(ScalarType::int, 2),
            [Scalar::Int(-5), Scalar::Int(0)],
        );
        let res = sign.evaluate(&[arg]).unwrap();
        assert_eq!(res.components().collect::<Vec<_>>(), [Scalar::Int(-1), Scalar::Int(0)]);

        let max = find(Native::Max, &[Type::UINT, Type::UINT]);
        let res = max
            .evaluate(&[Value::from_scalar(u32::MAX), Value::from_scalar(1u32)])
            .unwrap();
        assert_eq!(res, Value::from_scalar(u32::MAX));

        let clamp = find(Native::Clamp, &[Type::INT, Type::INT, Type::INT]);
        let res = clamp
            .evaluate(&[
                Value::from_scalar(i32::MAX),
                Value::from_scalar(i32::MIN),
                Value::from_scalar(3),
            ])
            .unwrap();
        assert_eq!(res, Value::from_scalar(3));
    }

    #[test]
    fn evaluate_reducing() {
        let a = vec3(1.0, 0.0, 0.0);
        let b = vec3(0.0, 1.0, 0.0);

        let cross = find(Native::Cross, &[a.ty().clone(), b.ty().clone()]);
        assert_eq!(cross.evaluate(&[a.clone(), b.clone()]), Some(vec3(0.0, 0.0, 1.0)));

        let dot = find(Native::Dot, &[a.ty().clone(), b.ty().clone()]);
        assert_eq!(dot.evaluate(&[a, b]), Some(Value::from_scalar(0.0f32)));

        let length = find(Native::Length, &[Type::vector(FLOAT, 3)]);
        assert_eq!(
            length.evaluate(&[vec3(3.0, 4.0, 0.0)]),
            Some(Value::from_scalar(5.0f32))
        );
    }
}
