//! Operand values on the evaluator stack.

use pf_core::Real;
use pf_formula::{BinaryOp, UnaryOp};

use crate::error::{FieldError, FieldResult};

/// A scalar constant or a per-particle array.
///
/// Scalars broadcast against arrays; two arrays must have the same length.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Real),
    Array(Vec<Real>),
}

impl Value {
    /// Element-wise `op(self)`.
    pub fn unary(self, op: UnaryOp) -> Value {
        match self {
            Self::Scalar(x) => Self::Scalar(op.apply(x)),
            Self::Array(mut xs) => {
                xs.iter_mut().for_each(|x| *x = op.apply(*x));
                Self::Array(xs)
            }
        }
    }

    /// Element-wise `op(self, rhs)` with scalar broadcasting.
    pub fn binary(self, op: BinaryOp, rhs: Value) -> FieldResult<Value> {
        Ok(match (self, rhs) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(op.apply(a, b)),
            (Self::Scalar(a), Self::Array(mut bs)) => {
                bs.iter_mut().for_each(|b| *b = op.apply(a, *b));
                Self::Array(bs)
            }
            (Self::Array(mut xs), Self::Scalar(b)) => {
                xs.iter_mut().for_each(|a| *a = op.apply(*a, b));
                Self::Array(xs)
            }
            (Self::Array(mut xs), Self::Array(ys)) => {
                if xs.len() != ys.len() {
                    return Err(FieldError::LengthMismatch {
                        left: xs.len(),
                        right: ys.len(),
                    });
                }
                xs.iter_mut().zip(&ys).for_each(|(a, &b)| *a = op.apply(*a, b));
                Self::Array(xs)
            }
        })
    }

    /// Materialize as a per-particle array, broadcasting a scalar to `len`.
    pub fn into_array(self, len: impl FnOnce() -> FieldResult<usize>) -> FieldResult<Vec<Real>> {
        match self {
            Self::Array(xs) => Ok(xs),
            Self::Scalar(x) => Ok(vec![x; len()?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_broadcasts_both_sides() {
        let arr = Value::Array(vec![1.0, 2.0, 4.0]);
        assert_eq!(
            Value::Scalar(8.0).binary(BinaryOp::Div, arr.clone()).unwrap(),
            Value::Array(vec![8.0, 4.0, 2.0])
        );
        assert_eq!(
            arr.binary(BinaryOp::Pow, Value::Scalar(2.0)).unwrap(),
            Value::Array(vec![1.0, 4.0, 16.0])
        );
    }

    #[test]
    fn arrays_combine_element_wise() {
        let a = Value::Array(vec![3.0, 0.0]);
        let b = Value::Array(vec![4.0, 0.0]);
        assert_eq!(
            a.binary(BinaryOp::Arctan2, b).unwrap(),
            Value::Array(vec![3.0_f64.atan2(4.0), 0.0])
        );
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = Value::Array(vec![1.0])
            .binary(BinaryOp::Add, Value::Array(vec![1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, FieldError::LengthMismatch { left: 1, right: 2 }));
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        let out = Value::Array(vec![1.0, -1.0, 0.0])
            .binary(BinaryOp::Div, Value::Scalar(0.0))
            .unwrap();
        let Value::Array(xs) = out else {
            panic!("expected array");
        };
        assert_eq!(xs[0], Real::INFINITY);
        assert_eq!(xs[1], Real::NEG_INFINITY);
        assert!(xs[2].is_nan());
    }

    #[test]
    fn unary_maps_every_element() {
        assert_eq!(
            Value::Array(vec![4.0, 9.0]).unary(UnaryOp::Sqrt),
            Value::Array(vec![2.0, 3.0])
        );
        assert_eq!(Value::Scalar(1.0).unary(UnaryOp::Neg), Value::Scalar(-1.0));
    }

    #[test]
    fn scalar_materializes_with_length() {
        assert_eq!(Value::Scalar(2.0).into_array(|| Ok(3)).unwrap(), vec![2.0; 3]);
        assert_eq!(
            Value::Array(vec![1.0]).into_array(|| panic!("length not needed")).unwrap(),
            vec![1.0]
        );
    }
}
