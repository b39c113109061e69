/// Floating point type used for every per-particle value
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Element-wise [`nearly_equal`] over two arrays of the same length.
///
/// Arrays of different lengths are never equal. NaN never compares equal,
/// matching IEEE semantics.
pub fn slices_nearly_equal(a: &[Real], b: &[Real], tol: Tolerances) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| nearly_equal(x, y, tol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn infinities_compare_equal_to_themselves() {
        let tol = Tolerances::default();
        assert!(nearly_equal(Real::INFINITY, Real::INFINITY, tol));
        assert!(!nearly_equal(Real::INFINITY, Real::NEG_INFINITY, tol));
        assert!(!nearly_equal(Real::NAN, Real::NAN, tol));
    }

    #[test]
    fn slices_require_equal_length() {
        let tol = Tolerances::default();
        assert!(slices_nearly_equal(&[1.0, 2.0], &[1.0, 2.0 + 1e-13], tol));
        assert!(!slices_nearly_equal(&[1.0, 2.0], &[1.0], tol));
        assert!(slices_nearly_equal(&[], &[], tol));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn nearly_equal_is_reflexive(a in prop::num::f64::NORMAL) {
            prop_assert!(nearly_equal(a, a, Tolerances::default()));
        }
    }
}
