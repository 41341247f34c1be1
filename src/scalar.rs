//! The field capability the Krylov-Schur machinery needs on top of `faer`'s numeric traits.
//!
//! Every algorithm in this crate is written once, generically over a [`Scalar`], which is a
//! [`ComplexField`] with value semantics (`Copy` and the arithmetic operators). The real
//! (`f32`, `f64`) and complex (`Complex<f32>`, `Complex<f64>`) instantiations share the
//! same code path. The only place where the two differ is the capability constant
//! [`Scalar::PAIRED_SPECTRUM`], which tells the solver whether complex eigenvalues show up
//! as 2×2 blocks of a real Schur form.

use faer::traits::ComplexField;
use num_complex::Complex;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A field element the Krylov-Schur machinery can operate on.
pub trait Scalar:
    ComplexField<Real: Copy + Send + Sync + Into<f64> + AddAssign + MulAssign>
    + Copy
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// The complex extension of the field, used to report eigenvalues and eigenvectors.
    type Complex: Scalar<Real = Self::Real, Complex = Self::Complex>;

    /// `true` when eigenvalues of a matrix over this field may fall outside the field and
    /// therefore appear as complex-conjugate pairs held in 2×2 Schur blocks.
    const PAIRED_SPECTRUM: bool;

    fn to_complex(self) -> Self::Complex;

    /// Principal square root, or `None` if the root does not lie in the field
    /// (a negative number in a real field).
    fn field_sqrt(self) -> Option<Self>;
}

macro_rules! impl_real_scalar {
    ($real:ty) => {
        impl Scalar for $real {
            type Complex = Complex<$real>;

            const PAIRED_SPECTRUM: bool = true;

            #[inline]
            fn to_complex(self) -> Self::Complex {
                Complex::new(self, 0.0)
            }

            #[inline]
            fn field_sqrt(self) -> Option<Self> {
                (self >= 0.0).then(|| <$real>::sqrt(self))
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($real:ty) => {
        impl Scalar for Complex<$real> {
            type Complex = Complex<$real>;

            const PAIRED_SPECTRUM: bool = false;

            #[inline]
            fn to_complex(self) -> Self::Complex {
                self
            }

            #[inline]
            fn field_sqrt(self) -> Option<Self> {
                Some(Complex::sqrt(self))
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);
impl_complex_scalar!(f32);
impl_complex_scalar!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_abs2<T: Scalar>(x: T) -> T::Real {
        T::abs2_impl(&x)
    }

    #[test]
    fn test_real_field_capabilities() {
        assert!(<f64 as Scalar>::PAIRED_SPECTRUM);
        assert!(<f32 as Scalar>::PAIRED_SPECTRUM);
        assert_eq!(Scalar::field_sqrt(4.0_f64), Some(2.0));
        assert_eq!(Scalar::field_sqrt(-4.0_f64), None);
        assert_eq!(Scalar::to_complex(2.0_f64), Complex::new(2.0, 0.0));
        assert_eq!(generic_abs2(-3.0_f64), 9.0);
    }

    #[test]
    fn test_complex_field_capabilities() {
        assert!(!<Complex<f64> as Scalar>::PAIRED_SPECTRUM);
        let z = Complex::new(3.0_f64, -4.0);
        assert_eq!(generic_abs2(z), 25.0);
        assert_eq!(Scalar::to_complex(z), z);

        // The square root of a negative number stays inside a complex field.
        let root = Scalar::field_sqrt(Complex::new(-4.0_f64, 0.0)).unwrap();
        assert!((root - Complex::new(0.0, 2.0)).norm() < 1e-15);
    }
}
