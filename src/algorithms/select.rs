//! Selection criteria for the wanted part of the spectrum.

use crate::error::{KrylovError, KrylovErrorKind};
use crate::scalar::Scalar;
use faer::traits::ComplexField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Which eigenvalues to target, in order of priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Which {
    /// Largest modulus `|λ|` first.
    #[default]
    LargestMagnitude,
    /// Largest real part first.
    LargestReal,
    /// Smallest (most negative) real part first.
    SmallestReal,
    /// Largest imaginary part first.
    LargestImaginary,
    /// Smallest imaginary part first.
    SmallestImaginary,
}

impl Which {
    /// The comparison key of an eigenvalue under this criterion.
    pub fn key<C: Scalar>(self, lambda: C) -> C::Real {
        match self {
            Which::LargestMagnitude => C::abs_impl(&lambda),
            Which::LargestReal | Which::SmallestReal => C::real_part_impl(&lambda),
            Which::LargestImaginary | Which::SmallestImaginary => C::imag_part_impl(&lambda),
        }
    }

    /// Whether larger keys come first.
    pub fn descending(self) -> bool {
        matches!(
            self,
            Which::LargestMagnitude | Which::LargestReal | Which::LargestImaginary
        )
    }

    /// Returns the positions of `values` in priority order.
    ///
    /// The sort is stable, so eigenvalues with equal keys keep their relative order. NaN keys
    /// are ranked last.
    pub fn sort_permutation<C: Scalar>(self, values: &[C]) -> Vec<usize> {
        let keys: Vec<C::Real> = values.iter().map(|&v| self.key(v)).collect();
        let descending = self.descending();
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| {
            let (ka, kb) = (keys[a], keys[b]);
            let (a_nan, b_nan) = (C::Real::is_nan_impl(&ka), C::Real::is_nan_impl(&kb));
            match (a_nan, b_nan) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => Ordering::Equal,
                (false, false) => {
                    let ord = ka.partial_cmp(&kb).unwrap_or(Ordering::Equal);
                    if descending { ord.reverse() } else { ord }
                }
            }
        });
        order
    }
}

impl FromStr for Which {
    type Err = KrylovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LM" | "LARGESTMAGNITUDE" => Ok(Which::LargestMagnitude),
            "LR" | "LARGESTREAL" => Ok(Which::LargestReal),
            "SR" | "SMALLESTREAL" => Ok(Which::SmallestReal),
            "LI" | "LARGESTIMAGINARY" => Ok(Which::LargestImaginary),
            "SI" | "SMALLESTIMAGINARY" => Ok(Which::SmallestImaginary),
            _ => Err(KrylovErrorKind::InputError(format!(
                "Unknown selection criterion `{s}`; expected one of LM, LR, SR, LI, SI."
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_largest_magnitude_order() {
        let values = [c(1.0, 0.0), c(-3.0, 0.0), c(0.0, 2.0), c(0.5, 0.5)];
        assert_eq!(
            Which::LargestMagnitude.sort_permutation(&values),
            vec![1, 2, 0, 3]
        );
    }

    #[test]
    fn test_real_and_imaginary_orders() {
        let values = [c(1.0, 1.0), c(-3.0, -2.0), c(2.0, 0.0)];
        assert_eq!(Which::LargestReal.sort_permutation(&values), vec![2, 0, 1]);
        assert_eq!(Which::SmallestReal.sort_permutation(&values), vec![1, 0, 2]);
        assert_eq!(Which::LargestImaginary.sort_permutation(&values), vec![0, 2, 1]);
        assert_eq!(Which::SmallestImaginary.sort_permutation(&values), vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        // A conjugate pair has equal magnitude and real part.
        let values = [c(0.1, 0.0), c(1.0, 2.0), c(1.0, -2.0), c(-2.0, 1.0)];
        assert_eq!(
            Which::LargestMagnitude.sort_permutation(&values),
            vec![1, 2, 3, 0]
        );
        assert_eq!(Which::LargestReal.sort_permutation(&values), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_nan_keys_sort_last() {
        let values = [f64::NAN, 1.0, -5.0];
        assert_eq!(Which::SmallestReal.sort_permutation(&values), vec![2, 1, 0]);
        assert_eq!(Which::LargestReal.sort_permutation(&values), vec![1, 2, 0]);
    }

    #[test]
    fn test_parse_which() {
        assert_eq!("lm".parse::<Which>().unwrap(), Which::LargestMagnitude);
        assert_eq!("SR".parse::<Which>().unwrap(), Which::SmallestReal);
        assert_eq!(
            "LargestImaginary".parse::<Which>().unwrap(),
            Which::LargestImaginary
        );
        let err = "XX".parse::<Which>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input parameter: Unknown selection criterion `XX`; expected one of LM, LR, SR, LI, SI."
        );
    }
}
