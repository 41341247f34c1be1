//! Algorithm parameters of the restarted Arnoldi eigensolver.

use crate::algorithms::arnoldi::Orthogonalizer;
use crate::error::{KrylovError, KrylovErrorKind};
use serde::{Deserialize, Serialize};

/// Parameters of the Krylov-Schur iteration.
///
/// The struct deserializes with `#[serde(default)]`, so a parameter file only needs to
/// name the values that differ from the defaults.
///
/// ```
/// use krylov_schur::ArnoldiConfig;
///
/// let config = ArnoldiConfig::default().with_krylovdim(20).with_tol(1e-10);
/// assert_eq!(config.krylovdim, 20);
/// assert_eq!(config.maxiter, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArnoldiConfig {
    /// Maximum dimension of the Krylov subspace. Must exceed the number of requested
    /// eigenvalues. Values above the operator dimension are clamped to it.
    pub krylovdim: usize,
    /// Maximum number of restarts.
    pub maxiter: usize,
    /// Absolute tolerance on the residual norm of an eigenpair (and on the residual norm of
    /// the factorization, below which it is treated as an invariant subspace).
    pub tol: f64,
    /// Orthogonalization scheme of the Arnoldi process.
    pub orth: Orthogonalizer,
    /// Process the factorization as soon as it holds enough vectors, instead of only when
    /// it reaches `krylovdim`. Detects convergence earlier at the price of more dense Schur
    /// decompositions.
    pub eager: bool,
}

impl Default for ArnoldiConfig {
    fn default() -> Self {
        Self {
            krylovdim: 30,
            maxiter: 100,
            tol: 1e-12,
            orth: Orthogonalizer::default(),
            eager: false,
        }
    }
}

impl ArnoldiConfig {
    pub fn with_krylovdim(mut self, krylovdim: usize) -> Self {
        self.krylovdim = krylovdim;
        self
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_orth(mut self, orth: Orthogonalizer) -> Self {
        self.orth = orth;
        self
    }

    pub fn with_eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Checks the parameters for a request of `howmany` eigenvalues of an operator of
    /// dimension `n`.
    ///
    /// # Errors
    /// - [`KrylovErrorKind::DimensionTooSmall`] if `howmany >= krylovdim`.
    /// - [`KrylovErrorKind::InputError`] for any other invalid parameter.
    pub fn validate(&self, howmany: usize, n: usize) -> Result<(), KrylovError> {
        if howmany == 0 {
            return Err(KrylovErrorKind::InputError(
                "The number of requested eigenvalues `howmany` must be at least 1.".to_string(),
            )
            .into());
        }
        if howmany >= self.krylovdim {
            return Err(KrylovErrorKind::DimensionTooSmall {
                krylovdim: self.krylovdim,
                howmany,
            }
            .into());
        }
        if howmany > n {
            return Err(KrylovErrorKind::InputError(format!(
                "Cannot compute {howmany} eigenvalues of an operator of dimension {n}."
            ))
            .into());
        }
        if self.maxiter == 0 {
            return Err(KrylovErrorKind::InputError(
                "The iteration cap `maxiter` must be at least 1.".to_string(),
            )
            .into());
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(KrylovErrorKind::InputError(format!(
                "The tolerance `tol` must be finite and non-negative, got {}.",
                self.tol
            ))
            .into());
        }
        match self.orth {
            Orthogonalizer::ClassicalGramSchmidtIR(eta)
            | Orthogonalizer::ModifiedGramSchmidtIR(eta)
                if !(eta > 0.0 && eta < 1.0) =>
            {
                Err(KrylovErrorKind::InputError(format!(
                    "The refinement parameter must lie in (0, 1), got {eta}."
                ))
                .into())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArnoldiConfig::default();
        assert_eq!(config.krylovdim, 30);
        assert_eq!(config.maxiter, 100);
        assert_eq!(config.tol, 1e-12);
        assert!(!config.eager);
        assert_eq!(
            config.orth,
            Orthogonalizer::ModifiedGramSchmidtIR(std::f64::consts::FRAC_1_SQRT_2)
        );
    }

    #[test]
    fn test_validate() {
        let config = ArnoldiConfig::default().with_krylovdim(8);
        assert!(config.validate(7, 100).is_ok());
        assert_eq!(
            config.validate(10, 100).unwrap_err().kind(),
            &KrylovErrorKind::DimensionTooSmall {
                krylovdim: 8,
                howmany: 10
            }
        );
        assert_eq!(
            config.validate(8, 100).unwrap_err().kind(),
            &KrylovErrorKind::DimensionTooSmall {
                krylovdim: 8,
                howmany: 8
            }
        );
        assert!(config.validate(0, 100).is_err());
        assert!(config.validate(5, 4).is_err());
        assert!(config.with_tol(f64::NAN).validate(2, 100).is_err());
        assert!(config.with_maxiter(0).validate(2, 100).is_err());
        assert!(
            config
                .with_orth(Orthogonalizer::ClassicalGramSchmidtIR(1.5))
                .validate(2, 100)
                .is_err()
        );
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: ArnoldiConfig =
            serde_json::from_str(r#"{ "krylovdim": 12, "eager": true }"#).unwrap();
        assert_eq!(config.krylovdim, 12);
        assert!(config.eager);
        assert_eq!(config.maxiter, 100);

        let round_trip: ArnoldiConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }
}
