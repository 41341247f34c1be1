//! This module defines the custom error types for the library.
//!
//! This module centralizes all possible error conditions that can arise within the
//! restarted Arnoldi eigensolver into a single enum: [`KrylovErrorKind`], wrapped by
//! [`KrylovError`]. Unlike a purely opaque error, the kind is public and reachable through
//! [`KrylovError::kind`], because a caller can act on it: `DimensionTooSmall` means "retry
//! with a larger `krylovdim`", while `InputError` and `DimensionMismatch` are bugs at the
//! call site.
//!
//! Note that not converging within `maxiter` is *not* an error: the solver returns the
//! eigenpairs it has, and the caller compares `ConvergenceInfo::converged` against the
//! requested count.
use thiserror::Error;

/// Represents all possible errors that can occur during a Krylov-Schur run.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct KrylovError(#[from] KrylovErrorKind);

impl KrylovError {
    /// Returns the specific kind of error, for callers that recover from some failures
    /// (for instance by enlarging `krylovdim` after [`KrylovErrorKind::DimensionTooSmall`]).
    pub fn kind(&self) -> &KrylovErrorKind {
        &self.0
    }
}

/// The distinct kinds of errors.
///
/// Public so that callers can match on the cause through [`KrylovError::kind`]. Adding a
/// variant is a breaking change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KrylovErrorKind {
    /// The Krylov subspace cannot hold the requested part of the spectrum plus working
    /// room: either `howmany >= krylovdim` at entry, or a restart had to grow the retained
    /// dimension up to `krylovdim` to avoid splitting a complex-conjugate pair.
    #[error("Krylov dimension {krylovdim} too small to compute {howmany} eigenvalues.")]
    DimensionTooSmall { krylovdim: usize, howmany: usize },

    /// The dimensions of the operator and the starting vector are incompatible.
    #[error(
        "Dimension mismatch: operator has {operator_cols} columns but vector has {vector_rows} rows."
    )]
    DimensionMismatch {
        operator_cols: usize,
        vector_rows: usize,
    },

    /// An invalid input parameter was provided.
    #[error("Invalid input parameter: {0}")]
    InputError(String),

    /// The dense Hessenberg QR iteration did not reduce the projected matrix to Schur form.
    #[error("The dense Schur decomposition did not converge after {sweeps} QR sweeps.")]
    SchurNoConvergence { sweeps: usize },
}

impl PartialEq for KrylovError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_too_small_error_message() {
        let error = KrylovError(KrylovErrorKind::DimensionTooSmall {
            krylovdim: 8,
            howmany: 10,
        });
        let expected_message = "Krylov dimension 8 too small to compute 10 eigenvalues.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_dimension_mismatch_error_message() {
        let error = KrylovError(KrylovErrorKind::DimensionMismatch {
            operator_cols: 100,
            vector_rows: 99,
        });
        let expected_message =
            "Dimension mismatch: operator has 100 columns but vector has 99 rows.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_input_error_message() {
        let error = KrylovError(KrylovErrorKind::InputError(
            "The starting vector `x0` must not be a zero vector.".to_string(),
        ));
        let expected_message =
            "Invalid input parameter: The starting vector `x0` must not be a zero vector.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_schur_error_message_and_kind() {
        let error = KrylovError::from(KrylovErrorKind::SchurNoConvergence { sweeps: 300 });
        assert_eq!(
            error.to_string(),
            "The dense Schur decomposition did not converge after 300 QR sweeps."
        );
        assert_eq!(
            error.kind(),
            &KrylovErrorKind::SchurNoConvergence { sweeps: 300 }
        );
    }
}
