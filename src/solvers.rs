//! This module provides the high-level API of the crate: a few eigenvalues and eigenvectors
//! ([`eigsolve`]) or a partial Schur decomposition ([`schursolve`]) of a linear operator,
//! computed by the restarted Arnoldi method in Krylov-Schur form.

use crate::{
    algorithms::{
        krylov_schur::{KrylovSchurOutcome, krylov_schur, lift_coefficients},
        schur::{schur_eigenvalues, schur_eigenvectors},
        select::Which,
    },
    config::ArnoldiConfig,
    error::KrylovError,
    matrix::LinearOperator,
    scalar::Scalar,
};
use faer::traits::ComplexField;
use faer::{Mat, MatRef};
use serde::Serialize;

/// Convergence record of a solver run.
///
/// Reaching `maxiter` is not an error, so callers should always compare
/// [`ConvergenceInfo::converged`] with the number of eigenvalues they asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "S::Real: Serialize"))]
pub struct ConvergenceInfo<S: Scalar> {
    /// Number of converged eigenpairs (Schur vectors), counted from the front of the
    /// returned list.
    pub converged: usize,
    /// Residual norm `‖A·x - λ·x‖` of every returned pair.
    pub residual_norms: Vec<S::Real>,
    /// The residual vectors as columns. They all point along the residual direction of the
    /// final Arnoldi factorization.
    #[serde(skip_serializing)]
    pub residuals: Mat<S>,
    /// Number of outer (restart) iterations.
    pub numiter: usize,
    /// Number of operator applications.
    pub numops: usize,
}

/// Eigenvalues and eigenvectors returned by [`eigsolve`].
#[derive(Debug, Clone)]
pub struct EigsolveOutput<T: Scalar> {
    /// Eigenvalues in the order of the selection criterion. Complex-conjugate pairs of a real
    /// operator are listed adjacently.
    pub values: Vec<T::Complex>,
    /// Unit-norm eigenvectors as columns, in the order of `values`.
    pub vectors: Mat<T::Complex>,
    pub info: ConvergenceInfo<T::Complex>,
}

/// Partial Schur decomposition `A·Q ≈ Q·S` returned by [`schursolve`].
#[derive(Debug, Clone)]
pub struct SchurOutput<T: Scalar> {
    /// The (quasi-)upper-triangular `m × m` Schur block `S`.
    pub schur: Mat<T>,
    /// The orthonormal Schur vectors `Q` as columns.
    pub vectors: Mat<T>,
    /// The eigenvalues of `S`, in diagonal order.
    pub values: Vec<T::Complex>,
    pub info: ConvergenceInfo<T>,
}

/// Computes `howmany` eigenvalues of `operator` selected by `which`, with their
/// eigenvectors.
///
/// The returned count is at least `howmany` (and at least the converged count). For a real
/// operator it exceeds that by one when the last wanted eigenvalue belongs to a
/// complex-conjugate pair, so that both members of the pair are returned. It is lower only
/// if the Krylov subspace generated by `x0` is an invariant subspace of smaller dimension.
///
/// # Arguments
/// * `operator`: A square linear operator `A` implementing [`LinearOperator`].
/// * `x0`: The starting vector, an `n × 1` column. Must not be zero.
/// * `howmany`: The number of wanted eigenvalues. Must be smaller than `config.krylovdim`.
/// * `which`: The selection criterion.
/// * `config`: The algorithm parameters.
///
/// # Returns
/// A [`Result`] containing the [`EigsolveOutput`] on success, or a [`KrylovError`] if the
/// parameters are invalid (checked before the operator is applied) or the dense Schur step
/// fails.
///
/// # Example
/// ```
/// use faer::Mat;
/// use krylov_schur::{ArnoldiConfig, Which, eigsolve};
///
/// let a = Mat::from_fn(100, 100, |i, j| if i == j { (i + 1) as f64 } else { 0.0 });
/// let x0 = Mat::from_fn(100, 1, |_, _| 1.0);
/// let config = ArnoldiConfig::default().with_krylovdim(20).with_tol(1e-10);
///
/// let out = eigsolve(&a, x0.as_ref(), 2, Which::LargestMagnitude, &config).unwrap();
/// assert!(out.info.converged >= 2);
/// assert!((out.values[0].re - 100.0).abs() < 1e-8);
/// assert!((out.values[1].re - 99.0).abs() < 1e-8);
/// ```
pub fn eigsolve<T, A>(
    operator: &A,
    x0: MatRef<'_, T>,
    howmany: usize,
    which: Which,
    config: &ArnoldiConfig,
) -> Result<EigsolveOutput<T>, KrylovError>
where
    T: Scalar,
    A: LinearOperator<T> + ?Sized,
{
    let outcome = krylov_schur(operator, x0, howmany, which, config, None)?;
    Ok(extract_eigenpairs(&outcome))
}

/// Computes a partial Schur decomposition spanning the `howmany` eigenvalues of
/// `operator` selected by `which`.
///
/// Unlike [`eigsolve`], the returned basis is orthonormal, which makes it the better choice
/// for operators with (nearly) defective eigenvalues. The count follows the same rules as
/// in [`eigsolve`]; for real operators `S` keeps complex-conjugate pairs in 2×2 blocks.
///
/// # Errors
/// Same as [`eigsolve`].
pub fn schursolve<T, A>(
    operator: &A,
    x0: MatRef<'_, T>,
    howmany: usize,
    which: Which,
    config: &ArnoldiConfig,
) -> Result<SchurOutput<T>, KrylovError>
where
    T: Scalar,
    A: LinearOperator<T> + ?Sized,
{
    let outcome = krylov_schur(operator, x0, howmany, which, config, None)?;
    Ok(extract_schur(&outcome))
}

fn extract_eigenpairs<T: Scalar>(outcome: &KrylovSchurOutcome<T>) -> EigsolveOutput<T> {
    let fact = &outcome.factorization;
    let k = fact.length();
    let m = outcome.howmany;
    let beta = fact.residual_norm();

    let (values, y) = schur_eigenvectors(outcome.schur.as_ref().submatrix(0, 0, m, m));
    let mut x: Mat<T::Complex> = Mat::zeros(k, m);
    lift_coefficients(outcome.transform.as_ref(), y.as_ref(), x.as_mut());
    let vectors = fact.basis().combine_complex(x.as_ref());

    // A·v - λ·v = β·r̂·x[k-1].
    let weights: Vec<T::Complex> = (0..m)
        .map(|j| T::Complex::mul_real_impl(&x[(k - 1, j)], &beta))
        .collect();
    let rhat = fact.residual_direction();
    let residuals = Mat::from_fn(rhat.nrows(), m, |i, j| rhat[(i, 0)].to_complex() * weights[j]);

    EigsolveOutput {
        values,
        vectors,
        info: ConvergenceInfo {
            converged: outcome.converged,
            residual_norms: weights.iter().map(T::Complex::abs_impl).collect(),
            residuals,
            numiter: outcome.numiter,
            numops: fact.numops(),
        },
    }
}

fn extract_schur<T: Scalar>(outcome: &KrylovSchurOutcome<T>) -> SchurOutput<T> {
    let fact = &outcome.factorization;
    let k = fact.length();
    let m = outcome.howmany;
    let beta = fact.residual_norm();

    let t = outcome.schur.as_ref();
    let u = outcome.transform.as_ref();
    let schur = Mat::from_fn(m, m, |i, j| t[(i, j)]);
    let vectors = fact.basis().combine(u.submatrix(0, 0, k, m));

    // A·q - Q·s = β·r̂·U[k-1, j].
    let weights: Vec<T> = (0..m).map(|j| T::mul_real_impl(&u[(k - 1, j)], &beta)).collect();
    let rhat = fact.residual_direction();
    let residuals = Mat::from_fn(rhat.nrows(), m, |i, j| rhat[(i, 0)] * weights[j]);

    SchurOutput {
        values: schur_eigenvalues(schur.as_ref()),
        schur,
        vectors,
        info: ConvergenceInfo {
            converged: outcome.converged,
            residual_norms: weights.iter().map(T::abs_impl).collect(),
            residuals,
            numiter: outcome.numiter,
            numops: fact.numops(),
        },
    }
}
