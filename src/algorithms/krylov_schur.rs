//! The restarted Arnoldi iteration in Krylov-Schur form.
//!
//! ** NOTE: We recommend using [`crate::solvers::eigsolve`] or [`crate::solvers::schursolve`]
//! instead. This module returns the raw final state of the iteration (Schur form, Schur
//! transform and factorization), for callers that post-process it themselves.
//!
//! Every outer iteration runs three phases:
//!
//! 1. **Extend** the Arnoldi factorization one operator application at a time until it
//!    reaches `krylovdim` vectors (or breaks down, or holds `howmany` vectors in eager mode).
//! 2. **Diagonalize and sort**: compute the Schur form $\mathbf{H} = \mathbf{U}\mathbf{T}\mathbf{U}^H$
//!    of the Rayleigh quotient, move the wanted eigenvalues to the front, and read the
//!    residual of every Schur vector from $\mathbf{f} = \beta\,\mathbf{U}_{k,:}$. The
//!    converged eigenvalues form the prefix on which $|f_i| < \mathrm{tol}$.
//! 3. **Restart**: keep the leading `keep` Schur vectors. The basis is rotated onto them by
//!    reflectors, the residual row $\mathbf{f}$ becomes the new last row of the Rayleigh
//!    quotient, and a second sweep of reflectors restores Hessenberg form. All dense scratch
//!    is allocated once for the maximum dimension and reused by every iteration.

use super::arnoldi::ArnoldiFactorization;
use super::householder::Reflector;
use super::schur::{hessenberg_schur, permute_schur, schur_eigenvalues};
use super::select::Which;
use crate::config::ArnoldiConfig;
use crate::error::{KrylovError, KrylovErrorKind};
use crate::matrix::LinearOperator;
use crate::scalar::Scalar;
use faer::traits::ComplexField;
use faer::linalg::matmul::matmul;
use faer::prelude::{Reborrow, ReborrowMut};
use faer::{Accum, Mat, MatMut, MatRef, Par};

/// Snapshot of one processed iteration, passed to the optional observer.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// One-based index of the outer iteration.
    pub numiter: usize,
    /// Length of the factorization that was diagonalized.
    pub dimension: usize,
    /// Number of converged eigenvalues, counted as a prefix of the sorted Schur form.
    pub converged: usize,
    /// Residual norm of the factorization.
    pub residual_norm: f64,
    /// Number of retained vectors if this iteration restarts.
    pub keep: Option<usize>,
}

/// Observer invoked once per processed iteration.
pub type KrylovSchurCallback<'a> = dyn FnMut(&IterationReport) + 'a;

/// Final state of a Krylov-Schur run.
#[derive(Debug, Clone)]
pub struct KrylovSchurOutcome<T: Scalar> {
    /// Sorted `k × k` (quasi-)triangular Schur form of the last Rayleigh quotient.
    pub schur: Mat<T>,
    /// Unitary `k × k` transform with `H = U·T·U*`.
    pub transform: Mat<T>,
    /// The factorization the Schur form belongs to.
    pub factorization: ArnoldiFactorization<T>,
    /// Number of leading Schur directions to report: the request, raised to the converged
    /// count and completed so that no conjugate pair is split.
    pub howmany: usize,
    /// Number of converged leading Schur directions.
    pub converged: usize,
    /// Number of outer iterations.
    pub numiter: usize,
}

/// Dense scratch of one outer iteration, reused across iterations.
#[derive(Debug)]
struct Workspace<T: Scalar> {
    /// Holds `T` in its leading `k × k` block, and the restarted Rayleigh quotient in its
    /// leading `(keep+1) × keep` block.
    hh: Mat<T>,
    uu: Mat<T>,
    f: Vec<T>,
}

impl<T: Scalar> Workspace<T> {
    fn new(krylovdim: usize) -> Self {
        Self {
            hh: Mat::zeros(krylovdim + 1, krylovdim),
            uu: Mat::zeros(krylovdim, krylovdim),
            f: vec![T::zero_impl(); krylovdim],
        }
    }

    fn schur_form(&self, k: usize) -> MatRef<'_, T> {
        self.hh.as_ref().submatrix(0, 0, k, k)
    }

    /// Phase 2: sorted Schur form of the factorization's Rayleigh quotient and its residual
    /// row `f = β·U[k-1, :]`.
    fn diagonalize(
        &mut self,
        fact: &ArnoldiFactorization<T>,
        which: Which,
    ) -> Result<(), KrylovError> {
        let k = fact.length();
        let mut t = self.hh.as_mut().submatrix_mut(0, 0, k, k);
        let mut u = self.uu.as_mut().submatrix_mut(0, 0, k, k);
        t.copy_from(fact.hessenberg());
        u.fill(T::zero_impl());
        u.rb_mut().diagonal_mut().column_vector_mut().fill(T::one_impl());

        hessenberg_schur(t.rb_mut(), u.rb_mut())?;
        let values = schur_eigenvalues(t.rb());
        let order = which.sort_permutation(&values);
        permute_schur(t.rb_mut(), u.rb_mut(), &order);

        let beta = T::from_real_impl(&fact.residual_norm());
        for (j, fj) in self.f[..k].iter_mut().enumerate() {
            *fj = u[(k - 1, j)] * beta;
        }
        Ok(())
    }

    /// Length of the prefix of Schur directions with `|f_i| < tol`.
    fn count_converged(&self, k: usize, tol: T::Real) -> usize {
        self.f[..k].iter().take_while(|fi| T::abs_impl(fi) < tol).count()
    }

    /// Phase 3: truncates the factorization of length `k` to its leading `keep` sorted Schur
    /// directions and restores Hessenberg form.
    fn restart(&mut self, fact: &mut ArnoldiFactorization<T>, keep: usize) {
        let k = fact.length();

        // B ← B·U[:, 0..keep], one reflector per retained column.
        let mut u = self.uu.as_mut().submatrix_mut(0, 0, k, k);
        for j in 0..keep {
            let (reflector, _) = Reflector::from_column(u.rb(), j..k, j, j);
            reflector.apply_left_to_cols(u.rb_mut(), j + 1..k);
            fact.basis_mut().reflect(&reflector);
        }
        fact.shrink(keep);

        // The leading block of T, bordered by the residual row.
        let mut h = self.hh.as_mut().submatrix_mut(0, 0, keep + 1, keep);
        for (j, &fj) in self.f[..keep].iter().enumerate() {
            h[(keep, j)] = fj;
        }

        // Back to Hessenberg form, last row first.
        for j in (1..=keep).rev() {
            let (reflector, nu) = Reflector::from_row(h.rb(), j, 0..j, j - 1);
            h[(j, j - 1)] = T::from_real_impl(&nu);
            h.rb_mut().submatrix_mut(j, 0, 1, j - 1).fill(T::zero_impl());
            reflector.apply_left_to_cols(h.rb_mut(), 0..keep);
            reflector.apply_right_adjoint(h.rb_mut(), 0..j);
            fact.basis_mut().reflect(&reflector);
        }

        fact.rayleigh_quotient_mut().copy_from(h.rb());
        fact.sync_residual_norm();
    }
}

/// Number of Schur directions to keep at a restart.
///
/// Lies in `converged..krylovdim` and is raised by one when it would split a 2×2 block.
fn restart_dimension<T: Scalar>(
    t: MatRef<'_, T>,
    krylovdim: usize,
    converged: usize,
    howmany: usize,
) -> Result<usize, KrylovError> {
    let mut keep = (3 * krylovdim + 2 * converged) / 5;
    if T::PAIRED_SPECTRUM && t[(keep, keep - 1)] != T::zero_impl() {
        keep += 1;
        if keep >= krylovdim {
            return Err(KrylovErrorKind::DimensionTooSmall { krylovdim, howmany }.into());
        }
    }
    Ok(keep)
}

/// Runs the restarted Arnoldi iteration until `howmany` eigenvalues selected by `which`
/// have converged or `config.maxiter` restarts have been performed.
///
/// The parameters are validated before the operator is applied for the first time. Not
/// converging within the iteration cap is not an error; compare
/// [`KrylovSchurOutcome::converged`] with the request.
///
/// # Errors
/// - [`KrylovErrorKind::DimensionTooSmall`] if `howmany >= krylovdim`, or if a restart
///   cannot keep a conjugate pair intact below `krylovdim`.
/// - [`KrylovErrorKind::InputError`] and [`KrylovErrorKind::DimensionMismatch`] for invalid
///   input.
/// - [`KrylovErrorKind::SchurNoConvergence`] if the dense Schur step fails.
pub fn krylov_schur<T, A>(
    operator: &A,
    x0: MatRef<'_, T>,
    howmany: usize,
    which: Which,
    config: &ArnoldiConfig,
    mut callback: Option<&mut KrylovSchurCallback<'_>>,
) -> Result<KrylovSchurOutcome<T>, KrylovError>
where
    T: Scalar,
    A: LinearOperator<T> + ?Sized,
{
    let n = operator.ncols();
    config.validate(howmany, n)?;

    let krylovdim = config.krylovdim.min(n);
    if krylovdim < config.krylovdim {
        log::debug!("Krylov dimension {} clamped to the operator dimension {n}.", config.krylovdim);
    }
    let tol = T::Real::from_f64_impl(config.tol);
    let mut howmany = howmany;

    let mut fact = ArnoldiFactorization::start(operator, x0, krylovdim, config.orth)?;
    let mut ws = Workspace::new(krylovdim);
    let mut numiter = 1;
    let mut converged = 0;
    let mut keep = None;

    loop {
        let beta = fact.residual_norm();
        let k = fact.length();

        if k == krylovdim || beta <= tol || (config.eager && k >= howmany) {
            ws.diagonalize(&fact, which)?;
            converged = ws.count_converged(k, tol);

            if beta <= tol && k < howmany {
                log::warn!(
                    "Invariant subspace of dimension {k} found, smaller than the {howmany} requested eigenvalues."
                );
                howmany = k;
            }

            let restarting = converged < howmany && beta > tol && k == krylovdim;
            keep = if restarting && numiter < config.maxiter {
                Some(restart_dimension(ws.schur_form(k), krylovdim, converged, howmany)?)
            } else {
                None
            };

            let first_unconverged = ws.f[..k].get(converged).map_or(0.0_f64, |fi| T::abs_impl(fi).into());
            log::debug!(
                "Krylov-Schur iteration {numiter}: dimension {k}, {converged} converged, next residual {first_unconverged:.3e}"
            );
            if let Some(cb) = callback.as_deref_mut() {
                cb(&IterationReport {
                    numiter,
                    dimension: k,
                    converged,
                    residual_norm: beta.into(),
                    keep,
                });
            }

            if converged >= howmany || beta <= tol {
                log::info!(
                    "Krylov-Schur converged {converged} eigenvalues after {numiter} iterations and {} operator applications.",
                    fact.numops()
                );
                break;
            }
        }

        if k < krylovdim {
            fact.extend(operator);
        } else {
            if numiter == config.maxiter {
                log::warn!(
                    "Krylov-Schur stopped after {numiter} iterations with {converged} of {howmany} eigenvalues converged."
                );
                break;
            }
            let keep = match keep.take() {
                Some(keep) => keep,
                None => restart_dimension(ws.schur_form(k), krylovdim, converged, howmany)?,
            };
            log::trace!("Restarting with {keep} of {k} Schur vectors.");
            ws.restart(&mut fact, keep);
            numiter += 1;
        }
    }

    let k = fact.length();
    let t = ws.schur_form(k);
    howmany = howmany.max(converged);
    if T::PAIRED_SPECTRUM && howmany < k && t[(howmany, howmany - 1)] != T::zero_impl() {
        howmany += 1;
    }

    Ok(KrylovSchurOutcome {
        schur: Mat::from_fn(k, k, |i, j| t[(i, j)]),
        transform: Mat::from_fn(k, k, |i, j| ws.uu[(i, j)]),
        factorization: fact,
        howmany,
        converged,
        numiter,
    })
}

/// Writes `x = U[:, 0..m]·y` into `x` for an `m`-column coefficient block `y`, lifting the
/// Schur transform to the complex extension.
pub(crate) fn lift_coefficients<T: Scalar>(
    u: MatRef<'_, T>,
    y: MatRef<'_, T::Complex>,
    x: MatMut<'_, T::Complex>,
) {
    let lifted = Mat::from_fn(u.nrows(), y.nrows(), |i, l| u[(i, l)].to_complex());
    matmul(x, Accum::Replace, lifted.as_ref(), y, T::Complex::one_impl(), Par::Seq);
}
