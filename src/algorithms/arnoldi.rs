//! Incrementally extensible Arnoldi factorization.
//!
//! ** NOTE: We recommend using the high-level entry points in [`crate::solvers`] instead.
//!
//! After `k` steps the factorization satisfies the Arnoldi relation
//!
//! $$ \mathbf{A}\mathbf{B}_k = \mathbf{B}_k\mathbf{H}_k + \beta_k \hat{\mathbf{r}}\mathbf{e}_k^T, $$
//!
//! with an orthonormal basis $\mathbf{B}_k$, an upper-Hessenberg $\mathbf{H}_k$ and a unit
//! residual direction $\hat{\mathbf{r}}$ orthogonal to the basis. Storage is allocated once
//! for the maximum dimension: the basis holds `capacity + 1` columns (column `k` holds
//! $\hat{\mathbf{r}}$) and the Hessenberg buffer is `(capacity + 1) × capacity`, whose row
//! `k` is the residual row $\beta_k \mathbf{e}_k^T$. A restart may replace that row with a
//! general vector before it is reduced back to Hessenberg form, which is why it is stored
//! densely.

use super::householder::Reflector;
use crate::error::{KrylovError, KrylovErrorKind};
use crate::matrix::LinearOperator;
use crate::scalar::Scalar;
use faer::traits::ComplexField;
use faer::linalg::matmul::{dot::inner_prod, matmul};
use faer::prelude::{Reborrow, ReborrowMut};
use faer::{Accum, Conj, Mat, MatMut, MatRef, Par};
use serde::{Deserialize, Serialize};

/// Maximum number of passes of the iteratively refined Gram-Schmidt variants.
const MAX_REFINEMENT_PASSES: usize = 5;

/// Orthogonalization scheme used when a new Krylov vector is added to the basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Orthogonalizer {
    /// One pass of classical Gram-Schmidt.
    ClassicalGramSchmidt,
    /// One pass of modified Gram-Schmidt.
    ModifiedGramSchmidt,
    /// Classical Gram-Schmidt applied twice.
    ClassicalGramSchmidt2,
    /// Modified Gram-Schmidt applied twice.
    ModifiedGramSchmidt2,
    /// Classical Gram-Schmidt, repeated while a pass shrinks the norm below `η` times its
    /// previous value.
    ClassicalGramSchmidtIR(f64),
    /// Modified Gram-Schmidt with the same refinement criterion.
    ModifiedGramSchmidtIR(f64),
}

impl Default for Orthogonalizer {
    fn default() -> Self {
        Orthogonalizer::ModifiedGramSchmidtIR(std::f64::consts::FRAC_1_SQRT_2)
    }
}

impl Orthogonalizer {
    /// Removes from the column `w` its components along the columns of `basis`, adding the
    /// removed coefficients to `coeffs` (one row per basis column). Returns the norm of the
    /// result.
    pub(crate) fn orthogonalize<T: Scalar>(
        self,
        basis: MatRef<'_, T>,
        mut w: MatMut<'_, T>,
        mut coeffs: MatMut<'_, T>,
    ) -> T::Real {
        coeffs.fill(T::zero_impl());
        match self {
            Orthogonalizer::ClassicalGramSchmidt => {
                classical_pass(basis, w.rb_mut(), coeffs.rb_mut());
                w.norm_l2()
            }
            Orthogonalizer::ModifiedGramSchmidt => {
                modified_pass(basis, w.rb_mut(), coeffs.rb_mut());
                w.norm_l2()
            }
            Orthogonalizer::ClassicalGramSchmidt2 => {
                classical_pass(basis, w.rb_mut(), coeffs.rb_mut());
                classical_pass(basis, w.rb_mut(), coeffs.rb_mut());
                w.norm_l2()
            }
            Orthogonalizer::ModifiedGramSchmidt2 => {
                modified_pass(basis, w.rb_mut(), coeffs.rb_mut());
                modified_pass(basis, w.rb_mut(), coeffs.rb_mut());
                w.norm_l2()
            }
            Orthogonalizer::ClassicalGramSchmidtIR(eta) => {
                refine(eta, w, |w| classical_pass(basis, w, coeffs.rb_mut()))
            }
            Orthogonalizer::ModifiedGramSchmidtIR(eta) => {
                refine(eta, w, |w| modified_pass(basis, w, coeffs.rb_mut()))
            }
        }
    }
}

fn refine<T: Scalar>(
    eta: f64,
    mut w: MatMut<'_, T>,
    mut pass: impl FnMut(MatMut<'_, T>),
) -> T::Real {
    let eta = T::Real::from_f64_impl(eta);
    let mut previous = w.norm_l2();
    pass(w.rb_mut());
    let mut current = w.norm_l2();
    let mut passes = 1;
    while current < eta * previous && passes < MAX_REFINEMENT_PASSES {
        previous = current;
        pass(w.rb_mut());
        current = w.norm_l2();
        passes += 1;
    }
    current
}

/// `c = B*·w`, `w ← w - B·c`, `coeffs += c`.
fn classical_pass<T: Scalar>(basis: MatRef<'_, T>, mut w: MatMut<'_, T>, mut coeffs: MatMut<'_, T>) {
    let mut c = Mat::<T>::zeros(basis.ncols(), 1);
    matmul(
        c.as_mut(),
        Accum::Replace,
        basis.adjoint(),
        w.rb(),
        T::one_impl(),
        Par::Seq,
    );
    matmul(w.rb_mut(), Accum::Add, basis, c.as_ref(), -T::one_impl(), Par::Seq);
    for j in 0..c.nrows() {
        coeffs[(j, 0)] += c[(j, 0)];
    }
}

fn modified_pass<T: Scalar>(basis: MatRef<'_, T>, mut w: MatMut<'_, T>, mut coeffs: MatMut<'_, T>) {
    for j in 0..basis.ncols() {
        let cj = inner_prod(basis.col(j).transpose(), Conj::Yes, w.rb().col(0), Conj::No);
        for i in 0..w.nrows() {
            w[(i, 0)] -= basis[(i, j)] * cj;
        }
        coeffs[(j, 0)] += cj;
    }
}

/// A set of orthonormal vectors stored as the columns of a preallocated matrix.
#[derive(Debug, Clone)]
pub struct OrthonormalBasis<T: Scalar> {
    vectors: Mat<T>,
    len: usize,
    work: Vec<T>,
}

impl<T: Scalar> OrthonormalBasis<T> {
    /// Allocates room for `capacity` vectors of dimension `dim`.
    pub fn new(dim: usize, capacity: usize) -> Self {
        Self {
            vectors: Mat::zeros(dim, capacity),
            len: 0,
            work: vec![T::zero_impl(); dim],
        }
    }

    /// Dimension of the vectors.
    #[inline]
    pub fn dim(&self) -> usize {
        self.vectors.nrows()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// View of the first `len` vectors.
    pub fn as_ref(&self) -> MatRef<'_, T> {
        self.vectors.as_ref().subcols(0, self.len)
    }

    /// View of the full storage, including columns beyond the current length.
    pub(crate) fn storage(&self) -> MatRef<'_, T> {
        self.vectors.as_ref()
    }

    pub(crate) fn storage_mut(&mut self) -> MatMut<'_, T> {
        self.vectors.as_mut()
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.vectors.ncols());
        self.len = len;
    }

    /// `B ← B·H*` on the basis columns the reflector acts on.
    ///
    /// This is how the restart compresses the basis: the change of basis is applied one
    /// reflection at a time and never formed as a dense matrix.
    pub fn reflect(&mut self, reflector: &Reflector<T>) {
        let n = self.dim();
        reflector.apply_right_adjoint_with(self.vectors.as_mut(), 0..n, &mut self.work);
    }

    /// Returns the linear combination `B[:, 0..c.nrows()]·c` of the stored columns.
    pub fn combine(&self, coeffs: MatRef<'_, T>) -> Mat<T> {
        let leading = self.leading(coeffs.nrows());
        let mut out = Mat::zeros(self.dim(), coeffs.ncols());
        matmul(out.as_mut(), Accum::Replace, leading, coeffs, T::one_impl(), Par::Seq);
        out
    }

    /// Same as [`OrthonormalBasis::combine`] with coefficients from the complex extension,
    /// e.g. eigenvector coefficients of a real Rayleigh quotient.
    pub fn combine_complex(&self, coeffs: MatRef<'_, T::Complex>) -> Mat<T::Complex> {
        let leading = self.leading(coeffs.nrows());
        let lifted = Mat::from_fn(leading.nrows(), leading.ncols(), |i, j| {
            leading[(i, j)].to_complex()
        });
        let mut out = Mat::zeros(self.dim(), coeffs.ncols());
        matmul(
            out.as_mut(),
            Accum::Replace,
            lifted.as_ref(),
            coeffs,
            T::Complex::one_impl(),
            Par::Seq,
        );
        out
    }

    fn leading(&self, k: usize) -> MatRef<'_, T> {
        assert!(
            k <= self.vectors.ncols(),
            "Cannot combine {k} basis vectors; the basis stores {}.",
            self.vectors.ncols()
        );
        self.vectors.as_ref().subcols(0, k)
    }
}

/// An Arnoldi factorization `A·B_k = B_k·H_k + β_k·r̂·e_kᵀ` with preallocated storage.
#[derive(Debug, Clone)]
pub struct ArnoldiFactorization<T: Scalar> {
    basis: OrthonormalBasis<T>,
    h: Mat<T>,
    k: usize,
    beta: T::Real,
    orth: Orthogonalizer,
    numops: usize,
    w: Mat<T>,
    coeffs: Mat<T>,
}

impl<T: Scalar> ArnoldiFactorization<T> {
    /// Starts a factorization of length one from the vector `x0`, which is normalized
    /// first. Performs one operator application.
    ///
    /// # Errors
    /// - [`KrylovErrorKind::InputError`] if the operator is not square, `x0` is not a single
    ///   column, `capacity` is zero, or `x0` is zero or not finite.
    /// - [`KrylovErrorKind::DimensionMismatch`] if `x0` does not match the operator.
    pub fn start<A: LinearOperator<T> + ?Sized>(
        operator: &A,
        x0: MatRef<'_, T>,
        capacity: usize,
        orth: Orthogonalizer,
    ) -> Result<Self, KrylovError> {
        let n = operator.ncols();
        if operator.nrows() != n {
            return Err(KrylovErrorKind::InputError(format!(
                "The operator must be square, but it is {}x{n}.",
                operator.nrows()
            ))
            .into());
        }
        if x0.nrows() != n {
            return Err(KrylovErrorKind::DimensionMismatch {
                operator_cols: n,
                vector_rows: x0.nrows(),
            }
            .into());
        }
        if x0.ncols() != 1 {
            return Err(KrylovErrorKind::InputError(format!(
                "The starting vector `x0` must have exactly one column, but it has {}.",
                x0.ncols()
            ))
            .into());
        }
        if capacity == 0 {
            return Err(KrylovErrorKind::InputError(
                "The Krylov dimension must be at least 1.".to_string(),
            )
            .into());
        }

        let x0_norm = x0.norm_l2();
        if !T::Real::is_finite_impl(&x0_norm) {
            return Err(KrylovErrorKind::InputError(
                "The starting vector `x0` must have finite entries.".to_string(),
            )
            .into());
        }
        if x0_norm == T::Real::zero_impl() {
            return Err(KrylovErrorKind::InputError(
                "The starting vector `x0` must not be a zero vector.".to_string(),
            )
            .into());
        }

        let mut basis = OrthonormalBasis::new(n, capacity + 1);
        let inv = T::from_real_impl(&T::Real::recip_impl(&x0_norm));
        {
            let mut storage = basis.storage_mut();
            for i in 0..n {
                storage[(i, 0)] = x0[(i, 0)] * inv;
            }
        }
        basis.set_len(1);

        let mut fact = Self {
            basis,
            h: Mat::zeros(capacity + 1, capacity),
            k: 0,
            beta: T::Real::zero_impl(),
            orth,
            numops: 0,
            w: Mat::zeros(n, 1),
            coeffs: Mat::zeros(capacity + 1, 1),
        };
        fact.step(operator);
        Ok(fact)
    }

    /// Extends the factorization by one vector, applying the operator once.
    ///
    /// Returns `false` (and does nothing) when the factorization already has the maximum
    /// length it was allocated for.
    pub fn extend<A: LinearOperator<T> + ?Sized>(&mut self, operator: &A) -> bool {
        if self.k >= self.max_length() {
            return false;
        }
        self.step(operator);
        true
    }

    /// Adds column `k` (the current residual direction) to the basis proper.
    fn step<A: LinearOperator<T> + ?Sized>(&mut self, operator: &A) {
        let k = self.k;
        let n = self.basis.dim();

        let y = operator.apply(self.basis.storage().subcols(k, 1));
        self.numops += 1;
        assert!(
            y.nrows() == n && y.ncols() == 1,
            "The operator returned a {}x{} result for a vector of length {n}.",
            y.nrows(),
            y.ncols()
        );
        self.w.as_mut().copy_from(y.as_ref());

        let beta = self.orth.orthogonalize(
            self.basis.storage().subcols(0, k + 1),
            self.w.as_mut(),
            self.coeffs.as_mut().subrows_mut(0, k + 1),
        );
        self.h
            .as_mut()
            .submatrix_mut(0, k, k + 1, 1)
            .copy_from(self.coeffs.as_ref().subrows(0, k + 1));
        self.h[(k + 1, k)] = T::from_real_impl(&beta);

        let mut storage = self.basis.storage_mut();
        if beta > T::Real::zero_impl() {
            let inv = T::from_real_impl(&T::Real::recip_impl(&beta));
            for i in 0..n {
                storage[(i, k + 1)] = self.w[(i, 0)] * inv;
            }
        } else {
            storage.col_mut(k + 1).fill(T::zero_impl());
        }

        self.beta = beta;
        self.k = k + 1;
        self.basis.set_len(self.k);
    }

    /// The current number of basis vectors `k`.
    #[inline]
    pub fn length(&self) -> usize {
        self.k
    }

    /// The maximum length the storage allows.
    #[inline]
    pub fn max_length(&self) -> usize {
        self.h.ncols()
    }

    /// The residual norm `β_k`.
    #[inline]
    pub fn residual_norm(&self) -> T::Real {
        self.beta
    }

    /// Number of operator applications performed so far.
    #[inline]
    pub fn numops(&self) -> usize {
        self.numops
    }

    /// The `k × k` Hessenberg matrix `H_k`.
    pub fn hessenberg(&self) -> MatRef<'_, T> {
        self.h.as_ref().submatrix(0, 0, self.k, self.k)
    }

    /// The `(k+1) × k` Rayleigh quotient including the residual row, mutable.
    ///
    /// Callers that modify it must keep the Arnoldi relation intact, as the restart does.
    pub fn rayleigh_quotient_mut(&mut self) -> MatMut<'_, T> {
        let k = self.k;
        self.h.as_mut().submatrix_mut(0, 0, k + 1, k)
    }

    /// The orthonormal basis `B_k`.
    #[inline]
    pub fn basis(&self) -> &OrthonormalBasis<T> {
        &self.basis
    }

    /// Mutable access to the basis, for in-place changes of basis.
    #[inline]
    pub fn basis_mut(&mut self) -> &mut OrthonormalBasis<T> {
        &mut self.basis
    }

    /// The unit residual direction `r̂` (column `k` of the basis storage).
    pub fn residual_direction(&self) -> MatRef<'_, T> {
        self.basis.storage().subcols(self.k, 1)
    }

    /// The residual vector `β_k·r̂`.
    pub fn residual(&self) -> Mat<T> {
        let beta = T::from_real_impl(&self.beta);
        let r = self.residual_direction();
        Mat::from_fn(r.nrows(), 1, |i, _| r[(i, 0)] * beta)
    }

    /// Truncates the factorization to length `keep`.
    ///
    /// The residual direction moves from column `k` to column `keep`, and the Hessenberg
    /// buffer is cleared outside its leading `(keep+1) × keep` block. The caller then
    /// writes the new Rayleigh quotient and residual row through
    /// [`ArnoldiFactorization::rayleigh_quotient_mut`] and calls
    /// [`ArnoldiFactorization::sync_residual_norm`].
    pub fn shrink(&mut self, keep: usize) {
        assert!(
            keep >= 1 && keep <= self.k,
            "Cannot shrink a factorization of length {} to {keep}.",
            self.k
        );
        let k = self.k;
        if keep < k {
            let (mut dst, src) = self.basis.storage_mut().two_cols_mut(keep, k);
            dst.copy_from(&src);
        }
        let (rows, cols) = (self.h.nrows(), self.h.ncols());
        self.h
            .as_mut()
            .subcols_mut(keep, cols - keep)
            .fill(T::zero_impl());
        self.h
            .as_mut()
            .submatrix_mut(keep + 1, 0, rows - keep - 1, keep)
            .fill(T::zero_impl());
        self.k = keep;
        self.basis.set_len(keep);
    }

    /// Re-reads `β_k` from the residual row after the Rayleigh quotient was rewritten.
    ///
    /// The row must have been reduced to `β_k·e_kᵀ` with `β_k` real and non-negative.
    pub fn sync_residual_norm(&mut self) {
        let k = self.k;
        self.beta = T::real_part_impl(&self.h[(k, k - 1)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn random_matrix(n: usize, seed: u64) -> Mat<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0))
    }

    fn random_vector(n: usize, seed: u64) -> Mat<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, 1, |_, _| rng.random_range(-1.0..1.0))
    }

    /// max |A·B_k - B_k·H_k - β·r̂·e_kᵀ|.
    fn arnoldi_relation_error<T: Scalar<Real = f64>>(
        operator: &impl LinearOperator<T>,
        fact: &ArnoldiFactorization<T>,
    ) -> f64 {
        let k = fact.length();
        let b = fact.basis().as_ref();
        let h = fact.hessenberg();
        let r = fact.residual();
        let n = b.nrows();
        let mut err = 0.0_f64;
        for j in 0..k {
            let ab = operator.apply(b.subcols(j, 1));
            for i in 0..n {
                let mut bh = T::zero_impl();
                for l in 0..k {
                    bh += b[(i, l)] * h[(l, j)];
                }
                if j == k - 1 {
                    bh += r[(i, 0)];
                }
                err = err.max(T::abs_impl(&(ab[(i, 0)] - bh)));
            }
        }
        err
    }

    fn orthogonality_error<T: Scalar<Real = f64>>(b: MatRef<'_, T>) -> f64 {
        let mut err = 0.0_f64;
        for i in 0..b.ncols() {
            for j in 0..b.ncols() {
                let mut acc = T::zero_impl();
                for l in 0..b.nrows() {
                    acc += T::conj_impl(&b[(l, i)]) * b[(l, j)];
                }
                let expected = if i == j { T::one_impl() } else { T::zero_impl() };
                err = err.max(T::abs_impl(&(acc - expected)));
            }
        }
        err
    }

    #[test]
    fn test_arnoldi_relation_for_every_orthogonalizer() {
        let a = random_matrix(40, 1);
        let x0 = random_vector(40, 2);
        for orth in [
            Orthogonalizer::ClassicalGramSchmidt2,
            Orthogonalizer::ModifiedGramSchmidt,
            Orthogonalizer::ModifiedGramSchmidt2,
            Orthogonalizer::ClassicalGramSchmidtIR(0.7),
            Orthogonalizer::default(),
        ] {
            let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 12, orth).unwrap();
            while fact.extend(&a) {}
            assert_eq!(fact.length(), 12);
            assert_eq!(fact.numops(), 12);
            assert!(arnoldi_relation_error(&a, &fact) < 1e-12, "{orth:?}");
            assert!(orthogonality_error(fact.basis().as_ref()) < 1e-12, "{orth:?}");

            // The residual direction is orthogonal to the basis.
            let b = fact.basis().as_ref();
            let r = fact.residual_direction();
            for j in 0..b.ncols() {
                let d: f64 = (0..40).map(|i| b[(i, j)] * r[(i, 0)]).sum();
                assert!(d.abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_hessenberg_structure() {
        let a = random_matrix(20, 3);
        let x0 = random_vector(20, 4);
        let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 8, Orthogonalizer::default()).unwrap();
        while fact.extend(&a) {}
        let h = fact.hessenberg();
        for j in 0..8 {
            for i in j + 2..8 {
                assert_eq!(h[(i, j)], 0.0);
            }
        }
        assert!(fact.residual_norm() > 0.0);
    }

    #[test]
    fn test_complex_factorization() {
        let mut rng = StdRng::seed_from_u64(5);
        let a: Mat<Complex<f64>> = Mat::from_fn(25, 25, |_, _| {
            Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
        });
        let x0 = Mat::from_fn(25, 1, |i, _| Complex::new(1.0_f64, i as f64));
        let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 10, Orthogonalizer::default()).unwrap();
        while fact.extend(&a) {}
        assert!(arnoldi_relation_error(&a, &fact) < 1e-12);
        assert!(orthogonality_error(fact.basis().as_ref()) < 1e-12);
    }

    #[test]
    fn test_invariant_subspace_gives_zero_residual() {
        // x0 lies in the span of e0, e1, which a block-diagonal matrix leaves invariant.
        let mut a = Mat::<f64>::zeros(6, 6);
        a[(0, 0)] = 2.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = -1.0;
        a[(1, 1)] = 3.0;
        for i in 2..6 {
            a[(i, i)] = i as f64;
        }
        let x0 = Mat::from_fn(6, 1, |i, _| if i < 2 { 1.0 } else { 0.0 });
        let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 4, Orthogonalizer::default()).unwrap();
        fact.extend(&a);
        assert_eq!(fact.length(), 2);
        assert!(fact.residual_norm() < 1e-14);
    }

    #[test]
    fn test_start_rejects_bad_input() {
        let a = random_matrix(5, 6);
        let zero = Mat::<f64>::zeros(5, 1);
        let err = ArnoldiFactorization::start(&a, zero.as_ref(), 3, Orthogonalizer::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input parameter: The starting vector `x0` must not be a zero vector."
        );

        let short = random_vector(4, 7);
        let err = ArnoldiFactorization::start(&a, short.as_ref(), 3, Orthogonalizer::default())
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &KrylovErrorKind::DimensionMismatch {
                operator_cols: 5,
                vector_rows: 4
            }
        );
    }

    #[test]
    fn test_shrink_moves_residual_direction() {
        let a = random_matrix(15, 8);
        let x0 = random_vector(15, 9);
        let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 6, Orthogonalizer::default()).unwrap();
        while fact.extend(&a) {}
        let r = fact.residual_direction();
        let r_before = Mat::from_fn(15, 1, |i, _| r[(i, 0)]);
        fact.shrink(3);
        assert_eq!(fact.length(), 3);
        assert_eq!(fact.basis().len(), 3);
        for i in 0..15 {
            assert_eq!(fact.residual_direction()[(i, 0)], r_before[(i, 0)]);
        }
        let rq = fact.rayleigh_quotient_mut();
        assert_eq!((rq.nrows(), rq.ncols()), (4, 3));
    }

    #[test]
    fn test_basis_combine_and_reflect() {
        let a = random_matrix(10, 10);
        let x0 = random_vector(10, 11);
        let mut fact = ArnoldiFactorization::start(&a, x0.as_ref(), 4, Orthogonalizer::default()).unwrap();
        while fact.extend(&a) {}

        // Combining with e_2 picks out the third basis vector, in the complex extension too.
        let e2 = Mat::from_fn(4, 1, |i, _| if i == 2 { 1.0 } else { 0.0 });
        let e2c = Mat::from_fn(4, 1, |i, _| Complex::new(if i == 2 { 1.0 } else { 0.0 }, 0.0));
        let picked = fact.basis().combine(e2.as_ref());
        let picked_c = fact.basis().combine_complex(e2c.as_ref());
        for i in 0..10 {
            assert_eq!(picked[(i, 0)], fact.basis().as_ref()[(i, 2)]);
            assert_eq!(picked_c[(i, 0)], Complex::new(picked[(i, 0)], 0.0));
        }

        // A reflection keeps the basis orthonormal.
        let x = [0.3, -1.0, 0.5, 2.0];
        let (h, _) = Reflector::new(&x, 0..4, 1);
        fact.basis_mut().reflect(&h);
        assert!(orthogonality_error(fact.basis().as_ref()) < 1e-13);
    }
}
