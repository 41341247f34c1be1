//! Elementary unitary reflections (Householder reflectors).
//!
//! A [`Reflector`] represents the map $\mathbf{H} = \mathbf{I} - \beta \mathbf{v}\mathbf{v}^H$
//! restricted to a contiguous index range `r`. The essential vector $\mathbf{v}$ has a unit
//! entry at the pivot position. Constructed from a vector $\mathbf{x}$, it satisfies
//!
//! $$ \mathbf{H}\mathbf{x}_r = \nu\, \mathbf{e}_{pivot}, \qquad \nu = \|\mathbf{x}_r\|_2 \ge 0, $$
//!
//! so the pivot entry becomes a real, non-negative magnitude and every other entry of the
//! range is annihilated.
//!
//! All application routines are rank-1 updates whose cost is linear in the product of the
//! range sizes involved. The $|r| \times |r|$ reflection matrix is never formed; this is what
//! makes it cheap to compress the Arnoldi basis during a restart.
//!
//! For complex fields $\beta$ is complex and $\mathbf{H}$ is unitary but not Hermitian, so
//! undoing a reflection requires the adjoint $\mathbf{H}^H$, not a second application.

use crate::scalar::Scalar;
use faer::traits::ComplexField;
use faer::{MatMut, MatRef};
use std::ops::Range;

/// An elementary unitary reflection `I - β·v·v*` acting on the positions `range`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflector<T: Scalar> {
    beta: T,
    v: Vec<T>,
    range: Range<usize>,
}

/// Turns `x` into the essential vector of a reflector that maps `x` onto `ν·e_pivot`.
///
/// Returns `(β, ν)`. When `x` is already a non-negative real multiple of `e_pivot`, `β` is
/// exactly zero and `x` is left as is.
fn make_householder_in_place<T: Scalar>(x: &mut [T], pivot: usize) -> (T, T::Real) {
    let zero = T::Real::zero_impl();

    let mut sigma = zero;
    for (k, xk) in x.iter().enumerate() {
        if k != pivot {
            sigma += T::abs2_impl(xk);
        }
    }

    let xi = x[pivot];
    let re = T::real_part_impl(&xi);
    let im = T::imag_part_impl(&xi);
    if sigma == zero && im == zero && re >= zero {
        return (T::zero_impl(), re);
    }

    let nu = T::Real::sqrt_impl(&(T::abs2_impl(&xi) + sigma));

    // δ = x_pivot - ν. For a non-negative real part, the real part of the difference is
    // rewritten as -(σ + im²)/(re + ν) to avoid cancellation.
    let delta = if re < zero {
        xi - T::from_real_impl(&nu)
    } else {
        T::from_real_impl(&(-(sigma + im * im) / (re + nu))) + (xi - T::from_real_impl(&re))
    };

    let beta = -T::conj_impl(&delta) / T::from_real_impl(&nu);
    for (k, xk) in x.iter_mut().enumerate() {
        if k != pivot {
            *xk /= delta;
        }
    }
    x[pivot] = T::one_impl();

    (beta, nu)
}

impl<T: Scalar> Reflector<T> {
    /// Builds the reflector that zeros `x[range]` except at `pivot`.
    ///
    /// `x` is indexed with absolute positions; only the entries in `range` are read.
    /// Returns the reflector together with the achieved norm `ν`, the value the pivot entry
    /// takes when the reflector is applied to `x`.
    ///
    /// # Panics
    /// If `range` is empty, exceeds `x`, or does not contain `pivot`.
    pub fn new(x: &[T], range: Range<usize>, pivot: usize) -> (Self, T::Real) {
        assert!(
            range.start < range.end && range.end <= x.len(),
            "Reflector range {range:?} is empty or exceeds the vector length {}.",
            x.len()
        );
        assert!(
            range.contains(&pivot),
            "Pivot index {pivot} lies outside the reflector range {range:?}."
        );
        let mut v = x[range.clone()].to_vec();
        let (beta, nu) = make_householder_in_place(&mut v, pivot - range.start);
        (Self { beta, v, range }, nu)
    }

    /// Builds the reflector that zeros `a[rows, col]` except at row `pivot` when applied with
    /// [`Reflector::apply_left`].
    pub fn from_column(a: MatRef<'_, T>, rows: Range<usize>, col: usize, pivot: usize) -> (Self, T::Real) {
        assert!(
            rows.start < rows.end && rows.end <= a.nrows(),
            "Row range {rows:?} is empty or exceeds the matrix with {} rows.",
            a.nrows()
        );
        assert!(
            rows.contains(&pivot),
            "Pivot row {pivot} lies outside the range {rows:?}."
        );
        let mut v: Vec<T> = rows.clone().map(|i| a[(i, col)]).collect();
        let (beta, nu) = make_householder_in_place(&mut v, pivot - rows.start);
        (
            Self {
                beta,
                v,
                range: rows,
            },
            nu,
        )
    }

    /// Builds the reflector that zeros `a[row, cols]` except at column `pivot` when applied
    /// with [`Reflector::apply_right_adjoint`]. The row slice is conjugated before reflecting,
    /// so the surviving entry is the real, non-negative norm `ν`.
    pub fn from_row(a: MatRef<'_, T>, row: usize, cols: Range<usize>, pivot: usize) -> (Self, T::Real) {
        assert!(
            cols.start < cols.end && cols.end <= a.ncols(),
            "Column range {cols:?} is empty or exceeds the matrix with {} columns.",
            a.ncols()
        );
        assert!(
            cols.contains(&pivot),
            "Pivot column {pivot} lies outside the range {cols:?}."
        );
        let mut v: Vec<T> = cols.clone().map(|j| T::conj_impl(&a[(row, j)])).collect();
        let (beta, nu) = make_householder_in_place(&mut v, pivot - cols.start);
        (
            Self {
                beta,
                v,
                range: cols,
            },
            nu,
        )
    }

    /// Moves the reflector's range by `offset` positions, e.g. from a local work vector to
    /// the rows of the matrix it was extracted from.
    pub(crate) fn translated(mut self, offset: usize) -> Self {
        self.range = self.range.start + offset..self.range.end + offset;
        self
    }

    /// The scalar factor `β`. Exactly zero for the identity reflector.
    #[inline]
    pub fn beta(&self) -> T {
        self.beta
    }

    /// The essential vector `v`, with a unit entry at the pivot.
    #[inline]
    pub fn essential(&self) -> &[T] {
        &self.v
    }

    /// The positions the reflector acts on.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.beta == T::zero_impl()
    }

    /// In place: `x ← x - β·v·(v* x)` on the reflector's range.
    pub fn apply_left(&self, x: &mut [T]) {
        if self.is_identity() {
            return;
        }
        let x = &mut x[self.range.clone()];
        let mut mu = T::zero_impl();
        for (vi, xi) in self.v.iter().zip(x.iter()) {
            mu += T::conj_impl(vi) * *xi;
        }
        mu *= self.beta;
        for (vi, xi) in self.v.iter().zip(x.iter_mut()) {
            *xi -= mu * *vi;
        }
    }

    /// Applies the reflection from the left to every column in `cols`, restricted to the
    /// reflector's row range.
    pub fn apply_left_to_cols(&self, mut a: MatMut<'_, T>, cols: Range<usize>) {
        if self.is_identity() {
            return;
        }
        for j in cols {
            let mut mu = T::zero_impl();
            for (vl, i) in self.v.iter().zip(self.range.clone()) {
                mu += T::conj_impl(vl) * a[(i, j)];
            }
            mu *= self.beta;
            for (vl, i) in self.v.iter().zip(self.range.clone()) {
                a[(i, j)] -= mu * *vl;
            }
        }
    }

    /// In place: `A[rows, r] ← A[rows, r]·H*`.
    ///
    /// The product is computed in two passes through a length-`|rows|` accumulator
    /// `w = A[rows, r]·v`, followed by the rank-1 correction `A[rows, r] -= conj(β)·w·v*`.
    pub fn apply_right_adjoint(&self, a: MatMut<'_, T>, rows: Range<usize>) {
        if self.is_identity() {
            return;
        }
        let mut w = vec![T::zero_impl(); rows.len()];
        self.apply_right_adjoint_with(a, rows, &mut w);
    }

    /// Same as [`Reflector::apply_right_adjoint`], using caller-provided accumulator storage
    /// of length at least `|rows|`.
    pub(crate) fn apply_right_adjoint_with(
        &self,
        mut a: MatMut<'_, T>,
        rows: Range<usize>,
        work: &mut [T],
    ) {
        if self.is_identity() {
            return;
        }
        let w = &mut work[..rows.len()];
        w.fill(T::zero_impl());
        for (vl, k) in self.v.iter().zip(self.range.clone()) {
            for (wj, i) in w.iter_mut().zip(rows.clone()) {
                *wj += a[(i, k)] * *vl;
            }
        }
        let beta_conj = T::conj_impl(&self.beta);
        for (vl, k) in self.v.iter().zip(self.range.clone()) {
            let factor = beta_conj * T::conj_impl(vl);
            for (wj, i) in w.iter().zip(rows.clone()) {
                a[(i, k)] -= *wj * factor;
            }
        }
    }
}
