//! This module defines the core abstraction for linear operators.
//!
//! Krylov subspace eigensolvers never need the individual entries of the matrix whose
//! spectrum they approximate. Their only contact with the problem is the matrix-vector
//! product $\mathbf{y} = \mathbf{A}\mathbf{x}$. The solver can therefore be written once
//! against any object that performs this action, a "linear operator":
//!
//! 1.  **Generality**: dense matrices, sparse matrices, and closures that compute the product
//!     on the fly (e.g. a discretized differential operator or a shift-and-invert solve) are
//!     all valid inputs.
//! 2.  **Testability**: the restarted Arnoldi iteration can be verified against small dense
//!     matrices whose spectra are known, then used unchanged on large implicit operators.
//!
//! The central piece of this module is the [`LinearOperator`] trait. Implementations are
//! provided for `faer`'s dense types, for closures ([`FnOperator`]), and for anything that
//! implements `faer`'s own matrix-free [`LinOp`] trait ([`LinOpOperator`]), which covers
//! `faer`'s sparse matrices.

use crate::scalar::Scalar;
use faer::{
    Mat, MatMut, MatRef, Par,
    dyn_stack::{MemBuffer, MemStack},
    matrix_free::LinOp,
    prelude::Reborrow,
};

/// Represents a square linear operator that can be applied to a vector (or a block of
/// vectors).
///
/// This is the only access the eigensolver has to the problem. Each call to
/// [`LinearOperator::apply`] counts as one operator application in the reported
/// [`crate::solvers::ConvergenceInfo`].
///
/// # Type Parameters
///
/// *   `T`: The scalar field of the operator, one of `f32`, `f64`, `Complex<f32>`,
///     `Complex<f64>`.
///
/// # Example
///
/// ```
/// use faer::{Mat, MatRef};
/// use krylov_schur::{LinearOperator, Scalar};
///
/// fn power_step<T: Scalar>(operator: &impl LinearOperator<T>, x: MatRef<'_, T>) -> Mat<T> {
///     assert_eq!(operator.ncols(), x.nrows());
///     operator.apply(x)
/// }
///
/// let a = Mat::from_fn(3, 3, |i, j| if i == j { 2.0 } else { 0.0 });
/// let x = Mat::from_fn(3, 1, |i, _| i as f64);
/// let y = power_step(&a, x.as_ref());
/// assert_eq!(y[(2, 0)], 4.0);
/// ```
pub trait LinearOperator<T: Scalar> {
    /// Returns the number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Returns the number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Applies the linear operator to a matrix `rhs`, returning the owned product `A * rhs`.
    ///
    /// The eigensolver always passes a single column.
    ///
    /// # Panics
    ///
    /// This method is expected to panic if the inner dimension of the operator does not match
    /// the number of rows of `rhs`.
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T>;
}

impl<T: Scalar, O: LinearOperator<T> + ?Sized> LinearOperator<T> for &O {
    #[inline]
    fn nrows(&self) -> usize {
        (**self).nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        (**self).ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        (**self).apply(rhs)
    }
}

/// Implementation of `LinearOperator` for `faer`'s immutable dense matrix view (`MatRef`).
impl<'a, T: Scalar> LinearOperator<T> for MatRef<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        assert_eq!(
            self.ncols(),
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.ncols(),
            rhs.nrows(),
        );

        // The `*` operator on `MatRef` dispatches to faer's matmul and produces an owned `Mat`.
        *self * rhs
    }
}

/// Implementation of `LinearOperator` for `faer`'s mutable dense matrix view (`MatMut`),
/// delegating to the `MatRef` implementation via a reborrow.
impl<'a, T: Scalar> LinearOperator<T> for MatMut<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rb().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.rb().ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        LinearOperator::apply(&self.rb(), rhs)
    }
}

/// Implementation of `LinearOperator` for `faer`'s owned dense matrix (`Mat`).
impl<T: Scalar> LinearOperator<T> for Mat<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.as_ref().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.as_ref().ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        LinearOperator::apply(&self.as_ref(), rhs)
    }
}

/// A square operator defined by a closure computing `A * rhs`.
///
/// ```
/// use faer::{Mat, MatRef};
/// use krylov_schur::{FnOperator, LinearOperator};
///
/// // The cyclic shift x_i <- x_{i-1}.
/// let shift = FnOperator::new(4, |x: MatRef<'_, f64>| {
///     Mat::from_fn(4, x.ncols(), |i, j| x[((i + 3) % 4, j)])
/// });
/// let e0 = Mat::from_fn(4, 1, |i, _| if i == 0 { 1.0 } else { 0.0 });
/// assert_eq!(shift.apply(e0.as_ref())[(1, 0)], 1.0);
/// ```
#[derive(Clone)]
pub struct FnOperator<F> {
    dim: usize,
    f: F,
}

impl<F> FnOperator<F> {
    /// Wraps `f` as an operator on vectors of length `dim`.
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> std::fmt::Debug for FnOperator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOperator").field("dim", &self.dim).finish()
    }
}

impl<T, F> LinearOperator<T> for FnOperator<F>
where
    T: Scalar,
    F: Fn(MatRef<'_, T>) -> Mat<T>,
{
    #[inline]
    fn nrows(&self) -> usize {
        self.dim
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.dim
    }

    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        assert_eq!(
            self.dim,
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.dim,
            rhs.nrows(),
        );
        (self.f)(rhs)
    }
}

/// Adapts any [`faer::matrix_free::LinOp`] (for instance a `SparseColMatRef`) to the
/// [`LinearOperator`] trait.
///
/// Each application allocates the scratch space the wrapped operator requests and runs
/// sequentially.
#[derive(Debug, Clone)]
pub struct LinOpOperator<O> {
    op: O,
}

impl<O> LinOpOperator<O> {
    pub fn new(op: O) -> Self {
        Self { op }
    }

    /// Returns the wrapped operator.
    pub fn into_inner(self) -> O {
        self.op
    }
}

impl<T, O> LinearOperator<T> for LinOpOperator<O>
where
    T: Scalar,
    O: LinOp<T>,
{
    #[inline]
    fn nrows(&self) -> usize {
        self.op.nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.op.ncols()
    }

    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        assert_eq!(
            self.op.ncols(),
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            self.op.ncols(),
            rhs.nrows(),
        );
        let mut out = Mat::<T>::zeros(self.op.nrows(), rhs.ncols());
        let mut mem = MemBuffer::new(self.op.apply_scratch(rhs.ncols(), Par::Seq));
        self.op
            .apply(out.as_mut(), rhs, Par::Seq, MemStack::new(&mut mem));
        out
    }
}
