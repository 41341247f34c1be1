//! Restarted Arnoldi eigensolver in Krylov-Schur form.
//!
//! This crate computes a few eigenvalues and eigenvectors (or a partial Schur decomposition)
//! of a large linear operator $\mathbf{A}$ that is only available through its action
//! $\mathbf{x} \mapsto \mathbf{A}\mathbf{x}$. The operator may be real or complex, symmetric or
//! not. The wanted part of the spectrum is chosen by a [`Which`] criterion such as largest
//! magnitude or smallest real part.
//!
//! ## Algorithm
//!
//! An Arnoldi factorization $\mathbf{A}\mathbf{B}_k = \mathbf{B}_k\mathbf{H}_k + \beta_k
//! \hat{\mathbf{r}}\mathbf{e}_k^T$ is grown to a fixed maximum dimension (`krylovdim`). The
//! small Hessenberg matrix $\mathbf{H}_k$ is brought to Schur form, which is sorted so the
//! wanted eigenvalues come first; the residual of each Schur vector can be read off the last
//! row of the Schur transform. Converged directions are locked, and the factorization is
//! truncated to its leading Schur vectors and regrown. All basis rotations of the restart are
//! applied as sequences of Householder reflections ([`algorithms::householder::Reflector`]),
//! never as dense change-of-basis matrices.
//!
//! Real operators are handled in real arithmetic; their complex eigenvalues appear as 2×2
//! blocks of a real Schur form and are always returned as complete conjugate pairs.
//!
//! ## Example Usage
//!
//! The following example computes the three largest eigenvalues of a symmetric tridiagonal
//! matrix given as a closure, and checks them against their closed form
//! $2 - 2\cos(j\pi/(n+1))$.
//!
//! ```rust
//! use faer::{Mat, MatRef};
//! use krylov_schur::{ArnoldiConfig, FnOperator, Which, eigsolve};
//!
//! let n = 50;
//! // The 1D Laplacian: (Ax)_i = 2x_i - x_{i-1} - x_{i+1}.
//! let laplacian = FnOperator::new(n, move |x: MatRef<'_, f64>| {
//!     Mat::from_fn(n, 1, |i, _| {
//!         let left = if i > 0 { x[(i - 1, 0)] } else { 0.0 };
//!         let right = if i + 1 < n { x[(i + 1, 0)] } else { 0.0 };
//!         2.0 * x[(i, 0)] - left - right
//!     })
//! });
//!
//! let x0 = Mat::from_fn(n, 1, |i, _| 1.0 + (i % 7) as f64);
//! let config = ArnoldiConfig::default()
//!     .with_krylovdim(30)
//!     .with_maxiter(500)
//!     .with_tol(1e-9);
//!
//! let result = eigsolve(&laplacian, x0.as_ref(), 3, Which::LargestReal, &config).unwrap();
//! assert!(result.info.converged >= 3);
//!
//! for (j, lambda) in result.values.iter().take(3).enumerate() {
//!     let k = (n - j) as f64;
//!     let exact = 2.0 - 2.0 * (k * std::f64::consts::PI / (n + 1) as f64).cos();
//!     assert!((lambda.re - exact).abs() < 1e-6);
//! }
//! ```
//!
//! ## Crate Layout
//!
//! - [`solvers`]: the entry points [`eigsolve`] and [`schursolve`].
//! - [`algorithms`]: the Householder reflector, the Arnoldi factorization, the dense Schur
//!   step and the restart loop.
//! - [`matrix`]: the [`LinearOperator`] abstraction and its adapters.
//! - [`config`], [`error`], [`scalar`]: parameters, errors and the numeric traits.
//!
//! The crate logs through the [`log`] facade: one `debug` record per processed iteration,
//! `info` on convergence, and `warn` when the iteration cap is reached or the Krylov
//! subspace turns out to be invariant before it holds the requested number of vectors.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod matrix;
pub mod scalar;
pub mod solvers;

// Re-export the main API for convenient access.
pub use algorithms::arnoldi::Orthogonalizer;
pub use algorithms::select::Which;
pub use config::ArnoldiConfig;
pub use error::{KrylovError, KrylovErrorKind};
pub use matrix::{FnOperator, LinOpOperator, LinearOperator};
pub use scalar::Scalar;
pub use solvers::{ConvergenceInfo, EigsolveOutput, SchurOutput, eigsolve, schursolve};
