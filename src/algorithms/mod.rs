//! Building blocks of the restarted Arnoldi eigensolver.
//!
//! ** NOTE: We recommend using the high-level entry points [`crate::solvers::eigsolve`] and
//! [`crate::solvers::schursolve`] instead. These modules are intended for use cases where
//! fine-grained control over the individual steps is required.
//!
//! - [`householder`]: the elementary reflection primitive every other step is built on.
//! - [`arnoldi`]: the incrementally extensible Arnoldi factorization.
//! - [`schur`]: the dense Hessenberg-to-Schur step, Schur reordering, and eigenvector
//!   extraction for the small projected matrix.
//! - [`select`]: selection criteria ordering the wanted eigenvalues.
//! - [`krylov_schur`]: the outer extend / diagonalize / restart loop.

pub mod arnoldi;
pub mod householder;
pub mod krylov_schur;
pub mod schur;
pub mod select;
