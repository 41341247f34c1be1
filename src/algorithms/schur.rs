//! Dense Schur step for the small projected matrix.
//!
//! This module provides everything the restarted eigensolver needs from dense linear
//! algebra on the `m×m` Rayleigh quotient:
//!
//! - [`hessenberg_schur`]: reduces an upper-Hessenberg matrix to (quasi-)upper-triangular
//!   Schur form $\mathbf{H} = \mathbf{U}\mathbf{T}\mathbf{U}^H$ by Francis double-shift QR
//!   sweeps, chasing the bulge with 3-element [`Reflector`]s.
//! - [`schur_eigenvalues`]: reads the eigenvalues off the diagonal (and 2×2) blocks.
//! - [`permute_schur`]: reorders the Schur form by adjacent block swaps.
//! - [`schur_eigenvectors`]: eigenvector coefficients of a quasi-triangular block.
//!
//! The same code path serves real and complex fields. After the QR iteration every 2×2
//! block whose eigenvalues lie in the field is split, so for real fields the remaining
//! 2×2 blocks hold exactly the complex-conjugate pairs, and for complex fields `T` is
//! upper triangular.

use super::householder::Reflector;
use crate::error::{KrylovError, KrylovErrorKind};
use crate::scalar::Scalar;
use faer::traits::{ComplexField, RealField};
use faer::linalg::matmul::matmul;
use faer::prelude::{Reborrow, ReborrowMut};
use faer::traits::math_utils::max;
use faer::{Accum, Mat, MatMut, MatRef, Par};

/// Sweeps without a deflation after which an exceptional shift is used.
const EXCEPTIONAL_SHIFT_PERIOD: usize = 10;

/// Budget of QR sweeps per eigenvalue before giving up.
const MAX_SWEEPS_PER_EIGENVALUE: usize = 30;

/// Reduces the upper-Hessenberg matrix `h` to Schur form in place, accumulating the
/// transformations into `u` (`u ← u·Q`).
///
/// With `u` initialized to the identity, on return `h_in = u·h_out·u*`.
pub fn hessenberg_schur<T: Scalar>(
    mut h: MatMut<'_, T>,
    mut u: MatMut<'_, T>,
) -> Result<(), KrylovError> {
    let n = h.nrows();
    assert!(h.ncols() == n, "The Hessenberg matrix must be square.");
    assert!(
        u.ncols() == n,
        "The transform must have as many columns as the Hessenberg matrix has rows."
    );

    let zero = T::Real::zero_impl();
    let eps = T::Real::epsilon_impl();
    let small = T::Real::min_positive_impl() / eps * T::Real::from_f64_impl(n.max(1) as f64);
    let max_sweeps = MAX_SWEEPS_PER_EIGENVALUE * n.max(10);

    let mut work = vec![T::zero_impl(); n.max(u.nrows())];
    let mut total_sweeps = 0;
    let mut sweeps_since_deflation = 0;
    let mut hi = n;

    while hi > 0 {
        // Locate the start of the trailing unreduced block.
        let mut lo = hi - 1;
        while lo > 0 {
            let sub = T::abs_impl(&h[(lo, lo - 1)]);
            let mut tst = T::abs_impl(&h[(lo - 1, lo - 1)]) + T::abs_impl(&h[(lo, lo)]);
            if tst == zero {
                if lo >= 2 {
                    tst += T::abs_impl(&h[(lo - 1, lo - 2)]);
                }
                if lo + 1 < hi {
                    tst += T::abs_impl(&h[(lo + 1, lo)]);
                }
            }
            if sub <= small || sub <= eps * tst {
                h[(lo, lo - 1)] = T::zero_impl();
                break;
            }
            lo -= 1;
        }

        if hi - lo <= 2 {
            // 1×1 and 2×2 blocks are final; 2×2 blocks are standardized below.
            hi = lo;
            sweeps_since_deflation = 0;
            continue;
        }

        if total_sweeps >= max_sweeps {
            return Err(KrylovErrorKind::SchurNoConvergence {
                sweeps: total_sweeps,
            }
            .into());
        }
        total_sweeps += 1;
        sweeps_since_deflation += 1;

        // Both shifts enter only through their sum `s` and product `p`.
        let (s, p) = if sweeps_since_deflation % EXCEPTIONAL_SHIFT_PERIOD == 0 {
            let ss = T::abs_impl(&h[(hi - 1, hi - 2)]) + T::abs_impl(&h[(hi - 2, hi - 3)]);
            let a = h[(hi - 1, hi - 1)] + T::from_real_impl(&(T::Real::from_f64_impl(0.75) * ss));
            (a + a, a * a + T::from_real_impl(&(T::Real::from_f64_impl(0.4375) * ss * ss)))
        } else {
            let a = h[(hi - 2, hi - 2)];
            let b = h[(hi - 2, hi - 1)];
            let c = h[(hi - 1, hi - 2)];
            let d = h[(hi - 1, hi - 1)];
            (a + d, a * d - b * c)
        };

        francis_sweep(h.rb_mut(), u.rb_mut(), lo, hi, s, p, &mut work);
    }

    standardize_blocks(h, u, &mut work);
    Ok(())
}

/// One implicit double-shift QR sweep on the active window `lo..hi` (at least 3×3).
fn francis_sweep<T: Scalar>(
    mut h: MatMut<'_, T>,
    mut u: MatMut<'_, T>,
    lo: usize,
    hi: usize,
    s: T,
    p: T,
    work: &mut [T],
) {
    let n = h.nrows();
    let un = u.nrows();

    // First column of (H - s1)(H - s2) = H² - s·H + p.
    let h00 = h[(lo, lo)];
    let h10 = h[(lo + 1, lo)];
    let h01 = h[(lo, lo + 1)];
    let h11 = h[(lo + 1, lo + 1)];
    let h21 = h[(lo + 2, lo + 1)];
    let mut x = [
        h00 * h00 + h01 * h10 - s * h00 + p,
        h10 * (h00 + h11 - s),
        h10 * h21,
    ];

    for k in lo..hi - 2 {
        if k > lo {
            x = [h[(k, k - 1)], h[(k + 1, k - 1)], h[(k + 2, k - 1)]];
        }
        let (reflector, nu) = Reflector::new(&x, 0..3, 0);
        let reflector = reflector.translated(k);

        reflector.apply_left_to_cols(h.rb_mut(), k..n);
        if k > lo {
            h[(k, k - 1)] = T::from_real_impl(&nu);
            h[(k + 1, k - 1)] = T::zero_impl();
            h[(k + 2, k - 1)] = T::zero_impl();
        }
        reflector.apply_right_adjoint_with(h.rb_mut(), 0..(k + 4).min(hi), work);
        reflector.apply_right_adjoint_with(u.rb_mut(), 0..un, work);
    }

    // Return the last bulge entry to Hessenberg form with a 2-element reflector.
    let k = hi - 2;
    let (reflector, nu) = Reflector::from_column(h.rb(), k..hi, k - 1, k);
    reflector.apply_left_to_cols(h.rb_mut(), k..n);
    h[(k, k - 1)] = T::from_real_impl(&nu);
    h[(k + 1, k - 1)] = T::zero_impl();
    reflector.apply_right_adjoint_with(h.rb_mut(), 0..hi, work);
    reflector.apply_right_adjoint_with(u.rb_mut(), 0..un, work);
}

/// Splits every 2×2 diagonal block whose eigenvalues lie in the field.
///
/// For a block with eigenvalue `λ₁` and eigenvector `x`, the reflector mapping `x` onto
/// `e₁` is applied as a similarity, which annihilates the subdiagonal entry.
fn standardize_blocks<T: Scalar>(mut t: MatMut<'_, T>, mut u: MatMut<'_, T>, work: &mut [T]) {
    let n = t.nrows();
    let un = u.nrows();
    let half = T::from_real_impl(&T::Real::from_f64_impl(0.5));

    let mut i = 0;
    while i + 1 < n {
        if t[(i + 1, i)] == T::zero_impl() {
            i += 1;
            continue;
        }
        let a = t[(i, i)];
        let b = t[(i, i + 1)];
        let c = t[(i + 1, i)];
        let d = t[(i + 1, i + 1)];
        let mean = (a + d) * half;
        let gap = (a - d) * half;
        let Some(root) = (gap * gap + b * c).field_sqrt() else {
            // Complex-conjugate pair in a real field: the block stays.
            i += 2;
            continue;
        };
        let lambda = if T::abs_impl(&(mean + root)) >= T::abs_impl(&(mean - root)) {
            mean + root
        } else {
            mean - root
        };

        // Two candidate null vectors of (block - λ); keep the better scaled one.
        let x1 = [b, lambda - a];
        let x2 = [lambda - d, c];
        let x = if T::abs2_impl(&x1[0]) + T::abs2_impl(&x1[1]) >= T::abs2_impl(&x2[0]) + T::abs2_impl(&x2[1]) {
            x1
        } else {
            x2
        };
        let (reflector, _) = Reflector::new(&x, 0..2, 0);
        let reflector = reflector.translated(i);
        reflector.apply_left_to_cols(t.rb_mut(), i..n);
        reflector.apply_right_adjoint_with(t.rb_mut(), 0..i + 2, work);
        reflector.apply_right_adjoint_with(u.rb_mut(), 0..un, work);
        t[(i + 1, i)] = T::zero_impl();
        i += 1;
    }
}

/// Returns `true` if a 2×2 block starts at position `i` of the quasi-triangular `t`.
#[inline]
pub fn starts_block_pair<T: Scalar>(t: MatRef<'_, T>, i: usize) -> bool {
    i + 1 < t.nrows() && t[(i + 1, i)] != T::zero_impl()
}

/// Eigenvalues of a matrix in (quasi-)triangular Schur form, in diagonal order.
///
/// The two eigenvalues of a 2×2 block are listed adjacently, positive imaginary part first.
pub fn schur_eigenvalues<T: Scalar>(t: MatRef<'_, T>) -> Vec<T::Complex> {
    let n = t.nrows();
    let half = T::Complex::from_real_impl(&T::Real::from_f64_impl(0.5));
    let mut values = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        if !starts_block_pair(t, i) {
            values.push(t[(i, i)].to_complex());
            i += 1;
            continue;
        }
        let a = t[(i, i)].to_complex();
        let b = t[(i, i + 1)].to_complex();
        let c = t[(i + 1, i)].to_complex();
        let d = t[(i + 1, i + 1)].to_complex();
        let mean = (a + d) * half;
        let gap = (a - d) * half;
        let root = (gap * gap + b * c)
            .field_sqrt()
            .unwrap_or_else(T::Complex::zero_impl);
        let (first, second) = if T::Complex::imag_part_impl(&root) >= T::Real::zero_impl() {
            (mean + root, mean - root)
        } else {
            (mean - root, mean + root)
        };
        values.push(first);
        values.push(second);
        i += 2;
    }
    values
}

/// Reorders the Schur form `(t, u)` so that the eigenvalues appear in the order given by
/// `order`, a permutation of eigenvalue positions (as returned by
/// [`crate::algorithms::select::Which::sort_permutation`] on [`schur_eigenvalues`]).
///
/// A 2×2 block is moved intact, at the rank of its highest-priority eigenvalue.
pub fn permute_schur<T: Scalar>(mut t: MatMut<'_, T>, mut u: MatMut<'_, T>, order: &[usize]) {
    let n = t.nrows();
    assert!(order.len() == n, "The permutation must cover every eigenvalue.");

    // Diagonal blocks as (id, size), and the block owning each eigenvalue position.
    let mut blocks = Vec::with_capacity(n);
    let mut block_of = vec![0; n];
    let mut i = 0;
    while i < n {
        let size = if starts_block_pair(t.rb(), i) { 2 } else { 1 };
        for k in i..i + size {
            block_of[k] = blocks.len();
        }
        blocks.push((blocks.len(), size));
        i += size;
    }

    let mut wanted = Vec::with_capacity(blocks.len());
    for &pos in order {
        let id = block_of[pos];
        if !wanted.contains(&id) {
            wanted.push(id);
        }
    }

    let mut work = vec![T::zero_impl(); n.max(u.nrows())];
    for (target, &id) in wanted.iter().enumerate() {
        let mut current = blocks
            .iter()
            .position(|&(block_id, _)| block_id == id)
            .unwrap_or(target);
        while current > target {
            let start: usize = blocks[..current - 1].iter().map(|&(_, size)| size).sum();
            let p = blocks[current - 1].1;
            let q = blocks[current].1;
            swap_adjacent_blocks(t.rb_mut(), u.rb_mut(), start, p, q, &mut work);
            blocks.swap(current - 1, current);
            current -= 1;
        }
    }
}

/// Swaps the adjacent diagonal blocks `A = t[j..j+p, j..j+p]` and `B = t[j+p..j+p+q, ..]`.
///
/// Solves the Sylvester equation `A·X - X·B = -C` for the coupling block `C`, so that the
/// columns of `[X; I]` span the invariant subspace belonging to `B`. The Householder QR of
/// `[X; I]` then provides the unitary similarity that brings `B` to the front.
fn swap_adjacent_blocks<T: Scalar>(
    mut t: MatMut<'_, T>,
    mut u: MatMut<'_, T>,
    j: usize,
    p: usize,
    q: usize,
    work: &mut [T],
) {
    let n = t.nrows();
    let un = u.nrows();
    let m = p + q;
    let dim = p * q;

    // Unknown X[r, s] is stored at index r + p·s.
    let mut system = [[T::zero_impl(); 5]; 4];
    for s in 0..q {
        for r in 0..p {
            let row = r + p * s;
            for k in 0..p {
                system[row][k + p * s] += t[(j + r, j + k)];
            }
            for k in 0..q {
                system[row][r + p * k] -= t[(j + p + k, j + p + s)];
            }
            system[row][dim] = -t[(j + r, j + p + s)];
        }
    }
    let scale = t.rb().submatrix(j, j, m, m).norm_l2();
    let x = solve_small_system(&mut system, dim, scale);

    // Householder QR of Z = [X; I_q], one reflector per column.
    let mut z = vec![vec![T::zero_impl(); m]; q];
    for s in 0..q {
        for r in 0..p {
            z[s][r] = x[r + p * s];
        }
        z[s][p + s] = T::one_impl();
    }
    for s in 0..q {
        let (reflector, _) = Reflector::new(&z[s], s..m, s);
        for later in z.iter_mut().skip(s + 1) {
            reflector.apply_left(later);
        }
        let reflector = reflector.translated(j);
        reflector.apply_left_to_cols(t.rb_mut(), j..n);
        reflector.apply_right_adjoint_with(t.rb_mut(), 0..j + m, work);
        reflector.apply_right_adjoint_with(u.rb_mut(), 0..un, work);
    }

    for r in j + q..j + m {
        for c in j..j + q {
            t[(r, c)] = T::zero_impl();
        }
    }
}

/// Gaussian elimination with partial pivoting on an augmented system of size at most 4.
///
/// Tiny pivots are replaced by `ε·scale`, which keeps the swap well defined when the two
/// blocks have (numerically) equal eigenvalues.
fn solve_small_system<T: Scalar>(a: &mut [[T; 5]; 4], dim: usize, scale: T::Real) -> [T; 4] {
    let floor = max(&(T::Real::epsilon_impl() * scale), &T::Real::min_positive_impl());

    for col in 0..dim {
        let mut pivot_row = col;
        for row in col + 1..dim {
            if T::abs_impl(&a[row][col]) > T::abs_impl(&a[pivot_row][col]) {
                pivot_row = row;
            }
        }
        a.swap(col, pivot_row);
        if T::abs_impl(&a[col][col]) < floor {
            a[col][col] = T::from_real_impl(&floor);
        }
        for row in col + 1..dim {
            let factor = a[row][col] / a[col][col];
            for k in col..=dim {
                let delta = factor * a[col][k];
                a[row][k] -= delta;
            }
        }
    }

    let mut x = [T::zero_impl(); 4];
    for row in (0..dim).rev() {
        let mut acc = a[row][dim];
        for k in row + 1..dim {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    x
}

/// Eigenvalues and unit-norm eigenvectors of a quasi-triangular Schur block.
///
/// The block is first brought to complex upper-triangular form (splitting every 2×2 block
/// with the same routine used after the QR iteration), then each eigenvector is obtained by
/// back-substitution and mapped back. Column `k` of the returned matrix belongs to the
/// `k`-th returned eigenvalue.
pub fn schur_eigenvectors<T: Scalar>(t: MatRef<'_, T>) -> (Vec<T::Complex>, Mat<T::Complex>) {
    let n = t.nrows();
    let zero = T::Complex::zero_impl();
    let mut c: Mat<T::Complex> = Mat::from_fn(n, n, |i, j| t[(i, j)].to_complex());
    let mut z: Mat<T::Complex> = Mat::identity(n, n);
    let mut work = vec![zero; n];
    standardize_blocks(c.as_mut(), z.as_mut(), &mut work);

    let floor = max(&(T::Real::epsilon_impl() * c.norm_l2()), &T::Real::min_positive_impl());

    let values: Vec<T::Complex> = (0..n).map(|k| c[(k, k)]).collect();
    let mut vectors: Mat<T::Complex> = Mat::zeros(n, n);
    let mut y: Mat<T::Complex> = Mat::zeros(n, 1);
    for k in 0..n {
        let lambda = values[k];
        y.as_mut().fill(zero);
        y[(k, 0)] = T::Complex::one_impl();
        for i in (0..k).rev() {
            let mut acc = zero;
            for l in i + 1..=k {
                acc += c[(i, l)] * y[(l, 0)];
            }
            let mut denom = c[(i, i)] - lambda;
            if T::Complex::abs_impl(&denom) < floor {
                denom = T::Complex::from_real_impl(&floor);
            }
            y[(i, 0)] = -acc / denom;
        }

        let mut v = vectors.as_mut().subcols_mut(k, 1);
        matmul(
            v.rb_mut(),
            Accum::Replace,
            z.as_ref().subcols(0, k + 1),
            y.as_ref().subrows(0, k + 1),
            T::Complex::one_impl(),
            Par::Seq,
        );
        let inv = T::Complex::from_real_impl(&T::Real::recip_impl(&v.norm_l2()));
        for i in 0..n {
            v[(i, 0)] *= inv;
        }
    }
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::select::Which;
    use num_complex::Complex;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn random_hessenberg<T: Scalar>(n: usize, seed: u64, mut sample: impl FnMut(&mut StdRng) -> T) -> Mat<T> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, n, |i, j| if i <= j + 1 { sample(&mut rng) } else { T::zero_impl() })
    }

    /// max |H - U·T·U*| and max |U*U - I|.
    fn reconstruction_errors<T: Scalar<Real = f64>>(h: &Mat<T>, t: &Mat<T>, u: &Mat<T>) -> (f64, f64) {
        let n = h.nrows();
        let mut recon = 0.0_f64;
        let mut ortho = 0.0_f64;
        for i in 0..n {
            for j in 0..n {
                let mut acc = T::zero_impl();
                for k in 0..n {
                    for l in 0..n {
                        acc += u[(i, k)] * t[(k, l)] * T::conj_impl(&u[(j, l)]);
                    }
                }
                recon = recon.max(T::abs_impl(&(acc - h[(i, j)])));

                let mut dot = T::zero_impl();
                for k in 0..n {
                    dot += T::conj_impl(&u[(k, i)]) * u[(k, j)];
                }
                let expected = if i == j { T::one_impl() } else { T::zero_impl() };
                ortho = ortho.max(T::abs_impl(&(dot - expected)));
            }
        }
        (recon, ortho)
    }

    fn assert_quasi_triangular<T: Scalar<Real = f64>>(t: &Mat<T>) {
        let n = t.nrows();
        for j in 0..n {
            for i in j + 2..n {
                assert!(t[(i, j)] == T::zero_impl(), "T[{i},{j}] = {:?}", t[(i, j)]);
            }
        }
        for i in 0..n.saturating_sub(2) {
            assert!(
                t[(i + 1, i)] == T::zero_impl() || t[(i + 2, i + 1)] == T::zero_impl(),
                "consecutive subdiagonal entries at {i}"
            );
        }
    }

    #[test]
    fn test_real_schur_decomposition() {
        let n = 12;
        let h = random_hessenberg(n, 1, |rng| rng.random_range(-1.0..1.0_f64));
        let mut t = h.clone();
        let mut u = Mat::<f64>::identity(n, n);
        hessenberg_schur(t.as_mut(), u.as_mut()).unwrap();

        assert_quasi_triangular(&t);
        let (recon, ortho) = reconstruction_errors(&h, &t, &u);
        assert!(recon < 1e-12, "reconstruction error {recon}");
        assert!(ortho < 1e-12, "orthogonality error {ortho}");

        // Remaining 2×2 blocks of a real Schur form hold complex-conjugate pairs only.
        let values = schur_eigenvalues(t.as_ref());
        for i in 0..n - 1 {
            if starts_block_pair(t.as_ref(), i) {
                assert!(values[i].im > 0.0);
                assert!((values[i] - values[i + 1].conj()).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_complex_schur_is_triangular() {
        let n = 9;
        let h = random_hessenberg(n, 2, |rng| {
            Complex::new(rng.random_range(-1.0..1.0_f64), rng.random_range(-1.0..1.0))
        });
        let mut t = h.clone();
        let mut u = Mat::<Complex<f64>>::identity(n, n);
        hessenberg_schur(t.as_mut(), u.as_mut()).unwrap();
        for i in 0..n - 1 {
            assert!(!starts_block_pair(t.as_ref(), i));
        }
        let (recon, ortho) = reconstruction_errors(&h, &t, &u);
        assert!(recon < 1e-12, "reconstruction error {recon}");
        assert!(ortho < 1e-12, "orthogonality error {ortho}");
    }

    #[test]
    fn test_known_spectrum_with_rotation_block() {
        // Tridiagonal, hence already Hessenberg, with a rotation-like middle block.
        let mut h = Mat::<f64>::zeros(4, 4);
        h[(0, 0)] = 3.0;
        h[(0, 1)] = 0.7;
        h[(1, 0)] = 0.9;
        h[(1, 1)] = 1.0;
        h[(1, 2)] = -2.0;
        h[(2, 1)] = 2.0;
        h[(2, 2)] = 1.0;
        h[(3, 3)] = -0.5;
        h[(2, 3)] = 0.3;
        h[(3, 2)] = 0.4;
        let original = h.clone();
        let mut u = Mat::<f64>::identity(4, 4);
        hessenberg_schur(h.as_mut(), u.as_mut()).unwrap();
        let (recon, _) = reconstruction_errors(&original, &h, &u);
        assert!(recon < 1e-12);

        let values = schur_eigenvalues(h.as_ref());
        let trace: Complex<f64> = values.iter().sum();
        assert!((trace - Complex::new(4.5, 0.0)).norm() < 1e-12);
        let complex_count = values.iter().filter(|v| v.im.abs() > 1e-8).count();
        assert_eq!(complex_count % 2, 0);
    }

    #[test]
    fn test_permute_schur_orders_and_preserves_similarity() {
        let n = 10;
        let h = random_hessenberg(n, 3, |rng| rng.random_range(-1.0..1.0_f64));
        let mut t = h.clone();
        let mut u = Mat::<f64>::identity(n, n);
        hessenberg_schur(t.as_mut(), u.as_mut()).unwrap();

        for which in [Which::LargestMagnitude, Which::SmallestReal, Which::LargestReal] {
            let values = schur_eigenvalues(t.as_ref());
            let order = which.sort_permutation(&values);
            permute_schur(t.as_mut(), u.as_mut(), &order);

            assert_quasi_triangular(&t);
            let (recon, ortho) = reconstruction_errors(&h, &t, &u);
            assert!(recon < 1e-10, "reconstruction error {recon}");
            assert!(ortho < 1e-12, "orthogonality error {ortho}");

            let sorted = schur_eigenvalues(t.as_ref());
            let keys: Vec<f64> = sorted.iter().map(|&v| which.key(v)).collect();
            for w in keys.windows(2) {
                if which.descending() {
                    assert!(w[0] >= w[1] - 1e-10, "{which:?} keys out of order: {keys:?}");
                } else {
                    assert!(w[0] <= w[1] + 1e-10, "{which:?} keys out of order: {keys:?}");
                }
            }
        }
    }

    #[test]
    fn test_permute_complex_schur() {
        let n = 7;
        let h = random_hessenberg(n, 4, |rng| {
            Complex::new(rng.random_range(-1.0..1.0_f64), rng.random_range(-1.0..1.0))
        });
        let mut t = h.clone();
        let mut u = Mat::<Complex<f64>>::identity(n, n);
        hessenberg_schur(t.as_mut(), u.as_mut()).unwrap();
        let values = schur_eigenvalues(t.as_ref());
        let order = Which::SmallestReal.sort_permutation(&values);
        permute_schur(t.as_mut(), u.as_mut(), &order);

        let sorted = schur_eigenvalues(t.as_ref());
        for w in sorted.windows(2) {
            assert!(w[0].re <= w[1].re + 1e-10);
        }
        let (recon, _) = reconstruction_errors(&h, &t, &u);
        assert!(recon < 1e-10);
    }

    #[test]
    fn test_schur_eigenvectors_satisfy_eigen_equation() {
        let n = 8;
        let h = random_hessenberg(n, 5, |rng| rng.random_range(-1.0..1.0_f64));
        let mut t = h.clone();
        let mut u = Mat::<f64>::identity(n, n);
        hessenberg_schur(t.as_mut(), u.as_mut()).unwrap();

        let (values, vectors) = schur_eigenvectors(t.as_ref());
        assert_eq!(values.len(), n);
        for k in 0..n {
            let mut residual = 0.0_f64;
            for i in 0..n {
                let mut acc = Complex::new(0.0_f64, 0.0);
                for l in 0..n {
                    acc += Complex::new(t[(i, l)], 0.0) * vectors[(l, k)];
                }
                residual = residual.max((acc - values[k] * vectors[(i, k)]).norm());
            }
            assert!(residual < 1e-10, "eigenpair {k} residual {residual}");
        }
    }
}
