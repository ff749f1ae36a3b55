//! # Energy kernel
//!
//! Pure functions evaluating the QUBO and Ising energies of a [`BipartiteQubo`], for a single
//! state or for a batch of states held one per row. Nothing here sanitizes its input, so NaN or
//! infinite coefficients propagate into the returned energies.
//!
//! The batch kernels come in two shapes:
//! - row-paired (`qubo_energies`, `ising_energies`): row k of partition 0 goes with row k of partition 1
//! - grid (`qubo_energy_grid`): every row of partition 0 against every row of partition 1
//!
//! The local field helpers give, for every spin, the derivative of the Ising energy with respect to
//! that spin. They are what the annealer uses to price single spin flips without re-summing W.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::numeric_trait::Real;
use crate::qubo::{BipartiteQubo, Hamiltonian};

/// QUBO energy of a single state, b0.x0 + b1.x1 + x1^T W x0, in the caller's direction.
pub fn qubo_energy<F: Real>(qubo: &BipartiteQubo<F>, x0: ArrayView1<F>, x1: ArrayView1<F>) -> F {
    let w_x0 = qubo.w.dot(&x0);
    qubo.b0.dot(&x0) + qubo.b1.dot(&x1) + x1.dot(&w_x0)
}

/// QUBO energies of row-paired states, `x0s` is (K, N0) and `x1s` is (K, N1).
pub fn qubo_energies<F: Real>(
    qubo: &BipartiteQubo<F>,
    x0s: ArrayView2<F>,
    x1s: ArrayView2<F>,
) -> Array1<F> {
    // (K, N1) . (N1, N0) gives x1^T W for every row
    let x1_w = x1s.dot(&qubo.w);
    let bilinear = (&x1_w * &x0s).sum_axis(Axis(1));
    bilinear + x0s.dot(&qubo.b0) + x1s.dot(&qubo.b1)
}

/// QUBO energies of every combination of the rows of `x0s` (T0, N0) and `x1s` (T1, N1).
///
/// Entry `[a, b]` of the (T0, T1) result is the energy of `(x0s[a], x1s[b])`.
pub fn qubo_energy_grid<F: Real>(
    qubo: &BipartiteQubo<F>,
    x0s: ArrayView2<F>,
    x1s: ArrayView2<F>,
) -> Array2<F> {
    let w_x0 = x0s.dot(&qubo.w.t());
    let mut grid = w_x0.dot(&x1s.t());

    let e0 = x0s.dot(&qubo.b0).insert_axis(Axis(1));
    let e1 = x1s.dot(&qubo.b1).insert_axis(Axis(0));
    grid += &e0;
    grid += &e1;
    grid
}

/// Ising energy of a single spin state, h0.q0 + h1.q1 + q1^T J q0 + c.
pub fn ising_energy<F: Real>(ham: &Hamiltonian<F>, q0: ArrayView1<F>, q1: ArrayView1<F>) -> F {
    let j_q0 = ham.j.dot(&q0);
    ham.h0.dot(&q0) + ham.h1.dot(&q1) + q1.dot(&j_q0) + ham.c
}

/// Ising energies of row-paired spin states.
pub fn ising_energies<F: Real>(
    ham: &Hamiltonian<F>,
    q0s: ArrayView2<F>,
    q1s: ArrayView2<F>,
) -> Array1<F> {
    let q1_j = q1s.dot(&ham.j);
    let bilinear = (&q1_j * &q0s).sum_axis(Axis(1));
    bilinear + q0s.dot(&ham.h0) + q1s.dot(&ham.h1) + ham.c
}

/// Local fields of partition 0 for every replica, h0 + q1 J, shape (R, N0).
pub fn local_fields_0<F: Real>(ham: &Hamiltonian<F>, q1s: ArrayView2<F>) -> Array2<F> {
    q1s.dot(&ham.j) + &ham.h0
}

/// Local fields of partition 1 for every replica, h1 + q0 J^T, shape (R, N1).
pub fn local_fields_1<F: Real>(ham: &Hamiltonian<F>, q0s: ArrayView2<F>) -> Array2<F> {
    q0s.dot(&ham.j.t()) + &ham.h1
}

/// Local field of bit `i` of partition 0, touching only column `i` of J.
pub fn local_field_0<F: Real>(ham: &Hamiltonian<F>, q1: ArrayView1<F>, i: usize) -> F {
    ham.h0[i] + ham.j.column(i).dot(&q1)
}

/// Local field of bit `j` of partition 1, touching only row `j` of J.
pub fn local_field_1<F: Real>(ham: &Hamiltonian<F>, q0: ArrayView1<F>, j: usize) -> F {
    ham.h1[j] + ham.j.row(j).dot(&q0)
}
