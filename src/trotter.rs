//! # Trotter ensemble and Monte Carlo sweeps
//!
//! The annealer keeps R replicas ("trotters") of both spin vectors, stored as the rows of two
//! (R, N0) and (R, N1) matrices. Neighbouring replicas are coupled ferromagnetically with strength
//!
//! $$J_\perp = -\frac{1}{2\beta} \ln \tanh\left(\frac{\beta G}{R}\right)$$
//!
//! and the replica index is periodic, replica R - 1 neighbours replica 0.
//!
//! Two sweep schemes are provided:
//! - [`sweep_naive`]: R (N0 + N1) proposals at uniformly drawn (replica, bit) sites, from one stream
//! - [`sweep_coloring`]: a checkerboard over the replica index, updating same colored replicas in
//!   parallel. Every replica draws from its own stream, so the outcome only depends on the seed.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Zip};
use smolprng::{Algorithm, JsfLarge, PRNG};

use crate::energy::{local_field_0, local_field_1, local_fields_0, local_fields_1};
use crate::numeric_trait::Real;
use crate::qubo::Hamiltonian;
use crate::utils::{make_stream, randomize_spins, spins_from_bits};

/// Stream index of the generator shared by the naive sweep, the per replica streams use 0..R.
const SHARED_STREAM: u64 = u64::MAX;

/// Spin replicas with their random streams.
pub struct TrotterEnsemble<F: Real> {
    pub q0: Array2<F>,
    pub q1: Array2<F>,
    streams: Array1<PRNG<JsfLarge>>,
    shared: PRNG<JsfLarge>,
    seed: u64,
}

impl<F: Real> TrotterEnsemble<F> {
    /// Ensemble of `n_trotters` replicas, all spins set to -1.
    pub fn new(n_trotters: usize, num_x0: usize, num_x1: usize, seed: u64) -> Self {
        let streams: Vec<PRNG<JsfLarge>> = (0..n_trotters)
            .map(|k| make_stream(seed, k as u64))
            .collect();

        Self {
            q0: Array2::from_elem((n_trotters, num_x0), -F::one()),
            q1: Array2::from_elem((n_trotters, num_x1), -F::one()),
            streams: Array1::from(streams),
            shared: make_stream(seed, SHARED_STREAM),
            seed,
        }
    }

    pub fn n_trotters(&self) -> usize {
        self.q0.nrows()
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws every spin uniformly, each replica from its own stream.
    pub fn randomize(&mut self) {
        Zip::from(self.q0.rows_mut())
            .and(self.q1.rows_mut())
            .and(&mut self.streams)
            .par_for_each(|row_0, row_1, prng| {
                randomize_spins(row_0, prng);
                randomize_spins(row_1, prng);
            });
    }

    /// Sets the spins from bits. A single row is broadcast to every replica.
    ///
    /// Shapes are checked by the caller.
    pub fn assign_bits(&mut self, x0s: ArrayView2<i8>, x1s: ArrayView2<i8>) {
        self.q0.assign(&spins_from_bits::<F>(x0s));
        self.q1.assign(&spins_from_bits::<F>(x1s));
    }
}

/// Inter replica coupling for a transverse field `g`, zero for a single replica.
pub fn transverse_coupling<F: Real>(g: F, beta: F, n_trotters: usize) -> F {
    if n_trotters <= 1 {
        return F::zero();
    }
    let r = F::lit(n_trotters as f64);
    let two = F::lit(2.0);
    -(beta * g / r).tanh().ln() / (two * beta)
}

/// Effective energy change of flipping spin `q` with local field `field`, `nsum` being the sum of
/// the same spin in the two neighbouring replicas.
pub fn flip_cost<F: Real>(q: F, field: F, nsum: F, inv_r: F, j_perp: F) -> F {
    let two = F::lit(2.0);
    let classical = -two * q * field * inv_r;
    // with G = 0 the coupling is infinite, and 0 * inf must not leak into the cost
    if nsum == F::zero() {
        classical
    } else {
        classical + two * j_perp * q * nsum
    }
}

/// Metropolis acceptance. One uniform is drawn for every proposal, accepted or not.
pub fn metropolis_accept<F: Real, T: Algorithm>(delta: F, beta: F, prng: &mut PRNG<T>) -> bool {
    let u = F::lit(prng.gen_f64());
    delta <= F::zero() || u < (-beta * delta).exp()
}

/// Replicas adjacent to `k` on the periodic replica ring.
const fn neighbours(k: usize, n_trotters: usize) -> (usize, usize) {
    let prev = (k + n_trotters - 1) % n_trotters;
    let next = (k + 1) % n_trotters;
    (prev, next)
}

/// Color of replica `k`, no two neighbouring replicas share one.
pub const fn trotter_color(k: usize, n_trotters: usize) -> usize {
    if n_trotters > 1 && n_trotters % 2 == 1 && k == n_trotters - 1 {
        2
    } else {
        k % 2
    }
}

pub const fn num_colors(n_trotters: usize) -> usize {
    match n_trotters {
        0 | 1 => 1,
        r if r % 2 == 0 => 2,
        _ => 3,
    }
}

/// For every spin, the sum of that spin over the two neighbouring replicas.
pub fn neighbour_sums<F: Real>(q: ArrayView2<F>) -> Array2<F> {
    let r = q.nrows();
    Array2::from_shape_fn(q.dim(), |(k, i)| {
        let (prev, next) = neighbours(k, r);
        q[[prev, i]] + q[[next, i]]
    })
}

/// One sweep of sequential proposals at random (replica, bit) sites.
pub fn sweep_naive<F: Real>(ens: &mut TrotterEnsemble<F>, ham: &Hamiltonian<F>, g: F, beta: F) {
    let r = ens.n_trotters();
    let (n0, n1) = (ens.q0.ncols(), ens.q1.ncols());
    let n = n0 + n1;
    if r == 0 || n == 0 {
        return;
    }

    let inv_r = F::one() / F::lit(r as f64);
    let j_perp = transverse_coupling(g, beta, r);

    for _ in 0..r * n {
        let k = (ens.shared.gen_u64() % r as u64) as usize;
        let site = (ens.shared.gen_u64() % n as u64) as usize;
        let (prev, next) = neighbours(k, r);

        if site < n0 {
            let i = site;
            let field = local_field_0(ham, ens.q1.row(k), i);
            let q = ens.q0[[k, i]];
            let nsum = ens.q0[[prev, i]] + ens.q0[[next, i]];
            if metropolis_accept(flip_cost(q, field, nsum, inv_r, j_perp), beta, &mut ens.shared) {
                ens.q0[[k, i]] = -q;
            }
        } else {
            let j = site - n0;
            let field = local_field_1(ham, ens.q0.row(k), j);
            let q = ens.q1[[k, j]];
            let nsum = ens.q1[[prev, j]] + ens.q1[[next, j]];
            if metropolis_accept(flip_cost(q, field, nsum, inv_r, j_perp), beta, &mut ens.shared) {
                ens.q1[[k, j]] = -q;
            }
        }
    }
}

/// One checkerboard sweep: all of partition 0, then all of partition 1.
///
/// Within a partition the local fields do not depend on the spins being updated, so they are computed once.
/// The neighbour sums are refreshed before every color phase.
pub fn sweep_coloring<F: Real>(ens: &mut TrotterEnsemble<F>, ham: &Hamiltonian<F>, g: F, beta: F) {
    let r = ens.n_trotters();
    if r == 0 {
        return;
    }
    let inv_r = F::one() / F::lit(r as f64);
    let j_perp = transverse_coupling(g, beta, r);

    let fields = local_fields_0(ham, ens.q1.view());
    update_partition(&mut ens.q0, fields.view(), &mut ens.streams, inv_r, j_perp, beta);

    let fields = local_fields_1(ham, ens.q0.view());
    update_partition(&mut ens.q1, fields.view(), &mut ens.streams, inv_r, j_perp, beta);
}

fn update_partition<F: Real>(
    q: &mut Array2<F>,
    fields: ArrayView2<F>,
    streams: &mut Array1<PRNG<JsfLarge>>,
    inv_r: F,
    j_perp: F,
    beta: F,
) {
    let r = q.nrows();
    for color in 0..num_colors(r) {
        let nsums = neighbour_sums(q.view());
        let active = Array1::from_shape_fn(r, |k| trotter_color(k, r) == color);

        Zip::from(q.rows_mut())
            .and(fields.rows())
            .and(nsums.rows())
            .and(&mut *streams)
            .and(&active)
            .par_for_each(|row, field, nsum, prng, &is_active| {
                if is_active {
                    update_replica(row, field, nsum, prng, inv_r, j_perp, beta);
                }
            });
    }
}

fn update_replica<F: Real>(
    mut row: ArrayViewMut1<F>,
    field: ArrayView1<F>,
    nsum: ArrayView1<F>,
    prng: &mut PRNG<JsfLarge>,
    inv_r: F,
    j_perp: F,
    beta: F,
) {
    for i in 0..row.len() {
        let q = row[i];
        if metropolis_accept(flip_cost(q, field[i], nsum[i], inv_r, j_perp), beta, prng) {
            row[i] = -q;
        }
    }
}
