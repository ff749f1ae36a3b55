//! This is the general Utils module, which contains functions that are used by both solvers: conversions
//! between bits, spins and the working precision, bit pattern enumeration and seeded random streams.

use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{Array1, Array2, ArrayView, ArrayView2, ArrayViewMut1, Dimension};
use smolprng::{Algorithm, JsfLarge, PRNG};

use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;

/// Fails with `InvalidParameter` unless every entry is 0 or 1.
pub fn check_bits<D: Dimension>(x: ArrayView<i8, D>, what: &str) -> Result<()> {
    match x.iter().find(|&&v| v != 0 && v != 1) {
        Some(v) => Err(SolverError::InvalidParameter(format!(
            "{what} must only hold 0 or 1, found {v}"
        ))),
        None => Ok(()),
    }
}

/// Maps bits to spins, q = 2x - 1, in the working precision.
pub fn spins_from_bits<F: Real>(x: ArrayView2<i8>) -> Array2<F> {
    x.mapv(|v| F::from_bit(2 * v - 1))
}

/// Same as [`spins_from_bits`] for bits already held as reals.
pub fn spins_from_bits_real<F: Real>(x: ArrayView2<F>) -> Array2<F> {
    let two = F::lit(2.0);
    x.mapv(|v| two * v - F::one())
}

/// Projects spins back to bits, x = (1 + q) / 2.
pub fn bits_from_spins<F: Real>(q: ArrayView2<F>) -> Array2<i8> {
    q.mapv(|v| i8::from(v > F::zero()))
}

/// Converts real valued spins to `i8`.
pub fn spins_as_i8<F: Real>(q: ArrayView2<F>) -> Array2<i8> {
    q.mapv(|v| if v > F::zero() { 1 } else { -1 })
}

/// Splits the rows of a pair of matrices into a list of (x0, x1) pairs.
pub fn split_rows<T: Clone>(a: ArrayView2<T>, b: ArrayView2<T>) -> Vec<(Array1<T>, Array1<T>)> {
    a.rows()
        .into_iter()
        .zip(b.rows())
        .map(|(r0, r1)| (r0.to_owned(), r1.to_owned()))
        .collect()
}

/// Unpacks an integer code into `n` bits, bit k of the code being element k.
pub fn unpack_bits(code: u64, n: usize) -> Array1<i8> {
    Array1::from_shape_fn(n, |k| ((code >> k) & 1) as i8)
}

/// Every bit pattern with a code in `[begin, end)`, one per row, in the working precision.
pub fn bit_patterns<F: Real>(begin: u64, end: u64, n: usize) -> Array2<F> {
    let rows = end.saturating_sub(begin) as usize;
    Array2::from_shape_fn((rows, n), |(r, k)| {
        let code = begin + r as u64;
        F::from_bit(((code >> k) & 1) as i8)
    })
}

/// Fills a row with uniform random spins.
pub fn randomize_spins<F: Real, T: Algorithm>(mut q: ArrayViewMut1<F>, prng: &mut PRNG<T>) {
    for v in q.iter_mut() {
        *v = if prng.gen_u64() & 1 == 1 { F::one() } else { -F::one() };
    }
}

/// Makes a generator for sub-stream `stream` of `seed`.
///
/// The seed and stream index are mixed with splitmix64 so neighbouring streams start far apart.
pub fn make_stream(seed: u64, stream: u64) -> PRNG<JsfLarge> {
    let mixed = splitmix64(seed ^ splitmix64(stream.wrapping_add(0x9E37_79B9_7F4A_7C15)));
    PRNG {
        generator: JsfLarge::from(mixed),
    }
}

/// Seed used when the caller has not supplied one.
pub fn seed_from_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

const fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
