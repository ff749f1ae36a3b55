//! Solution bookkeeping for both solvers.
//!
//! [`SolutionStore`] is what a solver publishes: one [`Solution`] per trotter replica for the annealer, the
//! retained optimal states for the brute-force searcher. [`ResultSet`] is the searcher's running optimum.

use ndarray::Array1;

use crate::numeric_trait::Real;
use crate::qubo::Optimize;

/// A binary state with its objective value in the caller's direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<F: Real> {
    pub x0: Array1<i8>,
    pub x1: Array1<i8>,
    pub energy: F,
}

#[derive(Clone, Debug, Default)]
pub struct SolutionStore<F: Real> {
    solutions: Vec<Solution<F>>,
}

impl<F: Real> SolutionStore<F> {
    pub const fn new() -> Self {
        Self {
            solutions: Vec::new(),
        }
    }

    pub fn publish(&mut self, solutions: Vec<Solution<F>>) {
        self.solutions = solutions;
    }

    pub fn clear(&mut self) {
        self.solutions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn solutions(&self) -> &[Solution<F>] {
        &self.solutions
    }

    pub fn energies(&self) -> Array1<F> {
        self.solutions.iter().map(|s| s.energy).collect()
    }

    pub fn states(&self) -> Vec<(Array1<i8>, Array1<i8>)> {
        self.solutions
            .iter()
            .map(|s| (s.x0.clone(), s.x1.clone()))
            .collect()
    }

    /// The best solution for the given direction, the first one on ties.
    pub fn best(&self, optimize: Optimize) -> Option<&Solution<F>> {
        let sign = optimize.sign::<F>();
        self.solutions.iter().fold(None, |best, s| match best {
            Some(b) if sign * b.energy <= sign * s.energy => Some(b),
            _ if s.energy.is_nan() => best,
            _ => Some(s),
        })
    }
}

/// A retained state of the brute-force search, energies are in the minimized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<F: Real> {
    pub code_x0: u64,
    pub code_x1: u64,
    pub energy: F,
}

/// Running set of optimal states.
///
/// The answer is the `capacity` lowest encoded indices `(code_x0, code_x1)` among all states whose energy is
/// within [`ResultSet::tolerance`] of the lowest energy seen. `emin` follows every offered state, kept or not.
/// A state is only discarded when it can never be part of the answer: it is above the tie threshold, or
/// `capacity` states with lower indices and no higher energy are already held. The answer therefore does not
/// depend on the order states are offered in, nor on how they were split between merged sets.
#[derive(Clone, Debug)]
pub struct ResultSet<F: Real> {
    emin: F,
    capacity: usize,
    // sorted by key, every entry within the threshold of emin
    held: Vec<Candidate<F>>,
}

impl<F: Real> ResultSet<F> {
    pub fn new(capacity: usize) -> Self {
        Self {
            emin: F::infinity(),
            capacity: capacity.max(1),
            held: Vec::new(),
        }
    }

    /// Tie tolerance around `emin`.
    pub fn tolerance(emin: F) -> F {
        let scale = if emin.is_finite() {
            emin.abs().max(F::one())
        } else {
            F::one()
        };
        F::lit(64.0) * F::epsilon() * scale
    }

    /// Highest energy still counted as a tie with `emin`.
    pub fn threshold(emin: F) -> F {
        emin + Self::tolerance(emin)
    }

    /// Lowest energy offered so far.
    pub fn emin(&self) -> F {
        self.emin
    }

    /// Retained states, lowest encoded index first.
    pub fn candidates(&self) -> &[Candidate<F>] {
        &self.held[..self.held.len().min(self.capacity)]
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn offer(&mut self, code_x0: u64, code_x1: u64, energy: F) {
        if energy < self.emin {
            self.lower_emin(energy);
        }
        if energy.is_nan() || energy > Self::threshold(self.emin) {
            return;
        }

        let candidate = Candidate {
            code_x0,
            code_x1,
            energy,
        };
        let key = candidate.key();
        let pos = self.held.partition_point(|c| c.key() < key);
        if self.held.get(pos).is_some_and(|c| c.key() == key) {
            return;
        }
        if self.dominated(&self.held[..pos], energy) {
            return;
        }
        self.held.insert(pos, candidate);

        // entries after the new one may now be dominated
        let mut i = pos + 1;
        while i < self.held.len() {
            if self.held[i].energy >= energy && self.dominated(&self.held[..i], self.held[i].energy) {
                self.held.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Folds in another set, as if its states had been offered to this one.
    pub fn merge(&mut self, other: &Self) {
        if other.emin < self.emin {
            self.lower_emin(other.emin);
        }
        for c in &other.held {
            self.offer(c.code_x0, c.code_x1, c.energy);
        }
    }

    fn lower_emin(&mut self, emin: F) {
        self.emin = emin;
        let threshold = Self::threshold(emin);
        self.held.retain(|c| c.energy <= threshold);
    }

    /// `capacity` states with lower indices and energy at most `energy`.
    fn dominated(&self, lower: &[Candidate<F>], energy: F) -> bool {
        lower.iter().filter(|c| c.energy <= energy).count() >= self.capacity
    }
}

impl<F: Real> Candidate<F> {
    const fn key(&self) -> (u64, u64) {
        (self.code_x0, self.code_x1)
    }
}
