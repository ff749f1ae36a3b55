//! # Bipartite graph annealer
//!
//! Simulated quantum annealing of a [`BipartiteQubo`] by path integral Monte Carlo. The annealer is a
//! small state machine,
//!
//! ```text
//! Unconfigured --set_qubo--> Configured --prepare--> Prepared --anneal_one_step, make_solution--> Solved
//! ```
//!
//! `Solved` needs at least one anneal step since the last `prepare`; `make_solution` on freshly prepared
//! replicas publishes their states but the annealer stays `Prepared`. Setting a new problem, or changing the replica count or the seed, drops back to `Configured`. Any
//! operation that moves the spins (`anneal_one_step`, `randomize_spin`, `set_x`) drops `Solved` back to
//! `Prepared` and marks the cached energies stale.
//!
//! Energies reported by the annealer are always in the caller's direction, the sign flip for
//! maximization is handled internally.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, info, trace};

use crate::energy::{ising_energies, qubo_energies};
use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;
use crate::qubo::{BipartiteQubo, Hamiltonian, Optimize};
use crate::solution::{Solution, SolutionStore};
use crate::solver::BipartiteSolver;
use crate::solver_options::{AnnealAlgorithm, AnnealerPreferences};
use crate::trotter::{sweep_coloring, sweep_naive, TrotterEnsemble};
use crate::utils::{bits_from_spins, check_bits, seed_from_time, spins_as_i8, split_rows};

/// Lifecycle state of an [`Annealer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnealerState {
    Unconfigured,
    Configured,
    Prepared,
    Solved,
}

pub struct Annealer<F: Real> {
    problem: Option<Arc<BipartiteQubo<F>>>,
    preferences: AnnealerPreferences,
    ensemble: Option<TrotterEnsemble<F>>,
    /// Initial bits supplied before `prepare`, one row or one row per replica.
    pending_x: Option<(Array2<i8>, Array2<i8>)>,
    energies: Option<Array1<F>>,
    solutions: SolutionStore<F>,
    solved: bool,
    /// An anneal step ran since the last `prepare`.
    stepped: bool,
}

impl<F: Real> Default for Annealer<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Real> Annealer<F> {
    pub const fn new() -> Self {
        Self {
            problem: None,
            preferences: AnnealerPreferences {
                n_trotters: None,
                seed: None,
                optimize: Optimize::Minimize,
                algorithm: AnnealAlgorithm::Coloring,
            },
            ensemble: None,
            pending_x: None,
            energies: None,
            solutions: SolutionStore::new(),
            solved: false,
            stepped: false,
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` if the preferences do not validate.
    pub fn with_preferences(preferences: AnnealerPreferences) -> Result<Self> {
        preferences.validate()?;
        Ok(Self {
            preferences,
            ..Self::new()
        })
    }

    pub fn state(&self) -> AnnealerState {
        match (&self.problem, &self.ensemble) {
            (None, _) => AnnealerState::Unconfigured,
            (Some(_), None) => AnnealerState::Configured,
            (Some(_), Some(_)) if self.solved && self.stepped => AnnealerState::Solved,
            (Some(_), Some(_)) => AnnealerState::Prepared,
        }
    }

    /// Working precision, "float" or "double".
    pub const fn precision(&self) -> &'static str {
        F::PRECISION
    }

    /// Seeds the random streams. Takes effect at the next `prepare`.
    pub fn seed(&mut self, seed: u64) {
        self.preferences.seed = Some(seed);
        self.drop_ensemble();
    }

    pub const fn get_preferences(&self) -> &AnnealerPreferences {
        &self.preferences
    }

    /// Replaces the preferences.
    ///
    /// A different replica count or seed requires a new `prepare`, a different direction rebuilds the problem.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` if the preferences do not validate, nothing is changed in that case.
    pub fn set_preferences(&mut self, preferences: AnnealerPreferences) -> Result<()> {
        preferences.validate()?;

        let resized = self.n_trotters_with(&preferences) != self.n_trotters();
        let reseeded = preferences.seed != self.preferences.seed;
        let redirected = preferences.optimize != self.preferences.optimize;
        self.preferences = preferences;

        if redirected {
            if let Some(problem) = self.problem.take() {
                self.problem = Some(Arc::new(problem.with_optimize(self.preferences.optimize)));
            }
            self.mark_stale();
        }
        if resized || reseeded {
            self.drop_ensemble();
        }
        debug!(preferences = ?self.preferences, "annealer preferences updated");
        Ok(())
    }

    /// Sets one preference by name, see [`AnnealerPreferences::set_preference`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for unknown keys or invalid values.
    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.preferences.clone();
        updated.set_preference(key, value)?;
        self.set_preferences(updated)
    }

    /// Replica count R for the current problem, `None` without a problem.
    pub fn n_trotters(&self) -> Option<usize> {
        self.n_trotters_with(&self.preferences)
    }

    fn n_trotters_with(&self, preferences: &AnnealerPreferences) -> Option<usize> {
        self.problem
            .as_ref()
            .map(|p| preferences.trotters_for(p.num_x0(), p.num_x1()))
    }

    /// Allocates the replicas and seeds them, from `set_x` values if any were supplied, randomly otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ProblemNotSet` without a problem, `ShapeMismatch` if pending `set_x` rows are neither 1 nor R.
    pub fn prepare(&mut self) -> Result<()> {
        let problem = self.problem.as_ref().ok_or(SolverError::ProblemNotSet)?;
        let (n0, n1) = problem.size();
        let r = self.preferences.trotters_for(n0, n1);
        let seed = self.preferences.seed.unwrap_or_else(seed_from_time);

        let mut ensemble = TrotterEnsemble::new(r, n0, n1, seed);
        match self.pending_x.take() {
            Some((x0s, x1s)) => {
                if x0s.nrows() != 1 && x0s.nrows() != r {
                    let err = SolverError::shape("set_x rows", format!("1 or {r}"), x0s.nrows());
                    self.pending_x = Some((x0s, x1s));
                    return Err(err);
                }
                ensemble.assign_bits(x0s.view(), x1s.view());
            }
            None => ensemble.randomize(),
        }

        info!(
            num_x0 = n0,
            num_x1 = n1,
            n_trotters = r,
            seed,
            algorithm = %self.preferences.algorithm,
            precision = F::PRECISION,
            "annealer prepared"
        );
        self.ensemble = Some(ensemble);
        self.stepped = false;
        self.solutions.clear();
        self.mark_stale();
        Ok(())
    }

    /// Redraws every spin of every replica.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn randomize_spin(&mut self) -> Result<()> {
        self.ensemble_mut()?.randomize();
        self.mark_stale();
        Ok(())
    }

    /// Sets every replica to the same binary state.
    ///
    /// Before `prepare` the state is kept and applied when the replicas are allocated.
    ///
    /// # Errors
    ///
    /// Returns `ProblemNotSet` without a problem, `ShapeMismatch` on a length mismatch and `InvalidParameter`
    /// if an entry is not 0 or 1.
    pub fn set_x(&mut self, x0: ArrayView1<i8>, x1: ArrayView1<i8>) -> Result<()> {
        self.apply_x(x0.insert_axis(Axis(0)), x1.insert_axis(Axis(0)))
    }

    /// Sets one binary state per replica, `x0s` is (R, N0) and `x1s` is (R, N1).
    ///
    /// # Errors
    ///
    /// Same as [`Annealer::set_x`], and `ShapeMismatch` if the row count is not R once prepared.
    pub fn set_x_per_replica(&mut self, x0s: ArrayView2<i8>, x1s: ArrayView2<i8>) -> Result<()> {
        self.apply_x(x0s, x1s)
    }

    fn apply_x(&mut self, x0s: ArrayView2<i8>, x1s: ArrayView2<i8>) -> Result<()> {
        let problem = self.problem.as_ref().ok_or(SolverError::ProblemNotSet)?;
        problem.check_state_len(x0s.ncols(), x1s.ncols())?;
        if x0s.nrows() != x1s.nrows() {
            return Err(SolverError::shape("x1 rows", x0s.nrows(), x1s.nrows()));
        }
        check_bits(x0s, "x0")?;
        check_bits(x1s, "x1")?;

        match self.ensemble.as_mut() {
            Some(ensemble) => {
                let r = ensemble.n_trotters();
                if x0s.nrows() != 1 && x0s.nrows() != r {
                    return Err(SolverError::shape("x0 rows", format!("1 or {r}"), x0s.nrows()));
                }
                ensemble.assign_bits(x0s, x1s);
                self.mark_stale();
            }
            None => self.pending_x = Some((x0s.to_owned(), x1s.to_owned())),
        }
        Ok(())
    }

    /// Computes the energy of every replica from the current spins, caching it for `get_E`.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    #[allow(non_snake_case)]
    pub fn calculate_E(&mut self) -> Result<()> {
        let (problem, ensemble) = self.prepared()?;
        let sign = problem.optimize.sign::<F>();
        let energies = ising_energies(problem.hamiltonian(), ensemble.q0.view(), ensemble.q1.view()) * sign;
        self.energies = Some(energies);
        Ok(())
    }

    /// One Monte Carlo sweep at transverse field `g` and inverse temperature `beta`.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`, `InvalidParameter` unless `beta` is finite and positive and
    /// `g` is finite and non-negative.
    pub fn anneal_one_step(&mut self, g: F, beta: F) -> Result<()> {
        if self.ensemble.is_none() {
            return Err(SolverError::NotPrepared);
        }
        if !beta.is_finite() || beta <= F::zero() {
            return Err(SolverError::InvalidParameter(format!(
                "beta must be finite and positive, got {beta}"
            )));
        }
        if !g.is_finite() || g < F::zero() {
            return Err(SolverError::InvalidParameter(format!(
                "G must be finite and non-negative, got {g}"
            )));
        }

        let algorithm = self.preferences.algorithm;
        let problem = Arc::clone(self.problem.as_ref().ok_or(SolverError::ProblemNotSet)?);
        let ensemble = self.ensemble_mut()?;
        match algorithm {
            AnnealAlgorithm::Coloring => sweep_coloring(ensemble, problem.hamiltonian(), g, beta),
            AnnealAlgorithm::Naive => sweep_naive(ensemble, problem.hamiltonian(), g, beta),
        }
        trace!(g = g.as_f64(), beta = beta.as_f64(), "anneal step");
        self.stepped = true;
        self.mark_stale();
        Ok(())
    }

    /// Projects every replica to bits and publishes them with their objective values.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn make_solution(&mut self) -> Result<()> {
        let (problem, ensemble) = self.prepared()?;
        let x0s = bits_from_spins(ensemble.q0.view());
        let x1s = bits_from_spins(ensemble.q1.view());

        let energies = qubo_energies(
            problem,
            x0s.mapv(F::from_bit).view(),
            x1s.mapv(F::from_bit).view(),
        );
        let solutions = split_rows(x0s.view(), x1s.view())
            .into_iter()
            .zip(energies.iter())
            .map(|((x0, x1), &energy)| Solution { x0, x1, energy })
            .collect();

        if let Some(best) = self.best_energy(&energies) {
            debug!(best = best.as_f64(), n_trotters = energies.len(), "solution made");
        }
        self.solutions.publish(solutions);
        self.energies = Some(energies);
        self.solved = true;
        Ok(())
    }

    fn best_energy(&self, energies: &Array1<F>) -> Option<F> {
        let sign = self.preferences.optimize.sign::<F>();
        energies
            .iter()
            .filter(|e| !e.is_nan())
            .map(|&e| sign * e)
            .reduce(|a, b| a.min(b))
            .map(|e| sign * e)
    }

    /// Energy of every replica, computed on demand if stale.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    #[allow(non_snake_case)]
    pub fn get_E(&mut self) -> Result<&Array1<F>> {
        if self.energies.is_none() {
            self.calculate_E()?;
        }
        self.energies.as_ref().ok_or(SolverError::NotPrepared)
    }

    /// Current binary state of every replica.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn get_x(&self) -> Result<Vec<(Array1<i8>, Array1<i8>)>> {
        let (_, ensemble) = self.prepared()?;
        let x0s = bits_from_spins(ensemble.q0.view());
        let x1s = bits_from_spins(ensemble.q1.view());
        Ok(split_rows(x0s.view(), x1s.view()))
    }

    /// Current spins of every replica.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn get_q(&self) -> Result<Vec<(Array1<i8>, Array1<i8>)>> {
        let (_, ensemble) = self.prepared()?;
        let q0s = spins_as_i8(ensemble.q0.view());
        let q1s = spins_as_i8(ensemble.q1.view());
        Ok(split_rows(q0s.view(), q1s.view()))
    }

    /// The Ising form (h0, h1, J, c) of the problem, in the minimized direction.
    ///
    /// # Errors
    ///
    /// Returns `ProblemNotSet` without a problem.
    pub fn get_hamiltonian(&self) -> Result<&Hamiltonian<F>> {
        self.problem
            .as_deref()
            .map(BipartiteQubo::hamiltonian)
            .ok_or(SolverError::ProblemNotSet)
    }

    fn prepared(&self) -> Result<(&BipartiteQubo<F>, &TrotterEnsemble<F>)> {
        match (self.problem.as_deref(), self.ensemble.as_ref()) {
            (None, _) => Err(SolverError::ProblemNotSet),
            (Some(_), None) => Err(SolverError::NotPrepared),
            (Some(problem), Some(ensemble)) => Ok((problem, ensemble)),
        }
    }

    fn ensemble_mut(&mut self) -> Result<&mut TrotterEnsemble<F>> {
        self.ensemble.as_mut().ok_or(SolverError::NotPrepared)
    }

    fn drop_ensemble(&mut self) {
        self.ensemble = None;
        self.stepped = false;
        self.mark_stale();
    }

    fn mark_stale(&mut self) {
        self.energies = None;
        self.solved = false;
    }
}

impl<F: Real> BipartiteSolver<F> for Annealer<F> {
    fn set_problem(&mut self, problem: Arc<BipartiteQubo<F>>) {
        info!(
            num_x0 = problem.num_x0(),
            num_x1 = problem.num_x1(),
            optimize = %problem.optimize,
            "annealer problem set"
        );
        self.preferences.optimize = problem.optimize;
        self.problem = Some(problem);
        self.pending_x = None;
        self.solutions.clear();
        self.drop_ensemble();
    }

    fn problem(&self) -> Option<&Arc<BipartiteQubo<F>>> {
        self.problem.as_ref()
    }

    fn solve(&mut self) -> Result<()> {
        crate::schedule::anneal(self, &crate::schedule::AnnealSchedule::default())
    }

    fn solutions(&self) -> &SolutionStore<F> {
        &self.solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_solver_problem, make_test_prng};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn make_annealer(n0: usize, n1: usize, n_trotters: usize) -> Annealer<f64> {
        let mut annealer = Annealer::<f64>::new();
        annealer.set_problem(make_solver_problem(n0, n1));
        annealer.set_preference("n_trotters", &n_trotters.to_string()).unwrap();
        annealer.seed(9);
        annealer
    }

    #[test]
    fn test_state_machine() {
        let mut annealer = Annealer::<f64>::new();
        assert_eq!(annealer.state(), AnnealerState::Unconfigured);
        assert_eq!(annealer.prepare(), Err(SolverError::ProblemNotSet));

        annealer.set_problem(make_solver_problem(4, 3));
        assert_eq!(annealer.state(), AnnealerState::Configured);
        assert_eq!(annealer.anneal_one_step(1.0, 1.0), Err(SolverError::NotPrepared));
        assert!(matches!(annealer.get_E(), Err(SolverError::NotPrepared)));

        annealer.prepare().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);

        // no step yet, the published states are the starting ones
        annealer.make_solution().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);
        assert_eq!(annealer.solutions().len(), annealer.n_trotters().unwrap());

        annealer.anneal_one_step(1.0, 1.0).unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);
        annealer.make_solution().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Solved);

        annealer.anneal_one_step(1.0, 1.0).unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);
        annealer.make_solution().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Solved);

        // a new prepare needs a new step
        annealer.prepare().unwrap();
        annealer.make_solution().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);

        annealer.seed(3);
        assert_eq!(annealer.state(), AnnealerState::Configured);
    }

    #[test]
    fn test_randomize_spin() {
        let mut annealer = make_annealer(6, 5, 4);
        assert_eq!(annealer.randomize_spin(), Err(SolverError::NotPrepared));

        annealer.set_x(Array1::zeros(6).view(), Array1::zeros(5).view()).unwrap();
        annealer.prepare().unwrap();
        annealer.anneal_one_step(0.0, 1e12).unwrap();
        annealer.make_solution().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Solved);
        let cached = annealer.get_E().unwrap().clone();

        annealer.randomize_spin().unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);
        assert!(annealer.energies.is_none());

        // the recomputed energies follow the new spins
        let fresh = annealer.get_E().unwrap().clone();
        let problem = annealer.problem().unwrap().clone();
        for (k, (x0, x1)) in annealer.get_x().unwrap().iter().enumerate() {
            assert_relative_eq!(problem.eval(x0.view(), x1.view()).unwrap(), fresh[k], epsilon = 1e-10);
        }
        assert_eq!(cached.len(), fresh.len());

        // the spins are still a valid ±1 configuration
        for (q0, q1) in annealer.get_q().unwrap() {
            assert!(q0.iter().chain(q1.iter()).all(|&q| q == 1 || q == -1));
        }

        let run = || {
            let mut annealer = make_annealer(6, 5, 4);
            annealer.prepare().unwrap();
            annealer.randomize_spin().unwrap();
            let first = annealer.get_x().unwrap();
            annealer.randomize_spin().unwrap();
            (first, annealer.get_x().unwrap())
        };
        let (first, second) = run();
        assert_eq!((first.clone(), second.clone()), run());
        assert_ne!(first, second);
    }

    #[test]
    fn test_default_trotters() {
        let annealer = {
            let mut a = Annealer::<f64>::new();
            a.set_problem(make_solver_problem(12, 8));
            a
        };
        assert_eq!(annealer.n_trotters(), Some(5));
    }

    #[test]
    fn test_step_parameter_checks() {
        let mut annealer = make_annealer(4, 3, 2);
        annealer.prepare().unwrap();
        for beta in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                annealer.anneal_one_step(1.0, beta),
                Err(SolverError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            annealer.anneal_one_step(-0.1, 1.0),
            Err(SolverError::InvalidParameter(_))
        ));
        // G = 0 is a valid classical step
        annealer.anneal_one_step(0.0, 1.0).unwrap();
    }

    #[test]
    fn test_set_x_before_and_after_prepare() {
        let mut annealer = make_annealer(3, 2, 3);
        let x0 = array![1i8, 0, 1];
        let x1 = array![0i8, 1];

        annealer.set_x(x0.view(), x1.view()).unwrap();
        annealer.prepare().unwrap();
        for (a, b) in annealer.get_x().unwrap() {
            assert_eq!(a, x0);
            assert_eq!(b, x1);
        }
        let q = annealer.get_q().unwrap();
        assert_eq!(q[0].0, array![1i8, -1, 1]);

        let x0s = array![[1i8, 1, 1], [0, 0, 0], [1, 0, 0]];
        let x1s = array![[1i8, 1], [0, 0], [0, 1]];
        annealer.set_x_per_replica(x0s.view(), x1s.view()).unwrap();
        let xs = annealer.get_x().unwrap();
        assert_eq!(xs[2].0, array![1i8, 0, 0]);
        assert_eq!(xs[1].1, array![0i8, 0]);

        let bad_rows = array![[1i8, 1, 1], [0, 0, 0]];
        let bad_rows_1 = array![[1i8, 1], [0, 0]];
        assert!(matches!(
            annealer.set_x_per_replica(bad_rows.view(), bad_rows_1.view()),
            Err(SolverError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            annealer.set_x(array![1i8, 0].view(), x1.view()),
            Err(SolverError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            annealer.set_x(array![1i8, 2, 0].view(), x1.view()),
            Err(SolverError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_energies_match_projection() {
        let mut annealer = make_annealer(6, 5, 4);
        annealer.prepare().unwrap();
        for _ in 0..5 {
            annealer.anneal_one_step(0.5, 2.0).unwrap();
        }

        let ising = annealer.get_E().unwrap().clone();
        annealer.make_solution().unwrap();
        let projected = annealer.get_E().unwrap().clone();
        assert_eq!(ising.len(), 4);
        for k in 0..4 {
            assert_relative_eq!(ising[k], projected[k], epsilon = 1e-10);
        }

        let problem = annealer.problem().unwrap().clone();
        for s in annealer.solutions().solutions() {
            assert_relative_eq!(problem.eval(s.x0.view(), s.x1.view()).unwrap(), s.energy, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        for algorithm in ["naive", "coloring"] {
            let run = || {
                let mut annealer = make_annealer(7, 6, 3);
                annealer.set_preference("algorithm", algorithm).unwrap();
                annealer.prepare().unwrap();
                for step in 0..20 {
                    annealer.anneal_one_step(2.0 * 0.9f64.powi(step), 5.0).unwrap();
                }
                annealer.get_x().unwrap()
            };
            assert_eq!(run(), run());
        }
    }

    #[test]
    fn test_maximize_reports_caller_direction() {
        let mut prng = make_test_prng();
        let problem = BipartiteQubo::<f64>::make_random(5, 4, &mut prng);

        let mut annealer = Annealer::<f64>::new();
        annealer.set_problem(Arc::new(problem.with_optimize(Optimize::Maximize)));
        annealer.seed(1);
        annealer.prepare().unwrap();
        annealer.make_solution().unwrap();

        for s in annealer.solutions().solutions() {
            assert_relative_eq!(
                problem.eval(s.x0.view(), s.x1.view()).unwrap(),
                s.energy,
                epsilon = 1e-10
            );
        }
        let e = annealer.get_E().unwrap().clone();
        annealer.calculate_E().unwrap();
        assert_relative_eq!(e[0], annealer.get_E().unwrap()[0], epsilon = 1e-10);
    }

    #[test]
    fn test_preferences_keep_or_drop_replicas() {
        let mut annealer = make_annealer(4, 4, 2);
        annealer.prepare().unwrap();

        annealer.set_preference("algorithm", "naive").unwrap();
        assert_eq!(annealer.state(), AnnealerState::Prepared);

        annealer.set_preference("n_trotters", "3").unwrap();
        assert_eq!(annealer.state(), AnnealerState::Configured);
        assert!(annealer.set_preference("temperature", "1").is_err());

        annealer.set_preference("optimize", "maximize").unwrap();
        assert_eq!(annealer.problem().unwrap().optimize, Optimize::Maximize);
    }

    #[test]
    fn test_hamiltonian_access() {
        let annealer = Annealer::<f32>::new();
        assert!(matches!(annealer.get_hamiltonian(), Err(SolverError::ProblemNotSet)));

        let mut annealer = Annealer::<f32>::new();
        annealer
            .set_qubo(array![1.0f64].view(), array![2.0].view(), array![[-4.0]].view(), Optimize::Minimize)
            .unwrap();
        let ham = annealer.get_hamiltonian().unwrap();
        assert_relative_eq!(ham.j[[0, 0]], -1.0f32);
        assert_eq!(annealer.precision(), "float");
    }
}
