//! # Brute-force searcher
//!
//! Exhaustive enumeration of all 2^(N0 + N1) states of a [`BipartiteQubo`]. States are encoded as a pair
//! of integers `(code_x0, code_x1)`, bit k of a code being element k of the vector, and visited in tiles:
//! a block of `tile_size_0` x0 patterns against every block of `tile_size_1` x1 patterns, the energies of
//! one block pair coming from a single matrix product.
//!
//! `search_range` processes one batch of x0 tiles, one tile per rayon worker. Every tile keeps its own
//! [`ResultSet`] and the sets are merged in tile order, so the outcome does not depend on the thread count.
//! Among equal energies the lowest encoded index wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array1;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::energy::qubo_energy_grid;
use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;
use crate::qubo::BipartiteQubo;
use crate::solution::{ResultSet, Solution, SolutionStore};
use crate::solver::BipartiteSolver;
use crate::solver_options::{SearcherPreferences, MAX_ENCODABLE_BITS};
use crate::utils::{bit_patterns, unpack_bits};

/// Enumeration cursor set up by `prepare`.
#[derive(Clone, Copy, Debug)]
struct SearchRange {
    next_x0: u64,
    x0_max: u64,
    x1_max: u64,
    tile_0: u64,
    tile_1: u64,
}

impl SearchRange {
    const fn is_done(&self) -> bool {
        self.next_x0 >= self.x0_max
    }
}

#[derive(Debug, Default)]
pub struct BruteForceSearcher<F: Real> {
    problem: Option<Arc<BipartiteQubo<F>>>,
    preferences: SearcherPreferences,
    range: Option<SearchRange>,
    results: Option<ResultSet<F>>,
    solutions: SolutionStore<F>,
    solution_available: bool,
}

impl<F: Real> BruteForceSearcher<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` if the preferences do not validate.
    pub fn with_preferences(preferences: SearcherPreferences) -> Result<Self> {
        preferences.validate()?;
        Ok(Self {
            preferences,
            ..Self::default()
        })
    }

    pub const fn get_preferences(&self) -> &SearcherPreferences {
        &self.preferences
    }

    /// Replaces the preferences, any search in progress has to be prepared again.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` if the preferences do not validate, nothing is changed in that case.
    pub fn set_preferences(&mut self, preferences: SearcherPreferences) -> Result<()> {
        preferences.validate()?;
        if preferences.optimize != self.preferences.optimize {
            if let Some(problem) = self.problem.take() {
                self.problem = Some(Arc::new(problem.with_optimize(preferences.optimize)));
            }
        }
        self.preferences = preferences;
        self.reset();
        debug!(preferences = ?self.preferences, "searcher preferences updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` for unknown keys or invalid values.
    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.preferences.clone();
        updated.set_preference(key, value)?;
        self.set_preferences(updated)
    }

    /// Checks the problem size and resets the enumeration.
    ///
    /// # Errors
    ///
    /// Returns `ProblemNotSet` without a problem and `ProblemTooLarge` if N0 + N1 exceeds `max_bits`.
    pub fn prepare(&mut self) -> Result<()> {
        let problem = self.problem.as_ref().ok_or(SolverError::ProblemNotSet)?;
        let (n0, n1) = problem.size();
        let limit = self.preferences.max_bits.min(MAX_ENCODABLE_BITS);
        if n0 + n1 > limit {
            return Err(SolverError::ProblemTooLarge {
                bits: n0 + n1,
                limit,
            });
        }

        let x0_max = 1u64 << n0;
        let x1_max = 1u64 << n1;
        let tile_0 = clamp_tile(self.preferences.tile_size_0, x0_max, "tile_size_0");
        let tile_1 = clamp_tile(self.preferences.tile_size_1, x1_max, "tile_size_1");

        self.range = Some(SearchRange {
            next_x0: 0,
            x0_max,
            x1_max,
            tile_0,
            tile_1,
        });
        self.results = Some(ResultSet::new(self.preferences.max_solutions));
        self.solutions.clear();
        self.solution_available = false;
        info!(num_x0 = n0, num_x1 = n1, tile_0, tile_1, "searcher prepared");
        Ok(())
    }

    /// Searches the next batch of x0 tiles. Returns `true` once the whole space has been visited.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn search_range(&mut self) -> Result<bool> {
        let (Some(problem), Some(range), Some(results)) =
            (self.problem.as_ref(), self.range.as_mut(), self.results.as_mut())
        else {
            return Err(SolverError::NotPrepared);
        };
        if range.is_done() {
            return Ok(true);
        }

        let batch = rayon::current_num_threads().max(1) as u64;
        let starts: Vec<u64> = (0..batch)
            .map(|t| range.next_x0 + t * range.tile_0)
            .take_while(|&begin| begin < range.x0_max)
            .collect();

        let capacity = self.preferences.max_solutions;
        let (x0_max, x1_max, tile_0, tile_1) = (range.x0_max, range.x1_max, range.tile_0, range.tile_1);
        let local_sets: Vec<ResultSet<F>> = starts
            .par_iter()
            .map(|&begin| {
                let end = (begin + tile_0).min(x0_max);
                search_tile(problem, begin, end, x1_max, tile_1, capacity)
            })
            .collect();

        for local in &local_sets {
            results.merge(local);
        }

        range.next_x0 = starts
            .last()
            .map_or(x0_max, |&begin| (begin + tile_0).min(x0_max));
        debug!(
            searched = range.next_x0,
            total = range.x0_max,
            emin = results.emin().as_f64(),
            "search batch done"
        );

        let done = range.is_done();
        self.solution_available = false;
        Ok(done)
    }

    /// Decodes the retained states into published solutions.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn make_solution(&mut self) -> Result<()> {
        let (Some(problem), Some(results)) = (self.problem.as_ref(), self.results.as_ref()) else {
            return Err(SolverError::NotPrepared);
        };
        let (n0, n1) = problem.size();
        let sign = problem.optimize.sign::<F>();

        let solutions = results
            .candidates()
            .iter()
            .map(|c| Solution {
                x0: unpack_bits(c.code_x0, n0),
                x1: unpack_bits(c.code_x1, n1),
                energy: sign * c.energy,
            })
            .collect();
        self.solutions.publish(solutions);
        self.solution_available = true;
        Ok(())
    }

    /// `prepare`, `search_range` until done, `make_solution`.
    ///
    /// # Errors
    ///
    /// Propagates `prepare` errors.
    pub fn search(&mut self) -> Result<()> {
        self.prepare()?;
        while !self.search_range()? {}
        self.make_solution()?;
        self.log_result();
        Ok(())
    }

    /// Same as [`BruteForceSearcher::search`], checking `cancel` between batches.
    ///
    /// On cancellation the states found so far stay available through `get_x` and `get_E`.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the flag was raised before the search finished.
    pub fn search_with_cancel(&mut self, cancel: &AtomicBool) -> Result<()> {
        self.search_until(|| cancel.load(Ordering::Relaxed))
    }

    /// Same as [`BruteForceSearcher::search`], asking `stop` before every batch.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if `stop` returned `true` before the search finished.
    pub fn search_until<S: FnMut() -> bool>(&mut self, mut stop: S) -> Result<()> {
        self.prepare()?;
        loop {
            if stop() {
                let searched = self.range.map_or(0, |r| r.next_x0);
                warn!(searched, "search cancelled");
                return Err(SolverError::Cancelled);
            }
            if self.search_range()? {
                break;
            }
        }
        self.make_solution()?;
        self.log_result();
        Ok(())
    }

    fn log_result(&self) {
        if let Some(results) = &self.results {
            let sign = self.preferences.optimize.sign::<F>();
            info!(
                emin = (sign * results.emin()).as_f64(),
                n_solutions = results.candidates().len(),
                "search finished"
            );
        }
    }

    /// Energies of the retained states in the caller's direction.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    #[allow(non_snake_case)]
    pub fn get_E(&mut self) -> Result<Array1<F>> {
        if !self.solution_available {
            self.make_solution()?;
        }
        Ok(self.solutions.energies())
    }

    /// Retained states, lowest encoded index first.
    ///
    /// # Errors
    ///
    /// Returns `NotPrepared` before `prepare`.
    pub fn get_x(&mut self) -> Result<Vec<(Array1<i8>, Array1<i8>)>> {
        if !self.solution_available {
            self.make_solution()?;
        }
        Ok(self.solutions.states())
    }

    /// Running optimum of the current search.
    pub const fn result_set(&self) -> Option<&ResultSet<F>> {
        self.results.as_ref()
    }

    fn reset(&mut self) {
        self.range = None;
        self.results = None;
        self.solutions.clear();
        self.solution_available = false;
    }
}

impl<F: Real> BipartiteSolver<F> for BruteForceSearcher<F> {
    fn set_problem(&mut self, problem: Arc<BipartiteQubo<F>>) {
        info!(
            num_x0 = problem.num_x0(),
            num_x1 = problem.num_x1(),
            optimize = %problem.optimize,
            "searcher problem set"
        );
        self.preferences.optimize = problem.optimize;
        self.problem = Some(problem);
        self.reset();
    }

    fn problem(&self) -> Option<&Arc<BipartiteQubo<F>>> {
        self.problem.as_ref()
    }

    fn solve(&mut self) -> Result<()> {
        self.search()
    }

    fn solutions(&self) -> &SolutionStore<F> {
        &self.solutions
    }
}

/// Shrinks a tile to the size of the pattern space.
fn clamp_tile(requested: usize, space: u64, name: &str) -> u64 {
    let requested = requested as u64;
    if requested > space {
        debug!(requested, adjusted = space, "{name} larger than the pattern space");
        space
    } else {
        requested
    }
}

/// Searches x0 codes in `[begin, end)` against every x1 code.
fn search_tile<F: Real>(
    problem: &BipartiteQubo<F>,
    begin: u64,
    end: u64,
    x1_max: u64,
    tile_1: u64,
    capacity: usize,
) -> ResultSet<F> {
    let (n0, n1) = problem.size();
    let sign = problem.optimize.sign::<F>();
    let x0s = bit_patterns::<F>(begin, end, n0);
    let mut local = ResultSet::new(capacity);

    let mut begin_1 = 0;
    while begin_1 < x1_max {
        let end_1 = (begin_1 + tile_1).min(x1_max);
        let x1s = bit_patterns::<F>(begin_1, end_1, n1);
        let grid = qubo_energy_grid(problem, x0s.view(), x1s.view());

        for ((a, b), &e) in grid.indexed_iter() {
            local.offer(begin + a as u64, begin_1 + b as u64, sign * e);
        }
        begin_1 = end_1;
    }
    local
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubo::Optimize;
    use crate::tests::make_solver_problem;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn exhaustive_min(problem: &BipartiteQubo<f64>) -> f64 {
        let (n0, n1) = problem.size();
        let grid = qubo_energy_grid(problem, bit_patterns::<f64>(0, 1 << n0, n0).view(), bit_patterns::<f64>(0, 1 << n1, n1).view());
        grid.iter().fold(f64::INFINITY, |m, &e| m.min(e))
    }

    #[test]
    fn test_search_finds_minimum() {
        let problem = make_solver_problem(5, 4);
        let mut searcher = BruteForceSearcher::<f64>::new();
        searcher.set_problem(problem.clone());
        searcher.set_preference("tile_size_0", "3").unwrap();
        searcher.set_preference("tile_size_1", "5").unwrap();
        searcher.search().unwrap();

        let energies = searcher.get_E().unwrap();
        assert_eq!(energies.len(), 1);
        assert_relative_eq!(energies[0], exhaustive_min(&problem), epsilon = 1e-12);

        let (x0, x1) = searcher.get_x().unwrap().remove(0);
        assert_relative_eq!(problem.eval(x0.view(), x1.view()).unwrap(), energies[0], epsilon = 1e-12);
    }

    #[test]
    fn test_tile_sizes_do_not_matter() {
        let problem = make_solver_problem(6, 5);
        let mut reference = None;
        for (t0, t1) in [(1, 1), (4, 7), (64, 32), (1024, 1024)] {
            let mut searcher = BruteForceSearcher::<f64>::new();
            searcher.set_problem(problem.clone());
            searcher.set_preference("tile_size_0", &t0.to_string()).unwrap();
            searcher.set_preference("tile_size_1", &t1.to_string()).unwrap();
            searcher.search().unwrap();
            let xs = searcher.get_x().unwrap();
            match &reference {
                None => reference = Some(xs),
                Some(r) => assert_eq!(r, &xs),
            }
        }
    }

    #[test]
    fn test_ties_keep_lowest_index() {
        // every state of a zero problem is optimal
        let mut searcher = BruteForceSearcher::<f64>::new();
        searcher
            .set_qubo(
                array![0.0, 0.0].view(),
                array![0.0].view(),
                array![[0.0, 0.0]].view(),
                Optimize::Minimize,
            )
            .unwrap();
        searcher.set_preference("max_solutions", "3").unwrap();
        searcher.search().unwrap();

        let xs = searcher.get_x().unwrap();
        assert_eq!(xs.len(), 3);
        assert_eq!(xs[0], (array![0i8, 0], array![0i8]));
        assert_eq!(xs[1], (array![0i8, 0], array![1i8]));
        assert_eq!(xs[2], (array![1i8, 0], array![0i8]));
    }

    #[test]
    fn test_maximize() {
        let problem = make_solver_problem(4, 4);
        let mut searcher = BruteForceSearcher::<f64>::new();
        searcher.set_problem(Arc::new(problem.with_optimize(Optimize::Maximize)));
        searcher.search().unwrap();

        let (n0, n1) = problem.size();
        let grid = qubo_energy_grid(&problem, bit_patterns::<f64>(0, 1 << n0, n0).view(), bit_patterns::<f64>(0, 1 << n1, n1).view());
        let emax = grid.iter().fold(f64::NEG_INFINITY, |m, &e| m.max(e));
        assert_relative_eq!(searcher.get_E().unwrap()[0], emax, epsilon = 1e-12);
        assert_relative_eq!(searcher.best().unwrap().energy, emax, epsilon = 1e-12);
    }

    #[test]
    fn test_size_limits() {
        let mut searcher = BruteForceSearcher::<f64>::new();
        assert_eq!(searcher.prepare(), Err(SolverError::ProblemNotSet));
        assert_eq!(searcher.search_range(), Err(SolverError::NotPrepared));

        searcher.set_problem(make_solver_problem(30, 20));
        assert_eq!(
            searcher.prepare(),
            Err(SolverError::ProblemTooLarge { bits: 50, limit: 40 })
        );

        searcher.set_preference("max_bits", "12").unwrap();
        searcher.set_problem(make_solver_problem(7, 6));
        assert!(matches!(searcher.prepare(), Err(SolverError::ProblemTooLarge { .. })));
    }

    #[test]
    fn test_cancel() {
        let mut searcher = BruteForceSearcher::<f64>::new();
        searcher.set_problem(make_solver_problem(8, 4));
        searcher.set_preference("tile_size_0", "1").unwrap();

        let cancel = AtomicBool::new(true);
        assert_eq!(searcher.search_with_cancel(&cancel), Err(SolverError::Cancelled));
        assert!(searcher.get_x().unwrap().is_empty());

        let cancel = AtomicBool::new(false);
        searcher.search_with_cancel(&cancel).unwrap();
        assert_eq!(searcher.get_x().unwrap().len(), 1);
    }

    #[test]
    fn test_cancel_keeps_partial_optimum() {
        let problem = make_solver_problem(6, 3);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();

        pool.install(|| {
            let mut searcher = BruteForceSearcher::<f64>::new();
            searcher.set_problem(problem.clone());
            searcher.set_preference("tile_size_0", "4").unwrap();

            // one batch of one tile, x0 codes 0..4
            let mut batches = 0;
            let result = searcher.search_until(|| {
                batches += 1;
                batches > 1
            });
            assert_eq!(result, Err(SolverError::Cancelled));

            let partial = qubo_energy_grid(&problem, bit_patterns::<f64>(0, 4, 6).view(), bit_patterns::<f64>(0, 8, 3).view());
            let partial_min = partial.iter().fold(f64::INFINITY, |m, &e| m.min(e));

            let (x0, x1) = searcher.get_x().unwrap().remove(0);
            assert!(x0.iter().skip(2).all(|&b| b == 0));
            assert_relative_eq!(problem.eval(x0.view(), x1.view()).unwrap(), partial_min, epsilon = 1e-12);
            assert_relative_eq!(searcher.get_E().unwrap()[0], partial_min, epsilon = 1e-12);
            assert!(searcher.get_E().unwrap()[0] >= exhaustive_min(&problem));
        });
    }

    #[test]
    fn test_near_ties_do_not_depend_on_tiles() {
        // energies of x0 = 00, 10, 01, 11 step down by less than the tie tolerance
        let t = ResultSet::<f64>::tolerance(0.0);
        let b0 = array![-0.6 * t, -0.6 * t];
        let mut reference = None;
        for tile in ["1", "2", "4"] {
            let mut searcher = BruteForceSearcher::<f64>::new();
            searcher
                .set_qubo(b0.view(), array![0.0].view(), array![[0.0, 0.0]].view(), Optimize::Minimize)
                .unwrap();
            searcher.set_preference("max_solutions", "1").unwrap();
            searcher.set_preference("tile_size_0", tile).unwrap();
            searcher.set_preference("tile_size_1", "1").unwrap();
            searcher.search().unwrap();

            let xs = searcher.get_x().unwrap();
            assert_eq!(xs, vec![(array![1i8, 0], array![0i8])]);
            match &reference {
                None => reference = Some(xs),
                Some(r) => assert_eq!(r, &xs),
            }
        }
    }

    #[test]
    fn test_stepwise_search() {
        let problem = make_solver_problem(6, 3);
        let mut searcher = BruteForceSearcher::<f64>::new();
        searcher.set_problem(problem.clone());
        searcher.set_preference("tile_size_0", "2").unwrap();
        searcher.prepare().unwrap();

        let mut batches = 0;
        while !searcher.search_range().unwrap() {
            batches += 1;
            assert!(batches <= 32);
        }
        assert!(searcher.search_range().unwrap());
        assert_relative_eq!(searcher.get_E().unwrap()[0], exhaustive_min(&problem), epsilon = 1e-12);
    }
}
