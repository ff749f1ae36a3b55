//! Behaviour shared by the annealer and the brute-force searcher.

use std::sync::Arc;

use ndarray::{ArrayView1, ArrayView2};

use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;
use crate::qubo::{BipartiteQubo, Optimize};
use crate::solution::{Solution, SolutionStore};

/// A solver of bipartite QUBO problems holding a shared, immutable problem.
pub trait BipartiteSolver<F: Real> {
    /// Installs a problem, discarding any state derived from the previous one.
    fn set_problem(&mut self, problem: Arc<BipartiteQubo<F>>);

    fn problem(&self) -> Option<&Arc<BipartiteQubo<F>>>;

    /// Runs the solver end to end with its default settings.
    ///
    /// # Errors
    ///
    /// Propagates the solver's errors.
    fn solve(&mut self) -> Result<()>;

    /// Solutions published by the last `make_solution`.
    fn solutions(&self) -> &SolutionStore<F>;

    /// Builds a problem from caller arrays of any precision and installs it.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` unless `W` is (N1, N0). The previous problem is kept in that case.
    fn set_qubo<T: Real>(
        &mut self,
        b0: ArrayView1<T>,
        b1: ArrayView1<T>,
        w: ArrayView2<T>,
        optimize: Optimize,
    ) -> Result<()>
    where
        Self: Sized,
    {
        let problem = BipartiteQubo::new(b0, b1, w, optimize)?;
        self.set_problem(Arc::new(problem));
        Ok(())
    }

    /// Returns (N0, N1).
    ///
    /// # Errors
    ///
    /// Returns `ProblemNotSet` without a problem.
    fn get_problem_size(&self) -> Result<(usize, usize)> {
        self.problem()
            .map(|p| p.size())
            .ok_or(SolverError::ProblemNotSet)
    }

    /// Best published solution in the problem's direction.
    fn best(&self) -> Option<&Solution<F>> {
        let optimize = self.problem()?.optimize;
        self.solutions().best(optimize)
    }
}
