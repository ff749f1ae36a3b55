//! Simulated quantum annealing and exhaustive search for bipartite QUBO problems.
//!
//! A problem couples two binary vectors through a dense matrix, E = b0.x0 + b1.x1 + x1^T W x0, and is
//! shared between solvers as an `Arc<BipartiteQubo>`. Two solvers are provided:
//! - [`Annealer`]: path integral Monte Carlo over R coupled replicas, driven step by step or by [`anneal`]
//! - [`BruteForceSearcher`]: tiled enumeration of every state, for small problems and reference results

pub mod annealer;
pub mod brute_force;
pub mod energy;
pub mod error;
pub mod numeric_trait;
pub mod qubo;
pub mod schedule;
pub mod solution;
pub mod solver;
pub mod solver_options;
pub mod trotter;
pub mod utils;

pub use annealer::{Annealer, AnnealerState};
pub use brute_force::BruteForceSearcher;
pub use error::{Result, SolverError};
pub use numeric_trait::Real;
pub use qubo::{BipartiteQubo, Hamiltonian, Optimize};
pub use schedule::{anneal, AnnealSchedule};
pub use solution::{Solution, SolutionStore};
pub use solver::BipartiteSolver;
pub use solver_options::{AnnealAlgorithm, AnnealerPreferences, SearcherPreferences, MAX_ENCODABLE_BITS};
