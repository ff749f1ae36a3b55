//! The bipartite QUBO problem and its Ising form.
//!
//! A problem is two binary vectors x0 (N0) and x1 (N1) coupled through a dense N1 x N0 matrix W,
//!
//! $$E(x_0, x_1) = b_0 \cdot x_0 + b_1 \cdot x_1 + x_1^T W x_0$$
//!
//! Substituting x = (1 + q) / 2 gives the equivalent Ising Hamiltonian
//!
//! $$H(q_0, q_1) = h_0 \cdot q_0 + h_1 \cdot q_1 + q_1^T J q_0 + c$$
//!
//! which the annealer works on. Problems are immutable once built and are shared between solvers
//! through an `Arc`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use smolprng::{Algorithm, PRNG};

use crate::energy;
use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;

/// Direction of the optimization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimize {
    #[default]
    Minimize,
    Maximize,
}

impl Optimize {
    /// Factor that turns an objective value into the value the engine minimizes.
    pub fn sign<F: Real>(self) -> F {
        match self {
            Self::Minimize => F::one(),
            Self::Maximize => -F::one(),
        }
    }
}

impl FromStr for Optimize {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minimize" => Ok(Self::Minimize),
            "maximize" => Ok(Self::Maximize),
            _ => Err(SolverError::InvalidOption(format!(
                "optimize must be 'minimize' or 'maximize', got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for Optimize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimize => write!(f, "minimize"),
            Self::Maximize => write!(f, "maximize"),
        }
    }
}

/// Ising form of a problem, always in the minimized direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Hamiltonian<F: Real> {
    pub h0: Array1<F>,
    pub h1: Array1<F>,
    pub j: Array2<F>,
    pub c: F,
}

#[derive(Debug)]
pub struct BipartiteQubo<F: Real> {
    pub b0: Array1<F>,
    pub b1: Array1<F>,
    pub w: Array2<F>,
    pub optimize: Optimize,
    hamiltonian: OnceLock<Hamiltonian<F>>,
}

impl<F: Real> BipartiteQubo<F> {
    /// Builds a problem from caller arrays of any precision, copying them into the working precision.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` unless `W` has shape `(len(b1), len(b0))`.
    pub fn new<T: Real>(
        b0: ArrayView1<T>,
        b1: ArrayView1<T>,
        w: ArrayView2<T>,
        optimize: Optimize,
    ) -> Result<Self> {
        let (n0, n1) = (b0.len(), b1.len());
        if w.dim() != (n1, n0) {
            return Err(SolverError::shape(
                "W",
                format!("({n1}, {n0})"),
                format!("{:?}", w.dim()),
            ));
        }

        Ok(Self {
            b0: b0.mapv(|v| F::lit(v.as_f64())),
            b1: b1.mapv(|v| F::lit(v.as_f64())),
            w: w.mapv(|v| F::lit(v.as_f64())),
            optimize,
            hamiltonian: OnceLock::new(),
        })
    }

    /// Builds a problem from flat vectors, `w` being row-major with N1 rows and N0 columns.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `w.len() != b0.len() * b1.len()`.
    pub fn from_vec(b0: Vec<F>, b1: Vec<F>, w: Vec<F>, optimize: Optimize) -> Result<Self> {
        let (n0, n1) = (b0.len(), b1.len());
        let found = w.len();
        let w = Array2::from_shape_vec((n1, n0), w)
            .map_err(|_| SolverError::shape("W", n0 * n1, found))?;

        Ok(Self {
            b0: Array1::from(b0),
            b1: Array1::from(b1),
            w,
            optimize,
            hamiltonian: OnceLock::new(),
        })
    }

    /// Generates a random dense problem with every coefficient uniform in [-0.5, 0.5).
    pub fn make_random<T: Algorithm>(num_x0: usize, num_x1: usize, prng: &mut PRNG<T>) -> Self {
        let b0 = Array1::from_shape_fn(num_x0, |_| F::lit(prng.gen_f64() - 0.5f64));
        let b1 = Array1::from_shape_fn(num_x1, |_| F::lit(prng.gen_f64() - 0.5f64));
        let w = Array2::from_shape_fn((num_x1, num_x0), |_| F::lit(prng.gen_f64() - 0.5f64));

        Self {
            b0,
            b1,
            w,
            optimize: Optimize::Minimize,
            hamiltonian: OnceLock::new(),
        }
    }

    /// Same coefficients, different direction. The Ising form is recomputed on demand.
    pub fn with_optimize(&self, optimize: Optimize) -> Self {
        Self {
            b0: self.b0.clone(),
            b1: self.b1.clone(),
            w: self.w.clone(),
            optimize,
            hamiltonian: OnceLock::new(),
        }
    }

    pub fn num_x0(&self) -> usize {
        self.b0.len()
    }

    pub fn num_x1(&self) -> usize {
        self.b1.len()
    }

    /// Returns (N0, N1).
    pub fn size(&self) -> (usize, usize) {
        (self.num_x0(), self.num_x1())
    }

    /// Objective value of a binary state, in the caller's direction.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the state lengths do not match the problem.
    pub fn eval(&self, x0: ArrayView1<i8>, x1: ArrayView1<i8>) -> Result<F> {
        self.check_state_len(x0.len(), x1.len())?;
        let x0 = x0.mapv(F::from_bit);
        let x1 = x1.mapv(F::from_bit);
        Ok(energy::qubo_energy(self, x0.view(), x1.view()))
    }

    /// Lazily computed Ising form of the minimized objective.
    pub fn hamiltonian(&self) -> &Hamiltonian<F> {
        self.hamiltonian.get_or_init(|| self.compute_hamiltonian())
    }

    fn compute_hamiltonian(&self) -> Hamiltonian<F> {
        // work on the minimized form, for maximization this negates every coefficient
        let sign = self.optimize.sign::<F>();
        let half = F::lit(0.5);
        let quarter = F::lit(0.25);

        let b0 = &self.b0 * sign;
        let b1 = &self.b1 * sign;
        let w = &self.w * sign;

        // column sums run over x1 (rows of W), row sums over x0
        let h0 = &b0 * half + &(w.sum_axis(Axis(0)) * quarter);
        let h1 = &b1 * half + &(w.sum_axis(Axis(1)) * quarter);
        let c = b0.sum() * half + b1.sum() * half + w.sum() * quarter;
        let j = w * quarter;

        Hamiltonian { h0, h1, j, c }
    }

    pub(crate) fn check_state_len(&self, n0: usize, n1: usize) -> Result<()> {
        if n0 != self.num_x0() {
            return Err(SolverError::shape("x0", self.num_x0(), n0));
        }
        if n1 != self.num_x1() {
            return Err(SolverError::shape("x1", self.num_x1(), n1));
        }
        Ok(())
    }
}

impl<F: Real> Clone for BipartiteQubo<F> {
    fn clone(&self) -> Self {
        self.with_optimize(self.optimize)
    }
}
