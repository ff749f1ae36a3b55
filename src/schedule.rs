//! Geometric annealing schedule and the driver that runs it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annealer::Annealer;
use crate::error::{Result, SolverError};
use crate::numeric_trait::Real;
use crate::solver::BipartiteSolver;

/// Transverse field decays as `G <- tau * G` from `g_init` until it drops below `g_final`, one sweep per value,
/// at a fixed inverse temperature `beta`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnnealSchedule {
    pub g_init: f64,
    pub g_final: f64,
    pub beta: f64,
    pub tau: f64,
}

impl Default for AnnealSchedule {
    fn default() -> Self {
        Self {
            g_init: 5.0,
            g_final: 0.01,
            beta: 50.0,
            tau: 0.99,
        }
    }
}

impl AnnealSchedule {
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless `0 < g_final <= g_init`, `beta > 0` and `0 < tau < 1`, all finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.g_final.is_finite() && self.g_init.is_finite()) || self.g_final <= 0.0 || self.g_init < self.g_final {
            return Err(SolverError::InvalidParameter(format!(
                "schedule needs 0 < g_final <= g_init, got g_init = {}, g_final = {}",
                self.g_init, self.g_final
            )));
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "beta must be finite and positive, got {}",
                self.beta
            )));
        }
        if !(self.tau > 0.0 && self.tau < 1.0) {
            return Err(SolverError::InvalidParameter(format!(
                "tau must lie in (0, 1), got {}",
                self.tau
            )));
        }
        Ok(())
    }

    /// Transverse field of every sweep, in order.
    pub fn fields(&self) -> impl Iterator<Item = f64> {
        let (tau, g_final) = (self.tau, self.g_final);
        std::iter::successors(Some(self.g_init), move |g| Some(g * tau)).take_while(move |&g| g >= g_final)
    }

    pub fn n_steps(&self) -> usize {
        self.fields().count()
    }
}

/// Runs a whole annealing pass: `prepare`, one `anneal_one_step` per schedule value, `make_solution`.
///
/// The replicas start from the `set_x` state if one was supplied, from random spins otherwise.
///
/// # Errors
///
/// Returns `InvalidParameter` for a bad schedule and propagates the annealer's errors.
pub fn anneal<F: Real>(annealer: &mut Annealer<F>, schedule: &AnnealSchedule) -> Result<()> {
    schedule.validate()?;
    annealer.prepare()?;

    let beta = F::lit(schedule.beta);
    let mut steps = 0usize;
    for g in schedule.fields() {
        annealer.anneal_one_step(F::lit(g), beta)?;
        steps += 1;
    }
    annealer.make_solution()?;

    let best = annealer.best().map(|s| s.energy.as_f64());
    info!(steps, best = ?best, "annealing finished");
    Ok(())
}
