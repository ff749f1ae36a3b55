//! Working precision of the engine.
//!
//! Every problem, kernel and solver is generic over a [`Real`], so the floating point type is
//! picked once when a solver is instantiated (`Annealer::<f32>::new()`) and threaded through from
//! there, independent of whatever precision the caller's arrays happen to be in.

use ndarray::NdFloat;
use num_traits::FromPrimitive;

pub trait Real: NdFloat + FromPrimitive + Default {
    /// Name of the precision, "float" or "double".
    const PRECISION: &'static str;

    /// Converts a literal or caller supplied `f64` into the working precision.
    fn lit(value: f64) -> Self;

    fn as_f64(self) -> f64;

    /// Converts a bit or spin value into the working precision.
    fn from_bit(value: i8) -> Self;
}

impl Real for f64 {
    const PRECISION: &'static str = "double";

    fn lit(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn from_bit(value: i8) -> Self {
        Self::from(value)
    }
}

impl Real for f32 {
    const PRECISION: &'static str = "float";

    fn lit(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_bit(value: i8) -> Self {
        Self::from(value)
    }
}
