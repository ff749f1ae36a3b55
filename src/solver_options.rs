//! Run time options for the annealer and the brute-force searcher.
//!
//! Options are plain typed structs. They can also be filled from string pairs with `set_preference` or
//! from a JSON object with `from_json`; in both cases an unknown key is an `InvalidOption` error rather than
//! being silently ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::qubo::Optimize;

/// Hard limit on N0 + N1 for the brute-force searcher, states are encoded in a `u64`.
pub const MAX_ENCODABLE_BITS: usize = 63;

/// Monte Carlo update scheme of the annealer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnealAlgorithm {
    /// Sequential single spin flips at random (replica, bit) sites from one random stream.
    Naive,
    /// Checkerboard sweep, parallel over replicas with one random stream per replica.
    #[default]
    Coloring,
}

impl FromStr for AnnealAlgorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(Self::Naive),
            "coloring" | "default" => Ok(Self::Coloring),
            _ => Err(SolverError::InvalidOption(format!(
                "algorithm must be 'naive' or 'coloring', got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for AnnealAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => write!(f, "naive"),
            Self::Coloring => write!(f, "coloring"),
        }
    }
}

/// Options for the annealer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnnealerPreferences {
    /// Number of trotter replicas, `None` picks `max(1, (N0 + N1) / 4)` for the current problem.
    pub n_trotters: Option<usize>,
    /// Seed of the random streams, `None` seeds from the clock at `prepare()`.
    pub seed: Option<u64>,
    pub optimize: Optimize,
    pub algorithm: AnnealAlgorithm,
}

impl AnnealerPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object such as `{"n_trotters": 8, "seed": 1}`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for unknown keys, malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let prefs: Self =
            serde_json::from_str(json).map_err(|e| SolverError::InvalidOption(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Sets a single option from its name and textual value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for an unknown key or a value that does not parse.
    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "n_trotters" => {
                let n = parse_value::<usize>(key, value)?;
                if n == 0 {
                    return Err(SolverError::InvalidOption(
                        "n_trotters must be a positive integer".to_string(),
                    ));
                }
                self.n_trotters = Some(n);
            }
            "seed" => self.seed = Some(parse_value::<u64>(key, value)?),
            "optimize" => self.optimize = value.parse()?,
            "algorithm" => self.algorithm = value.parse()?,
            _ => return Err(unknown_option(key)),
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` if `n_trotters` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.n_trotters == Some(0) {
            return Err(SolverError::InvalidOption(
                "n_trotters must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Replica count for a problem of the given size.
    pub fn trotters_for(&self, num_x0: usize, num_x1: usize) -> usize {
        self.n_trotters
            .unwrap_or_else(|| ((num_x0 + num_x1) / 4).max(1))
    }
}

/// Options for the brute-force searcher
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearcherPreferences {
    /// Number of x0 patterns evaluated per energy block.
    pub tile_size_0: usize,
    /// Number of x1 patterns evaluated per energy block.
    pub tile_size_1: usize,
    /// Capacity K of the retained optimal set.
    pub max_solutions: usize,
    /// Ceiling on N0 + N1, at most [`MAX_ENCODABLE_BITS`].
    pub max_bits: usize,
    pub optimize: Optimize,
}

impl Default for SearcherPreferences {
    fn default() -> Self {
        Self {
            tile_size_0: 1024,
            tile_size_1: 1024,
            max_solutions: 1,
            max_bits: 40,
            optimize: Optimize::Minimize,
        }
    }
}

impl SearcherPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` for unknown keys, malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let prefs: Self =
            serde_json::from_str(json).map_err(|e| SolverError::InvalidOption(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` for an unknown key or a value that does not parse or validate.
    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "tile_size_0" => updated.tile_size_0 = parse_value(key, value)?,
            "tile_size_1" => updated.tile_size_1 = parse_value(key, value)?,
            "max_solutions" => updated.max_solutions = parse_value(key, value)?,
            "max_bits" => updated.max_bits = parse_value(key, value)?,
            "optimize" => updated.optimize = value.parse()?,
            _ => return Err(unknown_option(key)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidOption` if a size is zero or `max_bits` exceeds [`MAX_ENCODABLE_BITS`].
    pub fn validate(&self) -> Result<()> {
        if self.tile_size_0 == 0 || self.tile_size_1 == 0 {
            return Err(SolverError::InvalidOption(
                "tile sizes must be positive integers".to_string(),
            ));
        }
        if self.max_solutions == 0 {
            return Err(SolverError::InvalidOption(
                "max_solutions must be a positive integer".to_string(),
            ));
        }
        if self.max_bits > MAX_ENCODABLE_BITS {
            return Err(SolverError::InvalidOption(format!(
                "max_bits must not exceed {MAX_ENCODABLE_BITS}, got {}",
                self.max_bits
            )));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SolverError::InvalidOption(format!("cannot parse '{value}' for {key}")))
}

fn unknown_option(key: &str) -> SolverError {
    SolverError::InvalidOption(format!("unknown option '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annealer_preferences_from_pairs() {
        let mut prefs = AnnealerPreferences::new();
        prefs.set_preference("n_trotters", "8").unwrap();
        prefs.set_preference("seed", "42").unwrap();
        prefs.set_preference("optimize", "maximize").unwrap();
        prefs.set_preference("algorithm", "naive").unwrap();

        assert_eq!(prefs.n_trotters, Some(8));
        assert_eq!(prefs.seed, Some(42));
        assert_eq!(prefs.optimize, Optimize::Maximize);
        assert_eq!(prefs.algorithm, AnnealAlgorithm::Naive);
    }

    #[test]
    fn test_annealer_preferences_rejects_bad_input() {
        let mut prefs = AnnealerPreferences::new();
        assert!(matches!(
            prefs.set_preference("n_trotter", "8"),
            Err(SolverError::InvalidOption(_))
        ));
        assert!(prefs.set_preference("n_trotters", "0").is_err());
        assert!(prefs.set_preference("n_trotters", "-3").is_err());
        assert!(prefs.set_preference("algorithm", "sa").is_err());
        assert_eq!(prefs, AnnealerPreferences::default());
    }

    #[test]
    fn test_annealer_preferences_json() {
        let prefs =
            AnnealerPreferences::from_json(r#"{"n_trotters": 4, "optimize": "maximize"}"#).unwrap();
        assert_eq!(prefs.n_trotters, Some(4));
        assert_eq!(prefs.optimize, Optimize::Maximize);
        assert_eq!(prefs.algorithm, AnnealAlgorithm::Coloring);

        let err = AnnealerPreferences::from_json(r#"{"n_trotters": 4, "tile": 1}"#).unwrap_err();
        assert!(matches!(err, SolverError::InvalidOption(_)));
        assert!(AnnealerPreferences::from_json(r#"{"n_trotters": 0}"#).is_err());
    }

    #[test]
    fn test_default_trotters() {
        let prefs = AnnealerPreferences::new();
        assert_eq!(prefs.trotters_for(2, 1), 1);
        assert_eq!(prefs.trotters_for(200, 350), 137);

        let prefs = AnnealerPreferences {
            n_trotters: Some(3),
            ..AnnealerPreferences::default()
        };
        assert_eq!(prefs.trotters_for(200, 350), 3);
    }

    #[test]
    fn test_searcher_preferences() {
        let mut prefs = SearcherPreferences::new();
        prefs.set_preference("tile_size_0", "16").unwrap();
        prefs.set_preference("max_solutions", "4").unwrap();
        assert_eq!(prefs.tile_size_0, 16);
        assert_eq!(prefs.max_solutions, 4);

        assert!(prefs.set_preference("tile_size_1", "0").is_err());
        assert!(prefs.set_preference("max_bits", "64").is_err());
        assert!(prefs.set_preference("n_trotters", "2").is_err());
        assert_eq!(prefs.tile_size_1, 1024);
        assert_eq!(prefs.max_bits, 40);

        let prefs = SearcherPreferences::from_json(r#"{"max_bits": 20}"#).unwrap();
        assert_eq!(prefs.max_bits, 20);
        assert_eq!(prefs.tile_size_0, 1024);
    }
}
