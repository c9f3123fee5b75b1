use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::grid::GridBounds;

/// Default distance weight (alpha) in the assignment score.
pub const DEFAULT_DISTANCE_WEIGHT: f64 = 1.0;
/// Default load weight (beta) in the assignment score.
pub const DEFAULT_LOAD_WEIGHT: f64 = 0.1;
/// Default probability that a driver turns down an offered assignment.
pub const DEFAULT_REJECTION_RATE: f64 = 0.1;
/// Default grid units travelled per tick.
pub const DEFAULT_MOVE_SPEED: f64 = 1.0;

/// Configuration injected into the simulation core.
///
/// The core never reads the environment; callers build this value (from
/// flags, environment, or a file) and hand it to [`crate::Simulation::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Weight applied to the pickup distance (alpha).
    pub distance_weight: f64,
    /// Weight applied to the driver's current load (beta).
    pub load_weight: f64,
    /// Probability in `[0, 1]` that an assignment attempt is rejected.
    pub rejection_rate: f64,
    /// Grid units a driver covers per tick; fractions accumulate across ticks.
    pub move_speed: f64,
    /// Selects the locked store. Turning it off is only sound single-threaded.
    pub concurrency_guard: bool,
    /// Accepted coordinate domain.
    pub grid: GridBounds,
    /// Seed for the rejection RNG; `None` seeds from entropy.
    pub rejection_seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
            load_weight: DEFAULT_LOAD_WEIGHT,
            rejection_rate: DEFAULT_REJECTION_RATE,
            move_speed: DEFAULT_MOVE_SPEED,
            concurrency_guard: true,
            grid: GridBounds::default(),
            rejection_seed: None,
        }
    }
}

impl DispatchConfig {
    pub fn with_weights(mut self, distance_weight: f64, load_weight: f64) -> Self {
        self.distance_weight = distance_weight;
        self.load_weight = load_weight;
        self
    }

    pub fn with_rejection_rate(mut self, rate: f64) -> Self {
        self.rejection_rate = rate;
        self
    }

    pub fn with_move_speed(mut self, speed: f64) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn with_concurrency_guard(mut self, enabled: bool) -> Self {
        self.concurrency_guard = enabled;
        self
    }

    pub fn with_grid(mut self, grid: GridBounds) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_rejection_seed(mut self, seed: u64) -> Self {
        self.rejection_seed = Some(seed);
        self
    }

    /// Checks every field against its accepted domain.
    pub fn validate(&self) -> Result<()> {
        check_weight("distance_weight", self.distance_weight)?;
        check_weight("load_weight", self.load_weight)?;

        if !(0.0..=1.0).contains(&self.rejection_rate) {
            return Err(DispatchError::invalid_input(format!(
                "rejection_rate must be within [0, 1], got {}",
                self.rejection_rate
            )));
        }

        if !self.move_speed.is_finite() || self.move_speed <= 0.0 {
            return Err(DispatchError::invalid_input(format!(
                "move_speed must be a finite value > 0, got {}",
                self.move_speed
            )));
        }

        if self.grid.width < 0 || self.grid.height < 0 {
            return Err(DispatchError::invalid_input(format!(
                "grid bounds must be non-negative, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }

        Ok(())
    }
}

fn check_weight(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DispatchError::invalid_input(format!(
            "{name} must be a finite value >= 0, got {value}"
        )))
    }
}
