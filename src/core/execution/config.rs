//! Session configuration
//!
//! Options are fixed when the session is created. All bounding is by step
//! count, never wall-clock time, so runs are reproducible.

use serde::{Deserialize, Serialize};

/// Default ceiling on dequeues per propagation run
pub const DEFAULT_MAX_PROPAGATION_STEPS: usize = 5000;
pub const DEFAULT_GRID_ROWS: usize = 64;
pub const DEFAULT_GRID_COLS: usize = 64;

/// Named options supplied at session creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Propagation aborts as an unstable loop when its dequeue count
    /// reaches this value
    pub max_propagation_steps: usize,
    pub grid_rows: usize,
    pub grid_cols: usize,
}

impl SessionConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            max_propagation_steps: DEFAULT_MAX_PROPAGATION_STEPS,
            grid_rows: DEFAULT_GRID_ROWS,
            grid_cols: DEFAULT_GRID_COLS,
        }
    }

    /// Set the propagation step ceiling
    ///
    /// Keep it small relative to the circuit when responsiveness matters;
    /// there is no other way to cut a long run short.
    pub fn with_max_propagation_steps(mut self, steps: usize) -> Self {
        self.max_propagation_steps = steps;
        self
    }

    /// Set the grid bounds
    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid_rows = rows;
        self.grid_cols = cols;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
