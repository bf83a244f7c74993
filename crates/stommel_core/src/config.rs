//! Explicit settings for every procedure.
//!
//! Nothing in the crate reads process-wide state: grid resolution, parameter
//! values and step sizes all travel in these structs, so independent analyses
//! can run side by side with different settings.

use crate::error::{Result, StommelError};
use crate::model::{ParameterSet, State};
use serde::{Deserialize, Serialize};

/// Uniform sampling of an interval, endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleGrid {
    pub start: f64,
    pub end: f64,
    pub samples: usize,
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self::unit(1_000_000)
    }
}

impl SampleGrid {
    /// `samples` points spanning `[0, 1]`.
    pub fn unit(samples: usize) -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            samples,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(StommelError::invalid("sample grid bounds must be finite"));
        }
        if self.end <= self.start {
            return Err(StommelError::invalid(format!(
                "sample grid must increase (start = {}, end = {})",
                self.start, self.end
            )));
        }
        if self.samples < 2 {
            return Err(StommelError::invalid(
                "sample grid needs at least 2 samples",
            ));
        }
        Ok(())
    }

    pub fn spacing(&self) -> f64 {
        (self.end - self.start) / (self.samples.saturating_sub(1).max(1)) as f64
    }

    pub fn values(&self) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(linspace(self.start, self.end, self.samples))
    }
}

/// How a bracketed root is turned into a single `y` value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RootRefinement {
    /// Use the left sample of the bracket; accuracy is the sample spacing.
    LeftSample,
    /// Bisect the bracket on the branch polynomial.
    Bisection { max_iterations: usize, tolerance: f64 },
}

impl Default for RootRefinement {
    fn default() -> Self {
        RootRefinement::LeftSample
    }
}

impl RootRefinement {
    pub fn bisection() -> Self {
        RootRefinement::Bisection {
            max_iterations: 60,
            tolerance: 1e-14,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorSettings {
    pub refinement: RootRefinement,
}

/// Central-difference offsets for the Jacobian. Each partial derivative
/// perturbs one coordinate by half of its step on either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiniteDifference {
    pub dx: f64,
    pub dy: f64,
}

impl FiniteDifference {
    pub fn from_spacing(spacing: f64) -> Self {
        Self {
            dx: spacing,
            dy: spacing,
        }
    }

    /// Steps matching the resolution of the grid used to locate the roots.
    pub fn from_grid(grid: &SampleGrid) -> Self {
        Self::from_spacing(grid.spacing())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dx.is_finite() && self.dx > 0.0 && self.dy.is_finite() && self.dy > 0.0) {
            return Err(StommelError::invalid(format!(
                "finite-difference steps must be positive (dx = {}, dy = {})",
                self.dx, self.dy
            )));
        }
        Ok(())
    }
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self::from_grid(&SampleGrid::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// Total integration time.
    pub t_max: f64,
    /// Number of trajectory samples, initial state included.
    pub samples: usize,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            t_max: 100.0,
            samples: 10_000,
        }
    }
}

/// Inclusive range of `lambda` values visited by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start: 0.01,
            end: 1.0,
            count: 200,
        }
    }
}

impl SweepRange {
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(StommelError::invalid("sweep bounds must be finite"));
        }
        if self.count == 0 {
            return Err(StommelError::invalid("sweep needs at least one value"));
        }
        Ok(())
    }

    pub fn values(&self) -> Result<Vec<f64>> {
        self.validate()?;
        if self.count == 1 {
            return Ok(vec![self.start]);
        }
        Ok(linspace(self.start, self.end, self.count))
    }
}

/// Initial conditions of the classic phase portrait, fanned around the
/// boundary of the unit square.
pub const PHASE_PORTRAIT_SEEDS: [State; 8] = [
    State { x: 0.0, y: 0.0 },
    State { x: 0.2, y: 0.0 },
    State { x: 1.0, y: 0.1 },
    State { x: 1.0, y: 0.5 },
    State { x: 1.0, y: 1.0 },
    State { x: 0.4, y: 1.0 },
    State { x: 0.0, y: 0.75 },
    State { x: 0.0, y: 0.4 },
];

/// Everything a full analysis run needs, defaulting to the bistable
/// reference configuration `R = 2, delta = 1/6, lambda = 1/5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub params: ParameterSet,
    pub grid: SampleGrid,
    pub locator: LocatorSettings,
    pub integration: IntegrationSettings,
    pub sweep: SweepRange,
    /// Coarser grid used at every step of a sweep.
    pub sweep_grid: SampleGrid,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            params: ParameterSet::default(),
            grid: SampleGrid::default(),
            locator: LocatorSettings::default(),
            integration: IntegrationSettings::default(),
            sweep: SweepRange::default(),
            sweep_grid: SampleGrid::unit(100_000),
        }
    }
}

impl AnalysisConfig {
    pub fn finite_difference(&self) -> FiniteDifference {
        FiniteDifference::from_grid(&self.grid)
    }

    pub fn sweep_finite_difference(&self) -> FiniteDifference {
        FiniteDifference::from_grid(&self.sweep_grid)
    }
}

pub(crate) fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i + 1 == count {
                end
            } else {
                start + (end - start) * (i as f64 / last)
            }
        })
        .collect()
}
