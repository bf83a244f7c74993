//! The Stommel (1961) two-box thermohaline model.
//!
//! In nondimensional form, with `x` the salinity difference and `y` the
//! temperature difference between the boxes:
//!
//!   dx/dt = f(x, y) = delta (1 - x) - (x / lambda) |R x - y|
//!   dy/dt = g(x, y) = 1 - y - (y / lambda) |R x - y|
//!
//! The absolute value makes the exchange flow direction-dependent and puts
//! a kink along `R x = y`, so equilibria are located numerically.

use crate::error::{Result, StommelError};
use crate::traits::DynamicalSystem;
use serde::{Deserialize, Serialize};

/// Physical parameters of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Buoyancy ratio `R`.
    pub r: f64,
    /// Ratio of the salinity and temperature relaxation rates.
    pub delta: f64,
    /// Advection strength.
    pub lambda: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            r: 2.0,
            delta: 1.0 / 6.0,
            lambda: 0.2,
        }
    }
}

impl ParameterSet {
    pub fn new(r: f64, delta: f64, lambda: f64) -> Result<Self> {
        let params = Self { r, delta, lambda };
        params.validate()?;
        Ok(params)
    }

    /// Rejects parameter sets the dynamics cannot be evaluated with.
    pub fn validate(&self) -> Result<()> {
        if !self.r.is_finite() || !self.delta.is_finite() || !self.lambda.is_finite() {
            return Err(StommelError::invalid(format!(
                "parameters must be finite (R = {}, delta = {}, lambda = {})",
                self.r, self.delta, self.lambda
            )));
        }
        if self.lambda == 0.0 {
            return Err(StommelError::invalid("lambda must be non-zero"));
        }
        Ok(())
    }

    /// Returns a copy with `lambda` replaced. The result is not validated.
    pub fn with_lambda(&self, lambda: f64) -> Self {
        Self { lambda, ..*self }
    }
}

/// A point `(x, y)` in the salinity/temperature plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
}

impl State {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &State) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<State> for [f64; 2] {
    fn from(state: State) -> Self {
        [state.x, state.y]
    }
}

/// `R x - y`, the signed density difference that drives the exchange.
pub fn density_contrast(params: &ParameterSet, x: f64, y: f64) -> f64 {
    params.r * x - y
}

/// Salinity tendency `dx/dt`.
pub fn salinity_rate(params: &ParameterSet, x: f64, y: f64) -> f64 {
    params.delta * (1.0 - x) - (x / params.lambda) * density_contrast(params, x, y).abs()
}

/// Temperature tendency `dy/dt`.
pub fn temperature_rate(params: &ParameterSet, x: f64, y: f64) -> f64 {
    1.0 - y - (y / params.lambda) * density_contrast(params, x, y).abs()
}

/// Circulation flow rate `F = (R x - y) / lambda`. Positive values are
/// temperature-driven flow, negative values salinity-driven.
pub fn flow_rate(params: &ParameterSet, state: &State) -> f64 {
    density_contrast(params, state.x, state.y) / params.lambda
}

/// The model as a two-dimensional flow for the generic steppers.
#[derive(Debug, Clone, Copy)]
pub struct StommelModel {
    pub params: ParameterSet,
}

impl StommelModel {
    pub fn new(params: ParameterSet) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn rates(&self, state: &State) -> (f64, f64) {
        (
            salinity_rate(&self.params, state.x, state.y),
            temperature_rate(&self.params, state.x, state.y),
        )
    }
}

impl DynamicalSystem<f64> for StommelModel {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = salinity_rate(&self.params, x[0], x[1]);
        out[1] = temperature_rate(&self.params, x[0], x[1]);
    }
}
