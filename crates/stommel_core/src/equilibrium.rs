//! Fixed points of the box model by root bracketing.
//!
//! Imposing `g = 0` gives `x` as a closed-form function of `y`, with one form
//! per flow direction. Substituting it into `f = 0` leaves a cubic in `y` for
//! each direction. Both cubics are sampled on a caller-supplied grid and every
//! sign change brackets one equilibrium.

use crate::config::{LocatorSettings, RootRefinement, SampleGrid};
use crate::error::{Result, StommelError};
use crate::model::{density_contrast, salinity_rate, temperature_rate, ParameterSet, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Direction of the overturning at an equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowBranch {
    /// `R x >= y`: temperature-driven, `F >= 0`.
    Thermal,
    /// `R x < y`: salinity-driven, `F < 0`.
    Haline,
}

impl FlowBranch {
    pub const ALL: [FlowBranch; 2] = [FlowBranch::Thermal, FlowBranch::Haline];

    /// The cubic in `y` whose roots are this branch's equilibria.
    pub fn polynomial(self, params: &ParameterSet, y: f64) -> f64 {
        let ParameterSet { r, delta, lambda } = *params;
        let (a, b) = match self {
            FlowBranch::Thermal => (1.0 - delta, delta * (r + lambda) - (1.0 + lambda)),
            FlowBranch::Haline => (delta - 1.0, delta * (lambda - r) + (1.0 - lambda)),
        };
        let c = lambda * (2.0 - delta);
        ((a * y + b) * y + c) * y - lambda
    }

    /// Salinity on the `g = 0` curve for this branch.
    pub fn recover_x(self, params: &ParameterSet, y: f64) -> Result<f64> {
        if y == 0.0 {
            return Err(StommelError::SingularEvaluation { y });
        }
        let ParameterSet { r, lambda, .. } = *params;
        let sign = match self {
            FlowBranch::Thermal => 1.0,
            FlowBranch::Haline => -1.0,
        };
        Ok((lambda / (r * y)) * (sign * (1.0 - y) + y * y / lambda))
    }

    /// On the `g = 0` curve `R x - y = ±lambda (1 - y) / y`; the branch only
    /// holds where that sign agrees with its flow direction.
    fn admits(self, params: &ParameterSet, y: f64) -> bool {
        let implied = params.lambda * (1.0 - y) / y;
        match self {
            FlowBranch::Thermal => implied >= 0.0,
            FlowBranch::Haline => implied > 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowBranch::Thermal => "thermal",
            FlowBranch::Haline => "haline",
        }
    }
}

/// A state at which both tendencies vanish, up to the locator's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub state: State,
    pub branch: FlowBranch,
}

impl FixedPoint {
    /// `(f, g)` evaluated at the fixed point.
    pub fn residuals(&self, params: &ParameterSet) -> (f64, f64) {
        (
            salinity_rate(params, self.state.x, self.state.y),
            temperature_rate(params, self.state.x, self.state.y),
        )
    }

    pub fn residual_norm(&self, params: &ParameterSet) -> f64 {
        let (f, g) = self.residuals(params);
        f.hypot(g)
    }
}

/// Finds every equilibrium whose `y` lies in the sampled range.
///
/// `samples` must be strictly increasing. With [`RootRefinement::LeftSample`]
/// the reported `y` is the left end of the bracketing interval, so accuracy
/// is bounded by the sample spacing. Returns an empty list when neither cubic
/// changes sign.
pub fn locate_equilibria(
    params: &ParameterSet,
    samples: &[f64],
    settings: LocatorSettings,
) -> Result<Vec<FixedPoint>> {
    params.validate()?;
    if params.r == 0.0 {
        return Err(StommelError::invalid("R must be non-zero"));
    }
    validate_samples(samples)?;

    let mut roots = Vec::new();
    for branch in FlowBranch::ALL {
        collect_branch_roots(params, samples, branch, settings.refinement, &mut roots);
    }

    let mut fixed_points = Vec::with_capacity(roots.len());
    for (branch, y) in roots {
        let x = branch.recover_x(params, y)?;
        if !branch.admits(params, y) {
            debug!(
                branch = branch.label(),
                x,
                y,
                contrast = density_contrast(params, x, y),
                "discarding root inconsistent with its flow direction"
            );
            continue;
        }
        fixed_points.push(FixedPoint {
            state: State::new(x, y),
            branch,
        });
    }
    fixed_points.sort_by(|a, b| a.state.y.total_cmp(&b.state.y));

    debug!(
        lambda = params.lambda,
        count = fixed_points.len(),
        "located equilibria"
    );
    Ok(fixed_points)
}

pub fn locate_on_grid(
    params: &ParameterSet,
    grid: &SampleGrid,
    settings: LocatorSettings,
) -> Result<Vec<FixedPoint>> {
    let samples = grid.values()?;
    locate_equilibria(params, &samples, settings)
}

pub(crate) fn validate_samples(samples: &[f64]) -> Result<()> {
    if samples.len() < 2 {
        return Err(StommelError::invalid(format!(
            "root bracketing needs at least 2 samples, got {}",
            samples.len()
        )));
    }
    if samples.iter().any(|y| !y.is_finite()) {
        return Err(StommelError::invalid("samples must be finite"));
    }
    if let Some(pair) = samples.windows(2).find(|pair| pair[1] <= pair[0]) {
        return Err(StommelError::invalid(format!(
            "samples must be strictly increasing ({} followed by {})",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

fn collect_branch_roots(
    params: &ParameterSet,
    samples: &[f64],
    branch: FlowBranch,
    refinement: RootRefinement,
    out: &mut Vec<(FlowBranch, f64)>,
) {
    let mut left = branch.polynomial(params, samples[0]);
    for i in 0..samples.len() {
        let here = sign(left);
        // The flip test alone never fires for an exact zero on a sample.
        if here == 0 {
            trace!(branch = branch.label(), y = samples[i], "root on sample");
            out.push((branch, samples[i]));
        }
        let Some(&next_y) = samples.get(i + 1) else {
            break;
        };
        let right = branch.polynomial(params, next_y);
        if (here - sign(right)).abs() == 2 {
            let y = match refinement {
                RootRefinement::LeftSample => samples[i],
                RootRefinement::Bisection {
                    max_iterations,
                    tolerance,
                } => bisect(params, branch, samples[i], next_y, max_iterations, tolerance),
            };
            trace!(branch = branch.label(), y, "bracketed root");
            out.push((branch, y));
        }
        left = right;
    }
}

fn bisect(
    params: &ParameterSet,
    branch: FlowBranch,
    mut lo: f64,
    mut hi: f64,
    max_iterations: usize,
    tolerance: f64,
) -> f64 {
    let mut lo_sign = sign(branch.polynomial(params, lo));
    for _ in 0..max_iterations {
        if hi - lo <= tolerance {
            break;
        }
        let mid = 0.5 * (lo + hi);
        let mid_sign = sign(branch.polynomial(params, mid));
        if mid_sign == 0 {
            return mid;
        }
        if mid_sign == lo_sign {
            lo = mid;
            lo_sign = mid_sign;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
