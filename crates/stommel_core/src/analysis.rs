use crate::config::{FiniteDifference, LocatorSettings};
use crate::equilibrium::{locate_equilibria, FixedPoint};
use crate::error::Result;
use crate::model::{flow_rate, ParameterSet};
use crate::stability::{classify_fixed_point, StabilityResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One classified equilibrium with its overturning strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub fixed_point: FixedPoint,
    pub stability: StabilityResult,
    pub flow_rate: f64,
}

impl fmt::Display for EquilibriumReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.stability.class.label();
        let article = if label.starts_with('u') { "an" } else { "a" };
        write!(
            f,
            "x = {}, y = {} is {} {}. F = {}",
            self.fixed_point.state.x,
            self.fixed_point.state.y,
            article,
            label,
            self.flow_rate
        )
    }
}

/// Locates, classifies and measures every equilibrium on the `y` grid.
pub fn analyze_equilibria(
    params: &ParameterSet,
    samples: &[f64],
    locator: LocatorSettings,
    steps: &FiniteDifference,
) -> Result<Vec<EquilibriumReport>> {
    analyze_equilibria_with(params, samples, locator, steps, |_| {})
}

/// Like [`analyze_equilibria`], handing each report to `reporter` as soon as
/// it is computed.
pub fn analyze_equilibria_with<F>(
    params: &ParameterSet,
    samples: &[f64],
    locator: LocatorSettings,
    steps: &FiniteDifference,
    mut reporter: F,
) -> Result<Vec<EquilibriumReport>>
where
    F: FnMut(&EquilibriumReport),
{
    let fixed_points = locate_equilibria(params, samples, locator)?;
    let mut reports = Vec::with_capacity(fixed_points.len());
    for fixed_point in fixed_points {
        let report = report_for(params, fixed_point, steps)?;
        reporter(&report);
        reports.push(report);
    }
    Ok(reports)
}

pub(crate) fn report_for(
    params: &ParameterSet,
    fixed_point: FixedPoint,
    steps: &FiniteDifference,
) -> Result<EquilibriumReport> {
    let stability = classify_fixed_point(params, &fixed_point, steps)?;
    let flow_rate = flow_rate(params, &fixed_point.state);
    debug!(
        x = fixed_point.state.x,
        y = fixed_point.state.y,
        class = stability.class.label(),
        flow_rate,
        "classified equilibrium"
    );
    Ok(EquilibriumReport {
        fixed_point,
        stability,
        flow_rate,
    })
}
