//! Linear stability of equilibria from a finite-difference Jacobian.
//!
//! Classification uses only the trace `T` and determinant `D` of the 2x2
//! Jacobian:
//!
//! | condition          | class                   |
//! |--------------------|-------------------------|
//! | `D < 0`            | saddle                  |
//! | `D = 0`            | degenerate (error)      |
//! | `D > T^2 / 4`      | spiral, stable if T < 0 |
//! | `0 < D <= T^2 / 4` | node, stable if T < 0   |
//!
//! This is a local test. Basins of attraction come from integrating
//! trajectories instead.

use crate::config::FiniteDifference;
use crate::equilibrium::FixedPoint;
use crate::error::{Result, StommelError};
use crate::model::{salinity_rate, temperature_rate, ParameterSet, State};
use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumClass {
    StableNode,
    UnstableNode,
    StableSpiral,
    UnstableSpiral,
    Saddle,
}

impl EquilibriumClass {
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            EquilibriumClass::StableNode | EquilibriumClass::StableSpiral
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            EquilibriumClass::StableNode => "stable node",
            EquilibriumClass::UnstableNode => "unstable node",
            EquilibriumClass::StableSpiral => "stable spiral",
            EquilibriumClass::UnstableSpiral => "unstable spiral",
            EquilibriumClass::Saddle => "saddle",
        }
    }
}

impl fmt::Display for EquilibriumClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    pub trace: f64,
    pub determinant: f64,
    /// Row-major `[f_x, f_y, g_x, g_y]`.
    pub jacobian: [f64; 4],
    pub class: EquilibriumClass,
}

impl StabilityResult {
    /// Eigenvalues of the Jacobian, ordered by real then imaginary part.
    pub fn eigenvalues(&self) -> Vec<Complex<f64>> {
        let matrix = DMatrix::from_row_slice(2, 2, &self.jacobian);
        let mut values: Vec<Complex<f64>> = matrix.complex_eigenvalues().iter().cloned().collect();
        values.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        values
    }
}

/// Applies the trace/determinant rule.
pub fn classify(trace: f64, determinant: f64) -> Result<EquilibriumClass> {
    if determinant < 0.0 {
        return Ok(EquilibriumClass::Saddle);
    }
    // Zero determinant, zero trace with positive determinant (a centre), and
    // NaN inputs all leave the linearization inconclusive.
    if determinant == 0.0 || determinant.is_nan() || trace == 0.0 || trace.is_nan() {
        return Err(StommelError::DegenerateEquilibrium { trace, determinant });
    }
    let stable = trace < 0.0;
    let class = if determinant > 0.25 * trace * trace {
        if stable {
            EquilibriumClass::StableSpiral
        } else {
            EquilibriumClass::UnstableSpiral
        }
    } else if stable {
        EquilibriumClass::StableNode
    } else {
        EquilibriumClass::UnstableNode
    };
    Ok(class)
}

/// Central-difference Jacobian `[f_x, f_y, g_x, g_y]` at `state`, perturbing
/// one coordinate at a time by half a step on either side.
pub fn finite_difference_jacobian(
    params: &ParameterSet,
    state: &State,
    steps: &FiniteDifference,
) -> [f64; 4] {
    let State { x, y } = *state;
    let (hx, hy) = (0.5 * steps.dx, 0.5 * steps.dy);

    let f_x = (salinity_rate(params, x + hx, y) - salinity_rate(params, x - hx, y)) / steps.dx;
    let f_y = (salinity_rate(params, x, y + hy) - salinity_rate(params, x, y - hy)) / steps.dy;
    let g_x =
        (temperature_rate(params, x + hx, y) - temperature_rate(params, x - hx, y)) / steps.dx;
    let g_y =
        (temperature_rate(params, x, y + hy) - temperature_rate(params, x, y - hy)) / steps.dy;

    [f_x, f_y, g_x, g_y]
}

/// Linear stability of an arbitrary state; meaningful at equilibria.
pub fn classify_state(
    params: &ParameterSet,
    state: &State,
    steps: &FiniteDifference,
) -> Result<StabilityResult> {
    params.validate()?;
    steps.validate()?;

    let jacobian = finite_difference_jacobian(params, state, steps);
    let [a, b, c, d] = jacobian;
    let trace = a + d;
    let determinant = a * d - b * c;
    let class = classify(trace, determinant)?;

    Ok(StabilityResult {
        trace,
        determinant,
        jacobian,
        class,
    })
}

pub fn classify_fixed_point(
    params: &ParameterSet,
    fixed_point: &FixedPoint,
    steps: &FiniteDifference,
) -> Result<StabilityResult> {
    classify_state(params, &fixed_point.state, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocatorSettings, SampleGrid};
    use crate::equilibrium::locate_on_grid;

    #[test]
    fn rule_table_matches_known_eigenvalues() {
        // -1 +/- 2i
        assert_eq!(classify(-2.0, 5.0), Ok(EquilibriumClass::StableSpiral));
        assert_eq!(classify(2.0, 5.0), Ok(EquilibriumClass::UnstableSpiral));
        // (2 +/- sqrt 2) / 2, both positive
        assert_eq!(classify(2.0, 0.5), Ok(EquilibriumClass::UnstableNode));
        assert_eq!(classify(-3.0, 2.0), Ok(EquilibriumClass::StableNode));
        for trace in [-4.0, 0.0, 4.0] {
            assert_eq!(classify(trace, -1.0), Ok(EquilibriumClass::Saddle));
        }
    }

    #[test]
    fn repeated_eigenvalue_counts_as_node() {
        // D = T^2 / 4 exactly: a double real eigenvalue.
        assert_eq!(classify(-2.0, 1.0), Ok(EquilibriumClass::StableNode));
        assert_eq!(classify(2.0, 1.0), Ok(EquilibriumClass::UnstableNode));
    }

    #[test]
    fn degenerate_jacobians_are_reported() {
        assert_eq!(
            classify(-1.0, 0.0),
            Err(StommelError::DegenerateEquilibrium {
                trace: -1.0,
                determinant: 0.0
            })
        );
        assert!(matches!(
            classify(0.0, 3.0),
            Err(StommelError::DegenerateEquilibrium { .. })
        ));
    }

    #[test]
    fn central_differences_are_exact_off_the_kink() {
        // With R x > y both rates are quadratic, so central differences are
        // exact up to rounding.
        let params = ParameterSet::default();
        let state = State::new(0.6, 0.5);
        let jacobian =
            finite_difference_jacobian(&params, &state, &FiniteDifference::from_spacing(1e-3));
        let ParameterSet { r, delta, lambda } = params;
        let (x, y) = (state.x, state.y);
        let expected = [
            -delta - (2.0 * r * x - y) / lambda,
            x / lambda,
            -r * y / lambda,
            -1.0 - (r * x - 2.0 * y) / lambda,
        ];
        for (got, want) in jacobian.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[test]
    fn eigenvalues_follow_trace_and_determinant() {
        let result = StabilityResult {
            trace: -2.0,
            determinant: 5.0,
            jacobian: [-1.0, -2.0, 2.0, -1.0],
            class: EquilibriumClass::StableSpiral,
        };
        let values = result.eigenvalues();
        assert_eq!(values.len(), 2);
        assert!((values[0] - Complex::new(-1.0, -2.0)).norm() < 1e-12);
        assert!((values[1] - Complex::new(-1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn reference_equilibria_are_node_saddle_spiral() {
        let params = ParameterSet::default();
        let grid = SampleGrid::unit(100_001);
        let steps = FiniteDifference::from_grid(&grid);
        let points = locate_on_grid(&params, &grid, LocatorSettings::default()).expect("locate");
        let classes: Vec<EquilibriumClass> = points
            .iter()
            .map(|point| classify_fixed_point(&params, point, &steps).expect("classify").class)
            .collect();
        assert_eq!(
            classes,
            vec![
                EquilibriumClass::StableNode,
                EquilibriumClass::Saddle,
                EquilibriumClass::StableSpiral,
            ]
        );

        let saddle = classify_fixed_point(&params, &points[1], &steps).expect("classify");
        let values = saddle.eigenvalues();
        assert!(values[0].re < 0.0 && values[1].re > 0.0);
    }

    #[test]
    fn classify_state_validates_inputs() {
        let params = ParameterSet::default();
        let state = State::new(0.4, 0.8);
        assert!(classify_state(&params, &state, &FiniteDifference::from_spacing(-1.0)).is_err());
        let bad = params.with_lambda(0.0);
        assert!(classify_state(&bad, &state, &FiniteDifference::from_spacing(1e-4)).is_err());
    }
}
