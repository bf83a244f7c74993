//! Forward integration of the box model.

use crate::config::IntegrationSettings;
use crate::error::Result;
use crate::model::{ParameterSet, State, StommelModel};
use crate::solvers::integrate_fixed_step;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// States on a uniform time grid, the initial state first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }
}

/// Integrates from `initial` with RK4 at the fixed step `t_max / samples`.
///
/// The step is not adapted. Trajectories that cross `R x = y` quickly need a
/// step small enough to resolve the kink there; choosing it is up to the
/// caller.
pub fn integrate_trajectory(
    params: &ParameterSet,
    t_max: f64,
    samples: usize,
    initial: State,
) -> Result<Trajectory> {
    let model = StommelModel::new(*params)?;
    let solution = integrate_fixed_step(&model, t_max, samples, &[initial.x, initial.y])?;
    let states = solution
        .states
        .chunks_exact(2)
        .map(|pair| State::new(pair[0], pair[1]))
        .collect();
    Ok(Trajectory {
        times: solution.times,
        states,
    })
}

pub fn integrate_with_settings(
    params: &ParameterSet,
    settings: &IntegrationSettings,
    initial: State,
) -> Result<Trajectory> {
    integrate_trajectory(params, settings.t_max, settings.samples, initial)
}

/// Integrates every seed with the same settings, e.g. to draw a phase
/// portrait from [`crate::config::PHASE_PORTRAIT_SEEDS`].
pub fn integrate_many(
    params: &ParameterSet,
    settings: &IntegrationSettings,
    seeds: &[State],
) -> Result<Vec<Trajectory>> {
    debug!(seeds = seeds.len(), t_max = settings.t_max, "integrating trajectory batch");
    seeds
        .iter()
        .map(|seed| integrate_with_settings(params, settings, *seed))
        .collect()
}
