//! One-shot analysis entry points.

use crate::shared::{core_error, from_js_or_default, to_js};
use stommel_core::analysis::{analyze_equilibria as core_analyze, EquilibriumReport};
use stommel_core::config::{AnalysisConfig, PHASE_PORTRAIT_SEEDS};
use stommel_core::model::{ParameterSet, State};
use stommel_core::trajectory::{
    integrate_many, integrate_trajectory as core_integrate, Trajectory,
};
use wasm_bindgen::prelude::*;

pub(crate) fn analyze(config: &AnalysisConfig) -> stommel_core::Result<Vec<EquilibriumReport>> {
    let samples = config.grid.values()?;
    core_analyze(
        &config.params,
        &samples,
        config.locator,
        &config.finite_difference(),
    )
}

pub(crate) fn phase_portrait(config: &AnalysisConfig) -> stommel_core::Result<Vec<Trajectory>> {
    integrate_many(&config.params, &config.integration, &PHASE_PORTRAIT_SEEDS)
}

/// Locates and classifies every equilibrium. `config` is a partial
/// `AnalysisConfig`; missing fields take the reference defaults.
#[wasm_bindgen]
pub fn analyze_equilibria(config: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let config: AnalysisConfig = from_js_or_default(config, "analysis config")?;
    let reports = analyze(&config).map_err(|e| core_error("Equilibrium analysis", e))?;
    to_js(&reports)
}

#[wasm_bindgen]
pub fn integrate_trajectory(
    params: JsValue,
    t_max: f64,
    samples: u32,
    x0: f64,
    y0: f64,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let params: ParameterSet = from_js_or_default(params, "parameters")?;
    let trajectory = core_integrate(&params, t_max, samples as usize, State::new(x0, y0))
        .map_err(|e| core_error("Trajectory integration", e))?;
    to_js(&trajectory)
}

/// Integrates the fixed set of phase-portrait seeds with `config.integration`.
#[wasm_bindgen]
pub fn integrate_phase_portrait(config: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let config: AnalysisConfig = from_js_or_default(config, "analysis config")?;
    let trajectories =
        phase_portrait(&config).map_err(|e| core_error("Phase portrait integration", e))?;
    to_js(&trajectories)
}
