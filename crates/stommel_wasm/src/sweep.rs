//! Stepped `lambda` sweep runner.

use crate::shared::{core_error, from_js_or_default, to_js};
use serde::Serialize;
use stommel_core::bifurcation::BifurcationSweep;
use stommel_core::config::AnalysisConfig;
use wasm_bindgen::prelude::*;

/// Progress payload for the stepped sweep.
#[derive(Debug, Serialize, PartialEq)]
struct SweepProgress {
    done: bool,
    completed: usize,
    total: usize,
    skipped: usize,
}

fn progress_of(sweep: &BifurcationSweep) -> SweepProgress {
    let (completed, total) = sweep.progress();
    SweepProgress {
        done: sweep.is_done(),
        completed,
        total,
        skipped: sweep.diagram().skipped.len(),
    }
}

pub(crate) fn sweep_from_config(config: &AnalysisConfig) -> stommel_core::Result<BifurcationSweep> {
    BifurcationSweep::new(
        config.params,
        &config.sweep,
        config.sweep_grid.values()?,
        config.locator,
        config.sweep_finite_difference(),
    )
}

#[wasm_bindgen]
pub struct WasmBifurcationSweepRunner {
    sweep: BifurcationSweep,
}

#[wasm_bindgen]
impl WasmBifurcationSweepRunner {
    /// `config` is a partial `AnalysisConfig`; its `sweep`, `sweep_grid` and
    /// `locator` fields drive the run.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmBifurcationSweepRunner, JsValue> {
        console_error_panic_hook::set_once();

        let config: AnalysisConfig = from_js_or_default(config, "analysis config")?;
        let sweep = sweep_from_config(&config).map_err(|e| core_error("Sweep setup", e))?;
        Ok(WasmBifurcationSweepRunner { sweep })
    }

    pub fn is_done(&self) -> bool {
        self.sweep.is_done()
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        self.sweep.run_steps(batch_size as usize);
        to_js(&progress_of(&self.sweep))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        to_js(&progress_of(&self.sweep))
    }

    /// The diagram so far. Absent branch values arrive as `null`.
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        to_js(self.sweep.diagram())
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use serde_wasm_bindgen::to_value;
    use stommel_core::config::{SampleGrid, SweepRange};
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn absent_branch_values_cross_as_null() {
        let config = AnalysisConfig {
            sweep: SweepRange {
                start: 0.0,
                end: 0.2,
                count: 2,
            },
            sweep_grid: SampleGrid::unit(2_001),
            ..AnalysisConfig::default()
        };
        let mut runner =
            WasmBifurcationSweepRunner::new(to_value(&config).expect("config")).expect("runner");
        runner.run_steps(2).expect("run");
        assert!(runner.is_done());

        let result = runner.get_result().expect("result");
        let branches = js_sys::Reflect::get(&result, &JsValue::from_str("branches")).expect("branches");
        let first = js_sys::Reflect::get_u32(&branches, 0).expect("branch");
        let points = js_sys::Reflect::get(&first, &JsValue::from_str("points")).expect("points");
        let point = js_sys::Reflect::get_u32(&points, 0).expect("point");
        let flow = js_sys::Reflect::get(&point, &JsValue::from_str("flow_rate")).expect("flow");
        assert!(flow.is_null());
    }

    #[wasm_bindgen_test]
    fn constructor_reports_setup_errors() {
        let config = AnalysisConfig {
            sweep: SweepRange {
                start: 0.1,
                end: 0.2,
                count: 0,
            },
            ..AnalysisConfig::default()
        };
        let message = WasmBifurcationSweepRunner::new(to_value(&config).expect("config"))
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Sweep setup failed"));
    }
}
