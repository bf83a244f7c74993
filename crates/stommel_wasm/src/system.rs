//! Steppable box model for interactive use.

use crate::shared::{core_error, to_js};
use js_sys::Float64Array;
use stommel_core::config::FiniteDifference;
use stommel_core::model::{flow_rate, ParameterSet, State, StommelModel};
use stommel_core::solvers::RK4;
use stommel_core::stability::finite_difference_jacobian;
use stommel_core::traits::Steppable;
use stommel_core::StommelError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmStommelSystem {
    model: StommelModel,
    state: Vec<f64>,
    t: f64,
    solver: RK4<f64>,
}

impl WasmStommelSystem {
    pub(crate) fn from_params(params: ParameterSet) -> stommel_core::Result<Self> {
        Ok(WasmStommelSystem {
            model: StommelModel::new(params)?,
            state: vec![0.0; 2],
            t: 0.0,
            solver: RK4::new(2),
        })
    }

    fn current(&self) -> State {
        State::new(self.state[0], self.state[1])
    }

    fn check_dt(dt: f64) -> stommel_core::Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(StommelError::InvalidParameter(format!(
                "dt must be positive and finite, got {}",
                dt
            )));
        }
        Ok(())
    }

    pub(crate) fn step_checked(&mut self, dt: f64) -> stommel_core::Result<()> {
        Self::check_dt(dt)?;
        self.solver.step(&self.model, &mut self.t, &mut self.state, dt);
        Ok(())
    }

    /// Steps `steps` times and returns interleaved `[x, y, ...]` samples,
    /// starting with the state before the first step.
    pub(crate) fn advance(&mut self, steps: usize, dt: f64) -> stommel_core::Result<Vec<f64>> {
        Self::check_dt(dt)?;
        let mut samples = Vec::with_capacity(2 * (steps + 1));
        samples.extend_from_slice(&self.state);
        for _ in 0..steps {
            self.solver.step(&self.model, &mut self.t, &mut self.state, dt);
            samples.extend_from_slice(&self.state);
        }
        Ok(samples)
    }

    pub(crate) fn jacobian(&self, dx: f64, dy: f64) -> stommel_core::Result<[f64; 4]> {
        let steps = FiniteDifference { dx, dy };
        steps.validate()?;
        Ok(finite_difference_jacobian(
            &self.model.params,
            &self.current(),
            &steps,
        ))
    }
}

#[wasm_bindgen]
impl WasmStommelSystem {
    #[wasm_bindgen(constructor)]
    pub fn new(r: f64, delta: f64, lambda: f64) -> Result<WasmStommelSystem, JsValue> {
        console_error_panic_hook::set_once();

        Self::from_params(ParameterSet { r, delta, lambda })
            .map_err(|e| core_error("Model construction", e))
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<(), JsValue> {
        if state.len() != 2 {
            return Err(JsValue::from_str("State dimension mismatch."));
        }
        self.state = state.to_vec();
        Ok(())
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    pub fn get_params(&self) -> Result<JsValue, JsValue> {
        to_js(&self.model.params)
    }

    pub fn step(&mut self, dt: f64) -> Result<(), JsValue> {
        self.step_checked(dt).map_err(|e| core_error("Step", e))
    }

    pub fn integrate(&mut self, steps: u32, dt: f64) -> Result<Float64Array, JsValue> {
        let samples = self
            .advance(steps as usize, dt)
            .map_err(|e| core_error("Integration", e))?;
        Ok(Float64Array::from(samples.as_slice()))
    }

    pub fn flow_rate(&self) -> f64 {
        flow_rate(&self.model.params, &self.current())
    }

    /// Row-major `[f_x, f_y, g_x, g_y]` at the current state.
    pub fn compute_jacobian(&self, dx: f64, dy: f64) -> Result<Vec<f64>, JsValue> {
        self.jacobian(dx, dy)
            .map(|jacobian| jacobian.to_vec())
            .map_err(|e| core_error("Jacobian", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stommel_core::trajectory::integrate_trajectory;

    fn reference_system() -> WasmStommelSystem {
        WasmStommelSystem::from_params(ParameterSet::default()).expect("system")
    }

    #[test]
    fn stepping_matches_core_integration() {
        let mut system = reference_system();
        system.state = vec![0.2, 0.3];
        for _ in 0..99 {
            system.step_checked(0.01).expect("step");
        }

        let trajectory =
            integrate_trajectory(&ParameterSet::default(), 1.0, 100, State::new(0.2, 0.3))
                .expect("trajectory");
        let end = trajectory.last().expect("end");
        assert!((system.state[0] - end.x).abs() < 1e-12);
        assert!((system.state[1] - end.y).abs() < 1e-12);
        assert!((system.get_t() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn advance_returns_interleaved_samples() {
        let mut system = reference_system();
        system.state = vec![1.0, 1.0];
        let samples = system.advance(3, 0.1).expect("samples");
        assert_eq!(samples.len(), 8);
        assert_eq!(&samples[..2], &[1.0, 1.0]);
        assert_eq!(&samples[6..], system.get_state().as_slice());
    }

    #[test]
    fn jacobian_matches_core_finite_difference() {
        let mut system = reference_system();
        system.state = vec![0.6, 0.5];
        let jacobian = system.jacobian(1e-4, 1e-4).expect("jacobian");
        let expected = finite_difference_jacobian(
            &ParameterSet::default(),
            &State::new(0.6, 0.5),
            &FiniteDifference::from_spacing(1e-4),
        );
        assert_eq!(jacobian, expected);
        assert!(system.jacobian(0.0, 1e-4).is_err());
    }

    #[test]
    fn step_and_advance_reject_bad_dt() {
        let mut system = reference_system();
        system.state = vec![0.4, 0.8];
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = system.step_checked(dt).expect_err("bad dt must fail");
            assert!(err.to_string().contains("dt must be positive"), "{err}");
            assert!(system.advance(2, dt).is_err());
        }
        assert_eq!(system.state, vec![0.4, 0.8]);
        assert_eq!(system.get_t(), 0.0);
    }

    #[test]
    fn flow_rate_follows_state() {
        let mut system = reference_system();
        system.state = vec![0.5, 0.5];
        // (2 * 0.5 - 0.5) / 0.2
        assert!((system.flow_rate() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn zero_lambda_is_rejected_before_crossing_the_boundary() {
        let err = WasmStommelSystem::from_params(ParameterSet {
            lambda: 0.0,
            ..ParameterSet::default()
        })
        .err()
        .expect("lambda = 0 must fail");
        assert!(err.to_string().contains("lambda must be non-zero"));
    }
}
