use crate::error::{Result, StommelError};
use crate::traits::{DynamicalSystem, Scalar, Steppable};
use tracing::trace;

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let two = T::one() + T::one();
        let half = T::one() / two;
        let sixth = T::one() / (two + two + two);

        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

/// Samples of a fixed-step integration. `states` is row-major: sample `k`
/// occupies `states[k * dimension..(k + 1) * dimension]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepSolution {
    pub dimension: usize,
    pub step: f64,
    pub times: Vec<f64>,
    pub states: Vec<f64>,
}

impl FixedStepSolution {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// State at sample `index`, or `None` past the end.
    pub fn state(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        self.states.get(start..start.checked_add(self.dimension)?)
    }

    pub fn last_state(&self) -> Option<&[f64]> {
        self.state(self.len().checked_sub(1)?)
    }
}

/// Integrates `system` with RK4 at the fixed step `h = t_max / samples`.
///
/// Returns `samples` points starting with `initial_state` at `t = 0`; the last
/// one sits at `(samples - 1) * h`.
pub fn integrate_fixed_step(
    system: &impl DynamicalSystem<f64>,
    t_max: f64,
    samples: usize,
    initial_state: &[f64],
) -> Result<FixedStepSolution> {
    let dim = system.dimension();
    if initial_state.len() != dim {
        return Err(StommelError::invalid(format!(
            "initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial_state.len()
        )));
    }
    if samples == 0 {
        return Err(StommelError::invalid(
            "integration needs at least one sample",
        ));
    }
    if !t_max.is_finite() || t_max <= 0.0 {
        return Err(StommelError::invalid(format!(
            "integration time must be positive, got {}",
            t_max
        )));
    }

    let dt = t_max / samples as f64;
    let mut stepper = RK4::new(dim);
    let mut times = Vec::with_capacity(samples);
    let mut states = Vec::with_capacity(samples * dim);
    let mut state = initial_state.to_vec();
    let mut t = 0.0;

    times.push(t);
    states.extend_from_slice(&state);
    for _ in 1..samples {
        stepper.step(system, &mut t, &mut state, dt);
        times.push(t);
        states.extend_from_slice(&state);
    }
    trace!(samples, dt, "fixed-step integration finished");

    Ok(FixedStepSolution {
        dimension: dim,
        step: dt,
        times,
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -x[0];
            out[1] = -x[1];
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn rk4_step_matches_taylor_polynomial_for_decay() {
        let h = 0.1;
        let mut stepper = RK4::new(2);
        let mut state = [1.0, 2.0];
        let mut t = 0.0;
        stepper.step(&Decay, &mut t, &mut state, h);

        let factor = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((state[0] - factor).abs() < 1e-14);
        assert!((state[1] - 2.0 * factor).abs() < 1e-14);
        assert!((t - h).abs() < 1e-15);
    }

    #[test]
    fn integration_reproduces_rk4_amplification() {
        let solution = integrate_fixed_step(&Decay, 2.0, 20, &[1.0, -0.5]).expect("solution");
        let h = solution.step;
        assert!((h - 0.1).abs() < 1e-15);
        let factor = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;

        for k in 0..solution.len() {
            let expected = factor.powi(k as i32);
            let state = solution.state(k).expect("sample");
            assert!((state[0] - expected).abs() < 1e-13);
            assert!((state[1] + 0.5 * expected).abs() < 1e-13);
        }
    }

    #[test]
    fn integration_error_is_fourth_order() {
        let error_at = |samples: usize| {
            let solution = integrate_fixed_step(&Decay, 1.0, samples, &[1.0, 1.0]).expect("solution");
            let last = solution.last_state().expect("non-empty");
            let t_end = solution.times[solution.len() - 1];
            (last[0] - (-t_end).exp()).abs()
        };
        let coarse = error_at(10);
        let fine = error_at(20);
        // Global error scales like h^4; halving h cuts it by about 16.
        let ratio = coarse / fine;
        assert!(ratio > 12.0 && ratio < 20.0, "ratio was {ratio}");
        assert!(coarse < 1e-5);
    }

    #[test]
    fn integration_keeps_initial_state_and_uniform_times() {
        let solution = integrate_fixed_step(&Decay, 1.0, 4, &[3.0, 4.0]).expect("solution");
        assert_eq!(solution.len(), 4);
        assert_eq!(solution.state(0), Some(&[3.0, 4.0][..]));
        assert!(solution.state(4).is_none());
        assert!(solution.state(usize::MAX).is_none());
        assert_eq!(solution.last_state(), solution.state(3));
        assert_eq!(solution.times[0], 0.0);
        assert!((solution.times[3] - 0.75).abs() < 1e-15);

        let single = integrate_fixed_step(&Decay, 1.0, 1, &[3.0, 4.0]).expect("solution");
        assert_eq!(single.states, vec![3.0, 4.0]);
    }

    #[test]
    fn integration_rejects_invalid_inputs() {
        assert_err_contains(integrate_fixed_step(&Decay, 1.0, 0, &[1.0, 1.0]), "at least one sample");
        assert_err_contains(integrate_fixed_step(&Decay, 0.0, 10, &[1.0, 1.0]), "must be positive");
        assert_err_contains(integrate_fixed_step(&Decay, -1.0, 10, &[1.0, 1.0]), "must be positive");
        assert_err_contains(integrate_fixed_step(&Decay, 1.0, 10, &[1.0]), "dimension mismatch");
    }
}
