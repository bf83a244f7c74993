//! The `stommel_core` crate analyzes Stommel's two-box thermohaline model,
//! in which a temperature anomaly `y` and a salinity anomaly `x` are coupled
//! through an overturning flow `F = (R x - y) / lambda`.
//!
//! Key components:
//! - **Model**: `ParameterSet`, `State` and the nondimensional rates.
//! - **Equilibrium**: fixed points from sign changes of two branch cubics.
//! - **Stability**: finite-difference Jacobian and the trace/determinant rule.
//! - **Trajectory**: fixed-step RK4 integration, built on the generic solvers.
//! - **Bifurcation**: `lambda` sweeps routed into stable and unstable branches.
//!
//! Nothing here installs a `tracing` subscriber; events are emitted for the
//! caller to collect.
pub mod analysis;
pub mod bifurcation;
pub mod config;
pub mod equilibrium;
pub mod error;
pub mod model;
pub mod solvers;
pub mod stability;
pub mod traits;
pub mod trajectory;

pub use analysis::{analyze_equilibria, analyze_equilibria_with, EquilibriumReport};
pub use bifurcation::{sweep_lambda, BifurcationDiagram, BifurcationSweep, BranchKind};
pub use config::{
    AnalysisConfig, FiniteDifference, IntegrationSettings, LocatorSettings, RootRefinement,
    SampleGrid, SweepRange, PHASE_PORTRAIT_SEEDS,
};
pub use equilibrium::{locate_equilibria, FixedPoint, FlowBranch};
pub use error::{Result, StommelError};
pub use model::{flow_rate, ParameterSet, State, StommelModel};
pub use stability::{classify, classify_fixed_point, EquilibriumClass, StabilityResult};
pub use trajectory::{integrate_trajectory, Trajectory};
