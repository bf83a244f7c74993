//! Sweeping `lambda` to trace equilibrium branches.
//!
//! At every swept value the equilibria are located and classified, and each
//! flow rate is routed into one of three branches. A branch with no
//! equilibrium at some `lambda` holds `None` there, so a plot shows a gap
//! instead of a spurious zero-flow point.
//!
//! Known limitation: when two equilibria route into the same branch at one
//! `lambda`, the later one (larger `y`) overwrites the earlier. The full list
//! of equilibria at each `lambda` is kept in [`BifurcationDiagram::samples`].

use crate::analysis::{report_for, EquilibriumReport};
use crate::config::{FiniteDifference, LocatorSettings, SweepRange};
use crate::equilibrium::{locate_equilibria, validate_samples};
use crate::error::Result;
use crate::model::ParameterSet;
use crate::stability::EquilibriumClass;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    StableNode,
    StableSpiral,
    UnstableNode,
}

impl BranchKind {
    pub const ALL: [BranchKind; 3] = [
        BranchKind::StableNode,
        BranchKind::StableSpiral,
        BranchKind::UnstableNode,
    ];

    /// Branch that collects equilibria of `class`. There is no separate
    /// unstable-spiral branch: those points share the stable-node branch,
    /// and saddles share the unstable-node branch.
    pub fn for_class(class: EquilibriumClass) -> Self {
        match class {
            EquilibriumClass::StableNode | EquilibriumClass::UnstableSpiral => {
                BranchKind::StableNode
            }
            EquilibriumClass::StableSpiral => BranchKind::StableSpiral,
            EquilibriumClass::UnstableNode | EquilibriumClass::Saddle => BranchKind::UnstableNode,
        }
    }

    fn index(self) -> usize {
        match self {
            BranchKind::StableNode => 0,
            BranchKind::StableSpiral => 1,
            BranchKind::UnstableNode => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchPoint {
    pub lambda: f64,
    /// `None` where the branch has no equilibrium.
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BifurcationBranch {
    pub kind: BranchKind,
    pub points: Vec<BranchPoint>,
}

impl BifurcationBranch {
    fn new(kind: BranchKind, capacity: usize) -> Self {
        Self {
            kind,
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn flow_rates(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|point| point.flow_rate).collect()
    }

    /// Number of swept values at which the branch exists.
    pub fn present_count(&self) -> usize {
        self.points
            .iter()
            .filter(|point| point.flow_rate.is_some())
            .count()
    }
}

/// Every classified equilibrium found at one `lambda`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    pub lambda: f64,
    pub equilibria: Vec<EquilibriumReport>,
}

/// A `lambda` (or one equilibrium at it) left out of the branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSample {
    pub lambda: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BifurcationDiagram {
    /// Parameters exactly as passed to the sweep. Its `lambda` is kept as
    /// given but plays no part; each sample uses the swept value instead.
    pub base: ParameterSet,
    pub lambdas: Vec<f64>,
    pub branches: Vec<BifurcationBranch>,
    pub samples: Vec<SweepSample>,
    pub skipped: Vec<SkippedSample>,
}

impl BifurcationDiagram {
    fn empty(base: ParameterSet, capacity: usize) -> Self {
        Self {
            base,
            lambdas: Vec::with_capacity(capacity),
            branches: BranchKind::ALL
                .iter()
                .map(|kind| BifurcationBranch::new(*kind, capacity))
                .collect(),
            samples: Vec::with_capacity(capacity),
            skipped: Vec::new(),
        }
    }

    pub fn branch(&self, kind: BranchKind) -> &BifurcationBranch {
        &self.branches[kind.index()]
    }

    fn record(&mut self, lambda: f64, equilibria: Vec<EquilibriumReport>) {
        let routed = route_flow_rates(&equilibria);
        for kind in BranchKind::ALL {
            self.branches[kind.index()].points.push(BranchPoint {
                lambda,
                flow_rate: routed[kind.index()],
            });
        }
        self.lambdas.push(lambda);
        self.samples.push(SweepSample { lambda, equilibria });
    }
}

/// Flow rate per branch, in [`BranchKind::ALL`] order. Later reports win.
pub(crate) fn route_flow_rates(reports: &[EquilibriumReport]) -> [Option<f64>; 3] {
    let mut routed = [None; 3];
    for report in reports {
        routed[BranchKind::for_class(report.stability.class).index()] = Some(report.flow_rate);
    }
    routed
}

/// Incremental sweep; one `step` analyzes one `lambda`.
#[derive(Debug, Clone)]
pub struct BifurcationSweep {
    base: ParameterSet,
    lambdas: Vec<f64>,
    samples: Vec<f64>,
    locator: LocatorSettings,
    steps: FiniteDifference,
    next: usize,
    diagram: BifurcationDiagram,
}

impl BifurcationSweep {
    /// Only `lambda` varies. The `lambda` of `base` is never used in the
    /// analysis, though [`BifurcationDiagram::base`] records it unchanged.
    pub fn new(
        base: ParameterSet,
        range: &SweepRange,
        samples: Vec<f64>,
        locator: LocatorSettings,
        steps: FiniteDifference,
    ) -> Result<Self> {
        let lambdas = range.values()?;
        validate_samples(&samples)?;
        steps.validate()?;
        let diagram = BifurcationDiagram::empty(base, lambdas.len());
        Ok(Self {
            base,
            lambdas,
            samples,
            locator,
            steps,
            next: 0,
            diagram,
        })
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.lambdas.len()
    }

    /// `(completed, total)` swept values.
    pub fn progress(&self) -> (usize, usize) {
        (self.next, self.lambdas.len())
    }

    /// Analyzes the next `lambda` and returns it, or `None` when finished.
    pub fn step(&mut self) -> Option<f64> {
        let lambda = *self.lambdas.get(self.next)?;
        self.next += 1;

        let params = self.base.with_lambda(lambda);
        let equilibria = match locate_equilibria(&params, &self.samples, self.locator) {
            Ok(fixed_points) => {
                let mut reports = Vec::with_capacity(fixed_points.len());
                for fixed_point in fixed_points {
                    match report_for(&params, fixed_point, &self.steps) {
                        Ok(report) => reports.push(report),
                        Err(err) => {
                            warn!(lambda, y = fixed_point.state.y, %err, "equilibrium left out of sweep");
                            self.diagram.skipped.push(SkippedSample {
                                lambda,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
                reports
            }
            Err(err) => {
                warn!(lambda, %err, "sweep value skipped");
                self.diagram.skipped.push(SkippedSample {
                    lambda,
                    reason: err.to_string(),
                });
                Vec::new()
            }
        };

        debug!(lambda, equilibria = equilibria.len(), "sweep step");
        self.diagram.record(lambda, equilibria);
        Some(lambda)
    }

    /// Runs up to `batch` steps and returns how many ran.
    pub fn run_steps(&mut self, batch: usize) -> usize {
        let mut done = 0;
        while done < batch && self.step().is_some() {
            done += 1;
        }
        done
    }

    pub fn diagram(&self) -> &BifurcationDiagram {
        &self.diagram
    }

    /// Completes any remaining steps and returns the diagram.
    pub fn finish(mut self) -> BifurcationDiagram {
        while self.step().is_some() {}
        self.diagram
    }
}

/// Sweeps `lambda` over `range`, holding `R` and `delta` from `base`.
///
/// A `lambda` whose analysis fails (for instance `lambda = 0`) gets `None` on
/// every branch and an entry in `skipped`; the sweep carries on.
pub fn sweep_lambda(
    base: &ParameterSet,
    range: &SweepRange,
    samples: &[f64],
    locator: LocatorSettings,
    steps: &FiniteDifference,
) -> Result<BifurcationDiagram> {
    let sweep = BifurcationSweep::new(*base, range, samples.to_vec(), locator, *steps)?;
    Ok(sweep.finish())
}
