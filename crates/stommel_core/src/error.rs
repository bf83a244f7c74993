use thiserror::Error;

/// Errors raised by the box-model procedures.
///
/// Every variant is detected where it occurs and returned immediately. The
/// computations are deterministic, so none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StommelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate equilibrium (trace = {trace}, determinant = {determinant}); linear classification is undefined")]
    DegenerateEquilibrium { trace: f64, determinant: f64 },

    #[error("Singular evaluation: fixed-point recovery divides by y = {y}")]
    SingularEvaluation { y: f64 },
}

impl StommelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        StommelError::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, StommelError>;
