use core::fmt;

/// Result alias for `brainmod`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by modularity evaluation, optimization and partition comparison.
///
/// Every variant is raised at the boundary of an operation, before any search
/// begins. Hitting an iteration or round cap is not an error; see
/// [`ConvergenceWarning`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Length mismatch, e.g. a partition that does not cover every node.
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Shape mismatch (string description), e.g. a non-square matrix.
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// A matrix entry is NaN or infinite.
    NonFinite {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::NonFinite { row, col } => {
                write!(f, "non-finite weight at ({row}, {col})")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Non-fatal report that a search stopped at its cap instead of a fixed point.
///
/// The result carrying this warning still holds the best partition found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceWarning {
    /// Which loop hit its cap.
    pub stage: Stage,
    /// Number of iterations (levels, passes or rounds) that were run.
    pub iterations: usize,
}

/// The capped loop a [`ConvergenceWarning`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Louvain aggregation levels.
    Levels,
    /// Local-moving or tuning passes over all nodes.
    Passes,
    /// Consensus rounds.
    Rounds,
}

impl ConvergenceWarning {
    pub(crate) fn new(stage: Stage, iterations: usize) -> Self {
        tracing::warn!(?stage, iterations, "stopped at iteration cap without reaching a fixed point");
        Self { stage, iterations }
    }

    /// A cap that is the normal way out of the loop; logged at debug level only.
    pub(crate) fn expected(stage: Stage, iterations: usize) -> Self {
        tracing::debug!(?stage, iterations, "stopped at iteration cap");
        Self { stage, iterations }
    }
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.stage {
            Stage::Levels => "aggregation levels",
            Stage::Passes => "passes",
            Stage::Rounds => "consensus rounds",
        };
        write!(f, "did not converge after {} {what}", self.iterations)
    }
}

pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidParameter {
            name,
            message: "must lie in [0, 1]",
        });
    }
    Ok(())
}

pub(crate) fn check_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidParameter {
            name,
            message: "must be at least 1",
        });
    }
    Ok(())
}
