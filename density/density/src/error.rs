//! Pipeline error and warning types.

use std::fmt;

use density_aggregate::{DensityError, DensityWarning};
use density_classify::{ClassifyError, ClassifyWarning};
use density_io::IoError;
use density_join::JoinError;
use density_layer::LayerError;
use density_types::TypesError;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result type alias for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A fatal error from any pipeline stage. The run is aborted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Geometry or reprojection failure.
    #[error("geometry: {0}")]
    Types(#[from] TypesError),

    /// Spatial join failure.
    #[error("join: {0}")]
    Join(#[from] JoinError),

    /// Density aggregation failure.
    #[error("density: {0}")]
    Density(#[from] DensityError),

    /// Classification failure.
    #[error("classify: {0}")]
    Classify(#[from] ClassifyError),

    /// Layer assembly failure.
    #[error("layer: {0}")]
    Layer(#[from] LayerError),

    /// Reading or writing failure.
    #[error("io: {0}")]
    Io(#[from] IoError),
}

impl PipelineError {
    /// Returns `true` if the run failed because inputs carried different CRS tags.
    #[must_use]
    pub const fn is_crs_mismatch(&self) -> bool {
        match self {
            Self::Types(e) => e.is_crs_mismatch(),
            Self::Join(e) => e.is_crs_mismatch(),
            Self::Layer(e) => matches!(e, LayerError::CrsMismatch { .. }),
            _ => false,
        }
    }

    /// Returns `true` if classification had too few distinct values.
    #[must_use]
    pub const fn is_insufficient_distinct(&self) -> bool {
        matches!(self, Self::Classify(e) if e.is_insufficient_distinct())
    }
}

/// A recovered condition surfaced alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PipelineWarning {
    /// A polygon has zero or vanishing area; its density was set to 0.
    DegenerateGeometry {
        /// Identifier of the polygon.
        polygon_id: String,
    },
    /// Fewer classes than requested were produced.
    ClassesCollapsed {
        /// Class count asked for.
        requested: usize,
        /// Class count produced.
        used: usize,
    },
    /// Natural breaks did not converge; best-effort breaks were used.
    UnboundedIteration {
        /// Iterations performed.
        iterations: usize,
    },
}

impl From<DensityWarning> for PipelineWarning {
    fn from(warning: DensityWarning) -> Self {
        match warning {
            DensityWarning::DegenerateGeometry { polygon_id } => Self::DegenerateGeometry { polygon_id },
        }
    }
}

impl From<ClassifyWarning> for PipelineWarning {
    fn from(warning: ClassifyWarning) -> Self {
        match warning {
            ClassifyWarning::ClassesCollapsed { requested, used } => Self::ClassesCollapsed { requested, used },
            ClassifyWarning::UnboundedIteration { iterations } => Self::UnboundedIteration { iterations },
        }
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry { polygon_id } => {
                write!(f, "polygon '{polygon_id}' has zero or vanishing area; density set to 0")
            }
            Self::ClassesCollapsed { requested, used } => {
                write!(f, "{requested} classes requested, only {used} produced")
            }
            Self::UnboundedIteration { iterations } => {
                write!(f, "natural breaks did not converge in {iterations} iterations")
            }
        }
    }
}
