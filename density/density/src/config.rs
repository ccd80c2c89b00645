//! Pipeline configuration.

use density_aggregate::DensityParams;
use density_classify::{ClassifierKind, ClassifyParams};
use density_join::{BoundaryRule, JoinParams};
use density_layer::ChoroplethStyle;
use density_types::Reprojection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

/// Everything a pipeline run needs besides the geometry.
///
/// Each stage keeps its own parameter block; the flat `with_*` helpers cover
/// the options most runs change.
///
/// # Example
///
/// ```
/// use density::{ClassifierKind, PipelineConfig};
///
/// let config = PipelineConfig::default()
///     .with_class_count(4)
///     .with_classifier_kind(ClassifierKind::Quantile);
/// assert!(config.validate().is_ok());
/// assert!(config.cluster_points);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Spatial join settings.
    pub join: JoinParams,
    /// Density unit settings.
    pub density: DensityParams,
    /// Classification settings.
    pub classify: ClassifyParams,
    /// Choropleth presentation.
    pub style: ChoroplethStyle,
    /// Point attributes carried into the point layer.
    pub display_attributes: Vec<String>,
    /// Ask the renderer to cluster point markers.
    pub cluster_points: bool,
    /// Projection applied to both collections before the join.
    pub reprojection: Option<Reprojection>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            join: JoinParams::default(),
            density: DensityParams::default(),
            classify: ClassifyParams::default(),
            style: ChoroplethStyle::default(),
            display_attributes: Vec::new(),
            cluster_points: true,
            reprojection: None,
        }
    }
}

impl PipelineConfig {
    /// Set the density unit conversion factor.
    #[must_use]
    pub const fn with_unit_conversion_factor(mut self, factor: f64) -> Self {
        self.density.unit_conversion_factor = factor;
        self
    }

    /// Set the number of classes.
    #[must_use]
    pub const fn with_class_count(mut self, class_count: usize) -> Self {
        self.classify.class_count = class_count;
        self
    }

    /// Set the classification algorithm.
    #[must_use]
    pub const fn with_classifier_kind(mut self, kind: ClassifierKind) -> Self {
        self.classify.kind = kind;
        self
    }

    /// Set the boundary tie rule.
    #[must_use]
    pub const fn with_boundary_tie_rule(mut self, rule: BoundaryRule) -> Self {
        self.join.boundary_rule = rule;
        self
    }

    /// Set the point attributes to display.
    #[must_use]
    pub fn with_display_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Project both collections before joining.
    #[must_use]
    pub fn with_reprojection(mut self, reprojection: Reprojection) -> Self {
        self.reprojection = Some(reprojection);
        self
    }

    /// Validate every stage's parameters before any work is done.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter block's error.
    pub fn validate(&self) -> PipelineResult<()> {
        self.join.validate()?;
        self.density.validate()?;
        self.classify.validate()?;
        self.style.validate()?;
        if let Some(reprojection) = &self.reprojection {
            reprojection.projection().validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.classify.class_count, 5);
        assert_eq!(config.classify.kind, ClassifierKind::NaturalBreaks);
        assert_eq!(config.join.boundary_rule, BoundaryRule::FirstInOrder);
        assert!(config.reprojection.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::default()
            .with_unit_conversion_factor(2.5)
            .with_boundary_tie_rule(BoundaryRule::LowestId)
            .with_display_attributes(["kind", "hour"])
            .with_reprojection(Reprojection::ease_grid2());
        assert!((config.density.unit_conversion_factor - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.join.boundary_rule, BoundaryRule::LowestId);
        assert_eq!(config.display_attributes, vec!["kind".to_string(), "hour".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_blocks() {
        let err = PipelineConfig::default().with_class_count(0).validate().unwrap_err();
        assert!(matches!(err, PipelineError::Classify(_)));

        let err = PipelineConfig::default()
            .with_unit_conversion_factor(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Density(_)));

        let mut config = PipelineConfig::default();
        config.style.fill_opacity = 1.5;
        assert!(matches!(config.validate().unwrap_err(), PipelineError::Layer(_)));
    }
}
