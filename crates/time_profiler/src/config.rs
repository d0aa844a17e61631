//! Profiling configuration
//!
//! The profiling mode is fixed at build time through cargo features:
//!
//! - no feature: profiling disabled, the call-site macros expand to nothing
//! - `time-profiling`: scalar per-stage profiling
//! - `time-profiling-extended`, usually via one of `axes-pic-types`,
//!   `axes-ctus-in-pic`, `axes-cu-shapes`: spatial profiling
//!
//! The modes are exclusive. If both are enabled, the scalar mode wins.
//!
//! Grid sizing for the spatial profiler is run-time configuration and can be
//! loaded from JSON with [`SpatialConfig::from_json`].

use crate::axes::{AxesKind, PictureGeometry};
use crate::error::{ProfilerError, ProfilerResult};
use crate::spatial::GridExtents;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which profiler the build instruments with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfilingMode {
    /// No instrumentation
    Disabled,
    /// [`ScalarProfiler`](crate::ScalarProfiler) and [`StageScope`](crate::StageScope)
    Scalar,
    /// [`SpatialProfiler`](crate::SpatialProfiler) and [`SpatialScope`](crate::SpatialScope)
    Extended(AxesKind),
}

impl ProfilingMode {
    /// The mode selected by this build's features.
    pub const BUILD: ProfilingMode = if cfg!(feature = "time-profiling") {
        ProfilingMode::Scalar
    } else if cfg!(feature = "time-profiling-extended") {
        ProfilingMode::Extended(AxesKind::SELECTED)
    } else {
        ProfilingMode::Disabled
    };

    pub fn is_enabled(self) -> bool {
        self != ProfilingMode::Disabled
    }
}

impl Default for ProfilingMode {
    fn default() -> Self {
        Self::BUILD
    }
}

impl fmt::Display for ProfilingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilingMode::Disabled => f.write_str("off"),
            ProfilingMode::Scalar => f.write_str("scalar"),
            ProfilingMode::Extended(axes) => write!(f, "extended:{}", axes),
        }
    }
}

impl FromStr for ProfilingMode {
    type Err = ProfilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "off" | "disabled" => Ok(ProfilingMode::Disabled),
            "scalar" => Ok(ProfilingMode::Scalar),
            "extended" => Ok(ProfilingMode::Extended(AxesKind::SELECTED)),
            other => match other.strip_prefix("extended:") {
                Some(axes) => axes
                    .parse()
                    .map(ProfilingMode::Extended)
                    .map_err(|_| ProfilerError::InvalidMode(other.to_string())),
                None => Err(ProfilerError::InvalidMode(other.to_string())),
            },
        }
    }
}

impl TryFrom<String> for ProfilingMode {
    type Error = ProfilerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfilingMode> for String {
    fn from(mode: ProfilingMode) -> Self {
        mode.to_string()
    }
}

/// Sizing of the spatial profiler's grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpatialConfig {
    /// Meaning of the coordinate axes
    pub axes: AxesKind,
    /// Picture the grids must cover
    pub geometry: PictureGeometry,
    /// Explicit extents, overriding the ones derived from `axes`
    pub extents: Option<GridExtents>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            axes: AxesKind::SELECTED,
            geometry: PictureGeometry::default(),
            extents: None,
        }
    }
}

impl SpatialConfig {
    /// Config for pictures of `geometry` using the build's axes.
    pub fn new(geometry: PictureGeometry) -> Self {
        Self {
            geometry,
            ..Default::default()
        }
    }

    /// Set the axes the extents are derived from.
    pub fn with_axes(mut self, axes: AxesKind) -> Self {
        self.axes = axes;
        self
    }

    /// Use fixed extents instead of deriving them.
    pub fn with_extents(mut self, extents: GridExtents) -> Self {
        self.extents = Some(extents);
        self
    }

    /// Extents the spatial profiler should allocate.
    pub fn extents(&self) -> GridExtents {
        self.extents
            .unwrap_or_else(|| self.axes.extents(&self.geometry))
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ProfilerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        tracing::debug!(
            target: "time_profiler::config",
            axes = %config.axes,
            extents = %config.extents(),
            "spatial config loaded"
        );
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> ProfilerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mode_matches_features() {
        let mode = ProfilingMode::BUILD;
        if cfg!(feature = "time-profiling") {
            assert_eq!(mode, ProfilingMode::Scalar);
        } else if cfg!(feature = "time-profiling-extended") {
            assert_eq!(mode, ProfilingMode::Extended(AxesKind::SELECTED));
        } else {
            assert_eq!(mode, ProfilingMode::Disabled);
            assert!(!mode.is_enabled());
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("off".parse::<ProfilingMode>().unwrap(), ProfilingMode::Disabled);
        assert_eq!("scalar".parse::<ProfilingMode>().unwrap(), ProfilingMode::Scalar);
        assert_eq!(
            "extended:cu-shapes".parse::<ProfilingMode>().unwrap(),
            ProfilingMode::Extended(AxesKind::CuShapes)
        );
        assert!(matches!(
            "extended:hexagons".parse::<ProfilingMode>(),
            Err(ProfilerError::InvalidMode(_))
        ));
        assert!("sampling".parse::<ProfilingMode>().is_err());
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in [
            ProfilingMode::Disabled,
            ProfilingMode::Scalar,
            ProfilingMode::Extended(AxesKind::CtusInPic),
        ] {
            assert_eq!(mode.to_string().parse::<ProfilingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_serde_as_string() {
        let json = serde_json::to_string(&ProfilingMode::Extended(AxesKind::PicTypes)).unwrap();
        assert_eq!(json, "\"extended:pic-types\"");

        let mode: ProfilingMode = serde_json::from_str("\"scalar\"").unwrap();
        assert_eq!(mode, ProfilingMode::Scalar);
        assert!(serde_json::from_str::<ProfilingMode>("\"bogus\"").is_err());
    }

    #[test]
    fn test_spatial_config_from_json() {
        let config = SpatialConfig::from_json(
            r#"{"axes": "ctus-in-pic", "geometry": {"width": 3840, "height": 2160, "ctuSizeLog2": 7}}"#,
        )
        .unwrap();

        assert_eq!(config.axes, AxesKind::CtusInPic);
        assert_eq!(config.extents(), GridExtents::new(30, 17, 2));
    }

    #[test]
    fn test_spatial_config_defaults() {
        let config = SpatialConfig::from_json("{}").unwrap();
        assert_eq!(config, SpatialConfig::default());
        assert_eq!(config.geometry, PictureGeometry::default());
    }

    #[test]
    fn test_spatial_config_explicit_extents() {
        let config = SpatialConfig::new(PictureGeometry::default())
            .with_axes(AxesKind::CuShapes)
            .with_extents(GridExtents::new(4, 4, 1));
        assert_eq!(config.extents(), GridExtents::new(4, 4, 1));

        let parsed = SpatialConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_spatial_config_rejects_oversized_ctu() {
        let result = SpatialConfig::from_json(
            r#"{"axes": "ctus-in-pic", "geometry": {"width": 1920, "height": 1080, "ctuSizeLog2": 32}}"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ProfilerError::Config(_)));
        assert!(err.to_string().contains("ctuSizeLog2 32"));
    }

    #[test]
    fn test_spatial_config_invalid_json() {
        assert!(matches!(
            SpatialConfig::from_json("{\"axes\": 3}"),
            Err(ProfilerError::Config(_))
        ));
    }
}
