//! Coordinate axes for spatial profiling
//!
//! The spatial profiler keys time by an `(x, y, z)` triple. Which properties
//! of the unit of work end up on those axes is a build-time choice:
//!
//! | axes                | x               | y                | z          |
//! |---------------------|-----------------|------------------|------------|
//! | [`PicTypeAxes`]     | inter flag      | 0                | 0          |
//! | [`CtuPositionAxes`] | CTU column      | CTU row          | inter flag |
//! | [`BlockShapeAxes`]  | log2(width)     | log2(height)     | inter flag |
//!
//! Each choice is a zero-sized type implementing [`CoordinateAxes`], so the
//! mapping is resolved statically at every call site. [`SelectedAxes`] names
//! the one picked by the `axes-*` cargo features.

use crate::error::{ProfilerError, ProfilerResult};
use crate::spatial::{Coord, GridExtents};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position and shape of the block currently being processed, in luma
/// samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnit {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Whether the containing slice is intra-only
    pub is_intra: bool,
}

impl WorkUnit {
    /// A block in an inter slice.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            is_intra: false,
        }
    }

    /// Mark the containing slice as intra-only or not.
    pub fn with_intra(mut self, is_intra: bool) -> Self {
        self.is_intra = is_intra;
        self
    }

    /// 1 for blocks in inter slices, 0 for intra-only slices.
    #[inline]
    pub fn inter_flag(&self) -> u32 {
        u32::from(!self.is_intra)
    }
}

/// Largest accepted `ctu_size_log2`; the CTU edge must fit in a `u32`.
pub const MAX_CTU_SIZE_LOG2: u32 = u32::BITS - 1;

/// Picture dimensions and CTU size the grids are sized for.
///
/// Loading from configuration rejects a `ctu_size_log2` above
/// [`MAX_CTU_SIZE_LOG2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GeometryFields")]
pub struct PictureGeometry {
    /// Luma width in samples
    pub width: u32,
    /// Luma height in samples
    pub height: u32,
    /// log2 of the CTU edge length
    pub ctu_size_log2: u32,
}

impl PictureGeometry {
    pub fn new(width: u32, height: u32, ctu_size_log2: u32) -> Self {
        Self {
            width,
            height,
            ctu_size_log2,
        }
    }

    /// Like [`new`](Self::new), but rejects CTU sizes that overflow `u32`.
    pub fn try_new(width: u32, height: u32, ctu_size_log2: u32) -> ProfilerResult<Self> {
        if ctu_size_log2 > MAX_CTU_SIZE_LOG2 {
            return Err(ProfilerError::InvalidGeometry(format!(
                "ctuSizeLog2 {} exceeds {}",
                ctu_size_log2, MAX_CTU_SIZE_LOG2
            )));
        }
        Ok(Self::new(width, height, ctu_size_log2))
    }

    /// CTU edge length in samples, saturating at `u32::MAX`.
    pub fn ctu_size(&self) -> u32 {
        1u32.checked_shl(self.ctu_size_log2).unwrap_or(u32::MAX)
    }

    /// CTU index of the sample position `pos` along either axis.
    #[inline]
    pub fn ctu_index(&self, pos: u32) -> u32 {
        pos.checked_shr(self.ctu_size_log2).unwrap_or(0)
    }

    /// Number of CTU columns, counting a partial column.
    pub fn ctus_wide(&self) -> u32 {
        self.width.div_ceil(self.ctu_size())
    }

    /// Number of CTU rows, counting a partial row.
    pub fn ctus_high(&self) -> u32 {
        self.height.div_ceil(self.ctu_size())
    }
}

/// Unchecked wire form of [`PictureGeometry`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeometryFields {
    width: u32,
    height: u32,
    ctu_size_log2: u32,
}

impl TryFrom<GeometryFields> for PictureGeometry {
    type Error = ProfilerError;

    fn try_from(fields: GeometryFields) -> ProfilerResult<Self> {
        Self::try_new(fields.width, fields.height, fields.ctu_size_log2)
    }
}

impl Default for PictureGeometry {
    fn default() -> Self {
        Self::new(1920, 1080, 7)
    }
}

/// Maps a unit of work to a grid coordinate.
pub trait CoordinateAxes {
    /// Which axes this is.
    const KIND: AxesKind;

    /// Coordinate of `unit` within a picture of `geometry`.
    fn coordinate(unit: &WorkUnit, geometry: &PictureGeometry) -> Coord;

    /// Grid extents covering every coordinate of a picture of `geometry`.
    fn extents(geometry: &PictureGeometry) -> GridExtents;
}

/// Picture type only: `(inter_flag, 0, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PicTypeAxes;

impl CoordinateAxes for PicTypeAxes {
    const KIND: AxesKind = AxesKind::PicTypes;

    #[inline]
    fn coordinate(unit: &WorkUnit, _geometry: &PictureGeometry) -> Coord {
        Coord::new(unit.inter_flag(), 0, 0)
    }

    fn extents(_geometry: &PictureGeometry) -> GridExtents {
        GridExtents::new(2, 1, 1)
    }
}

/// CTU position within the picture: `(ctu_x, ctu_y, inter_flag)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtuPositionAxes;

impl CoordinateAxes for CtuPositionAxes {
    const KIND: AxesKind = AxesKind::CtusInPic;

    #[inline]
    fn coordinate(unit: &WorkUnit, geometry: &PictureGeometry) -> Coord {
        Coord::new(
            geometry.ctu_index(unit.x),
            geometry.ctu_index(unit.y),
            unit.inter_flag(),
        )
    }

    fn extents(geometry: &PictureGeometry) -> GridExtents {
        GridExtents::new(geometry.ctus_wide(), geometry.ctus_high(), 2)
    }
}

/// Block shape: `(log2(width), log2(height), inter_flag)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockShapeAxes;

impl CoordinateAxes for BlockShapeAxes {
    const KIND: AxesKind = AxesKind::CuShapes;

    #[inline]
    fn coordinate(unit: &WorkUnit, _geometry: &PictureGeometry) -> Coord {
        Coord::new(
            unit.width.max(1).ilog2(),
            unit.height.max(1).ilog2(),
            unit.inter_flag(),
        )
    }

    fn extents(geometry: &PictureGeometry) -> GridExtents {
        let n = geometry.ctu_size_log2.saturating_add(1);
        GridExtents::new(n, n, 2)
    }
}

/// The axes picked by the `axes-*` features.
///
/// Precedence when several are enabled: pic-types, then ctus-in-pic, then
/// cu-shapes. With none enabled this is [`PicTypeAxes`].
#[cfg(any(
    feature = "axes-pic-types",
    not(any(feature = "axes-ctus-in-pic", feature = "axes-cu-shapes"))
))]
pub type SelectedAxes = PicTypeAxes;

#[cfg(all(feature = "axes-ctus-in-pic", not(feature = "axes-pic-types")))]
pub type SelectedAxes = CtuPositionAxes;

#[cfg(all(
    feature = "axes-cu-shapes",
    not(any(feature = "axes-pic-types", feature = "axes-ctus-in-pic"))
))]
pub type SelectedAxes = BlockShapeAxes;

/// Run-time name of a [`CoordinateAxes`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxesKind {
    PicTypes,
    CtusInPic,
    CuShapes,
}

impl AxesKind {
    /// The kind of [`SelectedAxes`].
    pub const SELECTED: AxesKind = <SelectedAxes as CoordinateAxes>::KIND;

    pub fn as_str(self) -> &'static str {
        match self {
            AxesKind::PicTypes => "pic-types",
            AxesKind::CtusInPic => "ctus-in-pic",
            AxesKind::CuShapes => "cu-shapes",
        }
    }

    /// Grid extents these axes need for `geometry`.
    pub fn extents(self, geometry: &PictureGeometry) -> GridExtents {
        match self {
            AxesKind::PicTypes => PicTypeAxes::extents(geometry),
            AxesKind::CtusInPic => CtuPositionAxes::extents(geometry),
            AxesKind::CuShapes => BlockShapeAxes::extents(geometry),
        }
    }
}

impl Default for AxesKind {
    fn default() -> Self {
        Self::SELECTED
    }
}

impl fmt::Display for AxesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxesKind {
    type Err = ProfilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pic-types" => Ok(AxesKind::PicTypes),
            "ctus-in-pic" => Ok(AxesKind::CtusInPic),
            "cu-shapes" => Ok(AxesKind::CuShapes),
            other => Err(ProfilerError::InvalidMode(other.to_string())),
        }
    }
}
