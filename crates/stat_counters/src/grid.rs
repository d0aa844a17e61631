//! Counter grids and named grid sets

use crate::error::{CounterError, CounterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{AddAssign, Index, IndexMut};

/// Values that can be accumulated in a counter grid.
pub trait CounterValue: Copy + Default + PartialEq + AddAssign {}

impl<T: Copy + Default + PartialEq + AddAssign> CounterValue for T {}

// =============================================================================
// Single grid
// =============================================================================

/// A dense `num_x × num_y` accumulation surface stored row-major.
///
/// Indexing with `grid[y]` yields row `y` as a slice, so a cell is
/// `grid[y][x]`. Out-of-range coordinates panic.
///
/// Deserialization rejects grids whose cell count does not match their
/// extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GridFields<T>")]
pub struct CounterGrid2D<T> {
    num_x: usize,
    num_y: usize,
    values: Vec<T>,
}

impl<T: CounterValue> CounterGrid2D<T> {
    /// Create a zeroed grid. Zero extents are raised to one.
    pub fn new(num_x: usize, num_y: usize) -> Self {
        let num_x = num_x.max(1);
        let num_y = num_y.max(1);
        Self {
            num_x,
            num_y,
            values: vec![T::default(); num_x * num_y],
        }
    }

    /// Number of columns.
    #[inline]
    pub fn num_x(&self) -> usize {
        self.num_x
    }

    /// Number of rows.
    #[inline]
    pub fn num_y(&self) -> usize {
        self.num_y
    }

    /// Add `value` to the cell at `(x, y)`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, value: T) {
        self[y][x] += value;
    }

    /// Read the cell at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self[y][x]
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.values.chunks(self.num_x)
    }

    /// All cells in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Sum of every cell.
    pub fn total(&self) -> T {
        self.values.iter().fold(T::default(), |mut acc, &v| {
            acc += v;
            acc
        })
    }

    /// Whether every cell still holds the default value.
    pub fn is_zero(&self) -> bool {
        let zero = T::default();
        self.values.iter().all(|v| *v == zero)
    }

    /// Add every cell of `other` into this grid.
    pub fn merge(&mut self, other: &Self) -> CounterResult<()> {
        if self.num_x != other.num_x || self.num_y != other.num_y {
            return Err(CounterError::ExtentMismatch {
                expected_x: self.num_x,
                expected_y: self.num_y,
                actual_x: other.num_x,
                actual_y: other.num_y,
            });
        }

        for (dst, src) in self.values.iter_mut().zip(&other.values) {
            *dst += *src;
        }
        Ok(())
    }

    /// Reset every cell to the default value.
    pub fn clear(&mut self) {
        self.values.fill(T::default());
    }
}

/// Unchecked wire form of [`CounterGrid2D`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridFields<T> {
    num_x: usize,
    num_y: usize,
    values: Vec<T>,
}

impl<T> TryFrom<GridFields<T>> for CounterGrid2D<T> {
    type Error = CounterError;

    fn try_from(fields: GridFields<T>) -> CounterResult<Self> {
        let GridFields {
            num_x,
            num_y,
            values,
        } = fields;

        let expected = num_x.checked_mul(num_y).filter(|&n| n > 0);
        if expected != Some(values.len()) {
            return Err(CounterError::CellCountMismatch {
                num_x,
                num_y,
                cells: values.len(),
            });
        }
        Ok(Self {
            num_x,
            num_y,
            values,
        })
    }
}

impl<T> Index<usize> for CounterGrid2D<T> {
    type Output = [T];

    #[inline]
    fn index(&self, y: usize) -> &[T] {
        let start = y * self.num_x;
        &self.values[start..start + self.num_x]
    }
}

impl<T> IndexMut<usize> for CounterGrid2D<T> {
    #[inline]
    fn index_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.num_x;
        &mut self.values[start..start + self.num_x]
    }
}

// =============================================================================
// Named grid set
// =============================================================================

/// One named [`CounterGrid2D`] per counter type, all with the same extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SetFields<T>")]
pub struct CounterGrid2DSet<T> {
    names: Vec<String>,
    grids: Vec<CounterGrid2D<T>>,
}

impl<T: CounterValue> CounterGrid2DSet<T> {
    /// Create a set with one zeroed `num_x × num_y` grid per name.
    pub fn new<I, N>(names: I, num_x: usize, num_y: usize) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let grids = names.iter().map(|_| CounterGrid2D::new(num_x, num_y)).collect();
        Self { names, grids }
    }

    /// Number of counter types (grids) in the set.
    #[inline]
    pub fn num_cnt_types(&self) -> usize {
        self.grids.len()
    }

    /// Extents `(num_x, num_y)` shared by every grid.
    pub fn extents(&self) -> (usize, usize) {
        self.grids
            .first()
            .map(|g| (g.num_x(), g.num_y()))
            .unwrap_or((0, 0))
    }

    /// Names of the counter types, in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of counter type `index`.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Grid of counter type `index`.
    pub fn grid(&self, index: usize) -> &CounterGrid2D<T> {
        &self.grids[index]
    }

    /// Mutable grid of counter type `index`.
    pub fn grid_mut(&mut self, index: usize) -> &mut CounterGrid2D<T> {
        &mut self.grids[index]
    }

    /// Iterate over `(name, grid)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CounterGrid2D<T>)> {
        self.names.iter().map(String::as_str).zip(&self.grids)
    }

    /// Sum of each grid, in index order.
    pub fn totals(&self) -> Vec<T> {
        self.grids.iter().map(CounterGrid2D::total).collect()
    }

    /// Add every grid of `other` into the matching grid of this set.
    pub fn merge(&mut self, other: &Self) -> CounterResult<()> {
        if self.grids.len() != other.grids.len() {
            return Err(CounterError::CounterTypeMismatch {
                expected: self.grids.len(),
                actual: other.grids.len(),
            });
        }
        if self.extents() != other.extents() {
            let (expected_x, expected_y) = self.extents();
            let (actual_x, actual_y) = other.extents();
            return Err(CounterError::ExtentMismatch {
                expected_x,
                expected_y,
                actual_x,
                actual_y,
            });
        }

        for (dst, src) in self.grids.iter_mut().zip(&other.grids) {
            dst.merge(src)?;
        }
        Ok(())
    }

    /// Reset every grid.
    pub fn clear(&mut self) {
        self.grids.iter_mut().for_each(CounterGrid2D::clear);
    }
}

/// Unchecked wire form of [`CounterGrid2DSet`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetFields<T> {
    names: Vec<String>,
    grids: Vec<CounterGrid2D<T>>,
}

impl<T> TryFrom<SetFields<T>> for CounterGrid2DSet<T> {
    type Error = CounterError;

    fn try_from(fields: SetFields<T>) -> CounterResult<Self> {
        let SetFields { names, grids } = fields;

        if names.len() != grids.len() {
            return Err(CounterError::NameCountMismatch {
                names: names.len(),
                grids: grids.len(),
            });
        }
        if let Some(first) = grids.first() {
            let (expected_x, expected_y) = (first.num_x, first.num_y);
            if let Some(odd) = grids
                .iter()
                .find(|g| g.num_x != expected_x || g.num_y != expected_y)
            {
                return Err(CounterError::ExtentMismatch {
                    expected_x,
                    expected_y,
                    actual_x: odd.num_x,
                    actual_y: odd.num_y,
                });
            }
        }
        Ok(Self { names, grids })
    }
}

impl<T> Index<usize> for CounterGrid2DSet<T> {
    type Output = CounterGrid2D<T>;

    #[inline]
    fn index(&self, index: usize) -> &CounterGrid2D<T> {
        &self.grids[index]
    }
}

impl<T> IndexMut<usize> for CounterGrid2DSet<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut CounterGrid2D<T> {
        &mut self.grids[index]
    }
}

/// Writes one line per row, each cell right-aligned in a 12-wide column.
///
/// The formatter's precision (e.g. `{:.1}`) is applied to each cell.
impl<T: CounterValue + fmt::Display> fmt::Display for CounterGrid2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(1);
        for row in self.rows() {
            for value in row {
                write!(f, "{:>12.*}", precision, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Writes every grid holding a nonzero cell as a titled block of rows.
///
/// The formatter's precision is passed on to each grid.
impl<T: CounterValue + fmt::Display> fmt::Display for CounterGrid2DSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(1);
        for (name, grid) in self.iter() {
            if grid.is_zero() {
                continue;
            }
            writeln!(f, "{}:", name)?;
            write!(f, "{:.*}", precision, grid)?;
        }
        Ok(())
    }
}
