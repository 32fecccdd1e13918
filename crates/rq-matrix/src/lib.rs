#![no_std]
#![forbid(unsafe_code)]

//! Byte matrices and vectors over GF(256).
//!
//! Five storage layouts share one operation contract; a factory picks the
//! layout from an expected-density hint. Results are layout-independent;
//! only memory behavior differs.

extern crate alloc;

pub mod dense;
pub mod packed;
pub mod sparse;
pub mod vector;

pub use dense::{FlatMatrix, RowsMatrix};
pub use packed::PackedMatrix;
pub use sparse::{CcsMatrix, CrsMatrix, SparseRow};
pub use vector::ByteVector;

use alloc::vec::Vec;
use rq_core::{RqError, RqResult};
use rq_math::Octet;

/// Storage layout tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Contiguous row-major backing.
    Dense1D,
    /// One heap vec per row.
    Dense2D,
    /// Eight octets per u64 word.
    Packed2D,
    /// Compressed rows.
    Crs,
    /// Compressed columns.
    Ccs,
}

/// A GF(256) matrix in one of five layouts.
#[derive(Debug, Clone)]
pub enum ByteMatrix {
    Dense1D(FlatMatrix),
    Dense2D(RowsMatrix),
    Packed2D(PackedMatrix),
    Crs(CrsMatrix),
    Ccs(CcsMatrix),
}

impl ByteMatrix {
    pub fn new(layout: Layout, rows: usize, cols: usize) -> Self {
        match layout {
            Layout::Dense1D => Self::Dense1D(FlatMatrix::new(rows, cols)),
            Layout::Dense2D => Self::Dense2D(RowsMatrix::new(rows, cols)),
            Layout::Packed2D => Self::Packed2D(PackedMatrix::new(rows, cols)),
            Layout::Crs => Self::Crs(CrsMatrix::new(rows, cols)),
            Layout::Ccs => Self::Ccs(CcsMatrix::new(rows, cols)),
        }
    }

    /// Factory: pick a layout from the expected number of non-zero entries.
    /// Below one entry in eight the compressed-row form wins; above it the
    /// flat dense form does.
    pub fn with_density(rows: usize, cols: usize, nonzero_estimate: usize) -> Self {
        let cells = rows.saturating_mul(cols);
        if nonzero_estimate.saturating_mul(8) < cells {
            Self::new(Layout::Crs, rows, cols)
        } else {
            Self::new(Layout::Dense1D, rows, cols)
        }
    }

    pub fn identity(layout: Layout, n: usize) -> Self {
        let mut m = Self::new(layout, n, n);
        for i in 0..n {
            // In-bounds by construction.
            let _ = m.set(i, i, Octet::ONE);
        }
        m
    }

    pub fn layout(&self) -> Layout {
        match self {
            Self::Dense1D(_) => Layout::Dense1D,
            Self::Dense2D(_) => Layout::Dense2D,
            Self::Packed2D(_) => Layout::Packed2D,
            Self::Crs(_) => Layout::Crs,
            Self::Ccs(_) => Layout::Ccs,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Self::Dense1D(m) => m.rows(),
            Self::Dense2D(m) => m.rows(),
            Self::Packed2D(m) => m.rows(),
            Self::Crs(m) => m.rows(),
            Self::Ccs(m) => m.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            Self::Dense1D(m) => m.cols(),
            Self::Dense2D(m) => m.cols(),
            Self::Packed2D(m) => m.cols(),
            Self::Crs(m) => m.cols(),
            Self::Ccs(m) => m.cols(),
        }
    }

    pub fn get(&self, r: usize, c: usize) -> RqResult<Octet> {
        match self {
            Self::Dense1D(m) => m.get(r, c),
            Self::Dense2D(m) => m.get(r, c),
            Self::Packed2D(m) => m.get(r, c),
            Self::Crs(m) => m.get(r, c),
            Self::Ccs(m) => m.get(r, c),
        }
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        match self {
            Self::Dense1D(m) => m.set(r, c, v),
            Self::Dense2D(m) => m.set(r, c, v),
            Self::Packed2D(m) => m.set(r, c, v),
            Self::Crs(m) => m.set(r, c, v),
            Self::Ccs(m) => m.set(r, c, v),
        }
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        match self {
            Self::Dense1D(m) => m.swap_rows(a, b),
            Self::Dense2D(m) => m.swap_rows(a, b),
            Self::Packed2D(m) => m.swap_rows(a, b),
            Self::Crs(m) => m.swap_rows(a, b),
            Self::Ccs(m) => m.swap_rows(a, b),
        }
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> RqResult<()> {
        match self {
            Self::Dense1D(m) => m.swap_columns(a, b),
            Self::Dense2D(m) => m.swap_columns(a, b),
            Self::Packed2D(m) => m.swap_columns(a, b),
            Self::Crs(m) => m.swap_columns(a, b),
            Self::Ccs(m) => m.swap_columns(a, b),
        }
    }

    /// dest += factor * src over columns [from, to).
    pub fn add_rows(
        &mut self,
        dest: usize,
        src: usize,
        factor: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        match self {
            Self::Dense1D(m) => m.add_rows(dest, src, factor, from, to),
            Self::Dense2D(m) => m.add_rows(dest, src, factor, from, to),
            Self::Packed2D(m) => m.add_rows(dest, src, factor, from, to),
            Self::Crs(m) => m.add_rows(dest, src, factor, from, to),
            Self::Ccs(m) => m.add_rows(dest, src, factor, from, to),
        }
    }

    pub fn divide_row(
        &mut self,
        r: usize,
        scalar: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        match self {
            Self::Dense1D(m) => m.divide_row(r, scalar, from, to),
            Self::Dense2D(m) => m.divide_row(r, scalar, from, to),
            Self::Packed2D(m) => m.divide_row(r, scalar, from, to),
            Self::Crs(m) => m.divide_row(r, scalar, from, to),
            Self::Ccs(m) => m.divide_row(r, scalar, from, to),
        }
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        match self {
            Self::Dense1D(m) => m.resize(rows, cols),
            Self::Dense2D(m) => m.resize(rows, cols),
            Self::Packed2D(m) => m.resize(rows, cols),
            Self::Crs(m) => m.resize(rows, cols),
            Self::Ccs(m) => m.resize(rows, cols),
        }
    }

    /// Non-zero (index, value) pairs of one row over [from, to), ascending.
    pub fn nonzeros_in_row(
        &self,
        r: usize,
        from: usize,
        to: usize,
    ) -> RqResult<Vec<(usize, Octet)>> {
        if r >= self.rows() || from > to || to > self.cols() {
            return Err(RqError::IndexOutOfRange);
        }
        match self {
            Self::Dense1D(m) => m.nonzeros_in_row(r, from, to),
            Self::Crs(m) => Ok(m.row_ref(r)?.nonzeros(from, to).collect()),
            _ => {
                let mut out = Vec::new();
                for c in from..to {
                    let v = self.get(r, c)?;
                    if v != Octet::ZERO {
                        out.push((c, v));
                    }
                }
                Ok(out)
            }
        }
    }

    pub fn count_row_nonzeros(&self, r: usize, from: usize, to: usize) -> RqResult<usize> {
        if r >= self.rows() || from > to || to > self.cols() {
            return Err(RqError::IndexOutOfRange);
        }
        match self {
            Self::Dense1D(m) => m.count_row_nonzeros(r, from, to),
            Self::Crs(m) => Ok(m.row_ref(r)?.count_nonzeros(from, to)),
            _ => Ok(self.nonzeros_in_row(r, from, to)?.len()),
        }
    }

    /// Deep copy of one row, in the matching vector flavor.
    pub fn row(&self, r: usize) -> RqResult<ByteVector> {
        match self {
            Self::Dense1D(m) => m.row_vector(r),
            Self::Dense2D(m) => Ok(ByteVector::from_bytes(m.row(r)?)),
            Self::Crs(m) => m.row(r),
            Self::Ccs(m) => m.row(r),
            Self::Packed2D(_) => {
                if r >= self.rows() {
                    return Err(RqError::IndexOutOfRange);
                }
                let mut out = ByteVector::dense(self.cols());
                for c in 0..self.cols() {
                    out.set(c, self.get(r, c)?)?;
                }
                Ok(out)
            }
        }
    }

    /// Deep copy of one column.
    pub fn column(&self, c: usize) -> RqResult<ByteVector> {
        match self {
            Self::Dense1D(m) => m.column_vector(c),
            Self::Crs(m) => m.column(c),
            Self::Ccs(m) => m.column(c),
            _ => {
                if c >= self.cols() {
                    return Err(RqError::IndexOutOfRange);
                }
                let mut out = ByteVector::dense(self.rows());
                for r in 0..self.rows() {
                    out.set(r, self.get(r, c)?)?;
                }
                Ok(out)
            }
        }
    }

    /// Compose a matrix from a grid of blocks. Every row of blocks must
    /// agree on height, every column of blocks on width, and the grid must
    /// be rectangular; anything else is a DimensionMismatch.
    pub fn from_blocks(layout: Layout, grid: &[&[&ByteMatrix]]) -> RqResult<Self> {
        if grid.is_empty() || grid[0].is_empty() {
            return Err(RqError::DimensionMismatch);
        }
        let block_cols = grid[0].len();
        let mut total_rows = 0;
        let mut total_cols = 0;
        for (bi, band) in grid.iter().enumerate() {
            if band.len() != block_cols {
                return Err(RqError::DimensionMismatch);
            }
            let height = band[0].rows();
            let mut band_cols = 0;
            for (bj, block) in band.iter().enumerate() {
                if block.rows() != height {
                    return Err(RqError::DimensionMismatch);
                }
                if bi > 0 && block.cols() != grid[0][bj].cols() {
                    return Err(RqError::DimensionMismatch);
                }
                band_cols += block.cols();
            }
            if bi == 0 {
                total_cols = band_cols;
            }
            total_rows += height;
        }

        let mut out = Self::new(layout, total_rows, total_cols);
        let mut row_base = 0;
        for band in grid {
            let mut col_base = 0;
            for block in band.iter() {
                for r in 0..block.rows() {
                    for (c, v) in block.nonzeros_in_row(r, 0, block.cols())? {
                        out.set(row_base + r, col_base + c, v)?;
                    }
                }
                col_base += block.cols();
            }
            row_base += grid_band_height(band);
        }
        Ok(out)
    }

    /// y = A * x over GF(256).
    pub fn mul_vec(&self, x: &ByteVector) -> RqResult<ByteVector> {
        if x.len() != self.cols() {
            return Err(RqError::DimensionMismatch);
        }
        let mut y = ByteVector::dense(self.rows());
        for r in 0..self.rows() {
            let mut acc = Octet::ZERO;
            for (c, v) in self.nonzeros_in_row(r, 0, self.cols())? {
                acc = acc.add(v.mul(x.get(c)?));
            }
            y.set(r, acc)?;
        }
        Ok(y)
    }

    /// Flatten into the contiguous dense layout.
    pub fn to_flat(&self) -> FlatMatrix {
        match self {
            Self::Dense1D(m) => m.clone(),
            _ => {
                let mut out = FlatMatrix::new(self.rows(), self.cols());
                for r in 0..self.rows() {
                    for (c, v) in self
                        .nonzeros_in_row(r, 0, self.cols())
                        .unwrap_or_default()
                    {
                        let _ = out.set(r, c, v);
                    }
                }
                out
            }
        }
    }

    /// Matrix product. Sparse x sparse walks non-zeros and yields a
    /// compressed result; anything dense goes through the blocked dense path.
    pub fn mul(&self, rhs: &ByteMatrix) -> RqResult<ByteMatrix> {
        if self.cols() != rhs.rows() {
            return Err(RqError::DimensionMismatch);
        }
        let sparse_pair = matches!(self, Self::Crs(_) | Self::Ccs(_))
            && matches!(rhs, Self::Crs(_) | Self::Ccs(_));
        if sparse_pair {
            let mut out = CrsMatrix::new(self.rows(), rhs.cols());
            for i in 0..self.rows() {
                for (k, a) in self.nonzeros_in_row(i, 0, self.cols())? {
                    for (j, b) in rhs.nonzeros_in_row(k, 0, rhs.cols())? {
                        let cur = out.get(i, j)?;
                        out.set(i, j, cur.add(a.mul(b)))?;
                    }
                }
            }
            return Ok(Self::Crs(out));
        }
        Ok(Self::Dense1D(self.to_flat().mul(&rhs.to_flat())?))
    }
}

fn grid_band_height(band: &[&ByteMatrix]) -> usize {
    band[0].rows()
}

/// Layout-independent logical equality.
impl PartialEq for ByteMatrix {
    fn eq(&self, other: &Self) -> bool {
        if self.rows() != other.rows() || self.cols() != other.cols() {
            return false;
        }
        self.to_flat() == other.to_flat()
    }
}
