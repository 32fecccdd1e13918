//! Dense storage: one contiguous backing (`FlatMatrix`) and a row-per-vec
//! variant (`RowsMatrix`). Both lean on the bulk field kernels for row algebra.

use alloc::vec::Vec;
use rq_core::{RqError, RqResult};
use rq_math::{add_assign, fused_add_mul, mul_assign_scalar, Octet};
use zeroize::Zeroize;

use crate::vector::ByteVector;

/// Row-major flat backing. Index math only, no per-row indirection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Zeroize)]
pub struct FlatMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl FlatMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: alloc::vec![0u8; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn check(&self, r: usize, c: usize) -> RqResult<()> {
        if r >= self.rows || c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(())
    }

    pub fn get(&self, r: usize, c: usize) -> RqResult<Octet> {
        self.check(r, c)?;
        Ok(Octet(self.data[r * self.cols + c]))
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        self.check(r, c)?;
        self.data[r * self.cols + c] = v.0;
        Ok(())
    }

    pub fn row(&self, r: usize) -> RqResult<&[u8]> {
        if r >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(&self.data[r * self.cols..(r + 1) * self.cols])
    }

    pub fn row_mut(&mut self, r: usize) -> RqResult<&mut [u8]> {
        if r >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(&mut self.data[r * self.cols..(r + 1) * self.cols])
    }

    /// Disjoint (dest, src) row borrows for in-place row algebra.
    fn two_rows_mut(&mut self, dest: usize, src: usize) -> RqResult<(&mut [u8], &[u8])> {
        if dest >= self.rows || src >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        if dest == src {
            return Err(RqError::InvalidState);
        }
        let c = self.cols;
        if dest < src {
            let (head, tail) = self.data.split_at_mut(src * c);
            Ok((&mut head[dest * c..(dest + 1) * c], &tail[..c]))
        } else {
            let (head, tail) = self.data.split_at_mut(dest * c);
            Ok((&mut tail[..c], &head[src * c..(src + 1) * c]))
        }
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.rows || b >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        if a == b {
            return Ok(());
        }
        let c = self.cols;
        for col in 0..c {
            self.data.swap(a * c + col, b * c + col);
        }
        Ok(())
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.cols || b >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        if a == b {
            return Ok(());
        }
        let c = self.cols;
        for r in 0..self.rows {
            self.data.swap(r * c + a, r * c + b);
        }
        Ok(())
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
        if from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let (d, s) = self.two_rows_mut(dest, src)?;
        fused_add_mul(&mut d[from..to], &s[from..to], factor);
        Ok(())
    }

    /// dest ^= src over the full width. The multiplier-free hot path.
    pub fn xor_rows(&mut self, dest: usize, src: usize) -> RqResult<()> {
        let (d, s) = self.two_rows_mut(dest, src)?;
        add_assign(d, s);
        Ok(())
    }

    pub fn divide_row(
        &mut self,
        r: usize,
        scalar: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        if from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let inv = scalar.inv()?;
        let row = self.row_mut(r)?;
        mul_assign_scalar(&mut row[from..to], inv);
        Ok(())
    }

    /// Preserves the overlapping region, zero-fills the rest.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let mut next = alloc::vec![0u8; rows * cols];
        let keep_r = rows.min(self.rows);
        let keep_c = cols.min(self.cols);
        for r in 0..keep_r {
            next[r * cols..r * cols + keep_c]
                .copy_from_slice(&self.data[r * self.cols..r * self.cols + keep_c]);
        }
        self.data = next;
        self.rows = rows;
        self.cols = cols;
    }

    pub fn nonzeros_in_row(
        &self,
        r: usize,
        from: usize,
        to: usize,
    ) -> RqResult<Vec<(usize, Octet)>> {
        if from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let row = self.row(r)?;
        Ok(row[from..to]
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, &v)| (from + i, Octet(v)))
            .collect())
    }

    pub fn count_row_nonzeros(&self, r: usize, from: usize, to: usize) -> RqResult<usize> {
        if from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let row = self.row(r)?;
        Ok(row[from..to].iter().filter(|&&v| v != 0).count())
    }

    pub fn row_vector(&self, r: usize) -> RqResult<ByteVector> {
        Ok(ByteVector::from_bytes(self.row(r)?))
    }

    pub fn column_vector(&self, c: usize) -> RqResult<ByteVector> {
        if c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let mut out = ByteVector::dense(self.rows);
        for r in 0..self.rows {
            out.set(r, Octet(self.data[r * self.cols + c]))?;
        }
        Ok(out)
    }

    /// Cache-blocked product, 64x64 tiles, SAXPY inner form.
    pub fn mul(&self, rhs: &FlatMatrix) -> RqResult<FlatMatrix> {
        if self.cols != rhs.rows {
            return Err(RqError::DimensionMismatch);
        }
        const TILE: usize = 64;
        let mut out = FlatMatrix::new(self.rows, rhs.cols);
        let mut i0 = 0;
        while i0 < self.rows {
            let i1 = (i0 + TILE).min(self.rows);
            let mut k0 = 0;
            while k0 < self.cols {
                let k1 = (k0 + TILE).min(self.cols);
                let mut j0 = 0;
                while j0 < rhs.cols {
                    let j1 = (j0 + TILE).min(rhs.cols);
                    for i in i0..i1 {
                        for k in k0..k1 {
                            let a = self.data[i * self.cols + k];
                            if a != 0 {
                                let dst = &mut out.data[i * rhs.cols + j0..i * rhs.cols + j1];
                                let src = &rhs.data[k * rhs.cols + j0..k * rhs.cols + j1];
                                fused_add_mul(dst, src, Octet(a));
                            }
                        }
                    }
                    j0 = j1;
                }
                k0 = k1;
            }
            i0 = i1;
        }
        Ok(out)
    }
}

/// One heap vec per row. Same contract as `FlatMatrix`, different locality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowsMatrix {
    cols: usize,
    data: Vec<Vec<u8>>,
}

impl RowsMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut data = Vec::with_capacity(rows);
        data.resize_with(rows, || alloc::vec![0u8; cols]);
        Self { cols, data }
    }

    pub fn rows(&self) -> usize {
        self.data.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> RqResult<Octet> {
        if r >= self.data.len() || c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(Octet(self.data[r][c]))
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        if r >= self.data.len() || c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        self.data[r][c] = v.0;
        Ok(())
    }

    pub fn row(&self, r: usize) -> RqResult<&[u8]> {
        if r >= self.data.len() {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(&self.data[r])
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.data.len() || b >= self.data.len() {
            return Err(RqError::IndexOutOfRange);
        }
        self.data.swap(a, b);
        Ok(())
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.cols || b >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        for row in &mut self.data {
            row.swap(a, b);
        }
        Ok(())
    }

    pub fn add_rows(
        &mut self,
        dest: usize,
        src: usize,
        factor: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        if dest >= self.data.len() || src >= self.data.len() || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        if dest == src {
            return Err(RqError::InvalidState);
        }
        let (d, s) = if dest < src {
            let (head, tail) = self.data.split_at_mut(src);
            (&mut head[dest], &tail[0])
        } else {
            let (head, tail) = self.data.split_at_mut(dest);
            (&mut tail[0], &head[src])
        };
        fused_add_mul(&mut d[from..to], &s[from..to], factor);
        Ok(())
    }

    pub fn divide_row(
        &mut self,
        r: usize,
        scalar: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        if r >= self.data.len() || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let inv = scalar.inv()?;
        mul_assign_scalar(&mut self.data[r][from..to], inv);
        Ok(())
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.data.resize_with(rows, || alloc::vec![0u8; cols]);
        if cols != self.cols {
            for row in &mut self.data {
                row.resize(cols, 0);
            }
            self.cols = cols;
        }
    }
}
