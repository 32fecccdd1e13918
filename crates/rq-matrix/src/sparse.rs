//! Compressed sparse storage: one `SparseRow` per matrix row (CRS) or per
//! matrix column (CCS).
//!
//! Invariants: index arrays are strictly ascending and a zero value is never
//! stored. An empty row is `Vec::new()` twice over, which allocates nothing,
//! so untouched rows stay free until first written.

use alloc::vec::Vec;
use rq_core::{RqError, RqResult};
use rq_math::Octet;

use crate::vector::ByteVector;

/// Index/value pairs in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseRow {
    idx: Vec<u32>,
    val: Vec<u8>,
}

impl SparseRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored (non-zero) entries.
    pub fn cardinality(&self) -> usize {
        self.idx.len()
    }

    pub fn get(&self, i: usize) -> Octet {
        let pos = self.idx.partition_point(|&x| (x as usize) < i);
        if pos < self.idx.len() && self.idx[pos] as usize == i {
            Octet(self.val[pos])
        } else {
            Octet::ZERO
        }
    }

    /// Setting zero removes the entry.
    pub fn set(&mut self, i: usize, v: Octet) {
        let pos = self.idx.partition_point(|&x| (x as usize) < i);
        let found = pos < self.idx.len() && self.idx[pos] as usize == i;
        if v == Octet::ZERO {
            if found {
                self.idx.remove(pos);
                self.val.remove(pos);
            }
        } else if found {
            self.val[pos] = v.0;
        } else {
            self.idx.insert(pos, i as u32);
            self.val.insert(pos, v.0);
        }
    }

    fn range_bounds(&self, from: usize, to: usize) -> (usize, usize) {
        let lo = self.idx.partition_point(|&x| (x as usize) < from);
        let hi = self.idx.partition_point(|&x| (x as usize) < to);
        (lo, hi)
    }

    /// Stored entries with index in [from, to), ascending.
    pub fn nonzeros(&self, from: usize, to: usize) -> NonZeroIter<'_> {
        let (lo, hi) = self.range_bounds(from, to);
        NonZeroIter {
            idx: &self.idx[lo..hi],
            val: &self.val[lo..hi],
            pos: 0,
        }
    }

    pub fn count_nonzeros(&self, from: usize, to: usize) -> usize {
        let (lo, hi) = self.range_bounds(from, to);
        hi - lo
    }

    /// self += factor * other, restricted to indices in [from, to).
    /// Entries of self outside the range are untouched.
    pub fn add_scaled(&mut self, other: &SparseRow, factor: Octet, from: usize, to: usize) {
        if factor == Octet::ZERO {
            return;
        }
        let (olo, ohi) = other.range_bounds(from, to);
        if olo == ohi {
            return;
        }
        let mut idx = Vec::with_capacity(self.idx.len() + (ohi - olo));
        let mut val = Vec::with_capacity(self.idx.len() + (ohi - olo));
        let mut i = 0;
        let mut j = olo;
        while i < self.idx.len() || j < ohi {
            let si = if i < self.idx.len() { self.idx[i] as u64 } else { u64::MAX };
            let oj = if j < ohi { other.idx[j] as u64 } else { u64::MAX };
            if si < oj {
                idx.push(self.idx[i]);
                val.push(self.val[i]);
                i += 1;
            } else if oj < si {
                let v = Octet(other.val[j]).mul(factor);
                if v != Octet::ZERO {
                    idx.push(other.idx[j]);
                    val.push(v.0);
                }
                j += 1;
            } else {
                let v = Octet(self.val[i]).add(Octet(other.val[j]).mul(factor));
                if v != Octet::ZERO {
                    idx.push(self.idx[i]);
                    val.push(v.0);
                }
                i += 1;
                j += 1;
            }
        }
        self.idx = idx;
        self.val = val;
    }

    /// Multiply entries in [from, to) by factor. Factor zero drops the range.
    pub fn scale(&mut self, factor: Octet, from: usize, to: usize) {
        let (lo, hi) = self.range_bounds(from, to);
        if factor == Octet::ZERO {
            self.idx.drain(lo..hi);
            self.val.drain(lo..hi);
            return;
        }
        // Non-zero times non-zero never vanishes in a field.
        for v in &mut self.val[lo..hi] {
            *v = Octet(*v).mul(factor).0;
        }
    }

    /// Exchange the values stored at indices a and b.
    pub fn swap_indices(&mut self, a: usize, b: usize) {
        let va = self.get(a);
        let vb = self.get(b);
        if va != vb {
            self.set(a, vb);
            self.set(b, va);
        }
    }

    /// Drop entries at or past new_len.
    pub fn truncate_to(&mut self, new_len: usize) {
        let cut = self.idx.partition_point(|&x| (x as usize) < new_len);
        self.idx.truncate(cut);
        self.val.truncate(cut);
    }
}

pub struct NonZeroIter<'a> {
    idx: &'a [u32],
    val: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for NonZeroIter<'a> {
    type Item = (usize, Octet);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.idx.len() {
            let out = (self.idx[self.pos] as usize, Octet(self.val[self.pos]));
            self.pos += 1;
            Some(out)
        } else {
            None
        }
    }
}

/// Compressed-row matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrsMatrix {
    rows: usize,
    cols: usize,
    data: Vec<SparseRow>,
}

impl CrsMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut data = Vec::with_capacity(rows);
        data.resize_with(rows, SparseRow::new);
        Self { rows, cols, data }
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
        Ok(self.data[r].get(c))
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        self.check(r, c)?;
        self.data[r].set(c, v);
        Ok(())
    }

    pub fn row_ref(&self, r: usize) -> RqResult<&SparseRow> {
        if r >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(&self.data[r])
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.rows || b >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        self.data.swap(a, b);
        Ok(())
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.cols || b >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        if a == b {
            return Ok(());
        }
        for row in &mut self.data {
            row.swap_indices(a, b);
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
        if dest >= self.rows || src >= self.rows || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        if dest == src {
            return Err(RqError::InvalidState);
        }
        let src_row = self.data[src].clone();
        self.data[dest].add_scaled(&src_row, factor, from, to);
        Ok(())
    }

    pub fn divide_row(
        &mut self,
        r: usize,
        scalar: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        if r >= self.rows || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let inv = scalar.inv()?;
        self.data[r].scale(inv, from, to);
        Ok(())
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.data.resize_with(rows, SparseRow::new);
        if cols < self.cols {
            for row in &mut self.data {
                row.truncate_to(cols);
            }
        }
        self.rows = rows;
        self.cols = cols;
    }

    pub fn row(&self, r: usize) -> RqResult<ByteVector> {
        if r >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        let mut out = ByteVector::sparse(self.cols);
        for (i, v) in self.data[r].nonzeros(0, self.cols) {
            out.set(i, v)?;
        }
        Ok(out)
    }

    pub fn column(&self, c: usize) -> RqResult<ByteVector> {
        if c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let mut out = ByteVector::sparse(self.rows);
        for r in 0..self.rows {
            let v = self.data[r].get(c);
            if v != Octet::ZERO {
                out.set(r, v)?;
            }
        }
        Ok(out)
    }
}

/// Compressed-column matrix. Row-oriented operations walk every column and
/// are the slow direction; column swaps and column reads are cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CcsMatrix {
    rows: usize,
    cols: usize,
    data: Vec<SparseRow>, // one per column, indexed by row
}

impl CcsMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut data = Vec::with_capacity(cols);
        data.resize_with(cols, SparseRow::new);
        Self { rows, cols, data }
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
        Ok(self.data[c].get(r))
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        self.check(r, c)?;
        self.data[c].set(r, v);
        Ok(())
    }

    pub fn column_ref(&self, c: usize) -> RqResult<&SparseRow> {
        if c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(&self.data[c])
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.rows || b >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        if a == b {
            return Ok(());
        }
        for col in &mut self.data {
            col.swap_indices(a, b);
        }
        Ok(())
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.cols || b >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        self.data.swap(a, b);
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
        if dest >= self.rows || src >= self.rows || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        if dest == src {
            return Err(RqError::InvalidState);
        }
        if factor == Octet::ZERO {
            return Ok(());
        }
        for col in &mut self.data[from..to] {
            let s = col.get(src);
            if s != Octet::ZERO {
                let d = col.get(dest);
                col.set(dest, d.add(s.mul(factor)));
            }
        }
        Ok(())
    }

    pub fn divide_row(
        &mut self,
        r: usize,
        scalar: Octet,
        from: usize,
        to: usize,
    ) -> RqResult<()> {
        if r >= self.rows || from > to || to > self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let inv = scalar.inv()?;
        for col in &mut self.data[from..to] {
            let v = col.get(r);
            if v != Octet::ZERO {
                col.set(r, v.mul(inv));
            }
        }
        Ok(())
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.data.resize_with(cols, SparseRow::new);
        if rows < self.rows {
            for col in &mut self.data {
                col.truncate_to(rows);
            }
        }
        self.rows = rows;
        self.cols = cols;
    }

    pub fn row(&self, r: usize) -> RqResult<ByteVector> {
        if r >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        let mut out = ByteVector::sparse(self.cols);
        for c in 0..self.cols {
            let v = self.data[c].get(r);
            if v != Octet::ZERO {
                out.set(c, v)?;
            }
        }
        Ok(out)
    }

    pub fn column(&self, c: usize) -> RqResult<ByteVector> {
        if c >= self.cols {
            return Err(RqError::IndexOutOfRange);
        }
        let mut out = ByteVector::sparse(self.rows);
        for (r, v) in self.data[c].nonzeros(0, self.rows) {
            out.set(r, v)?;
        }
        Ok(out)
    }
}
