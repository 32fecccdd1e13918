//! Word-packed dense storage: eight octets per u64 word. XOR-heavy row
//! algebra runs a word at a time; scalar-weighted work unpacks through the
//! byte lanes.

use alloc::vec::Vec;
use rq_core::{RqError, RqResult};
use rq_math::Octet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedMatrix {
    rows: usize,
    cols: usize,
    words_per_row: usize,
    data: Vec<u64>,
}

impl PackedMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        let words_per_row = cols.div_ceil(8);
        Self {
            rows,
            cols,
            words_per_row,
            data: alloc::vec![0u64; rows * words_per_row],
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

    #[inline(always)]
    fn lane(c: usize) -> u32 {
        ((c % 8) * 8) as u32
    }

    pub fn get(&self, r: usize, c: usize) -> RqResult<Octet> {
        self.check(r, c)?;
        let word = self.data[r * self.words_per_row + c / 8];
        Ok(Octet((word >> Self::lane(c)) as u8))
    }

    pub fn set(&mut self, r: usize, c: usize, v: Octet) -> RqResult<()> {
        self.check(r, c)?;
        let word = &mut self.data[r * self.words_per_row + c / 8];
        let lane = Self::lane(c);
        *word = (*word & !(0xFFu64 << lane)) | ((v.0 as u64) << lane);
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RqResult<()> {
        if a >= self.rows || b >= self.rows {
            return Err(RqError::IndexOutOfRange);
        }
        if a == b {
            return Ok(());
        }
        let w = self.words_per_row;
        for i in 0..w {
            self.data.swap(a * w + i, b * w + i);
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
        for r in 0..self.rows {
            let va = self.get(r, a)?;
            let vb = self.get(r, b)?;
            self.set(r, a, vb)?;
            self.set(r, b, va)?;
        }
        Ok(())
    }

    /// dest += factor * src over columns [from, to). A unit factor over the
    /// full width collapses to whole-word XOR; padding lanes stay zero on
    /// both sides, so they never pollute the result.
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
        if factor == Octet::ZERO || from == to {
            return Ok(());
        }
        let w = self.words_per_row;
        if factor == Octet::ONE && from == 0 && to == self.cols {
            let (d, s) = if dest < src {
                let (head, tail) = self.data.split_at_mut(src * w);
                (&mut head[dest * w..(dest + 1) * w], &tail[..w])
            } else {
                let (head, tail) = self.data.split_at_mut(dest * w);
                (&mut tail[..w], &head[src * w..(src + 1) * w])
            };
            for (p, q) in d.iter_mut().zip(s.iter()) {
                *p ^= *q;
            }
            return Ok(());
        }
        for c in from..to {
            let s = self.get(src, c)?;
            if s != Octet::ZERO {
                let d = self.get(dest, c)?;
                self.set(dest, c, d.add(s.mul(factor)))?;
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
        if inv == Octet::ONE {
            return Ok(());
        }
        for c in from..to {
            let v = self.get(r, c)?;
            if v != Octet::ZERO {
                self.set(r, c, v.mul(inv))?;
            }
        }
        Ok(())
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        let mut next = PackedMatrix::new(rows, cols);
        for r in 0..rows.min(self.rows) {
            for c in 0..cols.min(self.cols) {
                // In-bounds by construction on both sides.
                let v = self.get(r, c).unwrap_or(Octet::ZERO);
                let _ = next.set(r, c, v);
            }
        }
        *self = next;
    }
}
