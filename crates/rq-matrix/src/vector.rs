//! Vectors over GF(256), dense or sparse, sharing one contract.

use alloc::vec::Vec;
use rq_core::{RqError, RqResult};
use rq_math::{fused_add_mul, mul_assign_scalar, Octet};

use crate::sparse::SparseRow;

#[derive(Debug, Clone, PartialEq)]
pub enum ByteVector {
    Dense(Vec<u8>),
    Sparse { row: SparseRow, len: usize },
}

impl ByteVector {
    pub fn dense(len: usize) -> Self {
        Self::Dense(alloc::vec![0u8; len])
    }

    pub fn sparse(len: usize) -> Self {
        Self::Sparse {
            row: SparseRow::new(),
            len,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::Dense(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Dense(d) => d.len(),
            Self::Sparse { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored non-zero count; dense vectors scan.
    pub fn cardinality(&self) -> usize {
        match self {
            Self::Dense(d) => d.iter().filter(|&&v| v != 0).count(),
            Self::Sparse { row, .. } => row.cardinality(),
        }
    }

    pub fn get(&self, i: usize) -> RqResult<Octet> {
        if i >= self.len() {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(match self {
            Self::Dense(d) => Octet(d[i]),
            Self::Sparse { row, .. } => row.get(i),
        })
    }

    pub fn set(&mut self, i: usize, v: Octet) -> RqResult<()> {
        if i >= self.len() {
            return Err(RqError::IndexOutOfRange);
        }
        match self {
            Self::Dense(d) => d[i] = v.0,
            Self::Sparse { row, .. } => row.set(i, v),
        }
        Ok(())
    }

    /// (index, value) pairs in ascending index order, zero entries skipped.
    pub fn nonzeros(&self, from: usize, to: usize) -> RqResult<Vec<(usize, Octet)>> {
        if from > to || to > self.len() {
            return Err(RqError::IndexOutOfRange);
        }
        Ok(match self {
            Self::Dense(d) => d[from..to]
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != 0)
                .map(|(i, &v)| (from + i, Octet(v)))
                .collect(),
            Self::Sparse { row, .. } => row.nonzeros(from, to).collect(),
        })
    }

    /// self += factor * other.
    pub fn add_scaled(&mut self, other: &ByteVector, factor: Octet) -> RqResult<()> {
        if self.len() != other.len() {
            return Err(RqError::DimensionMismatch);
        }
        let n = self.len();
        match (self, other) {
            (Self::Dense(d), Self::Dense(s)) => fused_add_mul(d, s, factor),
            (Self::Sparse { row, .. }, Self::Sparse { row: o, .. }) => {
                row.add_scaled(o, factor, 0, n);
            }
            (me, other) => {
                for (i, v) in other.nonzeros(0, n)? {
                    let cur = me.get(i)?;
                    me.set(i, cur.add(v.mul(factor)))?;
                }
            }
        }
        Ok(())
    }

    pub fn scale(&mut self, factor: Octet) {
        let n = self.len();
        match self {
            Self::Dense(d) => mul_assign_scalar(d, factor),
            Self::Sparse { row, .. } => row.scale(factor, 0, n),
        }
    }

    /// Dot product over GF(256).
    pub fn dot(&self, other: &ByteVector) -> RqResult<Octet> {
        if self.len() != other.len() {
            return Err(RqError::DimensionMismatch);
        }
        let mut acc = Octet::ZERO;
        for (i, v) in self.nonzeros(0, self.len())? {
            acc = acc.add(v.mul(other.get(i)?));
        }
        Ok(acc)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Dense(d) => d.clone(),
            Self::Sparse { row, len } => {
                let mut out = alloc::vec![0u8; *len];
                for (i, v) in row.nonzeros(0, *len) {
                    out[i] = v.0;
                }
                out
            }
        }
    }
}
