//! Builds the linear system one decode attempt runs against.
//!
//! Row order: S LDPC constraints, H HDPC constraints, K'-K padding
//! identities, then one row per received symbol: source identities first,
//! repair rows in the caller's order. The right-hand side pairs each row
//! with its symbol payload (zero for the constraint rows).

use alloc::vec::Vec;
use log::trace;
use rq_core::{RqError, RqResult};
use rq_math::Octet;
use rq_matrix::{ByteMatrix, FlatMatrix};

use crate::precode::{self, BlockLayout};

pub struct ConstraintSystem {
    /// M x L coefficient matrix, M >= L when enough symbols were supplied.
    pub a: ByteMatrix,
    /// M x T payload matrix, mirrored through every row operation.
    pub d: FlatMatrix,
}

/// Assemble the system for one attempt. `sources` are (ESI, payload) with
/// ESI < K, `repairs` are (ESI, payload) with ESI >= K; payloads shorter
/// than `symbol_size` are zero-padded.
pub fn build(
    layout: &BlockLayout,
    symbol_size: usize,
    sources: &[(u32, &[u8])],
    repairs: &[(u32, &[u8])],
) -> RqResult<ConstraintSystem> {
    let l = layout.l as usize;
    let s = layout.s as usize;
    let h = layout.h as usize;
    let pad = layout.padding() as usize;
    let m_rows = s + h + pad + sources.len() + repairs.len();
    if m_rows < l {
        return Err(RqError::InvalidState);
    }

    // Non-zero census drives the factory: LDPC three hits per source column
    // plus its identity, dense HDPC rows, one entry per identity row, dense
    // repair rows.
    let nnz = 3 * layout.k_prime as usize
        + s
        + h * (layout.k_prime as usize + s + 1)
        + pad
        + sources.len()
        + repairs.len() * l;
    let mut a = ByteMatrix::with_density(m_rows, l, nnz);
    let mut d = FlatMatrix::new(m_rows, symbol_size);

    // LDPC constraints: parity column plus circulant source hits.
    for i in 0..s {
        a.set(i, layout.k_prime as usize + i, Octet::ONE)?;
    }
    for col in 0..layout.k_prime {
        for row in precode::ldpc_hits(layout.k_prime, layout.s, col) {
            a.set(row as usize, col as usize, Octet::ONE)?;
        }
    }

    // HDPC constraints: dense generator rows plus the parity identity.
    let g = precode::hdpc_rows(layout)?;
    for i in 0..h {
        let row = s + i;
        for (c, v) in g.nonzeros_in_row(i, 0, g.cols())? {
            a.set(row, c, v)?;
        }
        a.set(row, layout.w as usize + i, Octet::ONE)?;
    }

    // Padding symbols are known zeros.
    for p in 0..pad {
        a.set(s + h + p, layout.k as usize + p, Octet::ONE)?;
    }

    let mut next = s + h + pad;
    for (esi, payload) in sources {
        if *esi >= layout.k {
            return Err(RqError::InvalidParameters);
        }
        a.set(next, *esi as usize, Octet::ONE)?;
        fill_row(&mut d, next, payload)?;
        next += 1;
    }

    let mut coeffs = alloc::vec![0u8; l];
    for (esi, payload) in repairs {
        if *esi < layout.k {
            return Err(RqError::InvalidParameters);
        }
        precode::repair_coefficients(layout, layout.isi(*esi), &mut coeffs);
        for (c, &v) in coeffs.iter().enumerate() {
            if v != 0 {
                a.set(next, c, Octet(v))?;
            }
        }
        fill_row(&mut d, next, payload)?;
        next += 1;
    }

    trace!(
        "constraint system {}x{} ({:?}), {} source / {} repair rows",
        m_rows,
        l,
        a.layout(),
        sources.len(),
        repairs.len()
    );
    Ok(ConstraintSystem { a, d })
}

fn fill_row(d: &mut FlatMatrix, row: usize, payload: &[u8]) -> RqResult<()> {
    let out = d.row_mut(row)?;
    let n = payload.len().min(out.len());
    out[..n].copy_from_slice(&payload[..n]);
    Ok(())
}

/// The square L x L system over the first L usable rows; kept for callers
/// that want the exact text-book shape.
pub fn build_square(
    layout: &BlockLayout,
    symbol_size: usize,
    sources: &[(u32, &[u8])],
    repairs: &[(u32, &[u8])],
) -> RqResult<ConstraintSystem> {
    let fixed = (layout.s + layout.h + layout.padding()) as usize;
    let need = layout.l as usize - fixed;
    let take_s = sources.len().min(need);
    let take_r = need - take_s;
    if take_r > repairs.len() {
        return Err(RqError::InvalidState);
    }
    build(
        layout,
        symbol_size,
        &sources[..take_s],
        &repairs[..take_r],
    )
}

/// Vec-of-pairs view of a symbol map, the shape `build` consumes.
pub fn pairs<'a, I>(iter: I) -> Vec<(u32, &'a [u8])>
where
    I: IntoIterator<Item = (&'a u32, &'a Vec<u8>)>,
{
    iter.into_iter()
        .map(|(esi, data)| (*esi, data.as_slice()))
        .collect()
}
