//! Intermediate symbol recovery.
//!
//! Two paths solve A * C = D for the L intermediate symbols:
//!
//! * `inactivation`: peel the sparse region first: repeatedly pick the
//!   unprocessed row with the fewest non-zeros over the active columns
//!   (degree-2 ties go to the row lying in the largest component of the
//!   degree-2 column graph), take its first active non-zero as the pivot and
//!   defer its remaining active columns to the inactive edge. What survives
//!   is a small dense system over the deferred columns, solved by pivoted
//!   elimination, then substituted back. Identity and LDPC rows peel away
//!   almost for free; dense repair and HDPC rows are exactly what lands in
//!   the deferred block.
//! * `gaussian`: straight full-pivot elimination, used for small systems
//!   and verification.
//!
//! A singular system is a value-level outcome, not an error: the caller
//! keeps its symbols and waits for more.

use alloc::vec;
use alloc::vec::Vec;
use log::{debug, trace};
use rq_core::{RqError, RqResult};
use rq_math::Octet;
use rq_matrix::{ByteMatrix, FlatMatrix};

pub enum Solve {
    /// L x T matrix of recovered intermediate symbols, in original column
    /// order.
    Solved(FlatMatrix),
    Singular,
}

/// Union-find over active columns, edges contributed by degree-2 rows.
struct Components {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl Components {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = x;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (big, small) = if self.size[ra as usize] >= self.size[rb as usize] {
                (ra, rb)
            } else {
                (rb, ra)
            };
            self.parent[small as usize] = big;
            self.size[big as usize] += self.size[small as usize];
        }
    }

    fn component_size(&mut self, x: u32) -> u32 {
        let r = self.find(x);
        self.size[r as usize]
    }
}

/// Pick the next row to peel. Rows are inspected over [pivot, active_end).
fn choose_row(
    a: &ByteMatrix,
    pivot: usize,
    active_end: usize,
    cols: usize,
) -> RqResult<Option<usize>> {
    let m = a.rows();
    let mut min_deg = usize::MAX;
    let mut degrees = Vec::with_capacity(m - pivot);
    for r in pivot..m {
        let deg = a.count_row_nonzeros(r, pivot, active_end)?;
        degrees.push(deg);
        if deg > 0 && deg < min_deg {
            min_deg = deg;
        }
    }
    if min_deg == usize::MAX {
        return Ok(None);
    }

    if min_deg == 2 {
        // Graph heuristic: among degree-2 rows prefer one inside the largest
        // connected component, so the peel front stays wide.
        let mut dsu = Components::new(active_end - pivot);
        let mut two_rows = Vec::new();
        for (off, &deg) in degrees.iter().enumerate() {
            if deg == 2 {
                let r = pivot + off;
                let nz = a.nonzeros_in_row(r, pivot, active_end)?;
                let ca = (nz[0].0 - pivot) as u32;
                let cb = (nz[1].0 - pivot) as u32;
                dsu.union(ca, cb);
                two_rows.push((r, ca));
            }
        }
        let mut best = two_rows[0];
        let mut best_size = 0;
        for &(r, ca) in &two_rows {
            let size = dsu.component_size(ca);
            if size > best_size {
                best_size = size;
                best = (r, ca);
            }
        }
        return Ok(Some(best.0));
    }

    // Minimum active degree, ties broken by fewest non-zeros over the whole
    // remaining row, then by position.
    let mut best_row = None;
    let mut best_orig = usize::MAX;
    for (off, &deg) in degrees.iter().enumerate() {
        if deg == min_deg {
            let r = pivot + off;
            let orig = a.count_row_nonzeros(r, pivot, cols)?;
            if orig < best_orig {
                best_orig = orig;
                best_row = Some(r);
            }
        }
    }
    Ok(best_row)
}

/// Inactivation decoding. `initially_inactive` trailing columns (the HDPC
/// region) start out deferred. Requires a.rows() >= l or reports Singular.
pub fn inactivation(
    a: &mut ByteMatrix,
    d: &mut FlatMatrix,
    l: usize,
    initially_inactive: usize,
) -> RqResult<Solve> {
    let m = a.rows();
    if a.cols() != l || d.rows() != m {
        return Err(RqError::DimensionMismatch);
    }
    if m < l {
        return Ok(Solve::Singular);
    }
    let t = d.cols();
    let mut perm: Vec<usize> = (0..l).collect();
    let mut u = initially_inactive.min(l);
    let mut i = 0usize;

    // Phase 1: peel the active region.
    while i < l - u {
        let active_end = l - u;
        let Some(row) = choose_row(a, i, active_end, l)? else {
            // No unprocessed row touches the remaining active columns;
            // defer them all to the dense phase.
            u = l - i;
            break;
        };
        a.swap_rows(i, row)?;
        d.swap_rows(i, row)?;

        let nz = a.nonzeros_in_row(i, i, active_end)?;
        let pcol = nz[0].0;
        if pcol != i {
            a.swap_columns(i, pcol)?;
            perm.swap(i, pcol);
        }

        // Defer the row's remaining active columns.
        let mut c = i + 1;
        while c < l - u {
            if a.get(i, c)? != Octet::ZERO {
                let last = l - u - 1;
                if c != last {
                    a.swap_columns(c, last)?;
                    perm.swap(c, last);
                }
                u += 1;
            } else {
                c += 1;
            }
        }

        let pv = a.get(i, i)?;
        if pv != Octet::ONE {
            a.divide_row(i, pv, i, l)?;
            d.divide_row(i, pv, 0, t)?;
        }
        for r in (i + 1)..m {
            let v = a.get(r, i)?;
            if v != Octet::ZERO {
                a.add_rows(r, i, v, i, l)?;
                d.add_rows(r, i, v, 0, t)?;
            }
        }
        i += 1;
    }
    let peeled = i;
    debug!("inactivation: peeled {} of {} columns, {} deferred", peeled, l, l - peeled);

    // Phase 2: pivoted elimination over the deferred block.
    for col in peeled..l {
        let mut found = None;
        'search: for c2 in col..l {
            for r in col..m {
                if a.get(r, c2)? != Octet::ZERO {
                    found = Some((r, c2));
                    break 'search;
                }
            }
        }
        let Some((pr, pc)) = found else {
            trace!("deferred block singular at column {}", col);
            return Ok(Solve::Singular);
        };
        if pc != col {
            a.swap_columns(col, pc)?;
            perm.swap(col, pc);
        }
        if pr != col {
            a.swap_rows(col, pr)?;
            d.swap_rows(col, pr)?;
        }
        let pv = a.get(col, col)?;
        if pv != Octet::ONE {
            a.divide_row(col, pv, col, l)?;
            d.divide_row(col, pv, 0, t)?;
        }
        for r in peeled..m {
            if r == col {
                continue;
            }
            let v = a.get(r, col)?;
            if v != Octet::ZERO {
                a.add_rows(r, col, v, col, l)?;
                d.add_rows(r, col, v, 0, t)?;
            }
        }
    }

    // Phase 3: substitute deferred values back into the peeled rows.
    for p in 0..peeled {
        for (c, v) in a.nonzeros_in_row(p, peeled, l)? {
            d.add_rows(p, c, v, 0, t)?;
        }
    }

    Ok(Solve::Solved(extract(d, &perm, l, t)?))
}

/// Full-pivot Gauss-Jordan elimination over the whole system.
pub fn gaussian(a: &mut ByteMatrix, d: &mut FlatMatrix, l: usize) -> RqResult<Solve> {
    let m = a.rows();
    if a.cols() != l || d.rows() != m {
        return Err(RqError::DimensionMismatch);
    }
    if m < l {
        return Ok(Solve::Singular);
    }
    let t = d.cols();
    let mut perm: Vec<usize> = (0..l).collect();

    for col in 0..l {
        let mut found = None;
        'search: for c2 in col..l {
            for r in col..m {
                if a.get(r, c2)? != Octet::ZERO {
                    found = Some((r, c2));
                    break 'search;
                }
            }
        }
        let Some((pr, pc)) = found else {
            return Ok(Solve::Singular);
        };
        if pc != col {
            a.swap_columns(col, pc)?;
            perm.swap(col, pc);
        }
        if pr != col {
            a.swap_rows(col, pr)?;
            d.swap_rows(col, pr)?;
        }
        let pv = a.get(col, col)?;
        if pv != Octet::ONE {
            a.divide_row(col, pv, col, l)?;
            d.divide_row(col, pv, 0, t)?;
        }
        for r in 0..m {
            if r == col {
                continue;
            }
            let v = a.get(r, col)?;
            if v != Octet::ZERO {
                a.add_rows(r, col, v, col, l)?;
                d.add_rows(r, col, v, 0, t)?;
            }
        }
    }

    Ok(Solve::Solved(extract(d, &perm, l, t)?))
}

fn extract(d: &FlatMatrix, perm: &[usize], l: usize, t: usize) -> RqResult<FlatMatrix> {
    let mut out = FlatMatrix::new(l, t);
    for pos in 0..l {
        out.row_mut(perm[pos])?.copy_from_slice(d.row(pos)?);
    }
    Ok(out)
}
