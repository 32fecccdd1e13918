//! Pre-code geometry and row definitions shared by the encoder and the
//! constraint builder.
//!
//! Intermediate symbol layout for one block (L = K' + S + H columns):
//!   [0, K)        received/padded source symbols
//!   [K, K')       zero padding symbols
//!   [K', K'+S)    LDPC parity symbols
//!   [K'+S, L)     HDPC parity symbols (the permanently inactive region)
//!
//! LDPC parities are XOR sums over source columns; HDPC parities are dense
//! GF(256) combinations over everything before them. Both are computed
//! directly at encode time and re-expressed as constraint rows at decode
//! time, so the two sides can never disagree about a parity's definition.

use rq_core::{RqError, RqResult, K_MAX};
use rq_math::{mix32, Octet, TinyMt32};
use rq_matrix::FlatMatrix;

use crate::tables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    /// Source symbols actually present in the block.
    pub k: u32,
    /// Tabulated symbol count the pre-code runs at.
    pub k_prime: u32,
    pub s: u32,
    pub h: u32,
    /// LT-visible region: K' + S.
    pub w: u32,
    /// Total intermediate symbols: K' + S + H.
    pub l: u32,
    /// Keystream salt for this K'.
    pub j: u32,
}

impl BlockLayout {
    pub fn for_source_symbols(k: u32) -> RqResult<Self> {
        if k == 0 || k > K_MAX {
            return Err(RqError::InvalidParameters);
        }
        let e = tables::ceil_entry(k)?;
        let s = e.s as u32;
        let h = e.h as u32;
        Ok(Self {
            k,
            k_prime: e.k_prime,
            s,
            h,
            w: e.w,
            l: e.k_prime + s + h,
            j: e.j,
        })
    }

    pub fn padding(&self) -> u32 {
        self.k_prime - self.k
    }

    /// Internal symbol id: repair ESIs shift past the padding region.
    pub fn isi(&self, esi: u32) -> u32 {
        if esi < self.k {
            esi
        } else {
            esi + self.padding()
        }
    }
}

/// The three LDPC rows source column i contributes to. The ladder keeps
/// S*(S-1) >= 2*K', which pins a into (0, S) and the hits distinct.
pub fn ldpc_hits(k_prime: u32, s: u32, i: u32) -> [u32; 3] {
    debug_assert!(i < k_prime);
    let a = 1 + i / s;
    let b1 = i % s;
    let b2 = (b1 + a) % s;
    let b3 = (b2 + a) % s;
    [b1, b2, b3]
}

fn mt_rand(salt: u32, col: u32, sel: u32, bound: u32) -> u32 {
    mix32(salt ^ mix32(col.wrapping_mul(0x9E37_79B9) ^ sel)) % bound
}

/// The two binary hits of MT column `col` (one per HDPC construction column
/// except the last).
fn mt_hits(layout: &BlockLayout, col: u32) -> (u32, u32) {
    let h = layout.h;
    let r1 = mt_rand(layout.j, col + 1, 6, h);
    let r2 = (r1 + mt_rand(layout.j, col + 1, 7, h - 1) + 1) % h;
    (r1, r2)
}

/// Dense HDPC coefficients over the first m = K' + S intermediate columns,
/// one row per HDPC symbol.
///
/// Built right to left by the alpha-cumulative recurrence
///   G[:, m-1] = alpha^row
///   G[:, j]   = alpha * G[:, j+1] + MT[:, j]
/// which keeps every coefficient a polynomial in the field generator.
pub fn hdpc_rows(layout: &BlockLayout) -> RqResult<FlatMatrix> {
    let h = layout.h as usize;
    let m = (layout.k_prime + layout.s) as usize;
    let mut g = FlatMatrix::new(h, m);
    for i in 0..h {
        g.set(i, m - 1, Octet::alpha_pow(i))?;
    }
    let mut j = m - 1;
    while j > 0 {
        j -= 1;
        for i in 0..h {
            let next = g.get(i, j + 1)?;
            g.set(i, j, next.mul(Octet::ALPHA))?;
        }
        let (r1, r2) = mt_hits(layout, j as u32);
        for r in [r1, r2] {
            let cur = g.get(r as usize, j)?;
            g.set(r as usize, j, cur.add(Octet::ONE))?;
        }
    }
    Ok(g)
}

/// Keystream seed for one encoding symbol. mix32 is a bijection, so distinct
/// ISIs never collide under one J.
pub fn tuple_seed(layout: &BlockLayout, isi: u32) -> u32 {
    mix32(layout.j ^ mix32(isi))
}

/// Repair-row coefficients over all L intermediate columns.
pub fn repair_coefficients(layout: &BlockLayout, isi: u32, out: &mut [u8]) {
    debug_assert_eq!(out.len(), layout.l as usize);
    let mut rng = TinyMt32::new(tuple_seed(layout, isi));
    for b in out.iter_mut() {
        *b = rng.next_u8();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ldpc_hits_are_distinct_rows() {
        for k in [1u32, 7, 26, 100, 499, 1000] {
            let layout = BlockLayout::for_source_symbols(k).unwrap();
            for i in 0..layout.k_prime {
                let [a, b, c] = ldpc_hits(layout.k_prime, layout.s, i);
                assert!(a < layout.s && b < layout.s && c < layout.s);
                assert!(a != b && b != c && a != c, "K'={} i={}", layout.k_prime, i);
            }
        }
    }

    #[test]
    fn hdpc_rows_shape_and_last_column() {
        let layout = BlockLayout::for_source_symbols(10).unwrap();
        let g = hdpc_rows(&layout).unwrap();
        assert_eq!(g.rows(), layout.h as usize);
        assert_eq!(g.cols(), (layout.k_prime + layout.s) as usize);
        for i in 0..layout.h as usize {
            assert_eq!(
                g.get(i, g.cols() - 1).unwrap(),
                Octet::alpha_pow(i),
                "row {}",
                i
            );
        }
    }

    #[test]
    fn repair_rows_are_reproducible_and_distinct() {
        let layout = BlockLayout::for_source_symbols(20).unwrap();
        let l = layout.l as usize;
        let mut a = alloc::vec![0u8; l];
        let mut b = alloc::vec![0u8; l];
        repair_coefficients(&layout, 25, &mut a);
        repair_coefficients(&layout, 25, &mut b);
        assert_eq!(a, b);
        repair_coefficients(&layout, 26, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn isi_skips_the_padding_region() {
        let layout = BlockLayout::for_source_symbols(7).unwrap();
        assert_eq!(layout.k_prime, 10);
        assert_eq!(layout.isi(3), 3);
        assert_eq!(layout.isi(7), 10); // first repair lands after padding
    }
}
