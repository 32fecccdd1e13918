//! FEC transmission parameters: validation, derivation and the per-block
//! symbol partition.

use rq_core::{Oti, RqError, RqResult, F_MAX, KT_MAX, K_MAX, T_MAX, Z_MAX};

use crate::tables;

/// Symbol alignment assumed by `derive`.
pub const ALIGN: u8 = 4;
/// Sub-symbol floor: a sub-block never carries less than SS * ALIGN bytes
/// per symbol.
pub const SS: u16 = 8;

/// Immutable once constructed; only the validating constructors exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecParameters {
    f: u64,
    t: u16,
    z: u16,
    n: u16,
    al: u8,
}

impl FecParameters {
    /// Domain and consistency check for an (F, T, Z, N, Al) combination.
    pub fn is_valid(f: u64, t: u16, z: u16, n: u16, al: u8) -> bool {
        if f == 0 || f > F_MAX {
            return false;
        }
        if t == 0 || al == 0 || n == 0 {
            return false;
        }
        if t % al as u16 != 0 {
            return false;
        }
        if z == 0 || z > Z_MAX {
            return false;
        }
        let kt = f.div_ceil(t as u64);
        if kt > KT_MAX {
            return false;
        }
        // Every block needs at least one symbol and at most K_MAX.
        if (z as u64) > kt {
            return false;
        }
        (z as u64) * (K_MAX as u64) >= kt
    }

    pub fn new(f: u64, t: u16, z: u16, n: u16, al: u8) -> RqResult<Self> {
        if !Self::is_valid(f, t, z, n, al) {
            return Err(RqError::InvalidParameters);
        }
        Ok(Self { f, t, z, n, al })
    }

    /// Derive parameters from transport constraints: the largest payload one
    /// packet can carry and the largest block the receiver is willing to hold
    /// in memory while decoding.
    pub fn derive(f: u64, max_payload: u16, max_block_bytes: u64) -> RqResult<Self> {
        if f == 0 || f > F_MAX {
            return Err(RqError::InvalidParameters);
        }
        let al = ALIGN as u16;
        let t_cap = T_MAX - T_MAX % al;
        let t = (max_payload - max_payload % al).min(t_cap);
        if t == 0 {
            return Err(RqError::InvalidParameters);
        }
        let kt = f.div_ceil(t as u64);
        if kt > KT_MAX {
            return Err(RqError::InvalidParameters);
        }
        let n_max = t / (SS * al);
        if n_max == 0 {
            return Err(RqError::InvalidParameters);
        }

        // KL(n): the largest tabulated K' whose sub-symbols for n sub-blocks
        // still fit the receiver's block budget.
        let kl = |n: u16| -> u32 {
            let sub = (al as u64) * (t as u64).div_ceil(al as u64 * n as u64);
            let cap = (max_block_bytes / sub).min(K_MAX as u64) as u32;
            match tables::floor_entry(cap) {
                Some(e) => e.k_prime,
                None => 0,
            }
        };

        let kl_max = kl(n_max);
        if kl_max == 0 {
            return Err(RqError::InvalidParameters);
        }
        let z = kt.div_ceil(kl_max as u64);
        if z > Z_MAX as u64 {
            return Err(RqError::InvalidParameters);
        }
        let per_block = kt.div_ceil(z);
        let mut chosen = None;
        for n in 1..=n_max {
            if per_block <= kl(n) as u64 {
                chosen = Some(n);
                break;
            }
        }
        let n = chosen.ok_or(RqError::InvalidParameters)?;
        Self::new(f, t, z as u16, n, ALIGN)
    }

    pub fn data_length(&self) -> u64 {
        self.f
    }

    pub fn symbol_size(&self) -> u16 {
        self.t
    }

    pub fn source_blocks(&self) -> u16 {
        self.z
    }

    pub fn sub_blocks(&self) -> u16 {
        self.n
    }

    pub fn alignment(&self) -> u8 {
        self.al
    }

    /// Total number of source symbols across the object.
    pub fn total_symbols(&self) -> u64 {
        self.f.div_ceil(self.t as u64)
    }

    /// (KL, KS, ZL, ZS): the first ZL blocks carry KL symbols each, the
    /// remaining ZS carry KS.
    pub fn block_partition(&self) -> (u32, u32, u32, u32) {
        let (il, is, jl, js) = partition(self.total_symbols(), self.z as u64);
        (il as u32, is as u32, jl as u32, js as u32)
    }

    /// Number of source symbols in block sbn.
    pub fn block_symbols(&self, sbn: u8) -> RqResult<u32> {
        if sbn as u16 >= self.z {
            return Err(RqError::InvalidParameters);
        }
        let (kl, ks, zl, _) = self.block_partition();
        Ok(if (sbn as u32) < zl { kl } else { ks })
    }

    /// Index of this block's first symbol in the object's symbol stream.
    pub fn block_offset(&self, sbn: u8) -> RqResult<u64> {
        if sbn as u16 >= self.z {
            return Err(RqError::InvalidParameters);
        }
        let (kl, ks, zl, _) = self.block_partition();
        let b = sbn as u64;
        Ok(if b < zl as u64 {
            b * kl as u64
        } else {
            zl as u64 * kl as u64 + (b - zl as u64) * ks as u64
        })
    }

    pub fn to_oti(&self) -> Oti {
        Oti {
            f: self.f,
            t: self.t,
            z: self.z,
            n: self.n,
            al: self.al,
        }
    }

    pub fn from_oti(oti: &Oti) -> RqResult<Self> {
        Self::new(oti.f, oti.t, oti.z, oti.n, oti.al)
    }
}

/// The deterministic (IL, IS, JL, JS) split of i items over j buckets.
pub fn partition(i: u64, j: u64) -> (u64, u64, u64, u64) {
    let il = i.div_ceil(j);
    let is = i / j;
    let jl = i - is * j;
    let js = j - jl;
    (il, is, jl, js)
}
