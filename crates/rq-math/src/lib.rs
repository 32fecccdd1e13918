#![no_std]
#![allow(unsafe_code)] // confined to the SIMD modules

pub mod scalar;
pub mod tables;
pub mod tinymt;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod avx512;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use tables::TABLES;
pub use tinymt::{mix32, TinyMt32};

use rq_core::{RqError, RqResult};
use zeroize::Zeroize;

/// One element of GF(2^8) mod 0x11D. Every byte value is a valid element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Zeroize)]
#[repr(transparent)]
pub struct Octet(pub u8);

impl Octet {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    /// The field generator.
    pub const ALPHA: Self = Self(2);

    #[inline(always)]
    pub fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }

    /// Subtraction and addition coincide in characteristic 2.
    #[inline(always)]
    pub fn sub(self, rhs: Self) -> Self {
        self.add(rhs)
    }

    #[inline]
    pub fn mul(self, rhs: Self) -> Self {
        if self.0 == 0 || rhs.0 == 0 {
            return Self::ZERO;
        }
        let idx = (TABLES.log[self.0 as usize] as usize) + (TABLES.log[rhs.0 as usize] as usize);
        Self(TABLES.exp[idx])
    }

    /// Bitwise shift-and-reduce multiplication. Slow path used to cross-check
    /// the tables and to seed the SIMD shuffle tables.
    pub fn mul_safe(self, rhs: Self) -> Self {
        Self(scalar::mul_gf8(self.0, rhs.0))
    }

    /// Multiplicative inverse. Zero has none.
    pub fn inv(self) -> RqResult<Self> {
        if self.0 == 0 {
            return Err(RqError::DivisionByZero);
        }
        let log_a = TABLES.log[self.0 as usize] as usize;
        Ok(Self(TABLES.exp[255 - log_a]))
    }

    pub fn div(self, rhs: Self) -> RqResult<Self> {
        if rhs.0 == 0 {
            return Err(RqError::DivisionByZero);
        }
        if self.0 == 0 {
            return Ok(Self::ZERO);
        }
        let idx = (TABLES.log[self.0 as usize] as usize) + 255
            - (TABLES.log[rhs.0 as usize] as usize);
        Ok(Self(TABLES.exp[idx]))
    }

    /// alpha^i, for the HDPC generator construction.
    #[inline]
    pub fn alpha_pow(i: usize) -> Self {
        Self(TABLES.exp[i % 255])
    }
}

impl core::ops::Add for Octet {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.add(rhs)
    }
}
impl core::ops::Sub for Octet {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.sub(rhs)
    }
}
impl core::ops::Mul for Octet {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.mul(rhs)
    }
}

/// dest ^= src, the hot XOR path of matrix elimination.
#[inline(always)]
pub fn add_assign(dest: &mut [u8], src: &[u8]) {
    scalar::add_assign(dest, src);
}

/// dest ^= factor * src. Degenerate factors short-circuit; wide inputs go
/// through the widest SIMD kernel the target carries.
#[inline(always)]
pub fn fused_add_mul(dest: &mut [u8], src: &[u8], factor: Octet) {
    if factor.0 == 0 || dest.is_empty() {
        return;
    }
    if factor.0 == 1 {
        add_assign(dest, src);
        return;
    }

    #[cfg(target_arch = "x86_64")]
    unsafe {
        if cfg!(target_feature = "avx512f") && cfg!(target_feature = "avx512bw") {
            avx512::fused_add_mul_avx512(dest, src, factor.0);
            return;
        }
        if cfg!(target_feature = "avx2") {
            avx2::fused_add_mul_avx2(dest, src, factor.0);
            return;
        }
    }

    #[cfg(target_arch = "aarch64")]
    unsafe {
        neon::fused_add_mul_neon(dest, src, factor.0);
        return;
    }

    #[cfg(not(target_arch = "aarch64"))]
    scalar::fused_add_mul(dest, src, factor);
}

/// dest *= factor, in place.
pub fn mul_assign_scalar(dest: &mut [u8], factor: Octet) {
    match factor.0 {
        0 => dest.fill(0),
        1 => {}
        _ => {
            for d in dest.iter_mut() {
                *d = Octet(*d).mul(factor).0;
            }
        }
    }
}

/// dest = factor * src.
pub fn scaled(dest: &mut [u8], src: &[u8], factor: Octet) {
    let len = dest.len().min(src.len());
    match factor.0 {
        0 => dest[..len].fill(0),
        1 => dest[..len].copy_from_slice(&src[..len]),
        _ => {
            for (d, s) in dest[..len].iter_mut().zip(src.iter()) {
                *d = Octet(*s).mul(factor).0;
            }
        }
    }
}

/// Which multiply-accumulate kernel this build dispatches to.
pub fn active_kernel() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        if cfg!(target_feature = "avx512f") && cfg!(target_feature = "avx512bw") {
            return "avx512bw/64B";
        }
        if cfg!(target_feature = "avx2") {
            return "avx2/32B";
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if cfg!(target_feature = "neon") {
            return "neon/16B";
        }
    }
    "scalar/8B"
}
