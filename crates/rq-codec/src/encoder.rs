//! Systematic block encoding.
//!
//! A `SourceBlockEncoder` materializes the block's intermediate symbols once
//! (padded sources, then LDPC, then HDPC parities) and serves any encoding
//! symbol from them: source ESIs read straight out, repair ESIs are
//! keystream-weighted sums.

use alloc::vec::Vec;
use log::debug;
use rq_core::{RqError, RqResult, ESI_MAX};
use rq_math::{fused_add_mul, Octet};
use rq_matrix::FlatMatrix;

use crate::packet::EncodingPacket;
use crate::params::FecParameters;
use crate::precode::{self, BlockLayout};

pub struct SourceBlockEncoder {
    sbn: u8,
    layout: BlockLayout,
    symbol_size: usize,
    /// L x T: sources, padding, LDPC, HDPC.
    intermediate: FlatMatrix,
}

impl SourceBlockEncoder {
    /// `data` is this block's source region; shorter than K*T gets
    /// zero-padded (the object's final symbol).
    pub fn new(sbn: u8, k: u32, symbol_size: u16, data: &[u8]) -> RqResult<Self> {
        if symbol_size == 0 {
            return Err(RqError::InvalidParameters);
        }
        let t = symbol_size as usize;
        if data.len() > k as usize * t {
            return Err(RqError::InvalidParameters);
        }
        let layout = BlockLayout::for_source_symbols(k)?;
        let mut intermediate = FlatMatrix::new(layout.l as usize, t);

        for i in 0..k as usize {
            let start = i * t;
            if start >= data.len() {
                break;
            }
            let end = (start + t).min(data.len());
            intermediate.row_mut(i)?[..end - start].copy_from_slice(&data[start..end]);
        }

        // LDPC parities: XOR of the circulant source hits.
        let kp = layout.k_prime as usize;
        for col in 0..layout.k_prime {
            for row in precode::ldpc_hits(layout.k_prime, layout.s, col) {
                intermediate.xor_rows(kp + row as usize, col as usize)?;
            }
        }

        // HDPC parities: dense generator rows over sources + LDPC.
        let g = precode::hdpc_rows(&layout)?;
        let w = layout.w as usize;
        for i in 0..layout.h as usize {
            for j in 0..w {
                let coeff = g.get(i, j)?;
                if coeff != Octet::ZERO {
                    intermediate.add_rows(w + i, j, coeff, 0, t)?;
                }
            }
        }

        debug!(
            "block {}: pre-coded K={} as K'={} (S={}, H={})",
            sbn, k, layout.k_prime, layout.s, layout.h
        );
        Ok(Self {
            sbn,
            layout,
            symbol_size: t,
            intermediate,
        })
    }

    pub fn sbn(&self) -> u8 {
        self.sbn
    }

    pub fn num_source_symbols(&self) -> u32 {
        self.layout.k
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    /// One encoding symbol's payload.
    pub fn symbol(&self, esi: u32) -> RqResult<Vec<u8>> {
        if esi > ESI_MAX {
            return Err(RqError::InvalidParameters);
        }
        if esi < self.layout.k {
            return Ok(self.intermediate.row(esi as usize)?.to_vec());
        }
        let l = self.layout.l as usize;
        let mut coeffs = alloc::vec![0u8; l];
        precode::repair_coefficients(&self.layout, self.layout.isi(esi), &mut coeffs);
        let mut out = alloc::vec![0u8; self.symbol_size];
        for (j, &c) in coeffs.iter().enumerate() {
            if c != 0 {
                fused_add_mul(&mut out, self.intermediate.row(j)?, Octet(c));
            }
        }
        Ok(out)
    }

    pub fn encoding_packet(&self, esi: u32) -> RqResult<EncodingPacket> {
        EncodingPacket::new(self.sbn, esi, self.symbol(esi)?)
    }

    /// All K source packets, in ESI order.
    pub fn source_packets(&self) -> RqResult<Vec<EncodingPacket>> {
        (0..self.layout.k)
            .map(|esi| self.encoding_packet(esi))
            .collect()
    }

    /// `count` repair packets starting at ESI K.
    pub fn repair_packets(&self, count: u32) -> RqResult<Vec<EncodingPacket>> {
        (self.layout.k..self.layout.k + count)
            .map(|esi| self.encoding_packet(esi))
            .collect()
    }
}

/// Whole-object encoder: one `SourceBlockEncoder` per source block.
pub struct DataEncoder {
    params: FecParameters,
    blocks: Vec<SourceBlockEncoder>,
}

impl DataEncoder {
    pub fn new(params: FecParameters, data: &[u8]) -> RqResult<Self> {
        if data.len() as u64 != params.data_length() {
            return Err(RqError::InvalidParameters);
        }
        let t = params.symbol_size();
        let mut blocks = Vec::with_capacity(params.source_blocks() as usize);
        for sbn in 0..params.source_blocks() {
            let sbn = sbn as u8;
            let k = params.block_symbols(sbn)?;
            let offset = params.block_offset(sbn)? as usize * t as usize;
            let end = (offset + k as usize * t as usize).min(data.len());
            blocks.push(SourceBlockEncoder::new(sbn, k, t, &data[offset..end])?);
        }
        Ok(Self { params, blocks })
    }

    pub fn params(&self) -> &FecParameters {
        &self.params
    }

    pub fn block(&self, sbn: u8) -> RqResult<&SourceBlockEncoder> {
        self.blocks
            .get(sbn as usize)
            .ok_or(RqError::InvalidParameters)
    }

    pub fn blocks(&self) -> &[SourceBlockEncoder] {
        &self.blocks
    }
}
