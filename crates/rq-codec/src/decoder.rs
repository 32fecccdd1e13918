//! Per-block decoding state machine and the whole-object decoder.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use log::debug;
use rq_core::{RqError, RqResult, ESI_MAX};
use zeroize::Zeroize;

use crate::constraint;
use crate::packet::EncodingPacket;
use crate::params::FecParameters;
use crate::precode::BlockLayout;
use crate::solver::{self, Solve};

/// Systems at or below this order take the straight elimination path.
const SMALL_SYSTEM: usize = 30;

/// Decode progress of one source block. `DecodingFailure` is transient: the
/// decoder keeps everything it received and a later packet retriggers the
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBlockState {
    Incomplete,
    Decoded,
    DecodingFailure,
}

/// Snapshot DTO of a block decoder, serializable by outer layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlockInfo {
    pub sbn: u8,
    pub state: SourceBlockState,
    pub missing_source_symbols: Vec<u32>,
    pub available_repair_symbols: Vec<u32>,
}

pub struct SourceBlockDecoder {
    sbn: u8,
    k: u32,
    symbol_size: u16,
    layout: BlockLayout,
    overhead: u32,
    state: SourceBlockState,
    /// ESI -> padded payload; BTreeMap keeps missing/available ascending.
    source: BTreeMap<u32, Vec<u8>>,
    /// Arrival order preserved; emptied on the Decoded transition.
    repair: Vec<(u32, Vec<u8>)>,
    repair_seen: BTreeSet<u32>,
}

impl SourceBlockDecoder {
    pub fn new(sbn: u8, k: u32, symbol_size: u16) -> RqResult<Self> {
        if symbol_size == 0 {
            return Err(RqError::InvalidParameters);
        }
        let layout = BlockLayout::for_source_symbols(k)?;
        Ok(Self {
            sbn,
            k,
            symbol_size,
            layout,
            overhead: 0,
            state: SourceBlockState::Incomplete,
            source: BTreeMap::new(),
            repair: Vec::new(),
            repair_seen: BTreeSet::new(),
        })
    }

    pub fn sbn(&self) -> u8 {
        self.sbn
    }

    pub fn num_source_symbols(&self) -> u32 {
        self.k
    }

    pub fn latest_state(&self) -> SourceBlockState {
        self.state
    }

    pub fn symbol_overhead(&self) -> u32 {
        self.overhead
    }

    /// Extra symbols beyond K to wait for before each attempt. Clamped to
    /// the number of repair ESIs representable for this K.
    pub fn set_symbol_overhead(&mut self, overhead: u32) {
        self.overhead = overhead.min(ESI_MAX + 1 - self.k);
    }

    /// ESIs in [0, K) not yet received, ascending. Empty once decoded.
    pub fn missing_source_symbols(&self) -> Vec<u32> {
        (0..self.k).filter(|esi| !self.source.contains_key(esi)).collect()
    }

    /// Received repair ESIs in arrival order; empty once decoded.
    pub fn available_repair_symbols(&self) -> Vec<u32> {
        self.repair.iter().map(|(esi, _)| *esi).collect()
    }

    pub fn information(&self) -> SourceBlockInfo {
        SourceBlockInfo {
            sbn: self.sbn,
            state: self.state,
            missing_source_symbols: self.missing_source_symbols(),
            available_repair_symbols: self.available_repair_symbols(),
        }
    }

    /// Recovered source symbol, available once decoded or received directly.
    pub fn source_symbol(&self, esi: u32) -> Option<&[u8]> {
        self.source.get(&esi).map(|v| v.as_slice())
    }

    /// The block's K*T bytes; callers truncate the object's final block.
    pub fn block_data(&self) -> RqResult<Vec<u8>> {
        if self.state != SourceBlockState::Decoded {
            return Err(RqError::InvalidState);
        }
        let t = self.symbol_size as usize;
        let mut out = Vec::with_capacity(self.k as usize * t);
        for esi in 0..self.k {
            // Decoded means every source ESI is present.
            match self.source.get(&esi) {
                Some(sym) => out.extend_from_slice(sym),
                None => return Err(RqError::InvalidState),
            }
        }
        Ok(out)
    }

    /// Feed one packet through the state machine.
    pub fn put_encoding_packet(&mut self, packet: &EncodingPacket) -> RqResult<SourceBlockState> {
        if packet.sbn() != self.sbn {
            return Err(RqError::SourceBlockMismatch);
        }
        if self.state == SourceBlockState::Decoded {
            return Ok(SourceBlockState::Decoded);
        }
        let t = self.symbol_size;
        let count = packet.num_symbols(t) as u32;
        if count == 0 || packet.esi() + count - 1 > ESI_MAX {
            return Err(RqError::InvalidParameters);
        }

        for (i, chunk) in packet.symbols(t).enumerate() {
            let esi = packet.esi() + i as u32;
            let mut sym = alloc::vec![0u8; t as usize];
            sym[..chunk.len()].copy_from_slice(chunk);
            if esi < self.k {
                // Duplicates overwrite idempotently.
                self.source.insert(esi, sym);
            } else if self.repair_seen.insert(esi) {
                self.repair.push((esi, sym));
            }
        }

        let received = self.source.len() + self.repair.len();
        if (received as u32) < self.k + self.overhead {
            return Ok(SourceBlockState::Incomplete);
        }
        self.attempt_decode()
    }

    fn attempt_decode(&mut self) -> RqResult<SourceBlockState> {
        if self.source.len() == self.k as usize {
            debug!("block {}: all {} source symbols present", self.sbn, self.k);
            self.transition_decoded();
            return Ok(SourceBlockState::Decoded);
        }

        let sources = constraint::pairs(self.source.iter());
        let repairs: Vec<(u32, &[u8])> = self
            .repair
            .iter()
            .map(|(esi, data)| (*esi, data.as_slice()))
            .collect();
        let sys = constraint::build(&self.layout, self.symbol_size as usize, &sources, &repairs)?;
        let mut a = sys.a;
        let mut d = sys.d;
        let l = self.layout.l as usize;
        debug!(
            "block {}: decode attempt with {} source + {} repair symbols (L={})",
            self.sbn,
            sources.len(),
            repairs.len(),
            l
        );

        let outcome = if l <= SMALL_SYSTEM {
            solver::gaussian(&mut a, &mut d, l)?
        } else {
            solver::inactivation(&mut a, &mut d, l, self.layout.h as usize)?
        };

        match outcome {
            Solve::Solved(intermediate) => {
                // The first K' intermediates are the source symbols.
                for esi in self.missing_source_symbols() {
                    let sym = intermediate.row(esi as usize)?.to_vec();
                    self.source.insert(esi, sym);
                }
                self.transition_decoded();
                debug!("block {}: decoded", self.sbn);
                Ok(SourceBlockState::Decoded)
            }
            Solve::Singular => {
                self.state = SourceBlockState::DecodingFailure;
                debug!("block {}: singular system, keeping symbols", self.sbn);
                Ok(SourceBlockState::DecodingFailure)
            }
        }
    }

    fn transition_decoded(&mut self) {
        self.state = SourceBlockState::Decoded;
        for (_, sym) in self.repair.iter_mut() {
            sym.zeroize();
        }
        self.repair.clear();
        self.repair_seen.clear();
    }
}

/// Whole-object decoder: Z independent block decoders. Blocks share nothing,
/// so a host may drive them from separate threads, one decoder per thread.
pub struct DataDecoder {
    params: FecParameters,
    blocks: Vec<SourceBlockDecoder>,
}

impl DataDecoder {
    pub fn new(params: FecParameters) -> RqResult<Self> {
        let mut blocks = Vec::with_capacity(params.source_blocks() as usize);
        for sbn in 0..params.source_blocks() {
            let sbn = sbn as u8;
            let k = params.block_symbols(sbn)?;
            blocks.push(SourceBlockDecoder::new(sbn, k, params.symbol_size())?);
        }
        Ok(Self { params, blocks })
    }

    pub fn params(&self) -> &FecParameters {
        &self.params
    }

    pub fn block(&self, sbn: u8) -> RqResult<&SourceBlockDecoder> {
        self.blocks
            .get(sbn as usize)
            .ok_or(RqError::InvalidParameters)
    }

    pub fn block_mut(&mut self, sbn: u8) -> RqResult<&mut SourceBlockDecoder> {
        self.blocks
            .get_mut(sbn as usize)
            .ok_or(RqError::InvalidParameters)
    }

    /// Route one packet to its block.
    pub fn put_encoding_packet(&mut self, packet: &EncodingPacket) -> RqResult<SourceBlockState> {
        self.block_mut(packet.sbn())?.put_encoding_packet(packet)
    }

    pub fn is_data_decoded(&self) -> bool {
        self.blocks
            .iter()
            .all(|b| b.latest_state() == SourceBlockState::Decoded)
    }

    /// The reconstructed object, once every block is decoded.
    pub fn data(&self) -> RqResult<Vec<u8>> {
        if !self.is_data_decoded() {
            return Err(RqError::InvalidState);
        }
        let mut out = Vec::with_capacity(self.params.data_length() as usize);
        for block in &self.blocks {
            out.extend_from_slice(&block.block_data()?);
        }
        out.truncate(self.params.data_length() as usize);
        Ok(out)
    }
}
