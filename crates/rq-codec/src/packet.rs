//! Encoding packets: one or more consecutive symbols of one source block.

use alloc::vec::Vec;
use rq_core::{PayloadId, RqError, RqResult, ESI_MAX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPacket {
    sbn: u8,
    esi: u32,
    data: Vec<u8>,
}

impl EncodingPacket {
    pub fn new(sbn: u8, esi: u32, data: Vec<u8>) -> RqResult<Self> {
        if esi > ESI_MAX || data.is_empty() {
            return Err(RqError::InvalidParameters);
        }
        Ok(Self { sbn, esi, data })
    }

    pub fn sbn(&self) -> u8 {
        self.sbn
    }

    /// ESI of the first symbol carried.
    pub fn esi(&self) -> u32 {
        self.esi
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn payload_id(&self) -> PayloadId {
        PayloadId {
            sbn: self.sbn,
            esi: self.esi,
        }
    }

    /// Number of symbols for symbol size t; a short trailing chunk counts as
    /// one padded symbol.
    pub fn num_symbols(&self, t: u16) -> usize {
        self.data.len().div_ceil(t as usize)
    }

    /// The carried symbols, in ESI order. The final chunk may be short; the
    /// consumer zero-pads it.
    pub fn symbols(&self, t: u16) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(t as usize)
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
