#![no_std]
#![forbid(unsafe_code)]

//! RaptorQ-style systematic fountain codec.
//!
//! An object is split into Z independent source blocks; each block is
//! pre-coded into intermediate symbols (sources + LDPC + HDPC parities) from
//! which any number of encoding symbols can be generated. A receiver
//! reconstructs a block from roughly K received symbols, in any order and
//! any source/repair mix, by solving the block's constraint system over
//! GF(256).
//!
//! Blocks decode fully independently and the types carry no internal
//! locking: one block decoder per thread is the intended parallel shape.

extern crate alloc;

pub mod constraint;
pub mod decoder;
pub mod encoder;
pub mod packet;
pub mod params;
pub mod precode;
pub mod solver;
pub mod tables;

pub use decoder::{DataDecoder, SourceBlockDecoder, SourceBlockInfo, SourceBlockState};
pub use encoder::{DataEncoder, SourceBlockEncoder};
pub use packet::EncodingPacket;
pub use params::FecParameters;
pub use precode::BlockLayout;
pub use rq_core::{Oti, PayloadId, RqError, RqResult};
