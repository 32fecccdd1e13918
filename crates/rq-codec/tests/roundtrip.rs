//! Encode-then-decode over the source symbols alone must reproduce the
//! object exactly, for any valid geometry.

use rq_codec::{DataDecoder, DataEncoder, FecParameters, SourceBlockState};
use rq_math::TinyMt32;

fn test_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut rng = TinyMt32::new(seed);
    (0..len).map(|_| rng.next_u8()).collect()
}

fn roundtrip(f: u64, t: u16, z: u16) {
    let params = FecParameters::new(f, t, z, 1, 1).unwrap();
    let data = test_bytes(f as usize, f as u32 ^ (t as u32) << 16);
    let encoder = DataEncoder::new(params, &data).unwrap();
    let mut decoder = DataDecoder::new(params).unwrap();

    for block in encoder.blocks() {
        for packet in block.source_packets().unwrap() {
            decoder.put_encoding_packet(&packet).unwrap();
        }
    }
    assert!(decoder.is_data_decoded(), "F={} T={} Z={}", f, t, z);
    assert_eq!(decoder.data().unwrap(), data, "F={} T={} Z={}", f, t, z);
}

#[test]
fn smallest_legal_object() {
    roundtrip(1, 1, 1);
}

#[test]
fn single_block_geometries() {
    roundtrip(17, 4, 1); // short last symbol
    roundtrip(100, 10, 1); // exact fit
    roundtrip(997, 8, 1); // prime length
}

#[test]
fn multi_block_geometries() {
    roundtrip(100, 4, 2); // 13 + 12 symbols
    roundtrip(1000, 16, 3);
    roundtrip(4099, 32, 5); // uneven final block
}

#[test]
fn padded_ladder_entry() {
    // K = 115 sits between ladder rungs, so the block pads to K' > K.
    roundtrip(460, 4, 1);
}

#[test]
fn source_packets_are_systematic() {
    // Source packet payloads are the raw object slices.
    let params = FecParameters::new(100, 10, 1, 1, 1).unwrap();
    let data = test_bytes(100, 7);
    let encoder = DataEncoder::new(params, &data).unwrap();
    let block = encoder.block(0).unwrap();
    for esi in 0..block.num_source_symbols() {
        let sym = block.symbol(esi).unwrap();
        let start = esi as usize * 10;
        assert_eq!(&sym, &data[start..start + 10], "esi {}", esi);
    }
}

#[test]
fn encoding_is_deterministic() {
    let params = FecParameters::new(200, 8, 1, 1, 1).unwrap();
    let data = test_bytes(200, 99);
    let a = DataEncoder::new(params, &data).unwrap();
    let b = DataEncoder::new(params, &data).unwrap();
    for esi in 0..40 {
        assert_eq!(
            a.block(0).unwrap().symbol(esi).unwrap(),
            b.block(0).unwrap().symbol(esi).unwrap(),
            "esi {}",
            esi
        );
    }
}

#[test]
fn blocks_complete_independently() {
    let params = FecParameters::new(100, 4, 2, 1, 4).unwrap();
    let data = test_bytes(100, 3);
    let encoder = DataEncoder::new(params, &data).unwrap();
    let mut decoder = DataDecoder::new(params).unwrap();

    for packet in encoder.block(1).unwrap().source_packets().unwrap() {
        decoder.put_encoding_packet(&packet).unwrap();
    }
    assert_eq!(
        decoder.block(1).unwrap().latest_state(),
        SourceBlockState::Decoded
    );
    assert_eq!(
        decoder.block(0).unwrap().latest_state(),
        SourceBlockState::Incomplete
    );
    assert!(!decoder.is_data_decoded());

    for packet in encoder.block(0).unwrap().source_packets().unwrap() {
        decoder.put_encoding_packet(&packet).unwrap();
    }
    assert!(decoder.is_data_decoded());
    assert_eq!(decoder.data().unwrap(), data);
}
