//! Source block decoder state machine contracts.

use rq_codec::{
    EncodingPacket, FecParameters, RqError, SourceBlockDecoder, SourceBlockEncoder,
    SourceBlockState,
};
use rq_math::TinyMt32;

fn test_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut rng = TinyMt32::new(seed);
    (0..len).map(|_| rng.next_u8()).collect()
}

fn encoder(k: u32, t: u16) -> SourceBlockEncoder {
    let data = test_bytes(k as usize * t as usize, k ^ 0x5A5A_5A5A);
    SourceBlockEncoder::new(0, k, t, &data).unwrap()
}

#[test]
fn wrong_block_number_is_rejected() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(1, 10, 4).unwrap();
    let packet = enc.encoding_packet(0).unwrap();
    assert_eq!(
        dec.put_encoding_packet(&packet),
        Err(RqError::SourceBlockMismatch)
    );
    // Nothing was stored.
    assert_eq!(dec.missing_source_symbols().len(), 10);
}

#[test]
fn duplicate_packet_is_idempotent() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    let packet = enc.encoding_packet(3).unwrap();
    let repair = enc.encoding_packet(12).unwrap();

    let s1 = dec.put_encoding_packet(&packet).unwrap();
    let missing_once = dec.missing_source_symbols();
    let s2 = dec.put_encoding_packet(&packet).unwrap();
    assert_eq!(s1, s2);
    assert_eq!(dec.missing_source_symbols(), missing_once);

    dec.put_encoding_packet(&repair).unwrap();
    let avail_once = dec.available_repair_symbols();
    dec.put_encoding_packet(&repair).unwrap();
    assert_eq!(dec.available_repair_symbols(), avail_once);
}

#[test]
fn missing_source_symbols_never_grow() {
    let enc = encoder(20, 8);
    let mut dec = SourceBlockDecoder::new(0, 20, 8).unwrap();
    let mut prev = dec.missing_source_symbols().len();
    assert_eq!(prev, 20);
    for esi in [5u32, 1, 19, 5, 22, 0, 21, 7] {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
        let now = dec.missing_source_symbols().len();
        assert!(now <= prev, "missing grew after esi {}", esi);
        prev = now;
    }
}

#[test]
fn missing_list_is_ascending_and_repairs_keep_arrival_order() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    for esi in [9u32, 0, 4] {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
    }
    assert_eq!(dec.missing_source_symbols(), vec![1, 2, 3, 5, 6, 7, 8]);

    for esi in [15u32, 11, 13] {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
    }
    assert_eq!(dec.available_repair_symbols(), vec![15, 11, 13]);
}

#[test]
fn repair_store_empties_on_decode() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    // Hold back one source symbol so the repair store is in use.
    for esi in 1..10u32 {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
    }
    let mut state = SourceBlockState::Incomplete;
    for esi in 10..16u32 {
        state = dec
            .put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
        if state == SourceBlockState::Decoded {
            break;
        }
    }
    assert_eq!(state, SourceBlockState::Decoded);
    assert!(dec.available_repair_symbols().is_empty());
    assert!(dec.missing_source_symbols().is_empty());
}

#[test]
fn decoded_state_is_terminal_and_idempotent() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    for esi in 0..10u32 {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
    }
    assert_eq!(dec.latest_state(), SourceBlockState::Decoded);
    let data = dec.block_data().unwrap();

    // More packets change nothing.
    let late = enc.encoding_packet(17).unwrap();
    assert_eq!(
        dec.put_encoding_packet(&late).unwrap(),
        SourceBlockState::Decoded
    );
    assert!(dec.available_repair_symbols().is_empty());
    assert_eq!(dec.block_data().unwrap(), data);
}

#[test]
fn overhead_delays_the_attempt() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    dec.set_symbol_overhead(2);
    assert_eq!(dec.symbol_overhead(), 2);

    // Drop source 0; K symbols received is no longer enough.
    for esi in 1..10u32 {
        dec.put_encoding_packet(&enc.encoding_packet(esi).unwrap())
            .unwrap();
    }
    let s = dec
        .put_encoding_packet(&enc.encoding_packet(10).unwrap())
        .unwrap();
    assert_eq!(s, SourceBlockState::Incomplete); // N = 10 < K + 2

    dec.put_encoding_packet(&enc.encoding_packet(11).unwrap())
        .unwrap();
    let s = dec
        .put_encoding_packet(&enc.encoding_packet(12).unwrap())
        .unwrap();
    // N = 12 = K + 2: the attempt runs, and with two extra rows it decodes.
    assert_eq!(s, SourceBlockState::Decoded);
}

#[test]
fn overhead_clamps_to_the_esi_domain() {
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    dec.set_symbol_overhead(u32::MAX);
    assert_eq!(dec.symbol_overhead(), (1 << 24) - 10);
}

#[test]
fn information_snapshot_reflects_the_decoder() {
    let enc = encoder(10, 4);
    let mut dec = SourceBlockDecoder::new(0, 10, 4).unwrap();
    dec.put_encoding_packet(&enc.encoding_packet(4).unwrap())
        .unwrap();
    dec.put_encoding_packet(&enc.encoding_packet(11).unwrap())
        .unwrap();

    let info = dec.information();
    assert_eq!(info.sbn, 0);
    assert_eq!(info.state, SourceBlockState::Incomplete);
    assert_eq!(info.missing_source_symbols, dec.missing_source_symbols());
    assert_eq!(info.available_repair_symbols, vec![11]);
}

#[test]
fn malformed_packets_are_rejected() {
    assert_eq!(
        EncodingPacket::new(0, 1 << 24, vec![0u8; 4]),
        Err(RqError::InvalidParameters)
    );
    assert_eq!(
        EncodingPacket::new(0, 0, Vec::new()),
        Err(RqError::InvalidParameters)
    );

    let params = FecParameters::new(100, 10, 1, 1, 1).unwrap();
    assert!(SourceBlockDecoder::new(0, 0, params.symbol_size()).is_err());
}
