use rq_codec::{FecParameters, RqError};
use rq_core::{F_MAX, T_MAX};

#[test]
fn smallest_legal_object_is_valid() {
    assert!(FecParameters::is_valid(1, 1, 1, 1, 1));
    let p = FecParameters::new(1, 1, 1, 1, 1).unwrap();
    assert_eq!(p.total_symbols(), 1);
    assert_eq!(p.block_symbols(0).unwrap(), 1);
}

#[test]
fn zero_length_object_is_invalid() {
    assert!(!FecParameters::is_valid(0, 100, 1, 1, 1));
    assert_eq!(
        FecParameters::new(0, 100, 1, 1, 1),
        Err(RqError::InvalidParameters)
    );
}

#[test]
fn maximal_object_validates_without_overflow() {
    // F_MAX = Kt_max * T_max exactly; Z must be 256 to cover it.
    assert!(FecParameters::is_valid(F_MAX, T_MAX, 256, 1, 1));
    assert!(!FecParameters::is_valid(F_MAX, T_MAX, 255, 1, 1));
}

#[test]
fn object_over_the_symbol_ceiling_is_invalid() {
    // One byte past Kt_max * T_max overflows the F domain itself.
    assert!(!FecParameters::is_valid(F_MAX + 1, T_MAX, 256, 1, 1));
    // Within the F domain but over ceil(F/T) <= Kt_max for a small T.
    assert!(!FecParameters::is_valid(F_MAX, 1, 256, 1, 1));
}

#[test]
fn alignment_must_divide_symbol_size() {
    assert!(FecParameters::is_valid(1000, 100, 1, 1, 4));
    assert!(!FecParameters::is_valid(1000, 102, 1, 1, 4));
    assert!(!FecParameters::is_valid(1000, 100, 1, 1, 0));
}

#[test]
fn block_bounds_are_enforced() {
    assert!(!FecParameters::is_valid(1000, 100, 0, 1, 1));
    // More blocks than symbols leaves empty blocks.
    assert!(!FecParameters::is_valid(1000, 100, 11, 1, 1));
    assert!(FecParameters::is_valid(1000, 100, 10, 1, 1));
}

#[test]
fn partition_splits_symbols_deterministically() {
    // Kt = 25 over 2 blocks: 13 + 12.
    let p = FecParameters::new(100, 4, 2, 1, 4).unwrap();
    assert_eq!(p.total_symbols(), 25);
    let (kl, ks, zl, zs) = p.block_partition();
    assert_eq!((kl, ks, zl, zs), (13, 12, 1, 1));
    assert_eq!(p.block_symbols(0).unwrap(), 13);
    assert_eq!(p.block_symbols(1).unwrap(), 12);
    assert_eq!(p.block_offset(0).unwrap(), 0);
    assert_eq!(p.block_offset(1).unwrap(), 13);
    assert_eq!(p.block_symbols(2), Err(RqError::InvalidParameters));
}

#[test]
fn derivation_respects_payload_and_memory_budget() {
    let p = FecParameters::derive(100_000, 1400, 64 * 1024).unwrap();
    // T is the aligned payload cap.
    assert_eq!(p.symbol_size(), 1400);
    assert_eq!(p.alignment(), 4);
    // Every block fits the decodable budget at the derived sub-blocking:
    // K * (Al * ceil(T / (Al * N))) <= WS.
    let al = p.alignment() as u64;
    let sub = al * (p.symbol_size() as u64).div_ceil(al * p.sub_blocks() as u64);
    for sbn in 0..p.source_blocks() {
        let k = p.block_symbols(sbn as u8).unwrap();
        assert!(k as u64 * sub <= 64 * 1024);
    }
    // The blocks jointly cover Kt.
    let total: u64 = (0..p.source_blocks())
        .map(|sbn| p.block_symbols(sbn as u8).unwrap() as u64)
        .sum();
    assert_eq!(total, p.total_symbols());
}

#[test]
fn derivation_rejects_hopeless_constraints() {
    // Payload below the alignment floor.
    assert!(FecParameters::derive(1000, 3, 1 << 20).is_err());
    // Memory budget too small for even the smallest ladder entry.
    assert!(FecParameters::derive(u32::MAX as u64, 1400, 100).is_err());
}

#[test]
fn oti_roundtrips_parameters() {
    let p = FecParameters::new(10_000, 100, 1, 1, 4).unwrap();
    let oti = p.to_oti();
    let mut buf = [0u8; 12];
    oti.to_bytes(&mut buf).unwrap();
    let back = FecParameters::from_oti(&rq_codec::Oti::from_bytes(&buf).unwrap()).unwrap();
    assert_eq!(back, p);
}
