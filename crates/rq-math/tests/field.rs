use rq_math::{fused_add_mul, mul_assign_scalar, scaled, Octet, TinyMt32};

#[test]
fn addition_is_its_own_inverse() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let (a, b) = (Octet(a), Octet(b));
            assert_eq!(a.add(b).add(b), a);
        }
    }
}

#[test]
fn table_mul_matches_bitwise_mul() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let (a, b) = (Octet(a), Octet(b));
            assert_eq!(a.mul(b), a.mul_safe(b), "mismatch at {} * {}", a.0, b.0);
        }
    }
}

#[test]
fn known_vector_alpha_times_0x80() {
    // 2 * 0x80 = 0x100, reduced by 0x11D -> 0x1D
    assert_eq!(Octet::ALPHA.mul(Octet(0x80)), Octet(0x1D));
}

#[test]
fn generator_spans_the_group() {
    // alpha^255 = 1 and no earlier power returns to 1
    let mut x = Octet::ONE;
    for i in 1..=255u32 {
        x = x * Octet::ALPHA;
        if i < 255 {
            assert_ne!(x, Octet::ONE, "order divides {}", i);
        }
    }
    assert_eq!(x, Octet::ONE);
}

#[test]
fn multiplication_distributes_over_addition() {
    let mut rng = TinyMt32::new(0x5EED);
    for _ in 0..10_000 {
        let a = Octet(rng.next_u8());
        let b = Octet(rng.next_u8());
        let c = Octet(rng.next_u8());
        assert_eq!(a.mul(b.add(c)), a.mul(b).add(a.mul(c)));
    }
}

#[test]
fn divide_undoes_multiply() {
    for a in 0..=255u8 {
        for b in 1..=255u8 {
            let (a, b) = (Octet(a), Octet(b));
            assert_eq!(a.mul(b).div(b).unwrap(), a);
        }
    }
}

#[test]
fn division_by_zero_is_an_error() {
    assert!(Octet(7).div(Octet::ZERO).is_err());
    assert!(Octet::ZERO.inv().is_err());
}

#[test]
fn alpha_pow_wraps_at_group_order() {
    assert_eq!(Octet::alpha_pow(0), Octet::ONE);
    assert_eq!(Octet::alpha_pow(1), Octet::ALPHA);
    assert_eq!(Octet::alpha_pow(255), Octet::ONE);
    assert_eq!(Octet::alpha_pow(256), Octet::ALPHA);
}

#[test]
fn fused_add_mul_matches_reference() {
    let mut rng = TinyMt32::new(0xF00D);
    // Lengths straddling the SIMD and word widths
    for len in [0usize, 1, 7, 8, 9, 15, 16, 31, 32, 33, 63, 64, 100, 1000] {
        let src: Vec<u8> = (0..len).map(|_| rng.next_u8()).collect();
        let base: Vec<u8> = (0..len).map(|_| rng.next_u8()).collect();
        for factor in [0u8, 1, 2, 3, 0x53, 0xFF] {
            let mut out = base.clone();
            fused_add_mul(&mut out, &src, Octet(factor));
            for i in 0..len {
                let expect = base[i] ^ Octet(src[i]).mul(Octet(factor)).0;
                assert_eq!(out[i], expect, "len {} factor {} index {}", len, factor, i);
            }
        }
    }
}

#[test]
fn scaled_and_mul_assign_fast_paths() {
    let src = [1u8, 2, 3, 4, 5];
    let mut dst = [0u8; 5];

    scaled(&mut dst, &src, Octet::ZERO);
    assert_eq!(dst, [0; 5]);

    scaled(&mut dst, &src, Octet::ONE);
    assert_eq!(dst, src);

    scaled(&mut dst, &src, Octet(2));
    for i in 0..5 {
        assert_eq!(dst[i], Octet(src[i]).mul(Octet(2)).0);
    }

    let mut inplace = src;
    mul_assign_scalar(&mut inplace, Octet(2));
    assert_eq!(inplace, dst);

    mul_assign_scalar(&mut inplace, Octet::ZERO);
    assert_eq!(inplace, [0; 5]);
}

#[test]
fn tinymt_is_deterministic_across_instances() {
    let mut a = TinyMt32::new(1);
    let mut b = TinyMt32::new(1);
    for _ in 0..100 {
        assert_eq!(a.next_u32(), b.next_u32());
    }
    let mut c = TinyMt32::new(2);
    let first: Vec<u32> = (0..8).map(|_| c.next_u32()).collect();
    let mut d = TinyMt32::new(1);
    let second: Vec<u32> = (0..8).map(|_| d.next_u32()).collect();
    assert_ne!(first, second);
}
