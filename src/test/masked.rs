use {
    super::rng,
    crate::{Domain, Masked, Word},
    rand::Rng,
};

#[test]
fn unmask_round_trip_all_widths_domains_and_orders() {
    let mut rng = rng(1);
    for order in 1..=10 {
        for domain in [Domain::Boolean, Domain::Arithmetic] {
            let value = rand::thread_rng().gen::<u8>();
            let mut masked = Masked::new(value, domain, order, &mut rng);
            assert_eq!(masked.unmask(), value);
            assert_eq!(masked.order(), order);
            assert_eq!(masked.share_count(), order + 1);
            masked.refresh_masks(&mut rng);
            assert_eq!(masked.unmask(), value);

            let value = rand::thread_rng().gen::<u32>();
            let mut masked = Masked::new(value, domain, order, &mut rng);
            assert_eq!(masked.unmask(), value);
            masked.refresh_masks(&mut rng);
            assert_eq!(masked.unmask(), value);

            let value = rand::thread_rng().gen::<u64>();
            let mut masked = Masked::new(value, domain, order, &mut rng);
            assert_eq!(masked.unmask(), value);
            masked.refresh_masks(&mut rng);
            assert_eq!(masked.unmask(), value);
        }
    }
}

#[test]
fn boolean_operations_commute_with_unmasking() {
    let mut rng = rng(2);
    let mut rand = rand::thread_rng();
    for order in 1..=4 {
        let (a, b) = (rand.gen::<u32>(), rand.gen::<u32>());
        let x = Masked::new(a, Domain::Boolean, order, &mut rng);
        let y = Masked::new(b, Domain::Boolean, order, &mut rng);

        assert_eq!(x.xor(&y).unmask(), a ^ b);
        assert_eq!(x.and(&y, &mut rng).unmask(), a & b);
        assert_eq!(x.or(&y, &mut rng).unmask(), a | b);
        assert_eq!(x.not().unmask(), !a);
    }
}

#[test]
fn arithmetic_operations_commute_with_unmasking() {
    let mut rng = rng(3);
    let mut rand = rand::thread_rng();
    for order in 1..=4 {
        let (a, b) = (rand.gen::<u32>(), rand.gen::<u32>());
        let x = Masked::new(a, Domain::Arithmetic, order, &mut rng);
        let y = Masked::new(b, Domain::Arithmetic, order, &mut rng);

        assert_eq!(x.add(&y).unmask(), a.wrapping_add(b));
        assert_eq!(x.sub(&y).unmask(), a.wrapping_sub(b));
        assert_eq!(x.mul(&y, &mut rng).unmask(), a.wrapping_mul(b));
    }
}

#[test]
fn shifts_and_rotations_apply_to_the_secret() {
    let mut rng = rng(4);
    let value = 0b1001_0110_1100_0011_0101_1010_0011_1100u32;
    let masked = Masked::new(value, Domain::Boolean, 2, &mut rng);

    assert_eq!(masked.shl(3).unmask(), value << 3);
    assert_eq!(masked.shr(7).unmask(), value >> 7);
    assert_eq!(masked.rotl(5).unmask(), value.rotl(5));
    assert_eq!(masked.rotr(13).unmask(), value.rotr(13));
}

#[test]
fn scalar_operations_apply_to_the_secret() {
    let mut rng = rng(5);
    let value = 0x5ac3f00du32;
    let masked = Masked::new(value, Domain::Boolean, 1, &mut rng);
    assert_eq!(masked.xor_word(0xdeadbeef).unmask(), value ^ 0xdeadbeef);
    assert_eq!(masked.and_word(0x0ff0f00f).unmask(), value & 0x0ff0f00f);

    let masked = Masked::new(value, Domain::Arithmetic, 1, &mut rng);
    assert_eq!(masked.add_word(0x12345678).unmask(), value.wrapping_add(0x12345678));
}

#[test]
fn btoa_preserves_the_value_and_flips_the_domain() {
    let mut rng = rng(6);
    let mut rand = rand::thread_rng();
    for order in 1..=10 {
        let value = rand.gen::<u8>();
        let mut masked = Masked::new(value, Domain::Boolean, order, &mut rng);
        masked.btoa(&mut rng);
        assert_eq!(masked.domain(), Domain::Arithmetic);
        assert_eq!(masked.order(), order);
        assert_eq!(masked.unmask(), value);

        let value = rand.gen::<u32>();
        let mut masked = Masked::new(value, Domain::Boolean, order, &mut rng);
        masked.btoa(&mut rng);
        assert_eq!(masked.domain(), Domain::Arithmetic);
        assert_eq!(masked.unmask(), value);

        let value = rand.gen::<u64>();
        let mut masked = Masked::new(value, Domain::Boolean, order, &mut rng);
        masked.btoa(&mut rng);
        assert_eq!(masked.domain(), Domain::Arithmetic);
        assert_eq!(masked.unmask(), value);
    }
}

#[test]
fn atob_preserves_the_value_and_flips_the_domain() {
    let mut rng = rng(7);
    let mut rand = rand::thread_rng();
    for order in 1..=10 {
        let value = rand.gen::<u8>();
        let mut masked = Masked::new(value, Domain::Arithmetic, order, &mut rng);
        masked.atob(&mut rng);
        assert_eq!(masked.domain(), Domain::Boolean);
        assert_eq!(masked.order(), order);
        assert_eq!(masked.unmask(), value);

        let value = rand.gen::<u32>();
        let mut masked = Masked::new(value, Domain::Arithmetic, order, &mut rng);
        masked.atob(&mut rng);
        assert_eq!(masked.domain(), Domain::Boolean);
        assert_eq!(masked.unmask(), value);
    }
}

#[test]
fn conversions_are_idempotent_and_compose() {
    let mut rng = rng(8);
    let value = 0xc3a5_0f69u32;
    let mut masked = Masked::new(value, Domain::Boolean, 3, &mut rng);

    // Converting to the domain a value is already in changes nothing.
    masked.atob(&mut rng);
    assert_eq!(masked.domain(), Domain::Boolean);
    assert_eq!(masked.unmask(), value);

    masked.btoa(&mut rng);
    masked.atob(&mut rng);
    masked.btoa(&mut rng);
    assert_eq!(masked.domain(), Domain::Arithmetic);
    assert_eq!(masked.unmask(), value);
}

#[test]
fn masked_bytes_split_big_endian() {
    let mut rng = rng(9);
    let value = 0x0123_4567_89ab_cdefu64;
    for domain in [Domain::Boolean, Domain::Arithmetic] {
        let mut masked = Masked::new(value, domain, 2, &mut rng);
        let bytes = masked.to_masked_bytes(&mut rng);
        let unmasked: Vec<u8> = bytes.iter().map(|b| b.unmask()).collect();
        assert_eq!(unmasked, Word::to_be_bytes(value));
        assert!(bytes.iter().all(|b| b.domain() == Domain::Boolean));
        assert!(bytes.iter().all(|b| b.order() == 2));
    }
}

#[test]
#[should_panic(expected = "only defined for Boolean")]
fn xor_panics_across_domains() {
    let mut rng = rng(10);
    let x = Masked::new(1u8, Domain::Boolean, 1, &mut rng);
    let y = Masked::new(2u8, Domain::Arithmetic, 1, &mut rng);
    let _ = x.xor(&y);
}

#[test]
#[should_panic(expected = "same masking order")]
fn xor_panics_across_orders() {
    let mut rng = rng(11);
    let x = Masked::new(1u8, Domain::Boolean, 1, &mut rng);
    let y = Masked::new(2u8, Domain::Boolean, 2, &mut rng);
    let _ = x.xor(&y);
}
