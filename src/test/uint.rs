use crate::{xtime, Word, S_BOX};

#[test]
fn xtime_doubles_in_the_field() {
    // Worked examples from Section 4.2 of FIPS 197.
    assert_eq!(xtime(0x57), 0xae);
    assert_eq!(xtime(0xae), 0x47);
    assert_eq!(xtime(0x47), 0x8e);
    assert_eq!(xtime(0x8e), 0x07);
    // Values with the high bit set are reduced by the field polynomial.
    assert_eq!(xtime(0x80), 0x1b);
    assert_eq!(xtime(0x00), 0x00);
    assert_eq!(xtime(0x01), 0x02);
}

#[test]
fn rotations_wrap_modulo_width() {
    let x = 0x12345678u32;
    assert_eq!(x.rotr(8), 0x78123456);
    assert_eq!(x.rotl(8), 0x34567812);
    assert_eq!(x.rotr(0), x);
    assert_eq!(x.rotr(32), x);
    assert_eq!(x.rotr(40), x.rotr(8));
    assert_eq!(x.rotl(7), x.rotr(25));

    let x = 0x0123456789abcdefu64;
    assert_eq!(x.rotr(16), 0xcdef0123456789ab);
    assert_eq!(x.rotl(64), x);
    assert_eq!(x.rotr(63), x.rotl(1));
}

#[test]
fn byte_conversions_are_big_endian() {
    assert_eq!(<u32 as Word>::from_be_bytes([0x12, 0x34, 0x56, 0x78]), 0x12345678);
    assert_eq!(Word::to_be_bytes(0x12345678u32), [0x12, 0x34, 0x56, 0x78]);
    assert_eq!(<u8 as Word>::from_be_bytes([0xab]), 0xab);
    assert_eq!(
        Word::to_be_bytes(0x0123456789abcdefu64),
        [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]
    );
}

#[test]
fn sub_bytes_maps_every_byte_of_the_word() {
    assert_eq!(0u32.sub_bytes(&S_BOX), 0x63636363);
    assert_eq!(0x00010203u32.sub_bytes(&S_BOX), 0x637c777b);
    assert_eq!(0x0001020304050607u64.sub_bytes(&S_BOX), 0x637c777bf26b6fc5);
}

#[test]
fn wrapping_arithmetic_reduces_modulo_width() {
    assert_eq!(u32::MAX.wrapping_add(1), 0);
    assert_eq!(0u32.wrapping_sub(1), u32::MAX);
    assert_eq!(<u32 as Word>::from_u64(0x1_0000_0001), 1);
    assert_eq!(<u64 as Word>::from_u64(0x1_0000_0001), 0x1_0000_0001);
}
