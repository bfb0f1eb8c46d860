use {
    super::{rng, unhex16},
    crate::{KdfDomain, KeyGen, MaskedKeyGen, Tier256, Tier512},
};

fn keygen32() -> KeyGen<Tier256> {
    let mut keygen = KeyGen::new(b"", b"", b"");
    keygen.digest_context();
    keygen
}

fn keygen64() -> KeyGen<Tier512> {
    let mut keygen = KeyGen::new(b"", b"", b"");
    keygen.digest_context();
    keygen
}

#[test]
fn derive_keys_32_msg_counter_0() {
    let keys = keygen32().derive_keys(10, 0, KdfDomain::Msg);
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|lane| lane.len() == 10));
    assert_eq!(keys[0][0], unhex16("2c23ce27a2d070bfb687f06e7f670924"));
    assert_eq!(keys[1][0], unhex16("bd5fa1b14557049a3bf9fda43eee4f5e"));
}

#[test]
fn derive_keys_32_hdr_counter_1() {
    let keys = keygen32().derive_keys(10, 1, KdfDomain::Hdr);
    assert_eq!(keys[0][0], unhex16("c70608fde351952cd54caf93f1877c92"));
    assert_eq!(keys[1][0], unhex16("063dfb1696d3ac49d4f7ed15cf60b3d8"));
}

#[test]
fn derive_keys_32_chk_counter_2() {
    let keys = keygen32().derive_keys(10, 2, KdfDomain::Chk);
    assert_eq!(keys[0][0], unhex16("3ac7e0f4d6afa46c86ea346d3d753d6b"));
    assert_eq!(keys[1][0], unhex16("686d157968923bbff6d33732137f2c07"));
}

#[test]
fn derive_keys_64_msg_counter_0() {
    let keys = keygen64().derive_keys(10, 0, KdfDomain::Msg);
    assert_eq!(keys.len(), 4);
    assert!(keys.iter().all(|lane| lane.len() == 10));
    assert_eq!(keys[0][0], unhex16("fbe5f3c3c0d10926cf4945c81c515f0c"));
    assert_eq!(keys[1][0], unhex16("3daf00517f37ce3b05836fdf50bd3776"));
    assert_eq!(keys[2][0], unhex16("6e2ee547987f284d7ea2e5f26e3ac358"));
    assert_eq!(keys[3][0], unhex16("4e64eea46b1cc0e80e346af5856926e6"));
}

#[test]
fn derive_keys_64_hdr_counter_1() {
    let keys = keygen64().derive_keys(10, 1, KdfDomain::Hdr);
    assert_eq!(keys[0][0], unhex16("976a2161fb020c844f8ae9bcf3f6006e"));
    assert_eq!(keys[1][0], unhex16("5555bb9bdbf873f4b679545c285835c3"));
    assert_eq!(keys[2][0], unhex16("72f827be2e28e8bd9ee3334d18eac628"));
    assert_eq!(keys[3][0], unhex16("fe30ddce1ab87f3eff0da73894d7671c"));
}

#[test]
fn derive_keys_64_chk_counter_2() {
    let keys = keygen64().derive_keys(10, 2, KdfDomain::Chk);
    assert_eq!(keys[0][0], unhex16("a7696be857124b0810d8cd2c008ed8ba"));
    assert_eq!(keys[1][0], unhex16("9d2c5573970ee5f679eb2bc02276d118"));
    assert_eq!(keys[2][0], unhex16("f58c410220ca3a76c460d97e78ead494"));
    assert_eq!(keys[3][0], unhex16("223e98c78f34f1cd7997a023ba24846a"));
}

#[test]
fn derive_keys_leaves_the_generator_untouched() {
    let keygen = keygen32();
    let state = keygen.state;
    let knc = keygen.knc;
    let first = keygen.derive_keys(11, 3, KdfDomain::Msg);
    let second = keygen.derive_keys(11, 3, KdfDomain::Msg);
    assert_eq!(first, second);
    assert_eq!(keygen.state, state);
    assert_eq!(keygen.knc, knc);
}

#[test]
fn derive_keys_separates_domains_and_counters() {
    let keygen = keygen32();
    let msg = keygen.derive_keys(11, 0, KdfDomain::Msg);
    let hdr = keygen.derive_keys(11, 0, KdfDomain::Hdr);
    let chk = keygen.derive_keys(11, 0, KdfDomain::Chk);
    let msg_next = keygen.derive_keys(11, 1, KdfDomain::Msg);
    assert_ne!(msg, hdr);
    assert_ne!(msg, chk);
    assert_ne!(hdr, chk);
    assert_ne!(msg, msg_next);
}

#[test]
fn key_nonce_composite_interleaves_half_bits() {
    let keygen = KeyGen::<Tier256>::new(&[0xff; 32], &[0x00; 32], b"");
    for i in 0..8 {
        assert_eq!(keygen.knc[2 * i], 0xffff0000);
        assert_eq!(keygen.knc[2 * i + 1], 0x0000ffff);
    }

    let keygen = KeyGen::<Tier512>::new(&[0xff; 64], &[0x00; 64], b"");
    for i in 0..8 {
        assert_eq!(keygen.knc[2 * i], 0xffffffff_00000000);
        assert_eq!(keygen.knc[2 * i + 1], 0x00000000_ffffffff);
    }
}

#[test]
fn inputs_are_padded_and_truncated_big_endian() {
    let keygen = KeyGen::<Tier256>::new(b"\x01\x02", b"", b"");
    assert_eq!(keygen.key[0], 0x01020000);
    assert!(keygen.key[1..].iter().all(|&w| w == 0));

    // A 33rd key byte does not fit into 8 words and is dropped.
    let mut long = vec![0; 32];
    long.push(0xaa);
    let keygen = KeyGen::<Tier256>::new(&long, b"", b"");
    assert!(keygen.key.iter().all(|&w| w == 0));
}

#[test]
fn init_state_vector_layout() {
    let mut keygen = KeyGen::<Tier256>::new(b"", b"", b"");
    let entropy = [1, 2, 3, 4, 5, 6, 7, 8];
    keygen.init_state_vector(&entropy, (7 << 32) | 5, KdfDomain::Msg);

    let ivs = <Tier256 as crate::Tier>::IVS;
    assert_eq!(keygen.state[..4], ivs[..4]);
    // Low counter half lands on words 4..8, high half on words 8..12.
    assert_eq!(keygen.state[4..8], [6, 7, 8, 9]);
    assert_eq!(keygen.state[8..12], [12, 13, 14, 15]);
    for i in 0..4 {
        assert_eq!(keygen.state[12 + i], ivs[4 + i] ^ 0x00f0000f);
    }
}

#[test]
fn masked_derive_keys_match_plain_32() {
    let plain = keygen32().derive_keys(10, 0, KdfDomain::Msg);

    let mut rng = rng(7);
    let mut keygen = MaskedKeyGen::<Tier256>::new(b"", b"", b"", 1, &mut rng);
    keygen.digest_context(&mut rng);
    let masked = keygen.derive_keys(10, 0, KdfDomain::Msg, &mut rng);

    assert_eq!(masked.len(), plain.len());
    for (masked_lane, plain_lane) in masked.iter().zip(&plain) {
        for (masked_key, plain_key) in masked_lane.iter().zip(plain_lane) {
            let unmasked: Vec<u8> = masked_key.iter().map(|b| b.unmask()).collect();
            assert_eq!(unmasked, plain_key);
        }
    }
}

#[test]
fn masked_derive_keys_match_plain_64_second_order() {
    let plain = keygen64().derive_keys(3, 1, KdfDomain::Hdr);

    let mut rng = rng(11);
    let mut keygen = MaskedKeyGen::<Tier512>::new(b"", b"", b"", 2, &mut rng);
    keygen.digest_context(&mut rng);
    let masked = keygen.derive_keys(3, 1, KdfDomain::Hdr, &mut rng);

    for (masked_lane, plain_lane) in masked.iter().zip(&plain) {
        for (masked_key, plain_key) in masked_lane.iter().zip(plain_lane) {
            let unmasked: Vec<u8> = masked_key.iter().map(|b| b.unmask()).collect();
            assert_eq!(unmasked, plain_key);
        }
    }
}
