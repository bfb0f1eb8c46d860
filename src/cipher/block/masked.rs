//! The AES block engine over boolean-masked bytes.
//!
//! Identical round structure to the [plain engine](super::AesBlock), with
//! one fundamental difference: a lookup table cannot be indexed with a
//! secret share, so SubBytes is evaluated algebraically as the Rijndael
//! affine map composed with inversion in GF(2^8). Every operation works
//! share-wise or through the masking gadgets; no state byte is unmasked at
//! any intermediate step.

use {
    crate::{
        cipher::block::BLOCK_BYTES,
        keygen::MaskedRoundKeys,
        masked::Masked,
        random::Csprng,
    },
    docext::docext,
};

/// A single AES-128 lane over masked bytes.
#[derive(Debug, Clone)]
pub struct MaskedAesBlock {
    pub(crate) state: Vec<Masked<u8>>,
    round_keys: MaskedRoundKeys,
    round: usize,
}

impl MaskedAesBlock {
    pub fn new(data: Vec<Masked<u8>>, round_keys: MaskedRoundKeys) -> Self {
        assert!(
            data.len() == BLOCK_BYTES,
            "an AES block must receive a data block of length 16, not {}",
            data.len()
        );
        assert!(
            round_keys.len() > 1,
            "an AES block needs at least an initial and a final round key"
        );
        Self {
            state: data,
            round_keys,
            round: 0,
        }
    }

    pub fn state(&self) -> &[Masked<u8>] {
        &self.state
    }

    /// Recombine the state shares into plain bytes.
    pub fn unmask_state(&self) -> [u8; BLOCK_BYTES] {
        let mut out = [0; BLOCK_BYTES];
        for (o, s) in out.iter_mut().zip(&self.state) {
            *o = s.unmask();
        }
        out
    }

    fn n_rounds(&self) -> usize {
        self.round_keys.len() - 1
    }

    /// Advance encryption to the next column-exchange point, as the
    /// [plain engine](super::AesBlock::encrypt_step) does.
    pub fn encrypt_step<R: Csprng>(&mut self, rng: &mut R) -> bool {
        let n = self.n_rounds();
        match self.round {
            0 => self.add_round_key(0),
            r if r < n - 1 => {
                self.sub_bytes(rng);
                self.shift_rows();
                self.mix_columns();
                self.add_round_key(r);
            }
            r if r == n - 1 => {
                self.sub_bytes(rng);
                self.shift_rows();
                self.mix_columns();
                self.add_round_key(r);
                self.sub_bytes(rng);
                self.shift_rows();
                self.add_round_key(n);
            }
            _ => unreachable!("block already encrypted"),
        }
        self.round += 1;
        self.round <= n - 1
    }

    /// Advance decryption to the next column-exchange point.
    pub fn decrypt_step<R: Csprng>(&mut self, rng: &mut R) -> bool {
        let n = self.n_rounds();
        match self.round {
            0 => {
                self.add_round_key(n);
                self.inv_shift_rows();
                self.inv_sub_bytes(rng);
                self.add_round_key(n - 1);
                self.inv_mix_columns();
                self.inv_shift_rows();
                self.inv_sub_bytes(rng);
            }
            r if r < n - 1 => {
                self.add_round_key(n - 1 - r);
                self.inv_mix_columns();
                self.inv_shift_rows();
                self.inv_sub_bytes(rng);
            }
            r if r == n - 1 => self.add_round_key(0),
            _ => unreachable!("block already decrypted"),
        }
        self.round += 1;
        self.round <= n - 1
    }

    fn add_round_key(&mut self, index: usize) {
        for (s, k) in self.state.iter_mut().zip(&self.round_keys[index]) {
            *s = s.xor(k);
        }
    }

    /// SubBytes as the affine map over the GF(2^8) inverse.
    pub(crate) fn sub_bytes<R: Csprng>(&mut self, rng: &mut R) {
        for byte in &mut self.state {
            *byte = affine(&gf_inv(byte, rng));
        }
    }

    /// InvSubBytes as the GF(2^8) inverse over the inverse affine map.
    pub(crate) fn inv_sub_bytes<R: Csprng>(&mut self, rng: &mut R) {
        for byte in &mut self.state {
            *byte = gf_inv(&inv_affine(byte), rng);
        }
    }

    fn shift_rows(&mut self) {
        let s = &mut self.state;
        s.swap(1, 5);
        s.swap(5, 9);
        s.swap(9, 13);
        s.swap(2, 10);
        s.swap(6, 14);
        s.swap(15, 11);
        s.swap(11, 7);
        s.swap(7, 3);
    }

    fn inv_shift_rows(&mut self) {
        let s = &mut self.state;
        s.swap(13, 9);
        s.swap(9, 5);
        s.swap(5, 1);
        s.swap(2, 10);
        s.swap(6, 14);
        s.swap(3, 7);
        s.swap(7, 11);
        s.swap(11, 15);
    }

    fn mix_columns(&mut self) {
        for i in (0..BLOCK_BYTES).step_by(4) {
            let s = &mut self.state;
            let x = s[i].xor(&s[i + 1]).xor(&s[i + 2]).xor(&s[i + 3]);
            let y = s[i].clone();
            s[i] = s[i].xor(&x).xor(&xtime(&s[i].xor(&s[i + 1])));
            s[i + 1] = s[i + 1].xor(&x).xor(&xtime(&s[i + 1].xor(&s[i + 2])));
            s[i + 2] = s[i + 2].xor(&x).xor(&xtime(&s[i + 2].xor(&s[i + 3])));
            s[i + 3] = s[i + 3].xor(&x).xor(&xtime(&s[i + 3].xor(&y)));
        }
    }

    fn inv_mix_columns(&mut self) {
        for i in (0..BLOCK_BYTES).step_by(4) {
            let s = &mut self.state;
            let m = s[i].xor(&s[i + 2]);
            let n = s[i + 1].xor(&s[i + 3]);
            let x = xtime(&xtime(&m));
            let y = xtime(&xtime(&n));
            s[i] = s[i].xor(&x);
            s[i + 1] = s[i + 1].xor(&y);
            s[i + 2] = s[i + 2].xor(&x);
            s[i + 3] = s[i + 3].xor(&y);
        }
        self.mix_columns();
    }
}

/// GF(2^8) doubling on a masked byte.
///
/// Same computation as [`crate::xtime`], with the conditional reduction
/// expressed through the [LSB splat](lsb_splat) of the shifted-out bit so
/// that every step stays linear over the shares.
fn xtime(a: &Masked<u8>) -> Masked<u8> {
    a.shl(1).xor(&lsb_splat(&a.shr(7)).and_word(0x1b))
}

/// Expand the least significant bit of a masked byte to `0x00` or `0xff`.
///
/// $$
/// m \gets m \oplus (m \ll 1),\quad
/// m \gets m \oplus (m \ll 2),\quad
/// m \gets m \oplus (m \ll 4)
/// $$
///
/// doubles the run of copies of the low bit at each step, using only
/// share-wise linear operations.
#[docext]
fn lsb_splat(bit: &Masked<u8>) -> Masked<u8> {
    let mut m = bit.clone();
    m = m.xor(&m.shl(1));
    m = m.xor(&m.shl(2));
    m = m.xor(&m.shl(4));
    m
}

/// Constant-time multiplication in GF(2^8).
///
/// Classic shift-and-add: over eight steps, `res` absorbs `x` wherever the
/// corresponding bit of `y` is set, with the bit test replaced by an AND
/// against the [splatted](lsb_splat) low bit of `y`.
fn gf_mul<R: Csprng>(x: &Masked<u8>, y: &Masked<u8>, rng: &mut R) -> Masked<u8> {
    let mut x = x.clone();
    let mut y = y.clone();
    let mut res = x.xor(&x); // zero with matching shares
    for _ in 0..8 {
        let mask = lsb_splat(&y.and_word(1));
        res = res.xor(&x.and(&mask, rng));
        y = y.shr(1);
        x = xtime(&x);
    }
    res
}

/// Invert a masked byte in GF(2^8) by raising it to the 254th power.
///
/// Exponentiation by the addition chain
/// $2, 4, 8, 16, 32, 64, 128, 192, 224, 240, 248, 252, 254$,
/// which costs 13 [multiplications](gf_mul).
#[docext]
fn gf_inv<R: Csprng>(a: &Masked<u8>, rng: &mut R) -> Masked<u8> {
    let a2 = gf_mul(a, a, rng);
    let a4 = gf_mul(&a2, &a2, rng);
    let a8 = gf_mul(&a4, &a4, rng);
    let a16 = gf_mul(&a8, &a8, rng);
    let a32 = gf_mul(&a16, &a16, rng);
    let a64 = gf_mul(&a32, &a32, rng);
    let a128 = gf_mul(&a64, &a64, rng);
    let t = gf_mul(&a128, &a64, rng);
    let t = gf_mul(&t, &a32, rng);
    let t = gf_mul(&t, &a16, rng);
    let t = gf_mul(&t, &a8, rng);
    let t = gf_mul(&t, &a4, rng);
    gf_mul(&t, &a2, rng)
}

/// The Rijndael affine map of SubBytes.
///
/// $$
/// y = x \oplus (x \lll 1) \oplus (x \lll 2) \oplus (x \lll 3) \oplus
/// (x \lll 4) \oplus \mathrm{63_{16}}
/// $$
#[docext]
fn affine(x: &Masked<u8>) -> Masked<u8> {
    x.xor(&x.rotl(1))
        .xor(&x.rotl(2))
        .xor(&x.rotl(3))
        .xor(&x.rotl(4))
        .xor_word(0x63)
}

/// The inverse of the [affine map](affine).
///
/// $$
/// x = (y \lll 1) \oplus (y \lll 3) \oplus (y \lll 6) \oplus
/// \mathrm{05_{16}}
/// $$
#[docext]
fn inv_affine(y: &Masked<u8>) -> Masked<u8> {
    y.rotl(1).xor(&y.rotl(3)).xor(&y.rotl(6)).xor_word(0x05)
}
