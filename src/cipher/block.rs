//! The AES-128 block engine driven in cooperative rounds.
//!
//! Each lane of a block group is a standard AES-128 state with 11 derived
//! round keys, but the rounds do not run to completion in one call.
//! Between rounds the [driver](crate::AesBlake) exchanges state columns
//! across all lanes of the group, so the engine exposes an explicit step
//! machine: [`encrypt_step`](AesBlock::encrypt_step) advances one lane to
//! its next exchange point and reports whether more exchanges are needed.
//! All lanes advance in lockstep; the ordering of steps and exchanges is a
//! correctness requirement, not a scheduling choice.

use crate::{keygen::RoundKeys, uint::xtime};

mod masked;
mod sbox;

pub use {
    masked::MaskedAesBlock,
    sbox::{INV_S_BOX, S_BOX},
};

/// Size of one AES block in bytes.
pub const BLOCK_BYTES: usize = 16;

/// A single AES-128 lane with its derived round keys.
#[derive(Debug, Clone)]
pub struct AesBlock {
    pub(crate) state: [u8; BLOCK_BYTES],
    round_keys: RoundKeys,
    round: usize,
}

impl AesBlock {
    pub fn new(data: [u8; BLOCK_BYTES], round_keys: RoundKeys) -> Self {
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

    pub fn state(&self) -> &[u8; BLOCK_BYTES] {
        &self.state
    }

    fn n_rounds(&self) -> usize {
        self.round_keys.len() - 1
    }

    /// Advance encryption to the next column-exchange point.
    ///
    /// The first step applies the initial round key, the following steps one
    /// full round each, and the last step also finishes with the final
    /// unmixed round. Returns false once no further exchange is needed; the
    /// driver still exchanges once after the final step.
    pub fn encrypt_step(&mut self) -> bool {
        let n = self.n_rounds();
        match self.round {
            0 => self.add_round_key(0),
            r if r < n - 1 => {
                self.sub_bytes();
                self.shift_rows();
                self.mix_columns();
                self.add_round_key(r);
            }
            r if r == n - 1 => {
                self.sub_bytes();
                self.shift_rows();
                self.mix_columns();
                self.add_round_key(r);
                self.sub_bytes();
                self.shift_rows();
                self.add_round_key(n);
            }
            _ => unreachable!("block already encrypted"),
        }
        self.round += 1;
        self.round <= n - 1
    }

    /// Advance decryption to the next column-exchange point.
    ///
    /// Mirrors [`encrypt_step`](Self::encrypt_step) in reverse; the driver
    /// applies the inverse exchange before every step.
    pub fn decrypt_step(&mut self) -> bool {
        let n = self.n_rounds();
        match self.round {
            0 => {
                self.add_round_key(n);
                self.inv_shift_rows();
                self.inv_sub_bytes();
                self.add_round_key(n - 1);
                self.inv_mix_columns();
                self.inv_shift_rows();
                self.inv_sub_bytes();
            }
            r if r < n - 1 => {
                self.add_round_key(n - 1 - r);
                self.inv_mix_columns();
                self.inv_shift_rows();
                self.inv_sub_bytes();
            }
            r if r == n - 1 => self.add_round_key(0),
            _ => unreachable!("block already decrypted"),
        }
        self.round += 1;
        self.round <= n - 1
    }

    /// XOR the round key into the state.
    fn add_round_key(&mut self, index: usize) {
        for (s, k) in self.state.iter_mut().zip(&self.round_keys[index]) {
            *s ^= k;
        }
    }

    /// Replace each state byte through the [forward S-box](S_BOX).
    pub(crate) fn sub_bytes(&mut self) {
        for b in &mut self.state {
            *b = S_BOX[usize::from(*b)];
        }
    }

    /// Replace each state byte through the [inverse S-box](INV_S_BOX).
    pub(crate) fn inv_sub_bytes(&mut self) {
        for b in &mut self.state {
            *b = INV_S_BOX[usize::from(*b)];
        }
    }

    /// Rotate rows 1, 2 and 3 of the state matrix left by their row index.
    fn shift_rows(&mut self) {
        let s = &mut self.state;
        // Second row rotates by one.
        s.swap(1, 5);
        s.swap(5, 9);
        s.swap(9, 13);
        // Third row rotates by two.
        s.swap(2, 10);
        s.swap(6, 14);
        // Fourth row rotates by three.
        s.swap(15, 11);
        s.swap(11, 7);
        s.swap(7, 3);
    }

    /// Inverse of [`shift_rows`](Self::shift_rows).
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

    /// Mix each state column as a polynomial over GF(2^8).
    ///
    /// Expressed entirely through [`xtime`] and XOR: with column bytes
    /// `(a, b, c, d)` and `x` their XOR, each byte absorbs `x` and the
    /// doubled difference to its lower neighbour, which works out to the
    /// standard MixColumns matrix.
    fn mix_columns(&mut self) {
        for i in (0..BLOCK_BYTES).step_by(4) {
            let s = &mut self.state;
            let x = s[i] ^ s[i + 1] ^ s[i + 2] ^ s[i + 3];
            let y = s[i];
            s[i] ^= x ^ xtime(s[i] ^ s[i + 1]);
            s[i + 1] ^= x ^ xtime(s[i + 1] ^ s[i + 2]);
            s[i + 2] ^= x ^ xtime(s[i + 2] ^ s[i + 3]);
            s[i + 3] ^= x ^ xtime(s[i + 3] ^ y);
        }
    }

    /// Inverse of [`mix_columns`](Self::mix_columns).
    ///
    /// The inverse matrix factors into a quadrupling pre-step followed by
    /// the forward mix.
    fn inv_mix_columns(&mut self) {
        for i in (0..BLOCK_BYTES).step_by(4) {
            let s = &mut self.state;
            let m = s[i] ^ s[i + 2];
            let n = s[i + 1] ^ s[i + 3];
            let x = xtime(xtime(m));
            let y = xtime(xtime(n));
            s[i] ^= x;
            s[i + 1] ^= y;
            s[i + 2] ^= x;
            s[i + 3] ^= y;
        }
        self.mix_columns();
    }
}
