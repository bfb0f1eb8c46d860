//! XOR accumulators binding processed blocks into the authentication tag.

use crate::{
    cipher::BLOCK_BYTES,
    masked::{Domain, Masked},
    random::Csprng,
};

/// A 16-byte XOR accumulator, one per AES lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksum {
    pub(crate) state: [u8; BLOCK_BYTES],
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// One fresh checksum per lane.
    pub fn create_many(count: usize) -> Vec<Self> {
        (0..count).map(|_| Self::new()).collect()
    }

    pub fn xor_with(&mut self, data: &[u8; BLOCK_BYTES]) {
        for (s, d) in self.state.iter_mut().zip(data) {
            *s ^= d;
        }
    }

    pub fn state(&self) -> &[u8; BLOCK_BYTES] {
        &self.state
    }
}

/// A [`Checksum`] over boolean-masked bytes.
#[derive(Debug, Clone)]
pub struct MaskedChecksum {
    pub(crate) state: Vec<Masked<u8>>,
}

impl MaskedChecksum {
    /// A checksum of 16 masked zero bytes.
    pub fn new<R: Csprng>(order: usize, rng: &mut R) -> Self {
        Self {
            state: (0..BLOCK_BYTES)
                .map(|_| Masked::new(0, Domain::Boolean, order, rng))
                .collect(),
        }
    }

    pub fn create_many<R: Csprng>(count: usize, order: usize, rng: &mut R) -> Vec<Self> {
        (0..count).map(|_| Self::new(order, rng)).collect()
    }

    /// Fold plain bytes into the accumulator.
    pub fn xor_bytes(&mut self, data: &[u8; BLOCK_BYTES]) {
        for (s, &d) in self.state.iter_mut().zip(data) {
            *s = s.xor_word(d);
        }
    }

    /// Fold masked bytes into the accumulator.
    pub fn xor_masked(&mut self, data: &[Masked<u8>]) {
        for (s, d) in self.state.iter_mut().zip(data) {
            *s = s.xor(d);
        }
    }

    pub fn state(&self) -> &[Masked<u8>] {
        &self.state
    }
}
