//! Source of randomness for the masking gadgets.
//!
//! Every fresh mask drawn by the [masked integers](crate::Masked) must come
//! from a cryptographically secure generator, otherwise the shares become
//! predictable and the masking provides no protection. The [`Csprng`] trait
//! is the seam between the masking code and the generator: production code
//! passes [`rand::rngs::OsRng`], while tests substitute a seeded
//! [`rand::rngs::StdRng`] to make the masked variants deterministic.

use {
    crate::Word,
    rand::{CryptoRng, RngCore},
};

/// Cryptographically secure pseudorandom number generator.
pub trait Csprng {
    /// Fill `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

impl<R: RngCore + CryptoRng> Csprng for R {
    fn fill(&mut self, buf: &mut [u8]) {
        self.fill_bytes(buf)
    }
}

/// Draw a uniformly random word from the generator.
pub(crate) fn random_word<W: Word, R: Csprng + ?Sized>(rng: &mut R) -> W {
    let mut bytes = <W::Bytes as Default>::default();
    rng.fill(bytes.as_mut());
    W::from_be_bytes(bytes)
}
