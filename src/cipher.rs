//! The AES-Blake authenticated cipher.
//!
//! Plaintext and header are processed in groups of `N` 16-byte lanes, where
//! `N` is 2 for [`AesBlake256`] and 4 for [`AesBlake512`]. Every group gets
//! fresh round keys from the [key generator](crate::KeyGen) under a block
//! counter and a [domain separator](crate::KdfDomain), the lanes run their
//! AES rounds in lockstep, and between rounds the driver
//! [exchanges columns](AesBlake::exchange_columns) across lanes so that
//! every output byte depends on the whole group. XOR checksums of the
//! plaintext and of the encrypted header are bound together by one final
//! encryption in the checksum domain, producing a tag of `N * 16` bytes.

use {
    crate::{
        checksum::Checksum,
        keygen::{KdfDomain, KeyGen, Tier, Tier256, Tier512},
    },
    std::{error, fmt},
};

mod block;
mod masked;

pub use {
    block::{AesBlock, MaskedAesBlock, BLOCK_BYTES, INV_S_BOX, S_BOX},
    masked::{MaskedAesBlake, MaskedAesBlake256, MaskedAesBlake512},
};

/// Number of round keys derived per AES lane.
const KEY_COUNT: usize = 11;

/// AES-Blake failure surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Plaintext, ciphertext or header length is not a multiple of the
    /// tier's group size.
    InvalidInput,
    /// The recomputed authentication tag does not match the provided one.
    AuthFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "input length is not a multiple of the group size"),
            Self::AuthFailure => write!(f, "failed to verify the authentication tag"),
        }
    }
}

impl error::Error for Error {}

/// The AES-Blake authenticated cipher with associated data.
///
/// See the [module documentation](self) for the construction. Use the
/// [`AesBlake256`] or [`AesBlake512`] alias, or [`MaskedAesBlake`] for the
/// side-channel resistant variant.
#[derive(Debug, Clone)]
pub struct AesBlake<T: Tier> {
    keygen: KeyGen<T>,
    block_counter: u64,
}

/// Two parallel AES lanes, 32-byte tag.
pub type AesBlake256 = AesBlake<Tier256>;

/// Four parallel AES lanes, 64-byte tag.
pub type AesBlake512 = AesBlake<Tier512>;

impl<T: Tier> AesBlake<T> {
    /// Bytes processed per block group.
    pub const GROUP_BYTES: usize = T::LANES * BLOCK_BYTES;

    /// Length of the authentication tag in bytes.
    pub const TAG_BYTES: usize = T::LANES * BLOCK_BYTES;

    /// Create a cipher instance and digest the context into its key
    /// generator.
    ///
    /// `key`, `nonce` and `context` may be byte strings of any length; they
    /// are zero-padded or truncated to the keygen's word vector sizes.
    pub fn new(key: &[u8], nonce: &[u8], context: &[u8]) -> Self {
        let mut keygen = KeyGen::new(key, nonce, context);
        keygen.digest_context();
        Self {
            keygen,
            block_counter: 0,
        }
    }

    /// Encrypt `plaintext` and authenticate it together with `header`.
    ///
    /// Both inputs must be multiples of [`GROUP_BYTES`](Self::GROUP_BYTES)
    /// long. Returns the ciphertext, which has the length of the plaintext,
    /// and the authentication tag.
    pub fn encrypt(&mut self, plaintext: &[u8], header: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let plaintext_chunks = Self::split_chunks(plaintext)?;
        let header_chunks = Self::split_chunks(header)?;

        let mut checksums = Checksum::create_many(T::LANES);
        let mut ciphertext = Vec::with_capacity(plaintext.len());
        for group in plaintext_chunks.chunks_exact(T::LANES) {
            let blocks = self.run_encryption_rounds(group, KdfDomain::Msg);
            for block in &blocks {
                ciphertext.extend_from_slice(block.state());
            }
            for (checksum, chunk) in checksums.iter_mut().zip(group) {
                checksum.xor_with(chunk);
            }
            self.block_counter += 1;
        }

        let auth_tag = self.compute_auth_tag(&header_chunks, &checksums);
        Ok((ciphertext, auth_tag))
    }

    /// Decrypt `ciphertext`, verifying it and `header` against `auth_tag`.
    ///
    /// Fails with [`Error::AuthFailure`] when the tag does not match, in
    /// which case no plaintext is returned.
    pub fn decrypt(
        &mut self,
        ciphertext: &[u8],
        header: &[u8],
        auth_tag: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let ciphertext_chunks = Self::split_chunks(ciphertext)?;
        let header_chunks = Self::split_chunks(header)?;

        let mut checksums = Checksum::create_many(T::LANES);
        let mut plaintext = Vec::with_capacity(ciphertext.len());
        for group in ciphertext_chunks.chunks_exact(T::LANES) {
            let blocks = self.run_decryption_rounds(group, KdfDomain::Msg);
            for (checksum, block) in checksums.iter_mut().zip(&blocks) {
                plaintext.extend_from_slice(block.state());
                checksum.xor_with(block.state());
            }
            self.block_counter += 1;
        }

        let tag = self.compute_auth_tag(&header_chunks, &checksums);
        if tag != auth_tag {
            return Err(Error::AuthFailure);
        }
        Ok(plaintext)
    }

    /// Split the input into 16-byte chunks, requiring a whole number of
    /// groups.
    fn split_chunks(data: &[u8]) -> Result<Vec<[u8; BLOCK_BYTES]>, Error> {
        if data.len() % Self::GROUP_BYTES != 0 {
            return Err(Error::InvalidInput);
        }
        Ok(data
            .chunks_exact(BLOCK_BYTES)
            .map(|chunk| chunk.try_into().unwrap_or_else(|_| unreachable!()))
            .collect())
    }

    /// Run one group of lanes through their encryption rounds, exchanging
    /// columns after every step.
    fn run_encryption_rounds(
        &self,
        group: &[[u8; BLOCK_BYTES]],
        domain: KdfDomain,
    ) -> Vec<AesBlock> {
        let keys = self.keygen.derive_keys(KEY_COUNT, self.block_counter, domain);
        let mut blocks: Vec<AesBlock> = group
            .iter()
            .zip(keys)
            .map(|(chunk, keys)| AesBlock::new(*chunk, keys))
            .collect();
        loop {
            let mut more = false;
            for block in &mut blocks {
                more = block.encrypt_step();
            }
            Self::exchange_columns(&mut blocks, false);
            if !more {
                break;
            }
        }
        blocks
    }

    /// Run one group of lanes through their decryption rounds, applying the
    /// inverse exchange before every step.
    fn run_decryption_rounds(
        &self,
        group: &[[u8; BLOCK_BYTES]],
        domain: KdfDomain,
    ) -> Vec<AesBlock> {
        let keys = self.keygen.derive_keys(KEY_COUNT, self.block_counter, domain);
        let mut blocks: Vec<AesBlock> = group
            .iter()
            .zip(keys)
            .map(|(chunk, keys)| AesBlock::new(*chunk, keys))
            .collect();
        loop {
            Self::exchange_columns(&mut blocks, true);
            let mut more = false;
            for block in &mut blocks {
                more = block.decrypt_step();
            }
            if !more {
                break;
            }
        }
        blocks
    }

    /// Permute 4-byte state columns between the lanes of a group.
    ///
    /// Column `k` of lane `i` is taken from column `k` of lane
    /// `pattern[i][k]`, with the pattern fixed by the tier.
    pub(crate) fn exchange_columns(blocks: &mut [AesBlock], inverse: bool) {
        let pattern = T::exchange_pattern(inverse);
        let copies: Vec<[u8; BLOCK_BYTES]> = blocks.iter().map(|block| block.state).collect();
        for (block, lanes) in blocks.iter_mut().zip(pattern) {
            for (column, &lane) in lanes.iter().enumerate() {
                let range = 4 * column..4 * column + 4;
                block.state[range.clone()].copy_from_slice(&copies[lane][range]);
            }
        }
    }

    /// Bind the header and the plaintext checksums into the tag.
    ///
    /// The header is encrypted in its own domain and XOR-accumulated into
    /// per-lane header checksums; the plaintext checksums are then
    /// encrypted in the checksum domain and XORed with the header
    /// checksums. Resets the block counter.
    fn compute_auth_tag(
        &mut self,
        header_chunks: &[[u8; BLOCK_BYTES]],
        plaintext_checksums: &[Checksum],
    ) -> Vec<u8> {
        let mut header_checksums = Checksum::create_many(T::LANES);
        for group in header_chunks.chunks_exact(T::LANES) {
            let blocks = self.run_encryption_rounds(group, KdfDomain::Hdr);
            for (checksum, block) in header_checksums.iter_mut().zip(&blocks) {
                checksum.xor_with(block.state());
            }
            self.block_counter += 1;
        }

        let states: Vec<[u8; BLOCK_BYTES]> = plaintext_checksums
            .iter()
            .map(|checksum| *checksum.state())
            .collect();
        let blocks = self.run_encryption_rounds(&states, KdfDomain::Chk);

        let mut tag = Vec::with_capacity(Self::TAG_BYTES);
        for (block, checksum) in blocks.iter().zip(&header_checksums) {
            for (a, b) in block.state().iter().zip(checksum.state()) {
                tag.push(a ^ b);
            }
        }
        self.block_counter = 0;
        tag
    }
}
