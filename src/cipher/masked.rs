//! The AES-Blake cipher over masked state.
//!
//! Same construction as the [plain driver](super::AesBlake), with every
//! secret byte split into boolean shares: round keys come from the
//! [masked key generator](MaskedKeyGen), the lanes are
//! [masked AES blocks](MaskedAesBlock), and the checksums accumulate masked
//! bytes. Shares are only recombined at the API boundary, when the
//! ciphertext and the tag leave the cipher.

use crate::{
    checksum::MaskedChecksum,
    cipher::{
        block::{MaskedAesBlock, BLOCK_BYTES},
        AesBlake, Error, KEY_COUNT,
    },
    keygen::{KdfDomain, MaskedKeyGen, Tier, Tier256, Tier512},
    masked::{Domain, Masked},
    random::Csprng,
};

/// First-order masking, the default for the masked cipher.
const DEFAULT_ORDER: usize = 1;

/// The AES-Blake cipher with boolean-masked internals.
///
/// Produces the same ciphertexts and tags as [`AesBlake`] of the same tier,
/// at a considerable cost in time and randomness: every nonlinear operation
/// on every share pair draws fresh words from the [CSPRNG](Csprng).
#[derive(Debug)]
pub struct MaskedAesBlake<T: Tier, R: Csprng> {
    keygen: MaskedKeyGen<T>,
    rng: R,
    order: usize,
    block_counter: u64,
}

/// Two masked AES lanes, 32-byte tag.
pub type MaskedAesBlake256<R> = MaskedAesBlake<Tier256, R>;

/// Four masked AES lanes, 64-byte tag.
pub type MaskedAesBlake512<R> = MaskedAesBlake<Tier512, R>;

impl<T: Tier, R: Csprng> MaskedAesBlake<T, R> {
    /// Bytes processed per block group.
    pub const GROUP_BYTES: usize = T::LANES * BLOCK_BYTES;

    /// Length of the authentication tag in bytes.
    pub const TAG_BYTES: usize = T::LANES * BLOCK_BYTES;

    /// Create a first-order masked cipher instance.
    pub fn new(key: &[u8], nonce: &[u8], context: &[u8], rng: R) -> Self {
        Self::with_order(key, nonce, context, DEFAULT_ORDER, rng)
    }

    /// Create a masked cipher instance with `order` masks per share.
    pub fn with_order(key: &[u8], nonce: &[u8], context: &[u8], order: usize, mut rng: R) -> Self {
        let mut keygen = MaskedKeyGen::new(key, nonce, context, order, &mut rng);
        keygen.digest_context(&mut rng);
        Self {
            keygen,
            rng,
            order,
            block_counter: 0,
        }
    }

    /// Encrypt `plaintext` and authenticate it together with `header`.
    ///
    /// Same contract as [`AesBlake::encrypt`].
    pub fn encrypt(&mut self, plaintext: &[u8], header: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let plaintext_chunks = AesBlake::<T>::split_chunks(plaintext)?;
        let header_chunks = AesBlake::<T>::split_chunks(header)?;

        let mut checksums = MaskedChecksum::create_many(T::LANES, self.order, &mut self.rng);
        let mut ciphertext = Vec::with_capacity(plaintext.len());
        for group in plaintext_chunks.chunks_exact(T::LANES) {
            let states = self.mask_group(group);
            let blocks = self.run_encryption_rounds(states, KdfDomain::Msg);
            for block in &blocks {
                ciphertext.extend_from_slice(&block.unmask_state());
            }
            for (checksum, chunk) in checksums.iter_mut().zip(group) {
                checksum.xor_bytes(chunk);
            }
            self.block_counter += 1;
        }

        let auth_tag = self.compute_auth_tag(&header_chunks, &checksums);
        Ok((ciphertext, auth_tag))
    }

    /// Decrypt `ciphertext`, verifying it and `header` against `auth_tag`.
    ///
    /// Same contract as [`AesBlake::decrypt`].
    pub fn decrypt(
        &mut self,
        ciphertext: &[u8],
        header: &[u8],
        auth_tag: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let ciphertext_chunks = AesBlake::<T>::split_chunks(ciphertext)?;
        let header_chunks = AesBlake::<T>::split_chunks(header)?;

        let mut checksums = MaskedChecksum::create_many(T::LANES, self.order, &mut self.rng);
        let mut plaintext = Vec::with_capacity(ciphertext.len());
        for group in ciphertext_chunks.chunks_exact(T::LANES) {
            let states = self.mask_group(group);
            let blocks = self.run_decryption_rounds(states, KdfDomain::Msg);
            for (checksum, block) in checksums.iter_mut().zip(&blocks) {
                plaintext.extend_from_slice(&block.unmask_state());
                checksum.xor_masked(block.state());
            }
            self.block_counter += 1;
        }

        let tag = self.compute_auth_tag(&header_chunks, &checksums);
        if tag != auth_tag {
            return Err(Error::AuthFailure);
        }
        Ok(plaintext)
    }

    /// Split each chunk of a group into masked bytes.
    fn mask_group(&mut self, group: &[[u8; BLOCK_BYTES]]) -> Vec<Vec<Masked<u8>>> {
        group
            .iter()
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&byte| Masked::new(byte, Domain::Boolean, self.order, &mut self.rng))
                    .collect()
            })
            .collect()
    }

    fn run_encryption_rounds(
        &mut self,
        states: Vec<Vec<Masked<u8>>>,
        domain: KdfDomain,
    ) -> Vec<MaskedAesBlock> {
        let keys = self
            .keygen
            .derive_keys(KEY_COUNT, self.block_counter, domain, &mut self.rng);
        let mut blocks: Vec<MaskedAesBlock> = states
            .into_iter()
            .zip(keys)
            .map(|(state, keys)| MaskedAesBlock::new(state, keys))
            .collect();
        loop {
            let mut more = false;
            for block in &mut blocks {
                more = block.encrypt_step(&mut self.rng);
            }
            Self::exchange_columns(&mut blocks, false);
            if !more {
                break;
            }
        }
        blocks
    }

    fn run_decryption_rounds(
        &mut self,
        states: Vec<Vec<Masked<u8>>>,
        domain: KdfDomain,
    ) -> Vec<MaskedAesBlock> {
        let keys = self
            .keygen
            .derive_keys(KEY_COUNT, self.block_counter, domain, &mut self.rng);
        let mut blocks: Vec<MaskedAesBlock> = states
            .into_iter()
            .zip(keys)
            .map(|(state, keys)| MaskedAesBlock::new(state, keys))
            .collect();
        loop {
            Self::exchange_columns(&mut blocks, true);
            let mut more = false;
            for block in &mut blocks {
                more = block.decrypt_step(&mut self.rng);
            }
            if !more {
                break;
            }
        }
        blocks
    }

    /// Permute masked state columns between lanes, cloning shares whole so
    /// the sharing of each byte is preserved.
    fn exchange_columns(blocks: &mut [MaskedAesBlock], inverse: bool) {
        let pattern = T::exchange_pattern(inverse);
        let copies: Vec<Vec<Masked<u8>>> = blocks.iter().map(|block| block.state.clone()).collect();
        for (block, lanes) in blocks.iter_mut().zip(pattern) {
            for (column, &lane) in lanes.iter().enumerate() {
                for i in 4 * column..4 * column + 4 {
                    block.state[i] = copies[lane][i].clone();
                }
            }
        }
    }

    fn compute_auth_tag(
        &mut self,
        header_chunks: &[[u8; BLOCK_BYTES]],
        plaintext_checksums: &[MaskedChecksum],
    ) -> Vec<u8> {
        let mut header_checksums = MaskedChecksum::create_many(T::LANES, self.order, &mut self.rng);
        for group in header_chunks.chunks_exact(T::LANES) {
            let states = self.mask_group(group);
            let blocks = self.run_encryption_rounds(states, KdfDomain::Hdr);
            for (checksum, block) in header_checksums.iter_mut().zip(&blocks) {
                checksum.xor_masked(block.state());
            }
            self.block_counter += 1;
        }

        let states: Vec<Vec<Masked<u8>>> = plaintext_checksums
            .iter()
            .map(|checksum| checksum.state().to_vec())
            .collect();
        let blocks = self.run_encryption_rounds(states, KdfDomain::Chk);

        let mut tag = Vec::with_capacity(Self::TAG_BYTES);
        for (block, checksum) in blocks.iter().zip(&header_checksums) {
            for (a, b) in block.state().iter().zip(checksum.state()) {
                tag.push(a.xor(b).unmask());
            }
        }
        self.block_counter = 0;
        tag
    }
}
