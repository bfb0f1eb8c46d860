//! BLAKE-style key derivation.
//!
//! Round keys for the parallel AES lanes are not expanded from the user key
//! directly. Instead, a keyed compression function in the style of BLAKE2
//! digests the caller's context into a 16-word state, and every block group
//! re-initializes that state with a block counter and a domain separator
//! before squeezing out one 128-bit round key per lane per mixing round.
//! The two [tiers](Tier) differ only in word width, rotation schedule, IV
//! constants and domain masks, exactly like the 32- and 64-bit members of
//! the BLAKE family.

use {crate::uint::Word, docext::docext};

mod masked;

pub use masked::{MaskedKeyGen, MaskedRoundKeys};

/// Separates the four uses of derived key material.
///
/// The mask of the active domain is XORed into the state during
/// initialization, so keys derived for one purpose can never collide with
/// keys derived for another, even at equal block counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfDomain {
    /// Context digestion.
    Ctx,
    /// Message block keys.
    Msg,
    /// Header block keys.
    Hdr,
    /// Checksum block keys.
    Chk,
}

/// The round keys of a single AES lane, in round order.
pub type RoundKeys = Vec<[u8; 16]>;

/// Message word permutation applied between mixing rounds.
const SCHEDULE: [usize; 16] = [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8];

/// Strength tier of the cipher, selecting the keygen word width and the
/// number of parallel AES lanes.
pub trait Tier {
    type Word: Word;

    /// Number of AES lanes processed per block group.
    const LANES: usize;

    /// G-mix rotation distances.
    const ROTATIONS: [u32; 4];

    /// Initialization vector constants.
    const IVS: [Self::Word; 8];

    /// Domain separation mask XORed into the last four state words.
    fn domain_mask(domain: KdfDomain) -> Self::Word;

    /// Lane pattern for the cross-lane column exchange between AES rounds.
    fn exchange_pattern(inverse: bool) -> &'static [[usize; 4]];
}

/// Two-lane tier over 32-bit words with a 32-byte tag.
#[derive(Debug, Clone, Copy)]
pub struct Tier256;

/// Four-lane tier over 64-bit words with a 64-byte tag.
#[derive(Debug, Clone, Copy)]
pub struct Tier512;

impl Tier for Tier256 {
    type Word = u32;

    const LANES: usize = 2;

    const ROTATIONS: [u32; 4] = [16, 12, 8, 7];

    // From BLAKE2s, which in turn took them from SHA-256.
    const IVS: [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab,
        0x5be0cd19,
    ];

    fn domain_mask(domain: KdfDomain) -> u32 {
        match domain {
            KdfDomain::Ctx => 0,
            KdfDomain::Msg => 0x00f0000f,
            KdfDomain::Hdr => 0x0f000f00,
            KdfDomain::Chk => 0xf00f0000,
        }
    }

    fn exchange_pattern(_inverse: bool) -> &'static [[usize; 4]] {
        // Swapping every other column between the two lanes is its own
        // inverse.
        &[[0, 1, 0, 1], [1, 0, 1, 0]]
    }
}

impl Tier for Tier512 {
    type Word = u64;

    const LANES: usize = 4;

    const ROTATIONS: [u32; 4] = [32, 24, 16, 63];

    // From BLAKE2b, which in turn took them from SHA-512.
    const IVS: [u64; 8] = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];

    fn domain_mask(domain: KdfDomain) -> u64 {
        match domain {
            KdfDomain::Ctx => 0,
            KdfDomain::Msg => 0x0000ff00000000ff,
            KdfDomain::Hdr => 0x00ff000000ff0000,
            KdfDomain::Chk => 0xff0000ff00000000,
        }
    }

    fn exchange_pattern(inverse: bool) -> &'static [[usize; 4]] {
        if inverse {
            &[[0, 3, 2, 1], [1, 0, 3, 2], [2, 1, 0, 3], [3, 2, 1, 0]]
        } else {
            &[[0, 1, 2, 3], [1, 2, 3, 0], [2, 3, 0, 1], [3, 0, 1, 2]]
        }
    }
}

/// BLAKE-style keyed state producing AES round keys.
#[derive(Debug)]
pub struct KeyGen<T: Tier> {
    pub(crate) key: [T::Word; 8],
    pub(crate) nonce: [T::Word; 8],
    pub(crate) context: [T::Word; 16],
    pub(crate) knc: [T::Word; 16],
    pub(crate) state: [T::Word; 16],
}

impl<T: Tier> Clone for KeyGen<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            nonce: self.nonce,
            context: self.context,
            knc: self.knc,
            state: self.state,
        }
    }
}

impl<T: Tier> KeyGen<T> {
    /// Build a key generator from raw byte strings.
    ///
    /// Each input is zero-padded on the right and truncated to its word
    /// vector size (8 words for key and nonce, 16 for the context), read in
    /// big-endian chunks. The caller is expected to
    /// [digest the context](Self::digest_context) before deriving keys.
    pub fn new(key: &[u8], nonce: &[u8], context: &[u8]) -> Self {
        let mut keygen = Self {
            key: words_from_bytes(key),
            nonce: words_from_bytes(nonce),
            context: words_from_bytes(context),
            knc: [<T::Word as Word>::ZERO; 16],
            state: [<T::Word as Word>::ZERO; 16],
        };
        keygen.knc = key_nonce_composite(&keygen.key, &keygen.nonce);
        keygen
    }

    /// Initialize the 16-word state for one compression.
    ///
    /// Layout: words 0..4 are the first IV constants, words 4..12 the
    /// entropy words with the low and high counter halves added into
    /// words 4..8 and 8..12 respectively, and words 12..16 the remaining
    /// IV constants XORed with the domain mask.
    pub(crate) fn init_state_vector(
        &mut self,
        entropy: &[T::Word; 8],
        counter: u64,
        domain: KdfDomain,
    ) {
        let ivs = T::IVS;
        self.state[..4].copy_from_slice(&ivs[..4]);
        self.state[4..12].copy_from_slice(entropy);
        self.state[12..].copy_from_slice(&ivs[4..]);

        let ctr_low = <T::Word as Word>::from_u64(counter & 0xffff_ffff);
        let ctr_high = <T::Word as Word>::from_u64(counter >> 32);
        for i in 4..8 {
            self.state[i] = self.state[i].wrapping_add(ctr_low);
            self.state[i + 4] = self.state[i + 4].wrapping_add(ctr_high);
        }

        let mask = T::domain_mask(domain);
        for word in &mut self.state[12..] {
            *word = *word ^ mask;
        }
    }

    /// The G mixing function applied to four state words.
    ///
    /// Two rounds of add-xor-rotate with the message words $m_x$ and $m_y$:
    ///
    /// $$
    /// v_a \gets v_a + v_b + m_x \pmod{2^W}\\
    /// v_d \gets (v_d \oplus v_a) \ggg r_0\\
    /// v_c \gets v_c + v_d \pmod{2^W}\\
    /// v_b \gets (v_b \oplus v_c) \ggg r_1\\
    /// v_a \gets v_a + v_b + m_y \pmod{2^W}\\
    /// v_d \gets (v_d \oplus v_a) \ggg r_2\\
    /// v_c \gets v_c + v_d \pmod{2^W}\\
    /// v_b \gets (v_b \oplus v_c) \ggg r_3
    /// $$
    ///
    /// where $\ggg$ is rotation to the right by the tier's rotation
    /// distances $r_0, \dots, r_3$.
    #[docext]
    fn g_mix(&mut self, a: usize, b: usize, c: usize, d: usize, mx: T::Word, my: T::Word) {
        let rot = T::ROTATIONS;
        let v = &mut self.state;
        v[a] = v[a].wrapping_add(v[b]).wrapping_add(mx);
        v[d] = (v[d] ^ v[a]).rotr(rot[0]);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotr(rot[1]);
        v[a] = v[a].wrapping_add(v[b]).wrapping_add(my);
        v[d] = (v[d] ^ v[a]).rotr(rot[2]);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotr(rot[3]);
    }

    /// One full mixing round: [G](Self::g_mix) down the four columns of the
    /// state matrix, then down the four diagonals.
    pub(crate) fn mix_into_state(&mut self, m: &[T::Word; 16]) {
        self.g_mix(0, 4, 8, 12, m[0], m[1]);
        self.g_mix(1, 5, 9, 13, m[2], m[3]);
        self.g_mix(2, 6, 10, 14, m[4], m[5]);
        self.g_mix(3, 7, 11, 15, m[6], m[7]);
        self.g_mix(0, 5, 10, 15, m[8], m[9]);
        self.g_mix(1, 6, 11, 12, m[10], m[11]);
        self.g_mix(2, 7, 8, 13, m[12], m[13]);
        self.g_mix(3, 4, 9, 14, m[14], m[15]);
    }

    /// Digest the context into the state through ten rounds of compression.
    ///
    /// The state is initialized from the key with a zero counter in the
    /// [context domain](KdfDomain::Ctx), then mixed with the context vector
    /// ten times, permuting the context between rounds except after the
    /// last. Called once per cipher instance.
    pub fn digest_context(&mut self) {
        let key = self.key;
        self.init_state_vector(&key, 0, KdfDomain::Ctx);
        for _ in 0..9 {
            let context = self.context;
            self.mix_into_state(&context);
            self.context = permute(&self.context);
        }
        let context = self.context;
        self.mix_into_state(&context);
    }

    /// Derive `key_count` round keys for every AES lane of the tier.
    ///
    /// The digested state is split into two 8-word entropy sources, `E1`
    /// from state words 0..4 and 8..12 and `E2` from the rest. For each
    /// source a clone of the keygen is re-initialized with the entropy, the
    /// block counter and the domain, and one mixing round with the
    /// key/nonce composite is run per round key, permuting the composite
    /// between rounds except after the last. Each round contributes the
    /// big-endian bytes of state words 4..8, which split into one 16-byte
    /// key (32-bit tier) or two (64-bit tier) per source.
    ///
    /// Works on clones throughout, so the generator observed by the caller
    /// is not modified.
    pub fn derive_keys(
        &self,
        key_count: usize,
        block_counter: u64,
        domain: KdfDomain,
    ) -> Vec<RoundKeys> {
        let mut entropy_1 = [<T::Word as Word>::ZERO; 8];
        entropy_1[..4].copy_from_slice(&self.state[..4]);
        entropy_1[4..].copy_from_slice(&self.state[8..12]);
        let mut entropy_2 = [<T::Word as Word>::ZERO; 8];
        entropy_2[..4].copy_from_slice(&self.state[4..8]);
        entropy_2[4..].copy_from_slice(&self.state[12..]);

        let keys_per_source = T::LANES / 2;
        let mut lanes: Vec<RoundKeys> = (0..T::LANES).map(|_| Vec::new()).collect();

        for (source, entropy) in [entropy_1, entropy_2].iter().enumerate() {
            let mut keygen = self.clone();
            keygen.init_state_vector(entropy, block_counter, domain);
            for round in 0..key_count {
                let knc = keygen.knc;
                keygen.mix_into_state(&knc);
                let mut bytes = Vec::with_capacity(4 * <T::Word as Word>::BYTES);
                for word in &keygen.state[4..8] {
                    bytes.extend_from_slice(word.to_be_bytes().as_ref());
                }
                for (lane, chunk) in bytes.chunks_exact(16).enumerate() {
                    let mut key = [0; 16];
                    key.copy_from_slice(chunk);
                    lanes[source * keys_per_source + lane].push(key);
                }
                if round + 1 < key_count {
                    keygen.knc = permute(&keygen.knc);
                }
            }
        }
        lanes
    }
}

/// Reorder the 16 message words through the fixed permutation schedule.
pub(crate) fn permute<E: Clone>(m: &[E; 16]) -> [E; 16] {
    std::array::from_fn(|i| m[SCHEDULE[i]].clone())
}

/// Convert a byte string into `N` words by zero right-padding, truncating to
/// the exact size, and reading big-endian chunks.
pub(crate) fn words_from_bytes<W: Word, const N: usize>(data: &[u8]) -> [W; N] {
    let size = N * W::BYTES;
    let mut padded = vec![0; size];
    let take = data.len().min(size);
    padded[..take].copy_from_slice(&data[..take]);
    let mut out = [W::ZERO; N];
    for (word, chunk) in out.iter_mut().zip(padded.chunks_exact(W::BYTES)) {
        let mut bytes = <W::Bytes as Default>::default();
        bytes.as_mut().copy_from_slice(chunk);
        *word = W::from_be_bytes(bytes);
    }
    out
}

/// Interleave the key and nonce vectors through upper/lower half-bit masks.
///
/// Every key/nonce word pair contributes two composite words, one taking
/// the upper half-bits from the key and the lower from the nonce, the other
/// the opposite.
pub(crate) fn key_nonce_composite<W: Word>(key: &[W; 8], nonce: &[W; 8]) -> [W; 16] {
    let lower = W::MAX >> (W::BITS / 2);
    let upper = !lower;
    let mut out = [W::ZERO; 16];
    for i in 0..8 {
        out[2 * i] = (key[i] & upper) | (nonce[i] & lower);
        out[2 * i + 1] = (nonce[i] & upper) | (key[i] & lower);
    }
    out
}
