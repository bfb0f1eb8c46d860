//! Key derivation over masked words.
//!
//! Mirrors the [plain generator](super::KeyGen) with every state word split
//! into boolean or arithmetic shares. The mixing function needs both
//! algebras, additions in the arithmetic domain and XOR-rotates in the
//! boolean one, so operands are converted on the fly; both conversions are
//! no-ops when a word is already in the required domain, and no word is
//! ever unmasked.

use {
    super::{key_nonce_composite, permute, words_from_bytes, KdfDomain, Tier},
    crate::{
        masked::{Domain, Masked},
        random::Csprng,
        uint::Word,
    },
    std::array,
};

/// The round keys of a single AES lane as boolean-masked bytes.
pub type MaskedRoundKeys = Vec<Vec<Masked<u8>>>;

/// BLAKE-style key generator operating on masked words.
#[derive(Debug)]
pub struct MaskedKeyGen<T: Tier> {
    pub(crate) key: [Masked<T::Word>; 8],
    pub(crate) context: [Masked<T::Word>; 16],
    pub(crate) knc: [Masked<T::Word>; 16],
    pub(crate) state: [Masked<T::Word>; 16],
    order: usize,
}

impl<T: Tier> Clone for MaskedKeyGen<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            context: self.context.clone(),
            knc: self.knc.clone(),
            state: self.state.clone(),
            order: self.order,
        }
    }
}

impl<T: Tier> MaskedKeyGen<T> {
    /// Build a masked key generator from raw byte strings, sharing every
    /// word at the given masking order.
    pub fn new<R: Csprng>(
        key: &[u8],
        nonce: &[u8],
        context: &[u8],
        order: usize,
        rng: &mut R,
    ) -> Self {
        let key_words: [T::Word; 8] = words_from_bytes(key);
        let nonce_words: [T::Word; 8] = words_from_bytes(nonce);
        let knc_words = key_nonce_composite(&key_words, &nonce_words);
        let context_words: [T::Word; 16] = words_from_bytes(context);

        let key = array::from_fn(|i| Masked::new(key_words[i], Domain::Boolean, order, rng));
        let knc = array::from_fn(|i| Masked::new(knc_words[i], Domain::Arithmetic, order, rng));
        let context =
            array::from_fn(|i| Masked::new(context_words[i], Domain::Arithmetic, order, rng));
        let state = array::from_fn(|_| Masked::new(<T::Word as Word>::ZERO, Domain::Arithmetic, order, rng));

        Self {
            key,
            context,
            knc,
            state,
            order,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    fn init_state_vector<R: Csprng>(
        &mut self,
        entropy: &[Masked<T::Word>; 8],
        counter: u64,
        domain: KdfDomain,
        rng: &mut R,
    ) {
        for i in 0..4 {
            self.state[i] = Masked::new(T::IVS[i], Domain::Arithmetic, self.order, rng);
        }
        for i in 0..8 {
            self.state[4 + i] = entropy[i].clone();
        }

        let ctr_low = <T::Word as Word>::from_u64(counter & 0xffff_ffff);
        let ctr_high = <T::Word as Word>::from_u64(counter >> 32);
        for i in 4..8 {
            let mut word = self.state[i].clone();
            word.btoa(rng);
            self.state[i] = word.add_word(ctr_low);
            let mut word = self.state[i + 4].clone();
            word.btoa(rng);
            self.state[i + 4] = word.add_word(ctr_high);
        }

        // The IVs and the domain mask are public, so their XOR is computed
        // on plain words before sharing.
        let mask = T::domain_mask(domain);
        for i in 0..4 {
            self.state[12 + i] = Masked::new(T::IVS[4 + i] ^ mask, Domain::Boolean, self.order, rng);
        }
    }

    fn g_mix<R: Csprng>(
        &mut self,
        a: usize,
        b: usize,
        c: usize,
        d: usize,
        mx: &Masked<T::Word>,
        my: &Masked<T::Word>,
        rng: &mut R,
    ) {
        let rot = T::ROTATIONS;
        let va = arith(&self.state[a], rng)
            .add(&arith(&self.state[b], rng))
            .add(&arith(mx, rng));
        let vd = boolean(&self.state[d], rng)
            .xor(&boolean(&va, rng))
            .rotr(rot[0]);
        let vc = arith(&self.state[c], rng).add(&arith(&vd, rng));
        let vb = boolean(&self.state[b], rng)
            .xor(&boolean(&vc, rng))
            .rotr(rot[1]);
        let va = arith(&va, rng).add(&arith(&vb, rng)).add(&arith(my, rng));
        let vd = boolean(&vd, rng).xor(&boolean(&va, rng)).rotr(rot[2]);
        let vc = arith(&vc, rng).add(&arith(&vd, rng));
        let vb = boolean(&vb, rng).xor(&boolean(&vc, rng)).rotr(rot[3]);
        self.state[a] = va;
        self.state[b] = vb;
        self.state[c] = vc;
        self.state[d] = vd;
    }

    fn mix_into_state<R: Csprng>(&mut self, m: &[Masked<T::Word>; 16], rng: &mut R) {
        self.g_mix(0, 4, 8, 12, &m[0], &m[1], rng);
        self.g_mix(1, 5, 9, 13, &m[2], &m[3], rng);
        self.g_mix(2, 6, 10, 14, &m[4], &m[5], rng);
        self.g_mix(3, 7, 11, 15, &m[6], &m[7], rng);
        self.g_mix(0, 5, 10, 15, &m[8], &m[9], rng);
        self.g_mix(1, 6, 11, 12, &m[10], &m[11], rng);
        self.g_mix(2, 7, 8, 13, &m[12], &m[13], rng);
        self.g_mix(3, 4, 9, 14, &m[14], &m[15], rng);
    }

    /// Digest the context into the state, as the plain generator does.
    pub fn digest_context<R: Csprng>(&mut self, rng: &mut R) {
        let key = self.key.clone();
        self.init_state_vector(&key, 0, KdfDomain::Ctx, rng);
        for _ in 0..9 {
            let context = self.context.clone();
            self.mix_into_state(&context, rng);
            self.context = permute(&self.context);
        }
        let context = self.context.clone();
        self.mix_into_state(&context, rng);
    }

    /// Derive `key_count` round keys per lane as boolean-masked bytes.
    ///
    /// Identical round structure to the
    /// [plain derivation](super::KeyGen::derive_keys); the extracted state
    /// words are split into masked bytes instead of plain ones.
    pub fn derive_keys<R: Csprng>(
        &self,
        key_count: usize,
        block_counter: u64,
        domain: KdfDomain,
        rng: &mut R,
    ) -> Vec<MaskedRoundKeys> {
        let entropy_1: [Masked<T::Word>; 8] = array::from_fn(|i| {
            if i < 4 {
                self.state[i].clone()
            } else {
                self.state[i + 4].clone()
            }
        });
        let entropy_2: [Masked<T::Word>; 8] = array::from_fn(|i| {
            if i < 4 {
                self.state[i + 4].clone()
            } else {
                self.state[i + 8].clone()
            }
        });

        let keys_per_source = T::LANES / 2;
        let mut lanes: Vec<MaskedRoundKeys> = (0..T::LANES).map(|_| Vec::new()).collect();

        for (source, entropy) in [entropy_1, entropy_2].iter().enumerate() {
            let mut keygen = self.clone();
            keygen.init_state_vector(entropy, block_counter, domain, rng);
            for round in 0..key_count {
                let knc = keygen.knc.clone();
                keygen.mix_into_state(&knc, rng);
                let mut bytes = Vec::with_capacity(4 * <T::Word as Word>::BYTES);
                for word in &keygen.state[4..8] {
                    let mut word = word.clone();
                    bytes.extend(word.to_masked_bytes(rng));
                }
                for (lane, chunk) in bytes.chunks_exact(16).enumerate() {
                    lanes[source * keys_per_source + lane].push(chunk.to_vec());
                }
                if round + 1 < key_count {
                    keygen.knc = permute(&keygen.knc);
                }
            }
        }
        lanes
    }
}

/// Clone of `word` converted to the arithmetic domain.
fn arith<W: Word, R: Csprng>(word: &Masked<W>, rng: &mut R) -> Masked<W> {
    let mut word = word.clone();
    word.btoa(rng);
    word
}

/// Clone of `word` converted to the boolean domain.
fn boolean<W: Word, R: Csprng>(word: &Masked<W>, rng: &mut R) -> Masked<W> {
    let mut word = word.clone();
    word.atob(rng);
    word
}
