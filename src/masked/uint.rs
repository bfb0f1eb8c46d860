use {
    crate::{
        random::{random_word, Csprng},
        Word,
    },
    docext::docext,
};

/// How the shares of a [masked integer](Masked) recombine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Shares recombine under XOR.
    Boolean,
    /// Shares recombine under addition modulo the word size.
    Arithmetic,
}

/// An unsigned integer split into `order + 1` random shares.
///
/// The first share is the masked value, the rest are the masks. In the
/// [boolean domain](Domain::Boolean) the secret is the XOR of all shares; in
/// the [arithmetic domain](Domain::Arithmetic) it is their sum modulo $2^W$.
/// Every share has the full width of the underlying word, and the masks are
/// drawn from a [CSPRNG](Csprng), so any `order` shares taken together are
/// uniformly random and carry no information about the secret.
///
/// Operations never recombine the shares: linear operations apply share-wise
/// and nonlinear ones go through the [DOM gadget](Self::and). Calling code
/// converts between the domains with [`btoa`](Self::btoa) and
/// [`atob`](Self::atob) as the mix of operations requires.
///
/// # Panics
///
/// Mixing operands of different masking orders, or applying an operation in
/// the wrong domain, is a programming error and panics.
#[docext]
#[derive(Debug, Clone)]
pub struct Masked<W> {
    domain: Domain,
    masked: W,
    masks: Vec<W>,
}

pub type MaskedU8 = Masked<u8>;
pub type MaskedU32 = Masked<u32>;
pub type MaskedU64 = Masked<u64>;

impl<W: Word> Masked<W> {
    /// Mask `value` with `order` fresh random masks.
    pub fn new<R: Csprng>(value: W, domain: Domain, order: usize, rng: &mut R) -> Self {
        assert!(order > 0, "masking order must be at least one");
        let masks: Vec<W> = (0..order).map(|_| random_word(rng)).collect();
        let mut masked = value;
        for &m in &masks {
            masked = mask_op(domain, masked, m);
        }
        Self {
            domain,
            masked,
            masks,
        }
    }

    fn from_shares(shares: Vec<W>, domain: Domain) -> Self {
        let masked = shares[0];
        let masks = shares[1..].to_vec();
        Self {
            domain,
            masked,
            masks,
        }
    }

    /// All shares, masked value first.
    fn shares(&self) -> Vec<W> {
        let mut shares = Vec::with_capacity(self.share_count());
        shares.push(self.masked);
        shares.extend_from_slice(&self.masks);
        shares
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Number of random masks.
    pub fn order(&self) -> usize {
        self.masks.len()
    }

    pub fn share_count(&self) -> usize {
        self.masks.len() + 1
    }

    /// Recombine the shares into the secret value.
    pub fn unmask(&self) -> W {
        let mut value = self.masked;
        for &m in &self.masks {
            value = unmask_op(self.domain, value, m);
        }
        value
    }

    /// Replace every mask with a fresh random one, preserving the secret.
    pub fn refresh_masks<R: Csprng>(&mut self, rng: &mut R) {
        for i in 0..self.masks.len() {
            let r: W = random_word(rng);
            self.masks[i] = unmask_op(self.domain, self.masks[i], r);
            self.masked = mask_op(self.domain, self.masked, r);
        }
    }

    fn check_domain(&self, domain: Domain, op: &str) {
        assert!(
            self.domain == domain,
            "{op} is only defined for {domain:?}-masked values"
        );
    }

    fn check_operands(&self, other: &Self, domain: Domain, op: &str) {
        self.check_domain(domain, op);
        other.check_domain(domain, op);
        assert!(
            self.order() == other.order(),
            "{op} operands must have the same masking order"
        );
    }

    fn zip_shares(&self, other: &Self, f: impl Fn(W, W) -> W) -> Self {
        let masked = f(self.masked, other.masked);
        let masks = self
            .masks
            .iter()
            .zip(&other.masks)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self {
            domain: self.domain,
            masked,
            masks,
        }
    }

    fn map_shares(&self, f: impl Fn(W) -> W) -> Self {
        Self {
            domain: self.domain,
            masked: f(self.masked),
            masks: self.masks.iter().map(|&m| f(m)).collect(),
        }
    }

    /// Share-wise XOR.
    pub fn xor(&self, other: &Self) -> Self {
        self.check_operands(other, Domain::Boolean, "xor");
        self.zip_shares(other, |a, b| a ^ b)
    }

    /// Share-wise wrapping addition.
    pub fn add(&self, other: &Self) -> Self {
        self.check_operands(other, Domain::Arithmetic, "add");
        self.zip_shares(other, W::wrapping_add)
    }

    /// Share-wise wrapping subtraction.
    pub fn sub(&self, other: &Self) -> Self {
        self.check_operands(other, Domain::Arithmetic, "sub");
        self.zip_shares(other, W::wrapping_sub)
    }

    /// Bitwise AND through the domain-oriented masking gadget.
    ///
    /// The gadget computes all pairwise share products, rebalancing each
    /// cross-domain pair with a fresh random word so that no intermediate
    /// depends on more than one share of either operand. It consumes
    /// $\frac{(n + 1) n}{2}$ random words for masking order $n$.
    #[docext]
    pub fn and<R: Csprng>(&self, other: &Self, rng: &mut R) -> Self {
        self.dom_combine(other, Domain::Boolean, |a, b| a & b, rng)
    }

    /// Wrapping multiplication through the same gadget as [AND](Self::and),
    /// with subtraction and addition taking the roles of the XORs.
    pub fn mul<R: Csprng>(&self, other: &Self, rng: &mut R) -> Self {
        self.dom_combine(other, Domain::Arithmetic, W::wrapping_mul, rng)
    }

    /// Bitwise OR, derived as `(x & y) ^ x ^ y`.
    pub fn or<R: Csprng>(&self, other: &Self, rng: &mut R) -> Self {
        self.and(other, rng).xor(self).xor(other)
    }

    fn dom_combine<R: Csprng>(
        &self,
        other: &Self,
        domain: Domain,
        op: impl Fn(W, W) -> W,
        rng: &mut R,
    ) -> Self {
        self.check_operands(other, domain, "and/mul");
        let x = self.shares();
        let y = other.shares();
        let mut out: Vec<W> = (0..x.len()).map(|i| op(x[i], y[i])).collect();
        for i in 0..self.order() {
            for j in i + 1..x.len() {
                let r: W = random_word(rng);
                let p_ji = mask_op(domain, op(x[j], y[i]), r);
                let p_ij = unmask_op(domain, op(x[i], y[j]), r);
                out[i] = unmask_op(domain, out[i], p_ij);
                out[j] = unmask_op(domain, out[j], p_ji);
            }
        }
        Self::from_shares(out, domain)
    }

    /// Bitwise NOT. Inverting the masked value alone inverts the secret.
    pub fn not(&self) -> Self {
        self.check_domain(Domain::Boolean, "not");
        Self {
            domain: self.domain,
            masked: !self.masked,
            masks: self.masks.clone(),
        }
    }

    /// Share-wise left shift. Shifts distribute over XOR, so this is linear.
    pub fn shl(&self, n: u32) -> Self {
        self.check_domain(Domain::Boolean, "shl");
        self.map_shares(|w| w << n)
    }

    /// Share-wise right shift.
    pub fn shr(&self, n: u32) -> Self {
        self.check_domain(Domain::Boolean, "shr");
        self.map_shares(|w| w >> n)
    }

    /// Share-wise left rotation.
    pub fn rotl(&self, n: u32) -> Self {
        self.check_domain(Domain::Boolean, "rotl");
        self.map_shares(|w| w.rotl(n))
    }

    /// Share-wise right rotation.
    pub fn rotr(&self, n: u32) -> Self {
        self.check_domain(Domain::Boolean, "rotr");
        self.map_shares(|w| w.rotr(n))
    }

    /// XOR a public constant into the secret.
    pub fn xor_word(&self, word: W) -> Self {
        self.check_domain(Domain::Boolean, "xor_word");
        Self {
            domain: self.domain,
            masked: self.masked ^ word,
            masks: self.masks.clone(),
        }
    }

    /// AND the secret with a public constant. AND distributes over XOR, so
    /// the constant applies to every share.
    pub fn and_word(&self, word: W) -> Self {
        self.check_domain(Domain::Boolean, "and_word");
        self.map_shares(|w| w & word)
    }

    /// Add a public constant to the secret.
    pub fn add_word(&self, word: W) -> Self {
        self.check_domain(Domain::Arithmetic, "add_word");
        Self {
            domain: self.domain,
            masked: self.masked.wrapping_add(word),
            masks: self.masks.clone(),
        }
    }

    /// Convert boolean shares to arithmetic shares, preserving the secret.
    ///
    /// Implements the high-order conversion of Bettale, Coron and Zeitoun
    /// ("Improved High-Order Conversion From Boolean to Arithmetic Masking",
    /// 2018): the share vector is extended with a zero share, refreshed, and
    /// recursively folded through the gadget $\Psi(a, b) = (a \oplus b) - b$,
    /// which peels one boolean share into an arithmetic one per level.
    /// A no-op if the value is already arithmetic.
    #[docext]
    pub fn btoa<R: Csprng>(&mut self, rng: &mut R) {
        if self.domain == Domain::Arithmetic {
            return;
        }
        let mut shares = self.shares();
        shares.push(W::ZERO);
        *self = Self::from_shares(btoa_convert(shares, rng), Domain::Arithmetic);
    }

    /// Convert arithmetic shares to boolean shares, preserving the secret.
    ///
    /// Each arithmetic share is a uniformly random word on its own, so it
    /// can be freshly boolean-masked as a public value; the boolean shares
    /// of the sum are then accumulated with a [masked adder](masked_add)
    /// that never recombines anything. This is the addition-based conversion
    /// of Coron, Großschädl and Vadnala ("Secure Conversion Between Boolean
    /// and Arithmetic Masking of Any Order", 2014). A no-op if the value is
    /// already boolean.
    pub fn atob<R: Csprng>(&mut self, rng: &mut R) {
        if self.domain == Domain::Boolean {
            return;
        }
        let order = self.order();
        let shares = self.shares();
        let mut acc = Self::new(shares[0], Domain::Boolean, order, rng);
        for &share in &shares[1..] {
            let addend = Self::new(share, Domain::Boolean, order, rng);
            acc = masked_add(&acc, &addend, rng);
        }
        *self = acc;
    }

    /// Split the word into boolean-masked bytes of the same order, most
    /// significant byte first.
    ///
    /// The value is first brought into the boolean domain, where byte `i` of
    /// every share forms a valid boolean sharing of byte `i` of the secret.
    pub fn to_masked_bytes<R: Csprng>(&mut self, rng: &mut R) -> Vec<Masked<u8>> {
        self.atob(rng);
        let share_bytes: Vec<W::Bytes> = self.shares().iter().map(|w| w.to_be_bytes()).collect();
        (0..W::BYTES)
            .map(|i| {
                let shares = share_bytes.iter().map(|b| b.as_ref()[i]).collect();
                Masked::from_shares(shares, Domain::Boolean)
            })
            .collect()
    }
}

fn mask_op<W: Word>(domain: Domain, a: W, b: W) -> W {
    match domain {
        Domain::Boolean => a ^ b,
        Domain::Arithmetic => a.wrapping_sub(b),
    }
}

fn unmask_op<W: Word>(domain: Domain, a: W, b: W) -> W {
    match domain {
        Domain::Boolean => a ^ b,
        Domain::Arithmetic => a.wrapping_add(b),
    }
}

/// One level of the recursive boolean-to-arithmetic conversion.
///
/// Takes `n + 1` boolean shares and returns `n` arithmetic shares with the
/// same combined value.
fn btoa_convert<W: Word, R: Csprng>(mut x: Vec<W>, rng: &mut R) -> Vec<W> {
    fn psi<W: Word>(masked: W, mask: W) -> W {
        (masked ^ mask).wrapping_sub(mask)
    }

    let n = x.len() - 1;
    if n == 1 {
        return vec![x[0] ^ x[1]];
    }

    // Refresh before splitting, so the two recursive halves see
    // independent shares.
    for i in 1..x.len() {
        let r: W = random_word(rng);
        x[i] = x[i] ^ r;
        x[0] = x[0] ^ r;
    }

    let first_term = if (n - 1) & 1 == 1 { x[0] } else { W::ZERO };
    let mut y = Vec::with_capacity(n);
    y.push(first_term ^ psi(x[0], x[1]));
    for i in 1..n {
        y.push(psi(x[0], x[i + 1]));
    }

    let first = btoa_convert(x[1..].to_vec(), rng);
    let second = btoa_convert(y, rng);

    let mut out = Vec::with_capacity(n);
    for i in 0..n - 2 {
        out.push(first[i].wrapping_add(second[i]));
    }
    out.push(first[n - 2]);
    out.push(second[n - 2]);
    out
}

/// Add two boolean-masked words without leaving the boolean domain.
///
/// Ripple-carry addition expressed bitwise in parallel: with $p = x \oplus y$
/// and $g = x \land y$, the carry word converges through
/// $c \gets (g \oplus (p \land c)) \ll 1$ after $W - 1$ rounds, and the sum
/// is $p \oplus c$. Every AND goes through the [DOM gadget](Masked::and).
#[docext]
fn masked_add<W: Word, R: Csprng>(x: &Masked<W>, y: &Masked<W>, rng: &mut R) -> Masked<W> {
    let p = x.xor(y);
    let g = x.and(y, rng);
    let mut c = g.shl(1);
    for _ in 0..W::BITS - 2 {
        let t = p.and(&c, rng);
        c = g.xor(&t).shl(1);
    }
    p.xor(&c)
}
