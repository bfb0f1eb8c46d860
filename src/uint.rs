//! Fixed-width unsigned words and the small piece of GF(2^8) arithmetic
//! shared by the key schedule and the AES round functions.
//!
//! The BLAKE-style key generator works on 32-bit or 64-bit words depending on
//! the cipher tier, while the AES state is always made of bytes. The [`Word`]
//! trait abstracts over `u8`, `u32` and `u64` so that the mixing and masking
//! code can be written once for all three widths.

use {
    docext::docext,
    std::{
        fmt,
        ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr},
    },
};

/// A fixed-width unsigned integer with wrapping arithmetic and bit rotation.
///
/// All arithmetic is reduced modulo 2^W where W is the bit width, and
/// [rotations](Word::rotr) are defined modulo W. Byte conversions are
/// big-endian: the key generator reads its inputs and emits its round keys
/// in big-endian chunk order.
pub trait Word:
    Copy
    + Eq
    + Ord
    + fmt::Debug
    + Default
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    /// Width of the word in bits.
    const BITS: u32;

    /// Width of the word in bytes.
    const BYTES: usize;

    const ZERO: Self;
    const MAX: Self;

    /// Big-endian byte representation of the word.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Copy + Default;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;

    /// Rotate the bits right by `n`, taken modulo the bit width.
    fn rotr(self, n: u32) -> Self;

    /// Rotate the bits left by `n`, taken modulo the bit width.
    fn rotl(self, n: u32) -> Self;

    fn to_be_bytes(self) -> Self::Bytes;
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Truncate a `u64` to this width.
    fn from_u64(v: u64) -> Self;

    /// Replace each byte of the word through a 256-entry lookup table.
    fn sub_bytes(self, table: &[u8; 256]) -> Self;
}

macro_rules! impl_word {
    ($ty:ty) => {
        impl Word for $ty {
            const BITS: u32 = <$ty>::BITS;
            const BYTES: usize = (<$ty>::BITS / 8) as usize;
            const ZERO: Self = 0;
            const MAX: Self = <$ty>::MAX;

            type Bytes = [u8; (<$ty>::BITS / 8) as usize];

            fn wrapping_add(self, rhs: Self) -> Self {
                <$ty>::wrapping_add(self, rhs)
            }

            fn wrapping_sub(self, rhs: Self) -> Self {
                <$ty>::wrapping_sub(self, rhs)
            }

            fn wrapping_mul(self, rhs: Self) -> Self {
                <$ty>::wrapping_mul(self, rhs)
            }

            fn wrapping_neg(self) -> Self {
                <$ty>::wrapping_neg(self)
            }

            fn rotr(self, n: u32) -> Self {
                self.rotate_right(n % Self::BITS)
            }

            fn rotl(self, n: u32) -> Self {
                self.rotate_left(n % Self::BITS)
            }

            fn to_be_bytes(self) -> Self::Bytes {
                <$ty>::to_be_bytes(self)
            }

            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                <$ty>::from_be_bytes(bytes)
            }

            fn from_u64(v: u64) -> Self {
                v as $ty
            }

            fn sub_bytes(self, table: &[u8; 256]) -> Self {
                let mut bytes = self.to_be_bytes();
                for b in bytes.as_mut() {
                    *b = table[usize::from(*b)];
                }
                Self::from_be_bytes(bytes)
            }
        }
    };
}

impl_word!(u8);
impl_word!(u32);
impl_word!(u64);

/// Multiply `b` by $x$ in the Galois field $GF(2^8)$, reduced modulo the AES
/// polynomial $m(x) = x^8 + x^4 + x^3 + x + 1 \equiv \mathrm{11b_{16}}$.
///
/// The left shift multiplies by $x$; if the high bit was set before the
/// shift, the result overflows the field and is reduced by XORing in
/// $\mathrm{1b_{16}}$. Instead of branching on the high bit, the reduction
/// constant is selected by arithmetic negation of the shifted-out bit, which
/// yields either `0x00` or `0xff` as an AND mask:
///
/// $$
/// \mathrm{xtime}(b) = (b \ll 1) \oplus ((-(b \gg 7)) \land \mathrm{1b_{16}})
/// $$
///
/// The branchless form matters because the masked cipher variant evaluates
/// this function on secret shares.
#[docext]
pub fn xtime(b: u8) -> u8 {
    (b << 1) ^ ((b >> 7).wrapping_neg() & 0x1b)
}
