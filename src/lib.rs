
mod checksum;
mod cipher;
mod keygen;
mod masked;
mod random;
mod uint;

pub use {
    checksum::{Checksum, MaskedChecksum},
    cipher::{
        AesBlake,
        AesBlake256,
        AesBlake512,
        AesBlock,
        Error,
        MaskedAesBlake,
        MaskedAesBlake256,
        MaskedAesBlake512,
        MaskedAesBlock,
        BLOCK_BYTES,
        INV_S_BOX,
        S_BOX,
    },
    keygen::{
        KdfDomain,
        KeyGen,
        MaskedKeyGen,
        MaskedRoundKeys,
        RoundKeys,
        Tier,
        Tier256,
        Tier512,
    },
    masked::{Domain, Masked, MaskedU32, MaskedU64, MaskedU8},
    random::Csprng,
    uint::{xtime, Word},
};
