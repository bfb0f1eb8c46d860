//! Boolean- and arithmetic-masked integers.
//!
//! A masked integer represents a secret value as `order + 1` random shares
//! so that no intermediate computation ever touches the value itself. The
//! shares recombine under XOR in the [boolean domain](Domain::Boolean) and
//! under modular addition in the [arithmetic domain](Domain::Arithmetic).
//! Linear operations (XOR, shifts, rotations, addition) apply share-wise;
//! the nonlinear AND and MUL go through a domain-oriented masking gadget
//! that consumes fresh randomness, and the two domains are bridged by
//! dedicated conversion algorithms.

mod uint;

pub use uint::{Domain, Masked, MaskedU32, MaskedU64, MaskedU8};
