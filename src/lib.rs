//! Wallet cryptography primitives with a pure Rust implementation
//!
//! This crate provides the cryptographic core of a cryptocurrency wallet:
//! arbitrary-precision integer arithmetic, secp256k1 point arithmetic, ECDSA
//! with deterministic nonces and public-key recovery, and BIP32 hierarchical
//! deterministic key derivation with SLIP-0132 multi-scheme serialization.
//! There is no FFI, no global state and no I/O: every operation is a pure,
//! synchronous value transformation that can run concurrently on distinct
//! instances.
//!
//! # Security Features
//!
//! - Private scalars, chain codes and nonce state are zeroized on drop
//! - Comparisons over secret-adjacent material run in constant time
//! - Malformed or out-of-range input is rejected before use, never clamped
//! - Signing nonces are fully deterministic (RFC 6979 and the EOS variant),
//!   so no external entropy enters the signing path

#![forbid(unsafe_code)]
#![deny(missing_docs)]

// Error module and re-exports
pub mod error;
pub use error::{validate, Error, Result};

// Arbitrary-precision integer arithmetic
pub mod bignum;
pub use bignum::Bignum;

// Elliptic curve primitives
pub mod ec;
pub use ec::{Curve, CurvePoint, PointConversion};

// ECDSA signing, verification and recovery
pub mod ecdsa;
pub use ecdsa::{NonceFunction, Signature, SignatureFormat};

// Collaborator hash functions
pub mod hashes;

// Keys and hierarchical deterministic derivation
pub mod hd;
pub use hd::{ExtendedKey, ExtendedKeyVersion, Key, KeyCompression, KeyGenerator, KeyType};
