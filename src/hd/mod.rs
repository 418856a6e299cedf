//! Keys and BIP32 hierarchical deterministic derivation
//!
//! [`Key`] wraps classified raw key material as a tagged variant (a private
//! scalar or an encoded public point) with validation at construction.
//! [`ExtendedKey`] pairs a key with a chain code and tree metadata and
//! implements the BIP32 derivation protocol and the 78-byte SLIP-0132
//! serialization. [`KeyGenerator`] drives whole derivation paths from a
//! master seed.

mod extended;
mod generator;
mod version;

pub use extended::{ExtendedKey, EXTENDED_KEY_SIZE, HARDENED_OFFSET};
pub use generator::{KeyGenerator, BIP32_HMAC_KEY};
pub use version::ExtendedKeyVersion;

use crate::bignum::Bignum;
use crate::ec::{Curve, PointConversion, SCALAR_SIZE};
use crate::error::{Error, Result};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Classification of raw key material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// An encoded public curve point
    Public,
    /// A private scalar
    Private,
}

/// Requested public-key encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCompression {
    /// 33-byte SEC1 compressed form
    Compressed,
    /// 65-byte SEC1 uncompressed form
    Uncompressed,
}

impl From<KeyCompression> for PointConversion {
    fn from(compression: KeyCompression) -> Self {
        match compression {
            KeyCompression::Compressed => PointConversion::Compressed,
            KeyCompression::Uncompressed => PointConversion::Uncompressed,
        }
    }
}

/// Classified raw key material.
///
/// A private key holds a scalar in `[1, n-1]`; a public key holds a
/// validated SEC1 point encoding (33 or 65 bytes). Construction is the only
/// way in, so the invariants hold for every live `Key`. Private material is
/// zeroized on drop, and equality runs in constant time.
#[derive(Clone)]
pub struct Key(pub(crate) KeyMaterial);

#[derive(Clone)]
pub(crate) enum KeyMaterial {
    Private([u8; SCALAR_SIZE]),
    Public(Vec<u8>),
}

impl Key {
    /// Wrap a private scalar, validating length and range `[1, n-1]`.
    ///
    /// Accepts 32 raw bytes, or 33 bytes with a leading zero (the padded
    /// form used inside extended-key records).
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self> {
        let scalar: &[u8] = match bytes.len() {
            SCALAR_SIZE => bytes,
            33 if bytes[0] == 0 => &bytes[1..],
            _ => {
                return Err(Error::Length {
                    context: "private key",
                    expected: SCALAR_SIZE,
                    actual: bytes.len(),
                })
            }
        };

        let curve = Curve::secp256k1();
        let d = Bignum::from_bytes_be(scalar);
        if d.is_zero() || d.compare(curve.order()) != std::cmp::Ordering::Less {
            return Err(Error::param("private key", "scalar outside [1, n-1]"));
        }

        let mut data = [0u8; SCALAR_SIZE];
        data.copy_from_slice(scalar);
        Ok(Key(KeyMaterial::Private(data)))
    }

    /// Wrap an encoded public key, validating that it decodes to a point on
    /// the curve.
    pub fn from_public_bytes(bytes: &[u8]) -> Result<Self> {
        let curve = Curve::secp256k1();
        let point = curve.decode_point(bytes)?;
        if point.is_infinity() {
            return Err(Error::param("public key", "point at infinity"));
        }
        Ok(Key(KeyMaterial::Public(bytes.to_vec())))
    }

    /// Generate a fresh private key from a cryptographically secure RNG.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        loop {
            let mut candidate = [0u8; SCALAR_SIZE];
            rng.fill_bytes(&mut candidate);
            match Self::from_private_bytes(&candidate) {
                Ok(key) => return key,
                Err(_) => continue,
            }
        }
    }

    /// The key's classification.
    pub fn key_type(&self) -> KeyType {
        match &self.0 {
            KeyMaterial::Private(_) => KeyType::Private,
            KeyMaterial::Public(_) => KeyType::Public,
        }
    }

    /// The raw key material: the scalar bytes or the stored point encoding.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            KeyMaterial::Private(data) => data,
            KeyMaterial::Public(data) => data,
        }
    }

    /// The public key under the requested compression.
    ///
    /// For private material the point is derived by multiplying the base
    /// point; for public material the stored encoding is converted.
    pub fn public_key(&self, compression: KeyCompression) -> Result<Vec<u8>> {
        let curve = Curve::secp256k1();
        match &self.0 {
            KeyMaterial::Private(data) => {
                curve.public_key(data, compression == KeyCompression::Compressed)
            }
            KeyMaterial::Public(data) => curve.reencode_point(data, compression.into()),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (KeyMaterial::Private(a), KeyMaterial::Private(b)) => a[..].ct_eq(&b[..]).into(),
            (KeyMaterial::Public(a), KeyMaterial::Public(b)) => {
                a.as_slice().ct_eq(b.as_slice()).into()
            }
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        match &mut self.0 {
            KeyMaterial::Private(data) => data.zeroize(),
            KeyMaterial::Public(data) => data.zeroize(),
        }
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            KeyMaterial::Private(_) => f.write_str("Key::Private(..)"),
            KeyMaterial::Public(data) => write!(f, "Key::Public({})", hex::encode(data)),
        }
    }
}

#[cfg(test)]
mod tests;
