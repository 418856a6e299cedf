//! Deterministic nonce generation for ECDSA
//!
//! Implements the RFC 6979 HMAC-SHA256 construction. The EOS signing path
//! reuses it with a retry counter supplied as the optional extra entropy,
//! which keeps that scheme fully deterministic as well.

use crate::bignum::Bignum;
use crate::error::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// RFC 6979 candidate-nonce generator for a 256-bit group order.
///
/// `next` yields successive candidates already restricted to `[1, n-1]`;
/// the caller draws again when a candidate produces a degenerate signature.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct NonceGenerator {
    k: [u8; 32],
    v: [u8; 32],
}

impl NonceGenerator {
    /// Seed the generator from the private scalar and message digest,
    /// optionally mixing in 32 bytes of extra entropy (RFC 6979 §3.6).
    pub fn new(
        secret: &[u8; 32],
        digest: &[u8; 32],
        order: &Bignum,
        extra: Option<&[u8; 32]>,
    ) -> Result<Self> {
        // bits2octets(H(m)): reduce the digest modulo the order
        let reduced = Bignum::from_bytes_be(digest).modulo(order)?;
        let h2 = reduced.to_bytes_be_padded(32);

        let mut k = [0u8; 32];
        let mut v = [1u8; 32];

        let feed = |k: &[u8; 32], v: &[u8; 32], sep: u8| -> [u8; 32] {
            let mut mac = mac_with_key(k);
            mac.update(v);
            mac.update(&[sep]);
            mac.update(secret);
            mac.update(&h2);
            if let Some(extra) = extra {
                mac.update(extra);
            }
            finalize(mac)
        };

        k = feed(&k, &v, 0x00);
        v = hmac_one(&k, &v);
        k = feed(&k, &v, 0x01);
        v = hmac_one(&k, &v);

        Ok(NonceGenerator { k, v })
    }

    /// The next candidate nonce in `[1, n-1]`.
    pub fn next(&mut self, order: &Bignum) -> Bignum {
        loop {
            self.v = hmac_one(&self.k, &self.v);
            let candidate = Bignum::from_bytes_be(&self.v);
            if !candidate.is_zero() && candidate.compare(order) == std::cmp::Ordering::Less {
                return candidate;
            }
            // Out-of-range candidate: K = HMAC_K(V || 0x00), V = HMAC_K(V)
            let mut mac = mac_with_key(&self.k);
            mac.update(&self.v);
            mac.update(&[0x00]);
            self.k = finalize(mac);
            self.v = hmac_one(&self.k, &self.v);
        }
    }
}

fn mac_with_key(key: &[u8; 32]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts any key length")
}

fn hmac_one(key: &[u8; 32], data: &[u8; 32]) -> [u8; 32] {
    let mut mac = mac_with_key(key);
    mac.update(data);
    finalize(mac)
}

fn finalize(mac: HmacSha256) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
