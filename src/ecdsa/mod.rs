//! ECDSA signing, verification and public-key recovery over secp256k1
//!
//! Every function here is a stateless transformation: the private scalar,
//! message digest and domain parameters go in, bytes come out. Nonces are
//! deterministic (RFC 6979, or the EOS variant that retries with a counter
//! until the signature is canonical), so a given `(key, digest)` pair always
//! produces the same signature.
//!
//! Produced signatures are low-S normalized: if `s > n/2` it is replaced by
//! `n − s` and the recovery parity bit flipped.

mod nonce;
mod signature;

pub use signature::{Signature, SignatureFormat};

use crate::bignum::Bignum;
use crate::ec::{Curve, CurvePoint, PointConversion, SCALAR_SIZE};
use crate::error::{validate, Error, Result};
use nonce::NonceGenerator;

/// Digest length expected by every entry point (SHA-256 sized).
pub const DIGEST_SIZE: usize = 32;

/// Deterministic nonce scheme used when signing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceFunction {
    /// RFC 6979 HMAC-SHA256 deterministic nonce
    Rfc6979,
    /// RFC 6979 with a retry counter, repeated until the compact encoding
    /// is canonical under the EOS rule
    Eos,
}

/// Sign a 32-byte message digest with a 32-byte private scalar.
///
/// The returned [`Signature`] always carries a recovery id; encode it with
/// [`Signature::encode`] as DER or compact per the consumer's convention.
pub fn sign(digest: &[u8], key: &[u8], noncetype: NonceFunction) -> Result<Signature> {
    validate::length("message digest", digest.len(), DIGEST_SIZE)?;
    validate::length("private key", key.len(), SCALAR_SIZE)?;

    let curve = Curve::secp256k1();
    let n = curve.order().clone();

    let d = Bignum::from_bytes_be(key);
    if d.is_zero() || d.compare(&n) != std::cmp::Ordering::Less {
        return Err(Error::param("private key", "scalar outside [1, n-1]"));
    }

    let digest32: [u8; 32] = digest.try_into().expect("digest length validated");
    let key32: [u8; 32] = key.try_into().expect("key length validated");
    let z = curve.digest_to_int(digest);

    match noncetype {
        NonceFunction::Rfc6979 => {
            let mut generator = NonceGenerator::new(&key32, &digest32, &n, None)?;
            loop {
                let k = generator.next(&n);
                if let Some(sig) = sign_with_nonce(&curve, &d, &z, &k)? {
                    return Ok(sig);
                }
            }
        }
        NonceFunction::Eos => {
            let mut attempt: u32 = 0;
            loop {
                let extra = eos_extra(attempt);
                let mut generator =
                    NonceGenerator::new(&key32, &digest32, &n, extra.as_ref())?;
                let sig = loop {
                    let k = generator.next(&n);
                    if let Some(sig) = sign_with_nonce(&curve, &d, &z, &k)? {
                        break sig;
                    }
                };
                if is_canonical(&sig) {
                    return Ok(sig);
                }
                attempt = attempt.checked_add(1).ok_or(Error::Processing {
                    operation: "eos signing",
                    details: "canonical retry counter exhausted",
                })?;
            }
        }
    }
}

/// Verify a DER-encoded signature over `digest` against an encoded public
/// key.
pub fn verify_der(signature: &[u8], digest: &[u8], public_key: &[u8]) -> Result<()> {
    let sig = Signature::from_der(signature)?;
    verify_decoded(&sig, digest, public_key)
}

/// Verify a 65-byte compact signature over `digest` against an encoded
/// public key.
pub fn verify_compact(signature: &[u8], digest: &[u8], public_key: &[u8]) -> Result<()> {
    let sig = Signature::from_compact(signature)?;
    verify_decoded(&sig, digest, public_key)
}

/// Recover the public key from a 65-byte compact signature and the digest
/// it signs, encoded under the requested conversion.
///
/// Fails when the signature does not decode, or the embedded recovery id is
/// inconsistent with the signature (no curve point reconstructs from it).
pub fn recover(signature: &[u8], digest: &[u8], conversion: PointConversion) -> Result<Vec<u8>> {
    validate::length("message digest", digest.len(), DIGEST_SIZE)?;
    let sig = Signature::from_compact(signature)?;
    let recid = sig
        .recovery_id()
        .expect("compact signatures always carry a recovery id");

    let curve = Curve::secp256k1();
    let n = curve.order();
    let in_range = |v: &Bignum| {
        !v.is_zero() && v.compare(n) == std::cmp::Ordering::Less
    };
    if !in_range(sig.r()) || !in_range(sig.s()) {
        return Err(Error::param("signature", "component outside [1, n-1]"));
    }

    // Rebuild the candidate R from r, the overflow bit and the parity bit
    let mut x = sig.r().clone();
    if recid & 2 != 0 {
        x = x.add(n);
    }
    if x.compare(curve.field_prime()) != std::cmp::Ordering::Less {
        return Err(Error::param(
            "recovery id",
            "candidate x-coordinate outside the field",
        ));
    }
    let y = curve.y_from_x(&x, recid & 1 == 1)?;
    let r_point = CurvePoint::from_coordinates(x, y);

    // Q = (-z/r)·G + (s/r)·R
    let z = curve.digest_to_int(digest);
    let r_inv = sig.r().mod_inverse(n)?;
    let u1 = n.sub_mod(&z.mul_mod(&r_inv, n)?, n)?;
    let u2 = sig.s().mul_mod(&r_inv, n)?;
    curve.recover_public_key(&u1, &u2, &r_point, conversion)
}

fn verify_decoded(sig: &Signature, digest: &[u8], public_key: &[u8]) -> Result<()> {
    validate::length("message digest", digest.len(), DIGEST_SIZE)?;
    let curve = Curve::secp256k1();
    let point = curve.decode_point(public_key)?;
    curve.ecdsa_verify(sig.r(), sig.s(), digest, &point)
}

// One signing attempt with a fixed nonce; None signals a degenerate r or s
// and the caller draws the next candidate.
fn sign_with_nonce(
    curve: &Curve,
    d: &Bignum,
    z: &Bignum,
    k: &Bignum,
) -> Result<Option<Signature>> {
    let n = curve.order();

    let r_point = curve.multiply_generator(k)?;
    let r = r_point.x().modulo(n)?;
    if r.is_zero() {
        return Ok(None);
    }

    // s = k⁻¹·(z + r·d) mod n
    let k_inv = k.mod_inverse(n)?;
    let s = k_inv.mul_mod(&z.add_mod(&r.mul_mod(d, n)?, n)?, n)?;
    if s.is_zero() {
        return Ok(None);
    }

    let mut recovery_id = r_point.y().is_odd() as u8;
    if r_point.x().compare(n) != std::cmp::Ordering::Less {
        recovery_id |= 2;
    }

    // Low-S normalization flips the recovery parity
    let half_n = n.rshifted(1);
    let s = if s.compare(&half_n) == std::cmp::Ordering::Greater {
        recovery_id ^= 1;
        n.sub(&s)
    } else {
        s
    };

    Ok(Some(Signature {
        r,
        s,
        recovery_id: Some(recovery_id),
    }))
}

// EOS canonical-form test over the fixed-width r ‖ s bytes.
fn is_canonical(sig: &Signature) -> bool {
    let r = sig.r.to_bytes_be_padded(SCALAR_SIZE);
    let s = sig.s.to_bytes_be_padded(SCALAR_SIZE);
    r[0] & 0x80 == 0
        && !(r[0] == 0 && r[1] & 0x80 == 0)
        && s[0] & 0x80 == 0
        && !(s[0] == 0 && s[1] & 0x80 == 0)
}

// Extra entropy for EOS retries: none on the first attempt, then a 32-byte
// big-endian counter.
fn eos_extra(attempt: u32) -> Option<[u8; 32]> {
    if attempt == 0 {
        return None;
    }
    let mut extra = [0u8; 32];
    extra[28..].copy_from_slice(&attempt.to_be_bytes());
    Some(extra)
}
