//! ECDSA signature container and its two serialized forms

use crate::bignum::Bignum;
use crate::ec::SCALAR_SIZE;
use crate::error::{validate, Error, Result};

/// Serialized form of an ECDSA signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFormat {
    /// 65 bytes: recovery header byte followed by fixed-width r and s
    Compact,
    /// ASN.1 DER: SEQUENCE { INTEGER r, INTEGER s }
    Der,
}

/// An ECDSA signature `(r, s)` with an optional recovery id.
///
/// Signatures produced by [`sign`](crate::ecdsa::sign) always carry a
/// recovery id; signatures parsed from DER do not, since the encoding has no
/// room for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub(crate) r: Bignum,
    pub(crate) s: Bignum,
    pub(crate) recovery_id: Option<u8>,
}

// Compact header base: 27 (uncompressed) / 31 (compressed), plus the 2-bit
// recovery id.
const COMPACT_HEADER_UNCOMPRESSED: u8 = 27;
const COMPACT_HEADER_COMPRESSED: u8 = 31;

impl Signature {
    /// The r component.
    pub fn r(&self) -> &Bignum {
        &self.r
    }

    /// The s component.
    pub fn s(&self) -> &Bignum {
        &self.s
    }

    /// The recovery id in {0, 1, 2, 3}, when known.
    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }

    /// Encode under the requested format.
    ///
    /// Fails for [`SignatureFormat::Compact`] when no recovery id is known.
    pub fn encode(&self, format: SignatureFormat) -> Result<Vec<u8>> {
        match format {
            SignatureFormat::Der => Ok(self.to_der()),
            SignatureFormat::Compact => self.to_compact(),
        }
    }

    /// Decode from the requested format.
    pub fn decode(data: &[u8], format: SignatureFormat) -> Result<Self> {
        match format {
            SignatureFormat::Der => Self::from_der(data),
            SignatureFormat::Compact => Self::from_compact(data),
        }
    }

    /// Serialize to DER: SEQUENCE { INTEGER r, INTEGER s }.
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);

        let mut der = Vec::with_capacity(6 + r.len() + s.len());
        der.push(0x30);
        der.push((4 + r.len() + s.len()) as u8);
        der.push(0x02);
        der.push(r.len() as u8);
        der.extend_from_slice(&r);
        der.push(0x02);
        der.push(s.len() as u8);
        der.extend_from_slice(&s);
        der
    }

    /// Parse from DER.
    ///
    /// Rejects wrong tags, inconsistent lengths, non-minimal or negative
    /// integers, and trailing bytes.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        validate::min_length("DER signature", der.len(), 8)?;
        if der[0] != 0x30 {
            return Err(Error::param("DER signature", "missing SEQUENCE tag"));
        }
        if der[1] as usize != der.len() - 2 {
            return Err(Error::param("DER signature", "inconsistent SEQUENCE length"));
        }

        let (r, rest) = der_read_integer(&der[2..])?;
        let (s, rest) = der_read_integer(rest)?;
        if !rest.is_empty() {
            return Err(Error::param("DER signature", "trailing bytes"));
        }

        Ok(Signature {
            r,
            s,
            recovery_id: None,
        })
    }

    /// Serialize to the 65-byte compact form: header ‖ r ‖ s, with
    /// `header = 31 + recovery_id` (the compressed-key convention).
    ///
    /// Fails when no recovery id is known.
    pub fn to_compact(&self) -> Result<Vec<u8>> {
        let recid = self.recovery_id.ok_or(Error::Processing {
            operation: "compact signature encoding",
            details: "signature carries no recovery id",
        })?;
        let mut out = Vec::with_capacity(1 + 2 * SCALAR_SIZE);
        out.push(COMPACT_HEADER_COMPRESSED + recid);
        out.extend_from_slice(&self.r.to_bytes_be_padded(SCALAR_SIZE));
        out.extend_from_slice(&self.s.to_bytes_be_padded(SCALAR_SIZE));
        Ok(out)
    }

    /// Parse from the 65-byte compact form, accepting both the compressed
    /// (31–34) and uncompressed (27–30) header ranges.
    pub fn from_compact(data: &[u8]) -> Result<Self> {
        validate::length("compact signature", data.len(), 1 + 2 * SCALAR_SIZE)?;
        let header = data[0];
        if !(COMPACT_HEADER_UNCOMPRESSED..COMPACT_HEADER_COMPRESSED + 4).contains(&header) {
            return Err(Error::param("compact signature", "invalid recovery header"));
        }
        let recid = (header - COMPACT_HEADER_UNCOMPRESSED) & 3;
        Ok(Signature {
            r: Bignum::from_bytes_be(&data[1..1 + SCALAR_SIZE]),
            s: Bignum::from_bytes_be(&data[1 + SCALAR_SIZE..]),
            recovery_id: Some(recid),
        })
    }
}

// Minimal-length DER INTEGER content for a non-negative value.
fn der_integer(value: &Bignum) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

// Read one INTEGER, returning the value and the remaining input.
fn der_read_integer(input: &[u8]) -> Result<(Bignum, &[u8])> {
    validate::min_length("DER integer", input.len(), 3)?;
    if input[0] != 0x02 {
        return Err(Error::param("DER signature", "missing INTEGER tag"));
    }
    let len = input[1] as usize;
    if len == 0 || input.len() < 2 + len {
        return Err(Error::param("DER signature", "truncated INTEGER"));
    }
    let content = &input[2..2 + len];
    if content[0] & 0x80 != 0 {
        return Err(Error::param("DER signature", "negative INTEGER"));
    }
    if len > 1 && content[0] == 0 && content[1] & 0x80 == 0 {
        return Err(Error::param("DER signature", "non-minimal INTEGER"));
    }
    Ok((Bignum::from_bytes_be(content), &input[2 + len..]))
}
