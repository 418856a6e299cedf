//! secp256k1 curve points and their serialized forms

use crate::bignum::Bignum;
use crate::ec::constants::FIELD_ELEMENT_SIZE;

/// Serialized form of an elliptic curve point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointConversion {
    /// Compressed format: 0x02/0x03 || x
    Compressed,
    /// Uncompressed format: 0x04 || x || y
    Uncompressed,
    /// Hybrid format: 0x06/0x07 || x || y (the tag repeats the y parity)
    Hybrid,
}

/// A point on the secp256k1 curve in affine coordinates, or the point at
/// infinity.
///
/// Coordinates are canonical field residues in `[0, p)`. A `CurvePoint` holds
/// no reference to its [`Curve`](crate::ec::Curve); domain parameters are
/// supplied to every operation, so the flyweight `Curve` can be shared freely.
#[derive(Clone, Debug)]
pub struct CurvePoint {
    pub(crate) x: Bignum,
    pub(crate) y: Bignum,
    pub(crate) infinity: bool,
}

impl PartialEq for CurvePoint {
    fn eq(&self, other: &Self) -> bool {
        if self.infinity || other.infinity {
            return self.infinity == other.infinity;
        }
        self.x == other.x && self.y == other.y
    }
}

impl Eq for CurvePoint {}

impl CurvePoint {
    /// The point at infinity (group identity).
    pub fn infinity() -> Self {
        CurvePoint {
            x: Bignum::zero(),
            y: Bignum::zero(),
            infinity: true,
        }
    }

    pub(crate) fn from_coordinates(x: Bignum, y: Bignum) -> Self {
        CurvePoint {
            x,
            y,
            infinity: false,
        }
    }

    /// Check if this point is the identity element.
    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// The affine x-coordinate (zero for the point at infinity).
    pub fn x(&self) -> &Bignum {
        &self.x
    }

    /// The affine y-coordinate (zero for the point at infinity).
    pub fn y(&self) -> &Bignum {
        &self.y
    }

    /// Serialize under the requested conversion.
    ///
    /// The point at infinity encodes as the single byte `0x00` in every mode.
    pub fn encode(&self, conversion: PointConversion) -> Vec<u8> {
        if self.infinity {
            return vec![0x00];
        }
        let x = self.x.to_bytes_be_padded(FIELD_ELEMENT_SIZE);
        let y = self.y.to_bytes_be_padded(FIELD_ELEMENT_SIZE);
        let parity = self.y.is_odd() as u8;
        match conversion {
            PointConversion::Compressed => {
                let mut out = Vec::with_capacity(1 + FIELD_ELEMENT_SIZE);
                out.push(0x02 | parity);
                out.extend_from_slice(&x);
                out
            }
            PointConversion::Uncompressed | PointConversion::Hybrid => {
                let tag = match conversion {
                    PointConversion::Uncompressed => 0x04,
                    _ => 0x06 | parity,
                };
                let mut out = Vec::with_capacity(1 + 2 * FIELD_ELEMENT_SIZE);
                out.push(tag);
                out.extend_from_slice(&x);
                out.extend_from_slice(&y);
                out
            }
        }
    }
}
