//! secp256k1 domain parameters and point-level operations
//!
//! `Curve` is a read-only flyweight: construct it once and share it across
//! any number of points and callers. All group operations live here so that
//! `CurvePoint` stays a plain coordinate pair.

use crate::bignum::Bignum;
use crate::ec::constants::{
    COEFFICIENT_B_HEX, FIELD_PRIME_HEX, GENERATOR_X_HEX, GENERATOR_Y_HEX, GROUP_ORDER_HEX,
    FIELD_ELEMENT_SIZE, POINT_COMPRESSED_SIZE, POINT_UNCOMPRESSED_SIZE, SCALAR_SIZE,
};
use crate::ec::point::{CurvePoint, PointConversion};
use crate::error::{validate, Error, Result};
use subtle::ConstantTimeEq;

/// secp256k1 domain parameters over the prime field F_p.
///
/// The curve equation is y² = x³ + 7; the cofactor is 1.
#[derive(Clone, Debug)]
pub struct Curve {
    p: Bignum,
    b: Bignum,
    gx: Bignum,
    gy: Bignum,
    n: Bignum,
}

impl Curve {
    /// The secp256k1 domain parameters.
    pub fn secp256k1() -> Self {
        let parse = |hex| Bignum::from_hex(hex).expect("secp256k1 parameters are valid");
        Curve {
            p: parse(FIELD_PRIME_HEX),
            b: parse(COEFFICIENT_B_HEX),
            gx: parse(GENERATOR_X_HEX),
            gy: parse(GENERATOR_Y_HEX),
            n: parse(GROUP_ORDER_HEX),
        }
    }

    /// Bit length of the field prime.
    pub fn degree(&self) -> usize {
        self.p.bits()
    }

    /// The group order n.
    pub fn order(&self) -> &Bignum {
        &self.n
    }

    /// The field prime p.
    pub fn field_prime(&self) -> &Bignum {
        &self.p
    }

    /// The base point G.
    pub fn generator(&self) -> CurvePoint {
        CurvePoint::from_coordinates(self.gx.clone(), self.gy.clone())
    }
}

/* ========================================================================== */
/*  Point validation and coordinate recovery                                  */
/* ========================================================================== */

impl Curve {
    /// Check the curve equation. The point at infinity is considered valid.
    pub fn is_on_curve(&self, point: &CurvePoint) -> bool {
        if point.is_infinity() {
            return true;
        }
        let lhs = point.y.mul_mod(&point.y, &self.p);
        let rhs = point
            .x
            .mul_mod(&point.x, &self.p)
            .and_then(|x2| x2.mul_mod(&point.x, &self.p))
            .and_then(|x3| x3.add_mod(&self.b, &self.p));
        matches!((lhs, rhs), (Ok(l), Ok(r)) if l == r)
    }

    /// Recover the y-coordinate paired with `x` under the curve equation,
    /// selecting the root with the requested parity.
    ///
    /// Fails when `x` is outside the field or x³ + b is not a quadratic
    /// residue (no point with that x-coordinate exists).
    pub fn y_from_x(&self, x: &Bignum, odd: bool) -> Result<Bignum> {
        if x.is_negative() || x.compare(&self.p) != std::cmp::Ordering::Less {
            return Err(Error::param("x-coordinate", "value outside the field"));
        }
        let rhs = x
            .mul_mod(x, &self.p)?
            .mul_mod(x, &self.p)?
            .add_mod(&self.b, &self.p)?;

        // p = 3 mod 4, so sqrt(a) = a^((p+1)/4) when it exists
        let exp = self.p.add(&Bignum::one()).rshifted(2);
        let y = rhs.mod_exp(&exp, &self.p)?;
        if y.mul_mod(&y, &self.p)? != rhs {
            return Err(Error::param(
                "x-coordinate",
                "no curve point with this x-coordinate",
            ));
        }
        if y.is_odd() == odd {
            Ok(y)
        } else {
            self.p.sub_mod(&y, &self.p)
        }
    }

    /// Decode a point from its serialized form, validating it lies on the
    /// curve.
    ///
    /// Accepts the single-byte infinity encoding, compressed (33 bytes),
    /// uncompressed (65 bytes) and hybrid (65 bytes) forms.
    pub fn decode_point(&self, data: &[u8]) -> Result<CurvePoint> {
        validate::min_length("point encoding", data.len(), 1)?;
        let tag = data[0];

        if tag == 0x00 {
            validate::length("point at infinity encoding", data.len(), 1)?;
            return Ok(CurvePoint::infinity());
        }

        if tag == 0x02 || tag == 0x03 {
            validate::length("compressed point", data.len(), POINT_COMPRESSED_SIZE)?;
            let x = Bignum::from_bytes_be(&data[1..]);
            let y = self.y_from_x(&x, tag == 0x03)?;
            return Ok(CurvePoint::from_coordinates(x, y));
        }

        if tag == 0x04 || tag == 0x06 || tag == 0x07 {
            validate::length("uncompressed point", data.len(), POINT_UNCOMPRESSED_SIZE)?;
            let x = Bignum::from_bytes_be(&data[1..1 + FIELD_ELEMENT_SIZE]);
            let y = Bignum::from_bytes_be(&data[1 + FIELD_ELEMENT_SIZE..]);
            if x.compare(&self.p) != std::cmp::Ordering::Less
                || y.compare(&self.p) != std::cmp::Ordering::Less
            {
                return Err(Error::param("point encoding", "coordinate outside the field"));
            }
            if (tag == 0x06 || tag == 0x07) && y.is_odd() != (tag == 0x07) {
                return Err(Error::param(
                    "point encoding",
                    "hybrid tag disagrees with y parity",
                ));
            }
            let point = CurvePoint::from_coordinates(x, y);
            if !self.is_on_curve(&point) {
                return Err(Error::param(
                    "point encoding",
                    "coordinates do not satisfy the curve equation",
                ));
            }
            return Ok(point);
        }

        Err(Error::param("point encoding", "unknown format tag"))
    }

    /// Serialized form of the point at infinity under the requested
    /// conversion.
    pub fn point_at_infinity_encoding(&self, conversion: PointConversion) -> Vec<u8> {
        CurvePoint::infinity().encode(conversion)
    }

    /// Decode a point and re-encode it under the requested conversion.
    pub fn reencode_point(&self, data: &[u8], conversion: PointConversion) -> Result<Vec<u8>> {
        Ok(self.decode_point(data)?.encode(conversion))
    }
}

/* ========================================================================== */
/*  Group law                                                                 */
/* ========================================================================== */

impl Curve {
    /// Add two points.
    pub fn add_points(&self, a: &CurvePoint, b: &CurvePoint) -> Result<CurvePoint> {
        if a.is_infinity() {
            return Ok(b.clone());
        }
        if b.is_infinity() {
            return Ok(a.clone());
        }

        if a.x == b.x {
            // Either inverses of each other, or a doubling
            if a.y.add_mod(&b.y, &self.p)?.is_zero() {
                return Ok(CurvePoint::infinity());
            }
            return self.double_point(a);
        }

        // λ = (y₂ − y₁) / (x₂ − x₁)
        let dx = b.x.sub_mod(&a.x, &self.p)?;
        let dy = b.y.sub_mod(&a.y, &self.p)?;
        let lambda = dy.mul_mod(&dx.mod_inverse(&self.p)?, &self.p)?;

        // x₃ = λ² − x₁ − x₂,  y₃ = λ·(x₁ − x₃) − y₁
        let x3 = lambda
            .mul_mod(&lambda, &self.p)?
            .sub_mod(&a.x, &self.p)?
            .sub_mod(&b.x, &self.p)?;
        let y3 = lambda
            .mul_mod(&a.x.sub_mod(&x3, &self.p)?, &self.p)?
            .sub_mod(&a.y, &self.p)?;

        Ok(CurvePoint::from_coordinates(x3, y3))
    }

    /// Double a point.
    pub fn double_point(&self, a: &CurvePoint) -> Result<CurvePoint> {
        if a.is_infinity() || a.y.is_zero() {
            return Ok(CurvePoint::infinity());
        }

        // λ = 3·x² / 2·y
        let x_sq = a.x.mul_mod(&a.x, &self.p)?;
        let three_x_sq = x_sq.add(&x_sq).add_mod(&x_sq, &self.p)?;
        let two_y = a.y.add_mod(&a.y, &self.p)?;
        let lambda = three_x_sq.mul_mod(&two_y.mod_inverse(&self.p)?, &self.p)?;

        let two_x = a.x.add(&a.x);
        let x3 = lambda.mul_mod(&lambda, &self.p)?.sub_mod(&two_x, &self.p)?;
        let y3 = lambda
            .mul_mod(&a.x.sub_mod(&x3, &self.p)?, &self.p)?
            .sub_mod(&a.y, &self.p)?;

        Ok(CurvePoint::from_coordinates(x3, y3))
    }

    /// The additive inverse of a point.
    pub fn negate_point(&self, a: &CurvePoint) -> Result<CurvePoint> {
        if a.is_infinity() {
            return Ok(CurvePoint::infinity());
        }
        let neg_y = self.p.sub_mod(&a.y, &self.p)?;
        Ok(CurvePoint::from_coordinates(a.x.clone(), neg_y))
    }

    /// Scalar multiplication `factor · point` by double-and-add.
    ///
    /// The factor is reduced modulo the group order first; a zero factor
    /// yields the point at infinity. Fails if the input point is invalid.
    pub fn multiply(&self, point: &CurvePoint, factor: &Bignum) -> Result<CurvePoint> {
        if !self.is_on_curve(point) {
            return Err(Error::param("point", "point is not on the curve"));
        }
        let k = factor.modulo(&self.n)?;
        if k.is_zero() || point.is_infinity() {
            return Ok(CurvePoint::infinity());
        }

        let mut acc = CurvePoint::infinity();
        for i in (0..k.bits()).rev() {
            acc = self.double_point(&acc)?;
            if k.bit(i) {
                acc = self.add_points(&acc, point)?;
            }
        }
        Ok(acc)
    }

    /// Scalar multiplication with the base point: `factor · G`.
    pub fn multiply_generator(&self, factor: &Bignum) -> Result<CurvePoint> {
        self.multiply(&self.generator(), factor)
    }
}

/* ========================================================================== */
/*  Key and signature kernels                                                 */
/* ========================================================================== */

impl Curve {
    /// Derive the public key for a 32-byte private scalar, encoded per the
    /// compression flag.
    ///
    /// Rejects scalars outside `[1, n-1]` or of the wrong length.
    pub fn public_key(&self, key: &[u8], compressed: bool) -> Result<Vec<u8>> {
        validate::length("private key", key.len(), SCALAR_SIZE)?;
        let d = Bignum::from_bytes_be(key);
        if d.is_zero() || d.compare(&self.n) != std::cmp::Ordering::Less {
            return Err(Error::param("private key", "scalar outside [1, n-1]"));
        }
        let q = self.multiply_generator(&d)?;
        let conversion = if compressed {
            PointConversion::Compressed
        } else {
            PointConversion::Uncompressed
        };
        Ok(q.encode(conversion))
    }

    /// Verify a decoded ECDSA `(r, s)` pair over `digest` against a public
    /// point: succeeds iff `u1·G + u2·Q` is finite and its x-coordinate
    /// matches `r` modulo n.
    pub fn ecdsa_verify(
        &self,
        r: &Bignum,
        s: &Bignum,
        digest: &[u8],
        point: &CurvePoint,
    ) -> Result<()> {
        let in_range = |v: &Bignum| {
            !v.is_zero() && !v.is_negative() && v.compare(&self.n) == std::cmp::Ordering::Less
        };
        if !in_range(r) || !in_range(s) {
            return Err(Error::param("signature", "component outside [1, n-1]"));
        }
        if point.is_infinity() || !self.is_on_curve(point) {
            return Err(Error::param("public key", "invalid curve point"));
        }

        let z = self.digest_to_int(digest);
        let w = s.mod_inverse(&self.n)?;
        let u1 = z.mul_mod(&w, &self.n)?;
        let u2 = r.mul_mod(&w, &self.n)?;

        let candidate = self.add_points(
            &self.multiply_generator(&u1)?,
            &self.multiply(point, &u2)?,
        )?;
        if candidate.is_infinity() {
            return Err(Error::Processing {
                operation: "signature verification",
                details: "candidate point at infinity",
            });
        }

        let v = candidate.x().modulo(&self.n)?;
        let v_bytes = v.to_bytes_be_padded(SCALAR_SIZE);
        let r_bytes = r.to_bytes_be_padded(SCALAR_SIZE);
        if bool::from(v_bytes.as_slice().ct_eq(r_bytes.as_slice())) {
            Ok(())
        } else {
            Err(Error::Processing {
                operation: "signature verification",
                details: "signature mismatch",
            })
        }
    }

    /// Public-key recovery kernel: encode `u1·G + u2·R` for a candidate
    /// signature point `R` and precomputed scalars `u1`, `u2`.
    pub fn recover_public_key(
        &self,
        u1: &Bignum,
        u2: &Bignum,
        r_point: &CurvePoint,
        conversion: PointConversion,
    ) -> Result<Vec<u8>> {
        let q = self.add_points(
            &self.multiply_generator(u1)?,
            &self.multiply(r_point, u2)?,
        )?;
        if q.is_infinity() {
            return Err(Error::Processing {
                operation: "public key recovery",
                details: "candidate point at infinity",
            });
        }
        Ok(q.encode(conversion))
    }

    /// Interpret a message digest as an integer, truncated to the curve's
    /// bit length per the ECDSA left-most-bits rule.
    pub(crate) fn digest_to_int(&self, digest: &[u8]) -> Bignum {
        let mut z = Bignum::from_bytes_be(digest);
        let digest_bits = digest.len() * 8;
        if digest_bits > self.degree() {
            z.rshift(digest_bits - self.degree());
        }
        z
    }
}
