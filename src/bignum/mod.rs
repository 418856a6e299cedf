//! Sign-magnitude arbitrary-precision integer arithmetic
//!
//! `Bignum` is the computational substrate for the curve and signature
//! modules: a variable-length integer stored as little-endian 32-bit limbs
//! with an explicit sign flag. Canonical form never carries a superfluous
//! leading zero limb and zero is always non-negative.
//!
//! Division is truncating (the remainder carries the dividend's sign); the
//! modular family (`modulo`, `add_mod`, `sub_mod`, `mul_mod`, `mod_inverse`,
//! `mod_exp`) always reduces into the canonical range `[0, m)` regardless of
//! operand signs.

use crate::error::{validate, Error, Result};
use std::cmp::Ordering;
use std::fmt;
use zeroize::Zeroize;

/// Arbitrary-precision signed integer in sign-magnitude form.
///
/// Little-endian `u32` limbs; the empty limb vector is zero.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct Bignum {
    limbs: Vec<u32>,
    negative: bool,
}

/* ========================================================================== */
/*  Construction                                                              */
/* ========================================================================== */

impl Bignum {
    /// The additive identity: 0
    pub fn zero() -> Self {
        Bignum {
            limbs: Vec::new(),
            negative: false,
        }
    }

    /// The multiplicative identity: 1
    pub fn one() -> Self {
        Bignum {
            limbs: vec![1],
            negative: false,
        }
    }

    /// Create from a machine word.
    pub fn from_word(word: u64) -> Self {
        let mut limbs = vec![word as u32, (word >> 32) as u32];
        trim(&mut limbs);
        Bignum {
            limbs,
            negative: false,
        }
    }

    /// Parse from a hexadecimal string, with an optional leading `-`.
    ///
    /// Rejects empty input and non-hex characters.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let (negative, digits) = match hex.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, hex),
        };
        validate::min_length("hex string", digits.len(), 1)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::param("hex string", "invalid character"));
        }

        let mut limbs = Vec::with_capacity((digits.len() + 7) / 8);
        let bytes = digits.as_bytes();
        let mut end = bytes.len();
        while end > 0 {
            let start = end.saturating_sub(8);
            let chunk = std::str::from_utf8(&bytes[start..end])
                .map_err(|_| Error::param("hex string", "invalid character"))?;
            let limb = u32::from_str_radix(chunk, 16)
                .map_err(|_| Error::param("hex string", "invalid character"))?;
            limbs.push(limb);
            end = start;
        }
        trim(&mut limbs);
        let negative = negative && !limbs.is_empty();
        Ok(Bignum { limbs, negative })
    }

    /// Create a non-negative value from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut limbs = Vec::with_capacity((bytes.len() + 3) / 4);
        let mut end = bytes.len();
        while end > 0 {
            let start = end.saturating_sub(4);
            let mut limb = 0u32;
            for &b in &bytes[start..end] {
                limb = (limb << 8) | b as u32;
            }
            limbs.push(limb);
            end = start;
        }
        trim(&mut limbs);
        Bignum {
            limbs,
            negative: false,
        }
    }

    /// Parse from MPI framing: a 4-byte big-endian length prefix followed by
    /// the big-endian magnitude, whose top bit carries the sign.
    pub fn from_mpi(mpi: &[u8]) -> Result<Self> {
        validate::min_length("MPI buffer", mpi.len(), 4)?;
        let declared =
            u32::from_be_bytes([mpi[0], mpi[1], mpi[2], mpi[3]]) as usize;
        validate::length("MPI payload", mpi.len() - 4, declared)?;
        if declared == 0 {
            return Ok(Self::zero());
        }

        let negative = mpi[4] & 0x80 != 0;
        let mut magnitude = mpi[4..].to_vec();
        magnitude[0] &= 0x7f;
        let mut value = Self::from_bytes_be(&magnitude);
        value.negative = negative && !value.is_zero();
        Ok(value)
    }
}

/* ========================================================================== */
/*  Export                                                                    */
/* ========================================================================== */

impl Bignum {
    /// Minimal big-endian magnitude bytes; empty for zero.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let n = self.num_bytes();
        let mut out = vec![0u8; n];
        for (i, byte) in out.iter_mut().enumerate() {
            let bit_index = (n - 1 - i) * 8;
            let limb = self.limbs[bit_index / 32];
            *byte = (limb >> (bit_index % 32)) as u8;
        }
        out
    }

    /// Fixed-width big-endian export (`makeBin`): zero-padded on the left,
    /// or truncated to the least-significant `len` bytes when longer.
    pub fn to_bytes_be_padded(&self, len: usize) -> Vec<u8> {
        let minimal = self.to_bytes_be();
        if minimal.len() >= len {
            minimal[minimal.len() - len..].to_vec()
        } else {
            let mut out = vec![0u8; len];
            out[len - minimal.len()..].copy_from_slice(&minimal);
            out
        }
    }

    /// Export in MPI framing (see [`Bignum::from_mpi`]).
    pub fn to_mpi(&self) -> Vec<u8> {
        if self.is_zero() {
            return vec![0, 0, 0, 0];
        }
        let mut magnitude = self.to_bytes_be();
        if magnitude[0] & 0x80 != 0 {
            magnitude.insert(0, 0);
        }
        if self.negative {
            magnitude[0] |= 0x80;
        }
        let mut out = Vec::with_capacity(4 + magnitude.len());
        out.extend_from_slice(&(magnitude.len() as u32).to_be_bytes());
        out.extend_from_slice(&magnitude);
        out
    }

    /// Hexadecimal rendering of the value, `-`-prefixed when negative.
    pub fn to_hex(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut s = String::new();
        if self.negative {
            s.push('-');
        }
        for (i, limb) in self.limbs.iter().enumerate().rev() {
            if i == self.limbs.len() - 1 {
                s.push_str(&format!("{:x}", limb));
            } else {
                s.push_str(&format!("{:08x}", limb));
            }
        }
        s
    }

    /// The magnitude as a machine word, when it fits and the value is
    /// non-negative.
    pub fn word(&self) -> Option<u64> {
        if self.negative || self.limbs.len() > 2 {
            return None;
        }
        let low = *self.limbs.first().unwrap_or(&0) as u64;
        let high = *self.limbs.get(1).unwrap_or(&0) as u64;
        Some(low | (high << 32))
    }
}

/* ========================================================================== */
/*  Predicates and queries                                                    */
/* ========================================================================== */

impl Bignum {
    /// True if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    /// True if the value is one.
    #[inline]
    pub fn is_one(&self) -> bool {
        !self.negative && self.limbs.len() == 1 && self.limbs[0] == 1
    }

    /// True if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// True if the magnitude is odd.
    #[inline]
    pub fn is_odd(&self) -> bool {
        self.limbs.first().map_or(false, |l| l & 1 == 1)
    }

    /// Bit length of the magnitude; 0 for zero.
    pub fn bits(&self) -> usize {
        match self.limbs.last() {
            None => 0,
            Some(&top) => (self.limbs.len() - 1) * 32 + (32 - top.leading_zeros() as usize),
        }
    }

    /// Byte length of the magnitude; 0 for zero.
    pub fn num_bytes(&self) -> usize {
        (self.bits() + 7) / 8
    }

    /// Bit `i` of the magnitude (bit 0 is least significant).
    pub fn bit(&self, i: usize) -> bool {
        self.limbs
            .get(i / 32)
            .map_or(false, |limb| (limb >> (i % 32)) & 1 == 1)
    }

    /// Three-way comparison honoring sign.
    pub fn compare(&self, other: &Bignum) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_mag(&self.limbs, &other.limbs),
            (true, true) => cmp_mag(&other.limbs, &self.limbs),
        }
    }
}

impl PartialOrd for Bignum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Bignum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/* ========================================================================== */
/*  Arithmetic                                                                */
/* ========================================================================== */

impl Bignum {
    /// `self + other`
    pub fn add(&self, other: &Bignum) -> Bignum {
        Self::combine(
            &self.limbs,
            self.negative,
            &other.limbs,
            other.negative,
        )
    }

    /// `self - other`
    pub fn sub(&self, other: &Bignum) -> Bignum {
        Self::combine(
            &self.limbs,
            self.negative,
            &other.limbs,
            !other.negative,
        )
    }

    /// `self * other`
    pub fn mul(&self, other: &Bignum) -> Bignum {
        let limbs = mul_mag(&self.limbs, &other.limbs);
        let negative = !limbs.is_empty() && self.negative != other.negative;
        Bignum { limbs, negative }
    }

    /// Truncating division: `(quotient, remainder)` with
    /// `self = quotient * divisor + remainder` and the remainder carrying the
    /// dividend's sign. Fails on a zero divisor.
    pub fn div(&self, divisor: &Bignum) -> Result<(Bignum, Bignum)> {
        if divisor.is_zero() {
            return Err(Error::param("divisor", "division by zero"));
        }
        let (q_mag, r_mag) = divrem_mag(&self.limbs, &divisor.limbs);
        let quotient = Bignum {
            negative: !q_mag.is_empty() && self.negative != divisor.negative,
            limbs: q_mag,
        };
        let remainder = Bignum {
            negative: !r_mag.is_empty() && self.negative,
            limbs: r_mag,
        };
        Ok((quotient, remainder))
    }

    /// Canonical residue of `self` modulo a positive `m`, in `[0, m)`.
    pub fn modulo(&self, m: &Bignum) -> Result<Bignum> {
        if m.is_zero() || m.is_negative() {
            return Err(Error::param("modulus", "modulus must be positive"));
        }
        let (_, mut r) = self.div(m)?;
        if r.negative {
            r = Self::combine(&m.limbs, false, &r.limbs, true);
        }
        Ok(r)
    }

    /// `(self + other) mod m`, canonical.
    pub fn add_mod(&self, other: &Bignum, m: &Bignum) -> Result<Bignum> {
        self.add(other).modulo(m)
    }

    /// `(self - other) mod m`, canonical.
    pub fn sub_mod(&self, other: &Bignum, m: &Bignum) -> Result<Bignum> {
        self.sub(other).modulo(m)
    }

    /// `(self * other) mod m`, canonical.
    pub fn mul_mod(&self, other: &Bignum, m: &Bignum) -> Result<Bignum> {
        self.mul(other).modulo(m)
    }

    /// Multiplicative inverse modulo `m`.
    ///
    /// Fails when the value shares a factor with the modulus, in particular
    /// for a value ≡ 0 or a non-prime modulus with a common divisor.
    pub fn mod_inverse(&self, m: &Bignum) -> Result<Bignum> {
        let a = self.modulo(m)?;
        if a.is_zero() {
            return Err(Error::Processing {
                operation: "modular inverse",
                details: "value is not invertible",
            });
        }
        if m.is_odd() {
            Self::inverse_binary(a, m)
        } else {
            Self::inverse_euclid(a, m)
        }
    }

    /// `self ^ exp mod m` by square-and-multiply. The exponent must be
    /// non-negative and the modulus positive.
    pub fn mod_exp(&self, exp: &Bignum, m: &Bignum) -> Result<Bignum> {
        if exp.is_negative() {
            return Err(Error::param("exponent", "exponent must be non-negative"));
        }
        if m.is_zero() || m.is_negative() {
            return Err(Error::param("modulus", "modulus must be positive"));
        }
        if m.is_one() {
            return Ok(Self::zero());
        }
        let base = self.modulo(m)?;
        let mut result = Self::one();
        for i in (0..exp.bits()).rev() {
            result = result.mul_mod(&result, m)?;
            if exp.bit(i) {
                result = result.mul_mod(&base, m)?;
            }
        }
        Ok(result)
    }

    // Binary inversion for an odd modulus; no divisions on the hot path.
    fn inverse_binary(a: Bignum, m: &Bignum) -> Result<Bignum> {
        let mut u = a;
        let mut v = m.clone();
        let mut x1 = Bignum::one();
        let mut x2 = Bignum::zero();

        while !u.is_one() && !v.is_one() {
            while !u.is_zero() && !u.is_odd() {
                u.rshift(1);
                x1 = Self::half_mod(x1, m);
            }
            while !v.is_zero() && !v.is_odd() {
                v.rshift(1);
                x2 = Self::half_mod(x2, m);
            }
            if u.is_zero() || v.is_zero() {
                return Err(Error::Processing {
                    operation: "modular inverse",
                    details: "value is not invertible",
                });
            }
            if u.compare(&v) != Ordering::Less {
                u = u.sub(&v);
                x1 = x1.sub_mod(&x2, m)?;
            } else {
                v = v.sub(&u);
                x2 = x2.sub_mod(&x1, m)?;
            }
        }

        if u.is_one() {
            Ok(x1)
        } else {
            Ok(x2)
        }
    }

    // (x / 2) mod m for odd m, with x in [0, m).
    fn half_mod(mut x: Bignum, m: &Bignum) -> Bignum {
        if x.is_odd() {
            x = x.add(m);
        }
        x.rshift(1);
        x
    }

    // Extended Euclid; handles even moduli.
    fn inverse_euclid(a: Bignum, m: &Bignum) -> Result<Bignum> {
        let mut old_r = a;
        let mut r = m.clone();
        let mut old_s = Bignum::one();
        let mut s = Bignum::zero();

        while !r.is_zero() {
            let (q, rem) = old_r.div(&r)?;
            old_r = r;
            r = rem;
            let next_s = old_s.sub(&q.mul(&s));
            old_s = s;
            s = next_s;
        }

        if !old_r.is_one() {
            return Err(Error::Processing {
                operation: "modular inverse",
                details: "value is not invertible",
            });
        }
        old_s.modulo(m)
    }

    // Shared signed add: a + b with per-operand signs.
    fn combine(a: &[u32], a_neg: bool, b: &[u32], b_neg: bool) -> Bignum {
        if a_neg == b_neg {
            let limbs = add_mag(a, b);
            let negative = a_neg && !limbs.is_empty();
            return Bignum { limbs, negative };
        }
        match cmp_mag(a, b) {
            Ordering::Equal => Bignum::zero(),
            Ordering::Greater => {
                let limbs = sub_mag(a, b);
                Bignum {
                    negative: a_neg && !limbs.is_empty(),
                    limbs,
                }
            }
            Ordering::Less => {
                let limbs = sub_mag(b, a);
                Bignum {
                    negative: b_neg && !limbs.is_empty(),
                    limbs,
                }
            }
        }
    }
}

/* ========================================================================== */
/*  Shifts                                                                    */
/* ========================================================================== */

impl Bignum {
    /// Shift the magnitude left by `bits`, in place.
    pub fn lshift(&mut self, bits: usize) {
        if self.is_zero() || bits == 0 {
            return;
        }
        let limb_shift = bits / 32;
        let bit_shift = bits % 32;
        let mut limbs = vec![0u32; self.limbs.len() + limb_shift + 1];
        for (i, &limb) in self.limbs.iter().enumerate() {
            let wide = (limb as u64) << bit_shift;
            limbs[i + limb_shift] |= wide as u32;
            limbs[i + limb_shift + 1] |= (wide >> 32) as u32;
        }
        trim(&mut limbs);
        self.limbs = limbs;
    }

    /// Shift the magnitude right by `bits`, in place. Shifting past the
    /// magnitude yields zero.
    pub fn rshift(&mut self, bits: usize) {
        if self.is_zero() || bits == 0 {
            return;
        }
        let limb_shift = bits / 32;
        let bit_shift = bits % 32;
        if limb_shift >= self.limbs.len() {
            *self = Self::zero();
            return;
        }
        let mut limbs = vec![0u32; self.limbs.len() - limb_shift];
        for i in 0..limbs.len() {
            let low = self.limbs[i + limb_shift] >> bit_shift;
            let high = if bit_shift > 0 {
                self.limbs
                    .get(i + limb_shift + 1)
                    .map_or(0, |&l| l << (32 - bit_shift))
            } else {
                0
            };
            limbs[i] = low | high;
        }
        trim(&mut limbs);
        let negative = self.negative && !limbs.is_empty();
        self.limbs = limbs;
        self.negative = negative;
    }

    /// Non-mutating left shift.
    pub fn lshifted(&self, bits: usize) -> Bignum {
        let mut out = self.clone();
        out.lshift(bits);
        out
    }

    /// Non-mutating right shift.
    pub fn rshifted(&self, bits: usize) -> Bignum {
        let mut out = self.clone();
        out.rshift(bits);
        out
    }
}

/* ========================================================================== */
/*  Magnitude helpers                                                         */
/* ========================================================================== */

fn trim(limbs: &mut Vec<u32>) {
    while limbs.last() == Some(&0) {
        limbs.pop();
    }
}

fn cmp_mag(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for i in (0..a.len()).rev() {
        if a[i] != b[i] {
            return a[i].cmp(&b[i]);
        }
    }
    Ordering::Equal
}

fn add_mag(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = vec![0u32; a.len().max(b.len()) + 1];
    let mut carry = 0u64;
    for i in 0..out.len() {
        let sum = *a.get(i).unwrap_or(&0) as u64 + *b.get(i).unwrap_or(&0) as u64 + carry;
        out[i] = sum as u32;
        carry = sum >> 32;
    }
    trim(&mut out);
    out
}

// Requires a >= b.
fn sub_mag(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = vec![0u32; a.len()];
    let mut borrow = 0i64;
    for i in 0..a.len() {
        let mut diff = a[i] as i64 - *b.get(i).unwrap_or(&0) as i64 - borrow;
        if diff < 0 {
            diff += 1 << 32;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u32;
    }
    trim(&mut out);
    out
}

fn mul_mag(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u32; a.len() + b.len()];
    for i in 0..a.len() {
        let mut carry = 0u64;
        for j in 0..b.len() {
            let t = out[i + j] as u64 + a[i] as u64 * b[j] as u64 + carry;
            out[i + j] = t as u32;
            carry = t >> 32;
        }
        out[i + b.len()] = carry as u32;
    }
    trim(&mut out);
    out
}

// Binary long division on magnitudes; the divisor must be non-empty.
fn divrem_mag(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    if cmp_mag(a, b) == Ordering::Less {
        let mut r = a.to_vec();
        trim(&mut r);
        return (Vec::new(), r);
    }

    let a_bits = mag_bits(a);
    let mut q = vec![0u32; a.len()];
    let mut r: Vec<u32> = Vec::with_capacity(b.len() + 1);

    for i in (0..a_bits).rev() {
        // r = (r << 1) | bit_i(a)
        let mut carry = 0u32;
        for limb in r.iter_mut() {
            let next_carry = *limb >> 31;
            *limb = (*limb << 1) | carry;
            carry = next_carry;
        }
        if carry != 0 {
            r.push(carry);
        }
        if (a[i / 32] >> (i % 32)) & 1 == 1 {
            if r.is_empty() {
                r.push(1);
            } else {
                r[0] |= 1;
            }
        }

        if cmp_mag(&r, b) != Ordering::Less {
            r = sub_mag(&r, b);
            q[i / 32] |= 1 << (i % 32);
        }
    }

    trim(&mut q);
    trim(&mut r);
    (q, r)
}

fn mag_bits(limbs: &[u32]) -> usize {
    let mut top = limbs.len();
    while top > 0 && limbs[top - 1] == 0 {
        top -= 1;
    }
    if top == 0 {
        0
    } else {
        (top - 1) * 32 + (32 - limbs[top - 1].leading_zeros() as usize)
    }
}

/* ========================================================================== */
/*  Formatting                                                                */
/* ========================================================================== */

impl fmt::Display for Bignum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Bignum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bignum({})", self.to_hex())
    }
}
