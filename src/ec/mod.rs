//! secp256k1 Elliptic Curve Primitives
//!
//! This module implements the secp256k1 group on top of [`Bignum`]
//! arithmetic. The curve equation is y² = x³ + 7 over the prime field F_p
//! where:
//! - p = 2^256 - 2^32 - 977
//! - The curve order n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
//!
//! [`Curve`] is a shareable flyweight holding the domain parameters;
//! [`CurvePoint`] is a bare affine coordinate pair. Every operation that
//! needs the field or order takes the curve explicitly.
//!
//! [`Bignum`]: crate::bignum::Bignum

pub mod constants;
mod curve;
mod point;

pub use constants::{
    FIELD_ELEMENT_SIZE, POINT_COMPRESSED_SIZE, POINT_UNCOMPRESSED_SIZE, SCALAR_SIZE,
};
pub use curve::Curve;
pub use point::{CurvePoint, PointConversion};
