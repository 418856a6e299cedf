//! Shared constants for secp256k1 operations

/// Size of a secp256k1 scalar in bytes (32 bytes = 256 bits)
pub const SCALAR_SIZE: usize = 32;

/// Size of a secp256k1 field element in bytes (32 bytes = 256 bits)
pub const FIELD_ELEMENT_SIZE: usize = 32;

/// Size of an uncompressed secp256k1 point in bytes: format byte (0x04) + x-coordinate + y-coordinate
pub const POINT_UNCOMPRESSED_SIZE: usize = 1 + 2 * FIELD_ELEMENT_SIZE; // 65 bytes: 0x04 || x || y

/// Size of a compressed secp256k1 point in bytes: format byte (0x02/0x03) + x-coordinate
pub const POINT_COMPRESSED_SIZE: usize = 1 + FIELD_ELEMENT_SIZE; // 33 bytes: 0x02/0x03 || x

/// Field prime p = 2^256 - 2^32 - 977
pub(crate) const FIELD_PRIME_HEX: &str =
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f";

/// Group order n
pub(crate) const GROUP_ORDER_HEX: &str =
    "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

/// Base point x-coordinate
pub(crate) const GENERATOR_X_HEX: &str =
    "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

/// Base point y-coordinate
pub(crate) const GENERATOR_Y_HEX: &str =
    "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

/// Curve coefficient b in y^2 = x^3 + b
pub(crate) const COEFFICIENT_B_HEX: &str = "7";
