//! BIP32 extended keys: derivation tree nodes and their serialized record

use byteorder::{BigEndian, ByteOrder};
use zeroize::Zeroize;

use crate::bignum::Bignum;
use crate::ec::{Curve, PointConversion};
use crate::error::{validate, Error, Result};
use crate::hashes::{hash160, hmac_sha512};
use crate::hd::version::ExtendedKeyVersion;
use crate::hd::{Key, KeyCompression, KeyMaterial, KeyType};

/// Size of the serialized extended-key record in bytes.
pub const EXTENDED_KEY_SIZE: usize = 78;

/// Index offset marking hardened children (top bit of the sequence).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A node in a BIP32 derivation tree.
///
/// Couples a [`Key`] with its 32-byte chain code and tree metadata: depth
/// (0 for the master), the first four bytes of the parent's HASH160
/// fingerprint, the child sequence (top bit set for hardened nodes) and the
/// SLIP-0132 serialization scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKey {
    key: Key,
    chaincode: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    sequence: u32,
    version: ExtendedKeyVersion,
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chaincode.zeroize();
    }
}

impl ExtendedKey {
    /// Create a root node (depth 0, no parent) from a key and chain code.
    pub fn new(key: Key, chaincode: &[u8], version: ExtendedKeyVersion) -> Result<Self> {
        validate::length("chain code", chaincode.len(), 32)?;
        let mut code = [0u8; 32];
        code.copy_from_slice(chaincode);
        Ok(ExtendedKey {
            key,
            chaincode: code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            sequence: 0,
            version,
        })
    }

    /// The wrapped key material.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The 32-byte chain code.
    pub fn chaincode(&self) -> &[u8; 32] {
        &self.chaincode
    }

    /// Depth in the derivation tree; 0 for the master node.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// First four bytes of the parent public key's HASH160; zero for the
    /// master node.
    pub fn parent_fingerprint(&self) -> &[u8; 4] {
        &self.parent_fingerprint
    }

    /// The child index this node was derived at, hardened bit included.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The serialization scheme.
    pub fn version(&self) -> ExtendedKeyVersion {
        self.version
    }

    /// This node's own fingerprint: HASH160 of its compressed public key,
    /// truncated to four bytes.
    pub fn fingerprint(&self) -> Result<[u8; 4]> {
        let public = self.key.public_key(KeyCompression::Compressed)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash160(&public)[..4]);
        Ok(out)
    }

    /// The public projection of this node: same chain code and metadata,
    /// public key material only.
    pub fn public_only(&self) -> Result<ExtendedKey> {
        let public = self.key.public_key(KeyCompression::Compressed)?;
        Ok(ExtendedKey {
            key: Key::from_public_bytes(&public)?,
            chaincode: self.chaincode,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            sequence: self.sequence,
            version: self.version,
        })
    }
}

/* ========================================================================== */
/*  Serialization                                                             */
/* ========================================================================== */

impl ExtendedKey {
    /// Serialize as the given key type.
    ///
    /// `KeyType::Public` always works (the public key is derived when
    /// needed); `KeyType::Private` fails for public-only nodes.
    pub fn serialized_data_as(&self, key_type: KeyType) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(EXTENDED_KEY_SIZE);
        out.extend_from_slice(&self.version.version_bytes(key_type));
        out.push(self.depth);
        out.extend_from_slice(&self.parent_fingerprint);
        let mut sequence = [0u8; 4];
        BigEndian::write_u32(&mut sequence, self.sequence);
        out.extend_from_slice(&sequence);
        out.extend_from_slice(&self.chaincode);

        match (key_type, &self.key.0) {
            (KeyType::Private, KeyMaterial::Private(scalar)) => {
                out.push(0x00);
                out.extend_from_slice(scalar);
            }
            (KeyType::Private, KeyMaterial::Public(_)) => {
                return Err(Error::Processing {
                    operation: "extended key serialization",
                    details: "no private material in a public-only node",
                });
            }
            (KeyType::Public, _) => {
                out.extend_from_slice(&self.key.public_key(KeyCompression::Compressed)?);
            }
        }
        Ok(out)
    }

    /// The 78-byte record serialized under this node's own key type.
    pub fn serialized_data(&self) -> Result<Vec<u8>> {
        self.serialized_data_as(self.key.key_type())
    }

    /// Base58Check string under this node's own key type.
    pub fn serialized_string(&self) -> Result<String> {
        Ok(bs58::encode(self.serialized_data()?).with_check().into_string())
    }

    /// Base58Check extended public key string (xpub/ypub/zpub/dgub).
    pub fn serialized_pub(&self) -> Result<String> {
        let data = self.serialized_data_as(KeyType::Public)?;
        Ok(bs58::encode(data).with_check().into_string())
    }

    /// Base58Check extended private key string (xprv/yprv/zprv/dgpv).
    ///
    /// Fails for public-only nodes.
    pub fn serialized_prv(&self) -> Result<String> {
        let data = self.serialized_data_as(KeyType::Private)?;
        Ok(bs58::encode(data).with_check().into_string())
    }

    /// Deserialize from the 78-byte record.
    ///
    /// Rejects a wrong total length, an unknown version prefix, malformed
    /// key material, and a zero-depth node with a parent or sequence.
    pub fn from_serialized_data(data: &[u8]) -> Result<Self> {
        validate::length("extended key record", data.len(), EXTENDED_KEY_SIZE)?;

        let version_bytes = [data[0], data[1], data[2], data[3]];
        let (version, key_type) = ExtendedKeyVersion::from_version_bytes(version_bytes)?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let sequence = BigEndian::read_u32(&data[9..13]);
        if depth == 0 && (parent_fingerprint != [0u8; 4] || sequence != 0) {
            return Err(Error::param(
                "extended key record",
                "master node with a parent fingerprint or sequence",
            ));
        }

        let mut chaincode = [0u8; 32];
        chaincode.copy_from_slice(&data[13..45]);

        let key = match key_type {
            KeyType::Private => {
                if data[45] != 0 {
                    return Err(Error::param(
                        "extended key record",
                        "private key field must start with a zero byte",
                    ));
                }
                Key::from_private_bytes(&data[46..78])?
            }
            KeyType::Public => Key::from_public_bytes(&data[45..78])?,
        };

        Ok(ExtendedKey {
            key,
            chaincode,
            depth,
            parent_fingerprint,
            sequence,
            version,
        })
    }

    /// Deserialize from a Base58Check string.
    pub fn from_serialized_str(string: &str) -> Result<Self> {
        let data = bs58::decode(string)
            .with_check(None)
            .into_vec()
            .map_err(|e| Error::param("extended key string", e.to_string()))?;
        Self::from_serialized_data(&data)
    }
}

/* ========================================================================== */
/*  Derivation                                                                */
/* ========================================================================== */

impl ExtendedKey {
    /// Derive the child at `sequence`, hardened or not.
    ///
    /// Hardened derivation requires private material. A degenerate HMAC
    /// outcome (I_L ≥ n, a zero child scalar, or a child point at infinity)
    /// deterministically retries with the next index, per the BIP32 rule.
    pub fn derive_child(&self, sequence: u32, hardened: bool) -> Result<ExtendedKey> {
        if sequence >= HARDENED_OFFSET {
            return Err(Error::param("sequence", "index has the hardened bit set"));
        }
        if self.depth == u8::MAX {
            return Err(Error::Processing {
                operation: "child derivation",
                details: "derivation depth exhausted",
            });
        }
        if hardened && self.key.key_type() == KeyType::Public {
            return Err(Error::Processing {
                operation: "child derivation",
                details: "hardened derivation requires a private key",
            });
        }

        let curve = Curve::secp256k1();
        let n = curve.order();
        let parent_public = self.key.public_key(KeyCompression::Compressed)?;
        let parent_fingerprint = {
            let mut fp = [0u8; 4];
            fp.copy_from_slice(&hash160(&parent_public)[..4]);
            fp
        };

        let mut index = sequence | if hardened { HARDENED_OFFSET } else { 0 };
        loop {
            let mut message = Vec::with_capacity(37);
            match &self.key.0 {
                KeyMaterial::Private(scalar) if hardened => {
                    message.push(0x00);
                    message.extend_from_slice(scalar);
                }
                _ => message.extend_from_slice(&parent_public),
            }
            let mut index_bytes = [0u8; 4];
            BigEndian::write_u32(&mut index_bytes, index);
            message.extend_from_slice(&index_bytes);

            let mut output = hmac_sha512(&self.chaincode, &message);
            let il = Bignum::from_bytes_be(&output[..32]);

            let child_key = if il.compare(n) != std::cmp::Ordering::Less {
                None
            } else {
                match &self.key.0 {
                    KeyMaterial::Private(scalar) => {
                        let d = Bignum::from_bytes_be(scalar);
                        let child = il.add_mod(&d, n)?;
                        if child.is_zero() {
                            None
                        } else {
                            Some(Key::from_private_bytes(&child.to_bytes_be_padded(32))?)
                        }
                    }
                    KeyMaterial::Public(encoded) => {
                        let parent_point = curve.decode_point(encoded)?;
                        let child_point = curve.add_points(
                            &curve.multiply_generator(&il)?,
                            &parent_point,
                        )?;
                        if child_point.is_infinity() {
                            None
                        } else {
                            Some(Key::from_public_bytes(
                                &child_point.encode(PointConversion::Compressed),
                            )?)
                        }
                    }
                }
            };

            match child_key {
                Some(key) => {
                    let mut chaincode = [0u8; 32];
                    chaincode.copy_from_slice(&output[32..]);
                    output.zeroize();
                    return Ok(ExtendedKey {
                        key,
                        chaincode,
                        depth: self.depth + 1,
                        parent_fingerprint,
                        sequence: index,
                        version: self.version,
                    });
                }
                None => {
                    output.zeroize();
                    index = index.checked_add(1).ok_or(Error::Processing {
                        operation: "child derivation",
                        details: "derivation index space exhausted",
                    })?;
                    if (index & HARDENED_OFFSET != 0) != hardened {
                        return Err(Error::Processing {
                            operation: "child derivation",
                            details: "derivation index space exhausted",
                        });
                    }
                }
            }
        }
    }
}
