//! Path-driven key generation from a master seed
//!
//! Implements the key-generation layer described in BIP32: a master node is
//! expanded from a seed with HMAC-SHA512, and derivation paths of the form
//! `m/44'/0'/0'/0/0` walk the tree (apostrophes mark hardened steps).

use crate::error::{validate, Error, Result};
use crate::hashes::hmac_sha512;
use crate::hd::version::ExtendedKeyVersion;
use crate::hd::{ExtendedKey, Key};
use zeroize::Zeroize;

/// HMAC key for master-node expansion, fixed by BIP32.
pub const BIP32_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Stateful derivation driver: remembers the master node and the node the
/// last derivation produced.
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    master: ExtendedKey,
    generated: ExtendedKey,
}

impl KeyGenerator {
    /// Build the master node from a seed (16–64 bytes) and derivation
    /// scheme: `HMAC-SHA512("Bitcoin seed", seed)` splits into the master
    /// private key and chain code.
    pub fn new(seed: &[u8], version: ExtendedKeyVersion) -> Result<Self> {
        validate::min_length("seed", seed.len(), 16)?;
        validate::max_length("seed", seed.len(), 64)?;

        let mut output = hmac_sha512(BIP32_HMAC_KEY, seed);
        let key = Key::from_private_bytes(&output[..32])?;
        let master = ExtendedKey::new(key, &output[32..], version)?;
        output.zeroize();

        Ok(KeyGenerator {
            generated: master.clone(),
            master,
        })
    }

    /// Resume from a serialized extended key string (xpub or xprv family).
    pub fn from_serialized_str(string: &str) -> Result<Self> {
        let master = ExtendedKey::from_serialized_str(string)?;
        Ok(KeyGenerator {
            generated: master.clone(),
            master,
        })
    }

    /// Resume from an in-memory extended key.
    pub fn from_extended_key(extended_key: ExtendedKey) -> Self {
        KeyGenerator {
            generated: extended_key.clone(),
            master: extended_key,
        }
    }

    /// The node the generator started from.
    pub fn master(&self) -> &ExtendedKey {
        &self.master
    }

    /// The node the last derivation produced.
    pub fn generated(&self) -> &ExtendedKey {
        &self.generated
    }

    /// Serialized extended public key for the last generated node.
    pub fn ext_pub(&self) -> Result<String> {
        self.generated.serialized_pub()
    }

    /// Serialized extended private key for the last generated node.
    pub fn ext_prv(&self) -> Result<String> {
        self.generated.serialized_prv()
    }

    /// Walk a derivation path from the current node, e.g. `m/44'/60'/0'/0`.
    ///
    /// A leading `m/` is optional; an apostrophe suffix marks a hardened
    /// step. Fails on an empty path or an unparsable component.
    pub fn derive_path(&mut self, path: &str) -> Result<()> {
        let trimmed = path.strip_prefix("m/").unwrap_or(path);
        if trimmed.is_empty() {
            return Err(Error::param("derivation path", "path has no components"));
        }
        for component in trimmed.split('/') {
            let (digits, hardened) = match component.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (component, false),
            };
            let sequence: u32 = digits
                .parse()
                .map_err(|_| Error::param("derivation path", "invalid path component"))?;
            self.derive(sequence, hardened)?;
        }
        Ok(())
    }

    /// Derive one step from the current node, advancing the generator.
    pub fn derive(&mut self, sequence: u32, hardened: bool) -> Result<()> {
        self.generated = self.generated.derive_child(sequence, hardened)?;
        Ok(())
    }

    /// Reset the generator to the node it started from.
    pub fn reset(&mut self) {
        self.generated = self.master.clone();
    }

    /// Derive a child of the current node without advancing the generator.
    pub fn child(&self, sequence: u32, hardened: bool) -> Result<ExtendedKey> {
        self.generated.derive_child(sequence, hardened)
    }
}
