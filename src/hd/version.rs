//! SLIP-0132 version prefixes for serialized extended keys

use crate::error::{Error, Result};
use crate::hd::KeyType;

// Version bytes per SLIP-0132: one (public, private) prefix pair per
// address scheme.
const XPUB: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const XPRV: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
const YPUB: [u8; 4] = [0x04, 0x9D, 0x7C, 0xB2];
const YPRV: [u8; 4] = [0x04, 0x9D, 0x78, 0x78];
const ZPUB: [u8; 4] = [0x04, 0xB2, 0x47, 0x46];
const ZPRV: [u8; 4] = [0x04, 0xB2, 0x43, 0x0C];
const DGUB: [u8; 4] = [0x02, 0xFA, 0xCA, 0xFD];
const DGPV: [u8; 4] = [0x02, 0xFA, 0xC3, 0x98];

/// Address scheme of a serialized extended key, mapping to its SLIP-0132
/// version prefixes (`xpub`/`xprv`, `ypub`/`yprv`, `zpub`/`zprv`,
/// `dgub`/`dgpv`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyVersion {
    /// Legacy and script-hash addresses (xpub/xprv)
    P2pkhP2sh,
    /// Native segwit nested in P2SH (ypub/yprv)
    P2wpkhNestedP2sh,
    /// Native segwit (zpub/zprv)
    P2wpkh,
    /// Dogecoin legacy addresses (dgub/dgpv)
    DogeP2pkhP2sh,
}

impl ExtendedKeyVersion {
    /// The 4-byte version prefix for this scheme and key type.
    pub fn version_bytes(&self, key_type: KeyType) -> [u8; 4] {
        match (self, key_type) {
            (Self::P2pkhP2sh, KeyType::Public) => XPUB,
            (Self::P2pkhP2sh, KeyType::Private) => XPRV,
            (Self::P2wpkhNestedP2sh, KeyType::Public) => YPUB,
            (Self::P2wpkhNestedP2sh, KeyType::Private) => YPRV,
            (Self::P2wpkh, KeyType::Public) => ZPUB,
            (Self::P2wpkh, KeyType::Private) => ZPRV,
            (Self::DogeP2pkhP2sh, KeyType::Public) => DGUB,
            (Self::DogeP2pkhP2sh, KeyType::Private) => DGPV,
        }
    }

    /// Classify a 4-byte prefix into its scheme and key type.
    ///
    /// Unrecognized prefixes are an error; no default key type is assumed.
    pub fn from_version_bytes(bytes: [u8; 4]) -> Result<(Self, KeyType)> {
        match bytes {
            XPUB => Ok((Self::P2pkhP2sh, KeyType::Public)),
            XPRV => Ok((Self::P2pkhP2sh, KeyType::Private)),
            YPUB => Ok((Self::P2wpkhNestedP2sh, KeyType::Public)),
            YPRV => Ok((Self::P2wpkhNestedP2sh, KeyType::Private)),
            ZPUB => Ok((Self::P2wpkh, KeyType::Public)),
            ZPRV => Ok((Self::P2wpkh, KeyType::Private)),
            DGUB => Ok((Self::DogeP2pkhP2sh, KeyType::Public)),
            DGPV => Ok((Self::DogeP2pkhP2sh, KeyType::Private)),
            _ => Err(Error::param(
                "extended key version",
                "unrecognized version prefix",
            )),
        }
    }
}
