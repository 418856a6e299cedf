use super::*;
use crate::ec::POINT_UNCOMPRESSED_SIZE;
use rand::rngs::OsRng;

const VECTOR1_SEED: &str = "000102030405060708090a0b0c0d0e0f";
const VECTOR2_SEED: &str = "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542";

struct Step {
    sequence: u32,
    hardened: bool,
    xprv: &'static str,
    xpub: &'static str,
}

fn check_chain(seed_hex: &str, master_xprv: &str, master_xpub: &str, steps: &[Step]) {
    let seed = hex::decode(seed_hex).unwrap();
    let mut generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();

    assert_eq!(generator.ext_prv().unwrap(), master_xprv);
    assert_eq!(generator.ext_pub().unwrap(), master_xpub);

    for step in steps {
        generator.derive(step.sequence, step.hardened).unwrap();
        assert_eq!(generator.ext_prv().unwrap(), step.xprv);
        assert_eq!(generator.ext_pub().unwrap(), step.xpub);
    }
}

#[test]
fn test_bip32_vector1() {
    check_chain(
        VECTOR1_SEED,
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi",
        "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8",
        &[
            Step {
                sequence: 0,
                hardened: true,
                xprv: "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7",
                xpub: "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw",
            },
            Step {
                sequence: 1,
                hardened: false,
                xprv: "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs",
                xpub: "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ",
            },
            Step {
                sequence: 2,
                hardened: true,
                xprv: "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM",
                xpub: "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5",
            },
            Step {
                sequence: 2,
                hardened: false,
                xprv: "xprvA2JDeKCSNNZky6uBCviVfJSKyQ1mDYahRjijr5idH2WwLsEd4Hsb2Tyh8RfQMuPh7f7RtyzTtdrbdqqsunu5Mm3wDvUAKRHSC34sJ7in334",
                xpub: "xpub6FHa3pjLCk84BayeJxFW2SP4XRrFd1JYnxeLeU8EqN3vDfZmbqBqaGJAyiLjTAwm6ZLRQUMv1ZACTj37sR62cfN7fe5JnJ7dh8zL4fiyLHV",
            },
            Step {
                sequence: 1000000000,
                hardened: false,
                xprv: "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76",
                xpub: "xpub6H1LXWLaKsWFhvm6RVpEL9P4KfRZSW7abD2ttkWP3SSQvnyA8FSVqNTEcYFgJS2UaFcxupHiYkro49S8yGasTvXEYBVPamhGW6cFJodrTHy",
            },
        ],
    );
}

#[test]
fn test_bip32_vector2() {
    check_chain(
        VECTOR2_SEED,
        "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U",
        "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        &[
            Step {
                sequence: 0,
                hardened: false,
                xprv: "xprv9vHkqa6EV4sPZHYqZznhT2NPtPCjKuDKGY38FBWLvgaDx45zo9WQRUT3dKYnjwih2yJD9mkrocEZXo1ex8G81dwSM1fwqWpWkeS3v86pgKt",
                xpub: "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH",
            },
            Step {
                sequence: 2147483647,
                hardened: true,
                xprv: "xprv9wSp6B7kry3Vj9m1zSnLvN3xH8RdsPP1Mh7fAaR7aRLcQMKTR2vidYEeEg2mUCTAwCd6vnxVrcjfy2kRgVsFawNzmjuHc2YmYRmagcEPdU9",
                xpub: "xpub6ASAVgeehLbnwdqV6UKMHVzgqAG8Gr6riv3Fxxpj8ksbH9ebxaEyBLZ85ySDhKiLDBrQSARLq1uNRts8RuJiHjaDMBU4Zn9h8LZNnBC5y4a",
            },
            Step {
                sequence: 1,
                hardened: false,
                xprv: "xprv9zFnWC6h2cLgpmSA46vutJzBcfJ8yaJGg8cX1e5StJh45BBciYTRXSd25UEPVuesF9yog62tGAQtHjXajPPdbRCHuWS6T8XA2ECKADdw4Ef",
                xpub: "xpub6DF8uhdarytz3FWdA8TvFSvvAh8dP3283MY7p2V4SeE2wyWmG5mg5EwVvmdMVCQcoNJxGoWaU9DCWh89LojfZ537wTfunKau47EL2dhHKon",
            },
            Step {
                sequence: 2147483646,
                hardened: true,
                xprv: "xprvA1RpRA33e1JQ7ifknakTFpgNXPmW2YvmhqLQYMmrj4xJXXWYpDPS3xz7iAxn8L39njGVyuoseXzU6rcxFLJ8HFsTjSyQbLYnMpCqE2VbFWc",
                xpub: "xpub6ERApfZwUNrhLCkDtcHTcxd75RbzS1ed54G1LkBUHQVHQKqhMkhgbmJbZRkrgZw4koxb5JaHWkY4ALHY2grBGRjaDMzQLcgJvLJuZZvRcEL",
            },
            Step {
                sequence: 2,
                hardened: false,
                xprv: "xprvA2nrNbFZABcdryreWet9Ea4LvTJcGsqrMzxHx98MMrotbir7yrKCEXw7nadnHM8Dq38EGfSh6dqA9QWTyefMLEcBYJUuekgW4BYPJcr9E7j",
                xpub: "xpub6FnCn6nSzZAw5Tw7cgR9bi15UV96gLZhjDstkXXxvCLsUXBGXPdSnLFbdpq8p9HmGsApME5hQTZ3emM2rnY5agb9rXpVGyy3bdW6EEgAtqt",
            },
        ],
    );
}

#[test]
fn test_master_child_metadata() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    let master = generator.master();
    assert_eq!(master.depth(), 0);
    assert_eq!(master.parent_fingerprint(), &[0u8; 4]);
    assert_eq!(master.sequence(), 0);

    let child = master.derive_child(0, true).unwrap();
    assert_eq!(child.depth(), 1);
    assert_eq!(child.sequence(), 0x8000_0000);
    assert_eq!(child.parent_fingerprint(), &master.fingerprint().unwrap());
    assert_eq!(child.chaincode().len(), 32);
}

#[test]
fn test_derivation_is_deterministic() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    let a = generator.master().derive_child(7, true).unwrap();
    let b = generator.master().derive_child(7, true).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn test_public_derivation_matches_private() {
    let seed = hex::decode(VECTOR2_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    let master = generator.master();

    // CKDpub of the public projection equals the projection of CKDpriv
    let child_private = master.derive_child(0, false).unwrap();
    let child_via_public = master.public_only().unwrap().derive_child(0, false).unwrap();
    assert_eq!(
        child_via_public.key().as_bytes(),
        child_private.key().public_key(KeyCompression::Compressed).unwrap()
    );
    assert_eq!(child_via_public.chaincode(), child_private.chaincode());
    assert_eq!(
        child_via_public.serialized_string().unwrap(),
        child_private.serialized_pub().unwrap()
    );
}

#[test]
fn test_hardened_from_public_fails() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    let public = generator.master().public_only().unwrap();
    assert!(public.derive_child(0, true).is_err());
    // And a public-only node has no private serialization
    assert!(public.serialized_prv().is_err());
}

#[test]
fn test_sequence_with_hardened_bit_rejected() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    assert!(generator.master().derive_child(0x8000_0000, false).is_err());
}

#[test]
fn test_serialization_roundtrip() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();
    let node = generator.master().derive_child(3, true).unwrap();

    let string = node.serialized_string().unwrap();
    let parsed = ExtendedKey::from_serialized_str(&string).unwrap();
    assert_eq!(&parsed, &node);
    assert_eq!(parsed.serialized_string().unwrap(), string);

    let data = node.serialized_data().unwrap();
    assert_eq!(data.len(), EXTENDED_KEY_SIZE);
    let parsed = ExtendedKey::from_serialized_data(&data).unwrap();
    assert_eq!(parsed.serialized_data().unwrap(), data);

    // Public projection round-trips as well
    let public = node.public_only().unwrap();
    let string = public.serialized_string().unwrap();
    let parsed = ExtendedKey::from_serialized_str(&string).unwrap();
    assert_eq!(&parsed, &public);
}

#[test]
fn test_slip0132_prefixes() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let expectations = [
        (ExtendedKeyVersion::P2pkhP2sh, "xprv", "xpub"),
        (ExtendedKeyVersion::P2wpkhNestedP2sh, "yprv", "ypub"),
        (ExtendedKeyVersion::P2wpkh, "zprv", "zpub"),
        (ExtendedKeyVersion::DogeP2pkhP2sh, "dgpv", "dgub"),
    ];
    for (version, prv_prefix, pub_prefix) in expectations {
        let generator = KeyGenerator::new(&seed, version).unwrap();
        let prv = generator.ext_prv().unwrap();
        let pb = generator.ext_pub().unwrap();
        assert!(
            prv.starts_with(prv_prefix),
            "{:?} private should start with {}, got {}",
            version,
            prv_prefix,
            prv
        );
        assert!(
            pb.starts_with(pub_prefix),
            "{:?} public should start with {}, got {}",
            version,
            pub_prefix,
            pb
        );

        // Round trip preserves the scheme
        let parsed = ExtendedKey::from_serialized_str(&prv).unwrap();
        assert_eq!(parsed.version(), version);
        assert_eq!(parsed.key().key_type(), KeyType::Private);
        let parsed = ExtendedKey::from_serialized_str(&pb).unwrap();
        assert_eq!(parsed.version(), version);
        assert_eq!(parsed.key().key_type(), KeyType::Public);
    }
}

#[test]
fn test_version_byte_table() {
    for version in [
        ExtendedKeyVersion::P2pkhP2sh,
        ExtendedKeyVersion::P2wpkhNestedP2sh,
        ExtendedKeyVersion::P2wpkh,
        ExtendedKeyVersion::DogeP2pkhP2sh,
    ] {
        for key_type in [KeyType::Public, KeyType::Private] {
            let bytes = version.version_bytes(key_type);
            assert_eq!(
                ExtendedKeyVersion::from_version_bytes(bytes).unwrap(),
                (version, key_type)
            );
        }
    }
    assert_eq!(
        ExtendedKeyVersion::P2pkhP2sh.version_bytes(KeyType::Public),
        [0x04, 0x88, 0xB2, 0x1E]
    );
    assert_eq!(
        ExtendedKeyVersion::P2pkhP2sh.version_bytes(KeyType::Private),
        [0x04, 0x88, 0xAD, 0xE4]
    );
    assert!(ExtendedKeyVersion::from_version_bytes([0xDE, 0xAD, 0xBE, 0xEF]).is_err());
}

#[test]
fn test_deserialization_rejects_malformed_records() {
    // Zero depth with a non-zero parent fingerprint
    assert!(ExtendedKey::from_serialized_str(
        "xpub661no6RGEX3uJkY4bNnPcw4URcQTrSibUZ4NqJEw5eBkv7ovTwgiT91XX27VbEXGENhYRCf7hyEbWrR3FewATdCEebj6znwMfQkhRYHRLpJ"
    )
    .is_err());

    // Zero depth with a non-zero index
    assert!(ExtendedKey::from_serialized_str(
        "xprv9s21ZrQH4r4TsiLvyLXqM9P7k1K3EYhA1kkD6xuquB5i39AU8KF42acDyL3qsDbU9NmZn6MsGSUYZEsuoePmjzsB3eFKSUEh3Gu1N3cqVUN"
    )
    .is_err());

    // Private key of zero
    assert!(ExtendedKey::from_serialized_str(
        "xprv9s21ZrQH143K24Mfq5zL5MhWK9hUhhGbd45hLXo2Pq2oqzMMo63oStZzF93Y5wvzdUayhgkkFoicQZcP3y52uPPxFnfoLZB21Teqt1VvEHx"
    )
    .is_err());

    // Invalid checksum
    assert!(ExtendedKey::from_serialized_str(
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHL"
    )
    .is_err());

    // Unknown version prefix
    assert!(ExtendedKey::from_serialized_str(
        "DMwo58pR1QLEFihHiXPVykYB6fJmsTeHvyTp7hRThAtCX8CvYzgPcn8XnmdfHGMQzT7ayAmfo4z3gY5KfbrZWZ6St24UVf2Qgo6oujFktLHdHY4"
    )
    .is_err());

    // Public key field with an uncompressed tag
    assert!(ExtendedKey::from_serialized_str(
        "xpub661MyMwAqRbcEYS8w7XLSVeEsBXy79zSzH1J8vCdxAZningWLdN3zgtU6Txnt3siSujt9RCVYsx4qHZGc62TG4McvMGcAUjeuwZdduYEvFn"
    )
    .is_err());

    // Wrong raw length
    assert!(ExtendedKey::from_serialized_data(&[0u8; 77]).is_err());
}

#[test]
fn test_depth_exhaustion() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();

    // Fabricate a depth-255 record and try to derive past it
    let mut data = generator.master().serialized_data().unwrap();
    data[4] = 0xFF; // depth
    data[5] = 0x01; // non-zero parent so the zero-depth check stays quiet
    let node = ExtendedKey::from_serialized_data(&data).unwrap();
    assert!(node.derive_child(0, false).is_err());
}

#[test]
fn test_key_generator_paths() {
    let seed = hex::decode(VECTOR1_SEED).unwrap();
    let mut generator = KeyGenerator::new(&seed, ExtendedKeyVersion::P2pkhP2sh).unwrap();

    generator.derive_path("m/0'/1").unwrap();
    assert_eq!(
        generator.ext_prv().unwrap(),
        "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs"
    );

    // Reset returns to the master node
    generator.reset();
    assert_eq!(generator.generated(), generator.master());

    // A leading m/ is optional
    generator.derive_path("0'").unwrap();
    assert_eq!(
        generator.ext_prv().unwrap(),
        "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
    );

    // child() derives without advancing
    let child = generator.child(1, false).unwrap();
    assert_eq!(child.depth(), 2);
    assert_eq!(generator.generated().depth(), 1);

    // Malformed paths
    assert!(generator.derive_path("").is_err());
    assert!(generator.derive_path("m/").is_err());
    assert!(generator.derive_path("m/abc").is_err());
    assert!(generator.derive_path("m//1").is_err());
}

#[test]
fn test_key_generator_from_xpub() {
    // Resume from vector 2's master xpub and derive the known m/0 child
    let mut generator = KeyGenerator::from_serialized_str(
        "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
    )
    .unwrap();
    assert!(generator.ext_prv().is_err());

    generator.derive(0, false).unwrap();
    assert_eq!(
        generator.ext_pub().unwrap(),
        "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH"
    );
}

#[test]
fn test_key_generator_seed_bounds() {
    assert!(KeyGenerator::new(&[0u8; 15], ExtendedKeyVersion::P2pkhP2sh).is_err());
    assert!(KeyGenerator::new(&[0u8; 65], ExtendedKeyVersion::P2pkhP2sh).is_err());
}

#[test]
fn test_key_validation() {
    let curve = crate::ec::Curve::secp256k1();

    // Private keys: 32 raw bytes or 33 with a leading zero
    let mut scalar = [0u8; 33];
    scalar[32] = 1;
    let from_33 = Key::from_private_bytes(&scalar).unwrap();
    let from_32 = Key::from_private_bytes(&scalar[1..]).unwrap();
    assert_eq!(from_33, from_32);
    assert_eq!(from_32.key_type(), KeyType::Private);

    // Range violations
    assert!(Key::from_private_bytes(&[0u8; 32]).is_err());
    let order = curve.order().to_bytes_be_padded(32);
    assert!(Key::from_private_bytes(&order).is_err());
    assert!(Key::from_private_bytes(&[1u8; 31]).is_err());

    // Public keys must decode to a curve point
    let public = from_32.public_key(KeyCompression::Compressed).unwrap();
    let key = Key::from_public_bytes(&public).unwrap();
    assert_eq!(key.key_type(), KeyType::Public);
    let mut overflow = vec![0x02];
    overflow.extend_from_slice(&curve.field_prime().to_bytes_be_padded(32));
    assert!(Key::from_public_bytes(&overflow).is_err());
    assert!(Key::from_public_bytes(&[0x00]).is_err());

    // d = 1 derives the generator point in both encodings
    assert_eq!(
        hex::encode(from_32.public_key(KeyCompression::Compressed).unwrap()),
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
    );
    let uncompressed = from_32.public_key(KeyCompression::Uncompressed).unwrap();
    assert_eq!(uncompressed.len(), POINT_UNCOMPRESSED_SIZE);
    // Re-encoding a stored public key converts between forms
    assert_eq!(
        key.public_key(KeyCompression::Uncompressed).unwrap(),
        uncompressed
    );
}

#[test]
fn test_key_generate() {
    let mut rng = OsRng;
    let key = Key::generate(&mut rng);
    assert_eq!(key.key_type(), KeyType::Private);
    assert!(key.public_key(KeyCompression::Compressed).is_ok());
}
