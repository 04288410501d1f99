mod common;

use ::common::crypto::{
    decrypt, encrypt, Envelope, EnvelopeError, PaddingError, PublicKey, SecretKey, BLOCK_SIZE,
    IV_SIZE,
};

#[test]
fn test_roundtrip_lengths() {
    let (_store, secret_key, public_key, _temp) = common::setup_identity();

    for len in [0usize, 1, 11, 15, 16, 17, 32, 255, 4096, 65_537] {
        let plaintext = common::sample_bytes(len);
        let (blob, ephemeral_pem) = encrypt(&plaintext, &public_key).unwrap();

        let expected_blocks = len / BLOCK_SIZE + 1;
        assert_eq!(blob.len(), IV_SIZE + expected_blocks * BLOCK_SIZE);

        let decrypted = decrypt(&blob, &ephemeral_pem, &secret_key).unwrap();
        assert_eq!(decrypted, plaintext, "length {}", len);
    }
}

#[test]
fn test_hello_world_scenario() {
    let (_store, secret_key, public_key, _temp) = common::setup_identity();

    let (blob, ephemeral_pem) = encrypt(b"hello world", &public_key).unwrap();
    // a single padded block behind the IV
    assert_eq!(blob.len(), IV_SIZE + BLOCK_SIZE);
    assert_eq!(decrypt(&blob, &ephemeral_pem, &secret_key).unwrap(), b"hello world");
}

#[test]
fn test_ephemeral_key_is_a_plain_public_key() {
    let (_store, _secret_key, public_key, _temp) = common::setup_identity();
    let (_, ephemeral_pem) = encrypt(b"x", &public_key).unwrap();

    let ephemeral = PublicKey::from_pem(&ephemeral_pem).unwrap();
    assert_ne!(ephemeral, public_key);
    assert_eq!(ephemeral.to_pem().unwrap(), ephemeral_pem);
}

#[test]
fn test_two_encryptions_differ() {
    let (_store, _secret_key, public_key, _temp) = common::setup_identity();

    let (blob_a, key_a) = encrypt(b"same input", &public_key).unwrap();
    let (blob_b, key_b) = encrypt(b"same input", &public_key).unwrap();

    assert_ne!(blob_a[..IV_SIZE], blob_b[..IV_SIZE]);
    assert_ne!(key_a, key_b);
    assert_ne!(blob_a, blob_b);
}

#[test]
fn test_wrong_private_key_rarely_decrypts() {
    let (_store, _secret_key, public_key, _temp) = common::setup_identity();
    let plaintext = common::sample_bytes(100);

    let mut rejected = 0;
    for _ in 0..32 {
        let (blob, ephemeral_pem) = encrypt(&plaintext, &public_key).unwrap();
        let stranger = SecretKey::generate();
        match decrypt(&blob, &ephemeral_pem, &stranger) {
            Err(EnvelopeError::Padding(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
            Ok(output) => assert_ne!(output, plaintext),
        }
    }
    assert!(rejected >= 28, "only {} of 32 rejected", rejected);
}

#[test]
fn test_mismatched_ephemeral_key_rarely_decrypts() {
    let (_store, secret_key, public_key, _temp) = common::setup_identity();

    let mut rejected = 0;
    for _ in 0..32 {
        let (blob, _) = encrypt(b"first message", &public_key).unwrap();
        let (_, other_pem) = encrypt(b"second message", &public_key).unwrap();
        if let Err(EnvelopeError::Padding(_)) = decrypt(&blob, &other_pem, &secret_key) {
            rejected += 1;
        }
    }
    assert!(rejected >= 28, "only {} of 32 rejected", rejected);
}

#[test]
fn test_truncated_blob_is_a_padding_error() {
    let (_store, secret_key, public_key, _temp) = common::setup_identity();
    let (blob, ephemeral_pem) = encrypt(&common::sample_bytes(40), &public_key).unwrap();

    let result = decrypt(&blob[..blob.len() - 1], &ephemeral_pem, &secret_key);
    assert!(matches!(
        result,
        Err(EnvelopeError::Padding(PaddingError::Misaligned(_)))
    ));

    let result = decrypt(&blob[..IV_SIZE], &ephemeral_pem, &secret_key);
    assert!(matches!(
        result,
        Err(EnvelopeError::Padding(PaddingError::Misaligned(0)))
    ));
}

#[test]
fn test_envelope_parts_roundtrip() {
    let (_store, secret_key, public_key, _temp) = common::setup_identity();
    let envelope = Envelope::seal(b"parts", &public_key).unwrap();

    let rebuilt = Envelope::from_parts(
        envelope.ciphertext().bytes().to_vec(),
        *envelope.ephemeral_public(),
    );
    assert_eq!(rebuilt, envelope);
    assert_eq!(rebuilt.open(&secret_key).unwrap(), b"parts");
}
