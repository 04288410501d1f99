//! Shared test utilities for the encryption integration tests
#![allow(dead_code)]

use std::path::PathBuf;

use ::common::crypto::{PublicKey, SecretKey};
use ::common::identity::KeyStore;
use tempfile::TempDir;

/// Route library logs to the test harness; set RUST_LOG to see them
pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Provision an identity in a fresh temporary key directory
pub fn setup_identity() -> (KeyStore, SecretKey, PublicKey, TempDir) {
    setup_logging();
    let temp_dir = TempDir::new().unwrap();
    let store = KeyStore::new(temp_dir.path().join("keys"));
    store.ensure_identity_keys().unwrap();

    let secret_key = store.load_secret_key().unwrap();
    let public_key = store.load_public_key().unwrap();
    (store, secret_key, public_key, temp_dir)
}

/// Write `contents` to `name` inside `dir` and return its path
pub fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Deterministic pseudo-random bytes
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
