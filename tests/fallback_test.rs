use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const PAYMENT_ID: &str = "6f1c2a8e-3c1b-4d8f-9f6a-2b7f1f0c9d11";

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut cmd = Command::new(cargo_bin!("netaxept"));
    cmd.env_remove("RUST_LOG")
        .arg("--db-path")
        .arg("some_db")
        .arg("operations")
        .arg(PAYMENT_ID);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.",
        ))
        .stderr(predicate::str::contains("No persistent store"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("netaxept"));
    cmd.env_remove("RUST_LOG")
        .arg("--db-path")
        .arg(&db_path)
        .arg("operations")
        .arg(PAYMENT_ID);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
