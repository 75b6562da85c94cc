use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const PAYMENT_ID: &str = "6f1c2a8e-3c1b-4d8f-9f6a-2b7f1f0c9d11";

fn netaxept() -> Command {
    let mut cmd = Command::new(cargo_bin!("netaxept"));
    cmd.env_remove("RUST_LOG")
        .env_remove("NETAXEPT_MERCHANTID")
        .env_remove("NETAXEPT_TERMINAL");
    cmd
}

#[test]
fn test_terminal_url() {
    netaxept()
        .args([
            "--merchant-id",
            "12345",
            "terminal-url",
            "b127f98b77f741fca6bb49981ee6e846",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://epayment-test.bbs.no/Terminal/default.aspx?merchantId=12345&transactionId=b127f98b77f741fca6bb49981ee6e846",
        ));
}

#[test]
fn test_terminal_url_from_environment() {
    netaxept()
        .env("NETAXEPT_MERCHANTID", "777")
        .env("NETAXEPT_TERMINAL", "https://terminal.example/pay")
        .args(["terminal-url", "TX1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://terminal.example/pay?merchantId=777&transactionId=TX1",
        ));
}

#[test]
fn test_stored_payment_commands_require_persistent_store() {
    for args in [
        vec!["sale", PAYMENT_ID],
        vec!["show", PAYMENT_ID],
        vec!["operations", PAYMENT_ID],
        vec!["list", "--failed"],
        vec!["find", "TX1"],
    ] {
        netaxept()
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No persistent store"));
    }
}

#[test]
fn test_register_rejects_zero_amount_locally() {
    netaxept()
        .args(["register", "ORD1", "0", "--redirect-url", "https://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be positive"));
}

#[test]
fn test_register_rejects_bad_currency_locally() {
    netaxept()
        .args([
            "register",
            "ORD1",
            "100",
            "--currency-code",
            "KRONER",
            "--redirect-url",
            "https://x",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("currency_code"));
}

#[test]
fn test_capture_rejects_invalid_payment_id() {
    netaxept()
        .args(["capture", "not-a-uuid", "50"])
        .assert()
        .failure();
}

#[test]
fn test_list_rejects_conflicting_filters() {
    netaxept()
        .args(["list", "--failed", "--succeeded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[cfg(feature = "storage-rocksdb")]
mod persistent {
    use super::*;

    fn netaxept_with_db(dir: &tempfile::TempDir) -> Command {
        let mut cmd = netaxept();
        cmd.arg("--db-path").arg(dir.path().join("db"));
        cmd
    }

    #[test]
    fn test_operations_of_unknown_payment_is_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        netaxept_with_db(&dir)
            .args(["operations", PAYMENT_ID])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "id,payment_id,transaction_id,operation,amount,success",
            ));
    }

    #[test]
    fn test_sale_of_unknown_payment_fails() {
        let dir = tempfile::tempdir().unwrap();
        netaxept_with_db(&dir)
            .args(["sale", PAYMENT_ID])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn test_list_of_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        netaxept_with_db(&dir)
            .args(["list", "--succeeded", "--currency-code", "NOK"])
            .assert()
            .success()
            .stdout(predicate::str::diff("[]\n"));
    }

    #[test]
    fn test_find_unknown_transaction_fails() {
        let dir = tempfile::tempdir().unwrap();
        netaxept_with_db(&dir)
            .args(["find", "TX1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Transaction TX1 not found"));
    }
}
