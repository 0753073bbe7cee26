//! CLI workflow tests.
//!
//! Drive the `passgo` binary through generate, init, insert, show and ls
//! against an isolated keyring and store.

mod support;

use predicates::prelude::*;
use support::*;

/// Keyring with a plain key for `alice` and a store initialized for her.
fn setup() -> Test {
    let t = Test::new();
    assert_success(&t.run(&["keys", "generate", "--no-passphrase", "alice"]));
    assert_success(&t.run(&["init", "alice"]));
    t
}

#[test]
fn test_generate_writes_keyring() {
    let t = Test::new();

    t.cmd()
        .args(["keys", "generate", "--no-passphrase", "alice", "alice@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generated key for alice"))
        .stdout(predicate::str::contains("age1"));

    let contents = std::fs::read_to_string(t.keyring_path()).unwrap();
    assert!(contents.contains("[[entity]]"));
    assert!(contents.contains("alice@example.com"));
    assert!(contents.contains("AGE-SECRET-KEY-"));
}

#[test]
fn test_generate_with_passphrase_from_env() {
    let t = Test::new();

    t.cmd()
        .args(["keys", "generate", "alice"])
        .env("PASSGO_PASSPHRASE", PASSPHRASE)
        .assert()
        .success();

    let contents = std::fs::read_to_string(t.keyring_path()).unwrap();
    assert!(contents.contains("locked"));
    assert!(!contents.contains("AGE-SECRET-KEY-"));
}

#[test]
fn test_init_writes_recipient_file() {
    let t = Test::new();

    t.cmd()
        .args(["init", "alice", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 recipient(s)"));

    let contents = std::fs::read_to_string(t.root().join(".gpg-id")).unwrap();
    assert_eq!(contents, "alice\nbob\n");
}

#[test]
fn test_init_warns_about_unknown_identity() {
    let t = setup();

    t.cmd()
        .args(["init", "alice", "mallory"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no key in the keyring for mallory"));
}

#[test]
fn test_insert_and_show() {
    let t = setup();

    t.cmd()
        .args(["insert", "github"])
        .write_stdin("hunter2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("github.gpg"));

    assert!(t.root().join("github.gpg").is_file());

    t.cmd()
        .args(["show", "github"])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn test_insert_refuses_overwrite_without_force() {
    let t = setup();
    t.cmd().args(["insert", "site"]).write_stdin("one").assert().success();

    t.cmd()
        .args(["insert", "site"])
        .write_stdin("two")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    t.cmd()
        .args(["insert", "--force", "site"])
        .write_stdin("two")
        .assert()
        .success();

    t.cmd().args(["show", "site"]).assert().success().stdout("two");
}

#[test]
fn test_ls_json() {
    let t = setup();
    std::fs::create_dir(t.root().join("web")).unwrap();
    t.cmd().args(["insert", "b"]).write_stdin("2").assert().success();
    t.cmd().args(["insert", "a"]).write_stdin("1").assert().success();

    let output = t.run(&["ls", "--json"]);
    assert_success(&output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["entries"], serde_json::json!(["a.gpg", "b.gpg"]));
    assert_eq!(json["folders"], serde_json::json!(["web"]));
}

#[test]
fn test_ls_empty_store() {
    let t = setup();

    t.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("store is empty"));
}

#[test]
fn test_show_missing_entry() {
    let t = setup();

    t.cmd()
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry not found: nope.gpg"));
}

#[test]
fn test_missing_recipient_file() {
    let t = Test::new();
    assert_success(&t.run(&["keys", "generate", "--no-passphrase", "alice"]));

    t.cmd()
        .args(["show", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".gpg-id"))
        .stderr(predicate::str::contains("passgo init"));
}

#[test]
fn test_missing_keyring() {
    let t = Test::with_recipients(&["alice"]);

    t.cmd()
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("keys generate"));
}

#[test]
fn test_insert_without_recipient_key() {
    let t = Test::new();
    assert_success(&t.run(&["keys", "generate", "--no-passphrase", "alice"]));
    assert_success(&t.run(&["init", "bob"]));

    t.cmd()
        .args(["insert", "x"])
        .write_stdin("v")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recipient"));

    assert!(!t.root().join("x.gpg").exists());
}

#[test]
fn test_locked_key_with_env_passphrase() {
    let t = Test::new();
    t.cmd()
        .args(["keys", "generate", "alice"])
        .env("PASSGO_PASSPHRASE", PASSPHRASE)
        .assert()
        .success();
    assert_success(&t.run(&["init", "alice"]));

    // writing needs only the public key
    t.cmd().args(["insert", "bank"]).write_stdin("1234").assert().success();

    t.cmd()
        .args(["show", "bank"])
        .env("PASSGO_PASSPHRASE", PASSPHRASE)
        .assert()
        .success()
        .stdout("1234");

    t.cmd()
        .args(["show", "bank"])
        .env("PASSGO_PASSPHRASE", "wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect passphrase"));
}

#[test]
fn test_subkey_takes_over_encryption() {
    let t = setup();
    assert_success(&t.run(&["keys", "subkey", "--no-passphrase", "alice"]));

    t.cmd().args(["insert", "k"]).write_stdin("v").assert().success();
    t.cmd().args(["show", "k"]).assert().success().stdout("v");

    let output = t.run(&["keys", "list", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["entities"][0]["keys"].as_array().unwrap().len(), 2);
    assert_eq!(json["entities"][0]["keys"][0]["secret"], "plain");
}

#[test]
fn test_subkey_unknown_identity_fails_before_prompt() {
    let t = setup();

    t.cmd()
        .args(["keys", "subkey", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no key in the keyring for bob"))
        .stderr(predicate::str::contains("passphrase").not());
}

#[test]
fn test_rejects_escaping_entry_name() {
    let t = setup();

    t.cmd()
        .args(["insert", "../outside"])
        .write_stdin("v")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entry name"));
}

#[test]
fn test_store_flag_overrides_env() {
    let t = setup();
    let other = t.dir.path().join("other");

    t.cmd()
        .args(["--store", other.to_str().unwrap(), "init", "alice"])
        .assert()
        .success();

    assert!(other.join(".gpg-id").is_file());
}

#[test]
fn test_completions() {
    Test::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passgo"));
}
