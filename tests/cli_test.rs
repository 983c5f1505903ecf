//! Exit-code tests for the `bird-site` binary.

mod common;

use assert_cmd::Command;
use common::{post, ExportBuilder};
use tempfile::TempDir;

fn bird_site(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bird-site").unwrap();
    cmd.current_dir(dir.path())
        .env("OUTPUT_DIR", dir.path().join("output"))
        .env("CREDENTIALS_PATH", dir.path().join("credential.json"))
        .env("CSS_DIR", dir.path().join("css"))
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_missing_arguments_exit_1() {
    let dir = TempDir::new().unwrap();
    bird_site(&dir).assert().code(1);
    bird_site(&dir).arg("archive.zip").assert().code(1);
}

#[test]
fn test_help_exits_0() {
    let dir = TempDir::new().unwrap();
    bird_site(&dir).arg("--help").assert().code(0);
}

#[test]
fn test_non_numeric_user_id_exit_2() {
    let dir = TempDir::new().unwrap();
    bird_site(&dir)
        .args(["archive.zip", "abc", "https://example.com"])
        .assert()
        .code(2);
    bird_site(&dir)
        .args(["archive.zip", "-x", "https://example.com"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_archive_exit_3() {
    let dir = TempDir::new().unwrap();
    bird_site(&dir)
        .args(["does-not-exist.zip", "7", "https://example.com"])
        .assert()
        .code(3);
}

#[test]
fn test_corrupt_archive_exit_4() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("archive.zip"), "this is not a zip file".repeat(8)).unwrap();
    bird_site(&dir)
        .args(["archive.zip", "7", "https://example.com"])
        .assert()
        .code(4);
}

#[test]
fn test_truncated_archive_exit_4() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archive.zip");
    ExportBuilder::new()
        .month(2021, 5, &[post("100", 7, "hello", &[])])
        .write(&path);
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

    bird_site(&dir)
        .args(["archive.zip", "7", "https://example.com"])
        .assert()
        .code(4);
}

#[test]
fn test_missing_media_list_exit_3() {
    let dir = TempDir::new().unwrap();
    ExportBuilder::new()
        .month(2021, 5, &[post("100", 7, "hello", &[])])
        .write(&dir.path().join("archive.zip"));
    bird_site(&dir)
        .args(["archive.zip", "7", "https://example.com", "nope.txt"])
        .assert()
        .code(3);
}

#[test]
fn test_successful_run_writes_site() {
    let dir = TempDir::new().unwrap();
    ExportBuilder::new()
        .month(2021, 5, &[post("100", 7, "hello", &[])])
        .write(&dir.path().join("archive.zip"));
    std::fs::write(dir.path().join("media_list.txt"), "").unwrap();

    bird_site(&dir)
        .args(["archive.zip", "7", "https://example.com"])
        .assert()
        .success();

    let out = dir.path().join("output");
    assert!(out.join("i/status/100/index.html").exists());
    assert!(out.join("i/list/2021/05/index.html").exists());
    assert!(out.join("i/list/2021/index.html").exists());
    let index = std::fs::read_to_string(out.join("i/index.html")).unwrap();
    assert!(index.contains(r#"href="https://example.com/i/""#));
}
