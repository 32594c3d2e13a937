use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn blendget() -> Command {
    Command::cargo_bin("blendget").unwrap()
}

#[test]
fn help_describes_the_version_tokens() {
    blendget()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stable"))
        .stdout(predicate::str::contains("nightly"));
}

#[test]
fn a_version_token_is_required() {
    blendget()
        .assert()
        .failure()
        .stderr(predicate::str::contains("version token"));
}

#[test]
fn remove_compressed_requires_extract() {
    blendget()
        .args(["2.93.4", "--remove-compressed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--extract"));
}

#[test]
fn print_executable_requires_extract() {
    blendget()
        .args(["2.93.4", "--print-executable"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--extract"));
}

#[test]
fn bits_must_be_32_or_64() {
    blendget()
        .args(["2.93.4", "--bits", "16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("32 or 64"));
}

#[test]
fn unknown_operating_systems_are_rejected() {
    blendget()
        .args(["2.93.4", "--os", "beos"])
        .assert()
        .failure();
}

#[test]
fn clear_cache_reports_the_removed_count() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::write(cache.join("stale.zip"), b"stale").unwrap();

    blendget()
        .args(["--clear-cache", "-d"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cached files"));

    // the emptied cache directory is recreated
    assert!(cache.exists());
    assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
}
