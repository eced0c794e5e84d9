//! Process-level checks of the command-line surface and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

fn zipcrack() -> Command {
    Command::cargo_bin("zipcrack").unwrap()
}

fn encrypted_archive(dir: &TempDir, password: &str) -> PathBuf {
    let path = dir.path().join("secret.zip");
    let file = File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .with_deprecated_encryption(password.as_bytes());
    writer.start_file("flag.txt", options).unwrap();
    writer.write_all(b"you found me").unwrap();
    writer.finish().unwrap();

    path
}

#[test]
fn no_arguments_prints_help_and_exits_zero() {
    zipcrack()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn options_flag_prints_examples_and_exits_zero() {
    zipcrack()
        .arg("--options")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes"))
        .stdout(predicate::str::contains("Examples"));
}

#[test]
fn missing_archive_file_is_a_fatal_error() {
    zipcrack()
        .args(["-e", "definitely-not-here.zip", "-l", "-n"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Archive not found"));
}

#[test]
fn no_attack_configured_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let archive = encrypted_archive(&dir, "pw");

    zipcrack()
        .args(["-e", archive.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no attack configured"));
}

#[test]
fn zero_length_is_rejected_by_the_parser() {
    zipcrack()
        .args(["-e", "a.zip", "-l", "-L", "0"])
        .assert()
        .failure()
        .code(2); // clap usage error
}

#[test]
fn wordlist_attack_finds_password() {
    let dir = TempDir::new().unwrap();
    let archive = encrypted_archive(&dir, "ab12");
    let dest = dir.path().join("out");
    let wordlist = dir.path().join("words.txt");
    std::fs::write(&wordlist, "wrong1\nwrong2\nab12\n").unwrap();

    zipcrack()
        .args([
            "-e",
            archive.to_str().unwrap(),
            "-d",
            dest.to_str().unwrap(),
            "-W",
            wordlist.to_str().unwrap(),
            "--output-format",
            "plain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("RESULT: found"))
        .stdout(predicate::str::contains("PASSWORD: ab12"))
        .stdout(predicate::str::contains("ATTEMPTS: 3"));
}

#[test]
fn exhausted_search_exits_with_code_two() {
    let dir = TempDir::new().unwrap();
    let archive = encrypted_archive(&dir, "ab12");
    let dest = dir.path().join("out");
    let wordlist = dir.path().join("words.txt");
    std::fs::write(&wordlist, "alpha\nbeta\n").unwrap();

    zipcrack()
        .args([
            "-e",
            archive.to_str().unwrap(),
            "-d",
            dest.to_str().unwrap(),
            "-W",
            wordlist.to_str().unwrap(),
            "--output-format",
            "plain",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("RESULT: exhausted"));
}

#[test]
fn json_output_reports_the_result() {
    let dir = TempDir::new().unwrap();
    let archive = encrypted_archive(&dir, "pw");
    let dest = dir.path().join("out");
    let wordlist = dir.path().join("words.txt");
    std::fs::write(&wordlist, "pw\n").unwrap();

    let output = zipcrack()
        .args([
            "-e",
            archive.to_str().unwrap(),
            "-d",
            dest.to_str().unwrap(),
            "-W",
            wordlist.to_str().unwrap(),
            "--output-format",
            "json",
            "--quiet",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let json: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(json["status"], "found");
    assert_eq!(json["password"], "pw");
    assert_eq!(json["attempts"], 1);
}
