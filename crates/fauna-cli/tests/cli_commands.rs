//! Integration tests for the `fauna` CLI binary: the `check`, `species`,
//! and `run` subcommands are exercised end-to-end against temporary
//! catalog files.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A small, warning-free catalog: one roaming species with a tile spawn
/// rule, one without any rule.
const MEADOW: &str = r"[fox]
id = 1
display_name = Fox
category = wildlife
traits = skitter
flags = mobile, animal
max_hp = 8
max_speed = 2.4
spawn.tile = grass
spawn.density = 0.02
spawn.group = 1-2

[hen]
id = 2
display_name = Hen
category = livestock
traits = skitter
flags = mobile, animal
";

fn defs_file(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("species.ini");
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn fauna() -> Command {
    Command::cargo_bin("fauna").unwrap()
}

// ---------------------------------------------------------------------------
// species
// ---------------------------------------------------------------------------

#[test]
fn species_lists_the_builtin_catalog() {
    fauna()
        .arg("species")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Villager")
                .and(predicate::str::contains("Deer"))
                .and(predicate::str::contains("species")),
        );
}

#[test]
fn species_reads_a_definitions_file() {
    let (_dir, path) = defs_file(MEADOW);
    fauna()
        .args(["species", "--defs", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Fox")
                .and(predicate::str::contains("Hen"))
                .and(predicate::str::contains("2 species")),
        );
}

#[test]
fn species_flags_fallback_for_unusable_definitions() {
    fauna()
        .args(["species", "--defs", "/definitely/not/here.ini"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Villager"))
        .stderr(predicate::str::contains("built-in catalog"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_simulates_the_demo_world() {
    fauna()
        .args(["run", "--ticks", "80", "--seed", "7"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Fauna demo world")
                .and(predicate::str::contains("Population"))
                .and(predicate::str::contains("Villager")),
        );
}

#[test]
fn run_is_deterministic() {
    let args = ["run", "--ticks", "120", "--seed", "11", "--quiet"];
    let first = fauna().args(args).assert().success().get_output().stdout.clone();
    let second = fauna().args(args).assert().success().get_output().stdout.clone();
    assert_eq!(first, second);
}

#[test]
fn run_accepts_custom_definitions() {
    let (_dir, path) = defs_file(MEADOW);
    fauna()
        .args([
            "run",
            "--defs",
            path.to_str().unwrap(),
            "--ticks",
            "60",
            "--seed",
            "3",
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fox"));
}

#[test]
fn run_falls_back_when_definitions_are_missing() {
    fauna()
        .args(["run", "--defs", "/nope/missing.ini", "--ticks", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("built-in catalog"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_a_valid_file() {
    let (_dir, path) = defs_file(MEADOW);
    fauna()
        .args(["check", "--defs", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed")
                .and(predicate::str::contains("2 species")),
        );
}

#[test]
fn check_reports_warnings_without_failing() {
    let broken = format!("{MEADOW}\n[ghost]\nmax_hp = soup\n");
    let (_dir, path) = defs_file(&broken);
    fauna()
        .args(["check", "--defs", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("warning:")
                .and(predicate::str::contains("no valid id")),
        );
}

#[test]
fn check_fails_on_a_missing_file() {
    fauna()
        .args(["check", "--defs", "/definitely/not/here.ini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
