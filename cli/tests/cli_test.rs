use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn skperf() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("skperf")?;
    cmd.env_remove("SKPERF_TRACE");
    Ok(cmd)
}

fn listed_names(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.split('\t').next())
        .map(str::to_string)
        .collect()
}

#[test]
fn list_prints_registry_in_run_order() -> Result<(), Box<dyn Error>> {
    let output = skperf()?.arg("--list").output()?;
    assert!(output.status.success());
    assert_eq!(
        listed_names(&output.stdout),
        vec![
            "locally linear embedding",
            "random forest",
            "support vector machine",
            "xml parsing",
            "lzma",
            "sha512",
            "boyer-moore/horspool",
        ]
    );

    skperf()?
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("random forest\tmulticore=true\tfixtures=shuttle_data"))
        .stdout(predicate::str::contains("lzma\tmulticore=false\tfixtures=test_data"));
    Ok(())
}

#[test]
fn list_honours_only_filter() -> Result<(), Box<dyn Error>> {
    let output = skperf()?
        .args(["--list", "--only", "sha512", "--only", "lzma"])
        .output()?;
    assert!(output.status.success());
    assert_eq!(listed_names(&output.stdout), vec!["lzma", "sha512"]);
    Ok(())
}

#[test]
fn unknown_workload_is_an_error() -> Result<(), Box<dyn Error>> {
    skperf()?
        .args(["--only", "quantum annealing"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("quantum annealing"));
    Ok(())
}

#[test]
fn zero_cores_is_rejected() -> Result<(), Box<dyn Error>> {
    skperf()?
        .args(["--cores", "0", "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
    Ok(())
}

#[test]
fn bad_references_file_fails_before_running() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("refs.toml");
    fs::write(&path, "scale = -3.0\n")?;

    skperf()?
        .arg("--references")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("scale"));
    Ok(())
}
