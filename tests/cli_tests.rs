#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli(config: &Path, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.arg("--config")
        .arg(config)
        .env("RUST_LOG", "off")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_rejects_inverted_period_time() {
    let dir = tempdir().unwrap();
    run_cli(&dir.path().join("c.json"), "time 2 10:00 09:00\nquit\n")
        .success()
        .stdout(str_contains("Error: period start 10:00 must be before end 09:00"));
}

#[test]
fn cli_rejects_too_many_or_out_of_range_periods() {
    let dir = tempdir().unwrap();
    run_cli(&dir.path().join("c.json"), "periods 1,2,9\nquit\n")
        .success()
        .stdout(str_contains("Error: period 9 is out of range"));
}

#[test]
fn cli_shows_example_lesson() {
    let dir = tempdir().unwrap();
    run_cli(&dir.path().join("c.json"), "example\nshow pocket\nquit\n")
        .success()
        .stdout(str_contains("Example data loaded."))
        .stdout(str_contains("10:15-11:15 2Esa MB PT A15"));
}

#[test]
fn cli_save_and_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule_config.json");
    let script = "teacher Anna Verdi\ncell MON 3 2E MB PT A15\nsave\nteacher Someone Else\nreload\nhome\nquit\n";
    let assert = run_cli(&path, script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Configuration saved."));
    assert!(output.contains("Configuration reloaded."));
    let after_reload = output
        .split("Configuration reloaded.")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("Anna Verdi"),
        "reloaded teacher should be the saved one:\n{after_reload}"
    );
    assert!(path.is_file());

    run_cli(&path, "show compact\nquit\n")
        .success()
        .stdout(str_contains("**10:15-11:15** 2E 📍MB PT A15"));
}

#[test]
fn cli_reload_without_file_reports_missing_configuration() {
    let dir = tempdir().unwrap();
    run_cli(&dir.path().join("missing.json"), "reload\nstatus\nquit\n")
        .success()
        .stdout(str_contains("Error: no configuration found"))
        .stdout(str_contains("No saved configuration"));
}

#[test]
fn cli_pdf_on_empty_timetable_fails_gracefully() {
    let dir = tempdir().unwrap();
    let script = format!("reset\npdf standard {}\nquit\n", dir.path().display());
    run_cli(&dir.path().join("c.json"), &script)
        .success()
        .stdout(str_contains("Error: nothing to render"));
}

#[test]
fn cli_pdf_writes_timestamped_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let script = format!("example\npdf a4 {}\nquit\n", out.display());
    run_cli(&dir.path().join("c.json"), &script)
        .success()
        .stdout(str_contains("PDF a4 written to"));

    let names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("schedule_a4_"));
    assert!(names[0].ends_with(".pdf"));
}

#[test]
fn cli_reports_unknown_commands_and_days() {
    let dir = tempdir().unwrap();
    run_cli(&dir.path().join("c.json"), "frobnicate\nrest FUNDAY\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."))
        .stdout(str_contains("Error: "));
}

#[test]
fn cli_malformed_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ broken").unwrap();
    run_cli(&path, "home\nquit\n")
        .success()
        .stdout(str_contains("Using defaults."))
        .stdout(str_contains("Maria Rossi"));
}

#[test]
#[allow(deprecated)]
fn cli_show_subcommand_prints_table() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("cli")
        .expect("cli binary")
        .arg("--config")
        .arg(dir.path().join("c.json"))
        .args(["show", "--density", "pocket"])
        .assert()
        .success()
        .stdout(str_contains("Format pocket"))
        .stdout(str_contains("| Day |"));
}

#[test]
fn cli_cell_accepts_quoted_fields_with_spaces() {
    let dir = tempdir().unwrap();
    let script = "cell MON 3 2E \"Main B\" \"\" \"Room 15\"\nshow pocket\ndump\nquit\n";
    run_cli(&dir.path().join("c.json"), script)
        .success()
        .stdout(str_contains("10:15-11:15 2E Main B Room 15"))
        .stdout(str_contains("\"building\": \"Main B\""));
}
