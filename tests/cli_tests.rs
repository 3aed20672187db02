// tests/cli_tests.rs - Command line behavior of the paintlog binary
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const RECORDS: &str = r#"{"name":"app","levelname":"INFO","msg":"Server started"}
{"name":"app.db","levelname":"ERROR","msg":"Connection failed"}
"#;

fn temp_config(suffix: &str) -> NamedTempFile {
    tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
}

fn paintlog() -> Command {
    let mut cmd = Command::cargo_bin("paintlog").unwrap();
    cmd.env_remove("NO_COLOR").env_remove("FORCE_COLOR");
    cmd
}

#[test]
fn test_plain_output_without_color() {
    let output = paintlog()
        .arg("--no-color")
        .arg("-F")
        .arg("%(name)s %(levelname)s %(message)s")
        .write_stdin(RECORDS)
        .output()
        .expect("Failed to execute paintlog");

    assert!(output.status.success());
    let result = String::from_utf8(output.stdout).unwrap();
    assert_eq!(result, "app INFO Server started\napp.db ERROR Connection failed\n");
}

#[test]
fn test_forced_color_uses_default_level_colors() {
    paintlog()
        .arg("--color")
        .arg("-F")
        .arg("%(levelname)s %(message)s")
        .write_stdin(RECORDS)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[32mINFO\x1b[0m Server started"))
        .stdout(predicate::str::contains("\x1b[31mERROR\x1b[0m Connection failed"));
}

#[test]
fn test_piped_output_is_plain_by_default() {
    paintlog()
        .arg("-F")
        .arg("%(levelname)s %(message)s")
        .write_stdin(RECORDS)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_config_file_rules() {
    let mut config = temp_config(".yaml");
    writeln!(
        config,
        r#"format: "%(levelname)s|%(message)s"
levels:
  ERROR:
    FULL: ["<<", ">>"]
  INFO:
    message: ["[", "]"]
"#
    )
    .unwrap();

    paintlog()
        .arg("--no-color")
        .arg("--config")
        .arg(config.path())
        .write_stdin(RECORDS)
        .assert()
        .success()
        .stdout("INFO|[Server started]\n<<ERROR|Connection failed>>\n");
}

#[test]
fn test_show_template() {
    let mut config = temp_config(".json");
    writeln!(
        config,
        r#"{{"levels": {{"WARNING": {{"levelname": ["Y", "R"]}}}}}}"#
    )
    .unwrap();

    paintlog()
        .arg("--no-color")
        .arg("-c")
        .arg(config.path())
        .arg("-F")
        .arg("%(levelname)-8s %(message)s")
        .arg("--show-template")
        .arg("warn")
        .assert()
        .success()
        .stdout("Y%(levelname)-8sR %(message)s\n");
}

#[test]
fn test_value_mode_alignment() {
    let mut config = temp_config(".yaml");
    writeln!(config, "levels:\n  INFO:\n    levelname: [\"<\", \">\"]").unwrap();

    paintlog()
        .arg("--no-color")
        .arg("--mode")
        .arg("value")
        .arg("-c")
        .arg(config.path())
        .arg("-F")
        .arg("%(levelname)-6s|%(message)s")
        .write_stdin("{\"levelname\":\"INFO\",\"msg\":\"up\"}\n")
        .assert()
        .success()
        .stdout("<INFO>  |up\n");
}

#[test]
fn test_non_json_lines_pass_through() {
    paintlog()
        .arg("--no-color")
        .arg("-F")
        .arg("%(message)s")
        .write_stdin("plain text line\n{\"msg\":\"structured\"}\n[1, 2]\n")
        .assert()
        .success()
        .stdout("plain text line\nstructured\n[1, 2]\n");
}

#[test]
fn test_bad_records_are_skipped_or_fatal() {
    let input = "{\"levelname\":\"LOUD\",\"msg\":\"x\"}\n{\"msg\":\"ok\"}\n";

    paintlog()
        .arg("--no-color")
        .arg("-F")
        .arg("%(message)s")
        .write_stdin(input)
        .assert()
        .success()
        .stdout("ok\n")
        .stderr(predicate::str::contains("Line 1"));

    paintlog()
        .arg("--no-color")
        .arg("--fail-fast")
        .arg("-F")
        .arg("%(message)s")
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_markup_tags_are_removed() {
    paintlog()
        .arg("--no-color")
        .arg("--markup")
        .arg("-F")
        .arg("<color>%(levelname)s</color> <b>%(message)s</b>")
        .write_stdin("{\"levelname\":\"WARNING\",\"msg\":\"hot\"}\n")
        .assert()
        .success()
        .stdout("WARNING hot\n");
}

#[test]
fn test_conflicting_color_flags() {
    paintlog()
        .arg("--color")
        .arg("--no-color")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot use both"));
}
