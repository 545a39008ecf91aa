use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const LEGACY_JSON: &str = r#"[
    { "type": "spoiler", "children": [
        { "type": "summary", "children": [{ "text": "warn" }] },
        { "children": [{ "text": "hidden" }] }
    ] }
]"#;

const WARNING: &str = "<details>\n<summary>warn</summary>\nhidden\n</details>\n";

#[test]
fn convert_legacy_json_to_markup() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.json");
    fs::write(&input_path, LEGACY_JSON).unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--from")
        .arg("json-legacy")
        .arg("--to")
        .arg("markup");

    cmd.assert().success().stdout(WARNING);
}

#[test]
fn convert_is_the_default_command() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.md");
    fs::write(&input_path, WARNING).unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("json");

    cmd.assert().success().stdout(
        predicate::str::contains("\"type\": \"disclosure\"")
            .and(predicate::str::contains("\"summary\": ["))
            .and(predicate::str::contains("\"text\": \"hidden\"")),
    );
}

#[test]
fn convert_writes_output_file() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.json");
    let output_path = dir.path().join("post.md");
    fs::write(&input_path, LEGACY_JSON).unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--from")
        .arg("json-legacy")
        .arg("--to")
        .arg("markup")
        .arg("-o")
        .arg(output_path.as_os_str());

    cmd.assert().success().stdout("");
    assert_eq!(fs::read_to_string(&output_path).unwrap(), WARNING);
}

#[test]
fn convert_reports_too_deep_nesting() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.md");
    fs::write(&input_path, "<details>\n<details>\n<details>\ncore\n").unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg(input_path.as_os_str())
        .arg("--to")
        .arg("json")
        .arg("--max-depth")
        .arg("2");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains(
            "Structure too deep: disclosure nesting exceeds 2",
        )));
}

#[test]
fn convert_rejects_unknown_formats() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.md");
    fs::write(&input_path, "hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("html");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error: Format 'html' not found"));
}

#[test]
fn convert_needs_a_detectable_source_format() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("post.txt");
    fs::write(&input_path, "hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("please specify --from"));
}

#[test]
fn missing_input_file_is_an_error() {
    let mut cmd = cargo_bin_cmd!("quill");
    cmd.arg("convert")
        .arg("/nonexistent/post.md")
        .arg("--to")
        .arg("json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error: could not read"));
}
