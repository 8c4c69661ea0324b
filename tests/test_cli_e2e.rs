mod common;

use common::{arg, fixture_path, photo_dir, run_valentine, text};

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_human() {
    let output = run_valentine(&["version"]);
    assert!(output.status.success(), "version should exit 0: {}", text(&output.stderr));
    let stdout = text(&output.stdout);
    assert!(stdout.starts_with("valentine "), "unexpected version output: {stdout}");
}

#[test]
fn version_json() {
    let output = run_valentine(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&text(&output.stdout)).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "valentine");
    assert!(parsed["version"].is_string());
}

#[test]
fn completions_zsh() {
    let output = run_valentine(&["completions", "zsh"]);
    assert!(output.status.success());
    assert!(text(&output.stdout).contains("valentine"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = run_valentine(&["serenade"]);
    assert_eq!(output.status.code(), Some(2), "clap usage errors exit 2");
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_valid_file() {
    let fixture = fixture_path("valid.yaml");
    let output = run_valentine(&["validate", arg(&fixture)]);
    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    assert!(text(&output.stdout).starts_with("ok"));
}

#[test]
fn validate_invalid_file_lists_every_error() {
    let fixture = fixture_path("invalid.yaml");
    let output = run_valentine(&["validate", arg(&fixture)]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = text(&output.stdout);
    assert!(stdout.starts_with("FAIL"));
    for field in ["boot_script", "rejection_lines", "layout.per_photo", "confetti.colors[0]"] {
        assert!(stdout.contains(field), "missing {field} in: {stdout}");
    }
}

#[test]
fn validate_strict_fails_on_warnings() {
    let fixture = fixture_path("warnings.yaml");
    let relaxed = run_valentine(&["validate", arg(&fixture)]);
    assert!(relaxed.status.success());

    let strict = run_valentine(&["validate", "--strict", arg(&fixture)]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_json_reports_each_file() {
    let valid = fixture_path("valid.yaml");
    let unknown = fixture_path("unknown_field.yaml");
    let output = run_valentine(&["validate", "--format", "json", arg(&valid), arg(&unknown)]);
    assert_eq!(output.status.code(), Some(2));

    let reports: serde_json::Value =
        serde_json::from_str(&text(&output.stdout)).expect("validate JSON should be valid");
    let reports = reports.as_array().expect("array of reports");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert!(
        reports[1]["failure"]
            .as_str()
            .is_some_and(|f| f.contains("favourite_colour")),
        "parse failure should name the field: {}",
        reports[1]
    );
}

#[test]
fn validate_missing_file() {
    let output = run_valentine(&["validate", "/nonexistent/valentine.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(text(&output.stdout).contains("file not found"));
}

// ============================================================================
// layout
// ============================================================================

#[test]
fn layout_without_photos() {
    let dir = photo_dir(&[]);
    let output = run_valentine(&["layout", "--photos", arg(dir.path())]);
    assert!(output.status.success());
    assert_eq!(text(&output.stdout), "no photos found\n");
}

#[test]
fn layout_single_photo_fills_minimum() {
    let dir = photo_dir(&["us.jpg", "notes.txt"]);
    let output = run_valentine(&["layout", "--photos", arg(dir.path()), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", text(&output.stderr));

    let report: serde_json::Value = serde_json::from_str(&text(&output.stdout)).unwrap();
    assert_eq!(report["photos"], serde_json::json!(["/photos/us.jpg"]));
    let items = report["items"].as_array().unwrap();
    assert_eq!(items.len(), 12);
    assert_eq!(items[0]["id"], "/photos/us.jpg-0");
    assert_eq!(items[11]["id"], "/photos/us.jpg-11");
}

#[test]
fn layout_is_repeatable() {
    let dir = photo_dir(&["b.png", "a.webp", "c.GIF"]);
    let first = run_valentine(&["layout", "--photos", arg(dir.path()), "--format", "json"]);
    let second = run_valentine(&["layout", "--photos", arg(dir.path()), "--format", "json"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let report: serde_json::Value = serde_json::from_str(&text(&first.stdout)).unwrap();
    assert_eq!(
        report["photos"],
        serde_json::json!(["/photos/a.webp", "/photos/b.png", "/photos/c.GIF"])
    );
}

#[test]
fn layout_uses_config_density() {
    let dir = photo_dir(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]);
    let fixture = fixture_path("valid.yaml");
    let output = run_valentine(&[
        "layout",
        "--config",
        arg(&fixture),
        "--photos",
        arg(dir.path()),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    let report: serde_json::Value = serde_json::from_str(&text(&output.stdout)).unwrap();
    // 6 photos x 2 clamps to max_items = 10.
    assert_eq!(report["items"].as_array().unwrap().len(), 10);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_needs_a_terminal() {
    let output = run_valentine(&["run", "--audio", "silent"]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", text(&output.stderr));
    assert!(text(&output.stderr).contains("not a terminal"));
}

#[test]
fn run_rejects_wav_path_without_wav_backend() {
    let output = run_valentine(&["run", "--audio", "bell", "--wav", "out.wav"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn run_rejects_invalid_config() {
    let fixture = fixture_path("invalid.yaml");
    let output = run_valentine(&["run", "--config", arg(&fixture)]);
    assert_eq!(output.status.code(), Some(2));
}
