//! CLI integration tests.
//!
//! Spawns the `engine-audit` binary against scratch projects and checks
//! exit codes, stdout and stderr.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn project(package_json: &str, sources: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), package_json).unwrap();
    for (name, content) in sources {
        let path = temp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    temp
}

fn engine_audit(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("engine-audit");
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("ENGINE_AUDIT_LOG");
    cmd
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    engine_audit(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("engine-audit"));
}

#[test]
fn incompatible_feature_exits_1() {
    let dir = project(
        r#"{"engines":{"node":">=10"}}"#,
        &[("index.js", "const city = user?.address;\n")],
    );
    engine_audit(&dir)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "✖ ./index.js uses optional chaining which is not supported on all versions in the range >=10",
        ))
        .stdout(predicate::str::contains(
            "Remove the use of optional chaining or change the engine field to >=14.0.0",
        ))
        .stdout(predicate::str::contains("Found 1 incompatibility in 1 file"));
}

#[test]
fn compatible_project_exits_0() {
    let dir = project(
        r#"{"engines":{"node":">=14"}}"#,
        &[("index.js", "const city = user?.address;\n")],
    );
    engine_audit(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("✔ No incompatibilities found"));
}

#[test]
fn range_below_feature_exits_1() {
    let dir = project(
        r#"{"engines":{"node":">=10 <12"}}"#,
        &[("src/index.js", "const big = 10n;\nconst n = 1_000;\n")],
    );
    engine_audit(&dir)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("./src/index.js uses numeric separators"));
}

#[test]
fn empty_project_exits_0() {
    let dir = project(r#"{"engines":{"node":">=10"}}"#, &[]);
    engine_audit(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No incompatibilities found"));
}

#[test]
fn missing_engines_is_a_configuration_error() {
    let dir = project(r#"{"name":"app"}"#, &[("index.js", "a?.b;\n")]);
    engine_audit(&dir)
        .arg("--verbose")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No engines field in package.json"))
        .stdout(predicate::str::contains("Checking").not());
}

#[test]
fn missing_node_engine_is_a_configuration_error() {
    let dir = project(r#"{"engines":{"npm":">=7"}}"#, &[("index.js", "a?.b;\n")]);
    engine_audit(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No node property of engines field"));
}

#[test]
fn invalid_range_is_a_configuration_error() {
    let dir = project(r#"{"engines":{"node":"latest"}}"#, &[("index.js", "")]);
    engine_audit(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'latest' is not a valid semver range"));
}

#[test]
fn missing_manifest_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    engine_audit(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not read"));
}

#[test]
fn verbose_lists_files() {
    let dir = project(
        r#"{"engines":{"node":">=8"}}"#,
        &[("a.js", "var a;\n"), ("lib/b.js", "var b;\n")],
    );
    engine_audit(&dir)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("ℹ Checking 2 files\n  ./a.js\n  ./lib/b.js\n"));
}

#[test]
fn node_modules_are_skipped() {
    let dir = project(
        r#"{"engines":{"node":">=8"}}"#,
        &[("index.js", "var a;\n"), ("node_modules/dep/index.js", "a ?? b;\n")],
    );
    engine_audit(&dir).assert().success();
}

#[test]
fn include_and_exclude_patterns() {
    let dir = project(
        r#"{"engines":{"node":">=8"}}"#,
        &[
            ("src/index.js", "var a;\n"),
            ("src/modern.js", "a ?? b;\n"),
            ("scripts/build.js", "a?.b;\n"),
        ],
    );
    engine_audit(&dir)
        .args(["src/**/*.js", "--exclude", "src/modern.js"])
        .assert()
        .success();
    engine_audit(&dir)
        .arg("src/**/*.js")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("./src/modern.js"))
        .stdout(predicate::str::contains("scripts").not());
}

#[test]
fn invalid_pattern_is_a_configuration_error() {
    let dir = project(r#"{"engines":{"node":">=8"}}"#, &[]);
    engine_audit(&dir)
        .args(["--exclude", "***"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid glob pattern"));
}

#[test]
fn range_override() {
    let dir = project(r#"{"name":"no-engines"}"#, &[("index.js", "a?.b;\n")]);
    engine_audit(&dir)
        .args(["--range", ">=14"])
        .assert()
        .success();
}

#[test]
fn cwd_flag_and_custom_manifest() {
    let dir = project(r#"{"name":"root"}"#, &[("app/index.js", "a ?? b;\n")]);
    fs::write(
        dir.path().join("app/engines.json"),
        r#"{"engines":{"node":">=12"}}"#,
    )
    .unwrap();
    engine_audit(&dir)
        .args(["-C", "app", "--manifest", "engines.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("./index.js uses nullish coalescing"));
}

#[test]
fn json_report() {
    let dir = project(
        r#"{"engines":{"node":">=10"}}"#,
        &[("index.js", "a?.b;\na?.c;\n")],
    );
    let output = engine_audit(&dir).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["declaredRange"], ">=10");
    assert_eq!(report["compatible"], false);
    assert_eq!(report["filesScanned"], 1);
    assert_eq!(report["incompatibilities"].as_array().unwrap().len(), 2);
    assert_eq!(report["incompatibilities"][1]["line"], 2);
    assert_eq!(report["incompatibilities"][0]["suggestedRange"], ">=14.0.0");
}

#[test]
fn json_configuration_error() {
    let dir = project(r#"{"engines":{}}"#, &[]);
    let output = engine_audit(&dir).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let error: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(error["error_code"], "MISSING_NODE_ENGINE");
}

#[test]
fn unreadable_file_exits_4() {
    let dir = project(r#"{"engines":{"node":">=10"}}"#, &[("ok.js", "var a;\n")]);
    fs::write(dir.path().join("broken.js"), [0xff, 0xfe, 0xfd]).unwrap();
    engine_audit(&dir)
        .assert()
        .code(4)
        .stdout(predicate::str::contains("⚠ ./broken.js could not be analyzed"));
}

#[cfg(unix)]
#[test]
fn external_detector() {
    let dir = project(r#"{"engines":{"node":">=10"}}"#, &[("index.js", "whatever\n")]);
    fs::write(
        dir.path().join("detect.sh"),
        "cat >/dev/null\necho '[{\"name\":\"top-level await\",\"requiredVersion\":\"14.8.0\",\"line\":1}]'\n",
    )
    .unwrap();
    engine_audit(&dir)
        .args(["--detector", "sh detect.sh"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("uses top-level await"))
        .stdout(predicate::str::contains(">=14.8.0"));
}

#[cfg(unix)]
#[test]
fn failing_external_detector_exits_4() {
    let dir = project(r#"{"engines":{"node":">=10"}}"#, &[("index.js", "x\n")]);
    engine_audit(&dir)
        .args(["--detector", "false"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("could not be analyzed"));
}

#[cfg(unix)]
#[test]
fn bad_required_version_exits_3() {
    let dir = project(r#"{"engines":{"node":">=10"}}"#, &[("index.js", "x\n")]);
    fs::write(
        dir.path().join("detect.sh"),
        "cat >/dev/null\necho '[{\"name\":\"mystery\",\"requiredVersion\":\"soon\"}]'\n",
    )
    .unwrap();
    engine_audit(&dir)
        .args(["--detector", "sh detect.sh"])
        .assert()
        .code(3);
}
