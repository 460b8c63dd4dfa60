//! CLI integration tests using assert_cmd.
//!
//! Help and argument validation run without a backend. The end-to-end tests
//! start the axum mock from `mock_backend.rs` and point the binary at it.


use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use mock_backend::{project_json, MockBackend, MOCK_PASSWORD};
use predicates::prelude::*;

/// Binary with a clean environment: no inherited credentials and an empty
/// settings file so the developer's own config never leaks in.
#[allow(deprecated)]
fn trlboard(config_dir: &tempfile::TempDir) -> Command {
    let config = config_dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    let mut cmd = Command::cargo_bin("trlboard").unwrap();
    cmd.env_remove("TRLBOARD_API_URL")
        .env_remove("TRLBOARD_USER")
        .env_remove("TRLBOARD_PASSWORD")
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(config);
    cmd
}

// --- Help and arg validation (no backend needed) ---

#[test]
fn help_shows_all_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("refresh")
            .and(predicate::str::contains("metrics"))
            .and(predicate::str::contains("charts"))
            .and(predicate::str::contains("projects"))
            .and(predicate::str::contains("search"))
            .and(predicate::str::contains("report"))
            .and(predicate::str::contains("insights"))
            .and(predicate::str::contains("browse")),
    );
}

#[test]
fn help_projects_shows_args() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir)
        .args(["projects", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--sort")
                .and(predicate::str::contains("--ascending"))
                .and(predicate::str::contains("--page")),
        );
}

#[test]
fn help_report_describes_name_matching() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir)
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("first case-insensitive match")
                .and(predicate::str::contains("--out")),
        );
}

#[test]
fn missing_password_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir)
        .arg("metrics")
        .assert()
        .failure()
        .stderr(predicate::str::contains("password is required"));
}

#[test]
fn unknown_sort_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir)
        .args(["--password", "x", "projects", "--sort", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sort key"));
}

#[test]
fn zero_page_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    trlboard(&dir)
        .args(["--password", "x", "--page-size", "0", "projects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

// --- Against the mock backend ---

async fn backend() -> MockBackend {
    MockBackend::builder()
        .with_project(project_json("Filtro de agua", "No", 40.0, 10.0, 0.0))
        .with_project(project_json("Sensor de suelo", "Sí", 20.0, 5.0, 0.0))
        .with_project(project_json("Dron agrícola", "No", 60.0, 20.0, 5.0))
        .start()
        .await
}

/// Run the binary off the test runtime so the mock keeps serving.
async fn run(cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || {
        let mut cmd = cmd;
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn projects_table_lists_approved_first() {
    let mock = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = trlboard(&dir);
    cmd.args(["--api-url", mock.url().as_str(), "--password", MOCK_PASSWORD, "projects"]);
    let out = run(cmd).await.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();

    let sensor = text.find("Sensor de suelo").unwrap();
    let dron = text.find("Dron agrícola").unwrap();
    let filtro = text.find("Filtro de agua").unwrap();
    assert!(sensor < dron && dron < filtro, "{}", text);
    assert!(text.contains("Showing 1 to 3 of 3 projects"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn projects_json_page_uses_backend_labels() {
    let mock = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = trlboard(&dir);
    cmd.args([
        "--api-url",
        mock.url().as_str(),
        "--password",
        MOCK_PASSWORD,
        "--page-size",
        "2",
        "projects",
        "--sort",
        "trl-1-3",
        "--ascending",
        "--page",
        "2",
        "--json",
    ]);
    let out = run(cmd).await.assert().success().get_output().stdout.clone();
    let page: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(page["page"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["total_items"], 3);
    // approved Sensor, then Filtro (40) on page 1; Dron (60) alone on page 2
    let rows = page["proyectos"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Nombre del Proyecto"], "Dron agrícola");
    assert_eq!(rows[0]["Aprobado"], "No");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_password_reports_unauthorized() {
    let mock = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = trlboard(&dir);
    cmd.args(["--api-url", mock.url().as_str(), "--password", "wrong", "metrics"]);
    run(cmd)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("401"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn report_is_written_to_the_requested_file() {
    let mock = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("dron.html");
    let mut cmd = trlboard(&dir);
    cmd.args(["--api-url", mock.url().as_str(), "--password", MOCK_PASSWORD, "report", "Dron agrícola", "--out"])
        .arg(&target);
    run(cmd).await.assert().success().stdout(predicate::str::contains("Saved report"));

    let body = std::fs::read_to_string(&target).unwrap();
    assert!(body.contains("<h1>Dron agrícola</h1>"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn browse_runs_scripted_commands() {
    let mock = backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = trlboard(&dir);
    cmd.args(["--api-url", mock.url().as_str(), "--password", MOCK_PASSWORD, "browse"])
        .write_stdin("sort trl-4-7\nsearch sensor\nbogus\nquit\n");
    run(cmd).await.assert().success().stdout(
        predicate::str::contains("Data refreshed")
            .and(predicate::str::contains("TRL 4-7 ▼"))
            .and(predicate::str::contains("1. Sensor de suelo"))
            .and(predicate::str::contains("unknown command 'bogus'")),
    );
}
