use predicates::str::contains;

mod common;
use common::TestEnv;

#[test]
fn model_list_shows_builtin_catalog() {
    let env = TestEnv::new();
    env.cmd()
        .args(["model", "list"])
        .assert()
        .success()
        .stdout(contains("Phi-2 2.7B"))
        .stdout(contains("phi2.gguf"))
        .stdout(contains("mistral.gguf"));
}

#[test]
fn model_list_json_shape() {
    let env = TestEnv::new();
    let out = env.run_json(&["model", "list"]);
    assert_eq!(out["ok"], true);
    let data = out["data"].as_array().expect("data array");
    assert_eq!(data.len(), 4);
    assert_eq!(data[2]["id"], 3);
    assert_eq!(data[2]["name"], "Phi-2 2.7B");
    assert_eq!(data[2]["filename"], "phi2.gguf");
    assert_eq!(
        data[2]["url"],
        "https://huggingface.co/TheBloke/phi-2-GGUF/resolve/main/phi-2.Q4_K_M.gguf"
    );
}

#[test]
fn probe_reports_interpreter_details() {
    let env = TestEnv::new();
    let python = env.fake_python("3.11.4", 0);
    let out = env
        .cmd()
        .env("STEWARD_PYTHON", &python)
        .arg("--json")
        .arg("probe")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["python_version"], "3.11.4");
    assert_eq!(json["data"]["existing_install"], false);
}

#[test]
fn probe_rejects_old_interpreter_with_both_versions() {
    let env = TestEnv::new();
    let python = env.fake_python("3.7.2", 0);
    env.cmd()
        .env("STEWARD_PYTHON", &python)
        .arg("probe")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("probe stage failed"))
        .stderr(contains("3.7.2"))
        .stderr(contains("3.10"));
}

#[test]
fn probe_names_a_missing_interpreter() {
    let env = TestEnv::new();
    env.cmd()
        .env("STEWARD_PYTHON", "/nonexistent/steward-python")
        .arg("probe")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("required tool not found"))
        .stderr(contains("/nonexistent/steward-python"));
}

#[test]
fn check_without_config_names_the_missing_file() {
    let env = TestEnv::new();
    env.cmd()
        .arg("check")
        .assert()
        .failure()
        .code(3)
        .stderr(contains("config not found"));
}

#[test]
fn invalid_selector_fails_without_side_effects() {
    let env = TestEnv::new();
    env.cmd()
        .args(["model", "fetch", "9"])
        .assert()
        .failure()
        .code(5)
        .stderr(contains("model selection stage failed"))
        .stderr(contains("invalid choice"));
    assert!(
        !env.models_dir().exists() || std::fs::read_dir(env.models_dir()).unwrap().next().is_none(),
        "invalid selection must not create files"
    );
}

#[test]
fn non_numeric_selector_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["model", "fetch", "abc"])
        .assert()
        .failure()
        .code(5)
        .stderr(contains("invalid choice"));
}

#[test]
fn zero_selector_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["model", "fetch", "0"])
        .assert()
        .failure()
        .code(5);
}

#[test]
fn unreadable_catalog_is_a_selection_failure() {
    let env = TestEnv::new();
    let path = env.base().join("missing-catalog.json");
    env.cmd()
        .arg("--catalog")
        .arg(&path)
        .args(["model", "list"])
        .assert()
        .failure()
        .code(5)
        .stderr(contains("unreadable catalog"));
}

#[test]
fn duplicate_catalog_ids_are_rejected() {
    let env = TestEnv::new();
    let catalog = env.write_catalog(serde_json::json!([
        {"id": 1, "name": "A", "url": "http://127.0.0.1:1/a", "filename": "a.gguf", "size_bytes": 10},
        {"id": 1, "name": "B", "url": "http://127.0.0.1:1/b", "filename": "b.gguf", "size_bytes": 10}
    ]));
    env.cmd()
        .arg("--catalog")
        .arg(&catalog)
        .args(["model", "list"])
        .assert()
        .failure()
        .code(5)
        .stderr(contains("duplicate catalog id"));
}
