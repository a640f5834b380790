use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn run_help(root: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("steward");
    cmd.arg("--root")
        .arg(root.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let root = TempDir::new().expect("temp root");

    // top-level
    run_help(&root, &[]);

    // stages
    run_help(&root, &["probe"]);
    run_help(&root, &["init"]);
    run_help(&root, &["install"]);
    run_help(&root, &["deploy"]);
    run_help(&root, &["check"]);
    run_help(&root, &["up"]);

    // grouped subcommands
    run_help(&root, &["model"]);
    run_help(&root, &["model", "list"]);
    run_help(&root, &["model", "fetch"]);
}
