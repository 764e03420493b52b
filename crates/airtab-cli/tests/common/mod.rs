use std::process::{Command, Output};

/// Run the CLI binary against `root_url` with test credentials.
///
/// The `AIRTABLE_*` variables of the calling environment are cleared so
/// only the arguments given here apply.
pub fn run_cli(root_url: &str, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_airtab"));
    for var in [
        "AIRTABLE_API_KEY",
        "AIRTABLE_BASE_ID",
        "AIRTABLE_ROOT_URL",
        "AIRTABLE_VERSION",
        "AIRTABLE_NO_LIMIT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("AIRTABLE_API_KEY", "keyTEST")
        .env("AIRTABLE_BASE_ID", "appTEST")
        .args(["--root-url", root_url, "--no-limit"])
        .args(args);
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(root_url: &str, args: &[&str]) -> String {
    let output = run_cli(root_url, args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
#[allow(dead_code)]
pub fn run_cli_failure(root_url: &str, args: &[&str]) -> String {
    let output = run_cli(root_url, args);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Parse JSON-lines output.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("invalid JSON line"))
        .collect()
}
