use std::process::Command;

fn sql_agent() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sql-agent"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_logs_go_to_stderr_not_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = sql_agent()
        .arg("examples")
        .env("LOG_DIR", dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert!(stderr.contains("Logging configured"));
    assert!(!stdout.contains("Logging configured"));
    assert!(!stdout.contains('\x1b'));
    assert!(stdout.lines().all(|line| line.starts_with(|c: char| c.is_ascii_digit())));
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn test_log_file_is_written_to_log_dir() {
    let dir = tempfile::tempdir().unwrap();
    let output = sql_agent()
        .arg("examples")
        .env("LOG_DIR", dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let logs: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("sql_agent_"));
}
