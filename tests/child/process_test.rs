//! Tests for child process spawning and control.

use status_supervisor::child::{ChildCommandBuilder, ChildHandle, SpawnError};

#[test]
fn builder_new_creates_with_program() {
    let builder = ChildCommandBuilder::new("worker");
    assert_eq!(builder.program(), "worker");
    assert!(builder.get_args().is_empty());
}

#[test]
fn builder_forwards_args_untouched() {
    let builder = ChildCommandBuilder::new("worker").args(["--input", "data.bin", "-x"]);
    assert_eq!(builder.get_args(), ["--input", "data.bin", "-x"]);
}

#[test]
fn builder_arg_appends_in_order() {
    let builder = ChildCommandBuilder::new("worker")
        .arg("first")
        .args(["second", "third"]);
    assert_eq!(builder.get_args(), ["first", "second", "third"]);
}

#[test]
fn builder_working_dir() {
    use std::path::PathBuf;

    let builder = ChildCommandBuilder::new("worker").working_dir("/tmp/scratch");
    assert_eq!(
        builder.get_working_dir(),
        Some(&PathBuf::from("/tmp/scratch"))
    );
}

#[test]
fn builder_working_dir_not_set() {
    let builder = ChildCommandBuilder::new("worker");
    assert!(builder.get_working_dir().is_none());
}

#[test]
fn builder_env_collects_pairs() {
    let builder = ChildCommandBuilder::new("worker")
        .env("MODE", "batch")
        .env("RETRIES", "3");
    assert_eq!(
        builder.get_envs(),
        [
            ("MODE".to_string(), "batch".to_string()),
            ("RETRIES".to_string(), "3".to_string())
        ]
    );
}

#[test]
fn builder_render_escapes_shell_metacharacters() {
    let builder = ChildCommandBuilder::new("worker").arg("two words").arg("plain");
    let rendered = builder.render();
    assert!(rendered.starts_with("worker "));
    assert!(rendered.contains("'two words'"));
    assert!(rendered.ends_with("plain"));
}

#[test]
fn builder_is_clone() {
    let builder = ChildCommandBuilder::new("worker").arg("x");
    let cloned = builder.clone();
    assert_eq!(builder.get_args(), cloned.get_args());
}

#[tokio::test]
async fn spawn_echo_and_wait() {
    let builder = ChildCommandBuilder::new("echo").arg("hello");
    let mut child = ChildHandle::spawn(&builder).unwrap();

    assert!(child.id().is_some());

    let status = child.wait().await.unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn spawn_missing_binary_is_not_found() {
    let builder = ChildCommandBuilder::new("definitely-not-a-real-binary-9a8b7c");
    let result = ChildHandle::spawn(&builder);
    assert!(matches!(result, Err(SpawnError::NotFound)));
}

#[tokio::test]
async fn take_stdout_once() {
    let builder = ChildCommandBuilder::new("echo").arg("hello");
    let mut child = ChildHandle::spawn(&builder).unwrap();

    assert!(child.take_stdout().is_some());
    assert!(child.take_stdout().is_none());

    child.wait().await.unwrap();
}

#[tokio::test]
async fn take_stderr_once() {
    let builder = ChildCommandBuilder::new("echo").arg("hello");
    let mut child = ChildHandle::spawn(&builder).unwrap();

    assert!(child.take_stderr().is_some());
    assert!(child.take_stderr().is_none());

    child.wait().await.unwrap();
}

#[tokio::test]
async fn try_wait_on_running_process() {
    let builder = ChildCommandBuilder::new("sleep").arg("10");
    let mut child = ChildHandle::spawn(&builder).unwrap();

    let result = child.try_wait();
    assert!(result.is_ok());
    assert!(result.unwrap().is_none());

    child.kill().await.unwrap();
}

#[tokio::test]
async fn kill_running_process() {
    let builder = ChildCommandBuilder::new("sleep").arg("10");
    let mut child = ChildHandle::spawn(&builder).unwrap();

    child.kill().await.unwrap();

    let status = child.wait().await.unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn spawn_with_working_dir() {
    use futures_util::{pin_mut, StreamExt};
    use status_supervisor::child::read_lines;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path().canonicalize().unwrap();

    let builder = ChildCommandBuilder::new("pwd").working_dir(&temp_path);
    let mut child = ChildHandle::spawn(&builder).unwrap();

    let stdout = child.take_stdout().unwrap();
    let lines = read_lines(stdout);
    pin_mut!(lines);
    let first = lines.next().await.unwrap().unwrap();
    child.wait().await.unwrap();

    assert_eq!(first, temp_path.to_str().unwrap());
}
