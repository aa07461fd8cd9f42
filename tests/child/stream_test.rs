//! Tests for line streaming over child output handles.

use futures_util::{pin_mut, StreamExt};

use status_supervisor::child::{read_lines, ChildCommandBuilder, ChildHandle};

#[tokio::test]
async fn streams_child_stdout_lines() {
    let builder = ChildCommandBuilder::new("sh")
        .arg("-c")
        .arg("echo one; echo two");
    let mut child = ChildHandle::spawn(&builder).unwrap();
    let stdout = child.take_stdout().unwrap();

    let lines = read_lines(stdout);
    pin_mut!(lines);

    let mut collected = Vec::new();
    while let Some(line) = lines.next().await {
        collected.push(line.unwrap());
    }
    child.wait().await.unwrap();

    assert_eq!(collected, vec!["one", "two"]);
}

#[tokio::test]
async fn child_env_is_visible_to_the_command() {
    let builder = ChildCommandBuilder::new("sh")
        .arg("-c")
        .arg("printf '%s\\n' \"$MARKER\"")
        .env("MARKER", "hello-from-env");
    let mut child = ChildHandle::spawn(&builder).unwrap();
    let stdout = child.take_stdout().unwrap();

    let lines = read_lines(stdout);
    pin_mut!(lines);
    let first = lines.next().await.unwrap().unwrap();
    child.wait().await.unwrap();

    assert_eq!(first, "hello-from-env");
}

#[tokio::test]
async fn stderr_handle_streams_independently() {
    let builder = ChildCommandBuilder::new("sh")
        .arg("-c")
        .arg("echo out; echo err >&2");
    let mut child = ChildHandle::spawn(&builder).unwrap();
    let stdout = child.take_stdout().unwrap();
    let stderr = child.take_stderr().unwrap();

    let out_lines = read_lines(stdout);
    let err_lines = read_lines(stderr);
    pin_mut!(out_lines);
    pin_mut!(err_lines);

    assert_eq!(out_lines.next().await.unwrap().unwrap(), "out");
    assert_eq!(err_lines.next().await.unwrap().unwrap(), "err");
    child.wait().await.unwrap();
}
