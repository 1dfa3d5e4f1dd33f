//! Process invocation
//!
//! Runs the external command once per request and waits for it to exit.
//! There is no pooling; every request gets its own child process.

use hyper::body::Bytes;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::error::InvokeError;
use crate::logger;

/// Outcome of one finished command
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Standard output with trailing whitespace removed
    pub output: Bytes,
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

/// Run `command` with `args` and capture its standard output.
///
/// A non-zero exit is not an error here: it is reported through
/// `ProcessResult::success` so the output can still reach the caller.
/// `timeout` of `None` waits for as long as the command runs. On Unix the
/// command leads its own process group, and a timeout kills the whole group.
pub async fn invoke(
    command: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<ProcessResult, InvokeError> {
    let mut cmd = Command::new(command);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| InvokeError::Launch {
        command: command.to_string(),
        source,
    })?;

    let collected = match timeout {
        Some(limit) => {
            let waited = tokio::time::timeout(limit, collect(&mut child)).await;
            match waited {
                Ok(result) => result,
                Err(_) => {
                    kill_process_group(&mut child).await;
                    return Err(InvokeError::Timeout {
                        command: command.to_string(),
                        seconds: limit.as_secs(),
                    });
                }
            }
        }
        None => collect(&mut child).await,
    };

    let (status, stdout, stderr) = collected.map_err(|source| InvokeError::Launch {
        command: command.to_string(),
        source,
    })?;

    if !stderr.is_empty() {
        logger::log_command_stderr(command, &String::from_utf8_lossy(&stderr));
    }

    Ok(ProcessResult {
        output: Bytes::from(trim_trailing_whitespace(stdout)),
        success: status.success(),
        exit_code: status.code(),
    })
}

/// Wait for the child while draining both pipes
async fn collect(child: &mut Child) -> io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))
}

async fn read_pipe(pipe: Option<impl AsyncRead + Unpin>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(unix)]
async fn kill_process_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        let group = format!("-{pid}");
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(e) = killed {
            logger::log_warning(&format!("Failed to kill process group {pid}: {e}"));
        }
    }
    // Reaps the group leader
    let _ = child.kill().await;
}

#[cfg(not(unix))]
async fn kill_process_group(child: &mut Child) {
    let _ = child.kill().await;
}

fn trim_trailing_whitespace(mut bytes: Vec<u8>) -> Vec<u8> {
    while bytes.last().is_some_and(u8::is_ascii_whitespace) {
        bytes.pop();
    }
    bytes
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_args(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(trim_trailing_whitespace(b"{}\n\r\n \t".to_vec()), b"{}");
        assert_eq!(trim_trailing_whitespace(b"  {}".to_vec()), b"  {}");
        assert!(trim_trailing_whitespace(b"\n\n".to_vec()).is_empty());
    }

    #[tokio::test]
    async fn test_success_captures_stdout() {
        let result = invoke("/bin/sh", &sh_args(r#"echo '{"ok":true}'"#), None)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(&result.output[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_failure_keeps_output() {
        let script = r#"echo '{"error":"bad"}'; echo 'oops' >&2; exit 3"#;
        let result = invoke("/bin/sh", &sh_args(script), None).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(&result.output[..], br#"{"error":"bad"}"#);
    }

    #[tokio::test]
    async fn test_missing_command_is_launch_error() {
        let err = invoke("/nonexistent/svcflex-command", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_failure() {
        let err = invoke("/bin/sh", &sh_args("sleep 5"), Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { .. }));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_background_children() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("sleep.pid");
        let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());

        let err = invoke("/bin/sh", &sh_args(&script), Some(Duration::from_millis(500)))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { .. }));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let stat = std::path::Path::new("/proc").join(pid.trim()).join("stat");
        let mut gone = false;
        for _ in 0..50 {
            match std::fs::read_to_string(&stat) {
                Ok(line) if !line.contains(") Z ") => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                _ => {
                    gone = true;
                    break;
                }
            }
        }
        assert!(gone, "background sleep {} outlived the timeout", pid.trim());
    }
}
