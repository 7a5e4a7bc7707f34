use crate::error::{Result, WorkerError};
use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ExecOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run an external tool to completion, enforcing an optional wall-clock
/// bound. A non-zero exit or an expired timeout both surface as a `Process`
/// error carrying the tool name and captured stderr.
pub fn run_tool(tool: &str, mut cmd: Command, timeout: Option<Duration>) -> Result<ExecOutput> {
    debug!("exec {tool}: {:?} timeout={:?}", cmd, timeout);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| WorkerError::Process {
        tool: tool.to_string(),
        status: "spawn failed".to_string(),
        stderr: e.to_string(),
    })?;

    let output = match timeout {
        Some(t) if !t.is_zero() => wait_with_timeout(tool, &mut child, t)?,
        _ => child.wait_with_output().map_err(|e| WorkerError::Process {
            tool: tool.to_string(),
            status: "wait failed".to_string(),
            stderr: e.to_string(),
        })?,
    };

    if !output.status.success() {
        return Err(WorkerError::Process {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(ExecOutput {
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

fn wait_with_timeout(tool: &str, child: &mut Child, timeout: Duration) -> Result<Output> {
    // Drain pipes while waiting so a chatty tool can't deadlock on a full
    // stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let join = |handle: std::thread::JoinHandle<std::io::Result<Vec<u8>>>| -> Result<Vec<u8>> {
        handle
            .join()
            .map_err(|_| WorkerError::Process {
                tool: tool.to_string(),
                status: "pipe reader panicked".to_string(),
                stderr: String::new(),
            })?
            .map_err(WorkerError::Io)
    };

    let start = Instant::now();
    loop {
        let status = child.try_wait().map_err(|e| WorkerError::Process {
            tool: tool.to_string(),
            status: "try_wait failed".to_string(),
            stderr: e.to_string(),
        })?;

        if let Some(status) = status {
            return Ok(Output {
                status,
                stdout: join(stdout_thread)?,
                stderr: join(stderr_thread)?,
            });
        }

        if start.elapsed() > timeout {
            warn!("{tool} timed out after {:?}", timeout);
            let _ = child.kill();
            let _ = child.wait();
            let stderr = join(stderr_thread).unwrap_or_default();
            let _ = join(stdout_thread);
            return Err(WorkerError::Process {
                tool: tool.to_string(),
                status: format!("timed out after {}s", timeout.as_secs()),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
