use std::ffi::OsStr;
use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Wall-clock budget for one invocation when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Everything captured from one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external program to completion under a timeout.
///
/// The child gets `/dev/null` as stdin and never waits for input. stdout and
/// stderr are drained by two independent tasks so a child filling one pipe
/// cannot stall while the other is being read.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    timeout_ms: u64,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Runs the program with `args` and captures its output.
    ///
    /// Fails with [`Error::Timeout`] if the process is still running after
    /// the budget; it is killed and nothing it printed is kept. A non-zero
    /// exit with an empty stderr fails with [`Error::ProcessFailure`]. A
    /// non-zero exit with diagnostics is returned as-is so the caller can
    /// decide whether the output is still usable.
    pub async fn run<I, S>(&self, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let budget = Duration::from_millis(self.timeout_ms);

        let mut child = Command::new(&self.program)
            .env("LC_ALL", "C")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        debug!(program = %self.program, pid = ?child.id(), "spawned process");

        let stdout = child.stdout.take().ok_or(Error::CaptureFailed("stdout"))?;
        let stderr = child.stderr.take().ok_or(Error::CaptureFailed("stderr"))?;
        let stdout_reader = tokio::spawn(drain(stdout));
        let stderr_reader = tokio::spawn(drain(stderr));

        let waited = timeout(budget, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_ms = self.timeout_ms,
                    "process timed out, killing it"
                );
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill timed out process");
                }
                stdout_reader.abort();
                stderr_reader.abort();
                return Err(Error::Timeout(self.timeout_ms));
            }
        };

        let stdout = collect(stdout_reader, budget, "stdout").await;
        let stderr = collect(stderr_reader, budget, "stderr").await;
        let exit_code = status.code().unwrap_or(-1);
        debug!(program = %self.program, exit_code, "process exited");

        if exit_code != 0 && stderr.is_empty() {
            return Err(Error::ProcessFailure(exit_code));
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

async fn drain<R>(mut stream: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Joins a reader task, aborting it if it outlives `budget`.
async fn collect(
    mut reader: JoinHandle<io::Result<String>>,
    budget: Duration,
    stream: &'static str,
) -> String {
    match timeout(budget, &mut reader).await {
        Ok(Ok(Ok(text))) => text,
        Ok(Ok(Err(err))) => {
            warn!(stream, error = %err, "failed to read process output");
            String::new()
        }
        Ok(Err(err)) => {
            warn!(stream, error = %err, "reader task failed");
            String::new()
        }
        Err(_) => {
            warn!(stream, "reader did not finish in time, aborting it");
            reader.abort();
            String::new()
        }
    }
}
