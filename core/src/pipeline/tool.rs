use crate::error::{Result, SegError};
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured result of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// An external executable invoked with a wall-clock budget
///
/// Output is captured and logged, never parsed. A nonzero exit or a
/// budget breach is returned as an error; nothing is retried.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
    timeout: Duration,
}

impl ExternalTool {
    pub fn new(program: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the tool to completion
    ///
    /// # Errors
    ///
    /// - [`SegError::ToolTimeout`] if the budget elapses; the child is killed
    /// - [`SegError::ToolFailed`] on a nonzero exit status
    /// - [`SegError::IoError`] if the process cannot be spawned
    pub fn run<I, S>(&self, args: I) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        info!("Running {:?}", command);

        let mut child = command.spawn()?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let output = ToolOutput {
            status,
            stdout: join(stdout),
            stderr: join(stderr),
        };

        if !output.stdout.trim().is_empty() {
            info!("{} stdout:\n{}", self.name(), output.stdout.trim_end());
        }
        if !output.stderr.trim().is_empty() {
            warn!("{} stderr:\n{}", self.name(), output.stderr.trim_end());
        }

        if !status.success() {
            return Err(SegError::ToolFailed {
                tool: self.name(),
                status,
            });
        }
        Ok(output)
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                debug!("{} exited after {:?}", self.name(), start.elapsed());
                return Ok(status);
            }
            if start.elapsed() > self.timeout {
                warn!("{} timed out after {:?}, killing", self.name(), self.timeout);
                if let Err(e) = child.kill() {
                    warn!("Failed to kill {}: {}", self.name(), e);
                }
                if let Err(e) = child.wait() {
                    warn!("Failed to reap {}: {}", self.name(), e);
                }
                return Err(SegError::ToolTimeout {
                    tool: self.name(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// Reads a child pipe to the end on a helper thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
