use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::RunError;

/// 5 seconds per interpreter invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw captured output of one interpreter session, verbatim.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub stdout: String,
    pub stderr: String,
}

/// One interpreter session per call: submit a directive batch, get the raw
/// transcript back.
pub trait Backend {
    fn run_session(&self, directives: &[String]) -> Result<Transcript, RunError>;
    fn validate(&self) -> Result<(), RunError>;
}

/// Drives the `ocaml` toplevel (or a compatible replacement) as a child
/// process. A fresh process is spawned per session so no interpreter state
/// leaks between test cases.
#[derive(Debug, Clone)]
pub struct OcamlBackend {
    pub program: String,
    pub timeout: Duration,
}

impl OcamlBackend {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        OcamlBackend {
            program: program.into(),
            timeout,
        }
    }
}

impl Backend for OcamlBackend {
    fn run_session(&self, directives: &[String]) -> Result<Transcript, RunError> {
        // -noinit skips the user's init file. With TERM set the toplevel
        // emits escape sequences that corrupt prompt-based segmentation.
        let mut cmd = Command::new(&self.program);
        cmd.arg("-noinit")
            .env_remove("TERM")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                RunError::Io(std::io::Error::other("interpreter stdin not captured"))
            })?;
            let batch = directives.join("\n");
            debug!(batch = %batch, "submitting directive batch");
            stdin.write_all(batch.as_bytes())?;
            stdin.write_all(b"\n")?;
        }
        // Close stdin so the toplevel sees EOF after the quit directive.
        drop(child.stdin.take());

        match child.wait_timeout(self.timeout)? {
            Some(_status) => {
                // The quit directive exits 0; a nonzero status still leaves
                // a transcript worth classifying, so it is not an error here.
                let out = child.wait_with_output()?;
                Ok(Transcript {
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                })
            }
            None => {
                child.kill()?;
                let out = child.wait_with_output()?;
                warn!(
                    stdout = %String::from_utf8_lossy(&out.stdout),
                    stderr = %String::from_utf8_lossy(&out.stderr),
                    "interpreter timed out"
                );
                Err(RunError::Timeout {
                    limit: self.timeout,
                })
            }
        }
    }

    fn validate(&self) -> Result<(), RunError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        // Any exit status is fine; this only probes that the command runs.
        child.wait()?;
        Ok(())
    }
}
