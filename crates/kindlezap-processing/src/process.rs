//! Bounded execution of external tools.

use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} did not finish within {secs}s")]
    TimedOut { program: String, secs: u64 },

    #[error("process limiter is closed")]
    Closed,
}

/// Limits how many external tools run at the same time.
///
/// Cloning shares the same permits, so the converter and the page renderer draw from one pool.
#[derive(Clone, Debug)]
pub struct ProcessGate {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl ProcessGate {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    /// Run `program` with `args` and collect its output.
    ///
    /// The child is killed if it outlives the timeout or if the calling future is dropped.
    pub async fn run(&self, program: &str, args: &[String]) -> Result<Output, ProcessError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ProcessError::Closed)?;

        tracing::debug!(program = %program, args = ?args, "Running external tool");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ProcessError::Spawn {
                program: program.to_string(),
                message: e.to_string(),
            }),
            Err(_) => {
                tracing::warn!(program = %program, timeout_secs = self.timeout.as_secs(), "External tool timed out");
                Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
