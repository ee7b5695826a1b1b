//! Catalog merge against the template
//!
//! Merging adds entries that exist only in the template, drops entries
//! the template no longer has and keeps existing translations. The
//! default implementation runs gettext's `msgmerge`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::MergeError;

/// Poll interval while waiting for a merge with a timeout
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reconciles an updated catalog with a template
pub trait CatalogMerger {
    /// Merge `updated` against `template`, writing the result to `output`.
    /// Neither input is modified.
    fn merge(&self, updated: &Path, template: &Path, output: &Path) -> Result<PathBuf, MergeError>;
}

/// `msgmerge UPDATED TEMPLATE -o OUTPUT`
#[derive(Debug, Clone)]
pub struct Msgmerge {
    program: String,
    timeout: Option<Duration>,
}

impl Msgmerge {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CatalogMerger for Msgmerge {
    fn merge(&self, updated: &Path, template: &Path, output: &Path) -> Result<PathBuf, MergeError> {
        info!(
            "Merging {} with {} -> {}",
            updated.display(),
            template.display(),
            output.display()
        );
        let mut child = Command::new(&self.program)
            .arg(updated)
            .arg(template)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MergeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain stderr on a thread so a chatty child never blocks on a full pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        warn!("{} timed out after {:?}, killing it", self.program, timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(MergeError::TimedOut {
                            program: self.program.clone(),
                            after: timeout,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        if !status.success() {
            return Err(MergeError::Failed {
                program: self.program.clone(),
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            debug!("{}: {}", self.program, stderr.trim());
        }
        Ok(output.to_path_buf())
    }
}
