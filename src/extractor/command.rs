//! External importer process

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{ExtractionEvent, Extractor};

/// Runs a configured program with the container path as its last argument.
///
/// Exit status 0 is completion, any other status is failure carrying the
/// program's stderr, and termination by a signal is cancellation.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    detach: bool,
    dir: Option<PathBuf>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            detach: false,
            dir: None,
        }
    }

    /// Do not wait for the program; report [`ExtractionEvent::Started`]
    #[must_use]
    pub fn detached(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    /// Run the program from `dir`
    #[must_use]
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    fn command(&self, container: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(container);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        command
    }
}

impl Extractor for CommandExtractor {
    fn name(&self) -> &str {
        &self.program
    }

    fn extract(&self, container: &Path, interactive: bool) -> ExtractionEvent {
        let mut command = self.command(container);
        tracing::debug!(program = %self.program, container = %container.display(), interactive, "running importer");

        if self.detach {
            command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
            return match command.spawn() {
                Ok(child) => {
                    tracing::debug!(pid = child.id(), "importer detached");
                    ExtractionEvent::Started
                }
                Err(e) => ExtractionEvent::Failed(format!("failed to start {}: {e}", self.program)),
            };
        }

        if interactive {
            command.stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::piped());
        } else {
            command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let output = match command.output() {
            Ok(output) => output,
            Err(e) => return ExtractionEvent::Failed(format!("failed to start {}: {e}", self.program)),
        };

        match output.status.code() {
            Some(0) => ExtractionEvent::Completed,
            Some(code) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                ExtractionEvent::Failed(if stderr.is_empty() {
                    format!("{} exited with status {code}", self.program)
                } else {
                    stderr
                })
            }
            None => ExtractionEvent::Cancelled,
        }
    }
}
