//! Sidecar classification engine client.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use tidyfile_core::{AnalyzeSummary, BackendError, Classification};

/// Client for the external classification engine.
///
/// The engine is a separate binary spawned once per request. It prints a
/// single JSON document on stdout and diagnostics on stderr; a non-zero
/// exit means the whole request failed.
#[derive(Debug, Clone)]
pub struct EngineClient {
    program: PathBuf,
}

impl EngineClient {
    /// Client invoking `program` (a name resolved via `PATH` or a full path).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Classify every file directly inside `dir`.
    pub async fn analyze(&self, dir: &Path) -> Result<AnalyzeSummary, BackendError> {
        tracing::debug!(dir = %dir.display(), "engine analyze");
        let mut command = Command::new(&self.program);
        command.arg("analyze").arg(dir);
        let stdout = self.run(command).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| BackendError::unavailable(format!("Malformed engine output: {e}")))
    }

    /// Rank files under `dir` against a natural-language `query`.
    pub async fn search(&self, dir: &Path, query: &str) -> Result<Vec<Classification>, BackendError> {
        tracing::debug!(dir = %dir.display(), query, "engine search");
        let mut command = Command::new(&self.program);
        command.arg("search").arg(dir).arg(query);
        let stdout = self.run(command).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| BackendError::unavailable(format!("Malformed engine output: {e}")))
    }

    async fn run(&self, mut command: Command) -> Result<Vec<u8>, BackendError> {
        let output = command.output().await.map_err(|e| {
            BackendError::unavailable(format!(
                "Failed to start engine '{}': {e}",
                self.program.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::unavailable(format!(
                "Engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}
