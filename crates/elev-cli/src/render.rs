//! External plot renderer invocation.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("'{0}' not found, is gnuplot installed?")]
    Missing(String),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Run `program <script>` and wait for it to finish.
pub fn render(program: &str, script: &Path) -> Result<(), RenderError> {
    tracing::debug!("Running {} {}", program, script.display());
    let status = Command::new(program).arg(script).status().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            RenderError::Missing(program.to_string())
        } else {
            RenderError::Spawn {
                program: program.to_string(),
                source: err,
            }
        }
    })?;

    if !status.success() {
        return Err(RenderError::Failed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}
