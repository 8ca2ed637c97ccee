use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::DesktopError;
use crate::platform::CommandSpec;

fn command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args).stdin(Stdio::null());
    command
}

fn spawn_error(spec: &CommandSpec) -> impl FnOnce(std::io::Error) -> DesktopError + '_ {
    |source| DesktopError::Spawn {
        program: spec.program.clone(),
        source,
    }
}

/// Run to completion within `limit`; a non-zero exit is an error. The
/// child is killed when the limit is hit.
pub(crate) async fn run(spec: &CommandSpec, limit: Duration) -> Result<(), DesktopError> {
    let child = command(spec)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_error(spec))?;

    let output = tokio::time::timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| DesktopError::Timeout {
            program: spec.program.clone(),
        })?
        .map_err(spawn_error(spec))?;

    if !output.status.success() {
        return Err(DesktopError::Exit {
            program: spec.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Start and leave running, for long-lived applications.
pub(crate) fn spawn_detached(spec: &CommandSpec) -> Result<(), DesktopError> {
    command(spec)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
        .map_err(spawn_error(spec))
}
