use anyhow::{Context, Result, anyhow, bail};
use tokio::process::Command;
use tracing::info;

/// Runs `command` through `sh -c` and waits for it to exit.
pub async fn run_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        bail!("finish command must not be blank");
    }

    info!(%command, "running finish command");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .await
        .with_context(|| format!("failed to spawn shell for command: {command}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!(
            "command exited with status {}: {command}",
            status.code().unwrap_or(-1)
        ))
    }
}
