//! Host environment access
//!
//! Every external process the scaffolder starts goes through
//! [`HostEnvironment`], so probing, installing and git init can run against a
//! fake host in tests.

use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

/// Timeout for a streamed command such as a dependency install (10 minutes)
const STREAM_TIMEOUT: Duration = Duration::from_secs(600);

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Access to the programs installed on the host
pub trait HostEnvironment: Send + Sync {
    /// Run a program to completion in `cwd` and capture its output
    fn output(&self, program: &str, args: &[&str], cwd: &Path) -> std::io::Result<CommandOutput>;

    /// Run a program in `cwd`, echoing its output as it arrives.
    /// Fails when the program cannot start or exits unsuccessfully.
    fn stream(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Whether `program --version` runs successfully
    fn is_available(&self, program: &str, cwd: &Path) -> bool {
        self.output(program, &["--version"], cwd)
            .map(|out| out.success)
            .unwrap_or(false)
    }

    /// Trimmed `program --version` output, if the program runs
    fn version(&self, program: &str, cwd: &Path) -> Option<String> {
        self.output(program, &["--version"], cwd)
            .ok()
            .filter(|out| out.success)
            .map(|out| out.stdout.trim().to_string())
    }
}

/// The real host: spawns processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn output(&self, program: &str, args: &[&str], cwd: &Path) -> std::io::Result<CommandOutput> {
        debug!("Running: {} {} (in {})", program, args.join(" "), cwd.display());
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn stream(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()> {
        let cmd = format!("{} {}", program, args.join(" "));
        debug!("Streaming: {} (in {})", cmd, cwd.display());

        let mut child = TokioCommand::new(program)
            .args(args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start `{}`: {}", cmd, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stdout of `{}`", cmd))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr of `{}`", cmd))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let output_task = async {
            let mut stdout_open = true;
            let mut stderr_open = true;
            while stdout_open || stderr_open {
                tokio::select! {
                    line = stdout_reader.next_line(), if stdout_open => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line.dimmed()),
                            Ok(None) => stdout_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                stdout_open = false;
                            }
                        }
                    }
                    line = stderr_reader.next_line(), if stderr_open => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => stderr_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                                stderr_open = false;
                            }
                        }
                    }
                }
            }
        };

        if timeout(STREAM_TIMEOUT, output_task).await.is_err() {
            let _ = child.kill().await;
            anyhow::bail!(
                "`{}` timed out after {} seconds",
                cmd,
                STREAM_TIMEOUT.as_secs()
            );
        }

        match timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => anyhow::bail!(
                "`{}` failed with exit code: {}",
                cmd,
                status.code().unwrap_or(-1)
            ),
            Ok(Err(e)) => anyhow::bail!("Failed to wait for `{}`: {}", cmd, e),
            Err(_) => {
                let _ = child.kill().await;
                anyhow::bail!("`{}` hung after closing its output", cmd)
            }
        }
    }
}
