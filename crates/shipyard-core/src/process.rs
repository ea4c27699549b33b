//! Subprocess execution
//!
//! Every external program the pipeline touches (docker, ssh-agent, ssh-add)
//! goes through [`CommandRunner`], so stages can be exercised against
//! [`crate::fakes::FakeRunner`] without a container engine.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// A single program invocation: program, ordered arguments, environment
/// overlay and optional working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Overlaid on the inherited environment, never replacing it.
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Program followed by its arguments.
    pub fn command_line(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Whether the command line starts with `prefix` (program included).
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        let line = self.command_line();
        line.len() >= prefix.len() && line.iter().zip(prefix).all(|(a, b)| a == b)
    }

    /// Printable command line with the value after `--password` hidden.
    pub fn display(&self) -> String {
        let mut hide_next = false;
        self.command_line()
            .into_iter()
            .map(|part| {
                if hide_next {
                    hide_next = false;
                    return "***";
                }
                hide_next = part == "--password";
                part
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        // a cancelled future must not leave the child running
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code_display(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_string(),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr.
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Run to completion with stdout and stderr streamed live to our own;
    /// returns the exit code (`None` if killed by a signal).
    async fn stream(&self, invocation: &Invocation) -> Result<Option<i32>>;

    /// Run and return stdout, failing on a non-zero exit.
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        let output = self.output(invocation).await?;
        if !output.success() {
            return Err(CoreError::CommandFailed {
                command: invocation.display(),
                code: output.code_display(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        (**self).output(invocation).await
    }

    async fn stream(&self, invocation: &Invocation) -> Result<Option<i32>> {
        (**self).stream(invocation).await
    }
}

/// Runs invocations as real child processes via `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", invocation.display());

        let output = invocation
            .to_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CoreError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn stream(&self, invocation: &Invocation) -> Result<Option<i32>> {
        tracing::debug!("Streaming: {}", invocation.display());

        let mut child = invocation
            .to_command()
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CoreError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let status = child.wait().await?;
        Ok(status.code())
    }
}
