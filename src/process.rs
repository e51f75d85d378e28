//! External tool invocation
//!
//! Every collaborator (gem, bundle, rake) runs through [`ToolCommand`],
//! which streams combined output into the build log with each line
//! indented under the current topic.

use crate::error::{GantryError, GantryResult};
use crate::ui;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

/// A single external command with an explicit working directory and
/// explicit environment additions. Tool locations are always passed in
/// by the orchestrator; nothing here mutates the gantry process
/// environment.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
    env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
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

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((name.into(), value.into()));
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

    /// Human-readable form for logs and errors.
    pub fn display(&self) -> String {
        let name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string());
        if self.args.is_empty() {
            name
        } else {
            format!("{} {}", name, self.args.join(" "))
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        for (name, value) in &self.env {
            cmd.env(name, value);
        }
        cmd
    }

    /// Run the command, streaming stdout and stderr into the build log.
    /// A nonzero exit aborts the build.
    pub async fn stream(self) -> GantryResult<()> {
        debug!("Executing: {} in {}", self.display(), self.cwd.display());

        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GantryError::command_failed(self.display(), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tokio::join!(indent_lines(stdout), indent_lines(stderr));

        let status = child
            .wait()
            .await
            .map_err(|e| GantryError::command_failed(self.display(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(GantryError::CommandExited {
                command: self.display(),
                code: status.code().unwrap_or(-1),
            })
        }
    }

    /// Run the command silently and report whether it exited zero.
    /// A command that cannot be spawned counts as a failure.
    pub async fn succeeds(self) -> bool {
        debug!("Probing: {} in {}", self.display(), self.cwd.display());

        self.command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Copy lines from a child pipe into the build log, indented.
async fn indent_lines<R: AsyncRead + Unpin>(pipe: Option<R>) {
    let Some(pipe) = pipe else {
        return;
    };
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        ui::detail(&line);
    }
}
