//! Calling out to external programs.
//!
//! Everything the bootstrap tools do to a machine goes through a [`CommandRunner`] so the
//! procedures can be exercised without touching the host.

use std::{fmt, io, process::Stdio, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    task::JoinHandle,
};
use tracing::Instrument;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("`{command}` exited with non-zero exit code {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "(terminated by signal)".to_string()))]
    NonZeroExit { command: String, code: Option<i32> },
    #[error("Failed while waiting for `{command}`: {source}")]
    Wait { command: String, source: io::Error },
}

/// A fully described invocation of an external program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl HostCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
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
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Does any argument equal `needle`
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            write!(f, "{key}={} ", shell_quote(value))?;
        }

        write!(f, "{}", self.program)?;

        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }

        Ok(())
    }
}

fn shell_quote(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || "'\"$`\\{}|&;<>*?!".contains(c));

    if needs_quoting {
        format!("'{}'", value.replace('\'', r"'\''"))
    } else {
        value.to_string()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion. Anything other than a zero exit status is an error.
    async fn run(&self, command: &HostCommand) -> Result<(), CommandError>;
}

/// Runs commands on the local machine, forwarding their output into the log.
#[derive(Default)]
pub struct SystemCommandRunner;

#[derive(Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

fn forward_lines<R>(name: String, reader: R, stream: OutputStream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let span = tracing::Span::current();

    tokio::spawn(
        async move {
            let mut lines = BufReader::new(reader).lines();

            while let Some(line) = lines.next_line().await.unwrap_or(None) {
                match stream {
                    OutputStream::Stdout => tracing::info!("{name}: {line}"),
                    OutputStream::Stderr => tracing::warn!("{name}: {line}"),
                }
            }
        }
        .instrument(span),
    )
}

/// Returns false if the forwarder did not run to completion
async fn join_forwarder(command_line: &str, forwarder: JoinHandle<()>) -> bool {
    match forwarder.await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Output forwarder for `{command_line}` exited: {e}");
            false
        }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &HostCommand) -> Result<(), CommandError> {
        let command_line = command.to_string();
        tracing::info!("Running `{command_line}`");

        let mut child = tokio::process::Command::new(&command.program)
            .kill_on_drop(true)
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let forwarders = [
            child
                .stdout
                .take()
                .map(|stdout| forward_lines(command.program.clone(), stdout, OutputStream::Stdout)),
            child
                .stderr
                .take()
                .map(|stderr| forward_lines(command.program.clone(), stderr, OutputStream::Stderr)),
        ];

        let status = child.wait().await.map_err(|source| CommandError::Wait {
            command: command_line.clone(),
            source,
        })?;

        // Let the last lines of output reach the log before reporting the exit
        for forwarder in forwarders.into_iter().flatten() {
            join_forwarder(&command_line, forwarder).await;
        }

        if status.success() {
            tracing::debug!("`{command_line}` exited successfully");
            Ok(())
        } else {
            Err(CommandError::NonZeroExit {
                command: command_line,
                code: status.code(),
            })
        }
    }
}

/// Logs every command instead of running it.
#[derive(Default)]
pub struct DryRunCommandRunner;

#[async_trait]
impl CommandRunner for DryRunCommandRunner {
    async fn run(&self, command: &HostCommand) -> Result<(), CommandError> {
        tracing::info!("Dry run, would run `{command}`");
        Ok(())
    }
}

pub fn command_runner(dry_run: bool) -> Arc<dyn CommandRunner> {
    if dry_run {
        Arc::new(DryRunCommandRunner)
    } else {
        Arc::new(SystemCommandRunner)
    }
}
