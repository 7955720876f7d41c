use std::sync::Mutex;

use async_trait::async_trait;

use crate::command::{CommandError, CommandRunner, HostCommand};

struct FailureRule {
    program: String,
    arg: Option<String>,
    code: i32,
}

impl FailureRule {
    fn matches(&self, command: &HostCommand) -> bool {
        command.program == self.program
            && self.arg.as_ref().map_or(true, |arg| command.has_arg(arg))
    }
}

/// Records every command instead of running it. Can be told to fail specific commands to
/// simulate a package manager or ansible failing.
#[derive(Default)]
pub struct RecordingCommandRunner {
    commands: Mutex<Vec<HostCommand>>,
    failures: Vec<FailureRule>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any invocation of `program`
    pub fn failing(mut self, program: &str, code: i32) -> Self {
        self.failures.push(FailureRule {
            program: program.to_string(),
            arg: None,
            code,
        });
        self
    }

    /// Fail invocations of `program` that include `arg` as one of their arguments
    pub fn failing_with_arg(mut self, program: &str, arg: &str, code: i32) -> Self {
        self.failures.push(FailureRule {
            program: program.to_string(),
            arg: Some(arg.to_string()),
            code,
        });
        self
    }

    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// The recorded commands rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(ToString::to_string).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.commands().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingCommandRunner {
    async fn run(&self, command: &HostCommand) -> Result<(), CommandError> {
        self.commands.lock().unwrap().push(command.clone());

        match self.failures.iter().find(|rule| rule.matches(command)) {
            Some(rule) => Err(CommandError::NonZeroExit {
                command: command.to_string(),
                code: Some(rule.code),
            }),
            None => Ok(()),
        }
    }
}
