//! Command execution
//!
//! This module handles executing the shell commands of moanfile tasks.

use crate::config;
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{interpolate, CommandContext};
use std::process::Stdio;
use tokio::process::Command as ProcessCommand;

/// Runtime representation of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Simple command string
    Simple(String),

    /// Complex command with options
    Complex {
        exec: String,
        print: String,
        quiet: bool,
        dir: Option<String>,
    },
}

impl Command {
    /// Create from config
    pub fn from_config(config: config::Command) -> Self {
        match config {
            config::Command::Simple(cmd) => Command::Simple(cmd),
            config::Command::Complex(detail) => Command::Complex {
                print: detail.print.clone().unwrap_or_else(|| detail.exec.clone()),
                exec: detail.exec,
                quiet: detail.quiet,
                dir: detail.dir,
            },
        }
    }

    /// The same command with its echo suppressed
    pub fn quieted(self) -> Self {
        match self {
            Command::Simple(exec) => Command::Complex {
                print: exec.clone(),
                exec,
                quiet: true,
                dir: None,
            },
            Command::Complex {
                exec, print, dir, ..
            } => Command::Complex {
                exec,
                print,
                quiet: true,
                dir,
            },
        }
    }

    /// Get the command to execute
    pub fn exec(&self) -> &str {
        match self {
            Command::Simple(cmd) => cmd,
            Command::Complex { exec, .. } => exec,
        }
    }

    /// Get what to print
    pub fn print(&self) -> &str {
        match self {
            Command::Simple(cmd) => cmd,
            Command::Complex { print, .. } => print,
        }
    }

    pub fn is_quiet(&self) -> bool {
        match self {
            Command::Simple(_) => false,
            Command::Complex { quiet, .. } => *quiet,
        }
    }

    /// Get the working directory, relative to the context's
    pub fn dir(&self) -> Option<&str> {
        match self {
            Command::Simple(_) => None,
            Command::Complex { dir, .. } => dir.as_deref(),
        }
    }
}

/// Execute a command through the context's interpreter
pub async fn execute_command(cmd: &Command, ctx: &CommandContext) -> ExecutionResult<()> {
    let exec_str = interpolate(cmd.exec(), &ctx.vars).map_err(|e| ExecutionError::InvalidValue {
        name: "command".to_string(),
        error: e.to_string(),
    })?;

    if !cmd.is_quiet() {
        let print_str =
            interpolate(cmd.print(), &ctx.vars).unwrap_or_else(|_| cmd.print().to_string());
        ctx.logger.command(&print_str);
    }

    let working_dir = match cmd.dir() {
        Some(dir) => {
            let dir = interpolate(dir, &ctx.vars).map_err(|e| ExecutionError::InvalidValue {
                name: "dir".to_string(),
                error: e.to_string(),
            })?;
            ctx.working_dir.join(dir)
        }
        None => ctx.working_dir.clone(),
    };

    let (program, interpreter_args) = ctx
        .interpreter
        .split_first()
        .ok_or(ExecutionError::EmptyInterpreter)?;

    let mut command = ProcessCommand::new(program);
    command
        .args(interpreter_args)
        .arg(&exec_str)
        .current_dir(&working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .envs(&ctx.vars);

    let status = command
        .status()
        .await
        .map_err(|error| ExecutionError::Spawn {
            program: program.clone(),
            error,
        })?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed(status.code()));
    }

    Ok(())
}

/// Execute commands one after another, stopping at the first failure
pub async fn execute_commands(commands: &[Command], ctx: &CommandContext) -> ExecutionResult<()> {
    for cmd in commands {
        execute_command(cmd, ctx).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{Logger, Verbosity};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn quiet_context() -> CommandContext {
        CommandContext::new().with_logger(Logger::new(Verbosity::Silent, false))
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let ctx = quiet_context();
        let cmd = Command::Simple("echo test".to_string());

        assert!(execute_command(&cmd, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_command_with_variables() {
        let temp_dir = TempDir::new().unwrap();
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "world".to_string());

        let ctx = quiet_context()
            .with_vars(vars)
            .with_working_dir(temp_dir.path().to_path_buf());
        let cmd = Command::Simple("echo ${name} > out.txt".to_string());

        execute_command(&cmd, &ctx).await.unwrap();
        let written = std::fs::read_to_string(temp_dir.path().join("out.txt")).unwrap();
        assert_eq!(written.trim(), "world");
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let ctx = quiet_context();
        let cmd = Command::Simple("exit 3".to_string());

        let result = execute_command(&cmd, &ctx).await;
        assert!(matches!(result, Err(ExecutionError::CommandFailed(Some(3)))));
    }

    #[tokio::test]
    async fn test_execute_in_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let ctx = quiet_context().with_working_dir(temp_dir.path().to_path_buf());
        let cmd = Command::Complex {
            exec: "touch marker".to_string(),
            print: "touch marker".to_string(),
            quiet: true,
            dir: Some("sub".to_string()),
        };

        execute_command(&cmd, &ctx).await.unwrap();
        assert!(temp_dir.path().join("sub/marker").exists());
    }

    #[tokio::test]
    async fn test_empty_interpreter() {
        let ctx = quiet_context().with_interpreter(Vec::new());
        let cmd = Command::Simple("true".to_string());

        let result = execute_command(&cmd, &ctx).await;
        assert!(matches!(result, Err(ExecutionError::EmptyInterpreter)));
    }

    #[tokio::test]
    async fn test_execute_commands_stops_at_failure() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = quiet_context().with_working_dir(temp_dir.path().to_path_buf());
        let commands = vec![
            Command::Simple("false".to_string()),
            Command::Simple("touch never".to_string()),
        ];

        assert!(execute_commands(&commands, &ctx).await.is_err());
        assert!(!temp_dir.path().join("never").exists());
    }

    #[test]
    fn test_quieted() {
        let cmd = Command::Simple("make".to_string()).quieted();
        assert!(cmd.is_quiet());
        assert_eq!(cmd.exec(), "make");
        assert_eq!(cmd.print(), "make");
    }
}
