use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
/// Everything a command prints, including its error messages, goes to `stdout`.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that creates a command from its argument sequence.
///
/// Each builtin registers one factory under its name. Factories live in a
/// process-wide registry, hence the `Send + Sync` bound.
pub trait CommandFactory: Send + Sync {
    /// Name the created command answers to.
    fn name(&self) -> &'static str;

    /// Create a command instance for the provided arguments.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
