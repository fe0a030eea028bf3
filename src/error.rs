//! User-visible failures of the shell.
//!
//! The `Display` text of every variant is exactly the line the shell prints,
//! so callers only need `writeln!(out, "{err}")`.

use crate::command::ExitCode;
use std::io::{self, Write};

/// Errors a single evaluated line can produce.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Neither a builtin nor an executable reachable through `PATH`.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// `type` could not classify the name.
    #[error("{0}: not found")]
    NotFound(String),

    /// `cd` could not switch to the target.
    #[error("cd: {0}: No such file or directory")]
    NoSuchDirectory(String),

    #[error("$HOME is not defined")]
    HomeNotSet,

    /// The child ran but reported a non-zero status.
    #[error("exit status {0}")]
    ExitStatus(i32),

    /// The child was terminated by a signal.
    #[error("signal: {0}")]
    Signal(i32),

    /// The child could not be started or waited on.
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    /// Status code reported for this failure, following the usual shell
    /// conventions (127 not found, 126 not runnable, 128+n for signals).
    pub fn status(&self) -> i32 {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::Spawn { .. } => 126,
            ShellError::ExitStatus(code) => *code,
            ShellError::Signal(signal) => 128 + signal,
            ShellError::NotFound(_) | ShellError::NoSuchDirectory(_) | ShellError::HomeNotSet => 1,
        }
    }
}

/// Renders a command's `ShellError` as one output line and turns it into the
/// command's status. Other errors (a broken output sink) pass through.
pub(crate) fn report(
    result: anyhow::Result<ExitCode>,
    stdout: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    match result {
        Ok(code) => Ok(code),
        Err(e) => match e.downcast::<ShellError>() {
            Ok(err) => {
                writeln!(stdout, "{err}")?;
                Ok(err.status())
            }
            Err(e) => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_found_display() {
        let e = ShellError::CommandNotFound("foobar".into());
        assert_eq!(format!("{e}"), "foobar: command not found");
        assert_eq!(e.status(), 127);
    }

    #[test]
    fn no_such_directory_display() {
        let e = ShellError::NoSuchDirectory("/does/not/exist".into());
        assert_eq!(
            format!("{e}"),
            "cd: /does/not/exist: No such file or directory"
        );
    }

    #[test]
    fn exit_status_display() {
        let e = ShellError::ExitStatus(2);
        assert_eq!(format!("{e}"), "exit status 2");
        assert_eq!(e.status(), 2);
    }

    #[test]
    fn signal_status_is_offset() {
        assert_eq!(ShellError::Signal(9).status(), 137);
    }

    #[test]
    fn spawn_error_includes_program() {
        let e = ShellError::Spawn {
            program: "./script".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(format!("{e}"), "./script: permission denied");
    }

    #[test]
    fn report_prints_shell_errors_once() {
        let mut out = Vec::new();
        let code = report(Err(ShellError::NotFound("x".into()).into()), &mut out).unwrap();
        assert_eq!(code, 1);
        assert_eq!(out, b"x: not found\n");
    }

    #[test]
    fn report_passes_success_through() {
        let mut out = Vec::new();
        assert_eq!(report(Ok(3), &mut out).unwrap(), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn report_propagates_other_errors() {
        let mut out = Vec::new();
        let res = report(Err(anyhow::anyhow!("broken pipe")), &mut out);
        assert!(res.is_err());
        assert!(out.is_empty());
    }
}
