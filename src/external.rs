use crate::command::{ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::path::{find_in_path, is_executable};
use anyhow::Result;
use log::debug;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Command that is not a builtin.
///
/// All arguments reach the child as one pre-joined argv entry: `ls -l -a`
/// runs `ls` with the single argument `"-l -a"`. An empty argument string
/// passes no argument at all.
pub struct ExternalCommand {
    name: String,
    args: String,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
        }
    }

    /// Locate the program the way `execvp` would: names with a slash are
    /// paths, anything else is searched in `PATH`.
    fn locate(&self, env: &Environment) -> Option<PathBuf> {
        if self.name.contains('/') {
            let path = env.current_dir.join(&self.name);
            return is_executable(&path).then_some(path);
        }
        let found = find_in_path(&env.search_path(), &self.name, &env.current_dir)?;
        Some(env.current_dir.join(found))
    }

    fn spawn(&self, program: &Path, env: &Environment) -> io::Result<(Child, io::PipeReader)> {
        let (reader, writer) = io::pipe()?;
        let mut cmd = Command::new(program);
        if !self.args.is_empty() {
            cmd.arg(&self.args);
        }
        cmd.envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        let child = cmd.spawn()?;
        // `cmd` still owns the write ends; dropping it lets the reader see EOF.
        drop(cmd);
        Ok((child, reader))
    }

    /// Runs the child to completion and returns its interleaved stdout and
    /// stderr together with its status.
    fn run(&self, program: &Path, env: &Environment) -> io::Result<(Vec<u8>, ExitStatus)> {
        let (mut child, mut reader) = self.spawn(program, env)?;
        let mut output = Vec::new();
        let read = reader.read_to_end(&mut output);
        let status = child.wait()?;
        read?;
        Ok((output, status))
    }

    fn execute_inner(&self, stdout: &mut dyn Write, env: &Environment) -> Result<ExitCode> {
        let program = self
            .locate(env)
            .ok_or_else(|| ShellError::CommandNotFound(self.name.clone()))?;
        debug!("running {} with args {:?}", program.display(), self.args);

        let (output, status) = self.run(&program, env).map_err(|source| ShellError::Spawn {
            program: self.name.clone(),
            source,
        })?;
        debug!("{} finished: {status}", self.name);

        match status.code() {
            Some(0) => {
                let text = String::from_utf8_lossy(&output);
                writeln!(stdout, "{}", text.trim_end())?;
                Ok(0)
            }
            Some(code) => Err(ShellError::ExitStatus(code).into()),
            None => Err(terminated_by_signal(status).into()),
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let result = self.execute_inner(stdout, env);
        error::report(result, stdout)
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ShellError {
    use std::os::unix::process::ExitStatusExt;
    match exit_status.signal() {
        Some(signal) => ShellError::Signal(signal),
        None => ShellError::ExitStatus(-1),
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ShellError {
    ShellError::ExitStatus(-1)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    fn env_with_path(cwd: &Path, path: &Path) -> Environment {
        let mut env = Environment::with_dir(cwd);
        env.set_var("PATH", format!("{}:/bin:/usr/bin", path.display()));
        env
    }

    fn run(cmd: ExternalCommand, env: &mut Environment) -> (String, ExitCode) {
        let mut out = Vec::new();
        let code = Box::new(cmd).execute(&mut out, env).unwrap();
        (String::from_utf8(out).unwrap(), code)
    }

    #[test]
    fn unknown_command_is_reported() {
        let bin = TempDir::new().unwrap();
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, code) = run(ExternalCommand::new("foobar_nope", ""), &mut env);

        assert_eq!(s, "foobar_nope: command not found\n");
        assert_eq!(code, 127);
    }

    #[test]
    fn output_is_trimmed_and_terminated() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "hello", "printf 'hi there\\n\\n  \\n'");
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, code) = run(ExternalCommand::new("hello", ""), &mut env);

        assert_eq!(code, 0);
        assert_eq!(s, "hi there\n");
    }

    #[test]
    fn joined_arguments_arrive_as_one_token() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "argc", "echo \"$#:$1\"");
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, _) = run(ExternalCommand::new("argc", "a b c"), &mut env);
        assert_eq!(s, "1:a b c\n");

        let (s, _) = run(ExternalCommand::new("argc", ""), &mut env);
        assert_eq!(s, "0:\n");
    }

    #[test]
    fn stderr_is_captured_with_stdout() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "both", "echo out\necho err 1>&2");
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, code) = run(ExternalCommand::new("both", ""), &mut env);

        assert_eq!(code, 0);
        assert_eq!(s, "out\nerr\n");
    }

    #[test]
    fn non_zero_exit_prints_status() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "fails", "echo ignored\nexit 3");
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, code) = run(ExternalCommand::new("fails", ""), &mut env);

        assert_eq!(s, "exit status 3\n");
        assert_eq!(code, 3);
    }

    #[test]
    fn child_runs_in_shell_directory() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        script(bin.path(), "where", "pwd -P");
        let cwd = fs::canonicalize(work.path()).unwrap();
        let mut env = env_with_path(&cwd, bin.path());

        let (s, _) = run(ExternalCommand::new("where", ""), &mut env);

        assert_eq!(s, format!("{}\n", cwd.display()));
    }

    #[test]
    fn overrides_reach_the_child() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "show", "echo \"$GREETING\"");
        let mut env = env_with_path(bin.path(), bin.path());
        env.set_var("GREETING", "hello");

        let (s, _) = run(ExternalCommand::new("show", ""), &mut env);

        assert_eq!(s, "hello\n");
    }

    #[test]
    fn relative_path_is_resolved_against_shell_directory() {
        let work = TempDir::new().unwrap();
        script(work.path(), "local", "echo local");
        let mut env = env_with_path(work.path(), Path::new("/nonexistent"));

        let (s, _) = run(ExternalCommand::new("./local", ""), &mut env);
        assert_eq!(s, "local\n");

        let (s, code) = run(ExternalCommand::new("local", ""), &mut env);
        assert_eq!(s, "local: command not found\n");
        assert_eq!(code, 127);
    }

    #[test]
    fn non_executable_file_is_not_run() {
        let bin = TempDir::new().unwrap();
        fs::write(bin.path().join("plain"), "echo nope\n").unwrap();
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, _) = run(ExternalCommand::new("plain", ""), &mut env);

        assert_eq!(s, "plain: command not found\n");
    }

    #[test]
    fn signal_is_reported() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "suicide", "kill -9 $$");
        let mut env = env_with_path(bin.path(), bin.path());

        let (s, code) = run(ExternalCommand::new("suicide", ""), &mut env);

        assert_eq!(s, "signal: 9\n");
        assert_eq!(code, 137);
    }
}
