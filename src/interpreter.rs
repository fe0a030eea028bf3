use crate::builtin::BuiltinRegistry;
use crate::command::{ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::lexer;
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Prompt printed before every line.
pub const PROMPT: &str = "$ ";

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`] and the [`BuiltinRegistry`]. A name
/// found in the registry always runs the builtin; every other name is handed
/// to [`ExternalCommand`], which reports `command not found` itself.
///
/// Example
/// ```
/// use myshell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh.evaluate("echo hello world", &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: &'static BuiltinRegistry,
}

impl Interpreter {
    /// Create an interpreter over the given environment with the default builtins.
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            builtins: BuiltinRegistry::global(),
        }
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Builtins receive the arguments as they are; external programs receive
    /// them joined with single spaces into one argument.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let cmd: Box<dyn ExecutableCommand> = match self.builtins.create(name, args) {
            Some(builtin) => {
                debug!("builtin {name} {args:?}");
                builtin
            }
            None => {
                debug!("external {name} {args:?}");
                Box::new(ExternalCommand::new(name, args.join(" ")))
            }
        };
        cmd.execute(stdout, &mut self.env)
    }

    /// Tokenize one input line and run it.
    ///
    /// An empty line does nothing and reports success. The returned code is
    /// the command's status; errors only come from writing to `stdout`.
    pub fn evaluate(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let Some(cmd) = lexer::split_into_tokens(line) else {
            return Ok(0);
        };
        debug!("tokens: {:?} {:?}", cmd.name, cmd.args);
        let code = self.run(&cmd.name, &cmd.arg_refs(), stdout)?;
        stdout.flush()?;
        Ok(code)
    }

    /// Read-Eval-Print Loop.
    ///
    /// Prompts with `$ `, evaluates each non-empty line and returns the status
    /// the process should exit with once `exit` runs or input ends. A terminal
    /// gets the `rustyline` editor; piped input is read line by line as raw bytes.
    pub fn repl(&mut self) -> anyhow::Result<ExitCode> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            self.repl_interactive()
        } else {
            self.repl_piped(&mut stdin.lock(), &mut io::stdout())
        }
    }

    fn repl_interactive(&mut self) -> anyhow::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = io::stdout();

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let code = self.evaluate(&line, &mut stdout)?;
                    if self.env.should_exit {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    return self.evaluate("exit", &mut stdout);
                }
                Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!("skipping unreadable line: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The loop for non-terminal input: prints the prompt, reads up to the next
    /// newline and evaluates the line with only that newline removed. Bytes that
    /// are not UTF-8 are replaced rather than rejected.
    pub fn repl_piped(
        &mut self,
        input: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let mut buf = Vec::new();
        loop {
            stdout.write_all(PROMPT.as_bytes())?;
            stdout.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("end of input");
                return self.evaluate("exit", stdout);
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }

            let line = String::from_utf8_lossy(&buf);
            let code = self.evaluate(&line, stdout)?;
            if self.env.should_exit {
                return Ok(code);
            }
        }
    }
}

impl Default for Interpreter {
    /// An interpreter over the current process state.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
