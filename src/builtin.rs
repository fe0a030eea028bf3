use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::path::find_in_path;
use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::LazyLock;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are executed directly in-process without spawning a child process.
/// They receive their arguments exactly as tokenized; there is no option parsing,
/// so `echo --help` prints `--help`.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Builds the command from its raw argument sequence.
    fn from_args(args: &[&str]) -> Self;

    /// Executes the command using the provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let result = <T as BuiltinCommand>::execute(*self, stdout, env);
        error::report(result, stdout)
    }
}

/// Creates instances of one builtin type.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        Box::new(T::from_args(args))
    }
}

static BUILTINS: LazyLock<BuiltinRegistry> = LazyLock::new(BuiltinRegistry::default);

/// Fixed table of the commands implemented inside the shell.
///
/// Built once on first use and never modified afterwards. The interpreter
/// dispatches through it and `type` classifies names with it.
pub struct BuiltinRegistry {
    factories: BTreeMap<&'static str, Box<dyn CommandFactory>>,
}

impl BuiltinRegistry {
    /// The registry shared by the whole process.
    pub fn global() -> &'static BuiltinRegistry {
        &BUILTINS
    }

    fn register<T: BuiltinCommand + 'static>(mut self) -> Self {
        let factory = Factory::<T>::default();
        self.factories.insert(factory.name(), Box::new(factory));
        self
    }

    /// Whether `name` is a builtin.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the builtin called `name`, if there is one.
    pub fn create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        self.factories.get(name).map(|factory| factory.create(args))
    }
}

impl Default for BuiltinRegistry {
    /// The five builtins: `exit`, `echo`, `type`, `pwd`, `cd`.
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
        .register::<Exit>()
        .register::<Echo>()
        .register::<Type>()
        .register::<Pwd>()
        .register::<Cd>()
    }
}

/// Print the current working directory to standard output.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_args(_args: &[&str]) -> Self {
        Pwd
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// All arguments are glued together without a separator to form the target,
/// so `cd a b` tries `ab`. A target of exactly `~` means the home directory.
pub struct Cd {
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[&str]) -> Self {
        Cd {
            target: args.concat(),
        }
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let mut target = self.target;
        if target == "~" {
            match env.home_dir() {
                Ok(home) => target = home.to_string_lossy().into_owned(),
                // Report and still attempt the unresolved `~`.
                Err(e) => writeln!(stdout, "{e}")?,
            }
        }

        if target.is_empty() {
            return Err(ShellError::NoSuchDirectory(target).into());
        }

        let new_dir = env.current_dir.join(&target);
        let canonical = match fs::canonicalize(&new_dir) {
            Ok(dir) if dir.is_dir() => dir,
            _ => return Err(ShellError::NoSuchDirectory(target).into()),
        };

        debug!("cd: {} -> {}", env.current_dir.display(), canonical.display());
        env.current_dir = canonical;
        Ok(0)
    }
}

/// Exit the shell.
///
/// The arguments are glued together without a separator; only a result of
/// exactly `"0"` exits successfully, everything else exits with status 1.
pub struct Exit {
    pub status: String,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(args: &[&str]) -> Self {
        Exit {
            status: args.concat(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(if self.status == "0" { 0 } else { 1 })
    }
}

/// Write the arguments to standard output, separated by spaces and followed
/// by a newline.
pub struct Echo {
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn from_args(args: &[&str]) -> Self {
        Echo {
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

/// Describe how each name would be interpreted: builtin, executable on
/// `PATH`, or unknown.
pub struct Type {
    pub names: Vec<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn from_args(args: &[&str]) -> Self {
        Type {
            names: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let mut status = 0;
        for name in self.names {
            if BuiltinRegistry::global().contains(&name) {
                writeln!(stdout, "{name} is a shell builtin")?;
                continue;
            }
            match find_in_path(&env.search_path(), &name, &env.current_dir) {
                Some(path) => writeln!(stdout, "{name} is {}", path.display())?,
                None => {
                    writeln!(stdout, "{}", ShellError::NotFound(name))?;
                    status = 1;
                }
            }
        }
        Ok(status)
    }
}
