use crate::error::ShellError;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Session state handed to every command the shell runs.
///
/// The environment contains:
/// - `vars`: variable overrides layered on top of the live process environment.
/// - `current_dir`: the shell's working directory, changed only by `cd`.
/// - `should_exit`: set by `exit`; the REPL loop stops once it is true.
///
/// The shell never changes the process working directory. Children are
/// spawned in `current_dir` instead, so tests can build an `Environment`
/// by hand without touching process-wide state.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Overrides for environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the process working directory into a new `Environment`.
    ///
    /// No variables are copied: lookups fall through to the process
    /// environment each time, so `PATH` is always read fresh.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(current_dir)
    }

    /// An environment rooted at `current_dir` with no overrides.
    pub fn with_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The search path as currently configured, or an empty string when
    /// `PATH` is unset.
    pub fn search_path(&self) -> String {
        self.get_var("PATH").unwrap_or_default()
    }

    /// Resolve the user's home directory from `HOME`.
    pub fn home_dir(&self) -> Result<PathBuf, ShellError> {
        match self.get_var("HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
            _ => Err(ShellError::HomeNotSet),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
