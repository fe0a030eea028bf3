//! Splitting of a raw input line into a command name and its arguments.
//!
//! The shell has no quoting, escaping or expansion: a line is cut at every
//! single space, so consecutive spaces produce empty arguments.

/// A tokenized command line: the command name followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// First token of the line.
    pub name: String,
    /// Remaining tokens, in order.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Arguments as borrowed string slices, the form commands consume.
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

/// Split `line` on single-space boundaries.
///
/// Returns `None` for an empty line, which the shell skips without evaluating.
pub fn split_into_tokens(line: &str) -> Option<CommandLine> {
    if line.is_empty() {
        return None;
    }
    let mut tokens = line.split(' ').map(str::to_owned);
    let name = tokens.next()?;
    Some(CommandLine {
        name,
        args: tokens.collect(),
    })
}
