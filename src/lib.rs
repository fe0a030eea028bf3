//! A small interactive shell.
//!
//! Each input line is split on single spaces. The first token either names one
//! of five builtins (`exit`, `echo`, `type`, `pwd`, `cd`) or an external
//! program that is looked up in `PATH`, run to completion, and whose combined
//! output is printed. There is no quoting, expansion, piping or redirection.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and
//! [`env`] expose the traits and session state commands are built on.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
mod lexer;
mod path;

pub use builtin::BuiltinRegistry;
pub use error::ShellError;
pub use external::ExternalCommand;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, PROMPT};
pub use lexer::{CommandLine, split_into_tokens};
pub use path::find_in_path;
