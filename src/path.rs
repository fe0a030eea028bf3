use log::trace;
use std::path::{Path, PathBuf};

/// Find the first executable named `cmd` in a colon-separated search path.
///
/// Each directory of `search_paths` is joined with `cmd` and checked in order;
/// the first candidate that is an executable regular file wins. Relative
/// entries (an empty entry included) are checked against `cwd`, but the
/// returned path is the plain `dir/cmd` join.
///
/// A missing directory, an unreadable one or a non-executable candidate just
/// means "not here". `None` is a normal negative result.
pub fn find_in_path(search_paths: &str, cmd: &str, cwd: &Path) -> Option<PathBuf> {
    for dir in search_paths.split(':') {
        let path = Path::new(dir).join(cmd);
        trace!("checking {}", path.display());
        if is_executable(&cwd.join(&path)) {
            return Some(path);
        }
    }
    None
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}
