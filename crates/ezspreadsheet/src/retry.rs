//! What to do when the target file is held open by another program at save time.

use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try the save again (the caller believes the lock is gone).
    Retry,
    /// Give up; the session reports `Error::ResourceLocked`.
    Abort,
}

/// Called with the target path each time a save hits a lock.
pub type LockHandler = Box<dyn FnMut(&Path) -> RetryDecision>;

/// Default handler: never block, surface the lock as an error.
pub fn abort_on_lock(_path: &Path) -> RetryDecision {
    RetryDecision::Abort
}

/// Block on the terminal until the user closes the file and presses enter.
///
/// Typing `q` (or closing stdin) gives up instead.
pub fn prompt_on_terminal(path: &Path) -> RetryDecision {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    prompt(path, &mut input, &mut io::stderr())
}

fn prompt(path: &Path, input: &mut impl BufRead, output: &mut impl Write) -> RetryDecision {
    let shown = writeln!(output, "File {} is currently open", path.display()).and_then(|_| {
        write!(output, "Please close it and hit enter to save file (q to give up): ")
            .and_then(|_| output.flush())
    });
    if shown.is_err() {
        return RetryDecision::Abort;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => RetryDecision::Abort,
        Ok(_) if line.trim().eq_ignore_ascii_case("q") => RetryDecision::Abort,
        Ok(_) => RetryDecision::Retry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn enter_retries() {
        let mut out = Vec::new();
        let decision = prompt(Path::new("users.xlsx"), &mut Cursor::new("\n"), &mut out);
        assert_eq!(decision, RetryDecision::Retry);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.starts_with("File users.xlsx is currently open"));
    }

    #[test]
    fn q_or_eof_aborts() {
        let path = Path::new("users.xlsx");
        assert_eq!(
            prompt(path, &mut Cursor::new("q\n"), &mut Vec::new()),
            RetryDecision::Abort
        );
        assert_eq!(
            prompt(path, &mut Cursor::new(""), &mut Vec::new()),
            RetryDecision::Abort
        );
    }
}
