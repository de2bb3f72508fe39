//! Host I/O abstractions for `print` and `input`.
//!
//! The evaluator never touches stdout or stdin directly; it goes through
//! the [`PrintWriter`] and [`InputReader`] traits so hosts can capture or
//! redirect console traffic. The default implementations ([`StdPrint`],
//! [`StdInput`]) talk to the real process streams.

use std::{
    borrow::Cow,
    collections::VecDeque,
    io::{self, BufRead as _, Write as _},
};

/// Trait for handling output from `print` statements.
///
/// Implement this trait to capture or redirect print output. The default
/// implementation [`StdPrint`] writes to stdout.
pub trait PrintWriter {
    /// Called once for each formatted argument passed to `print`.
    ///
    /// This method writes only the given argument's text; separators (such
    /// as spaces) and the final terminator (such as a newline) are emitted
    /// via [`Self::stdout_push`].
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()>;

    /// Adds a single character to stdout.
    ///
    /// Generally called to add spaces and newlines within print output.
    fn stdout_push(&mut self, end: char) -> io::Result<()>;
}

/// Trait for supplying lines to `input` expressions.
pub trait InputReader {
    /// Reads one line, without its trailing newline.
    ///
    /// Returns `Ok(None)` when the input source is exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Default `PrintWriter` that writes to the process stdout.
///
/// Output is flushed eagerly so that `input` prompts (which carry no
/// newline) appear before the evaluator blocks on stdin.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()
    }

    fn stdout_push(&mut self, end: char) -> io::Result<()> {
        let mut buffer = [0u8; 4];
        let mut stdout = io::stdout().lock();
        stdout.write_all(end.encode_utf8(&mut buffer).as_bytes())?;
        stdout.flush()
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> io::Result<()> {
        self.0.push_str(&output);
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> io::Result<()> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
///
/// Useful for suppressing print output during testing or benchmarking.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> io::Result<()> {
        Ok(())
    }

    fn stdout_push(&mut self, _end: char) -> io::Result<()> {
        Ok(())
    }
}

/// Default `InputReader` over the process stdin, one line at a time.
#[derive(Debug, Default)]
pub struct StdInput;

impl InputReader for StdInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// An `InputReader` seeded with a fixed sequence of lines.
///
/// Useful for testing programs that read from stdin.
#[derive(Debug, Default)]
pub struct QueuedInput(VecDeque<String>);

impl QueuedInput {
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl InputReader for QueuedInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

/// An `InputReader` that is always exhausted.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputReader for NoInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(None)
    }
}
