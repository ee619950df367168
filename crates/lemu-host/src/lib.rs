//! Lemu - Console Host
//!
//! Binds the interpreter's host capabilities to a line-oriented console:
//! an async line reader for `ReadLine` and a plain writer for output.

use std::io::{self, Write};

use futures::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::{debug, trace};

use lemu_core::{Host, VmResult};

/// Console-backed host.
///
/// Lines are read from `R` without their terminator; end of input reads as
/// `None`. Titles are remembered and, when enabled, sent to the writer as
/// an OSC 0 escape.
#[derive(Debug)]
pub struct ConsoleHost<R, W> {
    reader: R,
    writer: W,
    title: Option<String>,
    emit_title: bool,
}

impl ConsoleHost<BufReader<Stdin>, io::Stdout> {
    /// Host over the process's stdin and stdout
    pub fn stdio() -> Self {
        ConsoleHost::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R, W> ConsoleHost<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        ConsoleHost {
            reader,
            writer,
            title: None,
            emit_title: false,
        }
    }

    /// Write the terminal title escape on `set_title`
    pub fn with_title_escape(mut self, enabled: bool) -> Self {
        self.emit_title = enabled;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn trim_line_ending(line: &mut String) {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
}

impl<R, W> Host for ConsoleHost<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    fn write_line(&mut self, text: &str) -> VmResult<()> {
        writeln!(self.writer, "{}", text)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> BoxFuture<'_, VmResult<Option<String>>> {
        async move {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).await?;
            if read == 0 {
                debug!("console input closed");
                return Ok(None);
            }
            trim_line_ending(&mut line);
            trace!(len = line.len(), "console line read");
            Ok(Some(line))
        }
        .boxed()
    }

    fn set_title(&mut self, title: &str) -> VmResult<()> {
        if self.emit_title {
            write!(self.writer, "\x1b]0;{}\x07", title)?;
            self.writer.flush()?;
        }
        self.title = Some(title.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_are_stripped() {
        for raw in ["abc\n", "abc\r\n", "abc"] {
            let mut line = raw.to_string();
            trim_line_ending(&mut line);
            assert_eq!(line, "abc");
        }
    }

    #[test]
    fn title_escape_is_opt_in() {
        let mut quiet = ConsoleHost::new(&b""[..], Vec::new());
        quiet.set_title("lemu").unwrap();
        assert_eq!(quiet.title(), Some("lemu"));
        assert!(quiet.writer().is_empty());

        let mut loud = ConsoleHost::new(&b""[..], Vec::new()).with_title_escape(true);
        loud.set_title("lemu").unwrap();
        assert_eq!(loud.into_writer(), b"\x1b]0;lemu\x07".to_vec());
    }
}
