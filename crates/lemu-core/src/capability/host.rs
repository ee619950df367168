//! Host capabilities reachable from native handlers.
//!
//! The VM never touches process I/O itself; every effect goes through a
//! [`Host`] supplied by the embedder.

use std::collections::VecDeque;

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::VmResult;

pub trait Host: Send {
    /// Emit one line of output
    fn write_line(&mut self, text: &str) -> VmResult<()>;

    /// Wait for one line of input; `None` once input is exhausted
    fn read_line(&mut self) -> BoxFuture<'_, VmResult<Option<String>>>;

    /// Set the window or session title
    fn set_title(&mut self, title: &str) -> VmResult<()>;
}

/// In-memory host: scripted input, captured output.
#[derive(Debug, Default, Clone)]
pub struct BufferedHost {
    input: VecDeque<String>,
    output: Vec<String>,
    title: Option<String>,
}

impl BufferedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose `read_line` yields `lines` in order
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferedHost {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl Host for BufferedHost {
    fn write_line(&mut self, text: &str) -> VmResult<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> BoxFuture<'_, VmResult<Option<String>>> {
        future::ready(Ok(self.input.pop_front())).boxed()
    }

    fn set_title(&mut self, title: &str) -> VmResult<()> {
        self.title = Some(title.to_string());
        Ok(())
    }
}
