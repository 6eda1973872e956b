//! Test and helper transport doubles for rigtel_core.

use std::collections::VecDeque;
use std::time::Duration;

use rigtel_traits::Transport;

/// A transport that never has data; reads error. Useful when driving a
/// buffer directly or exercising the no-data idle path.
pub struct NoopTransport;

impl Transport for NoopTransport {
    fn has_data(&mut self) -> bool {
        false
    }

    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop transport")))
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Feeds a fixed script of lines in order, then reports no data.
pub struct ScriptedTransport {
    lines: VecDeque<String>,
    closed: bool,
}

impl ScriptedTransport {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for ScriptedTransport {
    fn has_data(&mut self) -> bool {
        !self.closed && !self.lines.is_empty()
    }

    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        match self.lines.pop_front() {
            Some(line) => Ok(line),
            None => Err(Box::new(std::io::Error::other("script exhausted"))),
        }
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.closed = true;
        Ok(())
    }
}
