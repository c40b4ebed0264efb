//! Console rendering of agent responses
//!
//! Complete responses are written as one block. Streamed responses are
//! written fragment by fragment, flushing after each, and end with a single
//! newline once the stream is exhausted.

use std::io::{self, Stdout, Write};

use futures::StreamExt;

use crate::{agent::ResponseStream, protocol::error::AgentError};

/// Writes agent output to a sink
#[derive(Debug)]
pub struct Renderer<W: Write = Stdout> {
    out: W,
}

impl Renderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the renderer and return the sink
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Echo the message sent to the agent
    pub fn user_message(&mut self, text: &str) -> Result<(), AgentError> {
        writeln!(self.out, "User message:  {}", text)?;
        Ok(())
    }

    /// Write a complete response, preceded by its label on its own line
    pub fn complete(&mut self, label: Option<&str>, text: &str) -> Result<(), AgentError> {
        if let Some(label) = label {
            writeln!(self.out, "{}", label)?;
        }
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    /// Write a streamed response as it arrives
    ///
    /// Empty fragments are skipped. The line is terminated even when the
    /// stream fails part way.
    ///
    /// # Returns
    ///
    /// The concatenated text of all fragments
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields, or an I/O error from the sink
    pub async fn stream(
        &mut self,
        label: Option<&str>,
        mut updates: ResponseStream,
    ) -> Result<String, AgentError> {
        if let Some(label) = label {
            write!(self.out, "{} ", label)?;
            self.out.flush()?;
        }

        let mut text = String::new();
        while let Some(update) = updates.next().await {
            let update = match update {
                Ok(update) => update,
                Err(e) => {
                    writeln!(self.out)?;
                    return Err(e);
                }
            };

            if update.is_empty() {
                continue;
            }

            write!(self.out, "{}", update.text())?;
            self.out.flush()?;
            text.push_str(update.text());
        }

        writeln!(self.out)?;
        self.out.flush()?;
        Ok(text)
    }
}
