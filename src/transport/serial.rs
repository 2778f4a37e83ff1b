//! Serial transport over the process's standard input and output
//!
//! Suited to `target remote | gdbstub serial` style pipes or a terminal
//! line attached to stdio. Needs no setup, so it has no initializer and
//! any trailing arguments are ignored.

use super::Transport;
use crate::error::Result;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, Stdin, Stdout};

/// Registered name
pub const NAME: &str = "serial";

/// Serial transport (stdio)
pub struct SerialTransport {
    input: Stdin,
    output: Stdout,
}

impl SerialTransport {
    /// Create a serial transport on stdio
    pub fn new() -> Self {
        Self {
            input: tokio::io::stdin(),
            output: tokio::io::stdout(),
        }
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.input.read(buf).await?)
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.output.write_all(data).await?;
        self.output.flush().await?;
        Ok(())
    }
}
