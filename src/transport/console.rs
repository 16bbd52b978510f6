//! Line-oriented console transport
//!
//! Each input line is one chat message: `<chat_id> <user> <text>`, where
//! `<user>` is `username#telegram_id` or a bare name for a user without a
//! transport id. Replies are written as `[<chat_id>] <text>`.
//!
//! Stdin is read on a detached thread so runtime shutdown never waits on a
//! pending read.

use crate::transport::{ChatTransport, IncomingMessage, Reply};
use crate::types::{ChatId, Identity};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Read};
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream,
    Lines, Stdout,
};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Bytes buffered between the reader thread and the transport
const READER_BUFFER_BYTES: usize = 64 * 1024;

/// Chat transport reading messages from a line stream
pub struct ConsoleTransport<R, W> {
    lines: Mutex<Lines<R>>,
    output: Mutex<W>,
}

impl ConsoleTransport<BufReader<DuplexStream>, Stdout> {
    /// Console transport over the process's stdin and stdout
    ///
    /// Must be called from within a Tokio runtime.
    pub fn stdio() -> Self {
        Self::new(
            BufReader::new(spawn_reader_thread(std::io::stdin())),
            io::stdout(),
        )
    }
}

/// Copy a blocking reader into an async stream from a detached thread
///
/// The stream ends when the reader hits end of input or fails. The thread
/// exits once the returned stream is dropped and the next read completes.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_reader_thread<R>(mut input: R) -> DuplexStream
where
    R: Read + Send + 'static,
{
    let (reader, mut writer) = io::duplex(READER_BUFFER_BYTES);
    let handle = Handle::current();

    let spawned = std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let mut buffer = [0u8; 4096];
            loop {
                let read = match input.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(read) => read,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("Console input failed: {}", e);
                        break;
                    }
                };
                if handle.block_on(writer.write_all(&buffer[..read])).is_err() {
                    debug!("Console transport dropped, stopping input thread");
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        error!("Failed to start console input thread: {}", e);
    }

    reader
}

impl<R, W> ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: Mutex::new(input.lines()),
            output: Mutex::new(output),
        }
    }

    /// Consume the transport, returning the output sink
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

/// Parse one console line into a message
pub fn parse_line(line: &str) -> Result<IncomingMessage> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);

    let chat_id: ChatId = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("missing chat id"))?
        .parse()
        .context("chat id must be an integer")?;
    let user = parts.next().ok_or_else(|| anyhow!("missing user"))?;
    let text = parts.next().unwrap_or_default().trim().to_string();

    let sender = match user.rsplit_once('#') {
        Some((username, id)) => {
            let telegram_id = id
                .parse()
                .with_context(|| format!("invalid telegram id in '{}'", user))?;
            Identity::user(telegram_id, Some(username.to_string()), None)
        }
        None => Identity::named(user),
    };

    Ok(IncomingMessage {
        chat_id,
        sender,
        text,
    })
}

#[async_trait]
impl<R, W> ChatTransport for ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_message(&self) -> Result<Option<IncomingMessage>> {
        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines.next_line().await? else {
                debug!("Console input closed");
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => warn!("Skipping malformed console line {:?}: {}", line, e),
            }
        }
    }

    async fn send(&self, chat_id: ChatId, reply: &Reply) -> Result<()> {
        let mut output = self.output.lock().await;
        output
            .write_all(format!("[{}] {}\n", chat_id, reply.text).as_bytes())
            .await?;
        output.flush().await?;
        Ok(())
    }
}
