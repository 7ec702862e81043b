use crate::config::{bounded, ClientConfig};
use crate::error::{AltitudeError, Result};
use crate::message::Message;
use crate::protocol::Command;
use crate::types::ClientState;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Observer invoked for every parsed broadcast message
pub(crate) type Callback = Arc<dyn Fn(&Message) + Send + Sync>;

/// One live TCP session: the reader task, the write half and the fan-out
/// channel for its messages
///
/// Dropping the session drops its broadcast sender; the reader task holds
/// the only other clone, so receivers see `Closed` once both are gone.
struct Session {
    generation: u64,
    writer: Arc<tokio::sync::Mutex<OwnedWriteHalf>>,
    reader_task: JoinHandle<()>,
    message_tx: broadcast::Sender<Message>,
}

/// Socket owner shared between the client handle and its reader task
///
/// `state` is written only by the reader task of the installed session.
/// `lifecycle` serialises open and close so at most one session exists. The
/// parking_lot locks are never held across an `.await`.
pub(crate) struct Connection {
    config: ClientConfig,
    state: RwLock<ClientState>,
    callback: Mutex<Option<Callback>>,
    session: Mutex<Option<Session>>,
    lifecycle: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

impl Connection {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ClientState::default()),
            callback: Mutex::new(None),
            session: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn state(&self) -> &RwLock<ClientState> {
        &self.state
    }

    pub fn set_callback(&self, callback: Option<Callback>) {
        *self.callback.lock() = callback;
    }

    /// Receiver for the current session's messages, `None` when closed
    pub fn subscribe(&self) -> Option<broadcast::Receiver<Message>> {
        self.session
            .lock()
            .as_ref()
            .map(|session| session.message_tx.subscribe())
    }

    /// Open the socket, send the `id` handshake and start the reader task
    ///
    /// An existing session is closed first. Nothing is spawned unless the
    /// handshake write succeeds, so an open session always has a running
    /// reader and a sent handshake.
    pub async fn open(self: &Arc<Self>, limit: Option<Duration>) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        if let Err(e) = self.close_session(Some(self.config.disconnect_timeout())).await {
            tracing::debug!(error = %e, "Closing previous session failed");
        }

        let handshake = Command::Id(self.config.client_id.clone());
        handshake.validate()?;

        let addr = self.config.addr();
        tracing::info!(addr = %addr, "Connecting to Altitude");

        let stream = establish(&addr, limit, TcpStream::connect(&addr)).await?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!(addr = %addr, error = %e, "Failed to set TCP_NODELAY");
        }

        let (reader, writer) = stream.into_split();
        let writer = Arc::new(tokio::sync::Mutex::new(writer));

        write_line(&writer, &handshake, Some(self.config.command_timeout())).await?;

        *self.state.write() = ClientState::default();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (message_tx, _) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        // Hold the slot while spawning so an immediate EOF cannot run teardown
        // before the session is installed.
        let replaced = {
            let mut slot = self.session.lock();
            let replaced = slot.take();
            let reader_task = tokio::spawn(Arc::clone(self).read_loop(
                reader,
                generation,
                message_tx.clone(),
            ));
            *slot = Some(Session {
                generation,
                writer,
                reader_task,
                message_tx,
            });
            replaced
        };
        if let Some(stale) = replaced {
            tracing::warn!(generation = stale.generation, "Aborting replaced session");
            stale.reader_task.abort();
        }

        tracing::info!(addr = %addr, "Connected to Altitude");
        Ok(())
    }

    /// Write one command line, waiting only for the write and flush
    pub async fn send(&self, command: &Command, limit: Option<Duration>) -> Result<()> {
        command.validate()?;

        let writer = self
            .session
            .lock()
            .as_ref()
            .map(|session| Arc::clone(&session.writer))
            .ok_or(AltitudeError::NotConnected)?;

        write_line(&writer, command, limit).await
    }

    /// Stop the reader task, say `bye` and close the write half
    ///
    /// A no-op when no session is open. The session is cleared even if the
    /// close itself fails or times out.
    pub async fn close(&self, limit: Option<Duration>) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        self.close_session(limit).await
    }

    async fn close_session(&self, limit: Option<Duration>) -> Result<()> {
        let Some(session) = self.session.lock().take() else {
            return Ok(());
        };

        tracing::info!(addr = %self.config.addr(), "Disconnecting from Altitude");

        let Session {
            writer,
            reader_task,
            message_tx,
            ..
        } = session;
        drop(message_tx);

        reader_task.abort();
        match reader_task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::warn!(error = %e, "Reader task ended abnormally"),
        }

        shutdown_writer(&writer, limit).await
    }

    /// Tear the session down without any I/O; dropping the write half closes it
    pub fn abort(&self) {
        if let Some(session) = self.session.lock().take() {
            session.reader_task.abort();
        }
    }

    async fn read_loop(
        self: Arc<Self>,
        reader: OwnedReadHalf,
        generation: u64,
        message_tx: broadcast::Sender<Message>,
    ) {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let read_timeout = self.config.read_timeout();

        loop {
            // A timed-out read_until leaves partial bytes in `buf`, so the next
            // call picks up where it stopped.
            match tokio::time::timeout(read_timeout, reader.read_until(b'\n', &mut buf)).await {
                Err(_) => {
                    tracing::trace!("No broadcast within read timeout");
                }
                Ok(Ok(0)) => {
                    // Bytes left over from a timed-out read form the last line
                    if !buf.is_empty() {
                        tracing::debug!(bytes = buf.len(), "Unterminated line at hangup");
                        self.dispatch_buffered(&mut buf, &message_tx);
                    }
                    tracing::info!("Connection closed by Altitude");
                    break;
                }
                Ok(Ok(_)) => self.dispatch_buffered(&mut buf, &message_tx),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Read error");
                    break;
                }
            }
        }

        drop(message_tx);
        self.teardown(generation).await;
    }

    fn dispatch_buffered(&self, buf: &mut Vec<u8>, message_tx: &broadcast::Sender<Message>) {
        let line = String::from_utf8_lossy(buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        buf.clear();
        if !line.trim().is_empty() {
            self.dispatch(&line, message_tx);
        }
    }

    /// Apply a received line to the state, then notify observers
    pub(crate) fn dispatch(&self, line: &str, message_tx: &broadcast::Sender<Message>) {
        tracing::debug!(line = %line, "Received");

        let message = Message::parse(line);
        if let Message::Unknown(text) = &message {
            tracing::debug!(line = %text, "Unrecognised broadcast line");
        }

        self.state.write().apply(&message);

        // Called unlocked; the callback may re-register itself
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(&message);
        }

        let _ = message_tx.send(message);
    }

    /// Drop the session opened as `generation` after the peer went away
    async fn teardown(&self, generation: u64) {
        let session = {
            let mut slot = self.session.lock();
            if slot.as_ref().map(|s| s.generation) == Some(generation) {
                slot.take()
            } else {
                None
            }
        };

        // The session's join handle refers to this task, so only the writer
        // needs closing.
        if let Some(Session { writer, .. }) = session {
            if let Err(e) = shutdown_writer(&writer, Some(self.config.disconnect_timeout())).await {
                tracing::debug!(error = %e, "Closing after remote hangup failed");
            }
        }
    }
}

/// Await a TCP connect under `limit`, mapping expiry and failure
async fn establish<F>(addr: &str, limit: Option<Duration>, connect: F) -> Result<TcpStream>
where
    F: std::future::Future<Output = std::io::Result<TcpStream>>,
{
    bounded(limit, connect)
        .await
        .ok_or_else(|| {
            tracing::error!(addr = %addr, "Connection timed out");
            AltitudeError::ConnectionTimeout
        })?
        .map_err(|e| {
            tracing::error!(addr = %addr, error = %e, "Connection failed");
            AltitudeError::ConnectionFailed(e)
        })
}

async fn write_line(
    writer: &tokio::sync::Mutex<OwnedWriteHalf>,
    command: &Command,
    limit: Option<Duration>,
) -> Result<()> {
    let line = format!("{}\n", command);
    tracing::debug!(command = %command, "Sending");

    let result = bounded(limit, async {
        let mut writer = writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    })
    .await;

    match result {
        Some(result) => result.map_err(AltitudeError::from),
        None => {
            tracing::warn!(command = %command, "Write timed out");
            Err(AltitudeError::Timeout)
        }
    }
}

/// Send `bye` best-effort, then shut the write half down
///
/// Locking the writer first means a close waits behind any in-flight command.
async fn shutdown_writer(
    writer: &tokio::sync::Mutex<OwnedWriteHalf>,
    limit: Option<Duration>,
) -> Result<()> {
    let bye = format!("{}\n", Command::Bye);

    let result = bounded(limit, async {
        let mut writer = writer.lock().await;
        if let Err(e) = writer.write_all(bye.as_bytes()).await {
            tracing::debug!(error = %e, "Failed to send bye");
        }
        writer.shutdown().await
    })
    .await;

    match result {
        Some(result) => result.map_err(AltitudeError::from),
        None => Err(AltitudeError::Timeout),
    }
}
