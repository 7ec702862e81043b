use crate::config::{ClientConfig, Timeout};
use crate::connection::Connection;
use crate::error::{AltitudeError, Result};
use crate::message::Message;
use crate::protocol::Command;
use crate::subscription::MessageReceiver;
use crate::types::{ClientState, Decibels, Index};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Client for a Trinnov Altitude processor
///
/// The `AltitudeClient` owns the TCP session and a background task that keeps
/// [`ClientState`] in sync with the device's broadcast stream. Command methods
/// only wait for their line to be written; the device's reply shows up later
/// in the state, the registered callback and any [`MessageReceiver`].
pub struct AltitudeClient {
    connection: Arc<Connection>,
}

impl AltitudeClient {
    /// Create a disconnected client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            connection: Arc::new(Connection::new(config)),
        }
    }

    /// Create a disconnected client for `host` on the default port
    pub fn with_host(host: impl Into<String>) -> Self {
        Self::new(ClientConfig::new(host))
    }

    pub fn config(&self) -> &ClientConfig {
        self.connection.config()
    }

    /// Open the TCP session and send the `id` handshake
    ///
    /// Any existing session is closed first and the state is reset. Concurrent
    /// calls are serialised and the last one to run owns the session, so values
    /// from a previous session never leak into the new one. State fields fill
    /// in asynchronously once the device starts broadcasting.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trinnov_altitude::{AltitudeClient, Timeout};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = AltitudeClient::with_host("192.168.1.90");
    ///     client.connect(Timeout::Default).await?;
    ///     client.volume_set(-30.0).await?;
    ///     client.disconnect(Timeout::Default).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(&self, timeout: impl Into<Timeout>) -> Result<()> {
        let limit = timeout.into().resolve(self.config().connect_timeout());
        self.connection.open(limit).await
    }

    /// Whether a session with a running reader task is open
    pub fn connected(&self) -> bool {
        self.connection.is_open()
    }

    /// Close the session, sending `bye` first
    ///
    /// Does nothing if not connected.
    pub async fn disconnect(&self, timeout: impl Into<Timeout>) -> Result<()> {
        let limit = timeout.into().resolve(self.config().disconnect_timeout());
        self.connection.close(limit).await
    }

    /// Install the observer called for every parsed broadcast message
    ///
    /// The callback runs on the background task, so it should return quickly.
    /// Registering again replaces the previous callback.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.connection.set_callback(Some(Arc::new(callback)));
    }

    /// Remove the registered callback, if any
    pub fn clear_callback(&self) {
        self.connection.set_callback(None);
    }

    /// Subscribe to parsed broadcast messages
    ///
    /// Multiple receivers can be active at once. A receiver belongs to the
    /// current session: once that session ends, by `disconnect` or by the
    /// device hanging up, `recv` fails with `NotConnected`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trinnov_altitude::{AltitudeClient, Timeout};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = AltitudeClient::with_host("192.168.1.90");
    ///     client.connect(Timeout::Default).await?;
    ///     let mut rx = client.subscribe()?;
    ///
    ///     while let Ok(message) = rx.recv().await {
    ///         println!("{:?}", message);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> Result<MessageReceiver> {
        self.connection
            .subscribe()
            .map(MessageReceiver::new)
            .ok_or(AltitudeError::NotConnected)
    }

    /// Write a command, waiting only for the write to complete
    pub async fn send(&self, command: Command, timeout: impl Into<Timeout>) -> Result<()> {
        let limit = timeout.into().resolve(self.config().command_timeout());
        self.connection.send(&command, limit).await
    }

    /// Write an arbitrary command line
    pub async fn send_raw(&self, line: impl Into<String>, timeout: impl Into<Timeout>) -> Result<()> {
        self.send(Command::Raw(line.into()), timeout).await
    }

    // ========== State ==========

    /// Consistent copy of the whole state
    pub fn state(&self) -> ClientState {
        self.connection.state().read().clone()
    }

    pub fn audiosync(&self) -> Option<bool> {
        self.connection.state().read().audiosync
    }

    pub fn bypass(&self) -> Option<bool> {
        self.connection.state().read().bypass
    }

    pub fn dim(&self) -> Option<bool> {
        self.connection.state().read().dim
    }

    pub fn mute(&self) -> Option<bool> {
        self.connection.state().read().mute
    }

    /// Device identifier from the welcome banner
    pub fn id(&self) -> Option<String> {
        self.connection.state().read().id.clone()
    }

    /// Firmware version from the welcome banner
    pub fn version(&self) -> Option<String> {
        self.connection.state().read().version.clone()
    }

    pub fn volume(&self) -> Option<Decibels> {
        self.connection.state().read().volume
    }

    /// Name of the currently selected source
    pub fn source(&self) -> Option<String> {
        self.connection.state().read().source.clone()
    }

    pub fn sampling_rate(&self) -> Option<u32> {
        self.connection.state().read().sampling_rate
    }

    pub fn presets(&self) -> BTreeMap<Index, String> {
        self.connection.state().read().presets.clone()
    }

    pub fn sources(&self) -> BTreeMap<Index, String> {
        self.connection.state().read().sources.clone()
    }
}

impl Drop for AltitudeClient {
    fn drop(&mut self) {
        // The reader task holds its own handle to the connection; without a
        // close it would outlive the client.
        self.connection.abort();
    }
}
