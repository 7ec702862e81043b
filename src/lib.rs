//! Rust library for controlling Trinnov Altitude audio processors
//!
//! This library provides an async client for the Altitude's TCP/IP automation
//! protocol (port 44100). It supports:
//!
//! - Connection lifecycle with per-operation timeouts
//! - Volume, mute, dim and bypass control
//! - Source and preset selection
//! - Acoustic correction, alignment, remapping and upmixer settings
//! - Live device state kept in sync from the broadcast stream
//! - Per-message callbacks and subscriptions
//! - Wake-on-LAN power on
//!
//! # Quick Start
//!
//! ```no_run
//! use trinnov_altitude::{AltitudeClient, Timeout};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AltitudeClient::with_host("192.168.1.90");
//!     client.register_callback(|message| println!("{:?}", message));
//!     client.connect(Timeout::Default).await?;
//!
//!     client.volume_set(-30.0).await?;
//!     client.mute_set(false).await?;
//!
//!     // State arrives asynchronously
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     println!("volume: {:?}", client.volume());
//!     println!("sources: {:?}", client.sources());
//!
//!     client.disconnect(Timeout::Default).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Client**: lifecycle, callbacks, subscriptions and state accessors
//! - **Controls**: one method per device action
//! - **Connection**: TCP session and the background sync task
//! - **Protocol**: outbound command text
//! - **Message**: inbound broadcast parsing
//! - **Types**: device state

mod client;
mod config;
mod connection;
mod controls;
mod error;
mod message;
mod protocol;
mod subscription;
mod types;
mod wol;

// Public exports
pub use client::AltitudeClient;
pub use config::{ClientConfig, Timeout, DEFAULT_CLIENT_ID, DEFAULT_PORT};
pub use error::{AltitudeError, Result};
pub use message::{Message, MessageKind};
pub use protocol::{format_db, Command, RemappingMode, Switch, UpmixerMode, POWER_OFF_TOKEN};
pub use subscription::MessageReceiver;
pub use types::{ClientState, Decibels, Index};
pub use wol::{magic_packet, validate_mac, wake_on_lan, wake_on_lan_to, VALID_OUIS, WOL_PORT};
