//! Device actions.
//!
//! Each method writes a single command line with the configured command
//! timeout and returns once it has been flushed. None of them wait for the
//! device to answer; watch the state or a subscription for the outcome.

use crate::client::AltitudeClient;
use crate::config::Timeout;
use crate::error::{AltitudeError, Result};
use crate::protocol::{Command, RemappingMode, Switch, UpmixerMode};
use crate::types::{Decibels, Index};

impl AltitudeClient {
    // ========== Acoustic Correction ==========

    /// Enable or disable acoustic correction
    pub async fn acoustic_correction_set(&self, on: bool) -> Result<()> {
        self.send(Command::AcousticCorrection(on.into()), Timeout::Default).await
    }

    /// Flip acoustic correction
    pub async fn acoustic_correction_toggle(&self) -> Result<()> {
        self.send(Command::AcousticCorrection(Switch::Toggle), Timeout::Default).await
    }

    // ========== Bypass / Dim / Mute ==========

    /// Enable or disable processing bypass
    pub async fn bypass_set(&self, on: bool) -> Result<()> {
        self.send(Command::Bypass(on.into()), Timeout::Default).await
    }

    /// Flip bypass
    pub async fn bypass_toggle(&self) -> Result<()> {
        self.send(Command::Bypass(Switch::Toggle), Timeout::Default).await
    }

    /// Set the dim state
    pub async fn dim_set(&self, on: bool) -> Result<()> {
        self.send(Command::Dim(on.into()), Timeout::Default).await
    }

    /// Flip dim
    pub async fn dim_toggle(&self) -> Result<()> {
        self.send(Command::Dim(Switch::Toggle), Timeout::Default).await
    }

    /// Set the mute state
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use trinnov_altitude::{AltitudeClient, Timeout};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = AltitudeClient::with_host("192.168.1.90");
    /// # client.connect(Timeout::Default).await?;
    /// client.mute_set(true).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn mute_set(&self, on: bool) -> Result<()> {
        self.send(Command::Mute(on.into()), Timeout::Default).await
    }

    /// Flip mute without needing to know the current state
    pub async fn mute_toggle(&self) -> Result<()> {
        self.send(Command::Mute(Switch::Toggle), Timeout::Default).await
    }

    // ========== Front Panel ==========

    /// Turn the front panel display on or off
    pub async fn front_display_set(&self, on: bool) -> Result<()> {
        self.send(Command::FrontDisplay(on), Timeout::Default).await
    }

    // ========== Alignment ==========

    /// Enable or disable level alignment
    pub async fn level_alignment_set(&self, on: bool) -> Result<()> {
        self.send(Command::LevelAlignment(on.into()), Timeout::Default).await
    }

    /// Flip level alignment
    pub async fn level_alignment_toggle(&self) -> Result<()> {
        self.send(Command::LevelAlignment(Switch::Toggle), Timeout::Default).await
    }

    /// Enable or disable time alignment
    pub async fn time_alignment_set(&self, on: bool) -> Result<()> {
        self.send(Command::TimeAlignment(on.into()), Timeout::Default).await
    }

    /// Flip time alignment
    pub async fn time_alignment_toggle(&self) -> Result<()> {
        self.send(Command::TimeAlignment(Switch::Toggle), Timeout::Default).await
    }

    /// Enable or disable the quick optimized mode
    pub async fn quick_optimized_set(&self, on: bool) -> Result<()> {
        self.send(Command::QuickOptimized(on.into()), Timeout::Default).await
    }

    /// Flip quick optimized
    pub async fn quick_optimized_toggle(&self) -> Result<()> {
        self.send(Command::QuickOptimized(Switch::Toggle), Timeout::Default).await
    }

    // ========== Volume ==========

    /// Set the absolute output level in dB
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use trinnov_altitude::{AltitudeClient, Timeout};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = AltitudeClient::with_host("192.168.1.90");
    /// # client.connect(Timeout::Default).await?;
    /// client.volume_set(-25.5).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn volume_set(&self, db: Decibels) -> Result<()> {
        self.send(Command::Volume(db), Timeout::Default).await
    }

    /// Change the output level by `delta` dB
    pub async fn volume_adjust(&self, delta: Decibels) -> Result<()> {
        self.send(Command::VolumeAdjust(delta), Timeout::Default).await
    }

    /// Ramp to `db` over `duration_ms` milliseconds
    pub async fn volume_ramp(&self, db: Decibels, duration_ms: u32) -> Result<()> {
        self.send(Command::VolumeRamp { db, duration_ms }, Timeout::Default).await
    }

    // ========== Sources and Presets ==========

    /// Select a source (input profile) by zero-based index
    pub async fn source_set(&self, index: Index) -> Result<()> {
        self.send(Command::Source(index), Timeout::Default).await
    }

    /// Select a source by the name the device announced for it
    ///
    /// Fails with `UnknownSource` if no such source has been broadcast yet.
    pub async fn source_set_by_name(&self, name: &str) -> Result<()> {
        let index = self
            .state()
            .source_index_by_name(name)
            .ok_or_else(|| AltitudeError::UnknownSource(name.to_string()))?;
        self.source_set(index).await
    }

    /// Load a preset by zero-based index
    pub async fn preset_load(&self, index: Index) -> Result<()> {
        self.send(Command::PresetLoad(index), Timeout::Default).await
    }

    // ========== Processing Modes ==========

    /// Set the speaker remapping mode
    pub async fn remapping_mode_set(&self, mode: RemappingMode) -> Result<()> {
        self.send(Command::RemappingMode(mode), Timeout::Default).await
    }

    /// Select the upmixer
    pub async fn upmixer_set(&self, mode: UpmixerMode) -> Result<()> {
        self.send(Command::Upmixer(mode), Timeout::Default).await
    }

    // ========== Power ==========

    /// Power the processor off
    ///
    /// Use [`wake_on_lan`](crate::wake_on_lan) to bring it back.
    pub async fn power_off(&self) -> Result<()> {
        self.send(Command::PowerOff, Timeout::Default).await
    }
}
