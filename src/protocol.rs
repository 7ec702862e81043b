//! Outbound command encoding for the Altitude automation protocol.
//!
//! Commands are newline-terminated ASCII lines. Everything here is pure
//! formatting; the connection layer appends the newline and does the I/O.

use crate::error::{AltitudeError, Result};
use std::fmt;

/// Fixed token the firmware requires on `power off`
pub const POWER_OFF_TOKEN: &str = "SECURED FHZMCH48FE";

/// Three-state value used by the on/off/toggle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Off,
    On,
    /// Flip the current state without having observed it
    Toggle,
}

impl Switch {
    pub fn code(self) -> &'static str {
        match self {
            Switch::Off => "0",
            Switch::On => "1",
            Switch::Toggle => "2",
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Switch::On
        } else {
            Switch::Off
        }
    }
}

/// Speaker remapping modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemappingMode {
    None,
    TwoD,
    ThreeD,
    Autoroute,
    Manual,
}

impl RemappingMode {
    pub fn code(self) -> &'static str {
        match self {
            RemappingMode::None => "none",
            RemappingMode::TwoD => "2D",
            RemappingMode::ThreeD => "3D",
            RemappingMode::Autoroute => "autoroute",
            RemappingMode::Manual => "manual",
        }
    }
}

/// Upmixer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpmixerMode {
    Auto,
    Native,
    Dolby,
    Dts,
    Auro3d,
    Legacy,
    UpmixOnNative,
}

impl UpmixerMode {
    pub fn code(self) -> &'static str {
        match self {
            UpmixerMode::Auto => "auto",
            UpmixerMode::Native => "native",
            UpmixerMode::Dolby => "dolby",
            UpmixerMode::Dts => "dts",
            UpmixerMode::Auro3d => "auro3d",
            UpmixerMode::Legacy => "legacy",
            UpmixerMode::UpmixOnNative => "upmix on native",
        }
    }
}

/// A single device command
///
/// `Display` renders the wire text without the trailing newline.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Identification handshake
    Id(String),
    /// Graceful disconnect notice
    Bye,
    AcousticCorrection(Switch),
    Bypass(Switch),
    Dim(Switch),
    Mute(Switch),
    /// Front panel display (`fav_light`), set only
    FrontDisplay(bool),
    LevelAlignment(Switch),
    TimeAlignment(Switch),
    QuickOptimized(Switch),
    /// Absolute volume in dB
    Volume(f64),
    /// Relative volume change in dB
    VolumeAdjust(f64),
    /// Ramp to a volume in dB over a duration in milliseconds
    VolumeRamp { db: f64, duration_ms: u32 },
    /// Select source (input profile) by zero-based index
    Source(u32),
    /// Load preset by zero-based index
    PresetLoad(u32),
    RemappingMode(RemappingMode),
    Upmixer(UpmixerMode),
    PowerOff,
    /// Pre-formatted command text, passed through untouched
    Raw(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Id(client_id) => write!(f, "id {}", client_id),
            Command::Bye => f.write_str("bye"),
            Command::AcousticCorrection(s) => write!(f, "use_acoustic_correct {}", s.code()),
            Command::Bypass(s) => write!(f, "bypass {}", s.code()),
            Command::Dim(s) => write!(f, "dim {}", s.code()),
            Command::Mute(s) => write!(f, "mute {}", s.code()),
            Command::FrontDisplay(on) => write!(f, "fav_light {}", Switch::from(*on).code()),
            Command::LevelAlignment(s) => write!(f, "use_level_alignment {}", s.code()),
            Command::TimeAlignment(s) => write!(f, "use_time_alignment {}", s.code()),
            Command::QuickOptimized(s) => write!(f, "quick_optimized {}", s.code()),
            Command::Volume(db) => write!(f, "volume {}", format_db(*db)),
            Command::VolumeAdjust(db) => write!(f, "dvolume {}", format_db(*db)),
            Command::VolumeRamp { db, duration_ms } => {
                write!(f, "volume_ramp {} {}", format_db(*db), duration_ms)
            }
            Command::Source(index) => write!(f, "profile {}", index),
            Command::PresetLoad(index) => write!(f, "loadp {}", index),
            Command::RemappingMode(mode) => write!(f, "remapping_mode {}", mode.code()),
            Command::Upmixer(mode) => write!(f, "upmixer {}", mode.code()),
            Command::PowerOff => write!(f, "power off {}", POWER_OFF_TOKEN),
            Command::Raw(text) => f.write_str(text),
        }
    }
}

impl Command {
    /// Check the command can be written as a single well-formed line
    ///
    /// Free text must not contain line breaks and dB values must be finite.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Id(text) | Command::Raw(text) if text.contains(['\r', '\n']) => Err(
                AltitudeError::InvalidParameter(format!("line break in {:?}", text)),
            ),
            Command::Volume(db) | Command::VolumeAdjust(db) | Command::VolumeRamp { db, .. }
                if !db.is_finite() =>
            {
                Err(AltitudeError::InvalidParameter(format!("non-finite dB value {}", db)))
            }
            _ => Ok(()),
        }
    }
}

/// Format a dB value in plain decimal with at least one fractional digit
///
/// `-6.0`, `-12.5`, `0.125`. Precision is capped at six places.
pub fn format_db(db: f64) -> String {
    let fixed = format!("{:.6}", db);
    let trimmed = fixed.trim_end_matches('0');
    let text = if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    };
    // -0.0000001 rounds to "-0.0"
    if text == "-0.0" {
        "0.0".to_string()
    } else {
        text
    }
}
