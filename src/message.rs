//! Inbound broadcast messages.
//!
//! The device pushes one message per line whenever its state changes, and
//! replays its full state right after the `id` handshake:
//!
//! ```text
//! WELCOME to Trinnov Optimizer (Version 4.2.8, ID 10485761)
//! VOLUME -40.5
//! MUTE 0
//! LABELS_CLEAR
//! LABEL 0: Builtin
//! PROFILES_CLEAR
//! PROFILE 0: HDMI 1
//! CURRENT_PROFILE 0
//! SRATE 48000
//! ```
//!
//! [`Message::parse`] is total: a line it does not understand becomes
//! [`Message::Unknown`] instead of an error.

use serde::Serialize;

/// A parsed broadcast line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Message {
    /// Sent once the `id` handshake is accepted
    Welcome { version: String, id: String },
    Audiosync(bool),
    Bypass(bool),
    Dim(bool),
    Mute(bool),
    /// Error reported by the device
    Error(String),
    Preset { index: u32, name: String },
    PresetsClear,
    Source { index: u32, name: String },
    SourcesClear,
    CurrentSource(u32),
    CurrentPreset(u32),
    SamplingRate(u32),
    /// Output level in dB
    Volume(f64),
    Decoder { decoder: String, upmixer: String },
    /// Plain command acknowledgement
    Ok,
    /// Anything not recognised, kept verbatim
    Unknown(String),
}

/// Discriminant of a [`Message`], handy for matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Welcome,
    Audiosync,
    Bypass,
    Dim,
    Mute,
    Error,
    Preset,
    PresetsClear,
    Source,
    SourcesClear,
    CurrentSource,
    CurrentPreset,
    SamplingRate,
    Volume,
    Decoder,
    Ok,
    Unknown,
}

impl Message {
    /// Parse one line (without its terminator) into a message
    pub fn parse(line: &str) -> Message {
        let line = line.trim();
        parse_known(line).unwrap_or_else(|| Message::Unknown(line.to_string()))
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Welcome { .. } => MessageKind::Welcome,
            Message::Audiosync(_) => MessageKind::Audiosync,
            Message::Bypass(_) => MessageKind::Bypass,
            Message::Dim(_) => MessageKind::Dim,
            Message::Mute(_) => MessageKind::Mute,
            Message::Error(_) => MessageKind::Error,
            Message::Preset { .. } => MessageKind::Preset,
            Message::PresetsClear => MessageKind::PresetsClear,
            Message::Source { .. } => MessageKind::Source,
            Message::SourcesClear => MessageKind::SourcesClear,
            Message::CurrentSource(_) => MessageKind::CurrentSource,
            Message::CurrentPreset(_) => MessageKind::CurrentPreset,
            Message::SamplingRate(_) => MessageKind::SamplingRate,
            Message::Volume(_) => MessageKind::Volume,
            Message::Decoder { .. } => MessageKind::Decoder,
            Message::Ok => MessageKind::Ok,
            Message::Unknown(_) => MessageKind::Unknown,
        }
    }
}

fn parse_known(line: &str) -> Option<Message> {
    if let Some(text) = line.strip_prefix("ERROR:") {
        return Some(Message::Error(text.trim().to_string()));
    }
    if line.starts_with("WELCOME") {
        return parse_welcome(line);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword {
        "OK" if rest.is_empty() => Some(Message::Ok),
        "LABELS_CLEAR" if rest.is_empty() => Some(Message::PresetsClear),
        "PROFILES_CLEAR" if rest.is_empty() => Some(Message::SourcesClear),
        "AUDIOSYNC" => parse_flag(rest).map(Message::Audiosync),
        "BYPASS" => parse_flag(rest).map(Message::Bypass),
        "DIM" => parse_flag(rest).map(Message::Dim),
        "MUTE" => parse_flag(rest).map(Message::Mute),
        "LABEL" => parse_entry(rest).map(|(index, name)| Message::Preset { index, name }),
        "PROFILE" => parse_entry(rest).map(|(index, name)| Message::Source { index, name }),
        "CURRENT_PROFILE" => rest.parse().ok().map(Message::CurrentSource),
        "CURRENT_PRESET" => rest.parse().ok().map(Message::CurrentPreset),
        "SRATE" => rest.parse().ok().map(Message::SamplingRate),
        "VOLUME" => rest.parse().ok().map(Message::Volume),
        "DECODER" => parse_decoder(rest),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// `<index>: <name>`
fn parse_entry(rest: &str) -> Option<(u32, String)> {
    let (index, name) = rest.split_once(':')?;
    Some((index.trim().parse().ok()?, name.trim().to_string()))
}

/// `WELCOME to Trinnov Optimizer (Version <version>, ID <id>)`
fn parse_welcome(line: &str) -> Option<Message> {
    let (_, tail) = line.split_once("Version ")?;
    let (version, tail) = tail.split_once(',')?;
    let (_, id) = tail.split_once("ID ")?;
    let id = id.trim_end_matches(')').trim();
    if version.trim().is_empty() || id.is_empty() {
        return None;
    }
    Some(Message::Welcome {
        version: version.trim().to_string(),
        id: id.to_string(),
    })
}

/// `NONAUDIO <x> PLAYABLE <x> DECODER <name> UPMIXER <name>`
///
/// Decoder and upmixer names may contain spaces, so split on the keywords.
fn parse_decoder(rest: &str) -> Option<Message> {
    let (_, tail) = rest.split_once(" DECODER ")?;
    let (decoder, upmixer) = tail.split_once(" UPMIXER ")?;
    Some(Message::Decoder {
        decoder: decoder.trim().to_string(),
        upmixer: upmixer.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome() {
        let msg = Message::parse("WELCOME to Trinnov Optimizer (Version 4.2.8rc2, ID 10485761)");
        assert_eq!(
            msg,
            Message::Welcome {
                version: "4.2.8rc2".into(),
                id: "10485761".into()
            }
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(Message::parse("MUTE 1"), Message::Mute(true));
        assert_eq!(Message::parse("DIM 0"), Message::Dim(false));
        assert_eq!(Message::parse("BYPASS 1"), Message::Bypass(true));
        assert_eq!(Message::parse("AUDIOSYNC 0"), Message::Audiosync(false));
    }

    #[test]
    fn bad_flag_is_unknown() {
        assert_eq!(Message::parse("MUTE maybe"), Message::Unknown("MUTE maybe".into()));
    }

    #[test]
    fn volume_and_rate() {
        assert_eq!(Message::parse("VOLUME -12.5"), Message::Volume(-12.5));
        assert_eq!(Message::parse("SRATE 96000"), Message::SamplingRate(96000));
        assert_eq!(Message::parse("VOLUME loud").kind(), MessageKind::Unknown);
    }

    #[test]
    fn presets_and_sources() {
        assert_eq!(Message::parse("LABELS_CLEAR"), Message::PresetsClear);
        assert_eq!(
            Message::parse("LABEL 2: Movie Night"),
            Message::Preset {
                index: 2,
                name: "Movie Night".into()
            }
        );
        assert_eq!(Message::parse("PROFILES_CLEAR"), Message::SourcesClear);
        assert_eq!(
            Message::parse("PROFILE 0: HDMI 1"),
            Message::Source {
                index: 0,
                name: "HDMI 1".into()
            }
        );
        assert_eq!(Message::parse("CURRENT_PROFILE 4"), Message::CurrentSource(4));
        assert_eq!(Message::parse("CURRENT_PRESET 1"), Message::CurrentPreset(1));
    }

    #[test]
    fn error_and_ok() {
        assert_eq!(
            Message::parse("ERROR: invalid command"),
            Message::Error("invalid command".into())
        );
        assert_eq!(Message::parse("OK"), Message::Ok);
    }

    #[test]
    fn decoder() {
        assert_eq!(
            Message::parse("DECODER NONAUDIO 0 PLAYABLE 1 DECODER DD+ Atmos UPMIXER upmix on native"),
            Message::Decoder {
                decoder: "DD+ Atmos".into(),
                upmixer: "upmix on native".into()
            }
        );
    }

    #[test]
    fn unknown_keeps_line() {
        let msg = Message::parse("SPEAKER_INFO 3 1 4");
        assert_eq!(msg, Message::Unknown("SPEAKER_INFO 3 1 4".into()));
        assert_eq!(msg.kind(), MessageKind::Unknown);
    }
}
