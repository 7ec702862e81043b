use crate::message::Message;
use serde::Serialize;
use std::collections::BTreeMap;

/// Zero-based preset or source index as used on the wire
pub type Index = u32;

/// Output level in decibels
pub type Decibels = f64;

/// Live device state assembled from the broadcast stream
///
/// Every field stays `None` (or empty) until the matching broadcast has been
/// seen, which is typically a moment after `connect()` returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientState {
    pub audiosync: Option<bool>,
    pub bypass: Option<bool>,
    pub dim: Option<bool>,
    pub mute: Option<bool>,

    /// Device identifier from the welcome banner
    pub id: Option<String>,
    /// Firmware version from the welcome banner
    pub version: Option<String>,

    pub volume: Option<Decibels>,

    /// Name of the selected source, resolved through `sources`
    pub source: Option<String>,
    pub source_index: Option<Index>,
    pub preset_index: Option<Index>,

    pub sampling_rate: Option<u32>,

    pub decoder: Option<String>,
    pub upmixer: Option<String>,

    pub presets: BTreeMap<Index, String>,
    pub sources: BTreeMap<Index, String>,
}

impl ClientState {
    /// Fold one broadcast message into the state
    pub(crate) fn apply(&mut self, message: &Message) {
        match message {
            Message::Welcome { version, id } => {
                self.version = Some(version.clone());
                self.id = Some(id.clone());
            }
            Message::Audiosync(on) => self.audiosync = Some(*on),
            Message::Bypass(on) => self.bypass = Some(*on),
            Message::Dim(on) => self.dim = Some(*on),
            Message::Mute(on) => self.mute = Some(*on),
            Message::Error(text) => {
                tracing::warn!(error = %text, "Altitude reported an error");
            }
            Message::Preset { index, name } => {
                self.presets.insert(*index, name.clone());
            }
            Message::PresetsClear => self.presets.clear(),
            Message::Source { index, name } => {
                self.sources.insert(*index, name.clone());
                if self.source_index == Some(*index) {
                    self.source = Some(name.clone());
                }
            }
            Message::SourcesClear => self.sources.clear(),
            Message::CurrentSource(index) => {
                self.source_index = Some(*index);
                self.source = self.sources.get(index).cloned();
            }
            Message::CurrentPreset(index) => self.preset_index = Some(*index),
            Message::SamplingRate(rate) => self.sampling_rate = Some(*rate),
            Message::Volume(db) => self.volume = Some(*db),
            Message::Decoder { decoder, upmixer } => {
                self.decoder = Some(decoder.clone());
                self.upmixer = Some(upmixer.clone());
            }
            Message::Ok | Message::Unknown(_) => {}
        }
    }

    /// Look up a source index by its announced name
    pub fn source_index_by_name(&self, name: &str) -> Option<Index> {
        self.sources
            .iter()
            .find(|(_, source)| source.as_str() == name)
            .map(|(index, _)| *index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_lines(state: &mut ClientState, lines: &[&str]) {
        for line in lines {
            state.apply(&Message::parse(line));
        }
    }

    #[test]
    fn starts_unset() {
        let state = ClientState::default();
        assert_eq!(state.volume, None);
        assert_eq!(state.mute, None);
        assert!(state.presets.is_empty());
    }

    #[test]
    fn clear_drops_stale_presets() {
        let mut state = ClientState::default();
        apply_lines(
            &mut state,
            &["LABEL 0: Old", "LABEL 1: Stale", "LABELS_CLEAR", "LABEL 0: Default", "LABEL 2: Custom"],
        );
        let expected: BTreeMap<Index, String> =
            [(0, "Default".to_string()), (2, "Custom".to_string())].into();
        assert_eq!(state.presets, expected);
    }

    #[test]
    fn upsert_replaces_by_index() {
        let mut state = ClientState::default();
        apply_lines(&mut state, &["PROFILE 1: Blu-ray", "PROFILE 1: Streamer"]);
        assert_eq!(state.sources.len(), 1);
        assert_eq!(state.sources[&1], "Streamer");
    }

    #[test]
    fn current_source_resolves_name() {
        let mut state = ClientState::default();
        apply_lines(&mut state, &["CURRENT_PROFILE 1", "PROFILE 0: HDMI 1", "PROFILE 1: HDMI 2"]);
        assert_eq!(state.source.as_deref(), Some("HDMI 2"));

        apply_lines(&mut state, &["CURRENT_PROFILE 0"]);
        assert_eq!(state.source.as_deref(), Some("HDMI 1"));
        assert_eq!(state.source_index, Some(0));
    }

    #[test]
    fn welcome_and_scalars() {
        let mut state = ClientState::default();
        apply_lines(
            &mut state,
            &[
                "WELCOME to Trinnov Optimizer (Version 4.3.2, ID 42)",
                "VOLUME -30.5",
                "SRATE 48000",
                "MUTE 1",
                "ERROR: ignored",
                "SOMETHING_NEW 1",
            ],
        );
        assert_eq!(state.version.as_deref(), Some("4.3.2"));
        assert_eq!(state.id.as_deref(), Some("42"));
        assert_eq!(state.volume, Some(-30.5));
        assert_eq!(state.sampling_rate, Some(48000));
        assert_eq!(state.mute, Some(true));
        assert_eq!(state.dim, None);
    }

    #[test]
    fn source_lookup_by_name() {
        let mut state = ClientState::default();
        apply_lines(&mut state, &["PROFILE 3: Apple TV"]);
        assert_eq!(state.source_index_by_name("Apple TV"), Some(3));
        assert_eq!(state.source_index_by_name("Kodi"), None);
    }
}
