//! Stream-Modell
//!
//! Beschreibt was publiziert (lokaler Stream) bzw. abonniert (entfernter
//! Stream) werden kann, welche Varianten ein Publisher anbietet und welche
//! Einschraenkungen ein Abonnent anfordert.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Resolution;

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

/// Medienart eines Tracks oder Transceivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lebenszustand eines Tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Live,
    Ended,
}

/// Ein einzelner Audio- oder Video-Track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: MediaKind,
    pub state: TrackState,
}

impl MediaTrack {
    /// Erstellt einen laufenden Track
    pub fn live(id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            kind,
            state: TrackState::Live,
        }
    }

    pub fn ist_live(&self) -> bool {
        self.state == TrackState::Live
    }
}

/// Handle auf den zugrundeliegenden Medienstrom der Engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaStream {
    pub id: String,
    pub audio_tracks: Vec<MediaTrack>,
    pub video_tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn neu(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Fuegt einen Track anhand seiner Medienart hinzu (Builder-Stil)
    pub fn mit_track(mut self, track: MediaTrack) -> Self {
        match track.kind {
            MediaKind::Audio => self.audio_tracks.push(track),
            MediaKind::Video => self.video_tracks.push(track),
        }
        self
    }

    /// Kein einziger Track ist mehr live
    ///
    /// Audio und Video werden unabhaengig geprueft; ein laufender Track
    /// beliebiger Art genuegt.
    pub fn ist_beendet(&self) -> bool {
        !self
            .audio_tracks
            .iter()
            .chain(self.video_tracks.iter())
            .any(MediaTrack::ist_live)
    }

    pub fn hat_tracks(&self) -> bool {
        !self.audio_tracks.is_empty() || !self.video_tracks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Quellen
// ---------------------------------------------------------------------------

/// Herkunft der Audiospur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioSourceInfo {
    #[default]
    Mic,
    ScreenCast,
    File,
    Mixed,
    Unknown,
}

/// Herkunft der Videospur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoSourceInfo {
    #[default]
    Camera,
    ScreenCast,
    File,
    Mixed,
    Unknown,
}

/// Quellen-Klassifikation eines Streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSourceInfo {
    pub audio: AudioSourceInfo,
    pub video: VideoSourceInfo,
}

impl StreamSourceInfo {
    /// Video stammt aus einer Bildschirmaufnahme
    pub fn ist_bildschirm_video(&self) -> bool {
        self.video == VideoSourceInfo::ScreenCast
    }
}

// ---------------------------------------------------------------------------
// Lokaler Stream (Publish)
// ---------------------------------------------------------------------------

/// Lokal erzeugter Stream, der publiziert werden soll
#[derive(Debug, Clone, Default)]
pub struct LocalStream {
    /// Medienstrom der Engine (None = kein Handle vorhanden)
    pub media: Option<MediaStream>,
    pub source: StreamSourceInfo,
    /// Beliebige Attribute des Aufrufers, unveraendert an den Server
    pub attributes: BTreeMap<String, String>,
}

impl LocalStream {
    pub fn neu(media: MediaStream, source: StreamSourceInfo) -> Self {
        Self {
            media: Some(media),
            source,
            attributes: BTreeMap::new(),
        }
    }

    pub fn mit_attribut(mut self, schluessel: impl Into<String>, wert: impl Into<String>) -> Self {
        self.attributes.insert(schluessel.into(), wert.into());
        self
    }

    /// ID des Medienstroms (leer wenn kein Handle vorhanden)
    pub fn id(&self) -> &str {
        self.media.as_ref().map(|m| m.id.as_str()).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Publikations-Einstellungen und Abo-Faehigkeiten (vom Server)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPublicationSettings {
    pub codec: String,
    pub track_id: String,
}

/// Eine vom Publisher gesendete Videovariante (bei Simulcast mehrere)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPublicationSettings {
    pub codec: String,
    pub resolution: Resolution,
    pub frame_rate: f64,
    pub bitrate_kbps: u32,
    pub keyframe_interval: u32,
    /// Simulcast-RID (leer wenn kein Simulcast)
    pub rid: String,
    pub track_id: String,
}

/// Was eine Publikation tatsaechlich sendet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationSettings {
    pub audio: Vec<AudioPublicationSettings>,
    pub video: Vec<VideoPublicationSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSubscriptionCapabilities {
    pub codecs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSubscriptionCapabilities {
    pub codecs: Vec<String>,
    pub resolutions: Vec<Resolution>,
    pub frame_rates: Vec<f64>,
    pub bitrate_multipliers: Vec<f64>,
    pub keyframe_intervals: Vec<u32>,
}

/// Welche Abo-Variationen der Server zusaetzlich anbietet (Transcoding)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionCapabilities {
    pub audio: AudioSubscriptionCapabilities,
    pub video: VideoSubscriptionCapabilities,
}

// ---------------------------------------------------------------------------
// Entfernter Stream (Subscribe)
// ---------------------------------------------------------------------------

/// Vom Server angekuendigter Stream eines anderen Teilnehmers
#[derive(Debug, Default)]
pub struct RemoteStream {
    pub id: String,
    pub has_audio: bool,
    pub has_video: bool,
    pub source: StreamSourceInfo,
    pub settings: PublicationSettings,
    pub capabilities: SubscriptionCapabilities,
    /// Wird gesetzt sobald die Engine den Medienstrom liefert
    media: Mutex<Option<MediaStream>>,
}

impl RemoteStream {
    pub fn neu(id: impl Into<String>, has_audio: bool, has_video: bool) -> Self {
        Self {
            id: id.into(),
            has_audio,
            has_video,
            ..Default::default()
        }
    }

    pub fn mit_settings(mut self, settings: PublicationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn mit_capabilities(mut self, capabilities: SubscriptionCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Haengt den eingetroffenen Medienstrom an
    pub fn media_setzen(&self, media: MediaStream) {
        *self.media.lock() = Some(media);
    }

    pub fn media(&self) -> Option<MediaStream> {
        self.media.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Subscribe-Optionen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSubscriptionConstraints {
    pub disabled: bool,
    pub codecs: Vec<String>,
}

/// Gewuenschte Video-Einschraenkungen; Nullwerte bedeuten "nicht angefordert"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSubscriptionConstraints {
    pub disabled: bool,
    pub codecs: Vec<String>,
    pub resolution: Resolution,
    pub frame_rate: f64,
    pub bitrate_multiplier: f64,
    pub key_frame_interval: u32,
    /// Simulcast-RID; wenn gesetzt zaehlt nur sie
    pub rid: String,
}

/// Optionen eines Subscribe-Aufrufs, unveraenderlich waehrend des Aufrufs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeOptions {
    pub audio: AudioSubscriptionConstraints,
    pub video: VideoSubscriptionConstraints,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_mit_einem_laufenden_track_ist_nicht_beendet() {
        let mut ended = MediaTrack::live("a1", MediaKind::Audio);
        ended.state = TrackState::Ended;
        let media = MediaStream::neu("s1")
            .mit_track(ended)
            .mit_track(MediaTrack::live("v1", MediaKind::Video));
        assert!(!media.ist_beendet());
        assert!(media.hat_tracks());
    }

    #[test]
    fn stream_ohne_tracks_gilt_als_beendet() {
        let media = MediaStream::neu("leer");
        assert!(media.ist_beendet());
        assert!(!media.hat_tracks());
    }

    #[test]
    fn lokaler_stream_id_ohne_handle_ist_leer() {
        let stream = LocalStream::default();
        assert_eq!(stream.id(), "");
    }

    #[test]
    fn remote_stream_media_setzen() {
        let stream = RemoteStream::neu("r1", true, true);
        assert!(stream.media().is_none());
        stream.media_setzen(MediaStream::neu("m"));
        assert_eq!(stream.media().map(|m| m.id), Some("m".to_string()));
    }

    #[test]
    fn quellen_serialisierung() {
        let json = serde_json::to_string(&VideoSourceInfo::ScreenCast).unwrap();
        assert_eq!(json, "\"screen-cast\"");
    }

    #[test]
    fn subscribe_optionen_aus_teil_json() {
        let opts: SubscribeOptions =
            serde_json::from_str(r#"{"video":{"rid":"q"}}"#).unwrap();
        assert_eq!(opts.video.rid, "q");
        assert_eq!(opts.video.bitrate_multiplier, 0.0);
        assert!(!opts.audio.disabled);
    }
}
