//! Initialisierungs-Anfrage fuer Publish und Subscribe
//!
//! ```text
//! { media: { tracks: [ { type, mid, from?, source?, parameters?, simulcastRid? } ] },
//!   transport: { type: "webrtc" },
//!   attributes?: { k: v } }
//! ```
//!
//! Die Media-Line-Zuordnung ist fest: Audio bekommt immer "0", Video "0"
//! wenn kein Audio dabei ist, sonst "1".

use konferenz_core::stream::MediaKind;
use konferenz_core::types::Resolution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Standard-Qualitaetsstufe; wird nicht uebertragen
pub const STANDARD_QUALITAET: &str = "x1.0";

/// Herkunft eines publizierten Tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackSource {
    Mic,
    Camera,
    ScreenCast,
}

/// Angeforderte Video-Parameter beim Subscribe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Qualitaetsstufe als "xN.N"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    #[serde(rename = "keyFrameInterval", skip_serializing_if = "Option::is_none")]
    pub key_frame_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framerate: Option<u32>,
}

/// Beschreibung eines Tracks in der Initialisierungs-Anfrage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOptions {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub mid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<TrackSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<VideoParameters>,
    #[serde(rename = "simulcastRid", skip_serializing_if = "Option::is_none")]
    pub simulcast_rid: Option<String>,
}

impl TrackOptions {
    /// Track mit fester Media-Line-Zuordnung
    pub fn neu(kind: MediaKind, mit_audio: bool) -> Self {
        Self {
            kind,
            mid: media_line(kind, mit_audio).to_string(),
            from: None,
            source: None,
            parameters: None,
            simulcast_rid: None,
        }
    }
}

/// Media-Line eines Tracks: Audio immer "0", Video "0" ohne Audio sonst "1"
pub fn media_line(kind: MediaKind, mit_audio: bool) -> &'static str {
    match (kind, mit_audio) {
        (MediaKind::Audio, _) => "0",
        (MediaKind::Video, false) => "0",
        (MediaKind::Video, true) => "1",
    }
}

/// Qualitaetsstufe als Zeichenkette
///
/// Der Multiplikator wird auf drei Zeichen abgeschnitten (also eine
/// Nachkommastelle, nicht gerundet). `None` wenn nicht angefordert oder
/// gleich der Standardstufe.
pub fn qualitaetsstufe(bitrate_multiplier: f64) -> Option<String> {
    if bitrate_multiplier == 0.0 {
        return None;
    }
    let ziffern: String = format!("{bitrate_multiplier:.6}").chars().take(3).collect();
    let stufe = format!("x{ziffern}");
    if stufe == STANDARD_QUALITAET {
        None
    } else {
        Some(stufe)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaOptions {
    pub tracks: Vec<TrackOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOptions {
    #[serde(rename = "type")]
    pub typ: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            typ: "webrtc".into(),
        }
    }
}

/// Nutzlast der Initialisierungs-Anfrage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitOptions {
    pub media: MediaOptions,
    pub transport: TransportOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl InitOptions {
    pub fn track_hinzufuegen(&mut self, track: TrackOptions) {
        self.media.tracks.push(track);
    }

    pub fn track(&self, kind: MediaKind) -> Option<&TrackOptions> {
        self.media.tracks.iter().find(|t| t.kind == kind)
    }
}

/// Bestaetigung des Handshakes durch den Server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitAck {
    pub session_id: String,
    pub transport_id: String,
}
