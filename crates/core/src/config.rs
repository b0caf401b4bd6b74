//! Kanal-Konfiguration
//!
//! Wird aus einer TOML-Datei geladen. Alle Felder haben sinnvolle
//! Standardwerte, sodass ein Kanal ohne Konfigurationsdatei lauffaehig ist.

use serde::{Deserialize, Serialize};

/// Vollstaendige Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KonferenzConfig {
    /// Einstellungen pro PeerConnection-Kanal
    pub kanal: ChannelConfig,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

impl KonferenzConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei
    ///
    /// Fehlt die Datei, werden Standardwerte verwendet.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Kanal
// ---------------------------------------------------------------------------

/// Einstellungen eines PeerConnection-Kanals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Audio-Codecs in Praeferenzreihenfolge
    pub audio: Vec<AudioEncodingParameters>,
    /// Video-Codecs in Praeferenzreihenfolge
    pub video: Vec<VideoEncodingParameters>,
    /// Eigene Video-Codec-Reihenfolge fuer Bildschirmfreigaben (leer = wie `video`)
    pub bildschirm_video_codecs: Vec<String>,
    /// RTP/RTCP nicht buendeln (`use_rtp_mux = false` beim Offer)
    pub ice_unbundle: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            audio: vec![AudioEncodingParameters::default()],
            video: vec![VideoEncodingParameters::default()],
            bildschirm_video_codecs: Vec::new(),
            ice_unbundle: false,
        }
    }
}

impl ChannelConfig {
    /// Audio-Codec-Namen in konfigurierter Reihenfolge
    pub fn audio_codecs(&self) -> Vec<String> {
        self.audio.iter().map(|a| a.codec.clone()).collect()
    }

    /// Video-Codec-Namen; Bildschirmfreigaben bekommen ggf. eine eigene Liste
    pub fn video_codecs(&self, bildschirm: bool) -> Vec<String> {
        if bildschirm && !self.bildschirm_video_codecs.is_empty() {
            return self.bildschirm_video_codecs.clone();
        }
        self.video.iter().map(|v| v.codec.clone()).collect()
    }

    /// Maximale Audio-Bitrate des bevorzugten Codecs (0 = unbegrenzt)
    pub fn audio_max_bitrate_kbps(&self) -> u32 {
        self.audio.first().map(|a| a.max_bitrate_kbps).unwrap_or(0)
    }

    /// Maximale Video-Bitrate des bevorzugten Codecs (0 = unbegrenzt)
    pub fn video_max_bitrate_kbps(&self) -> u32 {
        self.video.first().map(|v| v.max_bitrate_kbps).unwrap_or(0)
    }

    /// Per-Encoding-Parameter fuer Video-Sender (Simulcast-Layer)
    pub fn video_encodings(&self) -> &[RtpEncodingKonfig] {
        self.video
            .first()
            .map(|v| v.rtp_encoding_parameters.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioEncodingParameters {
    /// Codec-Name wie in `a=rtpmap`, z.B. "opus"
    pub codec: String,
    pub max_bitrate_kbps: u32,
}

impl Default for AudioEncodingParameters {
    fn default() -> Self {
        Self {
            codec: "opus".into(),
            max_bitrate_kbps: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoEncodingParameters {
    /// Codec-Name wie in `a=rtpmap`, z.B. "VP8", "H264"
    pub codec: String,
    pub max_bitrate_kbps: u32,
    pub rtp_encoding_parameters: Vec<RtpEncodingKonfig>,
}

impl Default for VideoEncodingParameters {
    fn default() -> Self {
        Self {
            codec: "VP8".into(),
            max_bitrate_kbps: 0,
            rtp_encoding_parameters: Vec::new(),
        }
    }
}

/// Netzwerk-Prioritaet eines Encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkPriority {
    #[default]
    Default,
    VeryLow,
    Low,
    Medium,
    High,
}

/// Konfiguration eines einzelnen Sende-Encodings; Nullwerte = Engine-Standard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtpEncodingKonfig {
    pub rid: String,
    pub max_bitrate_bps: u32,
    pub max_framerate: f64,
    pub scale_resolution_down_by: f64,
    pub num_temporal_layers: u32,
    pub priority: NetworkPriority,
    pub active: bool,
}

impl Default for RtpEncodingKonfig {
    fn default() -> Self {
        Self {
            rid: String::new(),
            max_bitrate_bps: 0,
            max_framerate: 0.0,
            scale_resolution_down_by: 0.0,
            num_temporal_layers: 0,
            priority: NetworkPriority::Default,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standardwerte() {
        let config = KonferenzConfig::default();
        assert_eq!(config.kanal.audio_codecs(), vec!["opus".to_string()]);
        assert_eq!(config.kanal.video_codecs(false), vec!["VP8".to_string()]);
        assert!(!config.kanal.ice_unbundle);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn bildschirm_codecs_ueberschreiben_video_liste() {
        let mut kanal = ChannelConfig::default();
        kanal.bildschirm_video_codecs = vec!["H264".into()];
        assert_eq!(kanal.video_codecs(true), vec!["H264".to_string()]);
        assert_eq!(kanal.video_codecs(false), vec!["VP8".to_string()]);
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let config = KonferenzConfig::laden("/pfad/existiert/nicht.toml").unwrap();
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn toml_mit_simulcast_layern() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            datei,
            r#"
[kanal]
ice_unbundle = true

[[kanal.video]]
codec = "H264"
max_bitrate_kbps = 1500

[[kanal.video.rtp_encoding_parameters]]
rid = "q"
scale_resolution_down_by = 4.0
priority = "very-low"

[[kanal.video.rtp_encoding_parameters]]
rid = "f"
active = false

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = KonferenzConfig::laden(datei.path().to_str().unwrap()).unwrap();
        assert!(config.kanal.ice_unbundle);
        assert_eq!(config.kanal.video_max_bitrate_kbps(), 1500);
        let encodings = config.kanal.video_encodings();
        assert_eq!(encodings.len(), 2);
        assert_eq!(encodings[0].priority, NetworkPriority::VeryLow);
        assert!(encodings[0].active);
        assert!(!encodings[1].active);
        assert_eq!(config.logging.level, "debug");
        // Nicht angegebene Abschnitte behalten ihre Standardwerte
        assert_eq!(config.kanal.audio_codecs(), vec!["opus".to_string()]);
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        writeln!(datei, "kanal = [").unwrap();
        assert!(KonferenzConfig::laden(datei.path().to_str().unwrap()).is_err());
    }
}
