//! Schnittstelle zur Media-Engine
//!
//! Die Engine (Verbindungsaufbau, Codecs, ICE-Kandidatensuche) ist ein
//! externer Kollaborateur. Der Kanal spricht sie ueber [`PeerConnection`] an;
//! umgekehrt meldet die Engine ihre Ereignisse ueber
//! [`PeerConnectionEvents`]. Die Engine sollte den Kanal dabei nur schwach
//! (`Weak`) referenzieren.

use async_trait::async_trait;
use konferenz_core::stream::{MediaKind, MediaStream, MediaTrack};
use konferenz_protocol::SdpTyp;

use crate::error::{SignalingError, SignalingResult};
use crate::state::{IceConnectionState, IceGatheringState, SignalingState};

/// Session-Description (Typ + SDP-Text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub typ: SdpTyp,
    pub sdp: String,
}

impl SessionDescription {
    /// Erstellt eine Description aus SDP-Text
    ///
    /// SDP muss mit der Versionszeile `v=` beginnen.
    pub fn parsen(typ: SdpTyp, sdp: &str) -> SignalingResult<Self> {
        if !sdp.trim_start().starts_with("v=") {
            return Err(SignalingError::UngueltigeBeschreibung(format!(
                "{typ}: keine Versionszeile"
            )));
        }
        Ok(Self {
            typ,
            sdp: sdp.to_string(),
        })
    }
}

/// Optionen fuer CreateOffer/CreateAnswer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferAnswerOptions {
    /// RTP/RTCP ueber einen Transport buendeln
    pub use_rtp_mux: bool,
}

impl Default for OfferAnswerOptions {
    fn default() -> Self {
        Self { use_rtp_mux: true }
    }
}

/// Richtung eines Transceivers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransceiverDirection {
    #[default]
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

/// Netzwerk-Prioritaet eines Sende-Encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    VeryLow,
    Low,
    Medium,
    High,
}

/// Parameter eines einzelnen Sende-Encodings; `None` = Engine-Standard
#[derive(Debug, Clone, PartialEq)]
pub struct SendEncoding {
    pub rid: Option<String>,
    pub max_bitrate_bps: Option<u32>,
    pub max_framerate: Option<f64>,
    pub scale_resolution_down_by: Option<f64>,
    pub num_temporal_layers: Option<u32>,
    pub network_priority: Option<Priority>,
    pub active: bool,
}

impl Default for SendEncoding {
    fn default() -> Self {
        Self {
            rid: None,
            max_bitrate_bps: None,
            max_framerate: None,
            scale_resolution_down_by: None,
            num_temporal_layers: None,
            network_priority: None,
            active: true,
        }
    }
}

/// Initialisierung eines Transceivers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransceiverInit {
    pub direction: TransceiverDirection,
    pub stream_ids: Vec<String>,
    pub send_encodings: Vec<SendEncoding>,
}

/// Lokal gefundener ICE-Kandidat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub sdp_mid: String,
    pub sdp_m_line_index: u32,
    /// Kandidaten-Zeile ohne `a=`-Praefix
    pub candidate: String,
}

/// Verbindungsstatistik
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStats {
    pub bytes_gesendet: u64,
    pub bytes_empfangen: u64,
    pub pakete_verloren: u64,
    pub rtt_ms: Option<f64>,
}

/// Von der Media-Engine bereitgestellte PeerConnection
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self, optionen: OfferAnswerOptions) -> SignalingResult<SessionDescription>;

    async fn create_answer(&self, optionen: OfferAnswerOptions) -> SignalingResult<SessionDescription>;

    async fn set_local_description(&self, beschreibung: SessionDescription) -> SignalingResult<()>;

    async fn set_remote_description(&self, beschreibung: SessionDescription) -> SignalingResult<()>;

    /// Aktuell gesetzte lokale Description
    fn local_description(&self) -> Option<SessionDescription>;

    /// Transceiver fuer einen vorhandenen lokalen Track
    fn add_track_transceiver(&self, track: &MediaTrack, init: TransceiverInit) -> SignalingResult<()>;

    /// Transceiver nur nach Medienart (Empfang)
    fn add_transceiver(&self, kind: MediaKind, init: TransceiverInit) -> SignalingResult<()>;

    /// Maximale Sende-Bitrate; erst nach gesetzter lokaler Description gueltig
    fn set_max_bitrate(&self, kind: MediaKind, max_bitrate_bps: u32) -> SignalingResult<()>;

    async fn get_stats(&self) -> SignalingResult<ConnectionStats>;

    fn close(&self);
}

/// Ereignisse der Engine an den Kanal
///
/// Die Methoden koennen aus beliebigen Threads aufgerufen werden und
/// blockieren nicht.
pub trait PeerConnectionEvents: Send + Sync {
    fn bei_signaling_aenderung(&self, zustand: SignalingState);

    fn bei_ice_verbindung_aenderung(&self, zustand: IceConnectionState);

    fn bei_ice_sammlung_aenderung(&self, zustand: IceGatheringState);

    fn bei_ice_kandidat(&self, kandidat: IceCandidate);

    /// Kandidaten-Zeilen ohne `a=`-Praefix
    fn bei_kandidaten_entfernt(&self, kandidaten: Vec<String>);

    fn bei_stream_hinzugefuegt(&self, media: MediaStream);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beschreibung_braucht_versionszeile() {
        assert!(SessionDescription::parsen(SdpTyp::Answer, "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n").is_ok());
        assert!(SessionDescription::parsen(SdpTyp::Answer, "").is_err());
        assert!(SessionDescription::parsen(SdpTyp::Answer, "kaputt").is_err());
    }

    #[test]
    fn encoding_standard_ist_aktiv() {
        let e = SendEncoding::default();
        assert!(e.active);
        assert!(e.rid.is_none());
    }
}
