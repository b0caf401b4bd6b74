//! Publish – lokalen Stream an die Konferenz senden
//!
//! Ablauf: pruefen ──► Init-Anfrage (lokale Stream-ID) ──► Ack mit
//! Session-ID ──► SendOnly-Transceiver je Track ──► Offer. Der Erfolg wird
//! erst mit dem "success" des Servers gemeldet.

use konferenz_core::config::{NetworkPriority, RtpEncodingKonfig};
use konferenz_core::stream::{AudioSourceInfo, LocalStream, MediaKind, MediaStream, VideoSourceInfo};
use konferenz_core::KonferenzError;
use konferenz_protocol::init::TrackSource;
use konferenz_protocol::{InitAck, InitOptions, TrackOptions};
use std::sync::Arc;

use crate::callbacks::FehlerCallback;
use crate::channel::{PeerConnectionChannel, Richtungen};
use crate::engine::{Priority, SendEncoding, TransceiverDirection, TransceiverInit};
use crate::error::SignalingError;
use crate::state::VerhandlungsEreignis;

pub(crate) const NULLZEIGER: &str = "Nullptr is not allowed.";
pub(crate) const STREAM_BEENDET: &str = "Cannot publish ended stream.";
pub(crate) const KEINE_TRACKS: &str = "Cannot publish media stream without any tracks.";

/// Hoechste erlaubte Anzahl temporaler Layer
const MAX_TEMPORALE_LAYER: u32 = 4;

impl PeerConnectionChannel {
    /// Publiziert einen lokalen Stream
    ///
    /// Lokale Ablehnungen (kein Stream, keine Tracks, alle Tracks beendet)
    /// melden sich ueber `bei_fehler`, ohne den Server zu kontaktieren.
    pub fn publizieren<E, F>(&self, stream: Option<Arc<LocalStream>>, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce(String) + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        tracing::info!(kanal = %self.kanal_id, "Publish eines lokalen Streams");
        let bei_fehler: FehlerCallback = Box::new(bei_fehler);

        let Some((stream, media)) = stream.and_then(|s| s.media.clone().map(|m| (s, m))) else {
            self.fehler_melden(Some(bei_fehler), NULLZEIGER);
            return;
        };
        if !media.hat_tracks() {
            self.fehler_melden(Some(bei_fehler), KEINE_TRACKS);
            return;
        }
        if media.ist_beendet() {
            self.fehler_melden(Some(bei_fehler), STREAM_BEENDET);
            return;
        }

        self.callbacks.publish_registrieren(Box::new(bei_erfolg), bei_fehler);
        *self.published_stream.lock() = Some(Arc::clone(&stream));
        *self.richtungen.lock() = Richtungen {
            audio: TransceiverDirection::SendOnly,
            video: TransceiverDirection::SendOnly,
        };

        let optionen = publish_optionen(&stream, &media);
        self.verhandlung_fortschreiben(VerhandlungsEreignis::EinladungGesendet);

        let transport = Arc::clone(&self.transport);
        let schwach = self.selbst.clone();
        self.laufzeit.spawn(async move {
            let ergebnis = transport
                .send_initialization_message(optionen, &media.id, "")
                .await;
            let Some(kanal) = schwach.upgrade() else { return };
            match ergebnis {
                Ok(ack) => kanal.publish_bestaetigt(ack, &media),
                Err(e) => kanal.init_fehlgeschlagen(e),
            }
        });
    }

    fn publish_bestaetigt(&self, ack: InitAck, media: &MediaStream) {
        tracing::debug!(kanal = %self.kanal_id, transport_id = %ack.transport_id, "Publish-Handshake bestaetigt");
        self.session_id_setzen(ack.session_id);
        self.verhandlung_fortschreiben(VerhandlungsEreignis::HandshakeBestaetigt);

        let Some(pc) = self.peer_connection() else {
            tracing::warn!(kanal = %self.kanal_id, "PeerConnection bereits geschlossen");
            return;
        };

        for track in &media.audio_tracks {
            let init = TransceiverInit {
                direction: TransceiverDirection::SendOnly,
                stream_ids: vec![media.id.clone()],
                send_encodings: Vec::new(),
            };
            if let Err(e) = pc.add_track_transceiver(track, init) {
                tracing::error!(kanal = %self.kanal_id, track = %track.id, fehler = %e, "Audio-Transceiver nicht hinzugefuegt");
            }
        }

        let encodings: Vec<SendEncoding> = self
            .config
            .video_encodings()
            .iter()
            .map(sende_encoding)
            .collect();
        for track in &media.video_tracks {
            let init = TransceiverInit {
                direction: TransceiverDirection::SendOnly,
                stream_ids: vec![media.id.clone()],
                send_encodings: encodings.clone(),
            };
            if let Err(e) = pc.add_track_transceiver(track, init) {
                tracing::error!(kanal = %self.kanal_id, track = %track.id, fehler = %e, "Video-Transceiver nicht hinzugefuegt");
            }
        }

        self.angebot_erstellen();
    }

    /// Init-Anfrage vom Server abgelehnt oder nicht zugestellt
    pub(crate) fn init_fehlgeschlagen(&self, fehler: SignalingError) {
        tracing::error!(kanal = %self.kanal_id, fehler = %fehler, "Init-Anfrage fehlgeschlagen");
        self.verhandlung_fortschreiben(VerhandlungsEreignis::Beendet);
        self.registrierten_fehler_posten(fehler.into());
    }
}

/// Baut die Init-Anfrage fuer Publish
fn publish_optionen(stream: &LocalStream, media: &MediaStream) -> InitOptions {
    let mit_audio = !media.audio_tracks.is_empty();
    let mut optionen = InitOptions {
        attributes: Some(stream.attributes.clone()),
        ..Default::default()
    };

    if mit_audio {
        let mut track = TrackOptions::neu(MediaKind::Audio, true);
        track.source = Some(match stream.source.audio {
            AudioSourceInfo::ScreenCast => TrackSource::ScreenCast,
            _ => TrackSource::Mic,
        });
        optionen.track_hinzufuegen(track);
    }
    if !media.video_tracks.is_empty() {
        let mut track = TrackOptions::neu(MediaKind::Video, mit_audio);
        track.source = Some(match stream.source.video {
            VideoSourceInfo::ScreenCast => TrackSource::ScreenCast,
            _ => TrackSource::Camera,
        });
        optionen.track_hinzufuegen(track);
    }
    optionen
}

/// Uebersetzt ein konfiguriertes Encoding; Nullwerte bleiben Engine-Standard
fn sende_encoding(konfig: &RtpEncodingKonfig) -> SendEncoding {
    SendEncoding {
        rid: (!konfig.rid.is_empty()).then(|| konfig.rid.clone()),
        max_bitrate_bps: (konfig.max_bitrate_bps != 0).then_some(konfig.max_bitrate_bps),
        max_framerate: (konfig.max_framerate != 0.0).then_some(konfig.max_framerate),
        scale_resolution_down_by: (konfig.scale_resolution_down_by > 0.0)
            .then_some(konfig.scale_resolution_down_by),
        num_temporal_layers: (1..=MAX_TEMPORALE_LAYER)
            .contains(&konfig.num_temporal_layers)
            .then_some(konfig.num_temporal_layers),
        network_priority: match konfig.priority {
            NetworkPriority::Default => None,
            NetworkPriority::VeryLow => Some(Priority::VeryLow),
            NetworkPriority::Low => Some(Priority::Low),
            NetworkPriority::Medium => Some(Priority::Medium),
            NetworkPriority::High => Some(Priority::High),
        },
        active: konfig.active,
    }
}
