//! Subscribe – entfernten Stream der Konferenz empfangen
//!
//! Ablauf: Optionen pruefen ──► RecvOnly-Transceiver ──► Init-Anfrage
//! (entfernte Stream-ID) ──► Ack mit Session-ID ──► Offer. Erfolg meldet
//! erst der Latch aus Medien-Ankunft und Serverbestaetigung.

use konferenz_core::stream::{MediaKind, MediaStream, RemoteStream, SubscribeOptions};
use konferenz_core::KonferenzError;
use konferenz_protocol::init::{qualitaetsstufe, VideoParameters};
use konferenz_protocol::{InitAck, InitOptions, TrackOptions};
use std::sync::Arc;

use crate::callbacks::FehlerCallback;
use crate::channel::{PeerConnectionChannel, Richtungen};
use crate::compat::{option_erlaubt, simulcast_variante};
use crate::engine::{TransceiverDirection, TransceiverInit};
use crate::publish::NULLZEIGER;
use crate::state::VerhandlungsEreignis;

pub(crate) const OPTION_NICHT_UNTERSTUETZT: &str = "Unsupported subscribe option.";
pub(crate) const ABO_LAEUFT: &str = "Subscribing this stream.";

impl PeerConnectionChannel {
    /// Abonniert einen entfernten Stream
    ///
    /// Abgelehnt ohne Serverkontakt werden: fehlender Stream, unpassende
    /// Optionen und ein bereits laufendes Abo. Ein laufendes Abo bleibt
    /// dabei unberuehrt.
    pub fn abonnieren<E, F>(
        &self,
        stream: Option<Arc<RemoteStream>>,
        optionen: SubscribeOptions,
        bei_erfolg: E,
        bei_fehler: F,
    ) where
        E: FnOnce(String) + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        let bei_fehler: FehlerCallback = Box::new(bei_fehler);
        let Some(stream) = stream else {
            self.fehler_melden(Some(bei_fehler), NULLZEIGER);
            return;
        };
        tracing::info!(
            kanal = %self.kanal_id,
            stream = %stream.id,
            audio = stream.has_audio,
            video = stream.has_video,
            "Subscribe eines entfernten Streams"
        );

        if !option_erlaubt(&optionen, &stream.settings, &stream.capabilities) {
            self.fehler_melden(Some(bei_fehler), OPTION_NICHT_UNTERSTUETZT);
            return;
        }
        if self.callbacks.subscribe_ausstehend() {
            self.fehler_melden(Some(bei_fehler), ABO_LAEUFT);
            return;
        }

        self.callbacks.subscribe_registrieren(Box::new(bei_erfolg), bei_fehler);
        self.callbacks.latch_zuruecksetzen();

        let mit_audio = stream.has_audio && !optionen.audio.disabled;
        let mit_video = stream.has_video && !optionen.video.disabled;
        *self.richtungen.lock() = Richtungen {
            audio: TransceiverDirection::RecvOnly,
            video: TransceiverDirection::RecvOnly,
        };
        if let Some(pc) = self.peer_connection() {
            let arten = [(MediaKind::Audio, mit_audio), (MediaKind::Video, mit_video)];
            for (kind, aktiv) in arten {
                if !aktiv {
                    continue;
                }
                let init = TransceiverInit {
                    direction: TransceiverDirection::RecvOnly,
                    ..Default::default()
                };
                if let Err(e) = pc.add_transceiver(kind, init) {
                    tracing::error!(kanal = %self.kanal_id, kind = %kind, fehler = %e, "Transceiver nicht hinzugefuegt");
                }
            }
        }

        let init = subscribe_optionen(&stream, &optionen, mit_audio, mit_video);
        self.verhandlung_fortschreiben(VerhandlungsEreignis::EinladungGesendet);

        let transport = Arc::clone(&self.transport);
        let schwach = self.selbst.clone();
        let stream_id = stream.id.clone();
        *self.subscribed_stream.lock() = Some(stream);
        self.laufzeit.spawn(async move {
            let ergebnis = transport
                .send_initialization_message(init, "", &stream_id)
                .await;
            let Some(kanal) = schwach.upgrade() else { return };
            match ergebnis {
                Ok(ack) => kanal.subscribe_bestaetigt(ack),
                Err(e) => kanal.init_fehlgeschlagen(e),
            }
        });
    }

    fn subscribe_bestaetigt(&self, ack: InitAck) {
        tracing::debug!(kanal = %self.kanal_id, transport_id = %ack.transport_id, "Subscribe-Handshake bestaetigt");
        self.session_id_setzen(ack.session_id);
        self.verhandlung_fortschreiben(VerhandlungsEreignis::HandshakeBestaetigt);
        self.angebot_erstellen();
    }

    /// Engine meldet den entfernten Medienstream
    pub(crate) fn stream_hinzugefuegt(&self, media: MediaStream) {
        tracing::info!(kanal = %self.kanal_id, stream = %media.id, "Entfernter Stream hinzugefuegt");
        if let Some(stream) = self.subscribed_stream() {
            stream.media_setzen(media);
        }
        if self.callbacks.subscribe_ausstehend() && self.callbacks.medien_eingetroffen() {
            self.subscribe_erfolg_posten();
        }
    }
}

/// Baut die Init-Anfrage fuer Subscribe
fn subscribe_optionen(
    stream: &RemoteStream,
    optionen: &SubscribeOptions,
    mit_audio: bool,
    mit_video: bool,
) -> InitOptions {
    let mut init = InitOptions::default();

    if mit_audio {
        let mut track = TrackOptions::neu(MediaKind::Audio, true);
        track.from = Some(stream.id.clone());
        init.track_hinzufuegen(track);
    }

    if mit_video {
        let video = &optionen.video;
        let mut track = TrackOptions::neu(MediaKind::Video, mit_audio);

        track.from = if video.rid.is_empty() {
            Some(stream.id.clone())
        } else {
            simulcast_variante(&stream.settings, &video.rid).map(|v| v.track_id.clone())
        };
        track.parameters = Some(VideoParameters {
            resolution: video.resolution.ist_gesetzt().then_some(video.resolution),
            bitrate: qualitaetsstufe(video.bitrate_multiplier),
            key_frame_interval: (video.key_frame_interval != 0).then_some(video.key_frame_interval),
            // Server erwartet ganze Bilder pro Sekunde
            framerate: (video.frame_rate != 0.0).then_some(video.frame_rate as u32),
        });
        if !video.rid.is_empty() {
            track.simulcast_rid = Some(video.rid.clone());
        }
        init.track_hinzufuegen(track);
    }
    init
}
