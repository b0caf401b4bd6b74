//! Offer/Answer-Verhandlung
//!
//! ```text
//! create_offer ──► Codecs umsortieren ──► set_local_description
//!                                              │
//!                      Bitrate anwenden ◄──────┘
//!                             │
//!                             ▼
//!               { id, signaling: { type, sdp } } ──► Server
//!                                                       │
//! set_remote_description("answer") ◄────────────────────┘
//! ```
//!
//! Kandidaten laufen ueber den [`CandidateBuffer`](crate::candidates::CandidateBuffer)
//! und werden erst bei stabilem Signaling gesendet.

use konferenz_core::stream::MediaKind;
use konferenz_core::KonferenzError;
use konferenz_protocol::{SdpTyp, ServerNachricht, SignalingEnvelope, SignalingPayload};
use serde_json::Value;
use std::sync::{Arc, Weak};

use crate::channel::PeerConnectionChannel;
use crate::engine::{IceCandidate, OfferAnswerOptions, PeerConnection, SessionDescription};
use crate::error::SignalingResult;
use crate::sdp::bevorzugte_codecs_setzen;
use crate::state::{NegotiationState, NeuverhandlungsEreignis, SignalingState, VerhandlungsEreignis};

pub(crate) const LOKALE_BESCHREIBUNG_FEHLGESCHLAGEN: &str = "Failed to set local description.";
pub(crate) const ENTFERNTE_BESCHREIBUNG_FEHLGESCHLAGEN: &str = "Failed to set remote description.";
pub(crate) const SERVER_FEHLER: &str = "Server internal error during connection establishment.";

#[derive(Debug, Clone, Copy)]
enum Erstellen {
    Offer,
    Answer,
}

impl PeerConnectionChannel {
    // ------------------------------------------------------------------
    // Lokale Description
    // ------------------------------------------------------------------

    /// Laesst die Engine ein Offer erstellen und an den Server senden
    pub fn angebot_erstellen(&self) {
        tracing::info!(kanal = %self.kanal_id, "Offer wird erstellt");
        self.beschreibung_erstellen(Erstellen::Offer);
    }

    /// Laesst die Engine ein Answer erstellen und an den Server senden
    pub fn antwort_erstellen(&self) {
        tracing::info!(kanal = %self.kanal_id, "Answer wird erstellt");
        self.beschreibung_erstellen(Erstellen::Answer);
    }

    fn beschreibung_erstellen(&self, art: Erstellen) {
        let Some(pc) = self.peer_connection() else {
            tracing::warn!(kanal = %self.kanal_id, "Keine PeerConnection – Description nicht erstellt");
            return;
        };
        let optionen = OfferAnswerOptions {
            use_rtp_mux: !self.config.ice_unbundle,
        };
        let schwach = self.selbst.clone();
        self.laufzeit.spawn(async move {
            let ergebnis = match art {
                Erstellen::Offer => pc.create_offer(optionen).await,
                Erstellen::Answer => pc.create_answer(optionen).await,
            };
            Self::lokale_beschreibung_anwenden(schwach, pc, ergebnis).await;
        });
    }

    async fn lokale_beschreibung_anwenden(
        schwach: Weak<Self>,
        pc: Arc<dyn PeerConnection>,
        ergebnis: SignalingResult<SessionDescription>,
    ) {
        let beschreibung = match ergebnis {
            Ok(b) => b,
            Err(e) => {
                // Wird nur protokolliert
                tracing::warn!(fehler = %e, "Description konnte nicht erstellt werden");
                return;
            }
        };

        let beschreibung = {
            let Some(kanal) = schwach.upgrade() else { return };
            SessionDescription {
                typ: beschreibung.typ,
                sdp: kanal.codecs_bevorzugen(&beschreibung.sdp),
            }
        };

        let ergebnis = pc.set_local_description(beschreibung).await;
        let Some(kanal) = schwach.upgrade() else { return };
        match ergebnis {
            Ok(()) => kanal.lokale_beschreibung_gesetzt(pc.as_ref()),
            Err(e) => {
                tracing::error!(kanal = %kanal.kanal_id, fehler = %e, "Lokale Description nicht gesetzt");
                kanal.registrierten_fehler_posten(KonferenzError::verhandlung(
                    LOKALE_BESCHREIBUNG_FEHLGESCHLAGEN,
                ));
                kanal.stream_fehler(LOKALE_BESCHREIBUNG_FEHLGESCHLAGEN);
            }
        }
    }

    /// Sortiert die Codecs gemaess Konfiguration; Bildschirm-Video hat eigene Liste
    fn codecs_bevorzugen(&self, sdp: &str) -> String {
        let bildschirm = match (self.published_stream(), self.subscribed_stream()) {
            (Some(s), _) => s.source.ist_bildschirm_video(),
            (None, Some(s)) => s.source.ist_bildschirm_video(),
            (None, None) => false,
        };
        let sdp = bevorzugte_codecs_setzen(sdp, MediaKind::Audio, &self.config.audio_codecs());
        bevorzugte_codecs_setzen(&sdp, MediaKind::Video, &self.config.video_codecs(bildschirm))
    }

    fn lokale_beschreibung_gesetzt(&self, pc: &dyn PeerConnection) {
        tracing::info!(kanal = %self.kanal_id, "Lokale Description gesetzt");

        // Bitrate erst jetzt, vorher existieren keine Sender
        self.bitrate_anwenden(pc);

        let Some(beschreibung) = pc.local_description() else {
            tracing::warn!(kanal = %self.kanal_id, "Engine liefert keine lokale Description");
            return;
        };
        let nachricht = SignalingEnvelope::neu(
            self.session_id().to_string(),
            SignalingPayload::beschreibung(beschreibung.typ, beschreibung.sdp),
        );
        self.ausgang.senden(nachricht);
        self.verhandlung_fortschreiben(VerhandlungsEreignis::BeschreibungGesendet);
    }

    fn bitrate_anwenden(&self, pc: &dyn PeerConnection) {
        let grenzen = [
            (MediaKind::Audio, self.config.audio_max_bitrate_kbps()),
            (MediaKind::Video, self.config.video_max_bitrate_kbps()),
        ];
        for (kind, kbps) in grenzen {
            if kbps == 0 {
                continue;
            }
            if let Err(e) = pc.set_max_bitrate(kind, kbps.saturating_mul(1000)) {
                tracing::warn!(kanal = %self.kanal_id, kind = %kind, fehler = %e, "Bitrate nicht gesetzt");
            }
        }
    }

    // ------------------------------------------------------------------
    // Entfernte Description
    // ------------------------------------------------------------------

    /// Wendet die Description des Servers an
    ///
    /// Der Typ wird unabhaengig von `typ` immer als "answer" gesetzt.
    pub fn remote_description_setzen(&self, typ: &str, sdp: &str) {
        tracing::debug!(kanal = %self.kanal_id, typ, "Remote-Description empfangen");
        let beschreibung = match SessionDescription::parsen(SdpTyp::Answer, sdp) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(kanal = %self.kanal_id, fehler = %e, "Remote-Description nicht erstellt");
                self.registrierten_fehler_posten(KonferenzError::verhandlung(
                    ENTFERNTE_BESCHREIBUNG_FEHLGESCHLAGEN,
                ));
                return;
            }
        };
        let Some(pc) = self.peer_connection() else {
            tracing::warn!(kanal = %self.kanal_id, "Keine PeerConnection – Remote-Description verworfen");
            return;
        };
        let schwach = self.selbst.clone();
        self.laufzeit.spawn(async move {
            let ergebnis = pc.set_remote_description(beschreibung).await;
            let Some(kanal) = schwach.upgrade() else { return };
            match ergebnis {
                Ok(()) => {
                    tracing::info!(kanal = %kanal.kanal_id, "Remote-Description gesetzt");
                    kanal.neuverhandlung_fortschreiben(NeuverhandlungsEreignis::Abgeschlossen);
                }
                Err(e) => {
                    tracing::error!(kanal = %kanal.kanal_id, fehler = %e, "Remote-Description nicht gesetzt");
                    kanal.registrierten_fehler_posten(KonferenzError::verhandlung(
                        ENTFERNTE_BESCHREIBUNG_FEHLGESCHLAGEN,
                    ));
                    kanal.stream_fehler(ENTFERNTE_BESCHREIBUNG_FEHLGESCHLAGEN);
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // ICE
    // ------------------------------------------------------------------

    /// Startet den ICE-Pfad neu, sofort bei stabilem Signaling, sonst beim
    /// naechsten Wechsel nach stable
    pub fn ice_restart(&self) {
        let sofort = {
            let mut stand = self.signaling.lock();
            if stand.zustand.ist_stabil() {
                true
            } else {
                stand.restart_vorgemerkt = true;
                false
            }
        };
        if sofort {
            self.ice_restart_ausfuehren();
        } else {
            tracing::info!(kanal = %self.kanal_id, "ICE-Restart vorgemerkt");
        }
    }

    fn ice_restart_ausfuehren(&self) {
        tracing::info!(kanal = %self.kanal_id, "ICE-Restart");
        if self.verhandlungs_zustand() == NegotiationState::Connected {
            self.neuverhandlung_fortschreiben(NeuverhandlungsEreignis::Gesendet);
        }
        self.angebot_erstellen();
    }

    pub(crate) fn signaling_geaendert(&self, zustand: SignalingState) {
        tracing::info!(kanal = %self.kanal_id, zustand = ?zustand, "Signaling-Zustand geaendert");
        let stabil = zustand.ist_stabil();
        let restart = {
            let mut stand = self.signaling.lock();
            stand.zustand = zustand;
            stabil && std::mem::take(&mut stand.restart_vorgemerkt)
        };
        let anzahl = self
            .kandidaten
            .stabilitaet_melden(stabil, restart, |n| self.ausgang.senden(n));

        if restart {
            tracing::debug!(kanal = %self.kanal_id, verworfen = anzahl, "Kandidaten vor ICE-Restart verworfen");
            self.ice_restart_ausfuehren();
        } else if anzahl > 0 {
            tracing::debug!(kanal = %self.kanal_id, gesendet = anzahl, "Gepufferte Kandidaten gesendet");
        }
    }

    pub(crate) fn kandidat_gefunden(&self, kandidat: IceCandidate) {
        tracing::debug!(kanal = %self.kanal_id, mid = %kandidat.sdp_mid, "ICE-Kandidat gefunden");
        let nachricht = SignalingEnvelope::kandidat(
            self.session_id().to_string(),
            kandidat.sdp_mid,
            kandidat.sdp_m_line_index,
            &kandidat.candidate,
        );
        self.kandidaten.anbieten(nachricht, |n| self.ausgang.senden(n));
    }

    pub(crate) fn kandidaten_entfernt(&self, kandidaten: Vec<String>) {
        if kandidaten.is_empty() {
            return;
        }
        tracing::debug!(kanal = %self.kanal_id, anzahl = kandidaten.len(), "ICE-Kandidaten entfernt");
        let nachricht = SignalingEnvelope::entfernte_kandidaten(
            self.session_id().to_string(),
            kandidaten.iter().map(String::as_str),
        );
        self.ausgang.senden(nachricht);
    }

    // ------------------------------------------------------------------
    // Eingehende Servernachrichten
    // ------------------------------------------------------------------

    /// Verarbeitet eine Signaling-Nachricht des Servers
    pub fn bei_signaling_nachricht(&self, nachricht: &Value) {
        match ServerNachricht::aus_json(nachricht) {
            ServerNachricht::Erfolg => self.server_erfolg(),
            ServerNachricht::Fehlschlag => {
                if !self.ist_verbunden() && self.callbacks.fehler_ausstehend() {
                    self.registrierten_fehler_posten(KonferenzError::verhandlung(SERVER_FEHLER));
                }
            }
            ServerNachricht::UnbekannterStatus(status) => {
                tracing::debug!(kanal = %self.kanal_id, status = %status, "Unbekannter Status ignoriert");
            }
            ServerNachricht::Beschreibung { typ, sdp } => {
                tracing::info!(kanal = %self.kanal_id, typ = %typ, "Signaling-Nachricht");
                if typ == "answer" {
                    self.remote_description_setzen(&typ, &sdp);
                } else {
                    tracing::error!(kanal = %self.kanal_id, typ = %typ, "Nur answer wird verarbeitet");
                }
            }
            ServerNachricht::OhneTyp => {
                tracing::info!(kanal = %self.kanal_id, "Nachricht ohne type ignoriert");
            }
            ServerNachricht::Ungueltig => {
                tracing::error!(kanal = %self.kanal_id, "Ungueltige Signaling-Nachricht");
            }
            ServerNachricht::Leer => {
                tracing::warn!(kanal = %self.kanal_id, "Leere oder ungueltige Servernachricht ignoriert");
            }
        }
    }

    fn server_erfolg(&self) {
        if self.callbacks.publish_ausstehend() {
            self.publish_erfolg_posten();
        } else if self.callbacks.subscribe_ausstehend() && self.callbacks.server_bestaetigt() {
            self.subscribe_erfolg_posten();
        }
    }
}
