//! Sitzungs-Lebenszyklus und Fehlerpfad
//!
//! Unpublish/Unsubscribe, Stream-Fehler mit Fan-out an die Beobachter,
//! ICE-Verbindungszustand, Play/Pause-Steuerung und Verbindungsstatistik.

use konferenz_core::KonferenzError;
use konferenz_protocol::{StreamEvent, SteuerAktion, SteuerOperation};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::callbacks::{FehlerCallback, FertigCallback};
use crate::channel::PeerConnectionChannel;
use crate::engine::ConnectionStats;
use crate::error::SignalingError;
use crate::state::{IceConnectionState, NeuverhandlungsEreignis, VerhandlungsEreignis};

pub(crate) const UNGUELTIG_UNPUBLISH: &str = "Invalid stream to be unpublished.";
pub(crate) const UNGUELTIG_UNSUBSCRIBE: &str = "Invalid stream to be unsubscribed.";
pub(crate) const ABBAU_WAEHREND_ABO: &str = "Cannot unsubscribe a stream during subscribing.";
pub(crate) const KEIN_STREAM: &str = "No stream associated with the session";
pub(crate) const ICE_FEHLGESCHLAGEN: &str = "Stream ICE connection failed.";

impl PeerConnectionChannel {
    // ------------------------------------------------------------------
    // Abbau
    // ------------------------------------------------------------------

    /// Beendet die Publikation mit der angegebenen Session-ID
    pub fn publikation_beenden(
        &self,
        session_id: &str,
        bei_erfolg: Option<FertigCallback>,
        bei_fehler: Option<FehlerCallback>,
    ) {
        if session_id != self.session_id().as_str() {
            tracing::error!(kanal = %self.kanal_id, session_id, "Publication-ID passt nicht");
            self.fehler_melden(bei_fehler, UNGUELTIG_UNPUBLISH);
            return;
        }
        self.abbauen(StreamEvent::Unpublish, session_id, bei_erfolg, bei_fehler);
        *self.published_stream.lock() = None;
    }

    /// Beendet das Abo mit der angegebenen Session-ID
    ///
    /// Waehrend ein Subscribe noch auf Erfolg wartet, ist kein Abbau moeglich.
    pub fn abo_beenden(
        &self,
        session_id: &str,
        bei_erfolg: Option<FertigCallback>,
        bei_fehler: Option<FehlerCallback>,
    ) {
        if session_id != self.session_id().as_str() {
            tracing::error!(kanal = %self.kanal_id, session_id, "Subscription-ID passt nicht");
            self.fehler_melden(bei_fehler, UNGUELTIG_UNSUBSCRIBE);
            return;
        }
        if self.callbacks.subscribe_ausstehend() {
            self.fehler_melden(bei_fehler, ABBAU_WAEHREND_ABO);
            return;
        }
        self.abbauen(StreamEvent::Unsubscribe, session_id, bei_erfolg, bei_fehler);
        *self.subscribed_stream.lock() = None;
    }

    fn abbauen(
        &self,
        event: StreamEvent,
        session_id: &str,
        bei_erfolg: Option<FertigCallback>,
        bei_fehler: Option<FehlerCallback>,
    ) {
        tracing::info!(kanal = %self.kanal_id, session_id, event = event.as_str(), "Sitzung wird abgebaut");
        self.verbunden.store(false, Ordering::SeqCst);

        let transport = Arc::clone(&self.transport);
        let schwach = self.selbst.clone();
        let sid = session_id.to_string();
        self.laufzeit.spawn(async move {
            let ergebnis = transport.send_stream_event(event, &sid).await;
            let Some(kanal) = schwach.upgrade() else { return };
            kanal.ergebnis_posten(ergebnis, bei_erfolg, bei_fehler);
        });

        self.peer_connection_schliessen();
        self.session_id_leeren();
        self.verhandlung_fortschreiben(VerhandlungsEreignis::Beendet);
        self.neuverhandlung_fortschreiben(NeuverhandlungsEreignis::Zurueckgesetzt);
        self.callbacks.latch_zuruecksetzen();
        let verworfen = self.kandidaten.leeren();
        if verworfen > 0 {
            tracing::debug!(kanal = %self.kanal_id, verworfen, "Gepufferte Kandidaten verworfen");
        }
    }

    /// Postet das Ergebnis eines Serveraufrufs an die Fortsetzungen
    fn ergebnis_posten(
        &self,
        ergebnis: Result<(), SignalingError>,
        bei_erfolg: Option<FertigCallback>,
        bei_fehler: Option<FehlerCallback>,
    ) {
        match ergebnis {
            Ok(()) => {
                if let Some(cb) = bei_erfolg {
                    self.event_queue.posten(cb);
                }
            }
            Err(e) => {
                tracing::warn!(kanal = %self.kanal_id, fehler = %e, "Serveraufruf fehlgeschlagen");
                if let Some(cb) = bei_fehler {
                    self.event_queue.posten(move || cb(e.into()));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Fehlerpfad
    // ------------------------------------------------------------------

    /// Meldet einen Stream-Fehler an alle Beobachter und baut die Sitzung ab
    pub(crate) fn stream_fehler(&self, nachricht: &str) {
        tracing::warn!(kanal = %self.kanal_id, fehler = nachricht, "Stream-Fehler");
        let fehler = Arc::new(KonferenzError::verhandlung(nachricht));
        let aktiv = self.aktiver_stream();

        for beobachter in self.beobachter_liste() {
            let stream = aktiv.clone();
            let fehler = Arc::clone(&fehler);
            self.event_queue
                .posten(move || beobachter.bei_stream_fehler(stream, fehler));
        }

        let session_id = self.session_id().to_string();
        if self.published_stream().is_some() {
            self.publikation_beenden(&session_id, None, None);
        }
        if self.subscribed_stream().is_some() {
            self.abo_beenden(&session_id, None, None);
        }
    }

    pub(crate) fn ice_verbindung_geaendert(&self, zustand: IceConnectionState) {
        tracing::info!(kanal = %self.kanal_id, zustand = ?zustand, "ICE-Verbindung geaendert");
        match zustand {
            IceConnectionState::Connected | IceConnectionState::Completed => {
                self.verbunden.store(true, Ordering::SeqCst);
                self.verhandlung_fortschreiben(VerhandlungsEreignis::Verbunden);
            }
            IceConnectionState::Failed => {
                // Nur nach einer bereits bestehenden Verbindung ein Stream-Fehler
                if self.verbunden.swap(false, Ordering::SeqCst) {
                    self.stream_fehler(ICE_FEHLGESCHLAGEN);
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Steuerung
    // ------------------------------------------------------------------

    pub fn audio_video_abspielen<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Av, SteuerOperation::Play, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    pub fn audio_video_pausieren<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Av, SteuerOperation::Pause, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    pub fn audio_abspielen<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Audio, SteuerOperation::Play, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    pub fn audio_pausieren<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Audio, SteuerOperation::Pause, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    pub fn video_abspielen<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Video, SteuerOperation::Play, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    pub fn video_pausieren<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce() + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        self.steuern(SteuerAktion::Video, SteuerOperation::Pause, Box::new(bei_erfolg), Box::new(bei_fehler));
    }

    /// Publikation: Stream-Steuerung, Abo: Subscription-Steuerung
    fn steuern(
        &self,
        aktion: SteuerAktion,
        operation: SteuerOperation,
        bei_erfolg: FertigCallback,
        bei_fehler: FehlerCallback,
    ) {
        let publikation = self.published_stream().is_some();
        if !publikation && self.subscribed_stream().is_none() {
            self.fehler_melden(Some(bei_fehler), KEIN_STREAM);
            return;
        }
        tracing::debug!(
            kanal = %self.kanal_id,
            aktion = aktion.as_str(),
            operation = operation.as_str(),
            "Steuerbefehl"
        );

        let transport = Arc::clone(&self.transport);
        let schwach = self.selbst.clone();
        let session_id = self.session_id().to_string();
        self.laufzeit.spawn(async move {
            let ergebnis = if publikation {
                transport
                    .send_stream_control_message(&session_id, aktion, operation)
                    .await
            } else {
                transport
                    .send_subscription_control_message(&session_id, aktion, operation)
                    .await
            };
            let Some(kanal) = schwach.upgrade() else { return };
            kanal.ergebnis_posten(ergebnis, Some(bei_erfolg), Some(bei_fehler));
        });
    }

    // ------------------------------------------------------------------
    // Statistik
    // ------------------------------------------------------------------

    /// Fragt die Verbindungsstatistik der Engine ab
    pub fn verbindungsstatistik<E, F>(&self, bei_erfolg: E, bei_fehler: F)
    where
        E: FnOnce(ConnectionStats) + Send + 'static,
        F: FnOnce(KonferenzError) + Send + 'static,
    {
        if self.published_stream().is_none() && self.subscribed_stream().is_none() {
            self.fehler_melden(Some(Box::new(bei_fehler)), KEIN_STREAM);
            return;
        }
        let Some(pc) = self.peer_connection() else {
            let fehler: KonferenzError = SignalingError::Geschlossen.into();
            self.event_queue.posten(move || bei_fehler(fehler));
            return;
        };

        let schwach = self.selbst.clone();
        self.laufzeit.spawn(async move {
            let ergebnis = pc.get_stats().await;
            let Some(kanal) = schwach.upgrade() else { return };
            match ergebnis {
                Ok(statistik) => kanal.event_queue.posten(move || bei_erfolg(statistik)),
                Err(e) => kanal.event_queue.posten(move || bei_fehler(e.into())),
            }
        });
    }
}
