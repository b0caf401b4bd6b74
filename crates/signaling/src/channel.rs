//! PeerConnectionChannel – eine Publish- oder Subscribe-Sitzung
//!
//! Der Kanal koordiniert genau eine Medien-Sitzung mit dem Konferenzserver.
//! Die Operationen verteilen sich auf mehrere Module:
//!
//! ```text
//! publish.rs      Publish  ──┐
//! subscribe.rs    Subscribe ─┤  Init-Handshake ──► Ack ──► Transceiver ──► Offer
//!                            │
//! negotiation.rs  Offer/Answer, Remote-Description, Kandidaten, ICE-Restart,
//!                 eingehende Servernachrichten
//! lifecycle.rs    Unpublish/Unsubscribe, Stream-Fehler, ICE-Verbindung,
//!                 Steuerbefehle, Statistik
//! ```
//!
//! Aufrufer, Engine-Callbacks und Transport koennen nebenlaeufig eintreffen.
//! Erfolgs- und Fehler-Fortsetzungen laufen ausschliesslich auf der
//! [`EventQueue`]. Gespawnte Tasks halten den Kanal nur schwach (`Weak`)
//! und werden zum No-op, wenn der Kanal inzwischen verworfen wurde.

use konferenz_core::stream::{LocalStream, MediaStream, RemoteStream};
use konferenz_core::{ChannelConfig, KanalId, KonferenzError, SessionId};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;

use crate::callbacks::{CallbackRegistry, FehlerCallback};
use crate::candidates::CandidateBuffer;
use crate::engine::{IceCandidate, PeerConnection, PeerConnectionEvents, TransceiverDirection};
use crate::queue::EventQueue;
use crate::state::{
    IceConnectionState, IceGatheringState, NegotiationState, NeuverhandlungsEreignis,
    RenegotiationState, SignalingState, VerhandlungsEreignis,
};
use crate::transport::{SdpAusgang, SignalingTransport};

// ---------------------------------------------------------------------------
// Beobachter
// ---------------------------------------------------------------------------

/// Der zum Zeitpunkt eines Fehlers aktive Stream
#[derive(Debug, Clone)]
pub enum AktiverStream {
    Publiziert(Arc<LocalStream>),
    Abonniert(Arc<RemoteStream>),
}

/// Beobachter fuer Stream-Fehler eines Kanals
pub trait ChannelObserver: Send + Sync {
    /// Wird auf der Event-Queue aufgerufen, bevor der Kanal abgebaut wird
    fn bei_stream_fehler(&self, stream: Option<AktiverStream>, fehler: Arc<KonferenzError>);
}

// ---------------------------------------------------------------------------
// PeerConnectionChannel
// ---------------------------------------------------------------------------

/// Transceiver-Richtungen fuer Audio und Video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Richtungen {
    pub audio: TransceiverDirection,
    pub video: TransceiverDirection,
}

#[derive(Debug)]
pub(crate) struct SignalingStand {
    pub(crate) zustand: SignalingState,
    pub(crate) restart_vorgemerkt: bool,
}

/// Kanal fuer eine Publish- oder Subscribe-Sitzung
pub struct PeerConnectionChannel {
    pub(crate) selbst: Weak<Self>,
    pub(crate) kanal_id: KanalId,
    pub(crate) config: ChannelConfig,
    pub(crate) transport: Arc<dyn SignalingTransport>,
    /// Engine-Verbindung; None nach dem Schliessen. Der Lock schuetzt das Nullen.
    peer_connection: Mutex<Option<Arc<dyn PeerConnection>>>,
    pub(crate) event_queue: EventQueue,
    pub(crate) laufzeit: Handle,
    pub(crate) ausgang: SdpAusgang,

    session_id: RwLock<SessionId>,
    pub(crate) published_stream: Mutex<Option<Arc<LocalStream>>>,
    pub(crate) subscribed_stream: Mutex<Option<Arc<RemoteStream>>>,

    /// Signaling-Zustand und vorgemerkter ICE-Restart teilen sich einen Lock
    pub(crate) signaling: Mutex<SignalingStand>,
    verhandlung: Mutex<NegotiationState>,
    neuverhandlung: Mutex<RenegotiationState>,
    pub(crate) verbunden: AtomicBool,
    pub(crate) richtungen: Mutex<Richtungen>,

    pub(crate) kandidaten: CandidateBuffer,
    pub(crate) callbacks: CallbackRegistry,
    beobachter: Mutex<Vec<Arc<dyn ChannelObserver>>>,
}

impl PeerConnectionChannel {
    /// Erstellt einen neuen Kanal
    ///
    /// Muss innerhalb einer tokio-Laufzeit aufgerufen werden. Die Engine
    /// meldet ihre Ereignisse anschliessend an [`Self::ereignis_empfaenger`].
    pub fn neu(
        config: ChannelConfig,
        transport: Arc<dyn SignalingTransport>,
        peer_connection: Arc<dyn PeerConnection>,
        event_queue: EventQueue,
    ) -> konferenz_core::Result<Arc<Self>> {
        let laufzeit = Handle::try_current().map_err(|e| {
            KonferenzError::Konfiguration(format!("Keine tokio-Laufzeit: {e}"))
        })?;
        let ausgang = SdpAusgang::starten(&laufzeit, Arc::clone(&transport));
        let kanal_id = KanalId::new();

        tracing::info!(kanal = %kanal_id, "PeerConnectionChannel erstellt");

        Ok(Arc::new_cyclic(|selbst| Self {
            selbst: selbst.clone(),
            kanal_id,
            config,
            transport,
            peer_connection: Mutex::new(Some(peer_connection)),
            event_queue,
            laufzeit,
            ausgang,
            session_id: RwLock::new(SessionId::leer()),
            published_stream: Mutex::new(None),
            subscribed_stream: Mutex::new(None),
            signaling: Mutex::new(SignalingStand {
                zustand: SignalingState::Stable,
                restart_vorgemerkt: false,
            }),
            verhandlung: Mutex::new(NegotiationState::default()),
            neuverhandlung: Mutex::new(RenegotiationState::default()),
            verbunden: AtomicBool::new(false),
            richtungen: Mutex::new(Richtungen::default()),
            kandidaten: CandidateBuffer::neu(),
            callbacks: CallbackRegistry::neu(),
            beobachter: Mutex::new(Vec::new()),
        }))
    }

    /// Schwache Referenz fuer die Registrierung bei der Engine
    pub fn ereignis_empfaenger(&self) -> Weak<dyn PeerConnectionEvents> {
        self.selbst.clone()
    }

    // ------------------------------------------------------------------
    // Beobachter
    // ------------------------------------------------------------------

    /// Registriert einen Beobachter; doppelte Registrierung wird ignoriert
    pub fn beobachter_hinzufuegen(&self, beobachter: Arc<dyn ChannelObserver>) {
        let mut liste = self.beobachter.lock();
        if liste.iter().any(|b| Arc::ptr_eq(b, &beobachter)) {
            tracing::warn!(kanal = %self.kanal_id, "Beobachter bereits registriert");
            return;
        }
        liste.push(beobachter);
    }

    /// Entfernt einen Beobachter (Identitaetsvergleich)
    pub fn beobachter_entfernen(&self, beobachter: &Arc<dyn ChannelObserver>) {
        self.beobachter.lock().retain(|b| !Arc::ptr_eq(b, beobachter));
    }

    pub(crate) fn beobachter_liste(&self) -> Vec<Arc<dyn ChannelObserver>> {
        self.beobachter.lock().clone()
    }

    // ------------------------------------------------------------------
    // Zustand
    // ------------------------------------------------------------------

    pub fn kanal_id(&self) -> KanalId {
        self.kanal_id
    }

    /// Vom Server vergebene Session-ID (leer bis zum Handshake)
    pub fn session_id(&self) -> SessionId {
        self.session_id.read().clone()
    }

    pub(crate) fn session_id_setzen(&self, id: impl Into<SessionId>) {
        let id = id.into();
        tracing::info!(kanal = %self.kanal_id, session_id = %id, "Session-ID gesetzt");
        *self.session_id.write() = id;
    }

    pub(crate) fn session_id_leeren(&self) {
        *self.session_id.write() = SessionId::leer();
    }

    pub fn verhandlungs_zustand(&self) -> NegotiationState {
        *self.verhandlung.lock()
    }

    pub fn neuverhandlungs_zustand(&self) -> RenegotiationState {
        *self.neuverhandlung.lock()
    }

    pub fn signaling_zustand(&self) -> SignalingState {
        self.signaling.lock().zustand
    }

    /// Ein ICE-Restart wartet auf den naechsten Wechsel nach stable
    pub fn ice_restart_vorgemerkt(&self) -> bool {
        self.signaling.lock().restart_vorgemerkt
    }

    pub fn ist_verbunden(&self) -> bool {
        self.verbunden.load(Ordering::SeqCst)
    }

    pub fn richtungen(&self) -> Richtungen {
        *self.richtungen.lock()
    }

    /// Anzahl gepufferter ICE-Kandidaten
    pub fn gepufferte_kandidaten(&self) -> usize {
        self.kandidaten.laenge()
    }

    pub fn published_stream(&self) -> Option<Arc<LocalStream>> {
        self.published_stream.lock().clone()
    }

    pub fn subscribed_stream(&self) -> Option<Arc<RemoteStream>> {
        self.subscribed_stream.lock().clone()
    }

    pub(crate) fn aktiver_stream(&self) -> Option<AktiverStream> {
        if let Some(s) = self.published_stream() {
            return Some(AktiverStream::Publiziert(s));
        }
        self.subscribed_stream().map(AktiverStream::Abonniert)
    }

    pub(crate) fn verhandlung_fortschreiben(&self, ereignis: VerhandlungsEreignis) {
        let mut zustand = self.verhandlung.lock();
        match zustand.uebergang(ereignis) {
            Some(neu) => {
                tracing::debug!(kanal = %self.kanal_id, von = ?*zustand, nach = ?neu, "Verhandlungszustand");
                *zustand = neu;
            }
            None => {
                tracing::debug!(kanal = %self.kanal_id, zustand = ?*zustand, ereignis = ?ereignis, "Uebergang ignoriert");
            }
        }
    }

    pub(crate) fn neuverhandlung_fortschreiben(&self, ereignis: NeuverhandlungsEreignis) {
        let mut zustand = self.neuverhandlung.lock();
        if let Some(neu) = zustand.uebergang(ereignis) {
            *zustand = neu;
        }
    }

    // ------------------------------------------------------------------
    // Engine-Verbindung
    // ------------------------------------------------------------------

    pub(crate) fn peer_connection(&self) -> Option<Arc<dyn PeerConnection>> {
        self.peer_connection.lock().clone()
    }

    /// Schliesst die Engine-Verbindung; weitere Aufrufe sind No-ops
    pub(crate) fn peer_connection_schliessen(&self) {
        let mut pc = self.peer_connection.lock();
        if let Some(verbindung) = pc.take() {
            tracing::info!(kanal = %self.kanal_id, "PeerConnection wird geschlossen");
            verbindung.close();
        }
    }

    // ------------------------------------------------------------------
    // Fortsetzungen
    // ------------------------------------------------------------------

    /// Postet einen lokalen Fehler an eine vom Aufrufer uebergebene Fortsetzung
    pub(crate) fn fehler_melden(&self, bei_fehler: Option<FehlerCallback>, nachricht: &'static str) {
        tracing::warn!(kanal = %self.kanal_id, fehler = nachricht, "Lokaler Fehler");
        if let Some(cb) = bei_fehler {
            self.event_queue
                .posten(move || cb(KonferenzError::verhandlung(nachricht)));
        }
    }

    /// Postet einen Fehler an die registrierte Fehler-Fortsetzung (leert alle)
    pub(crate) fn registrierten_fehler_posten(&self, fehler: KonferenzError) {
        match self.callbacks.fehler_nehmen() {
            Some(cb) => self.event_queue.posten(move || cb(fehler)),
            None => tracing::debug!(kanal = %self.kanal_id, fehler = %fehler, "Keine Fehler-Fortsetzung registriert"),
        }
    }

    pub(crate) fn publish_erfolg_posten(&self) {
        if let Some(cb) = self.callbacks.publish_erfolg_nehmen() {
            let session_id = self.session_id().to_string();
            tracing::info!(kanal = %self.kanal_id, session_id = %session_id, "Publish erfolgreich");
            self.event_queue.posten(move || cb(session_id));
        }
    }

    pub(crate) fn subscribe_erfolg_posten(&self) {
        if let Some(cb) = self.callbacks.subscribe_erfolg_nehmen() {
            let session_id = self.session_id().to_string();
            tracing::info!(kanal = %self.kanal_id, session_id = %session_id, "Subscribe erfolgreich");
            self.event_queue.posten(move || cb(session_id));
        }
    }
}

impl Drop for PeerConnectionChannel {
    fn drop(&mut self) {
        tracing::info!(kanal = %self.kanal_id, "PeerConnectionChannel wird verworfen");
        let session_id = self.session_id().to_string();
        if self.published_stream.lock().is_some() {
            self.publikation_beenden(&session_id, None, None);
        }
        if self.subscribed_stream.lock().is_some() {
            self.abo_beenden(&session_id, None, None);
        }
    }
}

// ---------------------------------------------------------------------------
// Engine-Ereignisse
// ---------------------------------------------------------------------------

impl PeerConnectionEvents for PeerConnectionChannel {
    fn bei_signaling_aenderung(&self, zustand: SignalingState) {
        self.signaling_geaendert(zustand);
    }

    fn bei_ice_verbindung_aenderung(&self, zustand: IceConnectionState) {
        self.ice_verbindung_geaendert(zustand);
    }

    fn bei_ice_sammlung_aenderung(&self, zustand: IceGatheringState) {
        tracing::info!(kanal = %self.kanal_id, zustand = ?zustand, "ICE-Sammlung geaendert");
    }

    fn bei_ice_kandidat(&self, kandidat: IceCandidate) {
        self.kandidat_gefunden(kandidat);
    }

    fn bei_kandidaten_entfernt(&self, kandidaten: Vec<String>) {
        self.kandidaten_entfernt(kandidaten);
    }

    fn bei_stream_hinzugefuegt(&self, media: MediaStream) {
        self.stream_hinzugefuegt(media);
    }
}
