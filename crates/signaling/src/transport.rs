//! Schnittstelle zum Signaling-Transport
//!
//! Der bidirektionale Nachrichtenkanal zum Konferenzserver ist ein externer
//! Kollaborateur. Alle Server-Rundreisen sind asynchron.
//!
//! Ausgehende SDP- und Kandidaten-Nachrichten laufen ueber einen
//! Ausgangs-Task pro Kanal, damit die Reihenfolge auf dem Draht der
//! Reihenfolge des Einreihens entspricht.

use async_trait::async_trait;
use konferenz_protocol::{InitAck, InitOptions, SignalingEnvelope, StreamEvent, SteuerAktion, SteuerOperation};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::SignalingResult;

/// Vom Signaling-Transport bereitgestellte Operationen
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Offer/Answer/Kandidaten an den Server (fire-and-forget)
    async fn send_sdp(&self, nachricht: SignalingEnvelope) -> SignalingResult<()>;

    /// Initialisierungs-Handshake fuer Publish (lokale ID) bzw. Subscribe (entfernte ID)
    async fn send_initialization_message(
        &self,
        optionen: InitOptions,
        local_stream_id: &str,
        remote_stream_id: &str,
    ) -> SignalingResult<InitAck>;

    async fn send_stream_event(&self, event: StreamEvent, session_id: &str) -> SignalingResult<()>;

    async fn send_stream_control_message(
        &self,
        session_id: &str,
        aktion: SteuerAktion,
        operation: SteuerOperation,
    ) -> SignalingResult<()>;

    async fn send_subscription_control_message(
        &self,
        session_id: &str,
        aktion: SteuerAktion,
        operation: SteuerOperation,
    ) -> SignalingResult<()>;
}

/// Sende-Queue fuer ausgehende SDP-/Kandidaten-Nachrichten
#[derive(Clone)]
pub struct SdpAusgang {
    tx: mpsc::UnboundedSender<SignalingEnvelope>,
}

impl SdpAusgang {
    /// Startet den Ausgangs-Task; er endet wenn alle Sender verworfen sind
    pub fn starten(laufzeit: &Handle, transport: Arc<dyn SignalingTransport>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SignalingEnvelope>();
        laufzeit.spawn(async move {
            while let Some(nachricht) = rx.recv().await {
                let session_id = nachricht.id.clone();
                if let Err(e) = transport.send_sdp(nachricht).await {
                    tracing::warn!(session_id = %session_id, fehler = %e, "SDP-Nachricht nicht zugestellt");
                }
            }
            tracing::debug!("SDP-Ausgang beendet");
        });
        Self { tx }
    }

    /// Reiht eine Nachricht nicht-blockierend ein
    pub fn senden(&self, nachricht: SignalingEnvelope) {
        if self.tx.send(nachricht).is_err() {
            tracing::debug!("SDP-Ausgang geschlossen – Nachricht verworfen");
        }
    }
}
