//! konferenz-signaling – Peer-Connection-Kanal fuer Konferenzen
//!
//! Dieser Crate koordiniert eine einzelne Medien-Sitzung (Publish oder
//! Subscribe) zwischen Client und Konferenzserver: Offer/Answer-Austausch,
//! Pufferung getrickelter ICE-Kandidaten, Zusammenfuehrung von
//! Serverbestaetigung und Medien-Ankunft sowie Abbau der Sitzung.
//!
//! ## Architektur
//!
//! ```text
//! Aufrufer ──► PeerConnectionChannel ──► SignalingTransport (Server)
//!                 │        ▲
//!                 │        └── PeerConnectionEvents (Engine-Callbacks)
//!                 ▼
//!              PeerConnection (Media-Engine)
//!
//! CandidateBuffer  – Kandidaten bis zum stabilen Signaling puffern
//! CallbackRegistry – je eine Erfolgs-/Fehler-Fortsetzung, Subscribe-Latch
//! EventQueue       – serielle Ausfuehrung aller Fortsetzungen
//! ```
//!
//! Engine und Transport sind externe Kollaborateure und werden ueber die
//! Traits [`PeerConnection`] und [`SignalingTransport`] angebunden.

pub mod callbacks;
pub mod candidates;
pub mod channel;
pub mod compat;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod negotiation;
pub mod publish;
pub mod queue;
pub mod sdp;
pub mod state;
pub mod subscribe;
pub mod transport;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use callbacks::{CallbackRegistry, ErfolgCallback, FehlerCallback, FertigCallback};
pub use candidates::CandidateBuffer;
pub use channel::{AktiverStream, ChannelObserver, PeerConnectionChannel, Richtungen};
pub use engine::{
    ConnectionStats, IceCandidate, OfferAnswerOptions, PeerConnection, PeerConnectionEvents,
    SessionDescription, TransceiverDirection, TransceiverInit,
};
pub use error::{SignalingError, SignalingResult};
pub use queue::EventQueue;
pub use state::{
    IceConnectionState, IceGatheringState, NegotiationState, RenegotiationState, SignalingState,
};
pub use transport::SignalingTransport;
