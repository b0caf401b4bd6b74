//! konferenz-protocol – Signaling-Nachrichten
//!
//! Definiert alle Nutzlasten, die ueber den Signaling-Transport zwischen
//! Kanal und Konferenzserver ausgetauscht werden.
//!
//! ## Module
//! - [`signaling`] – Offer/Answer/Kandidaten-Umschlag (`{ id, signaling }`)
//! - [`init`] – Initialisierungs-Anfrage fuer Publish und Subscribe
//! - [`inbound`] – Interpretation eingehender Servernachrichten
//! - [`control`] – Stream-Events und Steuerbefehle (play/pause)

pub mod control;
pub mod inbound;
pub mod init;
pub mod signaling;

pub use control::{StreamEvent, SteuerAktion, SteuerOperation};
pub use inbound::ServerNachricht;
pub use init::{InitAck, InitOptions, TrackOptions};
pub use signaling::{CandidateInfo, SdpTyp, SignalingEnvelope, SignalingPayload};
