//! konferenz-core – Gemeinsame Typen, Stream-Modell und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die vom Protokoll- und vom
//! Signaling-Crate gemeinsam genutzt werden: Fehlertyp, Kennungen,
//! das Stream-Modell (lokale/entfernte Streams, Subscribe-Optionen) und
//! die Kanal-Konfiguration.

pub mod config;
pub mod error;
pub mod stream;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use config::{ChannelConfig, KonferenzConfig};
pub use error::{KonferenzError, Result};
pub use stream::{LocalStream, MediaStream, MediaTrack, RemoteStream, SubscribeOptions};
pub use types::{KanalId, Resolution, SessionId};
