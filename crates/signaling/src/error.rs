//! Fehlertypen der Kollaborateure (Signaling-Transport, Media-Engine)

use konferenz_core::KonferenzError;
use thiserror::Error;

/// Fehlertyp fuer Transport- und Engine-Aufrufe
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Signaling-Transport hat die Nachricht nicht zugestellt
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Server hat die Anfrage abgelehnt
    #[error("Vom Server abgelehnt: {0}")]
    Abgelehnt(String),

    /// Media-Engine meldet einen Fehler
    #[error("Engine-Fehler: {0}")]
    Engine(String),

    /// Session-Description konnte nicht erstellt werden
    #[error("Ungueltige Session-Description: {0}")]
    UngueltigeBeschreibung(String),

    /// PeerConnection wurde bereits geschlossen
    #[error("PeerConnection geschlossen")]
    Geschlossen,
}

impl SignalingError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}

impl From<SignalingError> for KonferenzError {
    fn from(e: SignalingError) -> Self {
        KonferenzError::Transport(e.to_string())
    }
}

/// Result-Typ fuer Kollaborateur-Aufrufe
pub type SignalingResult<T> = Result<T, SignalingError>;
