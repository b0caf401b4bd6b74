//! Fehlertypen fuer Konferenz
//!
//! Alle lokal erzeugten Fehler (Validierung, Verhandlung) verwenden
//! eine einzige generische Art `Verhandlung` mit beschreibender Nachricht.
//! Fehler der Kollaborateure (Signaling-Transport, Media-Engine) werden als
//! `Transport` durchgereicht.

use thiserror::Error;

/// Globaler Result-Alias fuer Konferenz
pub type Result<T> = std::result::Result<T, KonferenzError>;

/// Alle Fehler, die an Fehler-Callbacks und Beobachter gemeldet werden
#[derive(Debug, Error)]
pub enum KonferenzError {
    /// Lokale Validierung oder Offer/Answer-Verhandlung fehlgeschlagen
    #[error("Verhandlung fehlgeschlagen: {0}")]
    Verhandlung(String),

    /// Fehler des Signaling-Transports oder der Media-Engine
    #[error("Transportfehler: {0}")]
    Transport(String),

    /// Ungueltige oder unlesbare Konfiguration
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl KonferenzError {
    /// Erstellt einen generischen Verhandlungsfehler
    pub fn verhandlung(msg: impl Into<String>) -> Self {
        Self::Verhandlung(msg.into())
    }

    /// Erstellt einen Transportfehler
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = KonferenzError::verhandlung("Unsupported subscribe option.");
        assert_eq!(
            e.to_string(),
            "Verhandlung fehlgeschlagen: Unsupported subscribe option."
        );
    }

    #[test]
    fn anyhow_wird_durchgereicht() {
        let e: KonferenzError = anyhow::anyhow!("kontext").into();
        assert_eq!(e.to_string(), "kontext");
    }
}
